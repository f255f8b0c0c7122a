use bcrypt::{DEFAULT_COST, hash};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::errors::AppError;

/// Generates a fresh API key for a user.
///
/// The key is the hex SHA-256 of a salted bcrypt hash of the user id plus a
/// random UUID, so two keys for the same user never collide.
pub fn generate_api_key(user_id: &Uuid) -> Result<String, AppError> {
    let salted = hash(user_id.to_string(), DEFAULT_COST)
        .map_err(|e| AppError::internal(anyhow::anyhow!("Failed to hash user id: {}", e)))?;

    let mut hasher = Sha256::new();
    hasher.update(salted.as_bytes());
    hasher.update(Uuid::new_v4().as_bytes());

    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_keys_are_hex_and_unique() {
        let user_id = Uuid::new_v4();
        let first = generate_api_key(&user_id).unwrap();
        let second = generate_api_key(&user_id).unwrap();

        assert_eq!(first.len(), 64);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(first, second);
    }
}
