//! User seeding.
//!
//! Creates the two fixture users (`admin@test.com` with the `admin` role and
//! `user@test.com` with the `user` role) plus any number of fake users, each
//! with one API key. Existing emails are skipped, so seeding twice is safe.

use std::time::Instant;

use fake::Fake;
use fake::faker::name::en::{FirstName, LastName};
use sqlx::PgPool;
use uuid::Uuid;

use warden_core::permissions::{ADMIN_ROLE, USER_ROLE};
use warden_db::{RepoError, api_keys, users};
use warden_models::CreateUserDto;

pub const FIXTURE_FIRST_NAME: &str = "Test";
pub const FIXTURE_LAST_NAME: &str = "User";

/// A user created by the seeder together with its API key.
#[derive(Debug, Clone)]
pub struct SeededUser {
    pub id: Uuid,
    pub email: String,
    pub role: &'static str,
    pub api_key: String,
}

#[derive(Debug, Default)]
pub struct SeedReport {
    pub created: Vec<SeededUser>,
    pub skipped: Vec<String>,
}

/// The two fixture users.
pub fn fixture_users() -> Vec<CreateUserDto> {
    [("admin@test.com", ADMIN_ROLE.name), ("user@test.com", USER_ROLE.name)]
        .into_iter()
        .map(|(email, role)| CreateUserDto {
            email: email.to_string(),
            first_name: Some(FIXTURE_FIRST_NAME.to_string()),
            last_name: Some(FIXTURE_LAST_NAME.to_string()),
            role: Some(role.to_string()),
        })
        .collect()
}

/// `count` users with fake names and the `user` role.
pub fn generate_fake_users(count: usize) -> Vec<CreateUserDto> {
    (0..count)
        .map(|idx| {
            let first_name: String = FirstName().fake();
            let last_name: String = LastName().fake();
            let email = format!(
                "{}.{}+{}@example.com",
                first_name.to_lowercase(),
                last_name.to_lowercase(),
                idx
            )
            .replace(['\'', ' '], "");

            CreateUserDto {
                email,
                first_name: Some(first_name),
                last_name: Some(last_name),
                role: Some(USER_ROLE.name.to_string()),
            }
        })
        .collect()
}

/// Seeds the fixture users and `fake_count` fake users.
///
/// Requires the roles from `seed-rbac`.
pub async fn seed_users(db: &PgPool, fake_count: usize) -> Result<SeedReport, RepoError> {
    let start_time = Instant::now();
    println!("🌱 Seeding users...");

    let mut report = SeedReport::default();
    let candidates = fixture_users().into_iter().chain(generate_fake_users(fake_count));

    for dto in candidates {
        if users::find_user_by_email(db, &dto.email).await?.is_some() {
            report.skipped.push(dto.email);
            continue;
        }

        let user = users::create_user(db, &dto).await?;
        let key = api_keys::create_api_key(db, user.id, Some("seed")).await?;
        let role = match dto.role.as_deref() {
            Some(name) if name == ADMIN_ROLE.name => ADMIN_ROLE.name,
            _ => USER_ROLE.name,
        };

        report.created.push(SeededUser {
            id: user.id,
            email: user.email,
            role,
            api_key: key.api_key,
        });
    }

    println!(
        "   ✓ Created {} users ({} skipped) in {:?}",
        report.created.len(),
        report.skipped.len(),
        start_time.elapsed()
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn fixtures_are_admin_and_user() {
        let fixtures = fixture_users();
        assert_eq!(fixtures.len(), 2);
        assert_eq!(fixtures[0].email, "admin@test.com");
        assert_eq!(fixtures[0].role.as_deref(), Some("admin"));
        assert_eq!(fixtures[1].email, "user@test.com");
        assert_eq!(fixtures[1].role.as_deref(), Some("user"));
    }

    #[test]
    fn fake_users_have_distinct_valid_emails() {
        let users = generate_fake_users(25);
        assert_eq!(users.len(), 25);

        let mut emails: Vec<_> = users.iter().map(|u| u.email.clone()).collect();
        emails.sort();
        emails.dedup();
        assert_eq!(emails.len(), 25);

        for user in &users {
            assert!(user.validate().is_ok(), "{}", user.email);
        }
    }
}
