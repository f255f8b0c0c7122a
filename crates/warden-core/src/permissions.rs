//! Permission catalogue for the Warden service.
//!
//! Permissions are flat tags of the form `action:entity`, where `entity` is the
//! snake_case table name of the resource. Tags are always lowercase; use
//! [`format_permission_tag`] rather than building them by hand.
//!
//! # Example
//!
//! ```ignore
//! use warden_core::permissions::{self, actions, entities};
//!
//! let tag = permissions::format_permission_tag(actions::UPDATE, entities::USER_PROFILES);
//! assert_eq!(tag, "update:user_profiles");
//! ```

/// Actions that can be granted on an entity.
pub mod actions {
    pub const CREATE: &str = "create";
    pub const READ: &str = "read";
    pub const UPDATE: &str = "update";
    pub const DELETE: &str = "delete";
    pub const LIST: &str = "list";
    pub const ASSIGN: &str = "assign";
    pub const UPLOAD: &str = "upload";

    pub const ALL: [&str; 7] = [CREATE, READ, UPDATE, DELETE, LIST, ASSIGN, UPLOAD];
}

/// Entity names as they appear in the domain. Converted to table names with
/// [`table_name`](super::table_name).
pub mod entities {
    pub const USERS: &str = "Users";
    pub const ROLES: &str = "Roles";
    pub const PERMISSIONS: &str = "Permissions";
    pub const ROLE_PARENTS: &str = "RoleParents";
    pub const ROLE_PERMISSIONS: &str = "RolePermissions";
    pub const USER_PERMISSIONS: &str = "UserPermissions";
    pub const USER_PROFILES: &str = "UserProfiles";
    pub const USER_ROLES: &str = "UserRoles";
    pub const USER_API_KEYS: &str = "UserApiKeys";

    pub const ALL: [&str; 9] = [
        USERS,
        ROLES,
        PERMISSIONS,
        ROLE_PARENTS,
        ROLE_PERMISSIONS,
        USER_PERMISSIONS,
        USER_PROFILES,
        USER_ROLES,
        USER_API_KEYS,
    ];
}

/// A role that ships with every installation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemRole {
    pub name: &'static str,
    pub description: &'static str,
}

pub const ADMIN_ROLE: SystemRole = SystemRole {
    name: "admin",
    description: "Administrator of the app",
};

pub const USER_ROLE: SystemRole = SystemRole {
    name: "user",
    description: "Normal user of the app",
};

pub const SYSTEM_ROLES: [SystemRole; 2] = [ADMIN_ROLE, USER_ROLE];

/// Converts `CamelCase` to `snake_case`.
///
/// Acronyms are kept together: `UserAPIKeys` becomes `user_api_keys`.
pub fn to_snake_case(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    let mut out = String::with_capacity(value.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            let boundary = prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next_is_lower);
            if boundary && prev != '_' {
                out.push('_');
            }
        }
        out.extend(c.to_lowercase());
    }

    out
}

/// Normalised table name for an entity.
pub fn table_name(entity: &str) -> String {
    to_snake_case(entity.trim())
}

/// Builds the canonical `action:entity` tag.
pub fn format_permission_tag(action: &str, entity: &str) -> String {
    format!("{}:{}", action.trim().to_lowercase(), table_name(entity))
}

/// Human readable description stored alongside a permission tag.
pub fn format_permission_description(action: &str, entity: &str) -> String {
    format!(
        "Allows the user to {}",
        format_permission_tag(action, entity).replace(':', " ")
    )
}

/// Every `action:entity` combination in the catalogue.
pub fn all_permission_tags() -> Vec<String> {
    entities::ALL
        .iter()
        .flat_map(|entity| {
            actions::ALL
                .iter()
                .map(move |action| format_permission_tag(action, entity))
        })
        .collect()
}

/// Tags granted to the built-in `user` role: read and list on every entity.
pub fn default_user_permission_tags() -> Vec<String> {
    entities::ALL
        .iter()
        .flat_map(|entity| {
            [actions::READ, actions::LIST]
                .into_iter()
                .map(move |action| format_permission_tag(action, entity))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snake_case_conversion() {
        assert_eq!(to_snake_case("Users"), "users");
        assert_eq!(to_snake_case("RolePermissions"), "role_permissions");
        assert_eq!(to_snake_case("UserAPIKeys"), "user_api_keys");
        assert_eq!(to_snake_case("UserApiKeys"), "user_api_keys");
        assert_eq!(to_snake_case("already_snake"), "already_snake");
        assert_eq!(to_snake_case("Version2Table"), "version2_table");
        assert_eq!(to_snake_case(""), "");
    }

    #[test]
    fn tag_is_lowercase_action_and_table() {
        assert_eq!(format_permission_tag("create", "Users"), "create:users");
        assert_eq!(format_permission_tag("CREATE", "user"), "create:user");
        assert_eq!(
            format_permission_tag(actions::ASSIGN, entities::USER_ROLES),
            "assign:user_roles"
        );
    }

    #[test]
    fn description_replaces_separator() {
        assert_eq!(
            format_permission_description("read", "UserProfiles"),
            "Allows the user to read user_profiles"
        );
    }

    #[test]
    fn catalogue_covers_every_pair_once() {
        let tags = all_permission_tags();
        assert_eq!(tags.len(), actions::ALL.len() * entities::ALL.len());

        let unique: std::collections::HashSet<_> = tags.iter().collect();
        assert_eq!(unique.len(), tags.len());
        assert!(tags.contains(&"delete:user_api_keys".to_string()));
    }

    #[test]
    fn user_role_only_reads_and_lists() {
        let tags = default_user_permission_tags();
        assert!(tags.contains(&"read:users".to_string()));
        assert!(tags.contains(&"list:roles".to_string()));
        assert!(!tags.iter().any(|t| t.starts_with("create:")));
    }
}
