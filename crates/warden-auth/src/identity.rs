//! The resolved principal and the permission model evaluated against it.
//!
//! All checks are in-memory lookups over sets loaded together with the user;
//! none of them perform I/O. Each predicate has a boolean form (`has_*`,
//! [`Identity::can_update`]) and a checked form (`require_*`) that explains
//! the denial.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use warden_core::permissions::format_permission_tag;

use crate::error::AccessError;

/// A role assigned to an identity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoleGrant {
    pub id: i32,
    pub name: String,
}

/// An authenticated user with its effective roles and permission tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub roles: BTreeSet<RoleGrant>,
    /// Direct grants plus grants inherited from roles.
    pub permissions: BTreeSet<String>,
}

impl Identity {
    pub fn new(id: Uuid, email: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
            first_name: None,
            last_name: None,
            roles: BTreeSet::new(),
            permissions: BTreeSet::new(),
        }
    }

    pub fn with_names(mut self, first_name: Option<String>, last_name: Option<String>) -> Self {
        self.first_name = first_name;
        self.last_name = last_name;
        self
    }

    pub fn with_role(mut self, id: i32, name: impl Into<String>) -> Self {
        self.roles.insert(RoleGrant {
            id,
            name: name.into(),
        });
        self
    }

    pub fn with_permission(mut self, tag: impl Into<String>) -> Self {
        self.permissions.insert(tag.into());
        self
    }

    pub fn has_role(&self, role_id: i32) -> bool {
        self.roles.iter().any(|role| role.id == role_id)
    }

    pub fn require_role(&self, role_id: i32) -> Result<(), AccessError> {
        if self.has_role(role_id) {
            Ok(())
        } else {
            Err(AccessError::MissingRole(role_id))
        }
    }

    pub fn has_role_named(&self, name: &str) -> bool {
        self.roles.iter().any(|role| role.name == name)
    }

    /// Checks for the canonical tag of `action` on `entity`.
    ///
    /// `entity` may be given as a domain name (`UserProfiles`) or a table name
    /// (`user_profiles`); both resolve to the same tag.
    pub fn has_permission(&self, action: &str, entity: &str) -> bool {
        self.permissions
            .contains(&format_permission_tag(action, entity))
    }

    pub fn require_permission(&self, action: &str, entity: &str) -> Result<(), AccessError> {
        let tag = format_permission_tag(action, entity);
        if self.permissions.contains(&tag) {
            Ok(())
        } else {
            Err(AccessError::MissingPermission(tag))
        }
    }

    /// Exact, case-sensitive tag lookup.
    pub fn has_permission_tag(&self, tag: &str) -> bool {
        self.permissions.contains(tag)
    }

    pub fn require_permission_tag(&self, tag: &str) -> Result<(), AccessError> {
        if self.has_permission_tag(tag) {
            Ok(())
        } else {
            Err(AccessError::MissingPermissionTag(tag.to_string()))
        }
    }

    /// True when `target_id` is this identity's own id.
    pub fn can_update(&self, target_id: &str) -> bool {
        target_id == self.id.to_string()
    }

    pub fn require_owner(&self, target_id: &str) -> Result<(), AccessError> {
        if self.can_update(target_id) {
            Ok(())
        } else {
            Err(AccessError::NotOwner(target_id.to_string()))
        }
    }

    /// First and last name, or the email when neither is set.
    pub fn display_name(&self) -> String {
        let name = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        if name.is_empty() {
            self.email.clone()
        } else {
            name
        }
    }
}
