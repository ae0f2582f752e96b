//! Role hierarchy and the fixed capability table.
//!
//! Roles form a total order (`user < admin < owner`); the variant order
//! of [`Role`] encodes the hierarchy so the derived `Ord` is the
//! authority on "at least" comparisons. The capability table is a
//! process-wide constant: `permissions()` is an exhaustive match, so
//! there is no "unrecognized role" branch to defend at runtime.

use crate::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Access tier assigned to an authenticated identity.
///
/// Variant order is significant: the derived ordering gives
/// `User < Admin < Owner`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular user: may view and (pending policy) create/edit records.
    User,
    /// Administrator: full DNS control plus blocklist management.
    Admin,
    /// Owner: everything, including user management.
    Owner,
}

/// Named permission flag controlling a single gateway action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    /// List/read DNS records
    #[serde(rename = "viewDNS")]
    ViewDns,
    /// Create DNS records
    #[serde(rename = "createDNS")]
    CreateDns,
    /// Edit existing DNS records
    #[serde(rename = "editDNS")]
    EditDns,
    /// Delete DNS records
    #[serde(rename = "deleteDNS")]
    DeleteDns,
    /// Create/update/delete blocklist rules
    #[serde(rename = "manageBlacklist")]
    ManageBlocklist,
    /// List users
    #[serde(rename = "viewUsers")]
    ViewUsers,
    /// Change user roles and activation
    #[serde(rename = "manageUsers")]
    ManageUsers,
}

impl Capability {
    /// All seven capabilities, in table order.
    pub const ALL: [Self; 7] = [
        Self::ViewDns,
        Self::CreateDns,
        Self::EditDns,
        Self::DeleteDns,
        Self::ManageBlocklist,
        Self::ViewUsers,
        Self::ManageUsers,
    ];
}

/// Fixed capability set for a role.
///
/// Serialized field names match the wire vocabulary of the admin API
/// (`viewDNS`, `manageBlacklist`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions {
    #[serde(rename = "viewDNS")]
    pub view_dns: bool,
    #[serde(rename = "createDNS")]
    pub create_dns: bool,
    #[serde(rename = "editDNS")]
    pub edit_dns: bool,
    #[serde(rename = "deleteDNS")]
    pub delete_dns: bool,
    #[serde(rename = "manageBlacklist")]
    pub manage_blocklist: bool,
    #[serde(rename = "viewUsers")]
    pub view_users: bool,
    #[serde(rename = "manageUsers")]
    pub manage_users: bool,
}

impl Permissions {
    /// The zero-capability set.
    ///
    /// Not reachable through [`Role::permissions`] (the table is total),
    /// but callers use it for unauthenticated principals.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            view_dns: false,
            create_dns: false,
            edit_dns: false,
            delete_dns: false,
            manage_blocklist: false,
            view_users: false,
            manage_users: false,
        }
    }

    /// Look up a single capability flag.
    #[must_use]
    pub const fn allows(&self, capability: Capability) -> bool {
        match capability {
            Capability::ViewDns => self.view_dns,
            Capability::CreateDns => self.create_dns,
            Capability::EditDns => self.edit_dns,
            Capability::DeleteDns => self.delete_dns,
            Capability::ManageBlocklist => self.manage_blocklist,
            Capability::ViewUsers => self.view_users,
            Capability::ManageUsers => self.manage_users,
        }
    }

    /// Returns true if every flag set here is also set in `other`.
    #[must_use]
    pub const fn subset_of(&self, other: &Self) -> bool {
        (!self.view_dns || other.view_dns)
            && (!self.create_dns || other.create_dns)
            && (!self.edit_dns || other.edit_dns)
            && (!self.delete_dns || other.delete_dns)
            && (!self.manage_blocklist || other.manage_blocklist)
            && (!self.view_users || other.view_users)
            && (!self.manage_users || other.manage_users)
    }
}

impl Role {
    /// Position in the hierarchy (`user=1, admin=2, owner=3`).
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::User => 1,
            Self::Admin => 2,
            Self::Owner => 3,
        }
    }

    /// The fixed capability set for this role.
    #[must_use]
    pub const fn permissions(self) -> Permissions {
        match self {
            Self::User => Permissions {
                view_dns: true,
                create_dns: true, // can be restricted by policy
                edit_dns: true,   // can be restricted by policy
                delete_dns: false,
                manage_blocklist: false,
                view_users: false,
                manage_users: false,
            },
            Self::Admin => Permissions {
                view_dns: true,
                create_dns: true,
                edit_dns: true,
                delete_dns: true,
                manage_blocklist: true,
                view_users: false,
                manage_users: false,
            },
            Self::Owner => Permissions {
                view_dns: true,
                create_dns: true,
                edit_dns: true,
                delete_dns: true,
                manage_blocklist: true,
                view_users: true,
                manage_users: true,
            },
        }
    }

    /// May this role perform the given action?
    #[must_use]
    pub const fn allows(self, capability: Capability) -> bool {
        self.permissions().allows(capability)
    }

    /// True iff this role sits at or above `minimum` in the hierarchy.
    #[must_use]
    pub const fn at_least(self, minimum: Self) -> bool {
        self.rank() >= minimum.rank()
    }

    /// May an actor with this role manage a target with role `target`?
    ///
    /// Only owners manage other users, and owners cannot be managed
    /// through this path. Self-management is excluded by the caller via
    /// identity comparison, not here.
    #[must_use]
    pub const fn can_manage(self, target: Self) -> bool {
        matches!(self, Self::Owner) && !matches!(target, Self::Owner)
    }

    /// Role tag as it appears on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
            Self::Owner => "owner",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            "owner" => Ok(Self::Owner),
            other => Err(CoreError::UnknownRole(other.to_string())),
        }
    }
}
