//! Who is calling
//!
//! Role checks happen before any lookup so a forbidden caller learns
//! nothing about the resource.

use shared::models::MemberRole;

use super::CurrentUser;

/// Caller of an order or table operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    /// Customer at the table, no token
    Anonymous,
    Member(CurrentUser),
}

impl Actor {
    pub fn member(&self) -> Option<&CurrentUser> {
        match self {
            Self::Anonymous => None,
            Self::Member(user) => Some(user),
        }
    }

    /// The member, if their role is one of `roles`
    pub fn with_role(&self, roles: &[MemberRole]) -> Option<&CurrentUser> {
        self.member().filter(|u| roles.contains(&u.role))
    }

    pub fn service(&self) -> Option<&CurrentUser> {
        self.with_role(&[MemberRole::Owner, MemberRole::Staff])
    }

    pub fn kitchen(&self) -> Option<&CurrentUser> {
        self.with_role(&[MemberRole::Chef])
    }

    pub fn owner(&self) -> Option<&CurrentUser> {
        self.with_role(&[MemberRole::Owner])
    }

    pub fn member_id(&self) -> Option<i64> {
        self.member().map(|u| u.member_id)
    }
}

impl From<CurrentUser> for Actor {
    fn from(user: CurrentUser) -> Self {
        Self::Member(user)
    }
}
