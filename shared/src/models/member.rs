//! Member roles

use serde::{Deserialize, Serialize};

/// Role carried in a member's access token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemberRole {
    /// Restaurant owner, sees the service and admin views
    Owner,
    /// Service staff
    Staff,
    /// Kitchen staff
    Chef,
}

impl MemberRole {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "OWNER",
            Self::Staff => "STAFF",
            Self::Chef => "CHEF",
        }
    }

    /// Roles allowed on the service side (tables, item corrections, settlement)
    pub fn is_service(&self) -> bool {
        matches!(self, Self::Owner | Self::Staff)
    }

    pub fn is_kitchen(&self) -> bool {
        matches!(self, Self::Chef)
    }
}

impl std::fmt::Display for MemberRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MemberRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "OWNER" => Ok(Self::Owner),
            "STAFF" => Ok(Self::Staff),
            // legacy spelling still present in issued tokens
            "CHEF" | "CHEFF" => Ok(Self::Chef),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roles() {
        assert_eq!("owner".parse::<MemberRole>(), Ok(MemberRole::Owner));
        assert_eq!("STAFF".parse::<MemberRole>(), Ok(MemberRole::Staff));
        assert_eq!("CHEFF".parse::<MemberRole>(), Ok(MemberRole::Chef));
        assert!("admin".parse::<MemberRole>().is_err());
    }

    #[test]
    fn test_role_groups() {
        assert!(MemberRole::Owner.is_service());
        assert!(MemberRole::Staff.is_service());
        assert!(!MemberRole::Chef.is_service());
        assert!(MemberRole::Chef.is_kitchen());
    }
}
