//! Domain enums shared by models, DTOs and the database schema.
//!
//! All of them serialize in SCREAMING_SNAKE_CASE and parse case-insensitively;
//! an unknown value is a `400 Unknown {Enum}: {value}`.

use crate::error::{AppError, AppResult};
use diesel_derive_enum::DbEnum;
use serde::Serialize;
use utoipa::ToSchema;

macro_rules! string_enum {
    ($ty:ident, $label:literal { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            pub const ALL: &'static [$ty] = &[$($ty::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $ty {
            type Err = AppError;

            fn from_str(s: &str) -> AppResult<Self> {
                let wanted = s.trim();
                $ty::ALL
                    .iter()
                    .copied()
                    .find(|value| value.as_str().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| AppError::bad_request(format!("Unknown {}: {}", $label, s)))
            }
        }

        impl<'de> serde::Deserialize<'de> for $ty {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse::<$ty>().map_err(|_| {
                    serde::de::Error::custom(format!("Unknown {}: {}", $label, raw))
                })
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema, DbEnum)]
#[db_enum(existing_type_path = "crate::schema::sql_types::MemberType")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemberType {
    Member,
    Guest,
}

string_enum!(MemberType, "MemberType" {
    Member => "MEMBER",
    Guest => "GUEST",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema, DbEnum)]
#[db_enum(existing_type_path = "crate::schema::sql_types::ClubCategory")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClubCategory {
    Study,
    Hobby,
    Sports,
    Travel,
    Culture,
    Food,
    Party,
    Work,
    Other,
}

string_enum!(ClubCategory, "ClubCategory" {
    Study => "STUDY",
    Hobby => "HOBBY",
    Sports => "SPORTS",
    Travel => "TRAVEL",
    Culture => "CULTURE",
    Food => "FOOD",
    Party => "PARTY",
    Work => "WORK",
    Other => "OTHER",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema, DbEnum)]
#[db_enum(existing_type_path = "crate::schema::sql_types::EventType")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    OneTime,
    ShortTerm,
    LongTerm,
}

string_enum!(EventType, "EventType" {
    OneTime => "ONE_TIME",
    ShortTerm => "SHORT_TERM",
    LongTerm => "LONG_TERM",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema, DbEnum)]
#[db_enum(existing_type_path = "crate::schema::sql_types::ClubMemberRole")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClubMemberRole {
    Participant,
    Manager,
    Host,
}

string_enum!(ClubMemberRole, "ClubMemberRole" {
    Participant => "PARTICIPANT",
    Manager => "MANAGER",
    Host => "HOST",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema, DbEnum)]
#[db_enum(existing_type_path = "crate::schema::sql_types::ClubMemberState")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClubMemberState {
    Invited,
    Joining,
    Applying,
    Withdrawn,
}

string_enum!(ClubMemberState, "ClubMemberState" {
    Invited => "INVITED",
    Joining => "JOINING",
    Applying => "APPLYING",
    Withdrawn => "WITHDRAWN",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema, DbEnum)]
#[db_enum(existing_type_path = "crate::schema::sql_types::CheckListItemCategory")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckListItemCategory {
    Preparation,
    Reservation,
    PreWork,
    Etc,
}

string_enum!(CheckListItemCategory, "CheckListItemCategory" {
    Preparation => "PREPARATION",
    Reservation => "RESERVATION",
    PreWork => "PRE_WORK",
    Etc => "ETC",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema, DbEnum)]
#[db_enum(existing_type_path = "crate::schema::sql_types::FriendStatus")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FriendStatus {
    Pending,
    Accepted,
    Rejected,
}

string_enum!(FriendStatus, "FriendStatus" {
    Pending => "PENDING",
    Accepted => "ACCEPTED",
    Rejected => "REJECTED",
});

/// Friend list filter, relative to the requesting member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FriendStatusFilter {
    Accepted,
    /// Pending requests I sent
    Sent,
    /// Pending requests sent to me
    Received,
}

string_enum!(FriendStatusFilter, "FriendStatusFilter" {
    Accepted => "ACCEPTED",
    Sent => "SENT",
    Received => "RECEIVED",
});

/// Outcome of applying to a club through an invitation link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClubApplyResult {
    Success,
    AlreadyJoined,
    AlreadyApplying,
    AlreadyInvited,
    TokenExpired,
    TokenInvalid,
}

string_enum!(ClubApplyResult, "ClubApplyResult" {
    Success => "SUCCESS",
    AlreadyJoined => "ALREADY_JOINED",
    AlreadyApplying => "ALREADY_APPLYING",
    AlreadyInvited => "ALREADY_INVITED",
    TokenExpired => "TOKEN_EXPIRED",
    TokenInvalid => "TOKEN_INVALID",
});

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("one_time".parse::<EventType>().unwrap(), EventType::OneTime);
        assert_eq!("Pre_Work".parse::<CheckListItemCategory>().unwrap(), CheckListItemCategory::PreWork);
        assert_eq!(" host ".parse::<ClubMemberRole>().unwrap(), ClubMemberRole::Host);
    }

    #[test]
    fn test_unknown_value_is_bad_request() {
        match "dancing".parse::<ClubCategory>() {
            Err(AppError::BadRequest { message }) => {
                assert_eq!(message, "Unknown ClubCategory: dancing")
            }
            other => panic!("Expected BadRequest, got {other:?}"),
        }
    }

    #[test]
    fn test_serde_uses_screaming_snake_case() {
        assert_eq!(serde_json::to_string(&EventType::ShortTerm).unwrap(), "\"SHORT_TERM\"");
        let parsed: ClubMemberState = serde_json::from_str("\"applying\"").unwrap();
        assert_eq!(parsed, ClubMemberState::Applying);
        assert!(serde_json::from_str::<FriendStatus>("\"maybe\"").is_err());
    }

    proptest! {
        #[test]
        fn prop_display_matches_serde(index in 0usize..9) {
            let category = ClubCategory::ALL[index];
            let json = serde_json::to_string(&category).unwrap();
            prop_assert_eq!(json, format!("\"{}\"", category));
            prop_assert_eq!(category.to_string().to_lowercase().parse::<ClubCategory>().unwrap(), category);
        }
    }
}
