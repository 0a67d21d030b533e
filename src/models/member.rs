use diesel::prelude::*;
use jiff_diesel::DateTime;

use super::MemberType;

/// Member model for reading from database
#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = crate::schema::members)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Member {
    pub id: i64,
    pub nickname: String,
    /// Argon2 PHC string
    pub password: String,
    pub member_type: MemberType,
    pub tag: String,
    /// Lowercased; `None` for guests
    pub email: Option<String>,
    pub bio: Option<String>,
    pub profile_image_url: Option<String>,
    /// Long-lived key that doubles as the refresh token
    pub api_key: String,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl Member {
    pub fn is_guest(&self) -> bool {
        self.member_type == MemberType::Guest
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::members)]
pub struct NewMember {
    pub nickname: String,
    pub password: String,
    pub member_type: MemberType,
    pub tag: String,
    pub email: Option<String>,
    pub bio: Option<String>,
    pub api_key: String,
}

/// Partial update; `None` leaves the column untouched
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = crate::schema::members)]
pub struct UpdateMember {
    pub nickname: Option<String>,
    pub password: Option<String>,
    pub tag: Option<String>,
    pub bio: Option<String>,
    pub profile_image_url: Option<String>,
    pub updated_at: Option<DateTime>,
}
