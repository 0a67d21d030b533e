use diesel::prelude::*;
use jiff_diesel::DateTime;

/// Days an invitation link stays valid.
pub const INVITE_LINK_TTL_DAYS: i64 = 7;

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = crate::schema::club_links)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ClubLink {
    pub id: i64,
    pub club_id: i64,
    pub invite_code: String,
    pub created_at: DateTime,
    pub expires_at: DateTime,
}

impl ClubLink {
    pub fn is_expired_at(&self, now: jiff::civil::DateTime) -> bool {
        self.expires_at.to_jiff() <= now
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::club_links)]
pub struct NewClubLink {
    pub club_id: i64,
    pub invite_code: String,
    pub created_at: DateTime,
    pub expires_at: DateTime,
}
