use diesel::prelude::*;
use jiff_diesel::DateTime;

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = crate::schema::schedules)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Schedule {
    pub id: i64,
    pub club_id: i64,
    pub title: String,
    pub content: String,
    pub start_date: DateTime,
    pub end_date: DateTime,
    pub spot: String,
    pub is_active: bool,
    pub created_at: DateTime,
}

impl Schedule {
    /// `start < range_end && end >= range_start`
    pub fn overlaps(&self, range_start: jiff::civil::DateTime, range_end: jiff::civil::DateTime) -> bool {
        self.start_date.to_jiff() < range_end && self.end_date.to_jiff() >= range_start
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::schedules)]
pub struct NewSchedule {
    pub club_id: i64,
    pub title: String,
    pub content: String,
    pub start_date: DateTime,
    pub end_date: DateTime,
    pub spot: String,
}

#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = crate::schema::schedules)]
pub struct UpdateSchedule {
    pub title: Option<String>,
    pub content: Option<String>,
    pub start_date: Option<DateTime>,
    pub end_date: Option<DateTime>,
    pub spot: Option<String>,
    pub is_active: Option<bool>,
}
