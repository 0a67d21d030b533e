use diesel::prelude::*;
use jiff_diesel::{Date, DateTime};

use super::{ClubCategory, EventType};

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = crate::schema::clubs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Club {
    pub id: i64,
    pub name: String,
    pub bio: Option<String>,
    pub category: ClubCategory,
    pub main_spot: String,
    pub maximum_capacity: i32,
    pub recruiting_status: bool,
    pub event_type: EventType,
    pub start_date: Date,
    pub end_date: Date,
    pub image_url: Option<String>,
    pub is_public: bool,
    pub leader_id: Option<i64>,
    /// `false` once the club is soft deleted
    pub state: bool,
    pub created_at: DateTime,
}

impl Club {
    /// Not deleted and not past its end date.
    pub fn is_active_on(&self, today: jiff::civil::Date) -> bool {
        self.state && self.end_date.to_jiff() >= today
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::clubs)]
pub struct NewClub {
    pub name: String,
    pub bio: Option<String>,
    pub category: ClubCategory,
    pub main_spot: String,
    pub maximum_capacity: i32,
    pub recruiting_status: bool,
    pub event_type: EventType,
    pub start_date: Date,
    pub end_date: Date,
    pub image_url: Option<String>,
    pub is_public: bool,
    pub leader_id: Option<i64>,
}

#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = crate::schema::clubs)]
pub struct UpdateClub {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub category: Option<ClubCategory>,
    pub main_spot: Option<String>,
    pub maximum_capacity: Option<i32>,
    pub recruiting_status: Option<bool>,
    pub event_type: Option<EventType>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub image_url: Option<String>,
    pub is_public: Option<bool>,
    pub state: Option<bool>,
}

impl UpdateClub {
    /// `true` when no column would change.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.bio.is_none()
            && self.category.is_none()
            && self.main_spot.is_none()
            && self.maximum_capacity.is_none()
            && self.recruiting_status.is_none()
            && self.event_type.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
            && self.image_url.is_none()
            && self.is_public.is_none()
            && self.state.is_none()
    }
}

/// Filters of the public club search. Text filters are case-insensitive substrings.
#[derive(Debug, Clone, Default)]
pub struct ClubSearch {
    pub name: Option<String>,
    pub main_spot: Option<String>,
    pub category: Option<ClubCategory>,
    pub event_type: Option<EventType>,
}

impl ClubSearch {
    /// In-process equivalent of the SQL search predicate.
    pub fn matches(&self, club: &Club) -> bool {
        fn contains(haystack: &str, needle: &Option<String>) -> bool {
            needle
                .as_ref()
                .is_none_or(|n| haystack.to_lowercase().contains(&n.to_lowercase()))
        }

        club.is_public
            && club.state
            && contains(&club.name, &self.name)
            && contains(&club.main_spot, &self.main_spot)
            && self.category.is_none_or(|c| c == club.category)
            && self.event_type.is_none_or(|e| e == club.event_type)
    }
}
