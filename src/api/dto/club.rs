//! Club and invitation link DTOs.

use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::models::{Club, ClubApplyResult, ClubCategory, ClubMemberRole, ClubSearch, EventType};
use crate::services::{ClubInfo, CreateClubInput, UpdateClubInput};

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ClubMemberGrant {
    /// Member id
    pub id: i64,
    pub role: ClubMemberRole,
}

/// The `data` part of a club creation request.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateClubRequest {
    #[validate(length(min = 1, max = 50, message = "name must be 1-50 characters"))]
    pub name: String,
    pub bio: Option<String>,
    pub category: ClubCategory,
    #[validate(length(min = 1, message = "main spot is required"))]
    pub main_spot: String,
    #[validate(range(min = 1, message = "maximum capacity must be at least 1"))]
    pub maximum_capacity: i32,
    #[serde(default = "default_true")]
    pub recruiting_status: bool,
    pub event_type: EventType,
    #[schema(value_type = String, format = Date, example = "2025-07-01")]
    pub start_date: Date,
    #[schema(value_type = String, format = Date, example = "2025-07-31")]
    pub end_date: Date,
    pub is_public: bool,
    #[serde(default)]
    pub club_members: Vec<ClubMemberGrant>,
}

impl From<CreateClubRequest> for CreateClubInput {
    fn from(req: CreateClubRequest) -> Self {
        Self {
            name: req.name,
            bio: req.bio,
            category: req.category,
            main_spot: req.main_spot,
            maximum_capacity: req.maximum_capacity,
            recruiting_status: req.recruiting_status,
            event_type: req.event_type,
            start_date: req.start_date,
            end_date: req.end_date,
            is_public: req.is_public,
            invitees: req
                .club_members
                .into_iter()
                .map(|grant| (grant.id, grant.role))
                .collect(),
        }
    }
}

/// The `data` part of a club update; absent fields stay untouched.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClubRequest {
    #[validate(length(min = 1, max = 50, message = "name must be 1-50 characters"))]
    pub name: Option<String>,
    pub bio: Option<String>,
    pub category: Option<ClubCategory>,
    pub main_spot: Option<String>,
    #[validate(range(min = 1, message = "maximum capacity must be at least 1"))]
    pub maximum_capacity: Option<i32>,
    pub recruiting_status: Option<bool>,
    pub event_type: Option<EventType>,
    #[schema(value_type = Option<String>, format = Date)]
    pub start_date: Option<Date>,
    #[schema(value_type = Option<String>, format = Date)]
    pub end_date: Option<Date>,
    pub is_public: Option<bool>,
}

impl From<UpdateClubRequest> for UpdateClubInput {
    fn from(req: UpdateClubRequest) -> Self {
        Self {
            name: req.name,
            bio: req.bio,
            category: req.category,
            main_spot: req.main_spot,
            maximum_capacity: req.maximum_capacity,
            recruiting_status: req.recruiting_status,
            event_type: req.event_type,
            start_date: req.start_date,
            end_date: req.end_date,
            is_public: req.is_public,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClubCreatedResponse {
    pub club_id: i64,
    pub leader_id: Option<i64>,
}

impl From<Club> for ClubCreatedResponse {
    fn from(club: Club) -> Self {
        Self {
            club_id: club.id,
            leader_id: club.leader_id,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClubInfoResponse {
    pub club_id: i64,
    pub name: String,
    pub bio: Option<String>,
    pub category: ClubCategory,
    pub main_spot: String,
    pub maximum_capacity: i32,
    pub recruiting_status: bool,
    pub event_type: EventType,
    #[schema(value_type = String, format = Date)]
    pub start_date: Date,
    #[schema(value_type = String, format = Date)]
    pub end_date: Date,
    pub is_public: bool,
    pub image_url: Option<String>,
    pub leader_id: Option<i64>,
    pub leader_name: Option<String>,
}

impl From<ClubInfo> for ClubInfoResponse {
    fn from(info: ClubInfo) -> Self {
        let club = info.club;
        Self {
            club_id: club.id,
            name: club.name,
            bio: club.bio,
            category: club.category,
            main_spot: club.main_spot,
            maximum_capacity: club.maximum_capacity,
            recruiting_status: club.recruiting_status,
            event_type: club.event_type,
            start_date: club.start_date.to_jiff(),
            end_date: club.end_date.to_jiff(),
            is_public: club.is_public,
            image_url: club.image_url,
            leader_id: club.leader_id,
            leader_name: info.leader_name,
        }
    }
}

/// Preview of the club behind an invitation link.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SimpleClubInfoResponse {
    pub club_id: i64,
    pub name: String,
    pub category: ClubCategory,
    pub image_url: Option<String>,
    pub main_spot: String,
    pub event_type: EventType,
    #[schema(value_type = String, format = Date)]
    pub start_date: Date,
    #[schema(value_type = String, format = Date)]
    pub end_date: Date,
    pub leader_id: Option<i64>,
    pub leader_name: Option<String>,
}

impl From<ClubInfo> for SimpleClubInfoResponse {
    fn from(info: ClubInfo) -> Self {
        let club = info.club;
        Self {
            club_id: club.id,
            name: club.name,
            category: club.category,
            image_url: club.image_url,
            main_spot: club.main_spot,
            event_type: club.event_type,
            start_date: club.start_date.to_jiff(),
            end_date: club.end_date.to_jiff(),
            leader_id: club.leader_id,
            leader_name: info.leader_name,
        }
    }
}

/// Entry of the public club listing.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SimpleClubInfoWithoutLeader {
    pub club_id: i64,
    pub name: String,
    pub category: ClubCategory,
    pub image_url: Option<String>,
    pub main_spot: String,
    pub event_type: EventType,
    #[schema(value_type = String, format = Date)]
    pub start_date: Date,
    #[schema(value_type = String, format = Date)]
    pub end_date: Date,
    pub bio: Option<String>,
}

impl From<Club> for SimpleClubInfoWithoutLeader {
    fn from(club: Club) -> Self {
        Self {
            club_id: club.id,
            name: club.name,
            category: club.category,
            image_url: club.image_url,
            main_spot: club.main_spot,
            event_type: club.event_type,
            start_date: club.start_date.to_jiff(),
            end_date: club.end_date.to_jiff(),
            bio: club.bio,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ClubSearchQuery {
    /// Case-insensitive substring of the club name
    pub name: Option<String>,
    /// Case-insensitive substring of the main spot
    pub main_spot: Option<String>,
    #[param(value_type = Option<String>)]
    pub category: Option<ClubCategory>,
    #[param(value_type = Option<String>)]
    pub event_type: Option<EventType>,
}

impl From<ClubSearchQuery> for ClubSearch {
    fn from(query: ClubSearchQuery) -> Self {
        fn non_blank(value: Option<String>) -> Option<String> {
            value.filter(|v| !v.trim().is_empty())
        }

        Self {
            name: non_blank(query.name),
            main_spot: non_blank(query.main_spot),
            category: query.category,
            event_type: query.event_type,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct InvitationLinkResponse {
    #[schema(example = "https://moim.io/clubs/invite?token=0f8f...")]
    pub link: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApplyResultResponse {
    pub result: ClubApplyResult,
}
