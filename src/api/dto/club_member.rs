//! Club membership DTOs, both the host's view and the member's own view.

use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::models::{
    Club, ClubCategory, ClubMemberRole, ClubMemberState, EventType, MemberType,
};
use crate::services::{ClubMemberView, MyClub};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct MemberInvitation {
    #[validate(email(message = "invalid email"))]
    pub email: String,
    pub role: ClubMemberRole,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct InviteMembersRequest {
    #[validate(nested)]
    pub members: Vec<MemberInvitation>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChangeRoleRequest {
    pub role: ClubMemberRole,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ClubMemberStateQuery {
    /// Withdrawn members are only listed when asked for explicitly
    #[param(value_type = Option<String>)]
    pub state: Option<ClubMemberState>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClubMemberInfo {
    pub club_member_id: i64,
    pub member_id: i64,
    pub nickname: String,
    pub tag: String,
    pub role: ClubMemberRole,
    pub email: Option<String>,
    pub member_type: MemberType,
    pub profile_image_url: Option<String>,
    pub state: ClubMemberState,
}

impl From<ClubMemberView> for ClubMemberInfo {
    fn from(view: ClubMemberView) -> Self {
        Self {
            club_member_id: view.membership.id,
            member_id: view.member.id,
            nickname: view.member.nickname,
            tag: view.member.tag,
            role: view.membership.role,
            email: view.member.email,
            member_type: view.member.member_type,
            profile_image_url: view.member.profile_image_url,
            state: view.membership.state,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ClubMembersResponse {
    pub members: Vec<ClubMemberInfo>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClubListItem {
    pub club_id: i64,
    pub club_name: String,
    pub bio: Option<String>,
    pub category: ClubCategory,
    pub image_url: Option<String>,
    pub main_spot: String,
    pub event_type: EventType,
    #[schema(value_type = String, format = Date)]
    pub start_date: Date,
    #[schema(value_type = String, format = Date)]
    pub end_date: Date,
    pub is_public: bool,
    pub my_role: ClubMemberRole,
    pub my_state: ClubMemberState,
}

impl From<MyClub> for ClubListItem {
    fn from(MyClub { club, membership }: MyClub) -> Self {
        Self {
            club_id: club.id,
            club_name: club.name,
            bio: club.bio,
            category: club.category,
            image_url: club.image_url,
            main_spot: club.main_spot,
            event_type: club.event_type,
            start_date: club.start_date.to_jiff(),
            end_date: club.end_date.to_jiff(),
            is_public: club.is_public,
            my_role: membership.role,
            my_state: membership.state,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MyClubListResponse {
    pub clubs: Vec<ClubListItem>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MyInfoInClub {
    pub club_member_id: i64,
    pub club_id: i64,
    pub club_name: String,
    pub role: ClubMemberRole,
    pub state: ClubMemberState,
}

impl From<MyClub> for MyInfoInClub {
    fn from(MyClub { club, membership }: MyClub) -> Self {
        Self {
            club_member_id: membership.id,
            club_id: club.id,
            club_name: club.name,
            role: membership.role,
            state: membership.state,
        }
    }
}

/// Result of a membership transition started by the member.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MyClubResponse {
    pub club_id: i64,
    pub club_name: String,
}

impl From<Club> for MyClubResponse {
    fn from(club: Club) -> Self {
        Self {
            club_id: club.id,
            club_name: club.name,
        }
    }
}
