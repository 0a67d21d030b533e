//! Friend DTOs.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::models::{FriendStatus, FriendStatusFilter, Member};
use crate::services::FriendView;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FriendListQuery {
    /// ACCEPTED, SENT or RECEIVED; every relation when omitted
    #[param(value_type = Option<String>)]
    pub status: Option<FriendStatusFilter>,
}

/// Field name kept in snake case to match existing clients.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct FriendRequest {
    #[validate(email(message = "invalid email"))]
    pub friend_email: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FriendDto {
    pub friend_id: i64,
    pub friend_member_id: i64,
    pub friend_nickname: String,
    pub friend_bio: Option<String>,
    pub friend_profile_image_url: Option<String>,
    pub status: FriendStatus,
}

impl From<FriendView> for FriendDto {
    fn from(view: FriendView) -> Self {
        Self {
            friend_id: view.friend.id,
            friend_member_id: view.other.id,
            friend_nickname: view.other.nickname,
            friend_bio: view.other.bio,
            friend_profile_image_url: view.other.profile_image_url,
            status: view.friend.status,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FriendMemberDto {
    pub member_id: i64,
    pub nickname: String,
    pub email: Option<String>,
}

impl From<Member> for FriendMemberDto {
    fn from(member: Member) -> Self {
        Self {
            member_id: member.id,
            nickname: member.nickname,
            email: member.email,
        }
    }
}
