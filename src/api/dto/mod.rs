//! Data Transfer Objects for API requests and responses.
//!
//! DTOs are organized by domain and serialize in camelCase; conversions from
//! service views live next to each response type.

mod checklist;
mod club;
mod club_member;
mod error;
mod friend;
mod health;
mod member;
mod pagination;
mod preset;
mod schedule;

pub use checklist::{
    CheckListDto, CheckListItemDto, CheckListItemRequest, CreateCheckListRequest,
    ItemAssignDto, ItemAssignRequest, UpdateCheckListRequest,
};
pub use club::{
    ApplyResultResponse, ClubCreatedResponse, ClubInfoResponse, ClubMemberGrant,
    ClubSearchQuery, CreateClubRequest, InvitationLinkResponse, SimpleClubInfoResponse,
    SimpleClubInfoWithoutLeader, UpdateClubRequest,
};
pub use club_member::{
    ChangeRoleRequest, ClubListItem, ClubMemberInfo, ClubMemberStateQuery, ClubMembersResponse,
    InviteMembersRequest, MemberInvitation, MyClubListResponse, MyClubResponse, MyInfoInClub,
};
pub use error::ErrorResponse;
pub use friend::{FriendDto, FriendListQuery, FriendMemberDto, FriendRequest};
pub use health::{DatabaseHealth, HealthResponse, HealthStatus};
pub use member::{
    AuthResponse, GuestAuthResponse, GuestRequest, LoginRequest, MemberProfileResponse,
    RefreshRequest, RegisterRequest, TokenResponse, UpdateProfileRequest, VerifyPasswordRequest,
    VerifyPasswordResponse, WithdrawResponse,
};
pub use pagination::{PagedResponse, PaginationMeta, PaginationParams};
pub use preset::{PlatformPresetQuery, PresetDto, PresetItemDto, PresetItemRequest, PresetRequest};
pub use schedule::{
    CreateScheduleRequest, ScheduleDetailDto, ScheduleDto, ScheduleRangeQuery,
    ScheduleWithClubDto, UpdateScheduleRequest,
};
