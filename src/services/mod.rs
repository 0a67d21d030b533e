//! Service layer for business logic operations.
//!
//! Services encapsulate business logic and coordinate between
//! repositories, object storage and handlers.

pub mod access;
mod checklist_service;
mod club_link_service;
mod club_member_service;
mod club_service;
mod friend_service;
mod member_service;
mod my_club_service;
mod preset_service;
mod schedule_service;

#[cfg(test)]
pub(crate) mod test_support;

use std::sync::Arc;

pub use access::ClubAccess;
pub use checklist_service::{CheckListService, CheckListView};
pub use club_link_service::{ClubLinkService, invite_url};
pub use club_member_service::{ClubMemberService, ClubMemberView};
pub use club_service::{
    ClubInfo, ClubService, CreateClubInput, MAX_CLUB_IMAGE_BYTES, UpdateClubInput,
    dedup_last_wins, ensure_date_order,
};
pub use friend_service::{FriendService, FriendView, matches_filter};
pub use member_service::{
    GuestSession, IssuedToken, MemberService, MemberSession, ProfileUpdate, RegisterInput,
    generate_api_key, generate_tag,
};
pub use my_club_service::{MyClub, MyClubService};
pub use preset_service::{PlatformPreset, PlatformPresetItem, PlatformPresets, PresetService};
pub use schedule_service::{
    ScheduleInput, ScheduleService, ScheduleView, ScheduleWithClub, date_range,
    ensure_datetime_order,
};

use crate::config::Settings;
use crate::error::{AppError, AppResult};
use crate::repositories::Repositories;
use crate::storage::ObjectStorage;

/// An uploaded file as received from a multipart form.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

impl ImageUpload {
    /// Accepts `image/*` content of at most `max_bytes`.
    pub fn ensure_image(&self, max_bytes: usize) -> AppResult<()> {
        if !self.content_type.starts_with("image/") {
            return Err(AppError::bad_request(format!(
                "only image uploads are allowed, got '{}'",
                self.content_type
            )));
        }
        if self.bytes.len() > max_bytes {
            return Err(AppError::PayloadTooLarge {
                message: format!("image exceeds {max_bytes} bytes"),
            });
        }
        Ok(())
    }
}

/// Aggregates all services for convenient access.
///
/// This struct is designed to be used as Axum application state.
/// Cloning is cheap since repositories and storage sit behind `Arc`.
#[derive(Clone)]
pub struct Services {
    pub members: MemberService,
    pub friends: FriendService,
    pub clubs: ClubService,
    pub club_links: ClubLinkService,
    pub club_members: ClubMemberService,
    pub my_clubs: MyClubService,
    pub schedules: ScheduleService,
    pub check_lists: CheckListService,
    pub presets: PresetService,
}

impl Services {
    pub fn new(
        repos: Repositories,
        storage: Arc<dyn ObjectStorage>,
        settings: &Settings,
    ) -> AppResult<Self> {
        let access = ClubAccess::new(repos.clubs.clone(), repos.club_members.clone());
        let platform = Arc::new(PlatformPresets::bundled()?);

        Ok(Self {
            members: MemberService::new(repos.clone(), storage.clone(), settings.jwt.clone()),
            friends: FriendService::new(repos.clone()),
            clubs: ClubService::new(repos.clone(), access.clone(), storage),
            club_links: ClubLinkService::new(
                repos.clone(),
                access.clone(),
                settings.application.frontend_url.clone(),
            ),
            club_members: ClubMemberService::new(repos.clone(), access.clone()),
            my_clubs: MyClubService::new(repos.clone(), access.clone()),
            schedules: ScheduleService::new(repos.clone(), access.clone()),
            check_lists: CheckListService::new(repos.clone(), access),
            presets: PresetService::new(repos, platform),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_image_checks_type_and_size() {
        let png = ImageUpload {
            bytes: vec![0; 8],
            content_type: "image/png".to_string(),
        };
        assert!(png.ensure_image(8).is_ok());
        assert!(matches!(
            png.ensure_image(7),
            Err(AppError::PayloadTooLarge { .. })
        ));

        let pdf = ImageUpload {
            bytes: vec![0; 8],
            content_type: "application/pdf".to_string(),
        };
        assert!(matches!(pdf.ensure_image(8), Err(AppError::BadRequest { .. })));
    }
}
