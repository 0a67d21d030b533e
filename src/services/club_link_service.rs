//! Invitation links: a manager shares a link, anyone can preview the club
//! behind it and a logged in member can apply through it.

use jiff::ToSpan;
use jiff_diesel::ToDiesel;
use uuid::Uuid;

use super::access::ClubAccess;
use super::club_service::ClubInfo;
use crate::error::{AppError, AppResult};
use crate::models::{
    ClubApplyResult, ClubLink, ClubMemberRole, ClubMemberState, INVITE_LINK_TTL_DAYS,
    NewClubLink, NewClubMember, UpdateClubMember,
};
use crate::repositories::Repositories;
use crate::utils::time;

pub fn invite_url(frontend_url: &str, code: &str) -> String {
    format!(
        "{}/clubs/invite?token={code}",
        frontend_url.trim_end_matches('/')
    )
}

#[derive(Clone)]
pub struct ClubLinkService {
    repos: Repositories,
    access: ClubAccess,
    frontend_url: String,
}

impl ClubLinkService {
    pub fn new(repos: Repositories, access: ClubAccess, frontend_url: String) -> Self {
        Self {
            repos,
            access,
            frontend_url,
        }
    }

    /// Returns the current link of the club, creating one when none is valid.
    pub async fn issue(&self, actor_id: i64, club_id: i64) -> AppResult<String> {
        self.access.require_manager(club_id, actor_id).await?;

        let now = time::now();
        if let Some(link) = self.repos.club_links.find_latest_valid(club_id, now).await? {
            return Ok(invite_url(&self.frontend_url, &link.invite_code));
        }

        let expires_at = now
            .checked_add(INVITE_LINK_TTL_DAYS.days())
            .map_err(|e| AppError::Internal {
                source: anyhow::anyhow!("Invite expiry out of range: {e}"),
            })?;
        let link = self
            .repos
            .club_links
            .create(NewClubLink {
                club_id,
                invite_code: Uuid::new_v4().to_string(),
                created_at: now.to_diesel(),
                expires_at: expires_at.to_diesel(),
            })
            .await?;

        tracing::info!(club_id, actor_id, "Invitation link created");
        Ok(invite_url(&self.frontend_url, &link.invite_code))
    }

    pub async fn current(&self, actor_id: i64, club_id: i64) -> AppResult<String> {
        self.access.require_manager(club_id, actor_id).await?;
        self.repos
            .club_links
            .find_latest_valid(club_id, time::now())
            .await?
            .map(|link| invite_url(&self.frontend_url, &link.invite_code))
            .ok_or_else(|| AppError::bad_request("no valid invitation link"))
    }

    /// The link behind `code`, or the apply result that describes why it is unusable.
    async fn resolve(&self, code: &str) -> AppResult<Result<ClubLink, ClubApplyResult>> {
        match self.repos.club_links.find_by_code(code).await? {
            None => Ok(Err(ClubApplyResult::TokenInvalid)),
            Some(link) if link.is_expired_at(time::now()) => Ok(Err(ClubApplyResult::TokenExpired)),
            Some(link) => Ok(Ok(link)),
        }
    }

    pub async fn preview(&self, code: &str) -> AppResult<ClubInfo> {
        let link = match self.resolve(code).await? {
            Ok(link) => link,
            Err(ClubApplyResult::TokenExpired) => {
                return Err(AppError::bad_request("invitation link expired"));
            }
            Err(_) => return Err(AppError::bad_request("invalid invitation link")),
        };

        let club = self.access.active_club(link.club_id).await?;
        let leader_name = match club.leader_id {
            Some(id) => self.repos.members.find_by_id(id).await?.map(|m| m.nickname),
            None => None,
        };
        Ok(ClubInfo { club, leader_name })
    }

    /// Applies to the club behind the link. Anything but `Success` leaves data untouched.
    pub async fn apply(&self, member_id: i64, code: &str) -> AppResult<ClubApplyResult> {
        let link = match self.resolve(code).await? {
            Ok(link) => link,
            Err(result) => return Ok(result),
        };
        let club = self.access.active_club(link.club_id).await?;

        match self.access.membership(club.id, member_id).await? {
            Some(existing) => match existing.state {
                ClubMemberState::Joining => Ok(ClubApplyResult::AlreadyJoined),
                ClubMemberState::Applying => Ok(ClubApplyResult::AlreadyApplying),
                ClubMemberState::Invited => Ok(ClubApplyResult::AlreadyInvited),
                ClubMemberState::Withdrawn => {
                    self.repos
                        .club_members
                        .update(
                            existing.id,
                            UpdateClubMember {
                                role: Some(ClubMemberRole::Participant),
                                state: Some(ClubMemberState::Applying),
                            },
                        )
                        .await?;
                    Ok(ClubApplyResult::Success)
                }
            },
            None => {
                self.repos
                    .club_members
                    .create(NewClubMember {
                        club_id: club.id,
                        member_id,
                        role: ClubMemberRole::Participant,
                        state: ClubMemberState::Applying,
                    })
                    .await?;
                Ok(ClubApplyResult::Success)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{club, member};

    fn service(repos: &Repositories) -> ClubLinkService {
        ClubLinkService::new(
            repos.clone(),
            ClubAccess::new(repos.clubs.clone(), repos.club_members.clone()),
            "http://front.end/".to_string(),
        )
    }

    fn code_of(link: &str) -> &str {
        link.rsplit("token=").next().unwrap_or_default()
    }

    #[test]
    fn test_invite_url() {
        assert_eq!(
            invite_url("http://localhost:5173/", "abc"),
            "http://localhost:5173/clubs/invite?token=abc"
        );
    }

    #[tokio::test]
    async fn test_issue_reuses_valid_link() {
        let repos = Repositories::in_memory();
        let svc = service(&repos);
        let host = member(&repos, "host").await;
        let club = club(&repos, host.id, true).await;

        let first = svc.issue(host.id, club.id).await.unwrap();
        let second = svc.issue(host.id, club.id).await.unwrap();
        assert_eq!(first, second);
        assert!(first.starts_with("http://front.end/clubs/invite?token="));
        assert_eq!(svc.current(host.id, club.id).await.unwrap(), first);

        let outsider = member(&repos, "outsider").await;
        assert!(matches!(
            svc.issue(outsider.id, club.id).await,
            Err(AppError::Forbidden { .. })
        ));
    }

    #[tokio::test]
    async fn test_apply_outcomes() {
        let repos = Repositories::in_memory();
        let svc = service(&repos);
        let host = member(&repos, "host").await;
        let guest = member(&repos, "guest").await;
        let club = club(&repos, host.id, true).await;
        let link = svc.issue(host.id, club.id).await.unwrap();
        let code = code_of(&link);

        assert_eq!(svc.apply(guest.id, "nope").await.unwrap(), ClubApplyResult::TokenInvalid);
        assert_eq!(svc.apply(guest.id, code).await.unwrap(), ClubApplyResult::Success);
        assert_eq!(
            svc.apply(guest.id, code).await.unwrap(),
            ClubApplyResult::AlreadyApplying
        );
        assert_eq!(
            svc.apply(host.id, code).await.unwrap(),
            ClubApplyResult::AlreadyJoined
        );

        let preview = svc.preview(code).await.unwrap();
        assert_eq!(preview.club.id, club.id);
        assert_eq!(preview.leader_name.as_deref(), Some("host"));
        assert!(matches!(
            svc.preview("missing").await,
            Err(AppError::BadRequest { .. })
        ));
    }

    #[tokio::test]
    async fn test_expired_link() {
        let repos = Repositories::in_memory();
        let svc = service(&repos);
        let host = member(&repos, "host").await;
        let club = club(&repos, host.id, true).await;
        let past = jiff::civil::date(2020, 1, 1).at(0, 0, 0, 0);
        repos
            .club_links
            .create(NewClubLink {
                club_id: club.id,
                invite_code: "old".to_string(),
                created_at: past.to_diesel(),
                expires_at: past.to_diesel(),
            })
            .await
            .unwrap();

        assert_eq!(
            svc.apply(host.id, "old").await.unwrap(),
            ClubApplyResult::TokenExpired
        );
        assert!(svc.current(host.id, club.id).await.is_err());
    }
}
