use std::collections::HashMap;

use super::access::{ClubAccess, is_active_host};
use super::club_service::dedup_last_wins;
use crate::error::{AppError, AppResult};
use crate::models::{
    ClubMember, ClubMemberRole, ClubMemberState, Member, NewClubMember, UpdateClubMember,
};
use crate::repositories::Repositories;
use crate::utils::time;

#[derive(Debug, Clone)]
pub struct ClubMemberView {
    pub membership: ClubMember,
    pub member: Member,
}

fn ensure_grantable(role: ClubMemberRole) -> AppResult<()> {
    if role == ClubMemberRole::Host {
        return Err(AppError::bad_request("HOST role cannot be granted"));
    }
    Ok(())
}

/// Transition for approving or rejecting an application.
fn ensure_applying(membership: &ClubMember) -> AppResult<()> {
    match membership.state {
        ClubMemberState::Applying => Ok(()),
        ClubMemberState::Joining => Err(AppError::bad_request("already joined")),
        _ => Err(AppError::bad_request("not applying")),
    }
}

#[derive(Clone)]
pub struct ClubMemberService {
    repos: Repositories,
    access: ClubAccess,
}

impl ClubMemberService {
    pub fn new(repos: Repositories, access: ClubAccess) -> Self {
        Self { repos, access }
    }

    async fn target(&self, club_id: i64, member_id: i64) -> AppResult<ClubMember> {
        self.access
            .membership(club_id, member_id)
            .await?
            .ok_or_else(|| AppError::not_found("club_member", "member_id", member_id))
    }

    /// Invites members by email. Returns the rows that were created or re-invited.
    pub async fn invite(
        &self,
        actor_id: i64,
        club_id: i64,
        invitations: Vec<(String, ClubMemberRole)>,
    ) -> AppResult<Vec<ClubMember>> {
        let club = self.access.require_host(club_id, actor_id).await?;

        let invitations = dedup_last_wins(
            invitations
                .into_iter()
                .map(|(email, role)| (email.trim().to_lowercase(), role))
                .collect(),
        );

        let existing: HashMap<i64, ClubMember> = self
            .repos
            .club_members
            .list_by_club(club_id)
            .await?
            .into_iter()
            .map(|cm| (cm.member_id, cm))
            .collect();
        let seated = existing.values().filter(|cm| cm.occupies_seat()).count();

        let mut inserts = Vec::new();
        let mut reinvites = Vec::new();
        for (email, role) in invitations {
            ensure_grantable(role)?;
            let member = self
                .repos
                .members
                .find_by_email(&email)
                .await?
                .ok_or_else(|| AppError::not_found("member", "email", &email))?;

            match existing.get(&member.id) {
                Some(row) if row.state == ClubMemberState::Withdrawn => {
                    reinvites.push((row.id, role));
                }
                Some(_) => {}
                None => inserts.push((member.id, role)),
            }
        }

        let added = inserts.len() + reinvites.len();
        if (seated + added) as i64 > i64::from(club.maximum_capacity) {
            return Err(AppError::bad_request("club capacity exceeded"));
        }

        let mut rows = Vec::with_capacity(added);
        for (club_member_id, role) in reinvites {
            rows.push(
                self.repos
                    .club_members
                    .update(
                        club_member_id,
                        UpdateClubMember {
                            role: Some(role),
                            state: Some(ClubMemberState::Invited),
                        },
                    )
                    .await?,
            );
        }
        for (member_id, role) in inserts {
            rows.push(
                self.repos
                    .club_members
                    .create(NewClubMember {
                        club_id,
                        member_id,
                        role,
                        state: ClubMemberState::Invited,
                    })
                    .await?,
            );
        }

        tracing::info!(club_id, invited = rows.len(), "Members invited");
        Ok(rows)
    }

    /// The host removes someone, or a member leaves on their own.
    pub async fn withdraw(&self, actor_id: i64, club_id: i64, member_id: i64) -> AppResult<ClubMember> {
        let club = self.access.active_club(club_id).await?;
        let actor_is_host = is_active_host(&club, actor_id, time::today());

        if actor_id != member_id && !actor_is_host {
            return Err(AppError::forbidden("only the club host can remove members"));
        }
        if club.leader_id == Some(member_id) {
            return Err(AppError::bad_request("the host cannot withdraw"));
        }

        let target = self.target(club_id, member_id).await?;
        self.repos
            .club_members
            .update(
                target.id,
                UpdateClubMember {
                    role: None,
                    state: Some(ClubMemberState::Withdrawn),
                },
            )
            .await
    }

    pub async fn change_role(
        &self,
        actor_id: i64,
        club_id: i64,
        member_id: i64,
        role: ClubMemberRole,
    ) -> AppResult<ClubMember> {
        self.access.require_host(club_id, actor_id).await?;
        if actor_id == member_id {
            return Err(AppError::bad_request("cannot change your own role"));
        }
        ensure_grantable(role)?;

        let target = self.target(club_id, member_id).await?;
        self.repos
            .club_members
            .update(
                target.id,
                UpdateClubMember {
                    role: Some(role),
                    state: None,
                },
            )
            .await
    }

    /// Members of the club; withdrawn ones only when asked for explicitly.
    pub async fn list(
        &self,
        actor_id: i64,
        club_id: i64,
        state: Option<ClubMemberState>,
    ) -> AppResult<Vec<ClubMemberView>> {
        self.access.require_member(club_id, actor_id).await?;

        let rows: Vec<ClubMember> = self
            .repos
            .club_members
            .list_by_club(club_id)
            .await?
            .into_iter()
            .filter(|cm| match state {
                Some(wanted) => cm.state == wanted,
                None => cm.state != ClubMemberState::Withdrawn,
            })
            .collect();

        let ids: Vec<i64> = rows.iter().map(|cm| cm.member_id).collect();
        let mut members: HashMap<i64, Member> = self
            .repos
            .members
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .map(|m| (m.id, m))
            .collect();

        Ok(rows
            .into_iter()
            .filter_map(|membership| {
                let member = members.remove(&membership.member_id)?;
                Some(ClubMemberView { membership, member })
            })
            .collect())
    }

    pub async fn approve(&self, actor_id: i64, club_id: i64, member_id: i64) -> AppResult<ClubMember> {
        self.access.require_manager(club_id, actor_id).await?;
        let target = self.target(club_id, member_id).await?;
        ensure_applying(&target)?;

        self.repos
            .club_members
            .update(
                target.id,
                UpdateClubMember {
                    role: None,
                    state: Some(ClubMemberState::Joining),
                },
            )
            .await
    }

    pub async fn reject(&self, actor_id: i64, club_id: i64, member_id: i64) -> AppResult<()> {
        self.access.require_manager(club_id, actor_id).await?;
        let target = self.target(club_id, member_id).await?;
        ensure_applying(&target)?;
        self.repos.club_members.delete(target.id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{club, join, member};

    fn service(repos: &Repositories) -> ClubMemberService {
        ClubMemberService::new(
            repos.clone(),
            ClubAccess::new(repos.clubs.clone(), repos.club_members.clone()),
        )
    }

    #[tokio::test]
    async fn test_invite_skips_existing_and_reinvites_withdrawn() {
        let repos = Repositories::in_memory();
        let svc = service(&repos);
        let host = member(&repos, "host").await;
        let a = member(&repos, "a").await;
        let b = member(&repos, "b").await;
        let club = club(&repos, host.id, true).await;

        let rows = svc
            .invite(
                host.id,
                club.id,
                vec![
                    ("A@moim.io".to_string(), ClubMemberRole::Participant),
                    ("a@moim.io".to_string(), ClubMemberRole::Manager),
                ],
            )
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].member_id, a.id);
        assert_eq!(rows[0].role, ClubMemberRole::Manager);

        let again = svc
            .invite(host.id, club.id, vec![("a@moim.io".to_string(), ClubMemberRole::Participant)])
            .await
            .unwrap();
        assert!(again.is_empty());

        join(&repos, club.id, b.id, ClubMemberState::Withdrawn).await;
        let back = svc
            .invite(host.id, club.id, vec![("b@moim.io".to_string(), ClubMemberRole::Participant)])
            .await
            .unwrap();
        assert_eq!(back[0].state, ClubMemberState::Invited);
    }

    #[tokio::test]
    async fn test_invite_enforces_capacity_and_roles() {
        let repos = Repositories::in_memory();
        let svc = service(&repos);
        let host = member(&repos, "host").await;
        let club = club(&repos, host.id, true).await; // capacity 3, host seated
        for name in ["a", "b", "c"] {
            member(&repos, name).await;
        }

        let too_many = svc
            .invite(
                host.id,
                club.id,
                ["a", "b", "c"]
                    .iter()
                    .map(|n| (format!("{n}@moim.io"), ClubMemberRole::Participant))
                    .collect(),
            )
            .await;
        assert!(matches!(too_many, Err(AppError::BadRequest { .. })));

        let host_role = svc
            .invite(host.id, club.id, vec![("a@moim.io".to_string(), ClubMemberRole::Host)])
            .await;
        assert!(matches!(host_role, Err(AppError::BadRequest { .. })));

        let unknown = svc
            .invite(host.id, club.id, vec![("x@moim.io".to_string(), ClubMemberRole::Participant)])
            .await;
        assert!(matches!(unknown, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_withdraw_rules() {
        let repos = Repositories::in_memory();
        let svc = service(&repos);
        let host = member(&repos, "host").await;
        let a = member(&repos, "a").await;
        let b = member(&repos, "b").await;
        let club = club(&repos, host.id, true).await;
        join(&repos, club.id, a.id, ClubMemberState::Joining).await;
        join(&repos, club.id, b.id, ClubMemberState::Joining).await;

        assert!(matches!(
            svc.withdraw(host.id, club.id, host.id).await,
            Err(AppError::BadRequest { .. })
        ));
        assert!(matches!(
            svc.withdraw(a.id, club.id, b.id).await,
            Err(AppError::Forbidden { .. })
        ));
        let left = svc.withdraw(a.id, club.id, a.id).await.unwrap();
        assert_eq!(left.state, ClubMemberState::Withdrawn);
        svc.withdraw(host.id, club.id, b.id).await.unwrap();

        let listed = svc.list(host.id, club.id, None).await.unwrap();
        assert_eq!(listed.len(), 1);
        let withdrawn = svc
            .list(host.id, club.id, Some(ClubMemberState::Withdrawn))
            .await
            .unwrap();
        assert_eq!(withdrawn.len(), 2);
    }

    #[tokio::test]
    async fn test_role_change_and_approval() {
        let repos = Repositories::in_memory();
        let svc = service(&repos);
        let host = member(&repos, "host").await;
        let a = member(&repos, "a").await;
        let club = club(&repos, host.id, true).await;
        join(&repos, club.id, a.id, ClubMemberState::Applying).await;

        assert!(matches!(
            svc.change_role(host.id, club.id, host.id, ClubMemberRole::Manager).await,
            Err(AppError::BadRequest { .. })
        ));
        let approved = svc.approve(host.id, club.id, a.id).await.unwrap();
        assert_eq!(approved.state, ClubMemberState::Joining);
        let err = svc.approve(host.id, club.id, a.id).await.unwrap_err();
        assert_eq!(err.to_string(), AppError::bad_request("already joined").to_string());

        let promoted = svc
            .change_role(host.id, club.id, a.id, ClubMemberRole::Manager)
            .await
            .unwrap();
        assert_eq!(promoted.role, ClubMemberRole::Manager);
    }

    #[tokio::test]
    async fn test_reject_application_deletes_row() {
        let repos = Repositories::in_memory();
        let svc = service(&repos);
        let host = member(&repos, "host").await;
        let a = member(&repos, "a").await;
        let club = club(&repos, host.id, true).await;
        join(&repos, club.id, a.id, ClubMemberState::Applying).await;

        svc.reject(host.id, club.id, a.id).await.unwrap();
        assert!(
            repos
                .club_members
                .find_by_club_and_member(club.id, a.id)
                .await
                .unwrap()
                .is_none()
        );
    }
}
