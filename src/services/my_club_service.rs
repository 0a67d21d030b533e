use std::collections::HashMap;

use super::access::ClubAccess;
use crate::error::{AppError, AppResult};
use crate::models::{
    Club, ClubMember, ClubMemberRole, ClubMemberState, NewClubMember, UpdateClubMember,
};
use crate::repositories::Repositories;

/// A club seen through the caller's own membership.
#[derive(Debug, Clone)]
pub struct MyClub {
    pub club: Club,
    pub membership: ClubMember,
}

fn ensure_invited(membership: &ClubMember) -> AppResult<()> {
    match membership.state {
        ClubMemberState::Invited => Ok(()),
        ClubMemberState::Joining => Err(AppError::bad_request("already joined")),
        _ => Err(AppError::bad_request("not invited")),
    }
}

#[derive(Clone)]
pub struct MyClubService {
    repos: Repositories,
    access: ClubAccess,
}

impl MyClubService {
    pub fn new(repos: Repositories, access: ClubAccess) -> Self {
        Self { repos, access }
    }

    async fn mine(&self, club_id: i64, member_id: i64) -> AppResult<MyClub> {
        let club = self.access.active_club(club_id).await?;
        let membership = self
            .access
            .membership(club_id, member_id)
            .await?
            .ok_or_else(|| AppError::not_found("club_member", "club_id", club_id))?;
        Ok(MyClub { club, membership })
    }

    /// Memberships of the caller in clubs that are not soft deleted.
    pub async fn list(&self, member_id: i64) -> AppResult<Vec<MyClub>> {
        let memberships = self.repos.club_members.list_by_member(member_id).await?;
        let club_ids: Vec<i64> = memberships.iter().map(|cm| cm.club_id).collect();
        let clubs: HashMap<i64, Club> = self
            .repos
            .clubs
            .find_by_ids(&club_ids)
            .await?
            .into_iter()
            .filter(|club| club.state)
            .map(|club| (club.id, club))
            .collect();

        Ok(memberships
            .into_iter()
            .filter_map(|membership| {
                let club = clubs.get(&membership.club_id)?.clone();
                Some(MyClub { club, membership })
            })
            .collect())
    }

    pub async fn get(&self, member_id: i64, club_id: i64) -> AppResult<MyClub> {
        self.mine(club_id, member_id).await
    }

    /// INVITED → JOINING.
    pub async fn accept_invitation(&self, member_id: i64, club_id: i64) -> AppResult<Club> {
        let MyClub { club, membership } = self.mine(club_id, member_id).await?;
        ensure_invited(&membership)?;
        self.repos
            .club_members
            .update(
                membership.id,
                UpdateClubMember {
                    role: None,
                    state: Some(ClubMemberState::Joining),
                },
            )
            .await?;
        Ok(club)
    }

    pub async fn reject_invitation(&self, member_id: i64, club_id: i64) -> AppResult<Club> {
        let MyClub { club, membership } = self.mine(club_id, member_id).await?;
        ensure_invited(&membership)?;
        self.repos.club_members.delete(membership.id).await?;
        Ok(club)
    }

    pub async fn apply(&self, member_id: i64, club_id: i64) -> AppResult<Club> {
        let club = self.access.active_club(club_id).await?;
        if !club.is_public {
            return Err(AppError::forbidden("private clubs do not take applications"));
        }
        if !club.recruiting_status {
            return Err(AppError::bad_request("the club is not recruiting"));
        }

        match self.access.membership(club_id, member_id).await? {
            Some(existing) => match existing.state {
                ClubMemberState::Joining => return Err(AppError::bad_request("already joined")),
                ClubMemberState::Applying => {
                    return Err(AppError::bad_request("already applying"));
                }
                ClubMemberState::Invited => {
                    return Err(AppError::bad_request("already invited, accept the invitation"));
                }
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
                }
            },
            None => {
                self.repos
                    .club_members
                    .create(NewClubMember {
                        club_id,
                        member_id,
                        role: ClubMemberRole::Participant,
                        state: ClubMemberState::Applying,
                    })
                    .await?;
            }
        }
        Ok(club)
    }

    pub async fn cancel_application(&self, member_id: i64, club_id: i64) -> AppResult<Club> {
        let MyClub { club, membership } = self.mine(club_id, member_id).await?;
        if membership.state != ClubMemberState::Applying {
            return Err(AppError::bad_request("not applying"));
        }
        self.repos.club_members.delete(membership.id).await?;
        Ok(club)
    }

    pub async fn withdraw(&self, member_id: i64, club_id: i64) -> AppResult<Club> {
        let MyClub { club, membership } = self.mine(club_id, member_id).await?;
        if club.leader_id == Some(member_id) || membership.role == ClubMemberRole::Host {
            return Err(AppError::bad_request("the host cannot withdraw"));
        }
        if membership.state == ClubMemberState::Withdrawn {
            return Err(AppError::bad_request("already withdrawn"));
        }
        self.repos
            .club_members
            .update(
                membership.id,
                UpdateClubMember {
                    role: None,
                    state: Some(ClubMemberState::Withdrawn),
                },
            )
            .await?;
        Ok(club)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UpdateClub;
    use crate::services::test_support::{club, join, member};

    fn service(repos: &Repositories) -> MyClubService {
        MyClubService::new(
            repos.clone(),
            ClubAccess::new(repos.clubs.clone(), repos.club_members.clone()),
        )
    }

    #[tokio::test]
    async fn test_invitation_accept_and_reject() {
        let repos = Repositories::in_memory();
        let svc = service(&repos);
        let host = member(&repos, "host").await;
        let a = member(&repos, "a").await;
        let first = club(&repos, host.id, false).await;
        let second = club(&repos, host.id, false).await;
        join(&repos, first.id, a.id, ClubMemberState::Invited).await;
        join(&repos, second.id, a.id, ClubMemberState::Invited).await;

        svc.accept_invitation(a.id, first.id).await.unwrap();
        let err = svc.accept_invitation(a.id, first.id).await.unwrap_err();
        assert_eq!(err.to_string(), AppError::bad_request("already joined").to_string());

        svc.reject_invitation(a.id, second.id).await.unwrap();
        assert!(matches!(
            svc.get(a.id, second.id).await,
            Err(AppError::NotFound { .. })
        ));

        let mine = svc.list(a.id).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].membership.state, ClubMemberState::Joining);
    }

    #[tokio::test]
    async fn test_apply_rules() {
        let repos = Repositories::in_memory();
        let svc = service(&repos);
        let host = member(&repos, "host").await;
        let a = member(&repos, "a").await;
        let private = club(&repos, host.id, false).await;
        let public = club(&repos, host.id, true).await;

        assert!(matches!(
            svc.apply(a.id, private.id).await,
            Err(AppError::Forbidden { .. })
        ));
        svc.apply(a.id, public.id).await.unwrap();
        assert!(matches!(
            svc.apply(a.id, public.id).await,
            Err(AppError::BadRequest { .. })
        ));

        svc.cancel_application(a.id, public.id).await.unwrap();
        assert!(matches!(
            svc.cancel_application(a.id, public.id).await,
            Err(AppError::NotFound { .. })
        ));

        repos
            .clubs
            .update(
                public.id,
                UpdateClub {
                    recruiting_status: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(matches!(
            svc.apply(a.id, public.id).await,
            Err(AppError::BadRequest { .. })
        ));
    }

    #[tokio::test]
    async fn test_withdrawn_member_reapplies() {
        let repos = Repositories::in_memory();
        let svc = service(&repos);
        let host = member(&repos, "host").await;
        let a = member(&repos, "a").await;
        let public = club(&repos, host.id, true).await;
        join(&repos, public.id, a.id, ClubMemberState::Joining).await;

        assert!(matches!(
            svc.withdraw(host.id, public.id).await,
            Err(AppError::BadRequest { .. })
        ));
        svc.withdraw(a.id, public.id).await.unwrap();
        svc.apply(a.id, public.id).await.unwrap();
        let mine = svc.get(a.id, public.id).await.unwrap();
        assert_eq!(mine.membership.state, ClubMemberState::Applying);
    }
}
