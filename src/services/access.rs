//! Club authorization predicates shared by the club scoped services.

use std::sync::Arc;

use jiff::civil::Date;

use crate::error::{AppError, AppResult};
use crate::models::{Club, ClubMember, ClubMemberRole};
use crate::repositories::{ClubMemberRepository, ClubRepository};
use crate::utils::time;

/// Leader of a club that is active and not past its end date.
pub fn is_active_host(club: &Club, actor_id: i64, today: Date) -> bool {
    club.is_active_on(today) && club.leader_id == Some(actor_id)
}

/// Joined manager or host of an active, unexpired club.
pub fn can_manage(club: &Club, membership: &ClubMember, today: Date) -> bool {
    club.is_active_on(today)
        && membership.club_id == club.id
        && membership.is_joining()
        && matches!(
            membership.role,
            ClubMemberRole::Manager | ClubMemberRole::Host
        )
}

/// Joined member of an active club.
pub fn is_club_member(club: &Club, membership: &ClubMember) -> bool {
    club.state && membership.club_id == club.id && membership.is_joining()
}

#[derive(Clone)]
pub struct ClubAccess {
    clubs: Arc<dyn ClubRepository>,
    club_members: Arc<dyn ClubMemberRepository>,
}

impl ClubAccess {
    pub fn new(clubs: Arc<dyn ClubRepository>, club_members: Arc<dyn ClubMemberRepository>) -> Self {
        Self {
            clubs,
            club_members,
        }
    }

    /// The club if it exists and is not soft deleted.
    pub async fn active_club(&self, club_id: i64) -> AppResult<Club> {
        self.clubs
            .find_by_id(club_id)
            .await?
            .filter(|club| club.state)
            .ok_or_else(|| AppError::not_found("club", "id", club_id))
    }

    pub async fn membership(&self, club_id: i64, member_id: i64) -> AppResult<Option<ClubMember>> {
        self.club_members
            .find_by_club_and_member(club_id, member_id)
            .await
    }

    pub async fn require_host(&self, club_id: i64, actor_id: i64) -> AppResult<Club> {
        let club = self.active_club(club_id).await?;
        if !is_active_host(&club, actor_id, time::today()) {
            return Err(AppError::forbidden("only the club host can do this"));
        }
        Ok(club)
    }

    pub async fn require_manager(
        &self,
        club_id: i64,
        actor_id: i64,
    ) -> AppResult<(Club, ClubMember)> {
        let club = self.active_club(club_id).await?;
        match self.membership(club_id, actor_id).await? {
            Some(membership) if can_manage(&club, &membership, time::today()) => {
                Ok((club, membership))
            }
            _ => Err(AppError::forbidden("club manager or host required")),
        }
    }

    pub async fn require_member(
        &self,
        club_id: i64,
        actor_id: i64,
    ) -> AppResult<(Club, ClubMember)> {
        let club = self.active_club(club_id).await?;
        match self.membership(club_id, actor_id).await? {
            Some(membership) if is_club_member(&club, &membership) => Ok((club, membership)),
            _ => Err(AppError::forbidden("not a member of this club")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ClubCategory, ClubMemberState, EventType};
    use jiff::civil::date;
    use jiff_diesel::ToDiesel;
    use proptest::prelude::*;

    fn club(leader: i64, state: bool, end: Date) -> Club {
        Club {
            id: 1,
            name: "club".to_string(),
            bio: None,
            category: ClubCategory::Hobby,
            main_spot: "spot".to_string(),
            maximum_capacity: 5,
            recruiting_status: true,
            event_type: EventType::LongTerm,
            start_date: date(2024, 1, 1).to_diesel(),
            end_date: end.to_diesel(),
            image_url: None,
            is_public: true,
            leader_id: Some(leader),
            state,
            created_at: date(2024, 1, 1).at(0, 0, 0, 0).to_diesel(),
        }
    }

    fn membership(role: ClubMemberRole, state: ClubMemberState) -> ClubMember {
        ClubMember {
            id: 10,
            club_id: 1,
            member_id: 2,
            role,
            state,
            created_at: date(2024, 1, 1).at(0, 0, 0, 0).to_diesel(),
        }
    }

    #[test]
    fn test_host_requires_unexpired_club() {
        let today = date(2025, 6, 1);
        assert!(is_active_host(&club(2, true, date(2025, 6, 1)), 2, today));
        assert!(!is_active_host(&club(2, true, date(2025, 5, 31)), 2, today));
        assert!(!is_active_host(&club(2, false, date(2030, 1, 1)), 2, today));
        assert!(!is_active_host(&club(3, true, date(2030, 1, 1)), 2, today));
    }

    #[test]
    fn test_participants_cannot_manage() {
        let today = date(2025, 6, 1);
        let c = club(2, true, date(2030, 1, 1));
        assert!(can_manage(&c, &membership(ClubMemberRole::Manager, ClubMemberState::Joining), today));
        assert!(!can_manage(
            &c,
            &membership(ClubMemberRole::Participant, ClubMemberState::Joining),
            today
        ));
    }

    proptest! {
        #[test]
        fn prop_only_joining_members_pass(state_idx in 0usize..4, role_idx in 0usize..3) {
            let state = ClubMemberState::ALL[state_idx];
            let role = ClubMemberRole::ALL[role_idx];
            let c = club(2, true, date(2030, 1, 1));
            let m = membership(role, state);
            prop_assert_eq!(is_club_member(&c, &m), state == ClubMemberState::Joining);
            if can_manage(&c, &m, date(2025, 1, 1)) {
                prop_assert!(is_club_member(&c, &m));
            }
        }
    }
}
