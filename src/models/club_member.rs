use diesel::prelude::*;
use jiff_diesel::DateTime;

use super::{ClubMemberRole, ClubMemberState};

/// Membership of a member in a club; unique per `(club_id, member_id)`.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = crate::schema::club_members)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ClubMember {
    pub id: i64,
    pub club_id: i64,
    pub member_id: i64,
    pub role: ClubMemberRole,
    pub state: ClubMemberState,
    pub created_at: DateTime,
}

impl ClubMember {
    pub fn is_joining(&self) -> bool {
        self.state == ClubMemberState::Joining
    }

    /// Counts toward the club's capacity.
    pub fn occupies_seat(&self) -> bool {
        self.state != ClubMemberState::Withdrawn
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::club_members)]
pub struct NewClubMember {
    pub club_id: i64,
    pub member_id: i64,
    pub role: ClubMemberRole,
    pub state: ClubMemberState,
}

impl NewClubMember {
    /// A participant waiting for approval.
    pub fn applicant(club_id: i64, member_id: i64) -> Self {
        Self {
            club_id,
            member_id,
            role: ClubMemberRole::Participant,
            state: ClubMemberState::Applying,
        }
    }

    /// Rows written when a club is founded: the joined host, then the invitees.
    pub fn founding_roster(
        club_id: i64,
        host_id: i64,
        invitees: &[(i64, ClubMemberRole)],
    ) -> Vec<Self> {
        let host = Self {
            club_id,
            member_id: host_id,
            role: ClubMemberRole::Host,
            state: ClubMemberState::Joining,
        };
        std::iter::once(host)
            .chain(invitees.iter().map(|&(member_id, role)| Self {
                club_id,
                member_id,
                role,
                state: ClubMemberState::Invited,
            }))
            .collect()
    }
}

#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = crate::schema::club_members)]
pub struct UpdateClubMember {
    pub role: Option<ClubMemberRole>,
    pub state: Option<ClubMemberState>,
}
