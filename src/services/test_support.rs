//! Fixtures shared by the service tests.

use jiff::civil::date;
use jiff_diesel::ToDiesel;

use crate::models::{
    Club, ClubCategory, ClubMember, ClubMemberRole, ClubMemberState, EventType, Member,
    MemberType, NewClub, NewClubMember, NewMember,
};
use crate::repositories::Repositories;

/// A regular member with email `{nickname}@moim.io`.
pub async fn member(repos: &Repositories, nickname: &str) -> Member {
    repos
        .members
        .create(NewMember {
            nickname: nickname.to_string(),
            password: "x".to_string(),
            member_type: MemberType::Member,
            tag: "TAG001".to_string(),
            email: Some(format!("{nickname}@moim.io")),
            bio: None,
            api_key: format!("api_{nickname}"),
        })
        .await
        .unwrap()
}

/// An active club of capacity 3 led by `leader_id`, who is seated as HOST.
pub async fn club(repos: &Repositories, leader_id: i64, is_public: bool) -> Club {
    let club = repos
        .clubs
        .create(NewClub {
            name: "Morning runners".to_string(),
            bio: None,
            category: ClubCategory::Sports,
            main_spot: "Seoul".to_string(),
            maximum_capacity: 3,
            recruiting_status: true,
            event_type: EventType::LongTerm,
            start_date: date(2025, 1, 1).to_diesel(),
            end_date: date(2099, 12, 31).to_diesel(),
            image_url: None,
            is_public,
            leader_id: Some(leader_id),
        })
        .await
        .unwrap();
    repos
        .club_members
        .create(NewClubMember {
            club_id: club.id,
            member_id: leader_id,
            role: ClubMemberRole::Host,
            state: ClubMemberState::Joining,
        })
        .await
        .unwrap();
    club
}

/// Adds `member_id` to the club as a participant in `state`.
pub async fn join(
    repos: &Repositories,
    club_id: i64,
    member_id: i64,
    state: ClubMemberState,
) -> ClubMember {
    repos
        .club_members
        .create(NewClubMember {
            club_id,
            member_id,
            role: ClubMemberRole::Participant,
            state,
        })
        .await
        .unwrap()
}
