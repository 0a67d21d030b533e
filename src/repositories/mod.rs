//! Repository layer for data access operations.
//!
//! Every entity has an `async_trait` repository with a PostgreSQL
//! implementation and an in-memory one (see [`MemoryStore`]).

mod checklist_repo;
mod club_link_repo;
mod club_member_repo;
mod club_repo;
mod friend_repo;
mod health;
mod member_repo;
mod memory;
mod preset_repo;
mod schedule_repo;

use std::sync::Arc;

pub use checklist_repo::{CheckListRepository, PgCheckListRepository};
pub use club_link_repo::{ClubLinkRepository, PgClubLinkRepository};
pub use club_member_repo::{ClubMemberRepository, PgClubMemberRepository};
pub use club_repo::{ClubRepository, PgClubRepository};
pub use friend_repo::{FriendRepository, PgFriendRepository};
pub use health::{HealthCheck, PgHealthCheck};
pub use member_repo::{MemberRepository, PgMemberRepository};
pub use memory::MemoryStore;
pub use preset_repo::{PgPresetRepository, PresetRepository};
pub use schedule_repo::{PgScheduleRepository, ScheduleRepository};

use crate::db::AsyncDbPool;

/// Aggregates all repositories for convenient access.
///
/// Handles are trait objects behind `Arc`, so cloning is cheap and services
/// never know which backend they talk to.
#[derive(Clone)]
pub struct Repositories {
    pub members: Arc<dyn MemberRepository>,
    pub friends: Arc<dyn FriendRepository>,
    pub clubs: Arc<dyn ClubRepository>,
    pub club_members: Arc<dyn ClubMemberRepository>,
    pub club_links: Arc<dyn ClubLinkRepository>,
    pub schedules: Arc<dyn ScheduleRepository>,
    pub check_lists: Arc<dyn CheckListRepository>,
    pub presets: Arc<dyn PresetRepository>,
    pub health: Arc<dyn HealthCheck>,
}

impl Repositories {
    /// PostgreSQL-backed repositories sharing one connection pool.
    pub fn postgres(pool: AsyncDbPool) -> Self {
        Self {
            members: Arc::new(PgMemberRepository::new(pool.clone())),
            friends: Arc::new(PgFriendRepository::new(pool.clone())),
            clubs: Arc::new(PgClubRepository::new(pool.clone())),
            club_members: Arc::new(PgClubMemberRepository::new(pool.clone())),
            club_links: Arc::new(PgClubLinkRepository::new(pool.clone())),
            schedules: Arc::new(PgScheduleRepository::new(pool.clone())),
            check_lists: Arc::new(PgCheckListRepository::new(pool.clone())),
            presets: Arc::new(PgPresetRepository::new(pool.clone())),
            health: Arc::new(PgHealthCheck::new(pool)),
        }
    }

    /// All repositories backed by one fresh [`MemoryStore`].
    pub fn in_memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            members: store.clone(),
            friends: store.clone(),
            clubs: store.clone(),
            club_members: store.clone(),
            club_links: store.clone(),
            schedules: store.clone(),
            check_lists: store.clone(),
            presets: store.clone(),
            health: store,
        }
    }
}
