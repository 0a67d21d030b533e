use std::collections::HashSet;
use std::sync::Arc;

use jiff::civil::Date;
use jiff_diesel::ToDiesel;

use super::ImageUpload;
use super::access::ClubAccess;
use crate::error::{AppError, AppResult};
use crate::models::{
    Club, ClubCategory, ClubMemberRole, ClubSearch, EventType, NewClub, UpdateClub,
};
use crate::repositories::Repositories;
use crate::storage::{ObjectStorage, club_profile_key};

/// Club images are capped independently of the global upload limit.
pub const MAX_CLUB_IMAGE_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct ClubInfo {
    pub club: Club,
    pub leader_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreateClubInput {
    pub name: String,
    pub bio: Option<String>,
    pub category: ClubCategory,
    pub main_spot: String,
    pub maximum_capacity: i32,
    pub recruiting_status: bool,
    pub event_type: EventType,
    pub start_date: Date,
    pub end_date: Date,
    pub is_public: bool,
    /// Members invited right away, as `(member id, role)`
    pub invitees: Vec<(i64, ClubMemberRole)>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateClubInput {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub category: Option<ClubCategory>,
    pub main_spot: Option<String>,
    pub maximum_capacity: Option<i32>,
    pub recruiting_status: Option<bool>,
    pub event_type: Option<EventType>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub is_public: Option<bool>,
}

pub fn ensure_date_order(start: Date, end: Date) -> AppResult<()> {
    if start > end {
        return Err(AppError::bad_request(
            "start date must not be after end date",
        ));
    }
    Ok(())
}

/// Keeps the last value given to each key, ordered by that last occurrence.
pub fn dedup_last_wins<K, V>(entries: Vec<(K, V)>) -> Vec<(K, V)>
where
    K: Eq + std::hash::Hash + Clone,
{
    let mut seen = HashSet::new();
    let mut kept: Vec<(K, V)> = entries
        .into_iter()
        .rev()
        .filter(|(key, _)| seen.insert(key.clone()))
        .collect();
    kept.reverse();
    kept
}

#[derive(Clone)]
pub struct ClubService {
    repos: Repositories,
    access: ClubAccess,
    storage: Arc<dyn ObjectStorage>,
}

impl ClubService {
    pub fn new(repos: Repositories, access: ClubAccess, storage: Arc<dyn ObjectStorage>) -> Self {
        Self {
            repos,
            access,
            storage,
        }
    }

    async fn info(&self, club: Club) -> AppResult<ClubInfo> {
        let leader_name = match club.leader_id {
            Some(leader_id) => self
                .repos
                .members
                .find_by_id(leader_id)
                .await?
                .map(|m| m.nickname),
            None => None,
        };
        Ok(ClubInfo { club, leader_name })
    }

    async fn store_image(&self, club_id: i64, image: ImageUpload) -> AppResult<String> {
        image.ensure_image(MAX_CLUB_IMAGE_BYTES)?;
        self.storage
            .put(&club_profile_key(club_id), image.bytes, &image.content_type)
            .await
    }

    pub async fn create(
        &self,
        leader_id: i64,
        input: CreateClubInput,
        image: Option<ImageUpload>,
    ) -> AppResult<Club> {
        ensure_date_order(input.start_date, input.end_date)?;
        if let Some(ref image) = image {
            image.ensure_image(MAX_CLUB_IMAGE_BYTES)?;
        }

        let invitees: Vec<(i64, ClubMemberRole)> = dedup_last_wins(input.invitees)
            .into_iter()
            .filter(|(member_id, _)| *member_id != leader_id)
            .collect();
        for (member_id, role) in &invitees {
            if *role == ClubMemberRole::Host {
                return Err(AppError::bad_request("HOST role cannot be granted"));
            }
            if self.repos.members.find_by_id(*member_id).await?.is_none() {
                return Err(AppError::not_found("member", "id", member_id));
            }
        }

        let club = self
            .repos
            .clubs
            .create_with_members(
                NewClub {
                    name: input.name,
                    bio: input.bio,
                    category: input.category,
                    main_spot: input.main_spot,
                    maximum_capacity: input.maximum_capacity,
                    recruiting_status: input.recruiting_status,
                    event_type: input.event_type,
                    start_date: input.start_date.to_diesel(),
                    end_date: input.end_date.to_diesel(),
                    image_url: None,
                    is_public: input.is_public,
                    leader_id: Some(leader_id),
                },
                leader_id,
                invitees,
            )
            .await?;

        tracing::info!(club_id = club.id, leader_id, "Club created");

        match image {
            Some(image) => {
                let url = match self.store_image(club.id, image).await {
                    Ok(url) => url,
                    Err(e) => {
                        tracing::warn!(club_id = club.id, error = %e, "Club image upload failed");
                        self.repos.clubs.delete(club.id).await?;
                        return Err(e);
                    }
                };
                self.repos
                    .clubs
                    .update(
                        club.id,
                        UpdateClub {
                            image_url: Some(url),
                            ..Default::default()
                        },
                    )
                    .await
            }
            None => Ok(club),
        }
    }

    pub async fn update(
        &self,
        actor_id: i64,
        club_id: i64,
        input: UpdateClubInput,
        image: Option<ImageUpload>,
    ) -> AppResult<ClubInfo> {
        let club = self.access.require_host(club_id, actor_id).await?;

        let start = input.start_date.unwrap_or(club.start_date.to_jiff());
        let end = input.end_date.unwrap_or(club.end_date.to_jiff());
        ensure_date_order(start, end)?;

        let image_url = match image {
            Some(image) => Some(self.store_image(club_id, image).await?),
            None => None,
        };

        let updated = self
            .repos
            .clubs
            .update(
                club_id,
                UpdateClub {
                    name: input.name,
                    bio: input.bio,
                    category: input.category,
                    main_spot: input.main_spot,
                    maximum_capacity: input.maximum_capacity,
                    recruiting_status: input.recruiting_status,
                    event_type: input.event_type,
                    start_date: input.start_date.map(|d| d.to_diesel()),
                    end_date: input.end_date.map(|d| d.to_diesel()),
                    image_url,
                    is_public: input.is_public,
                    state: None,
                },
            )
            .await?;
        self.info(updated).await
    }

    /// Soft delete.
    pub async fn delete(&self, actor_id: i64, club_id: i64) -> AppResult<()> {
        self.access.require_host(club_id, actor_id).await?;
        self.repos
            .clubs
            .update(
                club_id,
                UpdateClub {
                    state: Some(false),
                    ..Default::default()
                },
            )
            .await?;
        tracing::info!(club_id, actor_id, "Club deleted");
        Ok(())
    }

    /// Public clubs are visible to anyone; private ones only to joined members.
    pub async fn get(&self, club_id: i64, viewer_id: Option<i64>) -> AppResult<ClubInfo> {
        let club = self.access.active_club(club_id).await?;

        if !club.is_public {
            let joined = match viewer_id {
                Some(viewer) => self
                    .access
                    .membership(club_id, viewer)
                    .await?
                    .is_some_and(|m| m.is_joining()),
                None => false,
            };
            if !joined {
                return Err(AppError::forbidden("this club is private"));
            }
        }

        self.info(club).await
    }

    pub async fn search(
        &self,
        search: &ClubSearch,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<Club>, i64)> {
        self.repos.clubs.search_public(search, offset, limit).await
    }
}
