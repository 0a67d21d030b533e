use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use jiff_diesel::ToDiesel;

use crate::db::AsyncDbPool;
use crate::error::{AppError, AppResult};
use crate::models::{ClubLink, NewClubLink};

#[async_trait]
pub trait ClubLinkRepository: Send + Sync {
    async fn create(&self, new_link: NewClubLink) -> AppResult<ClubLink>;

    async fn find_by_code(&self, code: &str) -> AppResult<Option<ClubLink>>;

    /// The most recently created link of the club that is still valid at `now`.
    async fn find_latest_valid(
        &self,
        club_id: i64,
        now: jiff::civil::DateTime,
    ) -> AppResult<Option<ClubLink>>;
}

#[derive(Clone)]
pub struct PgClubLinkRepository {
    pool: AsyncDbPool,
}

impl PgClubLinkRepository {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClubLinkRepository for PgClubLinkRepository {
    async fn create(&self, new_link: NewClubLink) -> AppResult<ClubLink> {
        use crate::schema::club_links::dsl::*;
        let mut conn = self.pool.get().await?;

        diesel::insert_into(club_links)
            .values(&new_link)
            .returning(ClubLink::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(AppError::from)
    }

    async fn find_by_code(&self, code: &str) -> AppResult<Option<ClubLink>> {
        use crate::schema::club_links::dsl::*;
        let mut conn = self.pool.get().await?;

        club_links
            .filter(invite_code.eq(code))
            .select(ClubLink::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(AppError::from)
    }

    async fn find_latest_valid(
        &self,
        target_club: i64,
        now: jiff::civil::DateTime,
    ) -> AppResult<Option<ClubLink>> {
        use crate::schema::club_links::dsl::*;
        let mut conn = self.pool.get().await?;

        club_links
            .filter(club_id.eq(target_club))
            .filter(expires_at.gt(now.to_diesel()))
            .order((created_at.desc(), id.desc()))
            .select(ClubLink::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(AppError::from)
    }
}
