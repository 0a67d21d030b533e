use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::db::AsyncDbPool;
use crate::error::{AppError, AppResult};
use crate::models::{Club, ClubMemberRole, ClubSearch, NewClub, NewClubMember, UpdateClub};
use crate::schema::{club_members, clubs};

#[async_trait]
pub trait ClubRepository: Send + Sync {
    async fn create(&self, new_club: NewClub) -> AppResult<Club>;

    /// Creates the club with its joined host and invited members, all or nothing.
    async fn create_with_members(
        &self,
        new_club: NewClub,
        host_id: i64,
        invitees: Vec<(i64, ClubMemberRole)>,
    ) -> AppResult<Club>;

    /// Hard delete; memberships, links and schedules go with it.
    async fn delete(&self, club_id: i64) -> AppResult<usize>;

    async fn find_by_id(&self, club_id: i64) -> AppResult<Option<Club>>;

    async fn find_by_ids(&self, club_ids: &[i64]) -> AppResult<Vec<Club>>;

    /// Applies `changes`; an empty changeset returns the club unchanged.
    async fn update(&self, club_id: i64, changes: UpdateClub) -> AppResult<Club>;

    /// Public, active clubs matching `search`, newest first, with the total match count.
    async fn search_public(
        &self,
        search: &ClubSearch,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<Club>, i64)>;
}

#[derive(Clone)]
pub struct PgClubRepository {
    pool: AsyncDbPool,
}

impl PgClubRepository {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }

    fn search_query(search: &ClubSearch) -> clubs::BoxedQuery<'static, Pg> {
        use crate::schema::clubs::dsl::*;

        let mut query = clubs
            .filter(is_public.eq(true))
            .filter(state.eq(true))
            .into_boxed();

        if let Some(ref needle) = search.name {
            query = query.filter(name.ilike(format!("%{needle}%")));
        }
        if let Some(ref needle) = search.main_spot {
            query = query.filter(main_spot.ilike(format!("%{needle}%")));
        }
        if let Some(value) = search.category {
            query = query.filter(category.eq(value));
        }
        if let Some(value) = search.event_type {
            query = query.filter(event_type.eq(value));
        }
        query
    }
}

#[async_trait]
impl ClubRepository for PgClubRepository {
    async fn create(&self, new_club: NewClub) -> AppResult<Club> {
        use crate::schema::clubs::dsl::*;
        let mut conn = self.pool.get().await?;

        diesel::insert_into(clubs)
            .values(&new_club)
            .returning(Club::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(AppError::from)
    }

    async fn create_with_members(
        &self,
        new_club: NewClub,
        host_id: i64,
        invitees: Vec<(i64, ClubMemberRole)>,
    ) -> AppResult<Club> {
        let mut conn = self.pool.get().await?;

        conn.transaction::<_, AppError, _>(|conn| {
            async move {
                let club: Club = diesel::insert_into(clubs::table)
                    .values(&new_club)
                    .returning(Club::as_returning())
                    .get_result(conn)
                    .await?;

                diesel::insert_into(club_members::table)
                    .values(&NewClubMember::founding_roster(club.id, host_id, &invitees))
                    .execute(conn)
                    .await?;
                Ok(club)
            }
            .scope_boxed()
        })
        .await
    }

    async fn delete(&self, club_id: i64) -> AppResult<usize> {
        let mut conn = self.pool.get().await?;

        diesel::delete(clubs::table.find(club_id))
            .execute(&mut conn)
            .await
            .map_err(AppError::from)
    }

    async fn find_by_id(&self, club_id: i64) -> AppResult<Option<Club>> {
        use crate::schema::clubs::dsl::*;
        let mut conn = self.pool.get().await?;

        clubs
            .filter(id.eq(club_id))
            .select(Club::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(AppError::from)
    }

    async fn find_by_ids(&self, club_ids: &[i64]) -> AppResult<Vec<Club>> {
        use crate::schema::clubs::dsl::*;
        if club_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await?;

        clubs
            .filter(id.eq_any(club_ids))
            .order(id.asc())
            .select(Club::as_select())
            .load(&mut conn)
            .await
            .map_err(AppError::from)
    }

    async fn update(&self, club_id: i64, changes: UpdateClub) -> AppResult<Club> {
        use crate::schema::clubs::dsl::*;

        if changes.is_empty() {
            return self
                .find_by_id(club_id)
                .await?
                .ok_or_else(|| AppError::not_found("club", "id", club_id));
        }

        let mut conn = self.pool.get().await?;
        diesel::update(clubs.filter(id.eq(club_id)))
            .set(&changes)
            .returning(Club::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(AppError::from)
    }

    async fn search_public(
        &self,
        search: &ClubSearch,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<Club>, i64)> {
        let mut conn = self.pool.get().await?;

        let items = Self::search_query(search)
            .order(clubs::id.desc())
            .offset(offset)
            .limit(limit)
            .select(Club::as_select())
            .load(&mut conn)
            .await
            .map_err(AppError::from)?;

        let total = Self::search_query(search)
            .count()
            .get_result::<i64>(&mut conn)
            .await
            .map_err(AppError::from)?;

        Ok((items, total))
    }
}
