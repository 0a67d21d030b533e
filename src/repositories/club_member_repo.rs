use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::AsyncDbPool;
use crate::error::{AppError, AppResult};
use crate::models::{ClubMember, NewClubMember, UpdateClubMember};

#[async_trait]
pub trait ClubMemberRepository: Send + Sync {
    async fn create(&self, new_member: NewClubMember) -> AppResult<ClubMember>;

    async fn find_by_id(&self, club_member_id: i64) -> AppResult<Option<ClubMember>>;

    async fn find_by_club_and_member(
        &self,
        club_id: i64,
        member_id: i64,
    ) -> AppResult<Option<ClubMember>>;

    /// All memberships of a club ordered by id, withdrawn rows included.
    async fn list_by_club(&self, club_id: i64) -> AppResult<Vec<ClubMember>>;

    /// All memberships of a member ordered by id.
    async fn list_by_member(&self, member_id: i64) -> AppResult<Vec<ClubMember>>;

    async fn update(&self, club_member_id: i64, changes: UpdateClubMember)
    -> AppResult<ClubMember>;

    /// Removes the membership and its checklist assignments.
    async fn delete(&self, club_member_id: i64) -> AppResult<usize>;
}

#[derive(Clone)]
pub struct PgClubMemberRepository {
    pool: AsyncDbPool,
}

impl PgClubMemberRepository {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClubMemberRepository for PgClubMemberRepository {
    async fn create(&self, new_member: NewClubMember) -> AppResult<ClubMember> {
        use crate::schema::club_members::dsl::*;
        let mut conn = self.pool.get().await?;

        diesel::insert_into(club_members)
            .values(&new_member)
            .returning(ClubMember::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(AppError::from)
    }

    async fn find_by_id(&self, club_member_id: i64) -> AppResult<Option<ClubMember>> {
        use crate::schema::club_members::dsl::*;
        let mut conn = self.pool.get().await?;

        club_members
            .filter(id.eq(club_member_id))
            .select(ClubMember::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(AppError::from)
    }

    async fn find_by_club_and_member(
        &self,
        target_club: i64,
        target_member: i64,
    ) -> AppResult<Option<ClubMember>> {
        use crate::schema::club_members::dsl::*;
        let mut conn = self.pool.get().await?;

        club_members
            .filter(club_id.eq(target_club).and(member_id.eq(target_member)))
            .select(ClubMember::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(AppError::from)
    }

    async fn list_by_club(&self, target_club: i64) -> AppResult<Vec<ClubMember>> {
        use crate::schema::club_members::dsl::*;
        let mut conn = self.pool.get().await?;

        club_members
            .filter(club_id.eq(target_club))
            .order(id.asc())
            .select(ClubMember::as_select())
            .load(&mut conn)
            .await
            .map_err(AppError::from)
    }

    async fn list_by_member(&self, target_member: i64) -> AppResult<Vec<ClubMember>> {
        use crate::schema::club_members::dsl::*;
        let mut conn = self.pool.get().await?;

        club_members
            .filter(member_id.eq(target_member))
            .order(id.asc())
            .select(ClubMember::as_select())
            .load(&mut conn)
            .await
            .map_err(AppError::from)
    }

    async fn update(
        &self,
        club_member_id: i64,
        changes: UpdateClubMember,
    ) -> AppResult<ClubMember> {
        use crate::schema::club_members::dsl::*;
        let mut conn = self.pool.get().await?;

        diesel::update(club_members.filter(id.eq(club_member_id)))
            .set(&changes)
            .returning(ClubMember::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(AppError::from)
    }

    async fn delete(&self, club_member_id: i64) -> AppResult<usize> {
        use crate::schema::club_members::dsl::*;
        let mut conn = self.pool.get().await?;

        diesel::delete(club_members.filter(id.eq(club_member_id)))
            .execute(&mut conn)
            .await
            .map_err(AppError::from)
    }
}
