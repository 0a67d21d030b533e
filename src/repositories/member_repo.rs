//! Member repository.
//!
//! Members double as the account table: guests are members with
//! `member_type = guest` and no email.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::db::AsyncDbPool;
use crate::error::{AppError, AppResult};
use crate::models::{Member, NewClubMember, NewMember, UpdateMember};

#[async_trait]
pub trait MemberRepository: Send + Sync {
    async fn create(&self, new_member: NewMember) -> AppResult<Member>;

    /// Creates a guest together with its pending membership of `club_id`.
    async fn create_guest(&self, new_member: NewMember, club_id: i64) -> AppResult<Member>;

    async fn find_by_id(&self, member_id: i64) -> AppResult<Option<Member>>;

    /// Members with the given ids, in no particular order. Unknown ids are skipped.
    async fn find_by_ids(&self, member_ids: &[i64]) -> AppResult<Vec<Member>>;

    /// Lookup by lowercased email.
    async fn find_by_email(&self, member_email: &str) -> AppResult<Option<Member>>;

    async fn find_by_api_key(&self, key: &str) -> AppResult<Option<Member>>;

    async fn exists_by_nickname_and_tag(&self, member_nickname: &str, member_tag: &str)
    -> AppResult<bool>;

    async fn update(&self, member_id: i64, changes: UpdateMember) -> AppResult<Member>;

    /// Deletes the member together with friendships, memberships and presets.
    ///
    /// Returns the number of deleted member rows (0 or 1).
    async fn delete(&self, member_id: i64) -> AppResult<usize>;
}

/// PostgreSQL member repository.
///
/// Dependent rows are removed by `ON DELETE CASCADE`; led clubs keep a null leader.
#[derive(Clone)]
pub struct PgMemberRepository {
    pool: AsyncDbPool,
}

impl PgMemberRepository {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MemberRepository for PgMemberRepository {
    async fn create(&self, new_member: NewMember) -> AppResult<Member> {
        use crate::schema::members::dsl::*;
        let mut conn = self.pool.get().await?;

        diesel::insert_into(members)
            .values(&new_member)
            .returning(Member::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(AppError::from)
    }

    async fn create_guest(&self, new_member: NewMember, club_id: i64) -> AppResult<Member> {
        use crate::schema::{club_members, members};
        let mut conn = self.pool.get().await?;

        conn.transaction::<_, AppError, _>(|conn| {
            async move {
                let member: Member = diesel::insert_into(members::table)
                    .values(&new_member)
                    .returning(Member::as_returning())
                    .get_result(conn)
                    .await?;

                diesel::insert_into(club_members::table)
                    .values(&NewClubMember::applicant(club_id, member.id))
                    .execute(conn)
                    .await?;
                Ok(member)
            }
            .scope_boxed()
        })
        .await
    }

    async fn find_by_id(&self, member_id: i64) -> AppResult<Option<Member>> {
        use crate::schema::members::dsl::*;
        let mut conn = self.pool.get().await?;

        members
            .filter(id.eq(member_id))
            .select(Member::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(AppError::from)
    }

    async fn find_by_ids(&self, member_ids: &[i64]) -> AppResult<Vec<Member>> {
        use crate::schema::members::dsl::*;
        if member_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await?;

        members
            .filter(id.eq_any(member_ids))
            .select(Member::as_select())
            .load(&mut conn)
            .await
            .map_err(AppError::from)
    }

    async fn find_by_email(&self, member_email: &str) -> AppResult<Option<Member>> {
        use crate::schema::members::dsl::*;
        let mut conn = self.pool.get().await?;

        members
            .filter(email.eq(member_email))
            .select(Member::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(AppError::from)
    }

    async fn find_by_api_key(&self, key: &str) -> AppResult<Option<Member>> {
        use crate::schema::members::dsl::*;
        let mut conn = self.pool.get().await?;

        members
            .filter(api_key.eq(key))
            .select(Member::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(AppError::from)
    }

    async fn exists_by_nickname_and_tag(
        &self,
        member_nickname: &str,
        member_tag: &str,
    ) -> AppResult<bool> {
        use crate::schema::members::dsl::*;
        let mut conn = self.pool.get().await?;

        diesel::select(diesel::dsl::exists(
            members.filter(nickname.eq(member_nickname).and(tag.eq(member_tag))),
        ))
        .get_result(&mut conn)
        .await
        .map_err(AppError::from)
    }

    async fn update(&self, member_id: i64, changes: UpdateMember) -> AppResult<Member> {
        use crate::schema::members::dsl::*;
        let mut conn = self.pool.get().await?;

        diesel::update(members.filter(id.eq(member_id)))
            .set(&changes)
            .returning(Member::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(AppError::from)
    }

    async fn delete(&self, member_id: i64) -> AppResult<usize> {
        use crate::schema::members::dsl::*;
        let mut conn = self.pool.get().await?;

        diesel::delete(members.filter(id.eq(member_id)))
            .execute(&mut conn)
            .await
            .map_err(AppError::from)
    }
}
