use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::AsyncDbPool;
use crate::error::{AppError, AppResult};
use crate::models::{Friend, FriendStatus, NewFriend, ordered_pair};

#[async_trait]
pub trait FriendRepository: Send + Sync {
    async fn create(&self, new_friend: NewFriend) -> AppResult<Friend>;

    async fn find_by_id(&self, friend_id: i64) -> AppResult<Option<Friend>>;

    /// The relation between two members regardless of argument order.
    async fn find_between(&self, a: i64, b: i64) -> AppResult<Option<Friend>>;

    /// Every relation the member is a party of.
    async fn list_for_member(&self, member_id: i64) -> AppResult<Vec<Friend>>;

    async fn update_status(&self, friend_id: i64, new_status: FriendStatus) -> AppResult<Friend>;

    async fn delete(&self, friend_id: i64) -> AppResult<usize>;
}

#[derive(Clone)]
pub struct PgFriendRepository {
    pool: AsyncDbPool,
}

impl PgFriendRepository {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FriendRepository for PgFriendRepository {
    async fn create(&self, new_friend: NewFriend) -> AppResult<Friend> {
        use crate::schema::friends::dsl::*;
        let mut conn = self.pool.get().await?;

        diesel::insert_into(friends)
            .values(&new_friend)
            .returning(Friend::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(AppError::from)
    }

    async fn find_by_id(&self, friend_id: i64) -> AppResult<Option<Friend>> {
        use crate::schema::friends::dsl::*;
        let mut conn = self.pool.get().await?;

        friends
            .filter(id.eq(friend_id))
            .select(Friend::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(AppError::from)
    }

    async fn find_between(&self, a: i64, b: i64) -> AppResult<Option<Friend>> {
        use crate::schema::friends::dsl::*;
        let (first, second) = ordered_pair(a, b);
        let mut conn = self.pool.get().await?;

        friends
            .filter(member1_id.eq(first).and(member2_id.eq(second)))
            .select(Friend::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(AppError::from)
    }

    async fn list_for_member(&self, member_id: i64) -> AppResult<Vec<Friend>> {
        use crate::schema::friends::dsl::*;
        let mut conn = self.pool.get().await?;

        friends
            .filter(member1_id.eq(member_id).or(member2_id.eq(member_id)))
            .order(id.asc())
            .select(Friend::as_select())
            .load(&mut conn)
            .await
            .map_err(AppError::from)
    }

    async fn update_status(&self, friend_id: i64, new_status: FriendStatus) -> AppResult<Friend> {
        use crate::schema::friends::dsl::*;
        let mut conn = self.pool.get().await?;

        diesel::update(friends.filter(id.eq(friend_id)))
            .set(status.eq(new_status))
            .returning(Friend::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(AppError::from)
    }

    async fn delete(&self, friend_id: i64) -> AppResult<usize> {
        use crate::schema::friends::dsl::*;
        let mut conn = self.pool.get().await?;

        diesel::delete(friends.filter(id.eq(friend_id)))
            .execute(&mut conn)
            .await
            .map_err(AppError::from)
    }
}
