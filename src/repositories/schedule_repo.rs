use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use jiff_diesel::ToDiesel;

use crate::db::AsyncDbPool;
use crate::error::{AppError, AppResult};
use crate::models::{NewSchedule, Schedule, UpdateSchedule};

#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    async fn create(&self, new_schedule: NewSchedule) -> AppResult<Schedule>;

    async fn find_by_id(&self, schedule_id: i64) -> AppResult<Option<Schedule>>;

    async fn update(&self, schedule_id: i64, changes: UpdateSchedule) -> AppResult<Schedule>;

    /// Hard delete. The checklist of the schedule goes with it.
    async fn delete(&self, schedule_id: i64) -> AppResult<usize>;

    /// Active schedules of the given clubs overlapping `[range_start, range_end)`,
    /// ordered by start.
    async fn list_active_by_clubs_in_range(
        &self,
        club_ids: &[i64],
        range_start: jiff::civil::DateTime,
        range_end: jiff::civil::DateTime,
    ) -> AppResult<Vec<Schedule>>;

    /// Every schedule of a club ordered by start, inactive ones included.
    async fn list_by_club(&self, club_id: i64) -> AppResult<Vec<Schedule>>;
}

#[derive(Clone)]
pub struct PgScheduleRepository {
    pool: AsyncDbPool,
}

impl PgScheduleRepository {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ScheduleRepository for PgScheduleRepository {
    async fn create(&self, new_schedule: NewSchedule) -> AppResult<Schedule> {
        use crate::schema::schedules::dsl::*;
        let mut conn = self.pool.get().await?;

        diesel::insert_into(schedules)
            .values(&new_schedule)
            .returning(Schedule::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(AppError::from)
    }

    async fn find_by_id(&self, schedule_id: i64) -> AppResult<Option<Schedule>> {
        use crate::schema::schedules::dsl::*;
        let mut conn = self.pool.get().await?;

        schedules
            .filter(id.eq(schedule_id))
            .select(Schedule::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(AppError::from)
    }

    async fn update(&self, schedule_id: i64, changes: UpdateSchedule) -> AppResult<Schedule> {
        use crate::schema::schedules::dsl::*;
        let mut conn = self.pool.get().await?;

        diesel::update(schedules.filter(id.eq(schedule_id)))
            .set(&changes)
            .returning(Schedule::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(AppError::from)
    }

    async fn delete(&self, schedule_id: i64) -> AppResult<usize> {
        use crate::schema::schedules::dsl::*;
        let mut conn = self.pool.get().await?;

        diesel::delete(schedules.filter(id.eq(schedule_id)))
            .execute(&mut conn)
            .await
            .map_err(AppError::from)
    }

    async fn list_active_by_clubs_in_range(
        &self,
        club_ids: &[i64],
        range_start: jiff::civil::DateTime,
        range_end: jiff::civil::DateTime,
    ) -> AppResult<Vec<Schedule>> {
        use crate::schema::schedules::dsl::*;
        if club_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await?;

        schedules
            .filter(club_id.eq_any(club_ids))
            .filter(is_active.eq(true))
            .filter(start_date.lt(range_end.to_diesel()))
            .filter(end_date.ge(range_start.to_diesel()))
            .order((start_date.asc(), id.asc()))
            .select(Schedule::as_select())
            .load(&mut conn)
            .await
            .map_err(AppError::from)
    }

    async fn list_by_club(&self, target_club: i64) -> AppResult<Vec<Schedule>> {
        use crate::schema::schedules::dsl::*;
        let mut conn = self.pool.get().await?;

        schedules
            .filter(club_id.eq(target_club))
            .order((start_date.asc(), id.asc()))
            .select(Schedule::as_select())
            .load(&mut conn)
            .await
            .map_err(AppError::from)
    }
}
