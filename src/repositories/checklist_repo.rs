//! Checklists with their items and per-member item assignments.
//!
//! Writes that touch several tables run in one transaction.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};

use crate::db::AsyncDbPool;
use crate::error::{AppError, AppResult};
use crate::models::{
    CheckList, CheckListDetail, CheckListItem, CheckListItemDetail, CheckListItemDraft,
    ItemAssign, NewCheckList,
};

#[async_trait]
pub trait CheckListRepository: Send + Sync {
    /// Creates an active checklist for the schedule together with its items.
    async fn create(
        &self,
        schedule_id: i64,
        items: Vec<CheckListItemDraft>,
    ) -> AppResult<CheckListDetail>;

    async fn find_by_id(&self, check_list_id: i64) -> AppResult<Option<CheckListDetail>>;

    async fn find_by_schedule_id(&self, schedule_id: i64) -> AppResult<Option<CheckList>>;

    async fn find_by_schedule_ids(&self, schedule_ids: &[i64]) -> AppResult<Vec<CheckList>>;

    /// Drops every item (and assignment) of the checklist and writes `items` instead.
    async fn replace_items(
        &self,
        check_list_id: i64,
        items: Vec<CheckListItemDraft>,
    ) -> AppResult<CheckListDetail>;

    async fn set_active(&self, check_list_id: i64, active: bool) -> AppResult<CheckList>;

    async fn delete(&self, check_list_id: i64) -> AppResult<usize>;
}

#[derive(Clone)]
pub struct PgCheckListRepository {
    pool: AsyncDbPool,
}

impl PgCheckListRepository {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }
}

async fn insert_items(
    conn: &mut AsyncPgConnection,
    check_list_id: i64,
    drafts: Vec<CheckListItemDraft>,
) -> Result<(), AppError> {
    use crate::schema::{check_list_items, item_assigns};

    for draft in drafts {
        let (row, assigns) = draft.into_row(check_list_id);
        let item_id: i64 = diesel::insert_into(check_list_items::table)
            .values(&row)
            .returning(check_list_items::id)
            .get_result(conn)
            .await?;

        let assign_rows: Vec<_> = assigns.into_iter().map(|a| a.into_row(item_id)).collect();
        if !assign_rows.is_empty() {
            diesel::insert_into(item_assigns::table)
                .values(&assign_rows)
                .execute(conn)
                .await?;
        }
    }
    Ok(())
}

async fn load_detail(
    conn: &mut AsyncPgConnection,
    check_list_id: i64,
) -> Result<Option<CheckListDetail>, AppError> {
    use crate::schema::{check_list_items, check_lists, item_assigns};

    let Some(check_list) = check_lists::table
        .filter(check_lists::id.eq(check_list_id))
        .select(CheckList::as_select())
        .first(conn)
        .await
        .optional()?
    else {
        return Ok(None);
    };

    let items: Vec<CheckListItem> = check_list_items::table
        .filter(check_list_items::check_list_id.eq(check_list_id))
        .order((check_list_items::sequence.asc(), check_list_items::id.asc()))
        .select(CheckListItem::as_select())
        .load(conn)
        .await?;

    let item_ids: Vec<i64> = items.iter().map(|i| i.id).collect();
    let assigns: Vec<ItemAssign> = item_assigns::table
        .filter(item_assigns::check_list_item_id.eq_any(&item_ids))
        .order(item_assigns::id.asc())
        .select(ItemAssign::as_select())
        .load(conn)
        .await?;

    Ok(Some(group_detail(check_list, items, assigns)))
}

/// Attaches assignments to their items, keeping item order.
pub(crate) fn group_detail(
    check_list: CheckList,
    items: Vec<CheckListItem>,
    assigns: Vec<ItemAssign>,
) -> CheckListDetail {
    let items = items
        .into_iter()
        .map(|item| {
            let assigns = assigns
                .iter()
                .filter(|a| a.check_list_item_id == item.id)
                .cloned()
                .collect();
            CheckListItemDetail { item, assigns }
        })
        .collect();
    CheckListDetail { check_list, items }
}

fn vanished(check_list_id: i64) -> AppError {
    AppError::not_found("checklist", "id", check_list_id)
}

#[async_trait]
impl CheckListRepository for PgCheckListRepository {
    async fn create(
        &self,
        target_schedule: i64,
        items: Vec<CheckListItemDraft>,
    ) -> AppResult<CheckListDetail> {
        use crate::schema::check_lists;
        let mut conn = self.pool.get().await?;

        conn.transaction::<_, AppError, _>(|conn| {
            async move {
                let check_list_id: i64 = diesel::insert_into(check_lists::table)
                    .values(&NewCheckList {
                        schedule_id: target_schedule,
                        is_active: true,
                    })
                    .returning(check_lists::id)
                    .get_result(conn)
                    .await?;

                insert_items(conn, check_list_id, items).await?;
                load_detail(conn, check_list_id)
                    .await?
                    .ok_or_else(|| vanished(check_list_id))
            }
            .scope_boxed()
        })
        .await
    }

    async fn find_by_id(&self, check_list_id: i64) -> AppResult<Option<CheckListDetail>> {
        let mut conn = self.pool.get().await?;
        load_detail(&mut conn, check_list_id).await
    }

    async fn find_by_schedule_id(&self, target_schedule: i64) -> AppResult<Option<CheckList>> {
        use crate::schema::check_lists::dsl::*;
        let mut conn = self.pool.get().await?;

        check_lists
            .filter(schedule_id.eq(target_schedule))
            .select(CheckList::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(AppError::from)
    }

    async fn find_by_schedule_ids(&self, schedule_ids: &[i64]) -> AppResult<Vec<CheckList>> {
        use crate::schema::check_lists::dsl::*;
        if schedule_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await?;

        check_lists
            .filter(schedule_id.eq_any(schedule_ids))
            .order(id.asc())
            .select(CheckList::as_select())
            .load(&mut conn)
            .await
            .map_err(AppError::from)
    }

    async fn replace_items(
        &self,
        check_list_id: i64,
        items: Vec<CheckListItemDraft>,
    ) -> AppResult<CheckListDetail> {
        use crate::schema::check_list_items;
        let mut conn = self.pool.get().await?;

        conn.transaction::<_, AppError, _>(|conn| {
            async move {
                // item_assigns rows cascade
                diesel::delete(
                    check_list_items::table
                        .filter(check_list_items::check_list_id.eq(check_list_id)),
                )
                .execute(conn)
                .await?;

                insert_items(conn, check_list_id, items).await?;
                load_detail(conn, check_list_id)
                    .await?
                    .ok_or_else(|| vanished(check_list_id))
            }
            .scope_boxed()
        })
        .await
    }

    async fn set_active(&self, check_list_id: i64, active: bool) -> AppResult<CheckList> {
        use crate::schema::check_lists::dsl::*;
        let mut conn = self.pool.get().await?;

        diesel::update(check_lists.filter(id.eq(check_list_id)))
            .set(is_active.eq(active))
            .returning(CheckList::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(AppError::from)
    }

    async fn delete(&self, check_list_id: i64) -> AppResult<usize> {
        use crate::schema::check_lists::dsl::*;
        let mut conn = self.pool.get().await?;

        diesel::delete(check_lists.filter(id.eq(check_list_id)))
            .execute(&mut conn)
            .await
            .map_err(AppError::from)
    }
}
