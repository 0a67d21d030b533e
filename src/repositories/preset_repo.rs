use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};

use crate::db::AsyncDbPool;
use crate::error::{AppError, AppResult};
use crate::models::{NewPreset, Preset, PresetDetail, PresetItem, PresetItemDraft};

#[async_trait]
pub trait PresetRepository: Send + Sync {
    async fn create(
        &self,
        new_preset: NewPreset,
        items: Vec<PresetItemDraft>,
    ) -> AppResult<PresetDetail>;

    async fn find_by_id(&self, preset_id: i64) -> AppResult<Option<PresetDetail>>;

    /// Presets of the owner ordered by id.
    async fn list_by_owner(&self, owner_id: i64) -> AppResult<Vec<PresetDetail>>;

    /// Renames the preset and replaces all of its items.
    async fn replace(
        &self,
        preset_id: i64,
        name: String,
        items: Vec<PresetItemDraft>,
    ) -> AppResult<PresetDetail>;

    async fn delete(&self, preset_id: i64) -> AppResult<usize>;
}

#[derive(Clone)]
pub struct PgPresetRepository {
    pool: AsyncDbPool,
}

impl PgPresetRepository {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }
}

async fn insert_items(
    conn: &mut AsyncPgConnection,
    preset_id: i64,
    drafts: Vec<PresetItemDraft>,
) -> Result<Vec<PresetItem>, AppError> {
    use crate::schema::preset_items;

    let rows: Vec<_> = drafts.into_iter().map(|d| d.into_row(preset_id)).collect();
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    diesel::insert_into(preset_items::table)
        .values(&rows)
        .returning(PresetItem::as_returning())
        .get_results(conn)
        .await
        .map_err(AppError::from)
}

fn sorted(mut items: Vec<PresetItem>) -> Vec<PresetItem> {
    items.sort_by_key(|i| (i.sequence, i.id));
    items
}

#[async_trait]
impl PresetRepository for PgPresetRepository {
    async fn create(
        &self,
        new_preset: NewPreset,
        items: Vec<PresetItemDraft>,
    ) -> AppResult<PresetDetail> {
        use crate::schema::presets;
        let mut conn = self.pool.get().await?;

        conn.transaction::<_, AppError, _>(|conn| {
            async move {
                let preset: Preset = diesel::insert_into(presets::table)
                    .values(&new_preset)
                    .returning(Preset::as_returning())
                    .get_result(conn)
                    .await?;
                let items = insert_items(conn, preset.id, items).await?;
                Ok(PresetDetail {
                    preset,
                    items: sorted(items),
                })
            }
            .scope_boxed()
        })
        .await
    }

    async fn find_by_id(&self, preset_id: i64) -> AppResult<Option<PresetDetail>> {
        use crate::schema::{preset_items, presets};
        let mut conn = self.pool.get().await?;

        let Some(preset) = presets::table
            .filter(presets::id.eq(preset_id))
            .select(Preset::as_select())
            .first(&mut conn)
            .await
            .optional()?
        else {
            return Ok(None);
        };

        let items = preset_items::table
            .filter(preset_items::preset_id.eq(preset_id))
            .order((preset_items::sequence.asc(), preset_items::id.asc()))
            .select(PresetItem::as_select())
            .load(&mut conn)
            .await?;

        Ok(Some(PresetDetail { preset, items }))
    }

    async fn list_by_owner(&self, target_owner: i64) -> AppResult<Vec<PresetDetail>> {
        use crate::schema::{preset_items, presets};
        let mut conn = self.pool.get().await?;

        let owned: Vec<Preset> = presets::table
            .filter(presets::owner_id.eq(target_owner))
            .order(presets::id.asc())
            .select(Preset::as_select())
            .load(&mut conn)
            .await?;

        let ids: Vec<i64> = owned.iter().map(|p| p.id).collect();
        let items: Vec<PresetItem> = preset_items::table
            .filter(preset_items::preset_id.eq_any(&ids))
            .order((preset_items::sequence.asc(), preset_items::id.asc()))
            .select(PresetItem::as_select())
            .load(&mut conn)
            .await?;

        Ok(owned
            .into_iter()
            .map(|preset| {
                let items = items
                    .iter()
                    .filter(|i| i.preset_id == preset.id)
                    .cloned()
                    .collect();
                PresetDetail { preset, items }
            })
            .collect())
    }

    async fn replace(
        &self,
        preset_id: i64,
        new_name: String,
        items: Vec<PresetItemDraft>,
    ) -> AppResult<PresetDetail> {
        use crate::schema::{preset_items, presets};
        let mut conn = self.pool.get().await?;

        conn.transaction::<_, AppError, _>(|conn| {
            async move {
                let preset: Preset = diesel::update(presets::table.filter(presets::id.eq(preset_id)))
                    .set(presets::name.eq(new_name))
                    .returning(Preset::as_returning())
                    .get_result(conn)
                    .await?;

                diesel::delete(preset_items::table.filter(preset_items::preset_id.eq(preset_id)))
                    .execute(conn)
                    .await?;

                let items = insert_items(conn, preset_id, items).await?;
                Ok(PresetDetail {
                    preset,
                    items: sorted(items),
                })
            }
            .scope_boxed()
        })
        .await
    }

    async fn delete(&self, preset_id: i64) -> AppResult<usize> {
        use crate::schema::presets::dsl::*;
        let mut conn = self.pool.get().await?;

        diesel::delete(presets.filter(id.eq(preset_id)))
            .execute(&mut conn)
            .await
            .map_err(AppError::from)
    }
}
