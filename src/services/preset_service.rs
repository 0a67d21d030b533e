use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::models::{CheckListItemCategory, ClubCategory, NewPreset, PresetDetail, PresetItemDraft};
use crate::repositories::Repositories;

const BUNDLED_PRESETS: &str = include_str!("../../resources/preset-data.json");

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformPreset {
    pub name: String,
    pub preset_items: Vec<PlatformPresetItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlatformPresetItem {
    pub content: String,
    pub category: CheckListItemCategory,
    pub sequence: i32,
}

/// Read-only presets shipped with the application, grouped by club category.
#[derive(Debug, Default)]
pub struct PlatformPresets {
    by_category: HashMap<ClubCategory, Vec<PlatformPreset>>,
}

impl PlatformPresets {
    pub fn parse(json: &str) -> AppResult<Self> {
        let raw: HashMap<String, Vec<PlatformPreset>> =
            serde_json::from_str(json).map_err(|e| AppError::Internal {
                source: anyhow::anyhow!("Failed to parse platform presets: {e}"),
            })?;

        let mut by_category = HashMap::with_capacity(raw.len());
        for (category, presets) in raw {
            by_category.insert(category.parse::<ClubCategory>()?, presets);
        }
        Ok(Self { by_category })
    }

    pub fn bundled() -> AppResult<Self> {
        Self::parse(BUNDLED_PRESETS)
    }

    pub fn for_category(&self, category: ClubCategory) -> &[PlatformPreset] {
        self.by_category
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

#[derive(Clone)]
pub struct PresetService {
    repos: Repositories,
    platform: Arc<PlatformPresets>,
}

impl PresetService {
    pub fn new(repos: Repositories, platform: Arc<PlatformPresets>) -> Self {
        Self { repos, platform }
    }

    async fn owned(&self, owner_id: i64, preset_id: i64) -> AppResult<PresetDetail> {
        let detail = self
            .repos
            .presets
            .find_by_id(preset_id)
            .await?
            .ok_or_else(|| AppError::not_found("preset", "id", preset_id))?;
        if detail.preset.owner_id != owner_id {
            return Err(AppError::forbidden("not the owner of this preset"));
        }
        Ok(detail)
    }

    pub async fn create(
        &self,
        owner_id: i64,
        name: String,
        items: Vec<PresetItemDraft>,
    ) -> AppResult<PresetDetail> {
        self.repos
            .presets
            .create(NewPreset { owner_id, name }, items)
            .await
    }

    pub async fn get(&self, owner_id: i64, preset_id: i64) -> AppResult<PresetDetail> {
        self.owned(owner_id, preset_id).await
    }

    pub async fn list(&self, owner_id: i64) -> AppResult<Vec<PresetDetail>> {
        self.repos.presets.list_by_owner(owner_id).await
    }

    pub async fn replace(
        &self,
        owner_id: i64,
        preset_id: i64,
        name: String,
        items: Vec<PresetItemDraft>,
    ) -> AppResult<PresetDetail> {
        self.owned(owner_id, preset_id).await?;
        self.repos.presets.replace(preset_id, name, items).await
    }

    pub async fn delete(&self, owner_id: i64, preset_id: i64) -> AppResult<()> {
        self.owned(owner_id, preset_id).await?;
        self.repos.presets.delete(preset_id).await?;
        Ok(())
    }

    pub fn platform(&self, category: ClubCategory) -> &[PlatformPreset] {
        self.platform.for_category(category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::member;

    fn service(repos: &Repositories) -> PresetService {
        PresetService::new(repos.clone(), Arc::new(PlatformPresets::default()))
    }

    fn draft(content: &str, sequence: i32) -> PresetItemDraft {
        PresetItemDraft {
            content: content.to_string(),
            category: CheckListItemCategory::Preparation,
            sequence,
        }
    }

    #[test]
    fn test_bundled_presets_parse() {
        let presets = PlatformPresets::bundled().unwrap();
        assert!(!presets.for_category(ClubCategory::Travel).is_empty());
        assert!(presets.for_category(ClubCategory::Work).is_empty());
    }

    #[test]
    fn test_unknown_category_is_rejected() {
        let err = PlatformPresets::parse(r#"{"DANCING": []}"#).unwrap_err();
        assert!(matches!(err, AppError::BadRequest { .. }));
    }

    #[tokio::test]
    async fn test_owner_only_access() {
        let repos = Repositories::in_memory();
        let svc = service(&repos);
        let owner = member(&repos, "owner").await;
        let other = member(&repos, "other").await;

        let created = svc
            .create(owner.id, "Camp".to_string(), vec![draft("b", 2), draft("a", 1)])
            .await
            .unwrap();
        assert_eq!(created.items[0].content, "a");
        let id = created.preset.id;

        assert!(matches!(svc.get(other.id, id).await, Err(AppError::Forbidden { .. })));
        assert!(matches!(svc.get(owner.id, 9999).await, Err(AppError::NotFound { .. })));

        let replaced = svc
            .replace(owner.id, id, "Hike".to_string(), vec![draft("boots", 1)])
            .await
            .unwrap();
        assert_eq!(replaced.preset.name, "Hike");
        assert_eq!(replaced.items.len(), 1);

        assert_eq!(svc.list(owner.id).await.unwrap().len(), 1);
        assert!(svc.list(other.id).await.unwrap().is_empty());

        assert!(matches!(svc.delete(other.id, id).await, Err(AppError::Forbidden { .. })));
        svc.delete(owner.id, id).await.unwrap();
        assert!(matches!(svc.get(owner.id, id).await, Err(AppError::NotFound { .. })));
    }
}
