//! Preset DTOs.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::models::{CheckListItemCategory, ClubCategory, PresetDetail, PresetItemDraft};
use crate::services::{PlatformPreset, PlatformPresetItem};

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct PresetItemRequest {
    #[validate(length(min = 1, message = "content is required"))]
    pub content: String,
    pub category: CheckListItemCategory,
    pub sequence: i32,
}

impl From<PresetItemRequest> for PresetItemDraft {
    fn from(req: PresetItemRequest) -> Self {
        Self {
            content: req.content,
            category: req.category,
            sequence: req.sequence,
        }
    }
}

/// Body of both preset creation and replacement.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PresetRequest {
    #[validate(length(min = 1, max = 50, message = "name must be 1-50 characters"))]
    pub name: String,
    #[serde(default)]
    #[validate(nested)]
    pub preset_items: Vec<PresetItemRequest>,
}

impl PresetRequest {
    pub fn into_parts(self) -> (String, Vec<PresetItemDraft>) {
        (
            self.name,
            self.preset_items.into_iter().map(Into::into).collect(),
        )
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PlatformPresetQuery {
    #[param(value_type = String, example = "TRAVEL")]
    pub category: ClubCategory,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PresetItemDto {
    pub content: String,
    pub category: CheckListItemCategory,
    pub sequence: i32,
}

impl From<&PlatformPresetItem> for PresetItemDto {
    fn from(item: &PlatformPresetItem) -> Self {
        Self {
            content: item.content.clone(),
            category: item.category,
            sequence: item.sequence,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PresetDto {
    /// Absent for platform presets
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    pub preset_items: Vec<PresetItemDto>,
}

impl From<PresetDetail> for PresetDto {
    fn from(detail: PresetDetail) -> Self {
        Self {
            id: Some(detail.preset.id),
            name: detail.preset.name,
            preset_items: detail
                .items
                .into_iter()
                .map(|item| PresetItemDto {
                    content: item.content,
                    category: item.category,
                    sequence: item.sequence,
                })
                .collect(),
        }
    }
}

impl From<&PlatformPreset> for PresetDto {
    fn from(preset: &PlatformPreset) -> Self {
        Self {
            id: None,
            name: preset.name.clone(),
            preset_items: preset.preset_items.iter().map(Into::into).collect(),
        }
    }
}
