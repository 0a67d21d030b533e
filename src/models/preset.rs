use diesel::prelude::*;
use jiff_diesel::DateTime;

use super::CheckListItemCategory;

/// A member-owned checklist template.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = crate::schema::presets)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Preset {
    pub id: i64,
    pub owner_id: i64,
    pub name: String,
    pub created_at: DateTime,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = crate::schema::preset_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PresetItem {
    pub id: i64,
    pub preset_id: i64,
    pub content: String,
    pub category: CheckListItemCategory,
    pub sequence: i32,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::presets)]
pub struct NewPreset {
    pub owner_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::preset_items)]
pub struct NewPresetItem {
    pub preset_id: i64,
    pub content: String,
    pub category: CheckListItemCategory,
    pub sequence: i32,
}

#[derive(Debug, Clone)]
pub struct PresetItemDraft {
    pub content: String,
    pub category: CheckListItemCategory,
    pub sequence: i32,
}

impl PresetItemDraft {
    pub fn into_row(self, preset_id: i64) -> NewPresetItem {
        NewPresetItem {
            preset_id,
            content: self.content,
            category: self.category,
            sequence: self.sequence,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PresetDetail {
    pub preset: Preset,
    pub items: Vec<PresetItem>,
}
