//! Checklist DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::ScheduleDto;
use crate::models::{CheckListItemCategory, CheckListItemDraft, ItemAssignDraft};
use crate::services::{CheckListView, ScheduleView};

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemAssignRequest {
    pub club_member_id: i64,
    #[serde(default)]
    pub is_checked: bool,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckListItemRequest {
    #[validate(length(min = 1, message = "content is required"))]
    pub content: String,
    pub category: CheckListItemCategory,
    pub sequence: i32,
    #[serde(default)]
    pub is_checked: bool,
    #[serde(default)]
    pub item_assigns: Vec<ItemAssignRequest>,
}

impl From<CheckListItemRequest> for CheckListItemDraft {
    fn from(req: CheckListItemRequest) -> Self {
        Self {
            content: req.content,
            category: req.category,
            sequence: req.sequence,
            is_checked: req.is_checked,
            assigns: req
                .item_assigns
                .into_iter()
                .map(|assign| ItemAssignDraft {
                    club_member_id: assign.club_member_id,
                    is_checked: assign.is_checked,
                })
                .collect(),
        }
    }
}

fn into_drafts(items: Vec<CheckListItemRequest>) -> Vec<CheckListItemDraft> {
    items.into_iter().map(Into::into).collect()
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckListRequest {
    pub schedule_id: i64,
    #[serde(default)]
    #[validate(nested)]
    pub check_list_items: Vec<CheckListItemRequest>,
}

impl CreateCheckListRequest {
    pub fn into_parts(self) -> (i64, Vec<CheckListItemDraft>) {
        (self.schedule_id, into_drafts(self.check_list_items))
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCheckListRequest {
    #[serde(default)]
    #[validate(nested)]
    pub check_list_items: Vec<CheckListItemRequest>,
}

impl UpdateCheckListRequest {
    pub fn into_drafts(self) -> Vec<CheckListItemDraft> {
        into_drafts(self.check_list_items)
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemAssignDto {
    pub id: i64,
    pub club_member_id: i64,
    pub club_member_name: Option<String>,
    pub is_checked: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckListItemDto {
    pub id: i64,
    pub content: String,
    pub category: CheckListItemCategory,
    pub sequence: i32,
    pub is_checked: bool,
    pub item_assigns: Vec<ItemAssignDto>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckListDto {
    pub id: i64,
    pub is_active: bool,
    pub schedule: ScheduleDto,
    pub check_list_items: Vec<CheckListItemDto>,
}

impl From<CheckListView> for CheckListDto {
    fn from(view: CheckListView) -> Self {
        let check_list = &view.detail.check_list;
        let check_list_items = view
            .detail
            .items
            .iter()
            .map(|detail| CheckListItemDto {
                id: detail.item.id,
                content: detail.item.content.clone(),
                category: detail.item.category,
                sequence: detail.item.sequence,
                is_checked: detail.item.is_checked,
                item_assigns: detail
                    .assigns
                    .iter()
                    .map(|assign| ItemAssignDto {
                        id: assign.id,
                        club_member_id: assign.club_member_id,
                        club_member_name: view
                            .assignee_name(assign.club_member_id)
                            .map(String::from),
                        is_checked: assign.is_checked,
                    })
                    .collect(),
            })
            .collect();

        Self {
            id: check_list.id,
            is_active: check_list.is_active,
            schedule: ScheduleView {
                schedule: view.schedule.clone(),
                check_list_id: check_list.is_active.then_some(check_list.id),
            }
            .into(),
            check_list_items,
        }
    }
}
