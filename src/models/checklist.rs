use diesel::prelude::*;
use jiff_diesel::DateTime;

use super::CheckListItemCategory;

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = crate::schema::check_lists)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CheckList {
    pub id: i64,
    pub schedule_id: i64,
    pub is_active: bool,
    pub created_at: DateTime,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = crate::schema::check_list_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CheckListItem {
    pub id: i64,
    pub check_list_id: i64,
    pub content: String,
    pub category: CheckListItemCategory,
    pub sequence: i32,
    pub is_checked: bool,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = crate::schema::item_assigns)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ItemAssign {
    pub id: i64,
    pub check_list_item_id: i64,
    pub club_member_id: i64,
    pub is_checked: bool,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::check_lists)]
pub struct NewCheckList {
    pub schedule_id: i64,
    pub is_active: bool,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::check_list_items)]
pub struct NewCheckListItem {
    pub check_list_id: i64,
    pub content: String,
    pub category: CheckListItemCategory,
    pub sequence: i32,
    pub is_checked: bool,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::item_assigns)]
pub struct NewItemAssign {
    pub check_list_item_id: i64,
    pub club_member_id: i64,
    pub is_checked: bool,
}

/// An item to be written together with its assignments.
#[derive(Debug, Clone)]
pub struct CheckListItemDraft {
    pub content: String,
    pub category: CheckListItemCategory,
    pub sequence: i32,
    pub is_checked: bool,
    pub assigns: Vec<ItemAssignDraft>,
}

impl CheckListItemDraft {
    pub fn into_row(self, check_list_id: i64) -> (NewCheckListItem, Vec<ItemAssignDraft>) {
        (
            NewCheckListItem {
                check_list_id,
                content: self.content,
                category: self.category,
                sequence: self.sequence,
                is_checked: self.is_checked,
            },
            self.assigns,
        )
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ItemAssignDraft {
    pub club_member_id: i64,
    pub is_checked: bool,
}

impl ItemAssignDraft {
    pub fn into_row(self, check_list_item_id: i64) -> NewItemAssign {
        NewItemAssign {
            check_list_item_id,
            club_member_id: self.club_member_id,
            is_checked: self.is_checked,
        }
    }
}

/// A checklist with its items (ordered by sequence) and their assignments.
#[derive(Debug, Clone)]
pub struct CheckListDetail {
    pub check_list: CheckList,
    pub items: Vec<CheckListItemDetail>,
}

#[derive(Debug, Clone)]
pub struct CheckListItemDetail {
    pub item: CheckListItem,
    pub assigns: Vec<ItemAssign>,
}
