//! Schedule DTOs.

use jiff::civil::{Date, DateTime};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::services::{ScheduleInput, ScheduleView, ScheduleWithClub};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ScheduleRangeQuery {
    /// First day of the range (yyyy-MM-dd)
    #[param(value_type = Option<String>, format = Date)]
    pub start_date: Option<Date>,
    /// Last day of the range (yyyy-MM-dd)
    #[param(value_type = Option<String>, format = Date)]
    pub end_date: Option<Date>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateScheduleRequest {
    pub club_id: i64,
    #[validate(length(min = 1, max = 50, message = "title must be 1-50 characters"))]
    pub title: String,
    pub content: String,
    #[schema(value_type = String, format = DateTime, example = "2025-07-01T10:00:00")]
    pub start_date: DateTime,
    #[schema(value_type = String, format = DateTime, example = "2025-07-01T18:00:00")]
    pub end_date: DateTime,
    #[validate(length(min = 1, message = "spot is required"))]
    pub spot: String,
}

impl CreateScheduleRequest {
    pub fn into_parts(self) -> (i64, ScheduleInput) {
        (
            self.club_id,
            ScheduleInput {
                title: self.title,
                content: self.content,
                start_date: self.start_date,
                end_date: self.end_date,
                spot: self.spot,
            },
        )
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateScheduleRequest {
    #[validate(length(min = 1, max = 50, message = "title must be 1-50 characters"))]
    pub title: String,
    pub content: String,
    #[schema(value_type = String, format = DateTime)]
    pub start_date: DateTime,
    #[schema(value_type = String, format = DateTime)]
    pub end_date: DateTime,
    #[validate(length(min = 1, message = "spot is required"))]
    pub spot: String,
}

impl From<UpdateScheduleRequest> for ScheduleInput {
    fn from(req: UpdateScheduleRequest) -> Self {
        Self {
            title: req.title,
            content: req.content,
            start_date: req.start_date,
            end_date: req.end_date,
            spot: req.spot,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleDto {
    pub id: i64,
    pub title: String,
    #[schema(value_type = String, format = DateTime)]
    pub start_date: DateTime,
    #[schema(value_type = String, format = DateTime)]
    pub end_date: DateTime,
    pub club_id: i64,
    pub check_list_id: Option<i64>,
}

impl From<ScheduleView> for ScheduleDto {
    fn from(view: ScheduleView) -> Self {
        let schedule = view.schedule;
        Self {
            id: schedule.id,
            title: schedule.title,
            start_date: schedule.start_date.to_jiff(),
            end_date: schedule.end_date.to_jiff(),
            club_id: schedule.club_id,
            check_list_id: view.check_list_id,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleWithClubDto {
    pub id: i64,
    pub title: String,
    #[schema(value_type = String, format = DateTime)]
    pub start_date: DateTime,
    #[schema(value_type = String, format = DateTime)]
    pub end_date: DateTime,
    pub club_id: i64,
    pub club_name: String,
    pub check_list_id: Option<i64>,
}

impl From<ScheduleWithClub> for ScheduleWithClubDto {
    fn from(item: ScheduleWithClub) -> Self {
        let ScheduleDto {
            id,
            title,
            start_date,
            end_date,
            club_id,
            check_list_id,
        } = item.view.into();
        Self {
            id,
            title,
            start_date,
            end_date,
            club_id,
            club_name: item.club_name,
            check_list_id,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleDetailDto {
    pub id: i64,
    pub title: String,
    pub content: String,
    #[schema(value_type = String, format = DateTime)]
    pub start_date: DateTime,
    #[schema(value_type = String, format = DateTime)]
    pub end_date: DateTime,
    pub spot: String,
    pub club_id: i64,
    pub check_list_id: Option<i64>,
}

impl From<ScheduleView> for ScheduleDetailDto {
    fn from(view: ScheduleView) -> Self {
        let schedule = view.schedule;
        Self {
            id: schedule.id,
            title: schedule.title,
            content: schedule.content,
            start_date: schedule.start_date.to_jiff(),
            end_date: schedule.end_date.to_jiff(),
            spot: schedule.spot,
            club_id: schedule.club_id,
            check_list_id: view.check_list_id,
        }
    }
}
