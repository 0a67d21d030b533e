use std::collections::HashMap;

use jiff::ToSpan;
use jiff::civil::{Date, DateTime};
use jiff_diesel::ToDiesel;

use super::access::ClubAccess;
use crate::error::{AppError, AppResult};
use crate::models::{Club, NewSchedule, Schedule, UpdateSchedule};
use crate::repositories::Repositories;
use crate::utils::time;

/// A schedule and the id of its active checklist, if any.
#[derive(Debug, Clone)]
pub struct ScheduleView {
    pub schedule: Schedule,
    pub check_list_id: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct ScheduleWithClub {
    pub view: ScheduleView,
    pub club_name: String,
}

#[derive(Debug, Clone)]
pub struct ScheduleInput {
    pub title: String,
    pub content: String,
    pub start_date: DateTime,
    pub end_date: DateTime,
    pub spot: String,
}

pub fn ensure_datetime_order(start: DateTime, end: DateTime) -> AppResult<()> {
    if start > end {
        return Err(AppError::bad_request(
            "start date must not be after end date",
        ));
    }
    Ok(())
}

fn first_of_next_month(day: Date) -> AppResult<Date> {
    day.first_of_month()
        .checked_add(1.month())
        .map_err(|e| AppError::Internal {
            source: anyhow::anyhow!("Month out of range: {e}"),
        })
}

/// Query window `[start, end)` for schedule listings.
///
/// Both dates select those days' midnights; a lone start runs to the first day of
/// the following month; anything else is the month containing `today`.
pub fn date_range(
    start: Option<Date>,
    end: Option<Date>,
    today: Date,
) -> AppResult<(DateTime, DateTime)> {
    let (from, to) = match (start, end) {
        (Some(start), Some(end)) => (start, end),
        (Some(start), None) => (start, first_of_next_month(start)?),
        _ => (today.first_of_month(), first_of_next_month(today)?),
    };
    let (from, to) = (from.at(0, 0, 0, 0), to.at(0, 0, 0, 0));
    ensure_datetime_order(from, to)?;
    Ok((from, to))
}

#[derive(Clone)]
pub struct ScheduleService {
    repos: Repositories,
    access: ClubAccess,
}

impl ScheduleService {
    pub fn new(repos: Repositories, access: ClubAccess) -> Self {
        Self { repos, access }
    }

    async fn with_check_lists(&self, schedules: Vec<Schedule>) -> AppResult<Vec<ScheduleView>> {
        let ids: Vec<i64> = schedules.iter().map(|s| s.id).collect();
        let check_lists: HashMap<i64, i64> = self
            .repos
            .check_lists
            .find_by_schedule_ids(&ids)
            .await?
            .into_iter()
            .filter(|cl| cl.is_active)
            .map(|cl| (cl.schedule_id, cl.id))
            .collect();

        Ok(schedules
            .into_iter()
            .map(|schedule| ScheduleView {
                check_list_id: check_lists.get(&schedule.id).copied(),
                schedule,
            })
            .collect())
    }

    async fn view(&self, schedule: Schedule) -> AppResult<ScheduleView> {
        let mut views = self.with_check_lists(vec![schedule]).await?;
        views
            .pop()
            .ok_or_else(|| anyhow::anyhow!("schedule view vanished").into())
    }

    /// An active schedule; deactivated ones are reported as missing.
    pub async fn active_schedule(&self, schedule_id: i64) -> AppResult<Schedule> {
        self.repos
            .schedules
            .find_by_id(schedule_id)
            .await?
            .filter(|s| s.is_active)
            .ok_or_else(|| AppError::not_found("schedule", "id", schedule_id))
    }

    pub async fn list_by_club(
        &self,
        actor_id: i64,
        club_id: i64,
        start: Option<Date>,
        end: Option<Date>,
    ) -> AppResult<Vec<ScheduleView>> {
        self.access.require_member(club_id, actor_id).await?;
        let (from, to) = date_range(start, end, time::today())?;
        let schedules = self
            .repos
            .schedules
            .list_active_by_clubs_in_range(&[club_id], from, to)
            .await?;
        self.with_check_lists(schedules).await
    }

    /// Schedules of every active club the member has joined.
    pub async fn list_mine(
        &self,
        member_id: i64,
        start: Option<Date>,
        end: Option<Date>,
    ) -> AppResult<Vec<ScheduleWithClub>> {
        let (from, to) = date_range(start, end, time::today())?;

        let club_ids: Vec<i64> = self
            .repos
            .club_members
            .list_by_member(member_id)
            .await?
            .into_iter()
            .filter(|cm| cm.is_joining())
            .map(|cm| cm.club_id)
            .collect();
        let clubs: HashMap<i64, Club> = self
            .repos
            .clubs
            .find_by_ids(&club_ids)
            .await?
            .into_iter()
            .filter(|c| c.state)
            .map(|c| (c.id, c))
            .collect();
        let active_ids: Vec<i64> = clubs.keys().copied().collect();

        let schedules = self
            .repos
            .schedules
            .list_active_by_clubs_in_range(&active_ids, from, to)
            .await?;
        let views = self.with_check_lists(schedules).await?;

        Ok(views
            .into_iter()
            .filter_map(|view| {
                let club_name = clubs.get(&view.schedule.club_id)?.name.clone();
                Some(ScheduleWithClub { view, club_name })
            })
            .collect())
    }

    pub async fn get(&self, actor_id: i64, schedule_id: i64) -> AppResult<ScheduleView> {
        let schedule = self.active_schedule(schedule_id).await?;
        self.access.require_member(schedule.club_id, actor_id).await?;
        self.view(schedule).await
    }

    pub async fn create(
        &self,
        actor_id: i64,
        club_id: i64,
        input: ScheduleInput,
    ) -> AppResult<ScheduleView> {
        self.access.require_manager(club_id, actor_id).await?;
        ensure_datetime_order(input.start_date, input.end_date)?;

        let schedule = self
            .repos
            .schedules
            .create(NewSchedule {
                club_id,
                title: input.title,
                content: input.content,
                start_date: input.start_date.to_diesel(),
                end_date: input.end_date.to_diesel(),
                spot: input.spot,
            })
            .await?;
        tracing::info!(schedule_id = schedule.id, club_id, "Schedule created");
        Ok(ScheduleView {
            schedule,
            check_list_id: None,
        })
    }

    pub async fn update(
        &self,
        actor_id: i64,
        schedule_id: i64,
        input: ScheduleInput,
    ) -> AppResult<ScheduleView> {
        let schedule = self.active_schedule(schedule_id).await?;
        self.access.require_manager(schedule.club_id, actor_id).await?;
        ensure_datetime_order(input.start_date, input.end_date)?;

        let schedule = self
            .repos
            .schedules
            .update(
                schedule_id,
                UpdateSchedule {
                    title: Some(input.title),
                    content: Some(input.content),
                    start_date: Some(input.start_date.to_diesel()),
                    end_date: Some(input.end_date.to_diesel()),
                    spot: Some(input.spot),
                    is_active: None,
                },
            )
            .await?;
        self.view(schedule).await
    }

    /// Removes the schedule, or only deactivates it together with an active checklist.
    pub async fn delete(&self, actor_id: i64, schedule_id: i64) -> AppResult<()> {
        let schedule = self.active_schedule(schedule_id).await?;
        self.access.require_manager(schedule.club_id, actor_id).await?;

        match self.repos.check_lists.find_by_schedule_id(schedule_id).await? {
            Some(check_list) if check_list.is_active => {
                self.repos
                    .schedules
                    .update(
                        schedule_id,
                        UpdateSchedule {
                            is_active: Some(false),
                            ..Default::default()
                        },
                    )
                    .await?;
                self.repos
                    .check_lists
                    .set_active(check_list.id, false)
                    .await?;
                tracing::info!(schedule_id, "Schedule deactivated");
            }
            _ => {
                self.repos.schedules.delete(schedule_id).await?;
                tracing::info!(schedule_id, "Schedule deleted");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CheckListItemCategory, CheckListItemDraft, ClubMemberState};
    use crate::services::test_support::{club, join, member};
    use jiff::civil::{date, datetime};
    use proptest::prelude::*;

    fn service(repos: &Repositories) -> ScheduleService {
        ScheduleService::new(
            repos.clone(),
            ClubAccess::new(repos.clubs.clone(), repos.club_members.clone()),
        )
    }

    fn input(start: DateTime, end: DateTime) -> ScheduleInput {
        ScheduleInput {
            title: "Long run".to_string(),
            content: "10km".to_string(),
            start_date: start,
            end_date: end,
            spot: "Park".to_string(),
        }
    }

    #[test]
    fn test_date_range_variants() {
        let today = date(2025, 2, 14);
        assert_eq!(
            date_range(None, None, today).unwrap(),
            (datetime(2025, 2, 1, 0, 0, 0, 0), datetime(2025, 3, 1, 0, 0, 0, 0))
        );
        assert_eq!(
            date_range(Some(date(2025, 12, 20)), None, today).unwrap(),
            (datetime(2025, 12, 20, 0, 0, 0, 0), datetime(2026, 1, 1, 0, 0, 0, 0))
        );
        assert_eq!(
            date_range(Some(date(2025, 1, 3)), Some(date(2025, 1, 9)), today).unwrap(),
            (datetime(2025, 1, 3, 0, 0, 0, 0), datetime(2025, 1, 9, 0, 0, 0, 0))
        );
        assert!(matches!(
            date_range(Some(date(2025, 1, 9)), Some(date(2025, 1, 3)), today),
            Err(AppError::BadRequest { .. })
        ));
    }

    proptest! {
        #[test]
        fn prop_default_range_covers_today(year in 2000i16..2100, month in 1i8..=12, day in 1i8..=28) {
            let today = date(year, month, day);
            let (from, to) = date_range(None, None, today).unwrap();
            let noon = today.at(12, 0, 0, 0);
            prop_assert!(from <= noon && noon < to);
            prop_assert_eq!(from.day(), 1);
            prop_assert_eq!(to.day(), 1);
        }
    }

    #[tokio::test]
    async fn test_create_and_list_by_range() {
        let repos = Repositories::in_memory();
        let svc = service(&repos);
        let host = member(&repos, "host").await;
        let outsider = member(&repos, "outsider").await;
        let club = club(&repos, host.id, true).await;

        let created = svc
            .create(
                host.id,
                club.id,
                input(datetime(2025, 3, 10, 9, 0, 0, 0), datetime(2025, 3, 10, 12, 0, 0, 0)),
            )
            .await
            .unwrap();
        svc.create(
            host.id,
            club.id,
            input(datetime(2025, 4, 1, 9, 0, 0, 0), datetime(2025, 4, 1, 12, 0, 0, 0)),
        )
        .await
        .unwrap();

        let march = svc
            .list_by_club(host.id, club.id, Some(date(2025, 3, 1)), None)
            .await
            .unwrap();
        assert_eq!(march.len(), 1);
        assert_eq!(march[0].schedule.id, created.schedule.id);

        assert!(matches!(
            svc.list_by_club(outsider.id, club.id, None, None).await,
            Err(AppError::Forbidden { .. })
        ));
        assert!(matches!(
            svc.create(
                host.id,
                club.id,
                input(datetime(2025, 3, 2, 0, 0, 0, 0), datetime(2025, 3, 1, 0, 0, 0, 0)),
            )
            .await,
            Err(AppError::BadRequest { .. })
        ));
    }

    #[tokio::test]
    async fn test_list_mine_only_joined_clubs() {
        let repos = Repositories::in_memory();
        let svc = service(&repos);
        let host = member(&repos, "host").await;
        let a = member(&repos, "a").await;
        let joined = club(&repos, host.id, true).await;
        let applied = club(&repos, host.id, true).await;
        join(&repos, joined.id, a.id, ClubMemberState::Joining).await;
        join(&repos, applied.id, a.id, ClubMemberState::Applying).await;

        let when = (datetime(2025, 5, 5, 10, 0, 0, 0), datetime(2025, 5, 5, 11, 0, 0, 0));
        svc.create(host.id, joined.id, input(when.0, when.1)).await.unwrap();
        svc.create(host.id, applied.id, input(when.0, when.1)).await.unwrap();

        let mine = svc
            .list_mine(a.id, Some(date(2025, 5, 1)), Some(date(2025, 6, 1)))
            .await
            .unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].club_name, joined.name);
    }

    #[tokio::test]
    async fn test_delete_deactivates_when_checklist_is_active() {
        let repos = Repositories::in_memory();
        let svc = service(&repos);
        let host = member(&repos, "host").await;
        let club = club(&repos, host.id, true).await;
        let when = (datetime(2025, 5, 5, 10, 0, 0, 0), datetime(2025, 5, 5, 11, 0, 0, 0));

        let plain = svc.create(host.id, club.id, input(when.0, when.1)).await.unwrap();
        svc.delete(host.id, plain.schedule.id).await.unwrap();
        assert!(
            repos
                .schedules
                .find_by_id(plain.schedule.id)
                .await
                .unwrap()
                .is_none()
        );

        let tracked = svc.create(host.id, club.id, input(when.0, when.1)).await.unwrap();
        let check_list = repos
            .check_lists
            .create(
                tracked.schedule.id,
                vec![CheckListItemDraft {
                    content: "tent".to_string(),
                    category: CheckListItemCategory::Preparation,
                    sequence: 1,
                    is_checked: false,
                    assigns: vec![],
                }],
            )
            .await
            .unwrap();
        assert_eq!(
            svc.get(host.id, tracked.schedule.id).await.unwrap().check_list_id,
            Some(check_list.check_list.id)
        );

        svc.delete(host.id, tracked.schedule.id).await.unwrap();
        let kept = repos
            .schedules
            .find_by_id(tracked.schedule.id)
            .await
            .unwrap()
            .unwrap();
        assert!(!kept.is_active);
        assert!(matches!(
            svc.get(host.id, tracked.schedule.id).await,
            Err(AppError::NotFound { .. })
        ));
    }
}
