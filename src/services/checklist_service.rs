use std::collections::{HashMap, HashSet};

use super::access::ClubAccess;
use crate::error::{AppError, AppResult};
use crate::models::{CheckListDetail, CheckListItemDraft, ClubMemberState, Schedule};
use crate::repositories::Repositories;

/// A checklist with its schedule and the nicknames of the assigned club members.
#[derive(Debug, Clone)]
pub struct CheckListView {
    pub detail: CheckListDetail,
    pub schedule: Schedule,
    /// Keyed by club member id
    pub assignee_names: HashMap<i64, String>,
}

impl CheckListView {
    pub fn assignee_name(&self, club_member_id: i64) -> Option<&str> {
        self.assignee_names.get(&club_member_id).map(String::as_str)
    }
}

#[derive(Clone)]
pub struct CheckListService {
    repos: Repositories,
    access: ClubAccess,
}

impl CheckListService {
    pub fn new(repos: Repositories, access: ClubAccess) -> Self {
        Self { repos, access }
    }

    async fn active_schedule(&self, schedule_id: i64) -> AppResult<Schedule> {
        self.repos
            .schedules
            .find_by_id(schedule_id)
            .await?
            .filter(|s| s.is_active)
            .ok_or_else(|| AppError::not_found("schedule", "id", schedule_id))
    }

    async fn active_detail(&self, check_list_id: i64) -> AppResult<(CheckListDetail, Schedule)> {
        let detail = self
            .repos
            .check_lists
            .find_by_id(check_list_id)
            .await?
            .filter(|d| d.check_list.is_active)
            .ok_or_else(|| AppError::not_found("checklist", "id", check_list_id))?;
        let schedule_id = detail.check_list.schedule_id;
        let schedule = self
            .repos
            .schedules
            .find_by_id(schedule_id)
            .await?
            .ok_or_else(|| AppError::not_found("schedule", "id", schedule_id))?;
        Ok((detail, schedule))
    }

    /// Nicknames of the club's member rows, keyed by club member id.
    async fn club_member_names(&self, club_id: i64) -> AppResult<HashMap<i64, String>> {
        let rows = self.repos.club_members.list_by_club(club_id).await?;
        let member_ids: Vec<i64> = rows.iter().map(|cm| cm.member_id).collect();
        let nicknames: HashMap<i64, String> = self
            .repos
            .members
            .find_by_ids(&member_ids)
            .await?
            .into_iter()
            .map(|m| (m.id, m.nickname))
            .collect();

        Ok(rows
            .into_iter()
            .filter_map(|cm| Some((cm.id, nicknames.get(&cm.member_id)?.clone())))
            .collect())
    }

    async fn view(&self, detail: CheckListDetail, schedule: Schedule) -> AppResult<CheckListView> {
        let assignee_names = self.club_member_names(schedule.club_id).await?;
        Ok(CheckListView {
            detail,
            schedule,
            assignee_names,
        })
    }

    /// Every assignee must be a current member row of the club, listed once per item.
    async fn ensure_assignees(&self, club_id: i64, items: &[CheckListItemDraft]) -> AppResult<()> {
        for item in items {
            let mut seen = HashSet::new();
            if let Some(twice) = item
                .assigns
                .iter()
                .find(|assign| !seen.insert(assign.club_member_id))
            {
                return Err(AppError::bad_request(format!(
                    "club member {} is assigned twice to '{}'",
                    twice.club_member_id, item.content
                )));
            }
        }

        let seated: HashSet<i64> = self
            .repos
            .club_members
            .list_by_club(club_id)
            .await?
            .into_iter()
            .filter(|cm| cm.state != ClubMemberState::Withdrawn)
            .map(|cm| cm.id)
            .collect();

        let stranger = items
            .iter()
            .flat_map(|item| item.assigns.iter())
            .find(|assign| !seated.contains(&assign.club_member_id));
        match stranger {
            Some(assign) => Err(AppError::forbidden(format!(
                "club member {} does not belong to this club",
                assign.club_member_id
            ))),
            None => Ok(()),
        }
    }

    pub async fn create(
        &self,
        actor_id: i64,
        schedule_id: i64,
        items: Vec<CheckListItemDraft>,
    ) -> AppResult<CheckListView> {
        let schedule = self.active_schedule(schedule_id).await?;
        self.access.require_manager(schedule.club_id, actor_id).await?;

        if self
            .repos
            .check_lists
            .find_by_schedule_id(schedule_id)
            .await?
            .is_some()
        {
            return Err(AppError::conflict("the schedule already has a checklist"));
        }
        self.ensure_assignees(schedule.club_id, &items).await?;

        let detail = self.repos.check_lists.create(schedule_id, items).await?;
        tracing::info!(check_list_id = detail.check_list.id, schedule_id, "Checklist created");
        self.view(detail, schedule).await
    }

    pub async fn get(&self, actor_id: i64, check_list_id: i64) -> AppResult<CheckListView> {
        let (detail, schedule) = self.active_detail(check_list_id).await?;
        self.access.require_member(schedule.club_id, actor_id).await?;
        self.view(detail, schedule).await
    }

    /// Replaces every item (and its assignments) of the checklist.
    pub async fn replace(
        &self,
        actor_id: i64,
        check_list_id: i64,
        items: Vec<CheckListItemDraft>,
    ) -> AppResult<CheckListView> {
        let (_, schedule) = self.active_detail(check_list_id).await?;
        self.access.require_manager(schedule.club_id, actor_id).await?;
        self.ensure_assignees(schedule.club_id, &items).await?;

        let detail = self
            .repos
            .check_lists
            .replace_items(check_list_id, items)
            .await?;
        self.view(detail, schedule).await
    }

    /// Deletes the checklist and returns what it looked like.
    pub async fn delete(&self, actor_id: i64, check_list_id: i64) -> AppResult<CheckListView> {
        let (detail, schedule) = self.active_detail(check_list_id).await?;
        self.access.require_manager(schedule.club_id, actor_id).await?;

        let view = self.view(detail, schedule).await?;
        self.repos.check_lists.delete(check_list_id).await?;
        tracing::info!(check_list_id, "Checklist deleted");
        Ok(view)
    }

    /// Active checklists across the schedules of a club.
    pub async fn list_by_club(&self, actor_id: i64, club_id: i64) -> AppResult<Vec<CheckListView>> {
        self.access.require_member(club_id, actor_id).await?;

        let schedules: HashMap<i64, Schedule> = self
            .repos
            .schedules
            .list_by_club(club_id)
            .await?
            .into_iter()
            .map(|s| (s.id, s))
            .collect();
        let schedule_ids: Vec<i64> = schedules.keys().copied().collect();
        let mut check_lists = self
            .repos
            .check_lists
            .find_by_schedule_ids(&schedule_ids)
            .await?;
        check_lists.retain(|cl| cl.is_active);
        check_lists.sort_by_key(|cl| cl.id);

        let names = self.club_member_names(club_id).await?;
        let mut views = Vec::with_capacity(check_lists.len());
        for check_list in check_lists {
            let Some(detail) = self.repos.check_lists.find_by_id(check_list.id).await? else {
                continue;
            };
            let Some(schedule) = schedules.get(&check_list.schedule_id) else {
                continue;
            };
            views.push(CheckListView {
                detail,
                schedule: schedule.clone(),
                assignee_names: names.clone(),
            });
        }
        Ok(views)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        CheckListItemCategory, ClubMember, ItemAssignDraft, NewSchedule,
    };
    use crate::services::test_support::{club, join, member};
    use jiff::civil::datetime;
    use jiff_diesel::ToDiesel;

    fn service(repos: &Repositories) -> CheckListService {
        CheckListService::new(
            repos.clone(),
            ClubAccess::new(repos.clubs.clone(), repos.club_members.clone()),
        )
    }

    async fn schedule(repos: &Repositories, club_id: i64) -> Schedule {
        repos
            .schedules
            .create(NewSchedule {
                club_id,
                title: "Camp".to_string(),
                content: "Overnight".to_string(),
                start_date: datetime(2025, 7, 1, 10, 0, 0, 0).to_diesel(),
                end_date: datetime(2025, 7, 2, 10, 0, 0, 0).to_diesel(),
                spot: "Lake".to_string(),
            })
            .await
            .unwrap()
    }

    fn item(content: &str, sequence: i32, assignees: &[&ClubMember]) -> CheckListItemDraft {
        CheckListItemDraft {
            content: content.to_string(),
            category: CheckListItemCategory::Preparation,
            sequence,
            is_checked: false,
            assigns: assignees
                .iter()
                .map(|cm| ItemAssignDraft {
                    club_member_id: cm.id,
                    is_checked: false,
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_create_once_with_names() {
        let repos = Repositories::in_memory();
        let svc = service(&repos);
        let host = member(&repos, "host").await;
        let a = member(&repos, "a").await;
        let club = club(&repos, host.id, true).await;
        let seat = join(&repos, club.id, a.id, ClubMemberState::Joining).await;
        let schedule = schedule(&repos, club.id).await;

        let view = svc
            .create(host.id, schedule.id, vec![item("tent", 2, &[&seat]), item("food", 1, &[])])
            .await
            .unwrap();
        assert_eq!(view.detail.items[0].item.content, "food");
        assert_eq!(view.assignee_name(seat.id), Some("a"));

        assert!(matches!(
            svc.create(host.id, schedule.id, vec![]).await,
            Err(AppError::Conflict { .. })
        ));
        assert!(matches!(
            svc.create(a.id, schedule.id, vec![]).await,
            Err(AppError::Forbidden { .. })
        ));
    }

    #[tokio::test]
    async fn test_assignee_from_other_club_is_forbidden() {
        let repos = Repositories::in_memory();
        let svc = service(&repos);
        let host = member(&repos, "host").await;
        let a = member(&repos, "a").await;
        let mine = club(&repos, host.id, true).await;
        let other = club(&repos, a.id, true).await;
        let foreign = repos
            .club_members
            .find_by_club_and_member(other.id, a.id)
            .await
            .unwrap()
            .unwrap();
        let schedule = schedule(&repos, mine.id).await;

        assert!(matches!(
            svc.create(host.id, schedule.id, vec![item("tent", 1, &[&foreign])]).await,
            Err(AppError::Forbidden { .. })
        ));
    }

    #[tokio::test]
    async fn test_duplicate_assignee_keeps_previous_items() {
        let repos = Repositories::in_memory();
        let svc = service(&repos);
        let host = member(&repos, "host").await;
        let a = member(&repos, "a").await;
        let club = club(&repos, host.id, true).await;
        let seat = join(&repos, club.id, a.id, ClubMemberState::Joining).await;
        let schedule = schedule(&repos, club.id).await;
        let id = svc
            .create(host.id, schedule.id, vec![item("tent", 1, &[])])
            .await
            .unwrap()
            .detail
            .check_list
            .id;

        let twice = svc
            .replace(
                host.id,
                id,
                vec![item("stove", 1, &[]), item("gas", 2, &[&seat, &seat])],
            )
            .await;
        assert!(matches!(twice, Err(AppError::BadRequest { .. })));

        let kept = svc.get(host.id, id).await.unwrap();
        let contents: Vec<&str> = kept
            .detail
            .items
            .iter()
            .map(|i| i.item.content.as_str())
            .collect();
        assert_eq!(contents, ["tent"]);
    }

    #[tokio::test]
    async fn test_replace_get_group_and_delete() {
        let repos = Repositories::in_memory();
        let svc = service(&repos);
        let host = member(&repos, "host").await;
        let a = member(&repos, "a").await;
        let club = club(&repos, host.id, true).await;
        join(&repos, club.id, a.id, ClubMemberState::Joining).await;
        let schedule = schedule(&repos, club.id).await;
        let created = svc
            .create(host.id, schedule.id, vec![item("tent", 1, &[])])
            .await
            .unwrap();
        let id = created.detail.check_list.id;

        let replaced = svc
            .replace(host.id, id, vec![item("stove", 1, &[]), item("gas", 2, &[])])
            .await
            .unwrap();
        assert_eq!(replaced.detail.items.len(), 2);

        let seen = svc.get(a.id, id).await.unwrap();
        assert_eq!(seen.detail.items[1].item.content, "gas");
        assert_eq!(svc.list_by_club(a.id, club.id).await.unwrap().len(), 1);

        let deleted = svc.delete(host.id, id).await.unwrap();
        assert_eq!(deleted.detail.check_list.id, id);
        assert!(matches!(svc.get(a.id, id).await, Err(AppError::NotFound { .. })));
        assert!(svc.list_by_club(a.id, club.id).await.unwrap().is_empty());
    }
}
