//! In-process repository backend.
//!
//! Rows live in ordered maps behind a single `RwLock`. Unique constraints and
//! `ON DELETE` rules of the schema are reproduced so services behave the same
//! on both backends.

use std::collections::BTreeMap;

use async_trait::async_trait;
use jiff_diesel::ToDiesel;
use tokio::sync::RwLock;

use super::{
    CheckListRepository, ClubLinkRepository, ClubMemberRepository, ClubRepository,
    FriendRepository, HealthCheck, MemberRepository, PresetRepository, ScheduleRepository,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    CheckList, CheckListDetail, CheckListItem, CheckListItemDraft, Club, ClubLink, ClubMember,
    ClubMemberRole, ClubSearch, Friend, FriendStatus, ItemAssign, Member, NewClub, NewClubLink,
    NewClubMember, NewFriend, NewMember, NewPreset, NewSchedule, Preset, PresetDetail,
    PresetItem, PresetItemDraft, Schedule, UpdateClub, UpdateClubMember, UpdateMember,
    UpdateSchedule, ordered_pair,
};
use crate::utils::time;

#[derive(Clone, Default)]
struct Tables {
    next_id: i64,
    members: BTreeMap<i64, Member>,
    friends: BTreeMap<i64, Friend>,
    clubs: BTreeMap<i64, Club>,
    club_members: BTreeMap<i64, ClubMember>,
    club_links: BTreeMap<i64, ClubLink>,
    schedules: BTreeMap<i64, Schedule>,
    check_lists: BTreeMap<i64, CheckList>,
    check_list_items: BTreeMap<i64, CheckListItem>,
    item_assigns: BTreeMap<i64, ItemAssign>,
    presets: BTreeMap<i64, Preset>,
    preset_items: BTreeMap<i64, PresetItem>,
}

fn duplicate(entity: &str, field: &str, value: impl ToString) -> AppError {
    AppError::Duplicate {
        entity: entity.to_string(),
        field: field.to_string(),
        value: value.to_string(),
    }
}

/// Stands in for `RETURNING` on a row that does not exist.
fn missing_row() -> AppError {
    AppError::from(diesel::result::Error::NotFound)
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    /// Runs `f` as one unit: on error every table is restored as it was.
    fn atomically<T>(&mut self, f: impl FnOnce(&mut Tables) -> AppResult<T>) -> AppResult<T> {
        let snapshot = self.clone();
        let result = f(self);
        if result.is_err() {
            *self = snapshot;
        }
        result
    }

    fn insert_member(&mut self, new_member: NewMember) -> AppResult<Member> {
        if let Some(ref email) = new_member.email {
            if self.members.values().any(|m| m.email.as_ref() == Some(email)) {
                return Err(duplicate("member", "email", email));
            }
        }
        if self.members.values().any(|m| m.api_key == new_member.api_key) {
            return Err(duplicate("member", "api_key", &new_member.api_key));
        }
        if self
            .members
            .values()
            .any(|m| m.nickname == new_member.nickname && m.tag == new_member.tag)
        {
            return Err(duplicate(
                "member",
                "nickname_tag",
                format!("{}, {}", new_member.nickname, new_member.tag),
            ));
        }

        let id = self.next_id();
        let now = time::now().to_diesel();
        let member = Member {
            id,
            nickname: new_member.nickname,
            password: new_member.password,
            member_type: new_member.member_type,
            tag: new_member.tag,
            email: new_member.email,
            bio: new_member.bio,
            profile_image_url: None,
            api_key: new_member.api_key,
            created_at: now,
            updated_at: now,
        };
        self.members.insert(id, member.clone());
        Ok(member)
    }

    fn insert_club(&mut self, new_club: NewClub) -> AppResult<Club> {
        if new_club.maximum_capacity < 1 {
            return Err(AppError::Validation {
                field: "club.maximum_capacity".to_string(),
                reason: "check constraint violated".to_string(),
            });
        }

        let id = self.next_id();
        let club = Club {
            id,
            name: new_club.name,
            bio: new_club.bio,
            category: new_club.category,
            main_spot: new_club.main_spot,
            maximum_capacity: new_club.maximum_capacity,
            recruiting_status: new_club.recruiting_status,
            event_type: new_club.event_type,
            start_date: new_club.start_date,
            end_date: new_club.end_date,
            image_url: new_club.image_url,
            is_public: new_club.is_public,
            leader_id: new_club.leader_id,
            state: true,
            created_at: time::now().to_diesel(),
        };
        self.clubs.insert(id, club.clone());
        Ok(club)
    }

    fn insert_club_member(&mut self, new_member: NewClubMember) -> AppResult<ClubMember> {
        if self
            .club_members
            .values()
            .any(|cm| cm.club_id == new_member.club_id && cm.member_id == new_member.member_id)
        {
            return Err(duplicate(
                "club_member",
                "club_id_member_id",
                format!("{}, {}", new_member.club_id, new_member.member_id),
            ));
        }

        let id = self.next_id();
        let row = ClubMember {
            id,
            club_id: new_member.club_id,
            member_id: new_member.member_id,
            role: new_member.role,
            state: new_member.state,
            created_at: time::now().to_diesel(),
        };
        self.club_members.insert(id, row.clone());
        Ok(row)
    }

    fn remove_club(&mut self, club_id: i64) -> usize {
        let memberships: Vec<i64> = self
            .club_members
            .values()
            .filter(|cm| cm.club_id == club_id)
            .map(|cm| cm.id)
            .collect();
        for id in memberships {
            self.remove_club_member(id);
        }
        let schedules: Vec<i64> = self
            .schedules
            .values()
            .filter(|s| s.club_id == club_id)
            .map(|s| s.id)
            .collect();
        let check_lists: Vec<i64> = self
            .check_lists
            .values()
            .filter(|c| schedules.contains(&c.schedule_id))
            .map(|c| c.id)
            .collect();
        for id in check_lists {
            self.remove_check_list(id);
        }
        self.schedules.retain(|_, s| s.club_id != club_id);
        self.club_links.retain(|_, l| l.club_id != club_id);
        usize::from(self.clubs.remove(&club_id).is_some())
    }

    fn remove_club_member(&mut self, club_member_id: i64) -> usize {
        self.item_assigns
            .retain(|_, a| a.club_member_id != club_member_id);
        usize::from(self.club_members.remove(&club_member_id).is_some())
    }

    fn remove_check_list_items(&mut self, check_list_id: i64) {
        let item_ids: Vec<i64> = self
            .check_list_items
            .values()
            .filter(|i| i.check_list_id == check_list_id)
            .map(|i| i.id)
            .collect();
        self.item_assigns
            .retain(|_, a| !item_ids.contains(&a.check_list_item_id));
        self.check_list_items
            .retain(|_, i| i.check_list_id != check_list_id);
    }

    fn remove_check_list(&mut self, check_list_id: i64) -> usize {
        self.remove_check_list_items(check_list_id);
        usize::from(self.check_lists.remove(&check_list_id).is_some())
    }

    fn remove_preset(&mut self, preset_id: i64) -> usize {
        self.preset_items.retain(|_, i| i.preset_id != preset_id);
        usize::from(self.presets.remove(&preset_id).is_some())
    }

    fn insert_check_list_items(
        &mut self,
        check_list_id: i64,
        drafts: Vec<CheckListItemDraft>,
    ) -> AppResult<()> {
        for draft in drafts {
            let (row, assigns) = draft.into_row(check_list_id);
            let item_id = self.next_id();
            self.check_list_items.insert(
                item_id,
                CheckListItem {
                    id: item_id,
                    check_list_id: row.check_list_id,
                    content: row.content,
                    category: row.category,
                    sequence: row.sequence,
                    is_checked: row.is_checked,
                },
            );

            for assign in assigns {
                let row = assign.into_row(item_id);
                let taken = self.item_assigns.values().any(|a| {
                    a.check_list_item_id == row.check_list_item_id
                        && a.club_member_id == row.club_member_id
                });
                if taken {
                    return Err(duplicate(
                        "item_assign",
                        "check_list_item_id_club_member_id",
                        format!("{}, {}", row.check_list_item_id, row.club_member_id),
                    ));
                }
                let assign_id = self.next_id();
                self.item_assigns.insert(
                    assign_id,
                    ItemAssign {
                        id: assign_id,
                        check_list_item_id: row.check_list_item_id,
                        club_member_id: row.club_member_id,
                        is_checked: row.is_checked,
                    },
                );
            }
        }
        Ok(())
    }

    fn check_list_detail(&self, check_list_id: i64) -> Option<CheckListDetail> {
        let check_list = self.check_lists.get(&check_list_id)?.clone();
        let mut items: Vec<CheckListItem> = self
            .check_list_items
            .values()
            .filter(|i| i.check_list_id == check_list_id)
            .cloned()
            .collect();
        items.sort_by_key(|i| (i.sequence, i.id));
        let assigns: Vec<ItemAssign> = self
            .item_assigns
            .values()
            .filter(|a| items.iter().any(|i| i.id == a.check_list_item_id))
            .cloned()
            .collect();
        Some(super::checklist_repo::group_detail(check_list, items, assigns))
    }

    fn insert_preset_items(&mut self, preset_id: i64, drafts: Vec<PresetItemDraft>) {
        for draft in drafts {
            let row = draft.into_row(preset_id);
            let id = self.next_id();
            self.preset_items.insert(
                id,
                PresetItem {
                    id,
                    preset_id: row.preset_id,
                    content: row.content,
                    category: row.category,
                    sequence: row.sequence,
                },
            );
        }
    }

    fn preset_detail(&self, preset_id: i64) -> Option<PresetDetail> {
        let preset = self.presets.get(&preset_id)?.clone();
        let mut items: Vec<PresetItem> = self
            .preset_items
            .values()
            .filter(|i| i.preset_id == preset_id)
            .cloned()
            .collect();
        items.sort_by_key(|i| (i.sequence, i.id));
        Some(PresetDetail { preset, items })
    }
}

/// Volatile store implementing every repository trait.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MemberRepository for MemoryStore {
    async fn create(&self, new_member: NewMember) -> AppResult<Member> {
        self.tables.write().await.insert_member(new_member)
    }

    async fn create_guest(&self, new_member: NewMember, club_id: i64) -> AppResult<Member> {
        let mut t = self.tables.write().await;
        t.atomically(|t| {
            if !t.clubs.contains_key(&club_id) {
                return Err(AppError::BadRequest {
                    message: format!("club {club_id} does not exist"),
                });
            }
            let member = t.insert_member(new_member)?;
            t.insert_club_member(NewClubMember::applicant(club_id, member.id))?;
            Ok(member)
        })
    }

    async fn find_by_id(&self, member_id: i64) -> AppResult<Option<Member>> {
        Ok(self.tables.read().await.members.get(&member_id).cloned())
    }

    async fn find_by_ids(&self, member_ids: &[i64]) -> AppResult<Vec<Member>> {
        let t = self.tables.read().await;
        Ok(member_ids
            .iter()
            .filter_map(|id| t.members.get(id).cloned())
            .collect())
    }

    async fn find_by_email(&self, member_email: &str) -> AppResult<Option<Member>> {
        let t = self.tables.read().await;
        Ok(t
            .members
            .values()
            .find(|m| m.email.as_deref() == Some(member_email))
            .cloned())
    }

    async fn find_by_api_key(&self, key: &str) -> AppResult<Option<Member>> {
        let t = self.tables.read().await;
        Ok(t.members.values().find(|m| m.api_key == key).cloned())
    }

    async fn exists_by_nickname_and_tag(
        &self,
        member_nickname: &str,
        member_tag: &str,
    ) -> AppResult<bool> {
        let t = self.tables.read().await;
        Ok(t
            .members
            .values()
            .any(|m| m.nickname == member_nickname && m.tag == member_tag))
    }

    async fn update(&self, member_id: i64, changes: UpdateMember) -> AppResult<Member> {
        let mut t = self.tables.write().await;
        let current = t.members.get(&member_id).cloned().ok_or_else(missing_row)?;

        let nickname = changes.nickname.unwrap_or(current.nickname.clone());
        let tag = changes.tag.unwrap_or(current.tag.clone());
        if t
            .members
            .values()
            .any(|m| m.id != member_id && m.nickname == nickname && m.tag == tag)
        {
            return Err(duplicate("member", "nickname_tag", format!("{nickname}, {tag}")));
        }

        let member = t.members.get_mut(&member_id).ok_or_else(missing_row)?;
        member.nickname = nickname;
        member.tag = tag;
        if let Some(password) = changes.password {
            member.password = password;
        }
        if let Some(bio) = changes.bio {
            member.bio = Some(bio);
        }
        if let Some(url) = changes.profile_image_url {
            member.profile_image_url = Some(url);
        }
        if let Some(updated_at) = changes.updated_at {
            member.updated_at = updated_at;
        }
        Ok(member.clone())
    }

    async fn delete(&self, member_id: i64) -> AppResult<usize> {
        let mut t = self.tables.write().await;

        t.friends.retain(|_, f| !f.involves(member_id));
        let memberships: Vec<i64> = t
            .club_members
            .values()
            .filter(|cm| cm.member_id == member_id)
            .map(|cm| cm.id)
            .collect();
        for id in memberships {
            t.remove_club_member(id);
        }
        let presets: Vec<i64> = t
            .presets
            .values()
            .filter(|p| p.owner_id == member_id)
            .map(|p| p.id)
            .collect();
        for id in presets {
            t.remove_preset(id);
        }
        for club in t.clubs.values_mut() {
            if club.leader_id == Some(member_id) {
                club.leader_id = None;
            }
        }

        Ok(usize::from(t.members.remove(&member_id).is_some()))
    }
}

#[async_trait]
impl FriendRepository for MemoryStore {
    async fn create(&self, new_friend: NewFriend) -> AppResult<Friend> {
        let mut t = self.tables.write().await;
        let (member1_id, member2_id) = ordered_pair(new_friend.member1_id, new_friend.member2_id);
        if t
            .friends
            .values()
            .any(|f| f.member1_id == member1_id && f.member2_id == member2_id)
        {
            return Err(duplicate(
                "friend",
                "member1_id_member2_id",
                format!("{member1_id}, {member2_id}"),
            ));
        }

        let id = t.next_id();
        let friend = Friend {
            id,
            member1_id,
            member2_id,
            requested_by: new_friend.requested_by,
            status: new_friend.status,
            created_at: time::now().to_diesel(),
        };
        t.friends.insert(id, friend.clone());
        Ok(friend)
    }

    async fn find_by_id(&self, friend_id: i64) -> AppResult<Option<Friend>> {
        Ok(self.tables.read().await.friends.get(&friend_id).cloned())
    }

    async fn find_between(&self, a: i64, b: i64) -> AppResult<Option<Friend>> {
        let (first, second) = ordered_pair(a, b);
        let t = self.tables.read().await;
        Ok(t
            .friends
            .values()
            .find(|f| f.member1_id == first && f.member2_id == second)
            .cloned())
    }

    async fn list_for_member(&self, member_id: i64) -> AppResult<Vec<Friend>> {
        let t = self.tables.read().await;
        Ok(t
            .friends
            .values()
            .filter(|f| f.involves(member_id))
            .cloned()
            .collect())
    }

    async fn update_status(&self, friend_id: i64, new_status: FriendStatus) -> AppResult<Friend> {
        let mut t = self.tables.write().await;
        let friend = t.friends.get_mut(&friend_id).ok_or_else(missing_row)?;
        friend.status = new_status;
        Ok(friend.clone())
    }

    async fn delete(&self, friend_id: i64) -> AppResult<usize> {
        let mut t = self.tables.write().await;
        Ok(usize::from(t.friends.remove(&friend_id).is_some()))
    }
}

#[async_trait]
impl ClubRepository for MemoryStore {
    async fn create(&self, new_club: NewClub) -> AppResult<Club> {
        self.tables.write().await.insert_club(new_club)
    }

    async fn create_with_members(
        &self,
        new_club: NewClub,
        host_id: i64,
        invitees: Vec<(i64, ClubMemberRole)>,
    ) -> AppResult<Club> {
        let mut t = self.tables.write().await;
        t.atomically(|t| {
            let club = t.insert_club(new_club)?;
            for row in NewClubMember::founding_roster(club.id, host_id, &invitees) {
                t.insert_club_member(row)?;
            }
            Ok(club)
        })
    }

    async fn delete(&self, club_id: i64) -> AppResult<usize> {
        Ok(self.tables.write().await.remove_club(club_id))
    }

    async fn find_by_id(&self, club_id: i64) -> AppResult<Option<Club>> {
        Ok(self.tables.read().await.clubs.get(&club_id).cloned())
    }

    async fn find_by_ids(&self, club_ids: &[i64]) -> AppResult<Vec<Club>> {
        let t = self.tables.read().await;
        Ok(t
            .clubs
            .values()
            .filter(|c| club_ids.contains(&c.id))
            .cloned()
            .collect())
    }

    async fn update(&self, club_id: i64, changes: UpdateClub) -> AppResult<Club> {
        let mut t = self.tables.write().await;
        let club = t
            .clubs
            .get_mut(&club_id)
            .ok_or_else(|| AppError::not_found("club", "id", club_id))?;

        if let Some(name) = changes.name {
            club.name = name;
        }
        if let Some(bio) = changes.bio {
            club.bio = Some(bio);
        }
        if let Some(category) = changes.category {
            club.category = category;
        }
        if let Some(main_spot) = changes.main_spot {
            club.main_spot = main_spot;
        }
        if let Some(capacity) = changes.maximum_capacity {
            club.maximum_capacity = capacity;
        }
        if let Some(recruiting) = changes.recruiting_status {
            club.recruiting_status = recruiting;
        }
        if let Some(event_type) = changes.event_type {
            club.event_type = event_type;
        }
        if let Some(start) = changes.start_date {
            club.start_date = start;
        }
        if let Some(end) = changes.end_date {
            club.end_date = end;
        }
        if let Some(url) = changes.image_url {
            club.image_url = Some(url);
        }
        if let Some(public) = changes.is_public {
            club.is_public = public;
        }
        if let Some(state) = changes.state {
            club.state = state;
        }
        Ok(club.clone())
    }

    async fn search_public(
        &self,
        search: &ClubSearch,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<Club>, i64)> {
        let t = self.tables.read().await;
        let matched: Vec<&Club> = t
            .clubs
            .values()
            .rev()
            .filter(|c| search.matches(c))
            .collect();
        let total = matched.len() as i64;
        let page = matched
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(0))
            .take(usize::try_from(limit).unwrap_or(0))
            .cloned()
            .collect();
        Ok((page, total))
    }
}

#[async_trait]
impl ClubMemberRepository for MemoryStore {
    async fn create(&self, new_member: NewClubMember) -> AppResult<ClubMember> {
        self.tables.write().await.insert_club_member(new_member)
    }

    async fn find_by_id(&self, club_member_id: i64) -> AppResult<Option<ClubMember>> {
        Ok(self
            .tables
            .read()
            .await
            .club_members
            .get(&club_member_id)
            .cloned())
    }

    async fn find_by_club_and_member(
        &self,
        club_id: i64,
        member_id: i64,
    ) -> AppResult<Option<ClubMember>> {
        let t = self.tables.read().await;
        Ok(t
            .club_members
            .values()
            .find(|cm| cm.club_id == club_id && cm.member_id == member_id)
            .cloned())
    }

    async fn list_by_club(&self, club_id: i64) -> AppResult<Vec<ClubMember>> {
        let t = self.tables.read().await;
        Ok(t
            .club_members
            .values()
            .filter(|cm| cm.club_id == club_id)
            .cloned()
            .collect())
    }

    async fn list_by_member(&self, member_id: i64) -> AppResult<Vec<ClubMember>> {
        let t = self.tables.read().await;
        Ok(t
            .club_members
            .values()
            .filter(|cm| cm.member_id == member_id)
            .cloned()
            .collect())
    }

    async fn update(
        &self,
        club_member_id: i64,
        changes: UpdateClubMember,
    ) -> AppResult<ClubMember> {
        let mut t = self.tables.write().await;
        let row = t
            .club_members
            .get_mut(&club_member_id)
            .ok_or_else(missing_row)?;
        if let Some(role) = changes.role {
            row.role = role;
        }
        if let Some(state) = changes.state {
            row.state = state;
        }
        Ok(row.clone())
    }

    async fn delete(&self, club_member_id: i64) -> AppResult<usize> {
        Ok(self.tables.write().await.remove_club_member(club_member_id))
    }
}

#[async_trait]
impl ClubLinkRepository for MemoryStore {
    async fn create(&self, new_link: NewClubLink) -> AppResult<ClubLink> {
        let mut t = self.tables.write().await;
        if t
            .club_links
            .values()
            .any(|l| l.invite_code == new_link.invite_code)
        {
            return Err(duplicate("club_link", "invite_code", &new_link.invite_code));
        }

        let id = t.next_id();
        let link = ClubLink {
            id,
            club_id: new_link.club_id,
            invite_code: new_link.invite_code,
            created_at: new_link.created_at,
            expires_at: new_link.expires_at,
        };
        t.club_links.insert(id, link.clone());
        Ok(link)
    }

    async fn find_by_code(&self, code: &str) -> AppResult<Option<ClubLink>> {
        let t = self.tables.read().await;
        Ok(t
            .club_links
            .values()
            .find(|l| l.invite_code == code)
            .cloned())
    }

    async fn find_latest_valid(
        &self,
        club_id: i64,
        now: jiff::civil::DateTime,
    ) -> AppResult<Option<ClubLink>> {
        let t = self.tables.read().await;
        Ok(t
            .club_links
            .values()
            .filter(|l| l.club_id == club_id && !l.is_expired_at(now))
            .max_by_key(|l| (l.created_at.to_jiff(), l.id))
            .cloned())
    }
}

#[async_trait]
impl ScheduleRepository for MemoryStore {
    async fn create(&self, new_schedule: NewSchedule) -> AppResult<Schedule> {
        let mut t = self.tables.write().await;
        let id = t.next_id();
        let schedule = Schedule {
            id,
            club_id: new_schedule.club_id,
            title: new_schedule.title,
            content: new_schedule.content,
            start_date: new_schedule.start_date,
            end_date: new_schedule.end_date,
            spot: new_schedule.spot,
            is_active: true,
            created_at: time::now().to_diesel(),
        };
        t.schedules.insert(id, schedule.clone());
        Ok(schedule)
    }

    async fn find_by_id(&self, schedule_id: i64) -> AppResult<Option<Schedule>> {
        Ok(self.tables.read().await.schedules.get(&schedule_id).cloned())
    }

    async fn update(&self, schedule_id: i64, changes: UpdateSchedule) -> AppResult<Schedule> {
        let mut t = self.tables.write().await;
        let schedule = t.schedules.get_mut(&schedule_id).ok_or_else(missing_row)?;
        if let Some(title) = changes.title {
            schedule.title = title;
        }
        if let Some(content) = changes.content {
            schedule.content = content;
        }
        if let Some(start) = changes.start_date {
            schedule.start_date = start;
        }
        if let Some(end) = changes.end_date {
            schedule.end_date = end;
        }
        if let Some(spot) = changes.spot {
            schedule.spot = spot;
        }
        if let Some(active) = changes.is_active {
            schedule.is_active = active;
        }
        Ok(schedule.clone())
    }

    async fn delete(&self, schedule_id: i64) -> AppResult<usize> {
        let mut t = self.tables.write().await;
        let lists: Vec<i64> = t
            .check_lists
            .values()
            .filter(|c| c.schedule_id == schedule_id)
            .map(|c| c.id)
            .collect();
        for id in lists {
            t.remove_check_list(id);
        }
        Ok(usize::from(t.schedules.remove(&schedule_id).is_some()))
    }

    async fn list_active_by_clubs_in_range(
        &self,
        club_ids: &[i64],
        range_start: jiff::civil::DateTime,
        range_end: jiff::civil::DateTime,
    ) -> AppResult<Vec<Schedule>> {
        let t = self.tables.read().await;
        let mut found: Vec<Schedule> = t
            .schedules
            .values()
            .filter(|s| {
                club_ids.contains(&s.club_id) && s.is_active && s.overlaps(range_start, range_end)
            })
            .cloned()
            .collect();
        found.sort_by_key(|s| (s.start_date.to_jiff(), s.id));
        Ok(found)
    }

    async fn list_by_club(&self, club_id: i64) -> AppResult<Vec<Schedule>> {
        let t = self.tables.read().await;
        let mut found: Vec<Schedule> = t
            .schedules
            .values()
            .filter(|s| s.club_id == club_id)
            .cloned()
            .collect();
        found.sort_by_key(|s| (s.start_date.to_jiff(), s.id));
        Ok(found)
    }
}

#[async_trait]
impl CheckListRepository for MemoryStore {
    async fn create(
        &self,
        schedule_id: i64,
        items: Vec<CheckListItemDraft>,
    ) -> AppResult<CheckListDetail> {
        let mut t = self.tables.write().await;
        if t.check_lists.values().any(|c| c.schedule_id == schedule_id) {
            return Err(duplicate("check_list", "schedule_id", schedule_id));
        }

        t.atomically(|t| {
            let id = t.next_id();
            t.check_lists.insert(
                id,
                CheckList {
                    id,
                    schedule_id,
                    is_active: true,
                    created_at: time::now().to_diesel(),
                },
            );
            t.insert_check_list_items(id, items)?;
            t.check_list_detail(id).ok_or_else(missing_row)
        })
    }

    async fn find_by_id(&self, check_list_id: i64) -> AppResult<Option<CheckListDetail>> {
        Ok(self.tables.read().await.check_list_detail(check_list_id))
    }

    async fn find_by_schedule_id(&self, schedule_id: i64) -> AppResult<Option<CheckList>> {
        let t = self.tables.read().await;
        Ok(t
            .check_lists
            .values()
            .find(|c| c.schedule_id == schedule_id)
            .cloned())
    }

    async fn find_by_schedule_ids(&self, schedule_ids: &[i64]) -> AppResult<Vec<CheckList>> {
        let t = self.tables.read().await;
        Ok(t
            .check_lists
            .values()
            .filter(|c| schedule_ids.contains(&c.schedule_id))
            .cloned()
            .collect())
    }

    async fn replace_items(
        &self,
        check_list_id: i64,
        items: Vec<CheckListItemDraft>,
    ) -> AppResult<CheckListDetail> {
        let mut t = self.tables.write().await;
        if !t.check_lists.contains_key(&check_list_id) {
            return Err(missing_row());
        }
        t.atomically(|t| {
            t.remove_check_list_items(check_list_id);
            t.insert_check_list_items(check_list_id, items)?;
            t.check_list_detail(check_list_id).ok_or_else(missing_row)
        })
    }

    async fn set_active(&self, check_list_id: i64, active: bool) -> AppResult<CheckList> {
        let mut t = self.tables.write().await;
        let list = t.check_lists.get_mut(&check_list_id).ok_or_else(missing_row)?;
        list.is_active = active;
        Ok(list.clone())
    }

    async fn delete(&self, check_list_id: i64) -> AppResult<usize> {
        Ok(self.tables.write().await.remove_check_list(check_list_id))
    }
}

#[async_trait]
impl PresetRepository for MemoryStore {
    async fn create(
        &self,
        new_preset: NewPreset,
        items: Vec<PresetItemDraft>,
    ) -> AppResult<PresetDetail> {
        let mut t = self.tables.write().await;
        let id = t.next_id();
        t.presets.insert(
            id,
            Preset {
                id,
                owner_id: new_preset.owner_id,
                name: new_preset.name,
                created_at: time::now().to_diesel(),
            },
        );
        t.insert_preset_items(id, items);
        t.preset_detail(id).ok_or_else(missing_row)
    }

    async fn find_by_id(&self, preset_id: i64) -> AppResult<Option<PresetDetail>> {
        Ok(self.tables.read().await.preset_detail(preset_id))
    }

    async fn list_by_owner(&self, owner_id: i64) -> AppResult<Vec<PresetDetail>> {
        let t = self.tables.read().await;
        Ok(t
            .presets
            .values()
            .filter(|p| p.owner_id == owner_id)
            .filter_map(|p| t.preset_detail(p.id))
            .collect())
    }

    async fn replace(
        &self,
        preset_id: i64,
        name: String,
        items: Vec<PresetItemDraft>,
    ) -> AppResult<PresetDetail> {
        let mut t = self.tables.write().await;
        let preset = t.presets.get_mut(&preset_id).ok_or_else(missing_row)?;
        preset.name = name;
        t.preset_items.retain(|_, i| i.preset_id != preset_id);
        t.insert_preset_items(preset_id, items);
        t.preset_detail(preset_id).ok_or_else(missing_row)
    }

    async fn delete(&self, preset_id: i64) -> AppResult<usize> {
        Ok(self.tables.write().await.remove_preset(preset_id))
    }
}

#[async_trait]
impl HealthCheck for MemoryStore {
    async fn ping(&self) -> AppResult<()> {
        let _ = self.tables.read().await;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
