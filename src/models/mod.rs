mod checklist;
mod club;
mod club_link;
mod club_member;
mod enums;
mod friend;
mod member;
mod preset;
mod schedule;

pub use checklist::{
    CheckList, CheckListDetail, CheckListItem, CheckListItemDetail, CheckListItemDraft,
    ItemAssign, ItemAssignDraft, NewCheckList, NewCheckListItem, NewItemAssign,
};
pub use club::{Club, ClubSearch, NewClub, UpdateClub};
pub use club_link::{ClubLink, INVITE_LINK_TTL_DAYS, NewClubLink};
pub use club_member::{ClubMember, NewClubMember, UpdateClubMember};
pub use enums::{
    CheckListItemCategory, ClubApplyResult, ClubCategory, ClubMemberRole, ClubMemberState,
    EventType, FriendStatus, FriendStatusFilter, MemberType,
};
pub use friend::{Friend, NewFriend, ordered_pair};
pub use member::{Member, NewMember, UpdateMember};
pub use preset::{NewPreset, NewPresetItem, Preset, PresetDetail, PresetItem, PresetItemDraft};
pub use schedule::{NewSchedule, Schedule, UpdateSchedule};
