use diesel::prelude::*;
use jiff_diesel::DateTime;

use super::FriendStatus;

/// A friendship between two members, stored once per pair with
/// `member1_id < member2_id`.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = crate::schema::friends)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Friend {
    pub id: i64,
    pub member1_id: i64,
    pub member2_id: i64,
    pub requested_by: i64,
    pub status: FriendStatus,
    pub created_at: DateTime,
}

impl Friend {
    pub fn involves(&self, member_id: i64) -> bool {
        self.member1_id == member_id || self.member2_id == member_id
    }

    /// The other party of the relation as seen from `member_id`.
    pub fn counterpart(&self, member_id: i64) -> i64 {
        if self.member1_id == member_id {
            self.member2_id
        } else {
            self.member1_id
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::friends)]
pub struct NewFriend {
    pub member1_id: i64,
    pub member2_id: i64,
    pub requested_by: i64,
    pub status: FriendStatus,
}

impl NewFriend {
    /// A pending request from `requester` to `target`, with the pair normalized.
    pub fn request(requester: i64, target: i64) -> Self {
        let (member1_id, member2_id) = ordered_pair(requester, target);
        Self {
            member1_id,
            member2_id,
            requested_by: requester,
            status: FriendStatus::Pending,
        }
    }
}

pub fn ordered_pair(a: i64, b: i64) -> (i64, i64) {
    if a < b { (a, b) } else { (b, a) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_normalizes_pair() {
        let request = NewFriend::request(9, 3);
        assert_eq!((request.member1_id, request.member2_id), (3, 9));
        assert_eq!(request.requested_by, 9);
        assert_eq!(request.status, FriendStatus::Pending);
    }
}
