use std::collections::HashMap;

use crate::error::{AppError, AppResult};
use crate::models::{Friend, FriendStatus, FriendStatusFilter, Member, NewFriend};
use crate::repositories::Repositories;

/// A friendship seen from one side, with the other party loaded.
#[derive(Debug, Clone)]
pub struct FriendView {
    pub friend: Friend,
    pub other: Member,
}

/// Whether `friend` belongs in the list selected by `filter` for `member_id`.
pub fn matches_filter(friend: &Friend, member_id: i64, filter: Option<FriendStatusFilter>) -> bool {
    match filter {
        None => true,
        Some(FriendStatusFilter::Accepted) => friend.status == FriendStatus::Accepted,
        Some(FriendStatusFilter::Sent) => {
            friend.status == FriendStatus::Pending && friend.requested_by == member_id
        }
        Some(FriendStatusFilter::Received) => {
            friend.status == FriendStatus::Pending && friend.requested_by != member_id
        }
    }
}

#[derive(Clone)]
pub struct FriendService {
    repos: Repositories,
}

impl FriendService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    async fn view(&self, friend: Friend, member_id: i64) -> AppResult<FriendView> {
        let other_id = friend.counterpart(member_id);
        let other = self
            .repos
            .members
            .find_by_id(other_id)
            .await?
            .ok_or_else(|| AppError::not_found("member", "id", other_id))?;
        Ok(FriendView { friend, other })
    }

    /// Loads the relation and checks that `member_id` is a party of it.
    async fn load_own(&self, friend_id: i64, member_id: i64) -> AppResult<Friend> {
        let friend = self
            .repos
            .friends
            .find_by_id(friend_id)
            .await?
            .ok_or_else(|| AppError::not_found("friend", "id", friend_id))?;
        if !friend.involves(member_id) {
            return Err(AppError::forbidden("not a party of this friendship"));
        }
        Ok(friend)
    }

    /// Relations of the member, sorted by the other party's nickname.
    pub async fn list(
        &self,
        member_id: i64,
        filter: Option<FriendStatusFilter>,
    ) -> AppResult<Vec<FriendView>> {
        let relations: Vec<Friend> = self
            .repos
            .friends
            .list_for_member(member_id)
            .await?
            .into_iter()
            .filter(|f| matches_filter(f, member_id, filter))
            .collect();

        let other_ids: Vec<i64> = relations.iter().map(|f| f.counterpart(member_id)).collect();
        let mut others: HashMap<i64, Member> = self
            .repos
            .members
            .find_by_ids(&other_ids)
            .await?
            .into_iter()
            .map(|m| (m.id, m))
            .collect();

        let mut views: Vec<FriendView> = relations
            .into_iter()
            .filter_map(|friend| {
                let other = others.remove(&friend.counterpart(member_id))?;
                Some(FriendView { friend, other })
            })
            .collect();
        views.sort_by(|a, b| a.other.nickname.cmp(&b.other.nickname));
        Ok(views)
    }

    pub async fn request(&self, member_id: i64, friend_email: &str) -> AppResult<FriendView> {
        let email = friend_email.trim().to_lowercase();
        let target = self
            .repos
            .members
            .find_by_email(&email)
            .await?
            .ok_or_else(|| AppError::not_found("member", "email", &email))?;

        if target.id == member_id {
            return Err(AppError::bad_request("cannot befriend yourself"));
        }

        if let Some(existing) = self.repos.friends.find_between(member_id, target.id).await? {
            let message = match existing.status {
                FriendStatus::Pending if existing.requested_by == member_id => "already requested",
                FriendStatus::Pending => "already received",
                FriendStatus::Accepted => "already friends",
                FriendStatus::Rejected => "request was rejected",
            };
            return Err(AppError::bad_request(message));
        }

        let friend = self
            .repos
            .friends
            .create(NewFriend::request(member_id, target.id))
            .await?;
        Ok(FriendView {
            friend,
            other: target,
        })
    }

    /// Accept or reject a pending request addressed to `member_id`.
    async fn answer(
        &self,
        member_id: i64,
        friend_id: i64,
        status: FriendStatus,
    ) -> AppResult<FriendView> {
        let friend = self.load_own(friend_id, member_id).await?;
        if friend.requested_by == member_id {
            return Err(AppError::forbidden("cannot answer your own request"));
        }
        match friend.status {
            FriendStatus::Accepted => return Err(AppError::bad_request("already friends")),
            FriendStatus::Rejected => return Err(AppError::bad_request("request was rejected")),
            FriendStatus::Pending => {}
        }

        let friend = self.repos.friends.update_status(friend.id, status).await?;
        self.view(friend, member_id).await
    }

    pub async fn accept(&self, member_id: i64, friend_id: i64) -> AppResult<FriendView> {
        self.answer(member_id, friend_id, FriendStatus::Accepted)
            .await
    }

    pub async fn reject(&self, member_id: i64, friend_id: i64) -> AppResult<FriendView> {
        self.answer(member_id, friend_id, FriendStatus::Rejected)
            .await
    }

    /// Ends an accepted friendship and returns the former friend.
    pub async fn remove(&self, member_id: i64, friend_id: i64) -> AppResult<Member> {
        let friend = self.load_own(friend_id, member_id).await?;
        if friend.status != FriendStatus::Accepted {
            return Err(AppError::bad_request("not friends"));
        }
        let view = self.view(friend, member_id).await?;
        self.repos.friends.delete(friend_id).await?;
        Ok(view.other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::member;

    #[tokio::test]
    async fn test_request_accept_and_remove() {
        let repos = Repositories::in_memory();
        let svc = FriendService::new(repos.clone());
        let alice = member(&repos, "alice").await;
        let bob = member(&repos, "bob").await;

        let sent = svc.request(alice.id, "BOB@moim.io").await.unwrap();
        assert_eq!(sent.other.id, bob.id);

        let again = svc.request(alice.id, "bob@moim.io").await.unwrap_err();
        assert_eq!(again.to_string(), AppError::bad_request("already requested").to_string());
        let reverse = svc.request(bob.id, "alice@moim.io").await.unwrap_err();
        assert_eq!(reverse.to_string(), AppError::bad_request("already received").to_string());

        assert!(matches!(
            svc.accept(alice.id, sent.friend.id).await,
            Err(AppError::Forbidden { .. })
        ));
        let received = svc
            .list(bob.id, Some(FriendStatusFilter::Received))
            .await
            .unwrap();
        assert_eq!(received.len(), 1);

        let accepted = svc.accept(bob.id, sent.friend.id).await.unwrap();
        assert_eq!(accepted.friend.status, FriendStatus::Accepted);
        assert_eq!(accepted.other.id, alice.id);

        let removed = svc.remove(alice.id, sent.friend.id).await.unwrap();
        assert_eq!(removed.id, bob.id);
        assert!(svc.list(alice.id, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reject_closes_request() {
        let repos = Repositories::in_memory();
        let svc = FriendService::new(repos.clone());
        let alice = member(&repos, "alice").await;
        let bob = member(&repos, "bob").await;
        let sent = svc.request(alice.id, "bob@moim.io").await.unwrap();

        assert!(matches!(
            svc.reject(alice.id, sent.friend.id).await,
            Err(AppError::Forbidden { .. })
        ));
        let rejected = svc.reject(bob.id, sent.friend.id).await.unwrap();
        assert_eq!(rejected.friend.status, FriendStatus::Rejected);
        assert_eq!(rejected.other.id, alice.id);

        let late = svc.accept(bob.id, sent.friend.id).await.unwrap_err();
        assert_eq!(late.to_string(), AppError::bad_request("request was rejected").to_string());
        assert!(matches!(
            svc.remove(alice.id, sent.friend.id).await,
            Err(AppError::BadRequest { .. })
        ));
    }

    #[tokio::test]
    async fn test_request_self_and_unknown() {
        let repos = Repositories::in_memory();
        let svc = FriendService::new(repos.clone());
        let alice = member(&repos, "alice").await;

        assert!(matches!(
            svc.request(alice.id, "alice@moim.io").await,
            Err(AppError::BadRequest { .. })
        ));
        assert!(matches!(
            svc.request(alice.id, "ghost@moim.io").await,
            Err(AppError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_list_sorted_by_nickname() {
        let repos = Repositories::in_memory();
        let svc = FriendService::new(repos.clone());
        let me = member(&repos, "me").await;
        member(&repos, "zed").await;
        member(&repos, "amy").await;
        svc.request(me.id, "zed@moim.io").await.unwrap();
        svc.request(me.id, "amy@moim.io").await.unwrap();

        let sent = svc.list(me.id, Some(FriendStatusFilter::Sent)).await.unwrap();
        let names: Vec<_> = sent.iter().map(|v| v.other.nickname.as_str()).collect();
        assert_eq!(names, vec!["amy", "zed"]);
        assert!(
            svc.list(me.id, Some(FriendStatusFilter::Accepted))
                .await
                .unwrap()
                .is_empty()
        );
    }
}
