//! Member accounts: registration, login (members and club guests), token
//! refresh and profile management.

use std::sync::Arc;

use jiff_diesel::ToDiesel;
use rand::Rng;
use rand::distr::Alphanumeric;
use uuid::Uuid;

use super::ImageUpload;
use crate::config::JwtConfig;
use crate::error::{AppError, AppResult};
use crate::models::{Member, MemberType, NewMember, UpdateMember};
use crate::repositories::Repositories;
use crate::storage::{ObjectStorage, member_profile_key};
use crate::utils::{jwt, password, time};

const TAG_LENGTH: usize = 6;
const MAX_TAG_ATTEMPTS: usize = 32;

/// A freshly signed access token and the cookie lifetime that goes with it.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub access_token: String,
    pub max_age: i64,
}

#[derive(Debug, Clone)]
pub struct MemberSession {
    pub member: Member,
    pub token: IssuedToken,
}

/// A guest session is scoped to the club the guest belongs to.
#[derive(Debug, Clone)]
pub struct GuestSession {
    pub member: Member,
    pub club_id: i64,
    pub token: IssuedToken,
}

#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub nickname: String,
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub nickname: Option<String>,
    pub password: Option<String>,
    pub bio: Option<String>,
}

pub fn generate_tag() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(TAG_LENGTH)
        .map(char::from)
        .collect()
}

pub fn generate_api_key() -> String {
    format!("api_{}", Uuid::new_v4().simple())
}

#[derive(Clone)]
pub struct MemberService {
    repos: Repositories,
    storage: Arc<dyn ObjectStorage>,
    jwt: JwtConfig,
}

impl MemberService {
    pub fn new(repos: Repositories, storage: Arc<dyn ObjectStorage>, jwt: JwtConfig) -> Self {
        Self {
            repos,
            storage,
            jwt,
        }
    }

    fn issue(&self, member: &Member) -> AppResult<IssuedToken> {
        let max_age = if member.is_guest() {
            self.jwt.guest_token_expiration
        } else {
            self.jwt.access_token_expiration
        };
        let access_token = jwt::generate_access_token(member, &self.jwt.secret, max_age)?;
        Ok(IssuedToken {
            access_token,
            max_age,
        })
    }

    /// A tag not yet used together with `nickname`.
    async fn unique_tag(&self, nickname: &str) -> AppResult<String> {
        for _ in 0..MAX_TAG_ATTEMPTS {
            let tag = generate_tag();
            if !self
                .repos
                .members
                .exists_by_nickname_and_tag(nickname, &tag)
                .await?
            {
                return Ok(tag);
            }
        }
        Err(AppError::conflict(format!(
            "could not allocate a tag for nickname '{nickname}'"
        )))
    }

    pub async fn register(&self, input: RegisterInput) -> AppResult<MemberSession> {
        let email = input.email.trim().to_lowercase();
        if self.repos.members.find_by_email(&email).await?.is_some() {
            return Err(AppError::bad_request("email already in use"));
        }

        let tag = self.unique_tag(&input.nickname).await?;
        let member = self
            .repos
            .members
            .create(NewMember {
                nickname: input.nickname,
                password: password::hash_password(&input.password)?,
                member_type: MemberType::Member,
                tag,
                email: Some(email),
                bio: input.bio,
                api_key: generate_api_key(),
            })
            .await
            .map_err(|e| match e {
                AppError::Duplicate { ref field, .. } if field == "email" => {
                    AppError::bad_request("email already in use")
                }
                other => other,
            })?;

        tracing::info!(member_id = member.id, "Member registered");
        let token = self.issue(&member)?;
        Ok(MemberSession { member, token })
    }

    pub async fn login(&self, email: &str, plain_password: &str) -> AppResult<MemberSession> {
        let email = email.trim().to_lowercase();
        let member = self
            .repos
            .members
            .find_by_email(&email)
            .await?
            .ok_or_else(|| AppError::bad_request("member not found"))?;

        if !password::verify_password(plain_password, &member.password)? {
            return Err(AppError::bad_request("member not found"));
        }

        let token = self.issue(&member)?;
        Ok(MemberSession { member, token })
    }

    /// Guests of the club with the given nickname.
    async fn find_club_guest(&self, club_id: i64, nickname: &str) -> AppResult<Option<Member>> {
        let member_ids: Vec<i64> = self
            .repos
            .club_members
            .list_by_club(club_id)
            .await?
            .into_iter()
            .map(|cm| cm.member_id)
            .collect();

        Ok(self
            .repos
            .members
            .find_by_ids(&member_ids)
            .await?
            .into_iter()
            .find(|m| m.is_guest() && m.nickname == nickname))
    }

    pub async fn guest_register(
        &self,
        nickname: String,
        plain_password: &str,
        club_id: i64,
    ) -> AppResult<GuestSession> {
        if self.repos.clubs.find_by_id(club_id).await?.is_none() {
            return Err(AppError::bad_request("club not found"));
        }
        if self.find_club_guest(club_id, &nickname).await?.is_some() {
            return Err(AppError::bad_request("nickname already in use in this club"));
        }

        let tag = self.unique_tag(&nickname).await?;
        let member = self
            .repos
            .members
            .create_guest(
                NewMember {
                    nickname,
                    password: password::hash_password(plain_password)?,
                    member_type: MemberType::Guest,
                    tag,
                    email: None,
                    bio: None,
                    api_key: generate_api_key(),
                },
                club_id,
            )
            .await?;

        tracing::info!(member_id = member.id, club_id, "Guest registered");
        let token = self.issue(&member)?;
        Ok(GuestSession {
            member,
            club_id,
            token,
        })
    }

    pub async fn guest_login(
        &self,
        nickname: &str,
        plain_password: &str,
        club_id: i64,
    ) -> AppResult<GuestSession> {
        let member = self
            .find_club_guest(club_id, nickname)
            .await?
            .ok_or_else(|| AppError::bad_request("guest not found"))?;

        if !password::verify_password(plain_password, &member.password)? {
            return Err(AppError::bad_request("guest not found"));
        }

        let token = self.issue(&member)?;
        Ok(GuestSession {
            member,
            club_id,
            token,
        })
    }

    /// Exchanges an api key for a new access token.
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<IssuedToken> {
        let key = refresh_token.trim();
        if key.is_empty() {
            return Err(AppError::unauthorized("refresh token required"));
        }
        let member = self
            .repos
            .members
            .find_by_api_key(key)
            .await?
            .ok_or_else(|| AppError::bad_request("invalid refresh token"))?;
        self.issue(&member)
    }

    pub fn verify_password(&self, member: &Member, plain_password: &str) -> AppResult<bool> {
        password::verify_password(plain_password, &member.password)
    }

    pub async fn get(&self, member_id: i64) -> AppResult<Member> {
        self.repos
            .members
            .find_by_id(member_id)
            .await?
            .ok_or_else(|| AppError::not_found("member", "id", member_id))
    }

    pub async fn update_profile(
        &self,
        member: &Member,
        update: ProfileUpdate,
        image: Option<ImageUpload>,
    ) -> AppResult<Member> {
        let mut changes = UpdateMember {
            updated_at: Some(time::now().to_diesel()),
            bio: update.bio,
            ..Default::default()
        };

        if let Some(nickname) = update.nickname {
            if nickname != member.nickname {
                changes.tag = Some(self.unique_tag(&nickname).await?);
                changes.nickname = Some(nickname);
            }
        }
        if let Some(ref plain) = update.password {
            changes.password = Some(password::hash_password(plain)?);
        }
        if let Some(image) = image {
            let url = self
                .storage
                .put(&member_profile_key(member.id), image.bytes, &image.content_type)
                .await?;
            changes.profile_image_url = Some(url);
        }

        self.repos.members.update(member.id, changes).await
    }

    /// Deletes the member and everything hanging off it. Returns the removed member.
    pub async fn withdraw(&self, member_id: i64) -> AppResult<Member> {
        let member = self.get(member_id).await?;
        self.repos.members.delete(member_id).await?;

        if member.profile_image_url.is_some() {
            if let Err(e) = self.storage.delete(&member_profile_key(member_id)).await {
                tracing::warn!(member_id, error = %e, "Failed to delete profile image");
            }
        }

        tracing::info!(member_id, "Member withdrawn");
        Ok(member)
    }
}
