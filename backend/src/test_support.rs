//! Test utilities for the backend crate.
//!
//! Shared by unit tests (in `src/`) and integration tests (in `tests/`), and
//! compiled only for tests or with the `test-support` feature.
//!
//! [`InMemoryBackend`] stands in for the hosted backend. It implements all
//! three driven ports and keeps the hosted database's rules: one profile per
//! id, posts must reference an existing profile, and bearer tokens must
//! belong to a live session.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Local, Utc};
use mockable::Clock;
use uuid::Uuid;

use crate::domain::ports::{AuthGateway, BackendError, PostRepository, ProfileRepository};
use crate::domain::{
    AccessToken, AuthSession, AuthUser, Caller, NewPost, NewProfile, Post, PostId, PostUpdate,
    Profile, ProfileUpsert, RefreshToken, SignInCredentials, UserId,
};

/// Clock frozen at one instant.
pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(now)
    }
}

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Tables the in-memory backend can pretend were never provisioned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Profiles,
    Posts,
}

impl Table {
    fn name(self) -> &'static str {
        match self {
            Self::Profiles => "profiles",
            Self::Posts => "blog_posts",
        }
    }
}

struct Account {
    user: AuthUser,
    password: String,
}

#[derive(Default)]
struct BackendState {
    accounts: HashMap<String, Account>,
    access_tokens: HashMap<String, UserId>,
    refresh_tokens: HashMap<String, UserId>,
    profiles: HashMap<UserId, Profile>,
    /// Insertion order is kept so equal timestamps still list newest first.
    posts: Vec<Post>,
    missing_tables: HashSet<Table>,
    outage: bool,
    drop_profile_before_next_post: bool,
}

/// Hosted backend double with the same uniqueness and foreign-key rules.
#[derive(Default)]
pub struct InMemoryBackend {
    state: Mutex<BackendState>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BackendState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("in-memory backend mutex poisoned"),
        }
    }

    /// Register an account that can sign in with `email` and `password`.
    pub fn register_account(&self, email: &str, password: &str) -> UserId {
        let user_id = UserId::random();
        self.lock().accounts.insert(
            email.to_owned(),
            Account {
                user: AuthUser::new(user_id.clone()).with_email(email),
                password: password.to_owned(),
            },
        );
        user_id
    }

    /// Issue a session directly, bypassing the password check.
    pub fn issue_session(&self, user_id: &UserId) -> AuthSession {
        let mut state = self.lock();
        let user = state
            .accounts
            .values()
            .find(|account| &account.user.id == user_id)
            .map_or_else(|| AuthUser::new(user_id.clone()), |account| account.user.clone());
        mint_session(&mut state, user)
    }

    /// Revoke every token belonging to `user_id`, as if the session expired.
    pub fn expire_sessions(&self, user_id: &UserId) {
        let mut state = self.lock();
        state.access_tokens.retain(|_, owner| owner != user_id);
        state.refresh_tokens.retain(|_, owner| owner != user_id);
    }

    /// Make every call fail as if the backend were unreachable.
    pub fn set_outage(&self, outage: bool) {
        self.lock().outage = outage;
    }

    /// Report `table` as missing until restored.
    pub fn drop_table(&self, table: Table) {
        self.lock().missing_tables.insert(table);
    }

    /// Delete the owner's profile right before the next post insert.
    ///
    /// Reproduces a profile disappearing between provisioning and the post
    /// write.
    pub fn drop_profile_before_next_post(&self) {
        self.lock().drop_profile_before_next_post = true;
    }

    /// Delete a profile row.
    pub fn remove_profile(&self, user_id: &UserId) {
        self.lock().profiles.remove(user_id);
    }

    /// Stored profile for `user_id`.
    pub fn profile(&self, user_id: &UserId) -> Option<Profile> {
        self.lock().profiles.get(user_id).cloned()
    }

    pub fn profile_count(&self) -> usize {
        self.lock().profiles.len()
    }

    pub fn post_count(&self) -> usize {
        self.lock().posts.len()
    }

    /// Stored post with `id`.
    pub fn post(&self, id: &PostId) -> Option<Post> {
        self.lock().posts.iter().find(|post| &post.id == id).cloned()
    }
}

fn mint_session(state: &mut BackendState, user: AuthUser) -> AuthSession {
    let access = format!("access-{}", Uuid::new_v4());
    let refresh = format!("refresh-{}", Uuid::new_v4());
    state.access_tokens.insert(access.clone(), user.id.clone());
    state.refresh_tokens.insert(refresh.clone(), user.id.clone());
    AuthSession {
        access_token: AccessToken::new(access),
        refresh_token: RefreshToken::new(refresh),
        user,
    }
}

impl BackendState {
    fn available(&self) -> Result<(), BackendError> {
        if self.outage {
            Err(BackendError::transport("connection refused"))
        } else {
            Ok(())
        }
    }

    fn table(&self, table: Table) -> Result<(), BackendError> {
        self.available()?;
        if self.missing_tables.contains(&table) {
            return Err(BackendError::missing_table(format!(
                "relation \"public.{}\" does not exist",
                table.name()
            )));
        }
        Ok(())
    }

    fn authorize(&self, caller: &Caller) -> Result<(), BackendError> {
        match caller {
            Caller::Anonymous => Ok(()),
            Caller::User {
                user_id,
                access_token,
            } => match self.access_tokens.get(access_token.expose()) {
                Some(owner) if owner == user_id => Ok(()),
                _ => Err(BackendError::unauthorized("JWT expired")),
            },
        }
    }

    fn user_for(&self, access_token: &AccessToken) -> Result<AuthUser, BackendError> {
        let user_id = self
            .access_tokens
            .get(access_token.expose())
            .ok_or_else(|| BackendError::unauthorized("invalid JWT"))?;
        Ok(self
            .accounts
            .values()
            .find(|account| &account.user.id == user_id)
            .map_or_else(|| AuthUser::new(user_id.clone()), |account| account.user.clone()))
    }

    fn sorted_posts<'a>(&'a self, filter: impl Fn(&Post) -> bool) -> Vec<Post> {
        let mut posts: Vec<(usize, &'a Post)> = self
            .posts
            .iter()
            .enumerate()
            .filter(|(_, post)| filter(post))
            .collect();
        posts.sort_by(|(left_seq, left), (right_seq, right)| {
            right
                .created_at
                .cmp(&left.created_at)
                .then(right_seq.cmp(left_seq))
        });
        posts.into_iter().map(|(_, post)| post.clone()).collect()
    }
}

#[async_trait]
impl AuthGateway for InMemoryBackend {
    async fn sign_in_with_password(
        &self,
        credentials: &SignInCredentials,
    ) -> Result<AuthSession, BackendError> {
        let mut state = self.lock();
        state.available()?;
        let user = match state.accounts.get(credentials.email()) {
            Some(account) if account.password == credentials.password() => account.user.clone(),
            _ => return Err(BackendError::rejected("Invalid login credentials")),
        };
        Ok(mint_session(&mut state, user))
    }

    async fn fetch_user(&self, access_token: &AccessToken) -> Result<AuthUser, BackendError> {
        let state = self.lock();
        state.available()?;
        state.user_for(access_token)
    }

    async fn refresh_session(
        &self,
        refresh_token: &RefreshToken,
    ) -> Result<AuthSession, BackendError> {
        let mut state = self.lock();
        state.available()?;
        let user_id = state
            .refresh_tokens
            .remove(refresh_token.expose())
            .ok_or_else(|| BackendError::rejected("Invalid Refresh Token"))?;
        let user = state
            .accounts
            .values()
            .find(|account| account.user.id == user_id)
            .map_or_else(|| AuthUser::new(user_id.clone()), |account| account.user.clone());
        Ok(mint_session(&mut state, user))
    }

    async fn sign_out(&self, access_token: &AccessToken) -> Result<(), BackendError> {
        let mut state = self.lock();
        state.available()?;
        let user_id = state
            .access_tokens
            .remove(access_token.expose())
            .ok_or_else(|| BackendError::unauthorized("invalid JWT"))?;
        state.refresh_tokens.retain(|_, owner| owner != &user_id);
        Ok(())
    }
}

#[async_trait]
impl ProfileRepository for InMemoryBackend {
    async fn find_by_id(
        &self,
        caller: &Caller,
        id: &UserId,
    ) -> Result<Option<Profile>, BackendError> {
        let state = self.lock();
        state.table(Table::Profiles)?;
        state.authorize(caller)?;
        Ok(state.profiles.get(id).cloned())
    }

    async fn insert_if_absent(
        &self,
        caller: &Caller,
        profile: &NewProfile,
    ) -> Result<Option<Profile>, BackendError> {
        let mut state = self.lock();
        state.table(Table::Profiles)?;
        state.authorize(caller)?;
        if state.profiles.contains_key(&profile.id) {
            return Ok(None);
        }
        let row = Profile {
            id: profile.id.clone(),
            username: profile.username.clone(),
            avatar_url: None,
            created_at: Some(profile.timestamp),
            updated_at: Some(profile.timestamp),
        };
        state.profiles.insert(row.id.clone(), row.clone());
        Ok(Some(row))
    }

    async fn upsert(
        &self,
        caller: &Caller,
        profile: &ProfileUpsert,
    ) -> Result<Profile, BackendError> {
        let mut state = self.lock();
        state.table(Table::Profiles)?;
        state.authorize(caller)?;
        let created_at = state
            .profiles
            .get(&profile.id)
            .and_then(|existing| existing.created_at)
            .or(Some(profile.updated_at));
        let row = Profile {
            id: profile.id.clone(),
            username: profile.username.clone(),
            avatar_url: profile.avatar_url.clone(),
            created_at,
            updated_at: Some(profile.updated_at),
        };
        state.profiles.insert(row.id.clone(), row.clone());
        Ok(row)
    }
}

#[async_trait]
impl PostRepository for InMemoryBackend {
    async fn insert(&self, caller: &Caller, post: &NewPost) -> Result<Post, BackendError> {
        let mut state = self.lock();
        state.table(Table::Posts)?;
        state.authorize(caller)?;
        if std::mem::take(&mut state.drop_profile_before_next_post) {
            state.profiles.remove(&post.user_id);
        }
        if !state.profiles.contains_key(&post.user_id) {
            return Err(BackendError::foreign_key_violation(
                "insert or update on table \"blog_posts\" violates foreign key constraint \"blog_posts_user_id_fkey\"",
            ));
        }
        let row = Post {
            id: PostId::random(),
            title: post.draft.title().to_owned(),
            content: post.draft.content().to_owned(),
            user_id: post.user_id.clone(),
            created_at: Some(post.timestamp),
            updated_at: Some(post.timestamp),
        };
        state.posts.push(row.clone());
        Ok(row)
    }

    async fn find_by_id(
        &self,
        caller: &Caller,
        id: &PostId,
    ) -> Result<Option<Post>, BackendError> {
        let state = self.lock();
        state.table(Table::Posts)?;
        state.authorize(caller)?;
        Ok(state.posts.iter().find(|post| &post.id == id).cloned())
    }

    async fn list_all(&self, caller: &Caller) -> Result<Vec<Post>, BackendError> {
        let state = self.lock();
        state.table(Table::Posts)?;
        state.authorize(caller)?;
        Ok(state.sorted_posts(|_| true))
    }

    async fn list_by_owner(
        &self,
        caller: &Caller,
        owner: &UserId,
    ) -> Result<Vec<Post>, BackendError> {
        let state = self.lock();
        state.table(Table::Posts)?;
        state.authorize(caller)?;
        Ok(state.sorted_posts(|post| &post.user_id == owner))
    }

    async fn update(
        &self,
        caller: &Caller,
        id: &PostId,
        update: &PostUpdate,
    ) -> Result<Option<Post>, BackendError> {
        let mut state = self.lock();
        state.table(Table::Posts)?;
        state.authorize(caller)?;
        let Some(row) = state.posts.iter_mut().find(|post| &post.id == id) else {
            return Ok(None);
        };
        if let Some(title) = update.changes.title() {
            title.clone_into(&mut row.title);
        }
        if let Some(content) = update.changes.content() {
            content.clone_into(&mut row.content);
        }
        row.updated_at = Some(update.updated_at);
        Ok(Some(row.clone()))
    }

    async fn delete(&self, caller: &Caller, id: &PostId) -> Result<bool, BackendError> {
        let mut state = self.lock();
        state.table(Table::Posts)?;
        state.authorize(caller)?;
        let before = state.posts.len();
        state.posts.retain(|post| &post.id != id);
        Ok(state.posts.len() != before)
    }
}
