//! Blog record store: accounts, posts and the active session.
//!
//! # Responsibility
//! - Load the three durable records on open and expose them read-only.
//! - Validate, mutate and persist accounts and posts.
//! - Establish and clear the session on signup, login and logout.
//!
//! # Invariants
//! - Every mutation persists the next collection before swapping it into
//!   memory, so a storage failure leaves in-memory state unchanged.
//! - Posts are ordered newest first; deletions keep survivor order.
//! - Emails, passwords and post bodies never appear in log events.

use crate::image_codec::{compress_image, ImageCodecError};
use crate::model::account::{Account, Session};
use crate::model::post::{default_posts, next_post_id, Post, PostId};
use crate::model::validation::{
    validate_email, validate_name, validate_password, validate_post_fields, ValidationError,
};
use crate::password::hash_password;
use crate::repo::record_repo::{RecordKey, RecordRepository, RepoError, RepoResult};
use crate::service::session_manager::SessionManager;
use chrono::{NaiveDate, Utc};
use log::{error, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Missing or incorrect credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// No account matches the email and password pair.
    InvalidCredentials,
    /// Operation requires an active session.
    NotLoggedIn,
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCredentials => f.write_str("invalid credentials"),
            Self::NotLoggedIn => f.write_str("not logged in"),
        }
    }
}

impl Error for AuthError {}

/// Uniqueness violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictError {
    EmailExists,
}

impl Display for ConflictError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmailExists => f.write_str("email exists"),
        }
    }
}

impl Error for ConflictError {}

/// Store-level error. Every variant is recoverable by the caller.
#[derive(Debug)]
pub enum StoreError {
    Validation(ValidationError),
    Conflict(ConflictError),
    Auth(AuthError),
    Decode(ImageCodecError),
    Storage(RepoError),
}

impl StoreError {
    /// Sentence suitable for display to the user.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Validation(err) => err.user_message(),
            Self::Conflict(ConflictError::EmailExists) => {
                "Email already registered. Please login instead."
            }
            Self::Auth(AuthError::InvalidCredentials) => "Invalid email or password",
            Self::Auth(AuthError::NotLoggedIn) => "Please login to continue",
            Self::Decode(_) => "Error processing image",
            Self::Storage(_) => "Could not save your changes. Please try again.",
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Conflict(_) => "conflict",
            Self::Auth(_) => "auth",
            Self::Decode(_) => "decode",
            Self::Storage(_) => "storage",
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "validation error: {err}"),
            Self::Conflict(err) => write!(f, "conflict: {err}"),
            Self::Auth(err) => write!(f, "auth error: {err}"),
            Self::Decode(err) => write!(f, "{err}"),
            Self::Storage(err) => write!(f, "storage error: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Conflict(err) => Some(err),
            Self::Auth(err) => Some(err),
            Self::Decode(err) => Some(err),
            Self::Storage(err) => Some(err),
        }
    }
}

impl From<ValidationError> for StoreError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<ConflictError> for StoreError {
    fn from(value: ConflictError) -> Self {
        Self::Conflict(value)
    }
}

impl From<AuthError> for StoreError {
    fn from(value: AuthError) -> Self {
        Self::Auth(value)
    }
}

impl From<ImageCodecError> for StoreError {
    fn from(value: ImageCodecError) -> Self {
        Self::Decode(value)
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        Self::Storage(value)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

fn utc_today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Record store facade over a [`RecordRepository`].
pub struct BlogStore<R: RecordRepository> {
    repo: R,
    accounts: Vec<Account>,
    posts: Vec<Post>,
    session: SessionManager,
    today: fn() -> NaiveDate,
}

impl<R: RecordRepository> BlogStore<R> {
    /// Opens the store and loads every durable record.
    ///
    /// Posts fall back to the example set when no post record exists yet.
    pub fn open(repo: R) -> StoreResult<Self> {
        let mut store = Self {
            repo,
            accounts: Vec::new(),
            posts: Vec::new(),
            session: SessionManager::default(),
            today: utc_today,
        };
        store.reload()?;
        info!(
            "event=store_open module=service status=ok accounts={} posts={} authenticated={}",
            store.accounts.len(),
            store.posts.len(),
            store.session.current().is_some()
        );
        Ok(store)
    }

    /// Replaces the date source used to stamp new posts.
    pub fn with_today(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Re-reads all records from storage, discarding in-memory state.
    pub fn reload(&mut self) -> StoreResult<()> {
        let accounts = self.load_accounts()?;
        let posts = self.load_posts()?;
        let session = SessionManager::load(&self.repo)?;
        self.accounts = accounts;
        self.posts = posts;
        self.session = session;
        Ok(())
    }

    /// Reads the stored accounts, or an empty list when none were saved.
    pub fn load_accounts(&self) -> RepoResult<Vec<Account>> {
        Ok(read_json(&self.repo, RecordKey::Accounts)?.unwrap_or_default())
    }

    /// Reads the stored posts, or the example posts when none were saved.
    ///
    /// A stored empty list stays empty.
    pub fn load_posts(&self) -> RepoResult<Vec<Post>> {
        Ok(read_json(&self.repo, RecordKey::Posts)?.unwrap_or_else(default_posts))
    }

    /// Overwrites the durable account record. In-memory state is untouched.
    pub fn save_accounts(&self, accounts: &[Account]) -> RepoResult<()> {
        write_json(&self.repo, RecordKey::Accounts, accounts)
    }

    /// Overwrites the durable post record. In-memory state is untouched.
    pub fn save_posts(&self, posts: &[Post]) -> RepoResult<()> {
        write_json(&self.repo, RecordKey::Posts, posts)
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    /// Posts, newest first.
    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn post(&self, id: PostId) -> Option<&Post> {
        self.posts.iter().find(|post| post.id == id)
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.current()
    }

    pub fn session_manager(&self) -> &SessionManager {
        &self.session
    }

    /// Registers an account and logs it in.
    ///
    /// Checks run in order: name length, email syntax, email uniqueness,
    /// password length, confirmation match.
    pub fn create_account(
        &mut self,
        name: &str,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> StoreResult<Account> {
        let result = self.try_create_account(name, email, password, confirm_password);
        match &result {
            Ok(_) => info!(
                "event=account_create module=service status=ok accounts={}",
                self.accounts.len()
            ),
            Err(err) => log_failure("account_create", err),
        }
        result
    }

    fn try_create_account(
        &mut self,
        name: &str,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> StoreResult<Account> {
        validate_name(name)?;
        validate_email(email)?;
        if self.accounts.iter().any(|account| account.email == email) {
            return Err(ConflictError::EmailExists.into());
        }
        validate_password(password)?;
        if password != confirm_password {
            return Err(ValidationError::PasswordMismatch.into());
        }

        let account = Account::new(name, email, hash_password(password));
        let mut next = self.accounts.clone();
        next.push(account.clone());
        self.save_accounts(&next)?;

        if let Err(err) = self.session.establish(&self.repo, account.to_session()) {
            // Keep the account record consistent with memory.
            if let Err(restore_err) = self.save_accounts(&self.accounts) {
                error!(
                    "event=account_create module=service status=error error_code=restore_failed error={restore_err}"
                );
            }
            return Err(err.into());
        }

        self.accounts = next;
        Ok(account)
    }

    /// Logs in with email and password.
    ///
    /// Malformed input fails with `Validation` before any lookup. Unknown
    /// email and wrong password both fail with `InvalidCredentials`.
    pub fn authenticate(&mut self, email: &str, password: &str) -> StoreResult<Account> {
        let result = self.try_authenticate(email, password);
        match &result {
            Ok(_) => info!("event=login module=service status=ok"),
            Err(err) => log_failure("login", err),
        }
        result
    }

    fn try_authenticate(&mut self, email: &str, password: &str) -> StoreResult<Account> {
        validate_email(email)?;
        validate_password(password)?;

        let digest = hash_password(password);
        let account = self
            .accounts
            .iter()
            .find(|account| account.email == email && account.password_digest == digest)
            .cloned()
            .ok_or(AuthError::InvalidCredentials)?;

        self.session.establish(&self.repo, account.to_session())?;
        Ok(account)
    }

    /// Ends the active session. Logging out while anonymous is a no-op.
    pub fn logout(&mut self) -> StoreResult<()> {
        self.session.clear(&self.repo)?;
        Ok(())
    }

    /// Creates a post authored by the active session.
    ///
    /// `image` is a data URI or URL; pass `""` for no image.
    pub fn create_post(&mut self, title: &str, content: &str, image: &str) -> StoreResult<Post> {
        let result = self
            .require_session()
            .and_then(|author| {
                validate_post_fields(title, content)?;
                Ok(author)
            })
            .and_then(|author| self.insert_post(title, content, image.to_string(), author));
        self.log_post_create(&result);
        result
    }

    /// Compresses optional raw image bytes, then creates the post.
    ///
    /// A decode failure aborts before anything is mutated.
    pub fn create_post_with_image(
        &mut self,
        title: &str,
        content: &str,
        image_bytes: Option<&[u8]>,
    ) -> StoreResult<Post> {
        let result = self
            .require_session()
            .and_then(|author| {
                validate_post_fields(title, content)?;
                let image = match image_bytes {
                    Some(bytes) => compress_image(bytes)?,
                    None => String::new(),
                };
                Ok((author, image))
            })
            .and_then(|(author, image)| self.insert_post(title, content, image, author));
        self.log_post_create(&result);
        result
    }

    fn require_session(&self) -> StoreResult<String> {
        self.session
            .current()
            .map(|session| session.name.clone())
            .ok_or(StoreError::Auth(AuthError::NotLoggedIn))
    }

    fn insert_post(
        &mut self,
        title: &str,
        content: &str,
        image: String,
        author: String,
    ) -> StoreResult<Post> {
        let post = Post {
            id: next_post_id(&self.posts),
            title: title.to_string(),
            image,
            content: content.to_string(),
            author,
            date: (self.today)(),
        };

        let mut next = Vec::with_capacity(self.posts.len() + 1);
        next.push(post.clone());
        next.extend(self.posts.iter().cloned());
        self.save_posts(&next)?;
        self.posts = next;
        Ok(post)
    }

    fn log_post_create(&self, result: &StoreResult<Post>) {
        match result {
            Ok(post) => info!(
                "event=post_create module=service status=ok post_id={} has_image={} posts={}",
                post.id,
                post.has_image(),
                self.posts.len()
            ),
            Err(err) => log_failure("post_create", err),
        }
    }

    /// Deletes one post by id once `confirm` is set.
    ///
    /// Any post may be deleted regardless of author. Returns whether a post
    /// was removed; unknown ids are a silent no-op.
    pub fn delete_post(&mut self, id: PostId, confirm: bool) -> StoreResult<bool> {
        if !confirm {
            return Ok(false);
        }

        let next: Vec<Post> = self
            .posts
            .iter()
            .filter(|post| post.id != id)
            .cloned()
            .collect();
        let removed = next.len() != self.posts.len();
        if let Err(err) = self.save_posts(&next) {
            let err = StoreError::from(err);
            log_failure("post_delete", &err);
            return Err(err);
        }
        self.posts = next;

        info!("event=post_delete module=service status=ok post_id={id} removed={removed}");
        Ok(removed)
    }

    /// Deletes every post authored by the active session's name.
    ///
    /// Fails with `NotLoggedIn` when anonymous, even without confirmation.
    /// Returns the number of posts removed.
    pub fn delete_all_posts_by_author(&mut self, confirm: bool) -> StoreResult<usize> {
        let author = match self.require_session() {
            Ok(author) => author,
            Err(err) => {
                log_failure("post_delete_all", &err);
                return Err(err);
            }
        };
        if !confirm {
            return Ok(0);
        }

        let next: Vec<Post> = self
            .posts
            .iter()
            .filter(|post| post.author != author)
            .cloned()
            .collect();
        let removed = self.posts.len() - next.len();
        if let Err(err) = self.save_posts(&next) {
            let err = StoreError::from(err);
            log_failure("post_delete_all", &err);
            return Err(err);
        }
        self.posts = next;

        info!("event=post_delete_all module=service status=ok removed={removed}");
        Ok(removed)
    }
}

fn read_json<R, T>(repo: &R, key: RecordKey) -> RepoResult<Option<T>>
where
    R: RecordRepository,
    T: DeserializeOwned,
{
    match repo.read_record(key)? {
        Some(text) => serde_json::from_str(&text)
            .map(Some)
            .map_err(|err| RepoError::InvalidData {
                key,
                message: err.to_string(),
            }),
        None => Ok(None),
    }
}

fn write_json<R, T>(repo: &R, key: RecordKey, value: &T) -> RepoResult<()>
where
    R: RecordRepository,
    T: Serialize + ?Sized,
{
    let text =
        serde_json::to_string(value).map_err(|source| RepoError::Serialize { key, source })?;
    repo.write_record(key, &text)
}

fn log_failure(event: &str, err: &StoreError) {
    match err {
        StoreError::Storage(_) => error!(
            "event={event} module=service status=error error_code={} error={err}",
            err.code()
        ),
        _ => warn!(
            "event={event} module=service status=rejected error_code={} reason={err}",
            err.code()
        ),
    }
}
