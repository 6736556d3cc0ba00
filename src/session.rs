//! The flows behind each screen: call the backend, then mirror the result
//! into the local stores so every view sees the same data.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local, TimeZone};
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::WindowConfig;
use crate::core::client::ApiClient;
use crate::core::errors::GatewayError;
use crate::models::models::{
    CommentEntry, FeedPost, FriendRequest, Post, ProfilePicture, PushSubscription, User, UserDetails,
    UserEducation, UserJob, UserSummary,
};
use crate::store::AppState;
use crate::validation::{
    validate_comment, validate_education, validate_job, validate_post, validate_profile,
    ValidationError,
};
use crate::window::{PostingStatus, PostingWindow};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("{}", .0.message())]
    NotPostingTime(PostingStatus),
}

impl SessionError {
    pub fn is_auth(&self) -> bool {
        matches!(self, SessionError::Gateway(err) if err.is_auth())
    }
}

/// Source of "now" for the posting monitor.
pub type Clock = Arc<dyn Fn() -> DateTime<Local> + Send + Sync>;

#[derive(Clone)]
pub struct Session {
    pub api: ApiClient,
    pub state: Arc<AppState>,
    window: PostingWindow,
    recheck: Duration,
    clock: Clock,
}

impl Session {
    pub fn new(api: ApiClient, state: Arc<AppState>, config: &WindowConfig) -> Self {
        Self {
            api,
            state,
            window: PostingWindow::from_config(config),
            recheck: config.recheck,
            clock: Arc::new(Local::now),
        }
    }

    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Local> + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn window(&self) -> &PostingWindow {
        &self.window
    }

    // Account

    /// Loads everything the home screen needs after sign-in. Only the
    /// profile itself is required; jobs, education and the feed are
    /// best-effort.
    pub async fn login(&self) -> Result<User, SessionError> {
        let mut user = self.api.fetch_me().await?;
        info!(user_id = %user.user_id, "Signed in");

        match self.api.fetch_jobs().await {
            Ok(jobs) => user.jobs = jobs,
            Err(err) => warn!(error = %err, "Could not load jobs"),
        }
        match self.api.fetch_education().await {
            Ok(education) => user.education = education,
            Err(err) => warn!(error = %err, "Could not load education"),
        }
        self.state.user.update(|s| s.set_user(user.clone()));

        if let Err(err) = self.reload_feed().await {
            warn!(error = %err, "Could not load timeline");
        }
        Ok(user)
    }

    /// Uploads the optional picture, creates the profile, then each job and
    /// education entry in turn.
    pub async fn register(&self, form: &User, picture: Option<ProfilePicture>) -> Result<User, SessionError> {
        let clean = validate_profile(form)?;
        let profile_picture_url = match picture {
            Some(picture) => Some(
                self.api
                    .upload_profile_picture(picture.bytes, &picture.file_name, &picture.content_type)
                    .await?,
            ),
            None => clean.profile_picture_url.clone(),
        };
        let profile = User {
            profile_picture_url,
            jobs: Vec::new(),
            education: Vec::new(),
            ..clean.clone()
        };
        let saved = self.api.save_me(&profile).await?;
        info!(user_id = %saved.user_id, "Registered");
        self.state.user.update(|s| {
            s.set_user(User {
                jobs: Vec::new(),
                education: Vec::new(),
                ..saved
            })
        });

        for job in &clean.jobs {
            self.add_job(job).await?;
        }
        for education in &clean.education {
            self.add_education(education).await?;
        }
        Ok(self.state.user.read(|s| s.get_user().clone()))
    }

    /// Saves profile fields; cached jobs and education are kept.
    pub async fn update_profile(&self, form: &User) -> Result<User, SessionError> {
        let clean = validate_profile(form)?;
        let saved = self.api.save_me(&clean).await?;
        Ok(self.state.user.update(|s| {
            let user = User {
                jobs: s.get_jobs().to_vec(),
                education: s.get_education().to_vec(),
                ..saved
            };
            s.set_user(user.clone());
            user
        }))
    }

    pub fn logout(&self) {
        info!("Signing out");
        self.state.reset();
    }

    pub async fn delete_account(&self) -> Result<(), SessionError> {
        self.api.delete_me().await?;
        info!("Account deleted");
        self.state.reset();
        Ok(())
    }

    pub async fn view_user(&self, user_id: &str) -> Result<UserDetails, SessionError> {
        Ok(self.api.fetch_user(user_id).await?)
    }

    // Jobs and education

    pub async fn add_job(&self, job: &UserJob) -> Result<UserJob, SessionError> {
        let job = self.api.add_job(&validate_job(job)?).await?;
        self.state.user.update(|s| s.add_job(job.clone()));
        Ok(job)
    }

    pub async fn update_job(&self, job: &UserJob) -> Result<UserJob, SessionError> {
        let job = self.api.update_job(&validate_job(job)?).await?;
        self.state
            .user
            .update(|s| s.update_job(&job.job_id, job.clone()));
        Ok(job)
    }

    pub async fn delete_job(&self, job_id: &str) -> Result<(), SessionError> {
        self.api.delete_job(job_id).await?;
        self.state.user.update(|s| s.remove_job(job_id));
        Ok(())
    }

    pub async fn add_education(&self, education: &UserEducation) -> Result<UserEducation, SessionError> {
        let education = self
            .api
            .add_education(&validate_education(education)?)
            .await?;
        self.state
            .user
            .update(|s| s.add_education(education.clone()));
        Ok(education)
    }

    pub async fn update_education(&self, education: &UserEducation) -> Result<UserEducation, SessionError> {
        let education = self
            .api
            .update_education(&validate_education(education)?)
            .await?;
        self.state
            .user
            .update(|s| s.update_education(&education.education_id, education.clone()));
        Ok(education)
    }

    pub async fn delete_education(&self, education_id: &str) -> Result<(), SessionError> {
        self.api.delete_education(education_id).await?;
        self.state
            .user
            .update(|s| s.remove_education(education_id));
        Ok(())
    }

    // Feed and posts

    /// The cached timeline, fetched only the first time.
    pub async fn refresh_feed(&self) -> Result<Vec<FeedPost>, SessionError> {
        if self.state.user.read(|s| s.feed_has_loaded()) {
            debug!("Feed already loaded, serving from cache");
            return Ok(self.state.posts.read(|p| p.get_feed_posts()));
        }
        self.reload_feed().await
    }

    /// Refetches the timeline regardless of the cache.
    pub async fn reload_feed(&self) -> Result<Vec<FeedPost>, SessionError> {
        let feed = self.api.fetch_timeline().await?;
        self.state.posts.update(|p| p.set_feed_posts(feed));
        self.state.user.update(|s| s.set_feed_has_loaded(true));
        Ok(self.state.posts.read(|p| p.get_feed_posts()))
    }

    pub async fn load_my_posts(&self) -> Result<Vec<Post>, SessionError> {
        let posts = self.api.fetch_my_posts().await?;
        self.state.posts.update(|p| p.set_posts(posts));
        Ok(self.state.posts.read(|p| p.get_posts()))
    }

    pub async fn load_pinned(&self) -> Result<Vec<Post>, SessionError> {
        let pinned = self.api.fetch_my_pinned_posts().await?;
        self.state.posts.update(|p| p.set_pinned_posts(pinned));
        Ok(self.state.posts.read(|p| p.get_pinned_posts()))
    }

    /// Whether the user may post right now.
    ///
    /// Outside the window the clock decides without a network call. Inside
    /// it, the post service's daily-post answer wins; if that call fails the
    /// cached personal posts are checked instead.
    pub async fn posting_status<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> PostingStatus {
        let by_clock = self.window.status(now, false);
        if !by_clock.can_post() {
            return by_clock;
        }
        let has_posted = match self.api.fetch_daily_post().await {
            Ok(daily) => daily.is_some(),
            Err(err) => {
                warn!(error = %err, "Daily post check failed, using cached posts");
                let posts = self.state.posts.read(|p| p.get_posts());
                self.window.has_posted_today(&posts, now)
            }
        };
        self.window.status(now, has_posted)
    }

    pub async fn add_post<Tz: TimeZone>(
        &self,
        title: &str,
        content: &str,
        now: &DateTime<Tz>,
    ) -> Result<Post, SessionError> {
        let draft = validate_post(title, content)?;
        let status = self.posting_status(now).await;
        if !status.can_post() {
            return Err(SessionError::NotPostingTime(status));
        }
        let post = self.api.create_post(&draft).await?;
        info!(post_id = %post.post_id, "Daily post created");
        self.state.posts.update(|p| p.add_post(post.clone()));
        Ok(post)
    }

    pub async fn edit_post(&self, post: &Post) -> Result<Post, SessionError> {
        let draft = validate_post(&post.title, &post.content)?;
        let edited = Post {
            title: draft.title,
            content: draft.content,
            ..post.clone()
        };
        let saved = self.api.update_post(&edited).await?;
        self.state
            .posts
            .update(|p| p.update_post(&saved.post_id, saved.clone()));
        Ok(saved)
    }

    pub async fn delete_post(&self, post_id: &str) -> Result<(), SessionError> {
        self.api.delete_post(post_id).await?;
        self.state.posts.update(|p| p.remove_post(post_id));
        Ok(())
    }

    pub async fn like_post(&self, post_id: &str) -> Result<(), SessionError> {
        self.api.like_post(post_id).await?;
        self.state.posts.update(|p| p.set_liked(post_id, true));
        Ok(())
    }

    pub async fn unlike_post(&self, post_id: &str) -> Result<(), SessionError> {
        self.api.unlike_post(post_id).await?;
        self.state.posts.update(|p| p.set_liked(post_id, false));
        Ok(())
    }

    pub async fn pin_post(&self, post_id: &str) -> Result<(), SessionError> {
        self.api.pin_post(post_id).await?;
        if !self.state.posts.update(|p| p.pin_post(post_id)) {
            let cached = self.state.posts.read(|p| p.post(post_id).cloned());
            let post = match cached {
                Some(post) => post,
                None => self.api.fetch_post(post_id).await?,
            };
            self.state.posts.update(|p| p.add_pinned_post(post));
        }
        Ok(())
    }

    pub async fn unpin_post(&self, post_id: &str) -> Result<(), SessionError> {
        self.api.unpin_post(post_id).await?;
        self.state.posts.update(|p| p.unpin_post(post_id));
        Ok(())
    }

    // Comments

    pub async fn load_comments(&self, post_id: &str) -> Result<Vec<CommentEntry>, SessionError> {
        let comments = self.api.fetch_comments(post_id).await?;
        let count = comments.len() as u64;
        self.state
            .posts
            .update(|p| p.set_comment_count(post_id, count));
        Ok(comments)
    }

    pub async fn add_comment(&self, post_id: &str, content: &str) -> Result<CommentEntry, SessionError> {
        let content = validate_comment(content)?;
        let comment = self.api.add_comment(post_id, &content).await?;
        self.state
            .posts
            .update(|p| p.adjust_comment_count(post_id, true));
        Ok(comment)
    }

    pub async fn delete_comment(&self, post_id: &str, comment_id: &str) -> Result<(), SessionError> {
        self.api.delete_comment(post_id, comment_id).await?;
        self.state
            .posts
            .update(|p| p.adjust_comment_count(post_id, false));
        Ok(())
    }

    // Friends

    pub async fn search_users(&self, name: &str) -> Result<Vec<UserSummary>, SessionError> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.api.search_users(name).await?)
    }

    pub async fn send_friend_request(&self, user_id: &str) -> Result<(), SessionError> {
        Ok(self.api.send_friend_request(user_id).await?)
    }

    pub async fn accept_friend_request(&self, request_id: &str) -> Result<(), SessionError> {
        Ok(self.api.accept_friend_request(request_id).await?)
    }

    pub async fn decline_friend_request(&self, request_id: &str) -> Result<(), SessionError> {
        Ok(self.api.decline_friend_request(request_id).await?)
    }

    pub async fn cancel_friend_request(&self, request_id: &str) -> Result<(), SessionError> {
        Ok(self.api.cancel_friend_request(request_id).await?)
    }

    pub async fn friend_requests(&self) -> Result<(Vec<FriendRequest>, Vec<FriendRequest>), SessionError> {
        let incoming = self.api.fetch_incoming_requests().await?;
        let outgoing = self.api.fetch_outgoing_requests().await?;
        Ok((incoming, outgoing))
    }

    pub async fn friends(&self) -> Result<Vec<UserSummary>, SessionError> {
        Ok(self.api.fetch_friends().await?)
    }

    pub async fn remove_friend(&self, friend_id: &str) -> Result<(), SessionError> {
        Ok(self.api.remove_friend(friend_id).await?)
    }

    pub async fn register_push_subscription(&self, subscription: &PushSubscription) -> Result<(), SessionError> {
        Ok(self.api.register_push_subscription(subscription).await?)
    }

    /// Re-evaluates the posting status every re-check period and publishes
    /// changes until `cancel` fires or every receiver is dropped.
    pub fn spawn_posting_monitor(
        &self,
        cancel: CancellationToken,
    ) -> (watch::Receiver<PostingStatus>, JoinHandle<()>) {
        let initial = {
            let posts = self.state.posts.read(|p| p.get_posts());
            self.window.evaluate(&posts, &(self.clock)())
        };
        let (tx, rx) = watch::channel(initial);
        let session = Session {
            api: self.api.scoped(cancel.clone()),
            ..self.clone()
        };

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(session.recheck);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        let status = session.posting_status(&(session.clock)()).await;
                        tx.send_if_modified(|current| {
                            if *current == status {
                                return false;
                            }
                            debug!(%status, "Posting status changed");
                            *current = status;
                            true
                        });
                        if tx.is_closed() {
                            break;
                        }
                    }
                }
            }
            debug!("Posting monitor stopped");
        });
        (rx, handle)
    }
}
