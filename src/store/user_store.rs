use crate::models::models::{User, UserEducation, UserJob};

/// The signed-in user's profile.
///
/// A blank record (empty `user_id`) means nobody is signed in; callers check
/// [`UserState::is_signed_in`] before deciding to fetch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserState {
    user: User,
    feed_has_loaded: bool,
}

impl UserState {
    pub fn get_user(&self) -> &User {
        &self.user
    }

    pub fn set_user(&mut self, user: User) {
        self.user = user;
    }

    /// Resets to the blank, signed-out record.
    pub fn delete_user(&mut self) {
        *self = Self::default();
    }

    pub fn is_signed_in(&self) -> bool {
        !self.user.user_id.is_empty()
    }

    pub fn user_id(&self) -> &str {
        &self.user.user_id
    }

    pub fn email(&self) -> &str {
        &self.user.email
    }

    pub fn first_name(&self) -> &str {
        &self.user.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.user.last_name
    }

    pub fn birthday(&self) -> &str {
        &self.user.birthday
    }

    pub fn location(&self) -> &str {
        &self.user.location
    }

    pub fn set_user_id(&mut self, value: impl Into<String>) {
        self.user.user_id = value.into();
    }

    pub fn set_email(&mut self, value: impl Into<String>) {
        self.user.email = value.into();
    }

    pub fn set_first_name(&mut self, value: impl Into<String>) {
        self.user.first_name = value.into();
    }

    pub fn set_last_name(&mut self, value: impl Into<String>) {
        self.user.last_name = value.into();
    }

    pub fn set_birthday(&mut self, value: impl Into<String>) {
        self.user.birthday = value.into();
    }

    pub fn set_location(&mut self, value: impl Into<String>) {
        self.user.location = value.into();
    }

    pub fn set_profile_picture_url(&mut self, value: Option<String>) {
        self.user.profile_picture_url = value;
    }

    pub fn feed_has_loaded(&self) -> bool {
        self.feed_has_loaded
    }

    pub fn set_feed_has_loaded(&mut self, loaded: bool) {
        self.feed_has_loaded = loaded;
    }

    // Jobs

    pub fn get_jobs(&self) -> &[UserJob] {
        &self.user.jobs
    }

    pub fn set_jobs(&mut self, jobs: Vec<UserJob>) {
        self.user.jobs = jobs;
    }

    pub fn add_job(&mut self, job: UserJob) {
        self.user.jobs.push(job);
    }

    /// Replaces the job with `job_id`; unknown ids are ignored.
    pub fn update_job(&mut self, job_id: &str, updated: UserJob) {
        if let Some(job) = self.user.jobs.iter_mut().find(|j| j.job_id == job_id) {
            *job = updated;
        }
    }

    pub fn remove_job(&mut self, job_id: &str) {
        self.user.jobs.retain(|j| j.job_id != job_id);
    }

    // Education

    pub fn get_education(&self) -> &[UserEducation] {
        &self.user.education
    }

    pub fn set_education(&mut self, education: Vec<UserEducation>) {
        self.user.education = education;
    }

    pub fn add_education(&mut self, education: UserEducation) {
        self.user.education.push(education);
    }

    pub fn update_education(&mut self, education_id: &str, updated: UserEducation) {
        if let Some(edu) = self
            .user
            .education
            .iter_mut()
            .find(|e| e.education_id == education_id)
        {
            *edu = updated;
        }
    }

    pub fn remove_education(&mut self, education_id: &str) {
        self.user.education.retain(|e| e.education_id != education_id);
    }
}
