//! Required-field checks done before anything is sent to the backend.

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;
use uuid::Uuid;

use crate::config::{MAX_COMMENT_LENGTH, MAX_POST_LENGTH, MAX_POST_TITLE_LENGTH};
use crate::core::helpers::sanitize_text;
use crate::models::models::{NewPost, User, UserEducation, UserJob};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),

    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("Please enter a valid email address")]
    InvalidEmail,
}

fn email_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Regex should compile")
    })
}

fn required(value: &str, field: &'static str) -> Result<String, ValidationError> {
    let clean = sanitize_text(value.trim());
    if clean.trim().is_empty() {
        return Err(ValidationError::Required(field));
    }
    Ok(clean.trim().to_string())
}

fn bounded(value: &str, field: &'static str, max: usize) -> Result<String, ValidationError> {
    let clean = required(value, field)?;
    if clean.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(clean)
}

fn optional(value: &str) -> String {
    sanitize_text(value.trim()).trim().to_string()
}

fn optional_date(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn id_or_fresh(id: &str) -> String {
    if id.trim().is_empty() {
        Uuid::new_v4().to_string()
    } else {
        id.to_string()
    }
}

pub fn validate_email(email: &str) -> Result<String, ValidationError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(ValidationError::Required("Email"));
    }
    if !email_regex().is_match(email) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(email.to_string())
}

/// Checks a registration or settings form and returns the cleaned profile.
pub fn validate_profile(user: &User) -> Result<User, ValidationError> {
    Ok(User {
        user_id: user.user_id.clone(),
        email: validate_email(&user.email)?,
        first_name: required(&user.first_name, "First name")?,
        last_name: required(&user.last_name, "Last name")?,
        birthday: required(&user.birthday, "Birthday")?,
        location: required(&user.location, "Location")?,
        profile_picture_url: user.profile_picture_url.clone(),
        jobs: user
            .jobs
            .iter()
            .map(validate_job)
            .collect::<Result<_, _>>()?,
        education: user
            .education
            .iter()
            .map(validate_education)
            .collect::<Result<_, _>>()?,
    })
}

pub fn validate_job(job: &UserJob) -> Result<UserJob, ValidationError> {
    Ok(UserJob {
        job_id: id_or_fresh(&job.job_id),
        job_title: required(&job.job_title, "Job title")?,
        company_name: required(&job.company_name, "Company")?,
        start_date: required(&job.start_date, "Start date")?,
        end_date: optional_date(&job.end_date),
        location: optional(&job.location),
        description: optional(&job.description),
    })
}

pub fn validate_education(education: &UserEducation) -> Result<UserEducation, ValidationError> {
    Ok(UserEducation {
        education_id: id_or_fresh(&education.education_id),
        institution: required(&education.institution, "Institution")?,
        degree: required(&education.degree, "Degree")?,
        field_of_study: optional(&education.field_of_study),
        start_date: required(&education.start_date, "Start date")?,
        end_date: optional_date(&education.end_date),
        location: optional(&education.location),
        description: optional(&education.description),
    })
}

pub fn validate_post(title: &str, content: &str) -> Result<NewPost, ValidationError> {
    Ok(NewPost {
        title: bounded(title, "Title", MAX_POST_TITLE_LENGTH)?,
        content: bounded(content, "Content", MAX_POST_LENGTH)?,
    })
}

pub fn validate_comment(content: &str) -> Result<String, ValidationError> {
    bounded(content, "Comment", MAX_COMMENT_LENGTH)
}
