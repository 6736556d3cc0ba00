use reqwest::Method;
use tracing::info;

use crate::core::client::ApiClient;
use crate::core::errors::GatewayError;
use crate::models::models::{User, UserDetails, UserEducation, UserJob, UserSummary};

fn job_path(job_id: &str) -> String {
    format!("users/me/jobs/{}", urlencoding::encode(job_id))
}

fn education_path(education_id: &str) -> String {
    format!("users/me/education/{}", urlencoding::encode(education_id))
}

impl ApiClient {
    pub async fn fetch_me(&self) -> Result<User, GatewayError> {
        self.get_json("users/me").await
    }

    /// Creates the profile on first sign-in, or overwrites it afterwards;
    /// the user service treats both the same.
    pub async fn save_me(&self, user: &User) -> Result<User, GatewayError> {
        info!(user_id = %user.user_id, "Saving user profile");
        self.send_json(Method::POST, "users/me", user).await
    }

    pub async fn delete_me(&self) -> Result<(), GatewayError> {
        info!("Deleting user account");
        self.send_unit(Method::DELETE, "users/me").await
    }

    pub async fn fetch_user(&self, user_id: &str) -> Result<UserDetails, GatewayError> {
        self.get_json(&format!("users/{}", urlencoding::encode(user_id)))
            .await
    }

    pub async fn search_users(&self, name: &str) -> Result<Vec<UserSummary>, GatewayError> {
        self.get_json(&format!("users/search?name={}", urlencoding::encode(name)))
            .await
    }

    pub async fn fetch_jobs(&self) -> Result<Vec<UserJob>, GatewayError> {
        self.get_json("users/me/jobs").await
    }

    pub async fn add_job(&self, job: &UserJob) -> Result<UserJob, GatewayError> {
        self.send_json(Method::POST, "users/me/jobs", job).await
    }

    pub async fn update_job(&self, job: &UserJob) -> Result<UserJob, GatewayError> {
        self.send_json(Method::PUT, &job_path(&job.job_id), job).await
    }

    pub async fn delete_job(&self, job_id: &str) -> Result<(), GatewayError> {
        self.send_unit(Method::DELETE, &job_path(job_id)).await
    }

    pub async fn fetch_education(&self) -> Result<Vec<UserEducation>, GatewayError> {
        self.get_json("users/me/education").await
    }

    pub async fn add_education(&self, education: &UserEducation) -> Result<UserEducation, GatewayError> {
        self.send_json(Method::POST, "users/me/education", education)
            .await
    }

    pub async fn update_education(&self, education: &UserEducation) -> Result<UserEducation, GatewayError> {
        self.send_json(
            Method::PUT,
            &education_path(&education.education_id),
            education,
        )
        .await
    }

    pub async fn delete_education(&self, education_id: &str) -> Result<(), GatewayError> {
        self.send_unit(Method::DELETE, &education_path(education_id))
            .await
    }
}
