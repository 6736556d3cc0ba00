use reqwest::Method;
use tracing::info;

use crate::core::client::ApiClient;
use crate::core::errors::GatewayError;
use crate::models::models::{Comment, CommentEntry, FeedPost, NewPost, Post};

fn post_path(post_id: &str) -> String {
    format!("posts/posts/{}", urlencoding::encode(post_id))
}

fn pinned_path(post_id: &str) -> String {
    format!("posts/users/me/pinned-posts/{}", urlencoding::encode(post_id))
}

impl ApiClient {
    pub async fn fetch_my_posts(&self) -> Result<Vec<Post>, GatewayError> {
        self.get_json("posts/users/me/posts").await
    }

    pub async fn fetch_user_posts(&self, user_id: &str) -> Result<Vec<Post>, GatewayError> {
        self.get_json(&format!("posts/users/{}/posts", urlencoding::encode(user_id)))
            .await
    }

    pub async fn fetch_post(&self, post_id: &str) -> Result<Post, GatewayError> {
        self.get_json(&post_path(post_id)).await
    }

    /// Today's post, if the user has made one. The post service is the
    /// authority on the one-post-per-day rule.
    pub async fn fetch_daily_post(&self) -> Result<Option<Post>, GatewayError> {
        self.get_optional_json("posts/users/me/daily-post").await
    }

    pub async fn fetch_timeline(&self) -> Result<Vec<FeedPost>, GatewayError> {
        self.get_json("posts/users/me/timeline").await
    }

    pub async fn create_post(&self, post: &NewPost) -> Result<Post, GatewayError> {
        info!(title = %post.title, "Creating post");
        self.send_json(Method::POST, "posts/posts", post).await
    }

    pub async fn update_post(&self, post: &Post) -> Result<Post, GatewayError> {
        self.send_json(Method::PUT, &post_path(&post.post_id), post)
            .await
    }

    pub async fn delete_post(&self, post_id: &str) -> Result<(), GatewayError> {
        info!(post_id, "Deleting post");
        self.send_unit(Method::DELETE, &post_path(post_id)).await
    }

    pub async fn like_post(&self, post_id: &str) -> Result<(), GatewayError> {
        self.send_unit(Method::POST, &format!("{}/likes", post_path(post_id)))
            .await
    }

    pub async fn unlike_post(&self, post_id: &str) -> Result<(), GatewayError> {
        self.send_unit(Method::DELETE, &format!("{}/likes", post_path(post_id)))
            .await
    }

    pub async fn fetch_comments(&self, post_id: &str) -> Result<Vec<CommentEntry>, GatewayError> {
        self.get_json(&format!("{}/comments", post_path(post_id)))
            .await
    }

    pub async fn add_comment(&self, post_id: &str, content: &str) -> Result<CommentEntry, GatewayError> {
        let comment = Comment {
            content: content.to_string(),
            ..Default::default()
        };
        self.send_json(
            Method::POST,
            &format!("{}/comments", post_path(post_id)),
            &comment,
        )
        .await
    }

    pub async fn delete_comment(&self, post_id: &str, comment_id: &str) -> Result<(), GatewayError> {
        self.send_unit(
            Method::DELETE,
            &format!(
                "{}/comments/{}",
                post_path(post_id),
                urlencoding::encode(comment_id)
            ),
        )
        .await
    }

    pub async fn fetch_my_pinned_posts(&self) -> Result<Vec<Post>, GatewayError> {
        self.get_json("posts/users/me/pinned-posts").await
    }

    pub async fn fetch_user_pinned_posts(&self, user_id: &str) -> Result<Vec<Post>, GatewayError> {
        self.get_json(&format!(
            "posts/users/{}/pinned-posts",
            urlencoding::encode(user_id)
        ))
        .await
    }

    pub async fn pin_post(&self, post_id: &str) -> Result<(), GatewayError> {
        self.send_unit(Method::POST, &pinned_path(post_id)).await
    }

    pub async fn unpin_post(&self, post_id: &str) -> Result<(), GatewayError> {
        self.send_unit(Method::DELETE, &pinned_path(post_id)).await
    }
}
