use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    pub user_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub birthday: String,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture_url: Option<String>,
    pub jobs: Vec<UserJob>,
    pub education: Vec<UserEducation>,
}

/// An image picked at registration, uploaded before the profile is saved.
#[derive(Clone, Debug, PartialEq)]
pub struct ProfilePicture {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub content_type: String,
}

/// A job entry; no `end_date` means the position is current.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct UserJob {
    pub job_id: String,
    pub job_title: String,
    pub company_name: String,
    pub start_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    pub location: String,
    pub description: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct UserEducation {
    pub education_id: String,
    pub institution: String,
    pub degree: String,
    pub field_of_study: String,
    pub start_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    pub location: String,
    pub description: String,
}

/// The public slice of a user: post authors, commenters and search hits.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct UserSummary {
    pub user_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub profile_picture_url: Option<String>,
}

impl UserSummary {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct UserInfo {
    pub user_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub birthday: String,
    pub location: String,
    pub number_of_friends: u32,
    pub profile_picture_url: Option<String>,
    pub is_friend: bool,
}

/// Someone else's profile page.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct UserDetails {
    pub user_info: UserInfo,
    pub jobs: Vec<UserJob>,
    pub educations: Vec<UserEducation>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Post {
    pub post_id: String,
    pub title: String,
    pub content: String,
    pub timestamp: String,
    pub like_count: u64,
    pub comment_count: u64,
    pub is_liked: bool,
    pub is_pinned: bool,
}

/// A timeline entry: the post together with its author.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct FeedPost {
    pub post: Post,
    pub user: UserSummary,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct NewPost {
    pub title: String,
    pub content: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Comment {
    pub comment_id: String,
    pub user_id: String,
    pub content: String,
    pub timestamp: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct CommentEntry {
    pub comment: Comment,
    pub user: UserSummary,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct FriendRequest {
    pub request_id: String,
    pub sender_id: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct PushKeys {
    pub p256dh: String,
    pub auth: String,
}

/// Browser-issued push endpoint and keys (the `PushSubscriptionJSON` shape).
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PushSubscription {
    pub endpoint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_time: Option<i64>,
    #[serde(default)]
    pub keys: PushKeys,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn post_uses_backend_field_names() {
        let post: Post = serde_json::from_value(json!({
            "postId": "p1",
            "title": "Monday",
            "content": "coffee",
            "timestamp": "1718000000000",
            "likeCount": 3,
            "commentCount": 1,
            "isLiked": true,
            "isPinned": false
        }))
        .unwrap();
        assert_eq!(post.post_id, "p1");
        assert_eq!(post.like_count, 3);
        assert!(post.is_liked);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let user: User = serde_json::from_value(json!({"userId": "u1"})).unwrap();
        assert_eq!(user.user_id, "u1");
        assert!(user.jobs.is_empty());

        let job: UserJob = serde_json::from_value(json!({"jobId": "j1", "jobTitle": "Barista"})).unwrap();
        assert_eq!(job.end_date, None);
    }

    #[test]
    fn subscription_matches_browser_json() {
        let sub: PushSubscription = serde_json::from_value(json!({
            "endpoint": "https://push.example/abc",
            "expirationTime": null,
            "keys": {"p256dh": "key", "auth": "secret"}
        }))
        .unwrap();
        assert_eq!(sub.keys.auth, "secret");
        let out = serde_json::to_value(&sub).unwrap();
        assert!(out.get("expirationTime").is_none());
    }
}
