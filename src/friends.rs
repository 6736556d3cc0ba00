use reqwest::Method;
use tracing::info;

use crate::core::client::ApiClient;
use crate::core::errors::GatewayError;
use crate::models::models::{FriendRequest, UserSummary};

fn request_path(request_id: &str, action: &str) -> String {
    format!("users/requests/{}/{}", urlencoding::encode(request_id), action)
}

impl ApiClient {
    pub async fn send_friend_request(&self, target_user_id: &str) -> Result<(), GatewayError> {
        info!(target_user_id, "Sending friend request");
        self.send_unit(
            Method::POST,
            &format!(
                "users/requests?targetUserId={}",
                urlencoding::encode(target_user_id)
            ),
        )
        .await
    }

    pub async fn accept_friend_request(&self, request_id: &str) -> Result<(), GatewayError> {
        self.send_unit(Method::POST, &request_path(request_id, "accept"))
            .await
    }

    pub async fn decline_friend_request(&self, request_id: &str) -> Result<(), GatewayError> {
        self.send_unit(Method::POST, &request_path(request_id, "decline"))
            .await
    }

    pub async fn cancel_friend_request(&self, request_id: &str) -> Result<(), GatewayError> {
        self.send_unit(Method::DELETE, &request_path(request_id, "cancel"))
            .await
    }

    pub async fn fetch_incoming_requests(&self) -> Result<Vec<FriendRequest>, GatewayError> {
        self.get_json("users/requests/incoming").await
    }

    pub async fn fetch_outgoing_requests(&self) -> Result<Vec<FriendRequest>, GatewayError> {
        self.get_json("users/requests/outgoing").await
    }

    pub async fn fetch_friends(&self) -> Result<Vec<UserSummary>, GatewayError> {
        self.get_json("users/friends").await
    }

    pub async fn remove_friend(&self, friend_id: &str) -> Result<(), GatewayError> {
        info!(friend_id, "Removing friend");
        self.send_unit(
            Method::DELETE,
            &format!("users/friends/{}/remove", urlencoding::encode(friend_id)),
        )
        .await
    }
}
