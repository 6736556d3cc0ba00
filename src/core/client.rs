use std::future::Future;
use std::sync::Arc;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::auth::TokenSource;
use crate::config::{profile_bucket_url, ApiConfig, DEV_SERVICE_MAP};
use crate::core::errors::GatewayError;

/// Resolves a logical API path such as `users/me/jobs` to a full URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRoutes {
    config: ApiConfig,
}

impl ApiRoutes {
    pub fn new(config: ApiConfig) -> Self {
        Self { config }
    }

    pub fn url(&self, path: &str) -> Result<String, GatewayError> {
        let path = path.trim_start_matches('/');
        match &self.config {
            ApiConfig::Gateway(base) => Ok(format!("{}/{}", base.trim_end_matches('/'), path)),
            ApiConfig::Dev => DEV_SERVICE_MAP
                .iter()
                .find(|(prefix, _)| path.starts_with(prefix))
                .map(|(_, base)| format!("{base}{path}"))
                .ok_or_else(|| GatewayError::NoRoute {
                    path: path.to_string(),
                }),
        }
    }
}

/// Authenticated access to the DailyGrind backend services.
///
/// One attempt per call: no retries and no timeouts. Non-2xx responses
/// become [`GatewayError::Status`] carrying the server's message.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    routes: Arc<ApiRoutes>,
    tokens: Arc<dyn TokenSource>,
    cancel: Option<CancellationToken>,
    picture_bucket: Arc<str>,
}

impl ApiClient {
    pub fn new(config: ApiConfig, tokens: Arc<dyn TokenSource>) -> Self {
        Self::with_client(Client::new(), config, tokens)
    }

    pub fn with_client(http: Client, config: ApiConfig, tokens: Arc<dyn TokenSource>) -> Self {
        Self {
            http,
            routes: Arc::new(ApiRoutes::new(config)),
            tokens,
            cancel: None,
            picture_bucket: profile_bucket_url().into(),
        }
    }

    /// Uploads profile pictures to `bucket_url` instead of the configured one.
    pub fn with_picture_bucket(mut self, bucket_url: impl Into<String>) -> Self {
        self.picture_bucket = bucket_url.into().into();
        self
    }

    /// A client whose requests end with [`GatewayError::Cancelled`] once
    /// `token` fires. Tie it to the lifetime of whatever awaits the result.
    pub fn scoped(&self, token: CancellationToken) -> Self {
        Self {
            cancel: Some(token),
            ..self.clone()
        }
    }

    pub fn routes(&self) -> &ApiRoutes {
        &self.routes
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, GatewayError> {
        let url = self.routes.url(path)?;
        debug!(%method, url = %url, "Calling backend");
        Ok(self.http.request(method, url))
    }

    /// Runs a whole call (token, request, body read and decode) so that a
    /// fired cancellation token ends it at any await point.
    async fn cancellable<T>(
        &self,
        call: impl Future<Output = Result<T, GatewayError>>,
    ) -> Result<T, GatewayError> {
        match &self.cancel {
            Some(cancel) => tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(GatewayError::Cancelled),
                result = call => result,
            },
            None => call.await,
        }
    }

    async fn execute(&self, builder: RequestBuilder) -> Result<Response, GatewayError> {
        let token = self
            .tokens
            .access_token()
            .await
            .ok_or(GatewayError::Unauthenticated)?;
        Self::send_checked(builder.bearer_auth(token)).await
    }

    async fn send_checked(request: RequestBuilder) -> Result<Response, GatewayError> {
        let resp = request.send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        let err = GatewayError::from_status(status, &body);
        warn!(status = %status, "Backend call failed: {}", err);
        Err(err)
    }

    async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, GatewayError> {
        let text = resp.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    async fn fetch_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, GatewayError> {
        let resp = self.execute(request).await?;
        Self::decode(resp).await
    }

    async fn fetch_optional_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<Option<T>, GatewayError> {
        let resp = match self.execute(request).await {
            Ok(resp) => resp,
            Err(err) if err.is_not_found() => return Ok(None),
            Err(err) => return Err(err),
        };
        let text = resp.text().await?;
        if text.trim().is_empty() || text.trim() == "null" {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&text)?))
    }

    async fn fetch_unit(&self, request: RequestBuilder) -> Result<(), GatewayError> {
        self.execute(request).await?;
        Ok(())
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, GatewayError> {
        let request = self.request(Method::GET, path)?;
        self.cancellable(self.fetch_json(request)).await
    }

    /// GET that treats 404 or an empty body as "nothing there".
    pub(crate) async fn get_optional_json<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<Option<T>, GatewayError> {
        let request = self.request(Method::GET, path)?;
        self.cancellable(self.fetch_optional_json(request)).await
    }

    pub(crate) async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T, GatewayError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(method, path)?.json(body);
        self.cancellable(self.fetch_json(request)).await
    }

    /// Sends a JSON body and ignores whatever comes back.
    pub(crate) async fn send_json_unit<B>(&self, method: Method, path: &str, body: &B) -> Result<(), GatewayError>
    where
        B: Serialize + ?Sized,
    {
        let request = self.request(method, path)?.json(body);
        self.cancellable(self.fetch_unit(request)).await
    }

    /// Sends a plain-text body and ignores whatever comes back.
    pub(crate) async fn send_text_unit(&self, method: Method, path: &str, body: &str) -> Result<(), GatewayError> {
        let request = self
            .request(method, path)?
            .header(CONTENT_TYPE, "text/plain")
            .body(body.to_string());
        self.cancellable(self.fetch_unit(request)).await
    }

    /// Body-less request whose response body is ignored.
    pub(crate) async fn send_unit(&self, method: Method, path: &str) -> Result<(), GatewayError> {
        let request = self.request(method, path)?;
        self.cancellable(self.fetch_unit(request)).await
    }

    /// Stores a profile picture in the picture bucket under a fresh
    /// `users/{uuid}/{file_name}` key and returns its public URL.
    ///
    /// Sent without a bearer token.
    pub async fn upload_profile_picture(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
        content_type: &str,
    ) -> Result<String, GatewayError> {
        let url = format!(
            "{}/users/{}/{}",
            self.picture_bucket.trim_end_matches('/'),
            Uuid::new_v4(),
            urlencoding::encode(file_name)
        );
        info!(url = %url, bytes = bytes.len(), "Uploading profile picture");
        let request = self
            .http
            .put(&url)
            .header(CONTENT_TYPE, content_type)
            .body(bytes);
        self.cancellable(Self::put_picture(request, url)).await
    }

    async fn put_picture(request: RequestBuilder, url: String) -> Result<String, GatewayError> {
        Self::send_checked(request).await?;
        Ok(url)
    }
}
