#[cfg(not(target_arch = "wasm32"))]
mod native {
    extern crate dailygrind;

    use std::sync::Arc;

    use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
    use dailygrind::config::RelayConfig;
    use dailygrind::core::errors::RelayError;
    use dailygrind::relay::{self, PushDelivery, VapidDelivery};
    use tokio_util::sync::CancellationToken;
    use tracing::{error, info};
    use tracing_subscriber::EnvFilter;

    mod adapter {
        use actix_web::HttpRequest;
        use spin_sdk::http::{Method, Request};

        pub fn actix_to_spin_request(
            req: &HttpRequest,
            body: actix_web::web::Bytes,
        ) -> anyhow::Result<Request> {
            let method = match req.method().as_str() {
                "GET" => Method::Get,
                "POST" => Method::Post,
                "PUT" => Method::Put,
                "DELETE" => Method::Delete,
                "HEAD" => Method::Head,
                "OPTIONS" => Method::Options,
                "PATCH" => Method::Patch,
                other => anyhow::bail!("Unsupported method {other}"),
            };

            let mut builder = Request::builder();
            builder.method(method).uri(req.uri().to_string());
            for (name, value) in req.headers() {
                if let Ok(value) = value.to_str() {
                    builder.header(name.as_str(), value);
                }
            }
            Ok(builder.body(body.to_vec()).build())
        }

        pub fn spin_to_actix_response(spin_resp: spin_sdk::http::Response) -> actix_web::HttpResponse {
            let status = actix_web::http::StatusCode::from_u16(*spin_resp.status())
                .unwrap_or(actix_web::http::StatusCode::INTERNAL_SERVER_ERROR);

            actix_web::HttpResponse::build(status)
                .content_type("application/json")
                .body(spin_resp.body().to_vec())
        }
    }

    struct Relay {
        config: RelayConfig,
        http: reqwest::Client,
        delivery: Arc<dyn PushDelivery>,
    }

    pub async fn run() -> std::io::Result<()> {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .init();

        let config = RelayConfig::load();
        let delivery = VapidDelivery::new(&config).map_err(std::io::Error::other)?;
        let state = web::Data::new(Relay {
            config: config.clone(),
            http: reqwest::Client::new(),
            delivery: Arc::new(delivery),
        });

        let shutdown = CancellationToken::new();
        let schedule = tokio::spawn(relay::run_daily(
            config.clone(),
            state.http.clone(),
            shutdown.clone(),
        ));

        info!(bind = %config.bind, "Relay listening");
        let served = HttpServer::new(move || {
            App::new()
                .app_data(state.clone())
                .default_service(web::route().to(handle_all))
        })
        .bind(config.bind.as_str())?
        .run()
        .await;

        shutdown.cancel();
        if let Err(err) = schedule.await {
            error!(error = %err, "Reminder schedule task failed");
        }
        served
    }

    async fn handle_all(req: HttpRequest, body: web::Bytes, state: web::Data<Relay>) -> HttpResponse {
        let spin_req = match adapter::actix_to_spin_request(&req, body) {
            Ok(r) => r,
            Err(err) => {
                return adapter::spin_to_actix_response(RelayError::BadRequest(err.to_string()).into())
            }
        };

        let response = match (req.method().as_str(), req.path()) {
            ("POST", "/relay/send") => relay::handle_send(&spin_req, state.delivery.as_ref()).await,
            ("POST", "/relay/schedule") => relay::trigger_daily(&state.config, &state.http).await,
            _ => RelayError::NotFound("No route found".to_string()).into(),
        };
        adapter::spin_to_actix_response(response)
    }
}

#[cfg(not(target_arch = "wasm32"))]
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    native::run().await
}

#[cfg(target_arch = "wasm32")]
fn main() {}
