use std::collections::HashMap;
use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::extract::rejection::BytesRejection;
use axum::extract::{RawQuery, State};
use axum::http::{HeaderName, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::advisor::Advisor;
use crate::config::HEALTH_PATH;
use crate::event::{InboundRequest, OutboundResponse};

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    endpoints: Vec<String>,
}

/// Mounts every advisor on its own route, plus the health route.
pub fn router(advisors: Vec<Advisor>) -> Router {
    let names: Arc<Vec<String>> = Arc::new(
        advisors
            .iter()
            .map(|advisor| advisor.profile().name.clone())
            .collect(),
    );

    let mut router = Router::new().route(
        HEALTH_PATH,
        get(move || handle_health(names.clone())),
    );
    for advisor in advisors {
        let path = advisor.profile().path.clone();
        router = router.route(&path, any(handle_invocation).with_state(Arc::new(advisor)));
    }
    router.layer(TraceLayer::new_for_http())
}

async fn handle_health(names: Arc<Vec<String>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: env!("CARGO_PKG_NAME"),
        endpoints: names.as_ref().clone(),
    })
}

// An unreadable body counts as absent, so every request ends in the CORS envelope.
#[axum_macros::debug_handler]
async fn handle_invocation(
    State(advisor): State<Arc<Advisor>>,
    method: Method,
    RawQuery(query): RawQuery,
    body: Result<Bytes, BytesRejection>,
) -> OutboundResponse {
    let body = body.unwrap_or_else(|rejection| {
        warn!("Ignoring unreadable request body: {}", rejection);
        Bytes::new()
    });
    let request = inbound_request(method, query, body);
    advisor.handle(&request).await
}

pub(crate) fn inbound_request(method: Method, query: Option<String>, body: Bytes) -> InboundRequest {
    let query_params = query.map(|query| {
        url::form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect::<HashMap<String, String>>()
    });
    let body = if body.is_empty() {
        None
    } else {
        Some(String::from_utf8_lossy(&body).into_owned())
    };
    InboundRequest {
        method: method.as_str().to_string(),
        query_params,
        body,
    }
}

impl IntoResponse for OutboundResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code).unwrap_or_else(|_| {
            warn!("Invalid status code {}, sending 500", self.status_code);
            StatusCode::INTERNAL_SERVER_ERROR
        });
        let mut res = Response::new(Body::from(self.body));
        *res.status_mut() = status;
        for (name, value) in &self.headers {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    res.headers_mut().insert(name, value);
                }
                _ => warn!("Dropping invalid response header {}", name),
            }
        }
        res
    }
}
