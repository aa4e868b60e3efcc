//! # HTTP Boundary
//!
//! Maps the [`UnicornService`] operations onto a small JSON API:
//!
//! - `GET /unicorns?amount=N` places a new order, polls it once and
//!   returns the order ID in the response body and header.
//! - `GET /unicorns` with the order-ID header polls an existing order.
//!
//! The allocation engine owns no wire format; everything here is
//! presentation.

use crate::model::{OrderId, Unicorn};
use crate::service::{ServiceError, UnicornService};
use axum::extract::{Query, Request, State};
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// HTTP boundary configuration.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Header carrying the order ID on requests and responses.
    pub order_id_header: HeaderName,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            order_id_header: HeaderName::from_static("x-unicorn-order-id"),
        }
    }
}

/// Response body for order placement and polling.
#[derive(Debug, Serialize, Deserialize)]
pub struct UnicornsResponse {
    /// Unicorns left to deliver for this order.
    pub pending: usize,
    #[serde(rename = "orderId", skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub unicorns: Vec<Unicorn>,
}

/// Error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Deserialize)]
struct OrderQuery {
    amount: Option<i64>,
}

#[derive(Clone)]
struct AppState {
    service: Arc<dyn UnicornService>,
    order_id_header: HeaderName,
}

/// Builds the unicorn API router.
pub fn router(service: Arc<dyn UnicornService>, config: HttpConfig) -> Router {
    let state = AppState {
        service,
        order_id_header: config.order_id_header,
    };

    Router::new()
        .route("/unicorns", get(get_unicorns))
        .layer(middleware::from_fn(log_requests))
        .with_state(state)
}

async fn get_unicorns(
    State(state): State<AppState>,
    Query(query): Query<OrderQuery>,
    headers: HeaderMap,
) -> Response {
    let order_id = headers
        .get(&state.order_id_header)
        .and_then(|value| value.to_str().ok())
        .map(OrderId::from);

    match order_id {
        Some(id) => poll_order(state, id).await,
        None => new_order(state, query).await,
    }
}

async fn new_order(state: AppState, query: OrderQuery) -> Response {
    let Some(amount) = query.amount else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "no unicorn amount provided for the order",
        );
    };

    let id = match state.service.order_unicorns(amount).await {
        Ok(id) => id,
        Err(err @ ServiceError::InvalidAmount(_)) => {
            return error_response(StatusCode::BAD_REQUEST, err.to_string())
        }
        Err(err) => {
            return error_response(StatusCode::SERVICE_UNAVAILABLE, err.to_string())
        }
    };

    order_response(&state, id).await
}

async fn poll_order(state: AppState, id: OrderId) -> Response {
    order_response(&state, id).await
}

/// Polls the order once and replies with whatever is ready.
async fn order_response(state: &AppState, id: OrderId) -> Response {
    let unicorns = match state.service.pool(&id).await {
        Ok(unicorns) => unicorns,
        Err(ServiceError::OrderNotFound(_)) => {
            return error_response(StatusCode::NOT_FOUND, "could not find your order id")
        }
        Err(err) => return error_response(StatusCode::SERVICE_UNAVAILABLE, err.to_string()),
    };

    // The entry vanishes once the order is fulfilled; nothing is pending
    // in that case.
    let pending = state.service.pending_unicorns(&id).await.unwrap_or(0);

    let body = UnicornsResponse {
        pending,
        order_id: Some(id.to_string()),
        unicorns,
    };

    let mut response = (StatusCode::OK, Json(body)).into_response();
    if let Ok(value) = HeaderValue::from_str(id.as_str()) {
        response
            .headers_mut()
            .insert(state.order_id_header.clone(), value);
    }
    response
}

fn error_response(code: StatusCode, message: impl Into<String>) -> Response {
    (
        code,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

/// Request log middleware: method, path, status and latency.
async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let start = Instant::now();

    let response = next.run(request).await;

    info!(
        %method,
        path,
        status = response.status().as_u16(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "request served"
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_body_omits_empty_fields() {
        let body = UnicornsResponse {
            pending: 2,
            order_id: None,
            unicorns: vec![],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json, serde_json::json!({ "pending": 2 }));
    }

    #[test]
    fn response_body_round_trips() {
        let body = UnicornsResponse {
            pending: 0,
            order_id: Some("abc123".to_string()),
            unicorns: vec![Unicorn {
                name: "dreamy-nimbus".to_string(),
                capabilities: vec!["flying".to_string()],
            }],
        };

        let json = serde_json::to_string(&body).unwrap();
        let parsed: UnicornsResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.order_id.as_deref(), Some("abc123"));
        assert_eq!(parsed.unicorns.len(), 1);
    }
}
