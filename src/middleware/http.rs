//! HTTP-level middleware (cross-cutting concerns).
//!
//! Responsibility:
//! - Request-Id generation + propagation (x-request-id), echoed as the function
//!   invocation id together with the function version
//! - Access log line per request
//! - Request tracing (TraceLayer)
//! - Body size limit and global timeout
//! - Gateway boundary: timeouts, layer errors and handler panics become 504
//!
//! In production the 504 body carries a generic message; in development it
//! carries the underlying error or panic text.

use std::any::Any;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::Router;
use axum::body::Body;
use axum::error_handling::HandleErrorLayer;
use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderMap, HeaderName, HeaderValue, Request, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use tower::timeout::TimeoutLayer;
use tower::{BoxError, ServiceBuilder};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::api::extractors::Identity;
use crate::config::Config;
use crate::error::MessageBody;

const REQUEST_ID: &str = "x-request-id";
const INVOCATION_ID: &str = "x-function-invocationid";
const FUNCTION_VERSION: &str = "x-function-version";

#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub service_name: Arc<str>,
    pub request_timeout: Duration,
    pub expose_errors: bool,
}

impl From<&Config> for HttpSettings {
    fn from(config: &Config) -> Self {
        Self {
            service_name: Arc::from(config.service_name.as_str()),
            request_timeout: config.request_timeout,
            expose_errors: !config.app_env.is_production(),
        }
    }
}

/// Apply HTTP-level middleware to the given Router.
pub fn apply(router: Router, settings: HttpSettings) -> Router {
    let request_id_header = HeaderName::from_static(REQUEST_ID);
    let expose_errors = settings.expose_errors;

    let layers = ServiceBuilder::new()
        .layer(SetRequestIdLayer::new(
            request_id_header.clone(),
            MakeRequestUuid,
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header))
        .layer(middleware::from_fn(function_headers))
        .layer(middleware::from_fn_with_state(settings.clone(), access_log))
        .layer(TraceLayer::new_for_http())
        // Make the service error `Infallible` by converting errors into responses.
        .layer(HandleErrorLayer::new(move |err: BoxError| async move {
            gateway_error(err, expose_errors)
        }))
        .layer(TimeoutLayer::new(settings.request_timeout))
        .layer(CatchPanicLayer::custom(move |panic| {
            panic_response(panic, expose_errors)
        }))
        .layer(RequestBodyLimitLayer::new(1024 * 1024));

    router.layer(layers)
}

fn gateway_error(err: BoxError, expose_errors: bool) -> Response {
    let message = if err.is::<tower::timeout::error::Elapsed>() {
        "request timed out".to_string()
    } else {
        tracing::error!(error = %err, "unhandled error at gateway boundary");
        if expose_errors {
            err.to_string()
        } else {
            "internal error".to_string()
        }
    };
    (StatusCode::GATEWAY_TIMEOUT, MessageBody::new(message)).into_response()
}

fn panic_response(panic: Box<dyn Any + Send + 'static>, expose_errors: bool) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!(panic = %detail, "handler panicked");

    let message = if expose_errors {
        detail
    } else {
        "internal error".to_string()
    };
    (StatusCode::GATEWAY_TIMEOUT, MessageBody::new(message)).into_response()
}

async fn function_headers(req: Request<Body>, next: Next) -> Response {
    let invocation_id = req.headers().get(REQUEST_ID).cloned();

    let mut response = next.run(req).await;
    let headers = response.headers_mut();
    if let Some(id) = invocation_id {
        headers.insert(INVOCATION_ID, id);
    }
    headers.insert(
        FUNCTION_VERSION,
        HeaderValue::from_static(env!("CARGO_PKG_VERSION")),
    );
    response
}

async fn access_log(
    State(settings): State<HttpSettings>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let start = Instant::now();

    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string());
    let addr = forwarded_for(req.headers())
        .or(peer)
        .unwrap_or_else(|| "-".to_string());
    let method = req.method().clone();
    let scheme = header_str(req.headers(), "x-forwarded-proto")
        .or(req.uri().scheme_str())
        .unwrap_or("http")
        .to_string();
    let url = req.uri().to_string();
    let query = req.uri().query().unwrap_or("-").to_string();
    let referrer = header_str(req.headers(), header::REFERER.as_str())
        .unwrap_or("-")
        .to_string();
    let user_agent = header_str(req.headers(), header::USER_AGENT.as_str())
        .unwrap_or("-")
        .to_string();

    let response = next.run(req).await;

    let user = response
        .extensions()
        .get::<Identity>()
        .map(|i| i.display_name().to_string())
        .unwrap_or_else(|| "-".to_string());
    let response_time_ms = start.elapsed().as_secs_f64() * 1000.0;

    tracing::info!(
        role = %settings.service_name,
        addr = %addr,
        user = %user,
        method = %method,
        scheme = %scheme,
        url = %url,
        query_string = %query,
        referrer = %referrer,
        user_agent = %user_agent,
        response_time_ms = %format!("{response_time_ms:.3}"),
        status = response.status().as_u16(),
        "request completed"
    );

    response
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn forwarded_for(headers: &HeaderMap) -> Option<String> {
    header_str(headers, "x-forwarded-for")
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
