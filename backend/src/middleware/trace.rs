//! Request correlation for the roster routes.
//!
//! Every request runs with a [`TraceId`] in task-local scope. A well-formed
//! `trace-id` sent by the caller (for example a reverse proxy) is reused;
//! anything else is replaced with a fresh UUID. The identifier is echoed on
//! the response, captured by domain errors and carried onto the blocking
//! pool by the delivery workflow. One log line per request records the
//! matched route rather than the raw path, so user ids in
//! `/users/generate/{id}` stay out of the access log.

use std::task::{Context, Poll};
use std::time::Instant;

use actix_web::Error;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{HeaderName, HeaderValue};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::{debug, info, warn};

use crate::domain::{TRACE_ID_HEADER, TraceId};

/// Route prefix whose completions are logged at debug level.
const HEALTH_PREFIX: &str = "/health/";

/// Middleware scoping each request to a [`TraceId`].
///
/// Handlers read it with [`TraceId::current`].
///
/// # Examples
/// ```
/// use actix_web::App;
/// use roster::Trace;
///
/// let app = App::new().wrap(Trace);
/// ```
#[derive(Clone)]
pub struct Trace;

impl<S, B> Transform<S, ServiceRequest> for Trace
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = TraceMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(TraceMiddleware { service }))
    }
}

/// Service wrapper produced by [`Trace`].
pub struct TraceMiddleware<S> {
    service: S,
}

/// Caller-supplied identifier, if it parses as a UUID.
fn forwarded_trace_id(req: &ServiceRequest) -> Option<TraceId> {
    req.headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
}

fn log_completion<B>(res: &ServiceResponse<B>, trace_id: TraceId, started: Instant) {
    let request = res.request();
    let route = request
        .match_pattern()
        .unwrap_or_else(|| String::from("<unmatched>"));
    let method = request.method();
    let status = res.status().as_u16();
    let elapsed_ms = started.elapsed().as_millis();
    if res.status().is_server_error() {
        warn!(%trace_id, %method, %route, status, elapsed_ms, "roster request failed");
    } else if route.starts_with(HEALTH_PREFIX) {
        debug!(%trace_id, %method, %route, status, elapsed_ms, "health check answered");
    } else {
        info!(%trace_id, %method, %route, status, elapsed_ms, "roster request completed");
    }
}

fn echo_trace_id<B>(res: &mut ServiceResponse<B>, trace_id: TraceId) {
    // A hyphenated UUID is always a valid header value.
    if let Ok(value) = HeaderValue::from_str(&trace_id.to_string()) {
        res.headers_mut()
            .insert(HeaderName::from_static(TRACE_ID_HEADER), value);
    }
}

impl<S, B> Service<ServiceRequest> for TraceMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let started = Instant::now();
        let trace_id = forwarded_trace_id(&req).unwrap_or_else(TraceId::generate);
        // Extractors run inside `call`, so the scope must already be active.
        let inner = TraceId::sync_scope(Some(trace_id), || self.service.call(req));
        Box::pin(TraceId::scope(trace_id, async move {
            let mut res = inner.await?;
            log_completion(&res, trace_id, started);
            echo_trace_id(&mut res, trace_id);
            Ok(res)
        }))
    }
}
