//! Access logging and request timing.
//!
//! Runs first on the way in and last on the way out. Pre-logic stores a
//! [`RequestTiming`] in the attribute bag; post-logic measures from that
//! stored `Instant` and emits one completion record per request, whether the
//! request succeeded, was short-circuited, failed or was cancelled.

use std::time::Instant;

use async_trait::async_trait;
use axum::http::{Method, StatusCode};

use crate::config::FilterKind;
use crate::error::GatewayError;
use crate::filter::{Filter, FilterResult, Next};
use crate::http::request::GatewayRequest;
use crate::routing::MatchedRoute;

/// Monotonic start of a request, stored by [`LoggingFilter`].
#[derive(Debug, Clone, Copy)]
pub struct RequestTiming {
    pub start: Instant,
}

pub struct LoggingFilter {
    priority: i32,
}

impl LoggingFilter {
    pub fn new() -> Self {
        Self::with_priority(FilterKind::Logging.default_priority())
    }

    pub fn with_priority(priority: i32) -> Self {
        Self { priority }
    }
}

impl Default for LoggingFilter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Filter for LoggingFilter {
    fn name(&self) -> &str {
        FilterKind::Logging.as_str()
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    async fn filter(&self, request: &mut GatewayRequest, next: Next<'_>) -> FilterResult {
        let timing = RequestTiming {
            start: Instant::now(),
        };
        request.attributes.insert(timing);

        let remote = request
            .remote_addr
            .map(|addr| addr.to_string())
            .unwrap_or_else(|| "-".to_string());
        tracing::info!(
            method = %request.method,
            path = %request.path(),
            remote = %remote,
            "Incoming request"
        );

        let record = AccessRecord {
            method: request.method.clone(),
            path: request.path().to_string(),
            start: timing.start,
            finished: false,
        };

        let result = next.run(request).await;

        let start = request
            .attributes
            .get::<RequestTiming>()
            .map(|t| t.start)
            .unwrap_or(timing.start);
        let route = request.attributes.get::<MatchedRoute>().map(|r| r.0.as_str());
        match &result {
            Ok(response) => record.complete(start, response.status, route, None),
            Err(e) => record.complete(start, e.status(), route, Some(e)),
        }

        result
    }
}

/// Emits the completion record, or a cancellation record if the request
/// future is dropped before it completes.
struct AccessRecord {
    method: Method,
    path: String,
    start: Instant,
    finished: bool,
}

impl AccessRecord {
    fn complete(
        mut self,
        start: Instant,
        status: StatusCode,
        route: Option<&str>,
        error: Option<&GatewayError>,
    ) {
        self.finished = true;
        let elapsed_ms = start.elapsed().as_millis() as u64;
        let route = route.unwrap_or("-");

        match error {
            None => tracing::info!(
                method = %self.method,
                path = %self.path,
                route,
                status = status.as_u16(),
                elapsed_ms,
                outcome = "completed",
                "Request completed"
            ),
            Some(e) => tracing::warn!(
                method = %self.method,
                path = %self.path,
                route,
                status = status.as_u16(),
                elapsed_ms,
                outcome = "failed",
                error_kind = e.kind(),
                error = %e,
                "Request failed"
            ),
        }
    }
}

impl Drop for AccessRecord {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        tracing::info!(
            method = %self.method,
            path = %self.path,
            elapsed_ms = self.start.elapsed().as_millis() as u64,
            outcome = "cancelled",
            "Request cancelled before completion"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterChain;
    use crate::http::response::{Envelope, GatewayResponse};
    use crate::resilience::timeouts::with_deadline;
    use crate::routing::Dispatch;
    use axum::http::HeaderMap;
    use std::collections::HashMap;
    use std::fmt;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tracing::field::{Field, Visit};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    /// Captures every event's fields.
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<HashMap<String, String>>>>);

    impl Captured {
        fn completions(&self) -> Vec<HashMap<String, String>> {
            self.0
                .lock()
                .unwrap()
                .iter()
                .filter(|fields| fields.contains_key("outcome"))
                .cloned()
                .collect()
        }
    }

    #[derive(Default)]
    struct FieldMap(HashMap<String, String>);

    impl Visit for FieldMap {
        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            self.0.insert(field.name().to_string(), format!("{:?}", value));
        }

        fn record_str(&mut self, field: &Field, value: &str) {
            self.0.insert(field.name().to_string(), value.to_string());
        }
    }

    impl<S: tracing::Subscriber> Layer<S> for Captured {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            let mut fields = FieldMap::default();
            event.record(&mut fields);
            self.0.lock().unwrap().push(fields.0);
        }
    }

    fn capture() -> (Captured, tracing::subscriber::DefaultGuard) {
        let captured = Captured::default();
        let subscriber = tracing_subscriber::registry().with(captured.clone());
        let guard = tracing::subscriber::set_default(subscriber);
        (captured, guard)
    }

    enum Behaviour {
        Ok,
        Timeout,
        Hang,
        /// Hangs behind a 300ms deadline.
        Deadline,
    }

    struct StubDispatcher {
        behaviour: Behaviour,
        calls: AtomicUsize,
    }

    impl StubDispatcher {
        fn new(behaviour: Behaviour) -> Arc<Self> {
            Arc::new(Self {
                behaviour,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl Dispatch for StubDispatcher {
        async fn dispatch(&self, request: &mut GatewayRequest) -> FilterResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            request.attributes.insert(MatchedRoute("stub".into()));
            match self.behaviour {
                Behaviour::Ok => {
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    Ok(GatewayResponse::new(StatusCode::OK, HeaderMap::new(), "ok"))
                }
                Behaviour::Timeout => Err(GatewayError::UpstreamTimeout {
                    target: "stub:1".into(),
                    timeout: Duration::from_millis(5),
                }),
                Behaviour::Hang => {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Ok(GatewayResponse::new(StatusCode::OK, HeaderMap::new(), "late"))
                }
                Behaviour::Deadline => {
                    let deadline = Duration::from_millis(300);
                    with_deadline(deadline, tokio::time::sleep(Duration::from_secs(30)))
                        .await
                        .map_err(|e| GatewayError::UpstreamTimeout {
                            target: "stub:1".into(),
                            timeout: e.deadline,
                        })?;
                    Ok(GatewayResponse::new(StatusCode::OK, HeaderMap::new(), "late"))
                }
            }
        }
    }

    struct Deny;

    #[async_trait]
    impl Filter for Deny {
        fn name(&self) -> &str {
            "deny"
        }

        fn priority(&self) -> i32 {
            100
        }

        async fn filter(&self, _request: &mut GatewayRequest, _next: Next<'_>) -> FilterResult {
            let envelope = Envelope::<()>::unauthorized("token required");
            Ok(GatewayResponse::from_envelope(StatusCode::UNAUTHORIZED, &envelope))
        }
    }

    fn request(path: &str) -> GatewayRequest {
        GatewayRequest::new(Method::GET, path.parse().unwrap())
    }

    #[tokio::test]
    async fn test_one_record_on_success() {
        let (captured, _guard) = capture();
        let chain = FilterChain::new(
            vec![Arc::new(LoggingFilter::new())],
            StubDispatcher::new(Behaviour::Ok),
        );

        let wall = Instant::now();
        let mut req = request("/api/user/info");
        chain.execute(&mut req).await.unwrap();
        let wall_ms = wall.elapsed().as_millis() as u64;

        let records = captured.completions();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record["outcome"], "completed");
        assert_eq!(record["status"], "200");
        assert_eq!(record["path"], "/api/user/info");
        assert_eq!(record["route"], "stub");
        let elapsed: u64 = record["elapsed_ms"].parse().unwrap();
        assert!(elapsed <= wall_ms, "{} > {}", elapsed, wall_ms);
        assert!(req.attributes.get::<RequestTiming>().is_some());
    }

    #[tokio::test]
    async fn test_one_record_on_failure() {
        let (captured, _guard) = capture();
        let chain = FilterChain::new(
            vec![Arc::new(LoggingFilter::new())],
            StubDispatcher::new(Behaviour::Timeout),
        );

        let err = chain.execute(&mut request("/slow")).await.unwrap_err();
        assert!(matches!(err, GatewayError::UpstreamTimeout { .. }));

        let records = captured.completions();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["outcome"], "failed");
        assert_eq!(records[0]["status"], "504");
        assert_eq!(records[0]["error_kind"], "upstream_timeout");
    }

    #[tokio::test]
    async fn test_timeout_record_spans_the_deadline() {
        let (captured, _guard) = capture();
        let chain = FilterChain::new(
            vec![Arc::new(LoggingFilter::new())],
            StubDispatcher::new(Behaviour::Deadline),
        );

        let err = chain.execute(&mut request("/slow")).await.unwrap_err();
        assert!(matches!(err, GatewayError::UpstreamTimeout { .. }));

        let records = captured.completions();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["outcome"], "failed");
        assert_eq!(records[0]["status"], "504");
        let elapsed: u64 = records[0]["elapsed_ms"].parse().unwrap();
        assert!(elapsed >= 300, "elapsed {}ms", elapsed);
        assert!(elapsed < 2000, "elapsed {}ms", elapsed);
    }

    #[tokio::test]
    async fn test_one_record_on_short_circuit() {
        let (captured, _guard) = capture();
        let dispatcher = StubDispatcher::new(Behaviour::Ok);
        let chain = FilterChain::new(
            vec![Arc::new(Deny), Arc::new(LoggingFilter::new())],
            dispatcher.clone(),
        );

        let response = chain.execute(&mut request("/api/auth/login")).await.unwrap();

        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(dispatcher.calls.load(Ordering::SeqCst), 0);
        let records = captured.completions();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["status"], "401");
        assert_eq!(records[0]["route"], "-");
    }

    #[tokio::test]
    async fn test_one_record_on_cancellation() {
        let (captured, _guard) = capture();
        let chain = FilterChain::new(
            vec![Arc::new(LoggingFilter::new())],
            StubDispatcher::new(Behaviour::Hang),
        );

        let mut req = request("/hang");
        let abandoned =
            tokio::time::timeout(Duration::from_millis(50), chain.execute(&mut req)).await;
        assert!(abandoned.is_err());

        let records = captured.completions();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["outcome"], "cancelled");
    }

    #[tokio::test]
    async fn test_concurrent_requests_do_not_share_state() {
        let (captured, _guard) = capture();
        let chain = Arc::new(FilterChain::new(
            vec![Arc::new(LoggingFilter::new())],
            StubDispatcher::new(Behaviour::Ok),
        ));

        let mut handles = Vec::new();
        for i in 0..20 {
            let chain = chain.clone();
            handles.push(tokio::spawn(async move {
                let mut req = request(&format!("/items/{}", i));
                chain.execute(&mut req).await.map(|r| r.status)
            }));
        }
        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), StatusCode::OK);
        }

        let mut paths: Vec<String> = captured
            .completions()
            .into_iter()
            .map(|r| r["path"].clone())
            .collect();
        paths.sort();
        let mut expected: Vec<String> = (0..20).map(|i| format!("/items/{}", i)).collect();
        expected.sort();
        assert_eq!(paths, expected);
    }
}
