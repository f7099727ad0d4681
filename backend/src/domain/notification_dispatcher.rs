//! Fire-and-forget fanout of "new collection request" notifications.
//!
//! [`NotificationDispatcher`] sends one payload per configured
//! [`NotificationEndpoint`] on a detached task. Callers never wait for
//! delivery and never learn its outcome; every attempt is logged instead.
//! Attempts run under the trace identifier active when the record was
//! created, are bounded by a per-attempt timeout, and are tracked so the
//! server can drain them during shutdown.

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

use crate::domain::ports::{
    NotificationEndpoint, NotificationPayload, RecordCreatedNotifier,
};
use crate::domain::{CollectionRequest, TraceId};

/// Per-attempt delivery timeout used when none is configured.
pub const DEFAULT_NOTIFICATION_TIMEOUT: Duration = Duration::from_millis(5_000);

/// Upper bound on deliveries in flight used when none is configured.
pub const DEFAULT_MAX_PENDING_NOTIFICATIONS: usize = 64;

/// Spawns one delivery attempt per endpoint for each created record.
#[derive(Clone)]
pub struct NotificationDispatcher {
    endpoints: Vec<Arc<dyn NotificationEndpoint>>,
    tracker: TaskTracker,
    permits: Arc<Semaphore>,
    timeout: Duration,
    runtime: Option<Handle>,
}

impl NotificationDispatcher {
    /// Dispatcher over `endpoints`; an empty list disables notifications.
    #[must_use]
    pub fn new(endpoints: Vec<Arc<dyn NotificationEndpoint>>) -> Self {
        Self {
            endpoints,
            tracker: TaskTracker::new(),
            permits: Arc::new(Semaphore::new(DEFAULT_MAX_PENDING_NOTIFICATIONS)),
            timeout: DEFAULT_NOTIFICATION_TIMEOUT,
            runtime: None,
        }
    }

    /// Run deliveries on `runtime` instead of the caller's runtime.
    ///
    /// HTTP workers each own a runtime that stops with the worker, so the
    /// server pins deliveries to the main runtime to let them drain.
    #[must_use]
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Override the per-attempt timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the number of deliveries allowed in flight at once.
    ///
    /// Attempts beyond the cap are dropped with a warning. Values above
    /// [`Semaphore::MAX_PERMITS`] are clamped to it.
    #[must_use]
    pub fn with_max_pending(mut self, max_pending: usize) -> Self {
        self.permits = Arc::new(Semaphore::new(max_pending.min(Semaphore::MAX_PERMITS)));
        self
    }

    /// Number of configured endpoints.
    #[must_use]
    pub fn endpoint_count(&self) -> usize {
        self.endpoints.len()
    }

    /// Number of delivery attempts still running.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.tracker.len()
    }

    /// Start one detached delivery per endpoint for `record`.
    ///
    /// Returns immediately. Attempts are skipped with a warning when no
    /// runtime is available, after [`Self::shutdown`], or when the in-flight
    /// cap is reached.
    pub fn dispatch(&self, record: &CollectionRequest) {
        if self.endpoints.is_empty() {
            debug!(id = %record.id, "no notification endpoints configured");
            return;
        }
        if self.tracker.is_closed() {
            warn!(id = %record.id, "dispatcher shut down; notification skipped");
            return;
        }
        let Some(runtime) = self
            .runtime
            .clone()
            .or_else(|| Handle::try_current().ok())
        else {
            warn!(id = %record.id, "no async runtime; notification skipped");
            return;
        };

        for endpoint in &self.endpoints {
            let channel = endpoint.channel();
            let Ok(permit) = Arc::clone(&self.permits).try_acquire_owned() else {
                warn!(id = %record.id, %channel, "notification backlog full; attempt dropped");
                continue;
            };
            let attempt = deliver(
                Arc::clone(endpoint),
                NotificationPayload::new(channel, record.clone()),
                self.timeout,
                permit,
            );
            self.tracker
                .spawn_on(TraceId::propagate(attempt), &runtime);
        }
    }

    /// Stop accepting new attempts and wait up to `grace` for running ones.
    ///
    /// Returns `true` when every attempt finished within the grace period.
    pub async fn shutdown(&self, grace: Duration) -> bool {
        self.tracker.close();
        let pending = self.tracker.len();
        if tokio::time::timeout(grace, self.tracker.wait())
            .await
            .is_ok()
        {
            debug!(drained = pending, "notification dispatcher drained");
            true
        } else {
            warn!(
                pending = self.tracker.len(),
                grace_ms = grace.as_millis(),
                "notification attempts still running after grace period"
            );
            false
        }
    }
}

impl RecordCreatedNotifier for NotificationDispatcher {
    fn notify(&self, record: &CollectionRequest) {
        self.dispatch(record);
    }
}

async fn deliver(
    endpoint: Arc<dyn NotificationEndpoint>,
    payload: NotificationPayload,
    timeout: Duration,
    _permit: OwnedSemaphorePermit,
) {
    let channel = payload.channel;
    let id = payload.record.id;
    match tokio::time::timeout(timeout, endpoint.deliver(&payload)).await {
        Ok(Ok(())) => info!(%id, %channel, "notification delivered"),
        Ok(Err(error)) => warn!(%id, %channel, %error, "notification delivery failed"),
        Err(_) => warn!(
            %id,
            %channel,
            timeout_ms = timeout.as_millis(),
            "notification delivery timed out"
        ),
    }
}

#[cfg(test)]
mod tests {
    //! Delivery, isolation, and drain behaviour.
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::Utc;
    use rstest::{fixture, rstest};
    use tokio::sync::Notify;

    use super::*;
    use crate::domain::ports::{MockNotificationEndpoint, NotificationChannel, NotificationError};
    use crate::domain::{CollectionRequestDraft, CollectionRequestId};

    const GRACE: Duration = Duration::from_secs(5);

    #[fixture]
    fn record() -> CollectionRequest {
        CollectionRequest::create(
            CollectionRequestId::following(0),
            CollectionRequestDraft {
                nom: "Alice".to_owned(),
                telephone: "0600000000".to_owned(),
                ville: "Nancy".to_owned(),
                type_client: "particulier".to_owned(),
                creneau: "2024-06-15".to_owned(),
                canettes: 5,
            },
            Utc::now(),
        )
    }

    fn succeeding(channel: NotificationChannel, times: usize) -> Arc<dyn NotificationEndpoint> {
        let mut endpoint = MockNotificationEndpoint::new();
        endpoint.expect_channel().return_const(channel);
        endpoint
            .expect_deliver()
            .withf(move |payload| payload.channel == channel)
            .times(times)
            .returning(|_| Ok(()));
        Arc::new(endpoint)
    }

    /// Endpoint that parks every attempt until released.
    struct GatedEndpoint {
        calls: AtomicUsize,
        release: Notify,
    }

    impl GatedEndpoint {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                release: Notify::new(),
            }
        }
    }

    #[async_trait]
    impl NotificationEndpoint for GatedEndpoint {
        fn channel(&self) -> NotificationChannel {
            NotificationChannel::Email
        }

        async fn deliver(&self, _payload: &NotificationPayload) -> Result<(), NotificationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.release.notified().await;
            Ok(())
        }
    }

    /// Endpoint that remembers the trace identifier seen during delivery.
    #[derive(Default)]
    struct TraceCapturingEndpoint {
        seen: Mutex<Option<TraceId>>,
    }

    #[async_trait]
    impl NotificationEndpoint for TraceCapturingEndpoint {
        fn channel(&self) -> NotificationChannel {
            NotificationChannel::Whatsapp
        }

        async fn deliver(&self, _payload: &NotificationPayload) -> Result<(), NotificationError> {
            *self
                .seen
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner) = TraceId::current();
            Ok(())
        }
    }

    #[rstest]
    #[tokio::test]
    async fn delivers_once_per_endpoint(record: CollectionRequest) {
        let dispatcher = NotificationDispatcher::new(vec![
            succeeding(NotificationChannel::Email, 1),
            succeeding(NotificationChannel::Whatsapp, 1),
        ]);

        dispatcher.dispatch(&record);

        assert!(dispatcher.shutdown(GRACE).await);
        assert_eq!(dispatcher.pending(), 0);
    }

    #[rstest]
    #[tokio::test]
    async fn no_endpoints_is_a_no_op(record: CollectionRequest) {
        let dispatcher = NotificationDispatcher::new(Vec::new());
        dispatcher.dispatch(&record);
        assert_eq!(dispatcher.pending(), 0);
        assert_eq!(dispatcher.endpoint_count(), 0);
    }

    #[rstest]
    #[tokio::test]
    async fn one_failing_endpoint_does_not_block_the_other(record: CollectionRequest) {
        let mut failing = MockNotificationEndpoint::new();
        failing
            .expect_channel()
            .return_const(NotificationChannel::Email);
        failing
            .expect_deliver()
            .times(1)
            .returning(|_| Err(NotificationError::transport("connection refused")));
        let dispatcher = NotificationDispatcher::new(vec![
            Arc::new(failing),
            succeeding(NotificationChannel::Whatsapp, 1),
        ]);

        dispatcher.dispatch(&record);

        assert!(dispatcher.shutdown(GRACE).await);
    }

    #[rstest]
    #[tokio::test]
    async fn slow_endpoint_is_cut_off_by_timeout(record: CollectionRequest) {
        let gated = Arc::new(GatedEndpoint::new());
        let dispatcher = NotificationDispatcher::new(vec![gated.clone()])
            .with_timeout(Duration::from_millis(20));

        dispatcher.dispatch(&record);

        assert!(dispatcher.shutdown(GRACE).await);
        assert_eq!(gated.calls.load(Ordering::SeqCst), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn attempts_beyond_the_cap_are_dropped(record: CollectionRequest) {
        let gated = Arc::new(GatedEndpoint::new());
        let dispatcher = NotificationDispatcher::new(vec![gated.clone()]).with_max_pending(1);

        dispatcher.dispatch(&record);
        dispatcher.dispatch(&record);
        assert_eq!(dispatcher.pending(), 1);

        gated.release.notify_one();
        assert!(dispatcher.shutdown(GRACE).await);
        assert_eq!(gated.calls.load(Ordering::SeqCst), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn shutdown_reports_attempts_outliving_the_grace_period(record: CollectionRequest) {
        let gated = Arc::new(GatedEndpoint::new());
        let dispatcher = NotificationDispatcher::new(vec![gated.clone()])
            .with_timeout(Duration::from_secs(60));

        dispatcher.dispatch(&record);

        assert!(!dispatcher.shutdown(Duration::from_millis(20)).await);
        assert_eq!(dispatcher.pending(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn dispatch_after_shutdown_is_skipped(record: CollectionRequest) {
        let dispatcher = NotificationDispatcher::new(vec![succeeding(NotificationChannel::Email, 0)]);
        assert!(dispatcher.shutdown(GRACE).await);

        dispatcher.dispatch(&record);
        assert_eq!(dispatcher.pending(), 0);
    }

    #[rstest]
    #[tokio::test]
    async fn delivery_runs_under_the_creating_trace_id(record: CollectionRequest) {
        let endpoint = Arc::new(TraceCapturingEndpoint::default());
        let dispatcher = NotificationDispatcher::new(vec![endpoint.clone()]);
        let trace_id = TraceId::generate();

        TraceId::scope(trace_id, async { dispatcher.notify(&record) }).await;

        assert!(dispatcher.shutdown(GRACE).await);
        let seen = *endpoint
            .seen
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        assert_eq!(seen, Some(trace_id));
    }

    #[rstest]
    fn dispatch_without_runtime_is_skipped(record: CollectionRequest) {
        let dispatcher = NotificationDispatcher::new(vec![succeeding(NotificationChannel::Email, 0)]);
        dispatcher.dispatch(&record);
        assert_eq!(dispatcher.pending(), 0);
    }

    #[rstest]
    #[tokio::test]
    async fn oversized_cap_is_clamped(record: CollectionRequest) {
        let dispatcher = NotificationDispatcher::new(vec![succeeding(NotificationChannel::Email, 1)])
            .with_max_pending(usize::MAX);

        dispatcher.dispatch(&record);

        assert!(dispatcher.shutdown(GRACE).await);
    }

    #[rstest]
    fn pinned_runtime_delivers_from_outside_any_runtime(record: CollectionRequest) {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .expect("build runtime");
        let dispatcher = NotificationDispatcher::new(vec![succeeding(NotificationChannel::Email, 1)])
            .with_runtime(runtime.handle().clone());

        dispatcher.dispatch(&record);

        assert!(runtime.block_on(dispatcher.shutdown(GRACE)));
    }
}
