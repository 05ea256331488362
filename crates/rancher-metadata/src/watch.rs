//! Waiting for a service to reach its declared scale.
//!
//! The watcher polls the container list of a service and reports every
//! container that was not present in the previous poll, until the number of
//! containers reaches the service's scale.

use crate::client::MetadataClient;
use crate::models::{Container, ServiceContainers};
use crate::Result;
use async_trait::async_trait;
use rancher_metadata_core::ServiceRef;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info};

/// Capability to suspend between polls.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Suspend for the given duration.
    async fn sleep(&self, duration: Duration);
}

/// [`Sleeper`] backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Phase of a watch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    /// Still waiting for containers
    Polling,
    /// Enough containers observed
    Done,
}

/// Membership tracked across polls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvergenceState {
    target_scale: i64,
    observed_names: HashSet<String>,
}

impl ConvergenceState {
    /// Start tracking with nothing observed.
    #[must_use]
    pub fn new(target_scale: i64) -> Self {
        Self {
            target_scale,
            observed_names: HashSet::new(),
        }
    }

    /// Declared scale being waited for.
    #[must_use]
    pub const fn target_scale(&self) -> i64 {
        self.target_scale
    }

    /// Number of containers seen in the latest poll.
    #[must_use]
    pub fn observed(&self) -> usize {
        self.observed_names.len()
    }

    /// Record a poll and return the containers absent from the previous one.
    ///
    /// Newcomers are returned in service order. The observed set is replaced
    /// by the current names.
    pub fn observe<'a>(&mut self, current: &'a ServiceContainers) -> Vec<&'a Container> {
        let newcomers = current
            .iter()
            .filter(|container| !self.observed_names.contains(&container.name))
            .collect();

        self.observed_names = current.names().map(str::to_string).collect();
        newcomers
    }

    /// Phase implied by the latest poll.
    #[must_use]
    pub fn state(&self) -> WatchState {
        let observed = i64::try_from(self.observed_names.len()).unwrap_or(i64::MAX);
        if observed >= self.target_scale {
            WatchState::Done
        } else {
            WatchState::Polling
        }
    }
}

/// Summary of a finished watch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchOutcome {
    /// Scale the service declared when the watch started
    pub target_scale: i64,
    /// Containers present in the final poll
    pub observed: usize,
    /// Number of container polls performed
    pub polls: usize,
}

impl MetadataClient {
    /// Wait until a service has as many containers as its declared scale.
    ///
    /// `on_container` is called once for every container name that was not
    /// present in the previous poll, in the order the service lists them.
    /// Polls are separated by the configured poll interval. There is no
    /// iteration limit; drop the future to stop early.
    ///
    /// # Errors
    ///
    /// Any query failure aborts the watch. Containers already reported stay
    /// reported.
    pub async fn wait_service_containers<F>(
        &self,
        service: &ServiceRef,
        mut on_container: F,
    ) -> Result<WatchOutcome>
    where
        F: FnMut(&str, &Container),
    {
        let target_scale = self.get_service_scale_size(service).await?;
        let mut convergence = ConvergenceState::new(target_scale);
        let mut polls = 0usize;

        loop {
            let current = self.get_service_containers(service).await?;
            polls += 1;

            for container in convergence.observe(&current) {
                info!(container = %container.name, "container joined service");
                on_container(&container.name, container);
            }

            debug!(
                observed = convergence.observed(),
                target_scale, polls, "polled service containers"
            );

            if convergence.state() == WatchState::Done {
                break;
            }

            self.sleeper().sleep(self.poll_interval()).await;
        }

        info!(target_scale, polls, "service reached its scale");

        Ok(WatchOutcome {
            target_scale,
            observed: convergence.observed(),
            polls,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{MockTransport, TransportResponse};
    use mockall::Sequence;
    use rancher_metadata_core::{Error, MetadataClientConfig};
    use serde_json::json;
    use std::sync::Arc;

    fn containers_body(names: &[&str]) -> String {
        let records: Vec<_> = names
            .iter()
            .map(|name| json!({"name": name, "create_index": "1"}))
            .collect();
        serde_json::Value::Array(records).to_string()
    }

    fn client(transport: MockTransport, sleeper: MockSleeper) -> MetadataClient {
        let config = MetadataClientConfig::new("http://metadata/2015-12-19")
            .unwrap()
            .with_max_attempts(1);

        MetadataClient::builder(config)
            .with_transport(Arc::new(transport))
            .with_sleeper(Arc::new(sleeper))
            .build()
            .unwrap()
    }

    fn expect_scale(transport: &mut MockTransport, seq: &mut Sequence, body: &'static str) {
        transport
            .expect_get()
            .withf(|request| request.url.ends_with("/self/service/scale"))
            .times(1)
            .in_sequence(seq)
            .returning(move |_| Ok(TransportResponse::new(200, body)));
    }

    fn expect_containers(transport: &mut MockTransport, seq: &mut Sequence, names: &[&str]) {
        let body = containers_body(names);
        transport
            .expect_get()
            .withf(|request| request.url.ends_with("/self/service/containers"))
            .times(1)
            .in_sequence(seq)
            .returning(move |_| Ok(TransportResponse::new(200, body.clone())));
    }

    #[test]
    fn state_reports_newcomers_once() {
        let mut state = ConvergenceState::new(2);
        let first = ServiceContainers::from_records(vec![
            serde_json::from_value(json!({"name": "a"})).unwrap(),
        ]);
        let second = ServiceContainers::from_records(vec![
            serde_json::from_value(json!({"name": "b"})).unwrap(),
            serde_json::from_value(json!({"name": "a"})).unwrap(),
        ]);

        let names: Vec<_> = state.observe(&first).iter().map(|c| c.name.clone()).collect();
        assert_eq!(names, vec!["a"]);
        assert_eq!(state.state(), WatchState::Polling);

        let names: Vec<_> = state.observe(&second).iter().map(|c| c.name.clone()).collect();
        assert_eq!(names, vec!["b"]);
        assert_eq!(state.state(), WatchState::Done);
    }

    #[test]
    fn zero_scale_is_done_immediately() {
        let mut state = ConvergenceState::new(0);
        assert!(state.observe(&ServiceContainers::default()).is_empty());
        assert_eq!(state.state(), WatchState::Done);
    }

    #[tokio::test]
    async fn emits_each_new_container_until_scale_reached() {
        let mut seq = Sequence::new();
        let mut transport = MockTransport::new();
        expect_scale(&mut transport, &mut seq, "\"3\"");
        expect_containers(&mut transport, &mut seq, &[]);
        expect_containers(&mut transport, &mut seq, &["a"]);
        expect_containers(&mut transport, &mut seq, &["a", "b"]);
        expect_containers(&mut transport, &mut seq, &["a", "b", "c"]);

        let mut sleeper = MockSleeper::new();
        sleeper
            .expect_sleep()
            .withf(|duration| *duration == Duration::from_millis(500))
            .times(3)
            .returning(|_| ());

        let client = client(transport, sleeper);
        let mut events = Vec::new();
        let outcome = client
            .wait_service_containers(&ServiceRef::current(), |name, container| {
                events.push((name.to_string(), container.create_index));
            })
            .await
            .unwrap();

        assert_eq!(
            events,
            vec![
                ("a".to_string(), Some(1)),
                ("b".to_string(), Some(1)),
                ("c".to_string(), Some(1)),
            ]
        );
        assert_eq!(
            outcome,
            WatchOutcome {
                target_scale: 3,
                observed: 3,
                polls: 4,
            }
        );
    }

    #[tokio::test]
    async fn zero_scale_polls_once_without_sleeping() {
        let mut seq = Sequence::new();
        let mut transport = MockTransport::new();
        expect_scale(&mut transport, &mut seq, r#"{"code": 404}"#);
        expect_containers(&mut transport, &mut seq, &[]);

        let mut sleeper = MockSleeper::new();
        sleeper.expect_sleep().never();

        let client = client(transport, sleeper);
        let mut events = 0;
        let outcome = client
            .wait_service_containers(&ServiceRef::current(), |_, _| events += 1)
            .await
            .unwrap();

        assert_eq!(events, 0);
        assert_eq!(outcome.polls, 1);
        assert_eq!(outcome.target_scale, 0);
    }

    #[tokio::test]
    async fn query_failure_aborts_watch_after_emitted_events() {
        let mut seq = Sequence::new();
        let mut transport = MockTransport::new();
        expect_scale(&mut transport, &mut seq, "2");
        expect_containers(&mut transport, &mut seq, &["a"]);
        transport
            .expect_get()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(Error::ServiceUnavailable("connection refused".to_string())));

        let mut sleeper = MockSleeper::new();
        sleeper.expect_sleep().times(1).returning(|_| ());

        let client = client(transport, sleeper);
        let mut events = Vec::new();
        let err = client
            .wait_service_containers(&ServiceRef::current(), |name, _| {
                events.push(name.to_string());
            })
            .await
            .unwrap_err();

        assert!(matches!(err, Error::QueryExhausted { .. }));
        assert_eq!(events, vec!["a".to_string()]);
    }

    #[tokio::test]
    async fn named_service_without_stack_uses_self_stack_paths() {
        let mut transport = MockTransport::new();
        transport
            .expect_get()
            .withf(|request| {
                request.url == "http://metadata/2015-12-19/self/stack/services/db/scale"
            })
            .times(1)
            .returning(|_| Ok(TransportResponse::new(200, "1")));
        transport
            .expect_get()
            .withf(|request| {
                request.url == "http://metadata/2015-12-19/self/stack/services/db/containers"
            })
            .times(1)
            .returning(|_| Ok(TransportResponse::new(200, containers_body(&["db_1"]))));

        let mut sleeper = MockSleeper::new();
        sleeper.expect_sleep().never();

        let client = client(transport, sleeper);
        let mut events = Vec::new();
        client
            .wait_service_containers(&ServiceRef::named("db"), |name, _| {
                events.push(name.to_string());
            })
            .await
            .unwrap();

        assert_eq!(events, vec!["db_1".to_string()]);
    }
}
