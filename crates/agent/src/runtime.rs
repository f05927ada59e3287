use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use arecibo_domain::{AgentCounters, Identity, PolicyResponse, PolicyState, RuntimeInfo};
use chrono::Utc;
use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

use crate::client::CollectorClient;
use crate::config::AgentConfig;
use crate::directives::apply_directives;
use crate::ingest_server::IngestServer;
use crate::queue::{IngestQueue, QueueCounters};

const CONTROL_LOOP_TICK: Duration = Duration::from_millis(200);

/// Mutable runtime state, owned exclusively by the control loop. The
/// ingest receive worker never touches any field here — its only
/// shared access point is [`IngestQueue`].
pub struct RuntimeState {
    pub go_dark: bool,
    pub selected_collector: Option<String>,
    pub policy: PolicyState,
    pub counters: AgentCounters,
    pub counters_snapshot: QueueCounters,
    pub policy_refresh_requested: bool,
    pub heartbeat_min_interval_sec: u64,
}

impl RuntimeState {
    pub fn new(heartbeat_min_interval_sec: u64) -> Self {
        RuntimeState {
            go_dark: false,
            selected_collector: None,
            policy: PolicyState::default(),
            counters: AgentCounters::new(),
            counters_snapshot: QueueCounters::default(),
            policy_refresh_requested: false,
            heartbeat_min_interval_sec,
        }
    }

    /// The heartbeat interval currently in effect, with the hard
    /// floor applied — no directive or policy value may lower it.
    pub fn effective_heartbeat_interval_sec(&self) -> u64 {
        self.heartbeat_min_interval_sec.max(self.policy.heartbeat_interval_sec)
    }
}

/// Everything the control loop needs: identity, config, the shared
/// queue, the HTTP client, and the mutable runtime state.
pub struct AgentRuntime {
    config: AgentConfig,
    client: CollectorClient,
    queue: Arc<IngestQueue>,
    identity: Identity,
    state: RuntimeState,
    start_instant: Instant,
    startup_ts: String,
    stop: Arc<AtomicBool>,
}

impl AgentRuntime {
    pub fn new(config: AgentConfig, queue: Arc<IngestQueue>, stop: Arc<AtomicBool>) -> anyhow::Result<Self> {
        let client = CollectorClient::new(config.api_key.clone())?;
        let startup_ts = Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
        let identity = Identity {
            service_name: config.service_name.clone(),
            environment: config.environment.clone(),
            repository: None,
            commit_sha: config.git_commit.clone(),
            instance_id: Uuid::new_v4().to_string(),
            startup_ts: startup_ts.clone(),
            hostname: config.hostname.clone(),
        };
        let state = RuntimeState::new(config.heartbeat_min_interval_sec);
        Ok(AgentRuntime {
            config,
            client,
            queue,
            identity,
            state,
            start_instant: Instant::now(),
            startup_ts,
            stop,
        })
    }

    /// Signal handlers are installed in `main`; this runs candidate
    /// selection and, if one succeeds, announce + policy refresh.
    pub async fn bootstrap(&mut self) {
        if self.config.collector_candidates.is_empty() {
            warn!("no collector candidates configured, running local-only (ingest only, no outbound sends)");
            return;
        }

        for candidate in self.config.collector_candidates.clone() {
            let (status, body) = self.client.health(&candidate, self.config.probe_timeout()).await;
            let healthy = status == 200 && body.as_ref().and_then(|b| b.get("ok")).and_then(Value::as_bool) == Some(true);
            if healthy {
                info!(collector = %candidate, "selected collector");
                self.state.selected_collector = Some(candidate);
                break;
            }
        }

        if self.state.selected_collector.is_some() {
            self.announce().await;
            self.refresh_policy().await;
        } else {
            warn!("no healthy collector found among candidates, will retry opportunistically");
        }
    }

    /// Single-threaded cooperative scheduler, polling against three
    /// independent deadlines once per tick rather than `select!`-ing
    /// on multiple timers.
    pub async fn run(&mut self, mut ingest_server: Option<IngestServer>) {
        let mut next_heartbeat_at = Instant::now();
        let mut next_flush_at = Instant::now() + Duration::from_secs(self.config.events_flush_interval_sec);
        let mut next_policy_refresh_at = Instant::now()
            + Duration::from_secs(
                self.state
                    .heartbeat_min_interval_sec
                    .max(self.state.policy.ttl_sec.saturating_sub(self.config.policy_refresh_jitter_sec)),
            );

        while !self.stop.load(Ordering::SeqCst) {
            let now = Instant::now();

            if now >= next_heartbeat_at {
                self.heartbeat().await;
                next_heartbeat_at = now + Duration::from_secs(self.state.effective_heartbeat_interval_sec());
            }

            if now >= next_policy_refresh_at || self.state.policy_refresh_requested {
                self.state.policy_refresh_requested = false;
                self.refresh_policy().await;
                next_policy_refresh_at = Instant::now()
                    + Duration::from_secs(
                        self.state
                            .heartbeat_min_interval_sec
                            .max(self.state.policy.ttl_sec.saturating_sub(self.config.policy_refresh_jitter_sec)),
                    );
            }

            if now >= next_flush_at {
                self.flush().await;
                next_flush_at = Instant::now() + Duration::from_secs(self.config.events_flush_interval_sec);
            }

            tokio::time::sleep(CONTROL_LOOP_TICK).await;
        }

        if let Some(server) = ingest_server.take() {
            server.shutdown().await;
        }
        info!("agent control loop stopped");
    }

    async fn announce(&mut self) {
        let Some(collector) = self.state.selected_collector.clone() else { return };
        if self.state.go_dark {
            return;
        }

        let payload = json!({
            "schemaVersion": "1.0.0",
            "eventType": "agent.announce",
            "eventId": Uuid::new_v4().to_string(),
            "sentAt": Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            "identity": self.identity,
            "runtime": RuntimeInfo {
                agent_pid: process::id(),
                agent_version: env!("CARGO_PKG_VERSION").to_string(),
                rust_version: env!("CARGO_PKG_VERSION").to_string(),
            },
        });

        let (status, body) = self.client.announce(&collector, &payload, self.config.http_timeout()).await;
        self.apply_directives_from_body(status, body);
    }

    async fn refresh_policy(&mut self) {
        let Some(collector) = self.state.selected_collector.clone() else { return };
        if self.state.go_dark {
            return;
        }

        let (status, body) = self
            .client
            .policy(&collector, &self.config.service_name, &self.config.environment, self.config.http_timeout())
            .await;

        match status {
            200 => {
                if let Some(body) = body {
                    match serde_json::from_value::<PolicyResponse>(body) {
                        Ok(response) => self.state.policy.apply_response(&response),
                        Err(err) => warn!(error = %err, "policy response failed to parse, leaving state unchanged"),
                    }
                }
            }
            404 => warn!("policy not found for this service/environment, leaving state unchanged"),
            other => warn!(status = other, "policy refresh failed, leaving state unchanged"),
        }
    }

    /// Send one heartbeat and apply whatever directives come back.
    /// Public for the same reason as [`Self::flush`]: integration tests
    /// drive it directly rather than waiting on the control loop timer.
    pub async fn heartbeat(&mut self) {
        let uptime_sec = self.start_instant.elapsed().as_secs();
        self.state.counters_snapshot = self.queue.counters().await;

        let payload = json!({
            "schemaVersion": "1.0.0",
            "eventType": "agent.heartbeat",
            "eventId": Uuid::new_v4().to_string(),
            "sentAt": Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            "identity": self.identity,
            "status": {
                "agentUptimeSec": uptime_sec,
                "goDark": self.state.go_dark,
                "policyVersion": self.state.policy.policy_version,
                "eventsReceivedTotal": self.state.counters_snapshot.received_total,
                "eventsSentTotal": self.state.counters.events_sent_total,
                "eventsDroppedTotal": self.state.counters_snapshot.dropped_total,
                "droppedByQueueSize": self.state.counters_snapshot.dropped_by_queue_size,
                "droppedByPolicy": self.state.counters_snapshot.dropped_by_policy,
                "maxQueueDepth": self.state.counters_snapshot.max_queue_depth,
                "agentRssBytes": 0,
            },
        });

        let result = if self.state.go_dark || self.state.selected_collector.is_none() {
            None
        } else {
            let collector = self.state.selected_collector.clone().unwrap();
            Some(self.client.heartbeat(&collector, &payload, self.config.http_timeout()).await)
        };

        // Unconditional reset regardless of outcome: the window tracks
        // "since last attempted report", not "since last successful one".
        self.queue.reset_heartbeat_window().await;

        if let Some((status, body)) = result {
            self.apply_directives_from_body(status, body);
        }
    }

    /// Pop up to one batch's worth of queued events and send it. Also
    /// reachable from outside the crate so integration tests can drive
    /// a flush deterministically instead of waiting on the control
    /// loop's timer.
    pub async fn flush(&mut self) {
        if self.state.go_dark {
            return;
        }

        if !self.state.policy.enabled {
            let drained = self.queue.drain_all().await;
            if drained > 0 {
                warn!(count = drained, "policy disabled, dropped queued events");
            }
            return;
        }

        let limit = self.config.max_batch_size.min(self.state.policy.max_batch_size).max(1);
        let batch = self.queue.pop_batch(limit).await;
        if batch.is_empty() {
            return;
        }

        if self.state.policy.session_id.is_empty() {
            self.queue.record_policy_drop(batch.len() as u64).await;
            warn!(count = batch.len(), "dropped batch: no session id yet (policy not fetched)");
            return;
        }

        let Some(collector) = self.state.selected_collector.clone() else {
            self.queue.requeue(batch).await;
            return;
        };

        let batch_len = batch.len() as u64;
        let payload = json!({
            "schemaVersion": "1.0.0",
            "batchId": Uuid::new_v4().to_string(),
            "agentSessionId": self.state.policy.session_id,
            "sentAt": Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            "events": batch,
        });

        let (status, body) = self.client.events_batch(&collector, &payload, self.config.http_timeout()).await;

        if status == 202 {
            self.state.counters.events_sent_total += batch_len;
            self.apply_directives_from_body(status, body);
        } else {
            warn!(status, "batch send failed, requeueing");
            self.queue.requeue(batch).await;
        }
    }

    fn apply_directives_from_body(&mut self, status: u16, body: Option<Value>) {
        if status == 0 {
            return;
        }
        let Some(directives) = body.as_ref().and_then(|b| b.get("result")).and_then(|r| r.get("directives")) else {
            return;
        };
        if let Ok(directives) = serde_json::from_value::<Vec<arecibo_domain::Directive>>(directives.clone()) {
            apply_directives(&mut self.state, &directives);
        }
    }

    /// Read-only view of the mutable runtime state, for callers that
    /// need to observe the effect of a bootstrap/directive/flush cycle
    /// (e.g. end-to-end tests driving the real control loop).
    pub fn state(&self) -> &RuntimeState {
        &self.state
    }

    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut RuntimeState {
        &mut self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_heartbeat_interval_floor() {
        let mut state = RuntimeState::new(30);
        state.policy.heartbeat_interval_sec = 5;
        assert_eq!(state.effective_heartbeat_interval_sec(), 30);
        state.policy.heartbeat_interval_sec = 120;
        assert_eq!(state.effective_heartbeat_interval_sec(), 120);
    }
}
