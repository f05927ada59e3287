use std::collections::VecDeque;

use arecibo_domain::Event;
use tokio::sync::Mutex;

/// Snapshot of the counters the ingest queue is the sole writer of.
///
/// `dropped_total` is the single lifetime total every drop cause folds
/// into — drop-oldest overflow (`push`), a policy-disabled drain
/// (`drain_all`), and an explicit policy drop
/// (`record_policy_drop`, used when a batch can't be sent because no
/// session id has been fetched yet). `dropped_by_queue_size` and
/// `dropped_by_policy` are the same two causes broken out as
/// heartbeat-windowed counters; both are folded into `dropped_total`
/// at the point they're recorded, so `dropped_total` always equals
/// their lifetime sum without the control loop having to add them up
/// itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueueCounters {
    pub received_total: u64,
    pub dropped_total: u64,
    pub dropped_by_queue_size: u64,
    pub dropped_by_policy: u64,
    pub max_queue_depth: usize,
}

struct Inner {
    queue: VecDeque<Event>,
    capacity: usize,
    counters: QueueCounters,
}

/// Bounded, drop-oldest FIFO shared between the ingest receive worker
/// (producer) and the control loop (consumer). A single mutex guards
/// both the deque and the counters that must stay atomic with respect
/// to queue size, matching the concurrency contract: one writer
/// (ingest worker) for `push`, one reader/writer (control loop) for
/// everything else.
pub struct IngestQueue {
    inner: Mutex<Inner>,
}

impl IngestQueue {
    pub fn new(capacity: usize) -> Self {
        IngestQueue {
            inner: Mutex::new(Inner {
                queue: VecDeque::with_capacity(capacity.min(1024)),
                capacity,
                counters: QueueCounters::default(),
            }),
        }
    }

    /// Enqueue one event, evicting the oldest on overflow.
    pub async fn push(&self, event: Event) {
        let mut inner = self.inner.lock().await;
        inner.counters.received_total += 1;
        if inner.queue.len() == inner.capacity {
            inner.queue.pop_front();
            inner.counters.dropped_by_queue_size += 1;
            inner.counters.dropped_total += 1;
        }
        inner.queue.push_back(event);
        let depth = inner.queue.len();
        if depth > inner.counters.max_queue_depth {
            inner.counters.max_queue_depth = depth;
        }
    }

    /// Remove and return up to `limit` oldest events. May return an
    /// empty batch.
    pub async fn pop_batch(&self, limit: usize) -> Vec<Event> {
        let mut inner = self.inner.lock().await;
        let n = limit.min(inner.queue.len());
        inner.queue.drain(..n).collect()
    }

    /// Requeue a batch that failed to send. Subject to the same
    /// drop-oldest rule as any other push — a sustained downstream
    /// outage lets newer observations displace the requeued ones.
    pub async fn requeue(&self, events: Vec<Event>) {
        for event in events {
            self.push(event).await;
        }
    }

    /// Drain the entire queue, attributing every drained event to the
    /// policy-disabled cause. Used when `policy.enabled == false`.
    pub async fn drain_all(&self) -> usize {
        let mut inner = self.inner.lock().await;
        let n = inner.queue.len();
        inner.queue.clear();
        Self::record_policy_drop_locked(&mut inner, n as u64);
        n
    }

    /// Attribute `count` events to the policy-drop cause without
    /// going through the queue itself — used when a popped batch is
    /// dropped rather than requeued (e.g. no session id fetched yet).
    /// Goes through the same mutex as `push`/`drain_all` so
    /// `dropped_total` stays a single coherent total regardless of
    /// which path caused the drop.
    pub async fn record_policy_drop(&self, count: u64) {
        let mut inner = self.inner.lock().await;
        Self::record_policy_drop_locked(&mut inner, count);
    }

    fn record_policy_drop_locked(inner: &mut Inner, count: u64) {
        inner.counters.dropped_total += count;
        inner.counters.dropped_by_policy += count;
    }

    pub async fn size(&self) -> usize {
        self.inner.lock().await.queue.len()
    }

    pub async fn counters(&self) -> QueueCounters {
        self.inner.lock().await.counters
    }

    /// Reset the windowed fields (`dropped_by_queue_size`,
    /// `dropped_by_policy`, `max_queue_depth`) on every heartbeat
    /// attempt. Lifetime totals (`received_total`, `dropped_total`)
    /// are untouched.
    pub async fn reset_heartbeat_window(&self) {
        let mut inner = self.inner.lock().await;
        inner.counters.dropped_by_queue_size = 0;
        inner.counters.dropped_by_policy = 0;
        inner.counters.max_queue_depth = inner.queue.len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(n: u32) -> Event {
        Event::normalize(&json!({"payload": {"n": n}}), || "2026-01-01T00:00:00Z".to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_push_respects_capacity() {
        let queue = IngestQueue::new(2);
        queue.push(event(1)).await;
        queue.push(event(2)).await;
        queue.push(event(3)).await;
        assert_eq!(queue.size().await, 2);
        let counters = queue.counters().await;
        assert_eq!(counters.received_total, 3);
        assert_eq!(counters.dropped_total, 1);
        assert_eq!(counters.dropped_by_queue_size, 1);
    }

    #[tokio::test]
    async fn test_drop_oldest_keeps_newest() {
        let queue = IngestQueue::new(1);
        queue.push(event(1)).await;
        queue.push(event(2)).await;
        let batch = queue.pop_batch(10).await;
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].payload["n"], json!(2));
    }

    #[tokio::test]
    async fn test_pop_batch_respects_limit() {
        let queue = IngestQueue::new(10);
        for n in 0..5 {
            queue.push(event(n)).await;
        }
        let batch = queue.pop_batch(3).await;
        assert_eq!(batch.len(), 3);
        assert_eq!(queue.size().await, 2);
    }

    #[tokio::test]
    async fn test_drain_all_attributes_to_dropped_total_and_policy_window() {
        let queue = IngestQueue::new(10);
        for n in 0..4 {
            queue.push(event(n)).await;
        }
        let drained = queue.drain_all().await;
        assert_eq!(drained, 4);
        assert_eq!(queue.size().await, 0);
        let counters = queue.counters().await;
        assert_eq!(counters.dropped_total, 4);
        assert_eq!(counters.dropped_by_policy, 4);
    }

    #[tokio::test]
    async fn test_record_policy_drop_folds_into_dropped_total() {
        let queue = IngestQueue::new(10);
        queue.push(event(1)).await;
        queue.push(event(2)).await;
        queue.record_policy_drop(2).await;
        let counters = queue.counters().await;
        assert_eq!(counters.dropped_total, 2);
        assert_eq!(counters.dropped_by_policy, 2);
        assert_eq!(counters.received_total, 2);
    }

    #[tokio::test]
    async fn test_reset_heartbeat_window_preserves_totals() {
        let queue = IngestQueue::new(1);
        queue.push(event(1)).await;
        queue.push(event(2)).await;
        queue.record_policy_drop(3).await;
        queue.reset_heartbeat_window().await;
        let counters = queue.counters().await;
        assert_eq!(counters.dropped_by_queue_size, 0);
        assert_eq!(counters.dropped_by_policy, 0);
        assert_eq!(counters.received_total, 2);
        assert_eq!(counters.dropped_total, 4);
    }

    #[tokio::test]
    async fn test_conservation_invariant() {
        let queue = IngestQueue::new(3);
        for n in 0..5 {
            queue.push(event(n)).await;
        }
        let sent = queue.pop_batch(2).await.len() as u64;
        let counters = queue.counters().await;
        let still_queued = queue.size().await as u64;
        assert_eq!(counters.received_total, sent + counters.dropped_total + still_queued);
    }

    #[tokio::test]
    async fn test_drop_attribution_invariant() {
        let queue = IngestQueue::new(2);
        for n in 0..5 {
            queue.push(event(n)).await;
        }
        queue.record_policy_drop(1).await;
        let counters = queue.counters().await;
        assert_eq!(counters.dropped_total, counters.dropped_by_queue_size + counters.dropped_by_policy);
    }
}
