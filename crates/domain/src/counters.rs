/// Lifetime counter owned solely by the control loop.
///
/// Every other counter the heartbeat reports — `eventsReceivedTotal`,
/// `eventsDroppedTotal`, the queue-size/policy drop windows, and the
/// queue-depth high-water mark — lives in `IngestQueue`'s
/// `QueueCounters` instead, behind the same mutex that guards queue
/// size. That keeps `eventsDroppedTotal` a single coherent total no
/// matter which path (overflow, policy-disabled drain, or a batch
/// dropped for lacking a session id) caused the drop, rather than
/// splitting drop accounting across two structs that can drift apart.
#[derive(Debug, Clone, Copy, Default)]
pub struct AgentCounters {
    pub events_sent_total: u64,
}

impl AgentCounters {
    pub fn new() -> Self {
        Self::default()
    }
}
