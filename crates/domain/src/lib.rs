//! Wire and domain types shared by the agent and the collector.

pub mod counters;
pub mod directive;
pub mod envelope;
pub mod event;
pub mod identity;
pub mod policy;
pub mod session;

pub use counters::AgentCounters;
pub use directive::{Directive, DirectiveKind};
pub use envelope::{ErrorDetail, ResultBody, ResultEnvelope, ResultStatus};
pub use event::{Event, Severity};
pub use identity::{Identity, RuntimeInfo};
pub use policy::{PolicyDocument, PolicyResponse, PolicyState};
pub use session::derive_session_id;
