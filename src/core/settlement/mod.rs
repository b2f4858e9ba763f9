pub mod events;
pub mod guard;
pub mod orchestrator;
pub mod payload;
pub mod request;
pub mod state;

pub use events::{SettlementEvent, SettlementEventKind, SettlementEvents, Subscription};
pub use orchestrator::SettlementOrchestrator;
pub use payload::{BatchPayload, PayloadEntry};
pub use request::{SettlementOutcome, SettlementRequest, TransferRequest};
pub use state::AttemptState;
