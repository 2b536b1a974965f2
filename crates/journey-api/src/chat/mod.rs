pub mod classifier;
pub mod coordinator;
pub mod handler;
pub mod leads;
pub mod turn;

pub use classifier::EventClassifier;
pub use coordinator::{CoordinatorSettings, StreamCoordinator, TurnCancelled, TurnOutcome, EMPTY_FALLBACK, ERROR_FALLBACK};
pub use handler::{extract_query, ChatHandler};
pub use leads::LeadSummaryTrigger;
pub use turn::{TurnPhase, TurnState};
