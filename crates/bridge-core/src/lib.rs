// Tone Bridge Core - Foundation types for the mediation layer
//
// Shared data model for everything that crosses the producer/consumer trust
// boundary: risk assessments, classified requests, translated messages,
// context entries and thought traces, plus the error and config types.

pub mod config;
pub mod context;
pub mod error;
pub mod message;
pub mod request;
pub mod risk;

pub use config::{minutes, BridgeConfig, SessionConfig, StoreConfig, MAX_TTL_MINUTES};
pub use context::{ContextEntry, EntryKind, Priority, Role, ThoughtProcess, ThoughtStep};
pub use error::{BridgeError, BridgeResult};
pub use message::{MessageTone, TranslatedMessage};
pub use request::{ClassifiedRequest, Complexity, EmotionalTone, Intent, TaskSpecification};
pub use risk::{Payload, RiskAssessment, RiskLevel};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
