//! Tone Bridge Runtime - Mediation between a producer and a consumer
//!
//! The [`Mediator`] is the only entry point most callers need:
//!
//! ```rust,no_run
//! use bridge_core::BridgeConfig;
//! use bridge_runtime::Mediator;
//! use serde_json::json;
//!
//! # async fn example() {
//! let mediator = Mediator::new(BridgeConfig::default());
//! mediator.spawn_sweeper();
//!
//! let outcome = mediator.handle_user_request("Skapa en enkel app", None).await;
//! let message = mediator
//!     .handle_producer_response(json!({"message": "Appen är klar"}), &outcome.session_id)
//!     .await;
//! println!("{}", message.message);
//!
//! mediator.shutdown().await;
//! # }
//! ```

pub mod mediator;
mod registry;
pub mod session;
pub mod stats;

pub use mediator::{CleanupReport, HealthReport, Mediator, UserRequestOutcome};
pub use session::{SessionSnapshot, SessionState};
pub use stats::SessionStats;
