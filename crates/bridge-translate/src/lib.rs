//! Translation Layer - Between end-user language and producer output
//!
//! This crate provides:
//! - Request classification (intent, complexity, emotional tone)
//! - Task specifications built from classified requests
//! - Tone-aware, consumer-safe messages built from producer payloads
//!
//! Consumer-facing wording is Swedish.

mod intent;
mod normalize;
mod translator;

pub use intent::{
    IntentClassifier, PatternRule, COMPLEXITY_PATTERNS, INTENT_PATTERNS, TONE_PATTERNS,
};
pub use normalize::{fold, padded_words};
pub use translator::{
    duration_label, MessageTranslator, FALLBACK_CONFIDENCE, FALLBACK_MESSAGE,
    WORKING_ON_IT_MESSAGE,
};
