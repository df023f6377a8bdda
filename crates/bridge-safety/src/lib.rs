//! Safety Layer - Risk classification and redaction
//!
//! This crate provides:
//! - Vocabulary-based risk scoring of producer payloads (none → critical)
//! - Soft-synonym redaction of technical wording
//! - Stripping of structured fields that carry technical detail
//!
//! Design Philosophy:
//! - Priority over count: one credential outweighs any amount of jargon
//! - Never fails: every payload gets an assessment
//! - Transparent: every change made to a payload is reported

mod classifier;
mod filter;
mod redactor;

pub use classifier::{RiskCategory, RiskClassifier, RiskPatterns};
pub use filter::{SafetyFilter, SanitizedPayload};
pub use redactor::{
    is_technical_key, technical_field_paths, Redaction, Redactor, StrippedValue, MASK,
};
