//! Core library for the "Should I Bunk" decision service.
//!
//! The prediction engine answers one question from four academic signals:
//! is it safe to skip a given class. Two interchangeable backends share a
//! single result contract: a trained logistic classifier and a deterministic
//! rule cascade the service falls back to when no model artifact is present.

pub mod config;
pub mod error;
pub mod prediction;
pub mod telemetry;
pub mod training;
