//! Experiment Designer
//!
//! Design engine for controlled online experiments with support for:
//! - Hypothesis, variant and metric definition with collected validation errors
//! - Two-proportion power analysis with memoization
//! - A step-by-step wizard gated by launch readiness
//! - Handoff of frozen experiment records to a runtime

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use crate::config::AppConfig;
