//! Shared test utilities for trendsage integration tests.
//!
//! This module provides:
//! - `ScriptedApi`, an in-memory backend with canned responses and a call log
//! - Builder patterns for jobs, matches and pages

pub mod builders;
pub mod fake_api;

pub use builders::*;
pub use fake_api::{ApiCall, JobReply, PageReply, ScriptedApi};
