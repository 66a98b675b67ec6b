//! # SPIR Common Library
//!
//! Shared code for the SPIR (Soccer Player Identity Reconciliation) services:
//! - Database models and schema initialization
//! - Confidence band policy (engine ↔ review contract)
//! - Configuration loading
//! - Error types

pub mod banding;
pub mod config;
pub mod db;
pub mod error;

pub use banding::{ConfidenceBands, Decision};
pub use error::{Error, Result};
