//! Shared types for the item database workspace.
//!
//! This crate provides:
//! - The `Item` record model with its nested flag groups
//! - The workspace error taxonomy and `Result` alias
//! - Diagnostics accumulated by the loader instead of aborting

pub mod diag;
pub mod error;
pub mod item;

pub use diag::{Diagnostic, DiagnosticLevel};
pub use error::{Error, ErrorCategory, Result};
pub use item::{Item, JobFlags, LocationFlags, TradeFlags};
