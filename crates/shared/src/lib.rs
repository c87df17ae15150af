//! Shared utilities and common types for the site tracking backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Common validation logic (coordinates, hours, percentages)
//! - Numeric rounding used for hours and pay
//! - Calendar helpers for anchoring wall-clock times on a date

pub mod numeric;
pub mod time;
pub mod validation;
