//! # Wasil Support
//!
//! Shared utilities for the Wasil DI framework.
//!
//! This crate provides:
//! - Text rendering for error messages
//! - Parsing of the field tag microsyntax used by `#[derive(Injectable)]`

pub mod rendering;
pub mod tag;
