//! Core engine services
//!
//! Currently the unified settings system; engine-wide coordination types
//! live here as they appear.

pub mod config;
