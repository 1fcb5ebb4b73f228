//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the music database core:
//! - Logging and tracing infrastructure
//! - Configuration of the database update
//! - Event bus system
//!
//! ## Overview
//!
//! This crate contains the runtime utilities that other modules depend on.
//! It establishes the logging conventions and the event broadcasting used to
//! tell the host that the database changed.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
