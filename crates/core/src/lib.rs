//! Tutorlink Core - Shared domain types.
//!
//! This crate provides the types used across all Tutorlink components:
//! - `admin` - Back-office API and public registration endpoints
//! - `cli` - Command-line tools for migrations and admin management
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, emails, ratings, teacher codes and status enums

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
