//! Core types for Tutorlink.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod rating;
pub mod status;
pub mod teacher_code;

pub use email::{Email, EmailError};
pub use id::*;
pub use rating::{Rating, RatingError};
pub use status::*;
pub use teacher_code::{TeacherCode, TeacherCodeError};
