//! Nebula Core - Foundational types for the Nebula backdrop engine
//!
//! This crate provides the core types that all other Nebula crates depend on:
//! - `Vec2`, `Rect`, `Viewport` - Logical-unit geometry
//! - `Color` - RGBA color with hex constructors
//! - Error types and Result alias

mod error;
mod types;

pub use error::{NebulaError, Result};
pub use types::{Color, Rect, Vec2, Viewport};
