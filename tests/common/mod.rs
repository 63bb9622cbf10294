//! Shared test utilities for trawl integration harnesses.
//!
//! Import everything you need via `mod common; use common::*;` at the top of
//! each harness file. Builders and fixtures are deterministic: every trace
//! timestamp is an offset from 2024-01-01T12:00:00Z.

#![allow(dead_code)]

#[macro_use]
pub mod assertions;
pub mod builders;
pub mod fake_ollama;
pub mod fixtures;
pub mod scripted;

pub use builders::*;
pub use fixtures::*;
pub use scripted::*;
