//! Testing utilities for the identity console core
//!
//! Provides mockall mocks for every backend service trait, builders for
//! common wire-type fixtures, and in-memory fake implementations for tests
//! that want real state behind the service seams.

#![forbid(unsafe_code)]

pub mod builders;
pub mod implementations;
pub mod mocks;
