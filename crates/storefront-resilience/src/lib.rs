//! # Storefront Resilience
//!
//! Bounded retry patterns for the storefront backend: backoff strategies,
//! a retry policy for transient failures, and the optimistic
//! compare-and-swap combinator used when no atomic primitive is available.

pub mod retry;

pub use retry::*;
