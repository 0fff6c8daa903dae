//! Assignment and independent-work conflict workflows for professional-services firms.
//!
//! The crate exposes two workflow modules behind repository and notifier traits so the
//! decision logic can be exercised against an in-memory store in tests and demos, and
//! against a relational store in production deployments.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
