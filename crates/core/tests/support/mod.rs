//! Shared test helpers for `inkflow-core` integration tests.
//!
//! These helpers provide reusable fixtures and lightweight mocks so that
//! dispatch tests can focus on behaviour instead of boilerplate.

pub mod providers;
