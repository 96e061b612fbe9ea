//! Test suites for the worker pool
//!
//! Organised by functional area: construction, lifecycle transitions and
//! message delivery.

mod support;
