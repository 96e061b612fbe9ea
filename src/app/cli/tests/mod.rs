//! Tests for CLI parsing and configuration loading
