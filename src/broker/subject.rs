//! Subject validation and wildcard matching
//!
//! Subjects are dot-separated tokens (`orders.eu.created`). Subscriptions
//! may use `*` to match exactly one token and a trailing `>` to match one or
//! more remaining tokens. Published subjects must be literal.

use crate::broker::error::{BrokerError, BrokerResult};

pub const SINGLE_WILDCARD: &str = "*";
pub const TAIL_WILDCARD: &str = ">";

fn invalid(subject: &str, reason: &str) -> BrokerError {
    BrokerError::InvalidSubject {
        subject: subject.to_string(),
        reason: reason.to_string(),
    }
}

/// Validate a subject for publishing (`allow_wildcards = false`) or for
/// subscribing (`allow_wildcards = true`)
pub fn validate_subject(subject: &str, allow_wildcards: bool) -> BrokerResult<()> {
    if subject.is_empty() {
        return Err(invalid(subject, "subject must not be empty"));
    }
    if subject.chars().any(char::is_whitespace) {
        return Err(invalid(subject, "subject must not contain whitespace"));
    }

    let tokens: Vec<&str> = subject.split('.').collect();
    for (index, token) in tokens.iter().enumerate() {
        if token.is_empty() {
            return Err(invalid(subject, "subject must not contain empty tokens"));
        }

        let is_wildcard = *token == SINGLE_WILDCARD || *token == TAIL_WILDCARD;
        if !is_wildcard && (token.contains('*') || token.contains('>')) {
            return Err(invalid(subject, "wildcards must occupy a whole token"));
        }
        if is_wildcard && !allow_wildcards {
            return Err(invalid(subject, "wildcards are not allowed when publishing"));
        }
        if *token == TAIL_WILDCARD && index + 1 != tokens.len() {
            return Err(invalid(subject, "'>' must be the last token"));
        }
    }

    Ok(())
}

/// Whether a literal `subject` is matched by a subscription `filter`
pub fn subject_matches(filter: &str, subject: &str) -> bool {
    let mut filter_tokens = filter.split('.');
    let mut subject_tokens = subject.split('.');

    loop {
        match (filter_tokens.next(), subject_tokens.next()) {
            (Some(TAIL_WILDCARD), Some(_)) => return true,
            (Some(SINGLE_WILDCARD), Some(_)) => continue,
            (Some(expected), Some(actual)) if expected == actual => continue,
            (None, None) => return true,
            _ => return false,
        }
    }
}
