// src/services/filter.rs

//! Duplicate and policy filtering of candidate URLs.

use crate::error::{AppError, Result};
use crate::models::Store;
use crate::services::RobotsRules;
use crate::utils::hash_url;

/// Why a URL was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Matched a robots.txt `Disallow` prefix.
    Policy { rule: String },
    /// Its hash is already recorded.
    Duplicate,
}

impl Rejection {
    /// The error reported for `url` when it is refused for this reason.
    pub fn into_error(self, url: &str) -> AppError {
        match self {
            Rejection::Policy { rule } => AppError::PolicyRejected {
                url: url.to_string(),
                rule,
            },
            Rejection::Duplicate => AppError::DuplicateUrl(url.to_string()),
        }
    }
}

/// Outcome of [`UrlFilter::accept`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Accepted { hash: String },
    Rejected(Rejection),
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted { .. })
    }

    /// Turn a rejection into the matching error, yielding the hash otherwise.
    pub fn into_result(self, url: &str) -> Result<String> {
        match self {
            Verdict::Accepted { hash } => Ok(hash),
            Verdict::Rejected(rejection) => Err(rejection.into_error(url)),
        }
    }
}

/// Decides whether a URL may be added.
#[derive(Debug, Clone, Default)]
pub struct UrlFilter {
    rules: RobotsRules,
    respect_robots: bool,
}

impl UrlFilter {
    pub fn new(rules: RobotsRules, respect_robots: bool) -> Self {
        Self {
            rules,
            respect_robots,
        }
    }

    pub fn rules(&self) -> &RobotsRules {
        &self.rules
    }

    /// Policy half of the check; needs no store.
    pub fn check_policy(&self, url: &str) -> Option<Rejection> {
        if !self.respect_robots {
            return None;
        }
        self.rules.disallowing(url).map(|rule| Rejection::Policy {
            rule: rule.to_string(),
        })
    }

    /// Full check: policy first, then duplicate lookup against `store`.
    pub fn accept(&self, url: &str, store: &Store) -> Verdict {
        if let Some(rejection) = self.check_policy(url) {
            return Verdict::Rejected(rejection);
        }
        let hash = hash_url(url);
        if store.contains(&hash) {
            return Verdict::Rejected(Rejection::Duplicate);
        }
        Verdict::Accepted { hash }
    }
}
