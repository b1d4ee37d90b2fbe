//! Per-origin time budgets.
//!
//! A [`RuleBook`] is the static origin -> [`Rule`] table, built once from
//! configuration (or by hand) and handed to each [`RuleEvaluator`].

pub mod action;
mod evaluator;

pub use action::{ActionStatus, CommandAction, RedirectAction, RuleAction, TimeoutAction};
pub use evaluator::{RuleEvaluator, RuleFiring};

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::error::ConfigError;
use crate::origin::Origin;
use crate::storage::Config;

/// Threshold and action for one origin.
#[derive(Clone)]
pub struct Rule {
    threshold_ms: u64,
    action: Arc<dyn RuleAction>,
}

impl Rule {
    /// # Errors
    /// Returns an error if `threshold_ms` is zero.
    pub fn new(threshold_ms: u64, action: Arc<dyn RuleAction>) -> Result<Self, ConfigError> {
        if threshold_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "threshold_ms".to_string(),
                message: "must be positive".to_string(),
            });
        }
        Ok(Self {
            threshold_ms,
            action,
        })
    }

    pub fn threshold_ms(&self) -> u64 {
        self.threshold_ms
    }

    pub fn action(&self) -> &dyn RuleAction {
        self.action.as_ref()
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("threshold_ms", &self.threshold_ms)
            .field("action", &self.action.describe())
            .finish()
    }
}

/// Listing entry for a configured rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleSummary {
    pub origin: Origin,
    pub threshold_ms: u64,
    pub action: String,
}

/// Immutable origin -> rule table.
#[derive(Debug, Clone, Default)]
pub struct RuleBook {
    rules: BTreeMap<Origin, Rule>,
}

impl RuleBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule, replacing any earlier rule for the same origin.
    pub fn with_rule(mut self, origin: Origin, rule: Rule) -> Self {
        self.rules.insert(origin, rule);
        self
    }

    /// Build the table from the `[rules]` section of the configuration.
    ///
    /// # Errors
    /// Returns an error for an invalid origin key, a missing or zero
    /// threshold, or an action that cannot be built.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let mut book = Self::new();
        for (key, entry) in &config.rules {
            let origin = Origin::parse(key).map_err(|e| ConfigError::InvalidValue {
                key: format!("rules.{key}"),
                message: e.to_string(),
            })?;
            let threshold_ms = entry.threshold_ms().ok_or_else(|| ConfigError::InvalidValue {
                key: format!("rules.{key}"),
                message: "threshold_minutes or threshold_ms is required".to_string(),
            })?;
            let action: Arc<dyn RuleAction> = Arc::from(action::from_config(&entry.action)?);
            let rule = Rule::new(threshold_ms, action).map_err(|e| ConfigError::InvalidValue {
                key: format!("rules.{key}"),
                message: e.to_string(),
            })?;
            book = book.with_rule(origin, rule);
        }
        Ok(book)
    }

    pub fn get(&self, origin: &Origin) -> Option<&Rule> {
        self.rules.get(origin)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn summaries(&self) -> Vec<RuleSummary> {
        self.rules
            .iter()
            .map(|(origin, rule)| RuleSummary {
                origin: origin.clone(),
                threshold_ms: rule.threshold_ms,
                action: rule.action.describe(),
            })
            .collect()
    }
}
