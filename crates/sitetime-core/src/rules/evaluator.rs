use std::panic::{catch_unwind, AssertUnwindSafe};

use super::action::ActionStatus;
use super::{Rule, RuleBook};
use crate::origin::Origin;

/// A rule that fired on this check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleFiring {
    pub threshold_ms: u64,
    pub total_ms: u64,
    pub status: ActionStatus,
}

/// Fires the active origin's rule at most once.
///
/// The fired flag is set before the action runs, so a re-entrant check
/// (or one made after a rollover dropped the total again) cannot fire twice.
#[derive(Debug)]
pub struct RuleEvaluator {
    origin: Origin,
    rule: Option<Rule>,
    fired: bool,
}

impl RuleEvaluator {
    pub fn new(book: &RuleBook, origin: &Origin) -> Self {
        Self {
            origin: origin.clone(),
            rule: book.get(origin).cloned(),
            fired: false,
        }
    }

    pub fn has_rule(&self) -> bool {
        self.rule.is_some()
    }

    pub fn has_fired(&self) -> bool {
        self.fired
    }

    pub fn threshold_ms(&self) -> Option<u64> {
        self.rule.as_ref().map(Rule::threshold_ms)
    }

    /// Compare `total_ms` against the threshold and run the action on the
    /// first crossing. Action errors and panics are captured in the
    /// returned [`RuleFiring`].
    pub fn check(&mut self, total_ms: u64) -> Option<RuleFiring> {
        if self.fired {
            return None;
        }
        let rule = self.rule.as_ref()?;
        if total_ms < rule.threshold_ms() {
            return None;
        }
        self.fired = true;

        let status = match catch_unwind(AssertUnwindSafe(|| rule.action().run(&self.origin))) {
            Ok(Ok(())) => ActionStatus::Success,
            Ok(Err(e)) => ActionStatus::Failed {
                reason: e.to_string(),
            },
            Err(payload) => ActionStatus::Failed {
                reason: panic_message(payload.as_ref()),
            },
        };

        match &status {
            ActionStatus::Success => tracing::info!(
                "Budget of {} ms spent on {}, ran {}",
                rule.threshold_ms(),
                self.origin,
                rule.action().describe()
            ),
            ActionStatus::Failed { reason } => tracing::error!(
                "Budget of {} ms spent on {}, action failed: {reason}",
                rule.threshold_ms(),
                self.origin
            ),
        }

        Some(RuleFiring {
            threshold_ms: rule.threshold_ms(),
            total_ms,
            status,
        })
    }

    /// Allow the rule to fire again, after the timer was reset.
    pub fn rearm(&mut self) {
        self.fired = false;
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("action panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("action panicked: {s}")
    } else {
        "action panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ActionError;
    use crate::rules::RuleAction;
    use std::cell::Cell;
    use std::rc::Rc;
    use std::sync::Arc;

    struct Counter(Rc<Cell<u32>>);

    impl RuleAction for Counter {
        fn run(&self, _origin: &Origin) -> Result<(), ActionError> {
            self.0.set(self.0.get() + 1);
            Ok(())
        }
    }

    fn origin() -> Origin {
        Origin::parse("twitter.com").unwrap()
    }

    fn book_with(threshold_ms: u64, action: Arc<dyn RuleAction>) -> RuleBook {
        RuleBook::new().with_rule(origin(), Rule::new(threshold_ms, action).unwrap())
    }

    #[test]
    fn no_rule_never_fires() {
        let mut evaluator = RuleEvaluator::new(&RuleBook::new(), &origin());
        assert!(!evaluator.has_rule());
        assert!(evaluator.check(u64::MAX).is_none());
        assert!(!evaluator.has_fired());
    }

    #[test]
    fn fires_once_at_threshold() {
        let count = Rc::new(Cell::new(0));
        let book = book_with(600_000, Arc::new(Counter(count.clone())));
        let mut evaluator = RuleEvaluator::new(&book, &origin());

        assert!(evaluator.check(599_000).is_none());
        let firing = evaluator.check(600_000).unwrap();
        assert_eq!(firing.threshold_ms, 600_000);
        assert!(firing.status.is_success());
        for total in [601_000, 0, 900_000] {
            assert!(evaluator.check(total).is_none());
        }
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn other_origins_are_unaffected() {
        let count = Rc::new(Cell::new(0));
        let book = book_with(1000, Arc::new(Counter(count.clone())));
        let mut evaluator = RuleEvaluator::new(&book, &Origin::parse("example.com").unwrap());
        assert!(evaluator.check(10_000).is_none());
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn failing_action_still_counts_as_fired() {
        let action = |_: &Origin| -> Result<(), ActionError> {
            Err(ActionError::Failed("nope".into()))
        };
        let book = book_with(1000, Arc::new(action));
        let mut evaluator = RuleEvaluator::new(&book, &origin());

        let firing = evaluator.check(1000).unwrap();
        assert_eq!(
            firing.status,
            ActionStatus::Failed {
                reason: "nope".into()
            }
        );
        assert!(evaluator.has_fired());
        assert!(evaluator.check(2000).is_none());
    }

    #[test]
    fn panicking_action_is_contained() {
        let action = |_: &Origin| -> Result<(), ActionError> { panic!("boom") };
        let book = book_with(1000, Arc::new(action));
        let mut evaluator = RuleEvaluator::new(&book, &origin());

        let firing = evaluator.check(5000).unwrap();
        assert_eq!(
            firing.status,
            ActionStatus::Failed {
                reason: "action panicked: boom".into()
            }
        );
    }

    #[test]
    fn rearm_allows_another_firing() {
        let count = Rc::new(Cell::new(0));
        let book = book_with(1000, Arc::new(Counter(count.clone())));
        let mut evaluator = RuleEvaluator::new(&book, &origin());
        evaluator.check(1000);
        evaluator.rearm();
        assert!(evaluator.check(500).is_none());
        assert!(evaluator.check(1000).is_some());
        assert_eq!(count.get(), 2);
    }
}
