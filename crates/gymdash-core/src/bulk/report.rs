use serde::Serialize;
use uuid::Uuid;

use crate::error::BulkItemError;

/// Result for one item of a fan-out. `subject` is the id the caller asked
/// about (a member for assignment, a plan for plan operations); `result`
/// carries the id produced, if any.
#[derive(Debug, Clone)]
pub struct ItemOutcome {
    pub subject: Uuid,
    pub result: Result<Uuid, BulkItemError>,
}

/// Per-item outcomes plus advisory warnings, in request order.
#[derive(Debug, Clone, Default)]
pub struct BulkReport {
    pub outcomes: Vec<ItemOutcome>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BulkCounts {
    pub requested: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub cancelled: usize,
}

impl BulkReport {
    pub fn succeeded(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().ok().copied())
    }

    pub fn failures(&self) -> impl Iterator<Item = (Uuid, &BulkItemError)> + '_ {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.subject, e)))
    }

    pub fn counts(&self) -> BulkCounts {
        let mut counts = BulkCounts {
            requested: self.outcomes.len(),
            succeeded: 0,
            failed: 0,
            cancelled: 0,
        };
        for o in &self.outcomes {
            match &o.result {
                Ok(_) => counts.succeeded += 1,
                Err(BulkItemError::Cancelled) => counts.cancelled += 1,
                Err(_) => counts.failed += 1,
            }
        }
        counts
    }

    /// e.g. `8 of 10 succeeded`.
    pub fn summary(&self) -> String {
        let c = self.counts();
        let mut s = format!("{} of {} succeeded", c.succeeded, c.requested);
        if c.cancelled > 0 {
            s.push_str(&format!(", {} cancelled", c.cancelled));
        }
        s
    }

    pub fn is_complete_success(&self) -> bool {
        self.outcomes.iter().all(|o| o.result.is_ok())
    }

    pub(crate) fn merge(&mut self, other: BulkReport) {
        self.outcomes.extend(other.outcomes);
        self.warnings.extend(other.warnings);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_counts_each_bucket() {
        let ok = |_: usize| ItemOutcome {
            subject: Uuid::new_v4(),
            result: Ok(Uuid::new_v4()),
        };
        let mut report = BulkReport {
            outcomes: (0..8).map(ok).collect(),
            warnings: vec![],
        };
        report.outcomes.push(ItemOutcome {
            subject: Uuid::new_v4(),
            result: Err(BulkItemError::Backend("boom".into())),
        });
        report.outcomes.push(ItemOutcome {
            subject: Uuid::new_v4(),
            result: Err(BulkItemError::Cancelled),
        });

        assert_eq!(report.summary(), "8 of 10 succeeded, 1 cancelled");
        let c = report.counts();
        assert_eq!((c.succeeded, c.failed, c.cancelled), (8, 1, 1));
        assert_eq!(report.failures().count(), 2);
        assert!(!report.is_complete_success());
    }
}
