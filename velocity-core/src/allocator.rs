//! Allocator: move pooled minutes into a task.
//!
//! Greedy first-fit (deterministic):
//! 1) walk confidence tiers High -> Medium -> Low
//! 2) within a tier, walk tokens in pool order, skipping person-owned and empty ones
//! 3) take min(balance, remaining) until the request is covered
//!
//! A request the pool cannot cover is not an error; the uncovered part comes
//! back as `shortfall_minutes`.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::token::{CapacityToken, Confidence};

/// Minutes taken from a single token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Draw {
    pub token_index: usize,
    pub source: String,
    pub confidence: Confidence,
    pub minutes: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    pub tokens: Vec<CapacityToken>,
    pub requested_minutes: f64,
    pub consumed_minutes: f64,
    pub shortfall_minutes: f64,
    pub draws: Vec<Draw>,
}

impl Allocation {
    pub fn is_complete(&self) -> bool {
        self.shortfall_minutes <= 0.0
    }

    /// Split into the updated pool and a report for the caller.
    pub fn into_report(self, task_id: impl Into<String>) -> (Vec<CapacityToken>, AllocationReport) {
        let report = AllocationReport {
            task_id: task_id.into(),
            requested_minutes: self.requested_minutes,
            consumed_minutes: self.consumed_minutes,
            shortfall_minutes: self.shortfall_minutes,
            draws: self.draws,
        };
        (self.tokens, report)
    }
}

/// Outcome of allocating to a task; a shortfall is reported, not hidden.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationReport {
    pub task_id: String,
    pub requested_minutes: f64,
    pub consumed_minutes: f64,
    pub shortfall_minutes: f64,
    pub draws: Vec<Draw>,
}

/// Allocate `request_minutes` from `tokens`, returning the updated pool.
pub fn allocate(tokens: &[CapacityToken], request_minutes: f64) -> Allocation {
    let mut pool = tokens.to_vec();
    let requested = if request_minutes.is_finite() {
        request_minutes.max(0.0)
    } else {
        0.0
    };
    let mut remaining = requested;
    let mut draws = Vec::new();

    'tiers: for tier in Confidence::PRIORITY {
        for (i, token) in pool.iter_mut().enumerate() {
            if remaining <= 0.0 {
                break 'tiers;
            }
            if token.confidence != tier || !token.is_pooled() {
                continue;
            }
            let take = token.minutes.min(remaining);
            token.minutes -= take;
            remaining -= take;
            draws.push(Draw {
                token_index: i,
                source: token.source.clone(),
                confidence: tier,
                minutes: take,
            });
        }
    }

    let consumed = requested - remaining;
    debug!(requested, consumed, draws = draws.len(), "allocated from pool");
    if remaining > 0.0 {
        warn!(shortfall = remaining, "capacity pool could not cover request");
    }

    Allocation {
        tokens: pool,
        requested_minutes: requested,
        consumed_minutes: consumed,
        shortfall_minutes: remaining,
        draws,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::total_minutes;

    fn tok(source: &str, minutes: f64, confidence: Confidence) -> CapacityToken {
        CapacityToken::team("marketing", source, minutes, confidence)
    }

    #[test]
    fn exhausts_high_before_medium_before_low() {
        let pool = vec![
            tok("low", 100.0, Confidence::Low),
            tok("med", 100.0, Confidence::Medium),
            tok("high-a", 50.0, Confidence::High),
            tok("high-b", 50.0, Confidence::High),
        ];
        let a = allocate(&pool, 150.0);
        assert_eq!(a.tokens[2].minutes, 0.0);
        assert_eq!(a.tokens[3].minutes, 0.0);
        assert_eq!(a.tokens[1].minutes, 50.0);
        assert_eq!(a.tokens[0].minutes, 100.0);
        assert!(a.is_complete());
        let order: Vec<&str> = a.draws.iter().map(|d| d.source.as_str()).collect();
        assert_eq!(order, vec!["high-a", "high-b", "med"]);
    }

    #[test]
    fn conserves_minutes() {
        let pool = vec![
            tok("a", 120.0, Confidence::High),
            tok("b", 45.5, Confidence::Medium),
            tok("c", 10.0, Confidence::Low),
        ];
        for request in [0.0, 30.0, 165.5, 500.0] {
            let a = allocate(&pool, request);
            let before = total_minutes(&pool);
            let after = total_minutes(&a.tokens);
            assert!((before - (after + a.consumed_minutes)).abs() < 1e-9);
            assert!(a.consumed_minutes <= request);
        }
    }

    #[test]
    fn partial_fulfilment_reports_shortfall() {
        let pool = vec![tok("a", 60.0, Confidence::High)];
        let a = allocate(&pool, 100.0);
        assert_eq!(a.consumed_minutes, 60.0);
        assert_eq!(a.shortfall_minutes, 40.0);
        assert!(!a.is_complete());
        assert_eq!(a.tokens[0].minutes, 0.0);
    }

    #[test]
    fn skips_person_owned_tokens() {
        let pool = vec![
            tok("owned", 100.0, Confidence::High).with_person("u1"),
            tok("pooled", 100.0, Confidence::Medium),
        ];
        let a = allocate(&pool, 30.0);
        assert_eq!(a.tokens[0].minutes, 100.0);
        assert_eq!(a.tokens[1].minutes, 70.0);
    }

    #[test]
    fn non_finite_request_takes_nothing() {
        let pool = vec![tok("a", 60.0, Confidence::High)];
        let a = allocate(&pool, f64::NAN);
        assert_eq!(a.consumed_minutes, 0.0);
        assert_eq!(a.tokens, pool);
    }
}
