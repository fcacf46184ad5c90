//! Conflicts
//!
//! Decides which eligible coupons may coexist in one stack.
//!
//! Resolution runs in two steps:
//!
//! 1. **Stackability gate.** When a request mixes coupons that opt in to
//!    stacking with coupons that do not, only the first non-stacking coupon in
//!    request order is kept. When no coupon opts in, only the one with the
//!    highest `percent_off` is kept. When every coupon opts in, all are kept.
//! 2. **Group exclusivity.** Survivors are ordered by priority (highest first,
//!    stable on request order) and at most one coupon per stack group is kept.
//!
//! Request order is part of the contract: callers list codes in preference order.

use std::cmp::Reverse;

use rustc_hash::FxHashSet;

use crate::{
    eligibility::Candidate,
    rejections::{PendingRejection, RejectionReason},
};

/// How to choose between non-stacking coupons with the same `percent_off`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TieBreak {
    /// Keep the coupon requested first.
    #[default]
    FirstRequested,

    /// Keep the coupon with the lexically smallest code, whatever the request order.
    Lexical,
}

/// Conflict resolution settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolverOptions {
    /// Tie-break between equally strong non-stacking coupons
    pub tie_break: TieBreak,
}

impl ResolverOptions {
    /// Use the given tie-break.
    #[must_use]
    pub const fn with_tie_break(tie_break: TieBreak) -> Self {
        Self { tie_break }
    }
}

/// Survivors in application order, plus the coupons resolution dropped.
#[derive(Debug, Default)]
pub(crate) struct Resolution {
    pub(crate) survivors: Vec<Candidate>,
    pub(crate) rejected: Vec<PendingRejection>,
}

/// Resolve conflicts between eligible candidates given in request order.
pub(crate) fn resolve(eligible: Vec<Candidate>, options: ResolverOptions) -> Resolution {
    let mut rejected = Vec::new();

    let gated = stackability_gate(eligible, options.tie_break, &mut rejected);
    let survivors = group_exclusivity(gated, &mut rejected);

    Resolution {
        survivors,
        rejected,
    }
}

fn stackability_gate(
    eligible: Vec<Candidate>,
    tie_break: TieBreak,
    rejected: &mut Vec<PendingRejection>,
) -> Vec<Candidate> {
    if eligible.len() <= 1 {
        return eligible;
    }

    let any_stackable = eligible.iter().any(|c| c.coupon().is_stackable());
    let any_other = eligible.iter().any(|c| !c.coupon().is_stackable());

    match (any_stackable, any_other) {
        (true, true) => {
            let keep = eligible.iter().position(|c| !c.coupon().is_stackable());

            keep_only(eligible, keep, &RejectionReason::CannotStack, rejected)
        }
        (false, true) => {
            let keep = strongest(&eligible, tie_break);

            keep_only(eligible, keep, &RejectionReason::OnlyOneAllowed, rejected)
        }
        _ => eligible,
    }
}

/// Index of the candidate with the highest `percent_off`.
fn strongest(candidates: &[Candidate], tie_break: TieBreak) -> Option<usize> {
    candidates
        .iter()
        .enumerate()
        .reduce(|best, next| {
            if beats(next.1, best.1, tie_break) {
                next
            } else {
                best
            }
        })
        .map(|(idx, _)| idx)
}

fn beats(challenger: &Candidate, holder: &Candidate, tie_break: TieBreak) -> bool {
    let challenger_pct = challenger.coupon().percent_off;
    let holder_pct = holder.coupon().percent_off;

    match tie_break {
        TieBreak::FirstRequested => challenger_pct > holder_pct,
        TieBreak::Lexical => {
            challenger_pct > holder_pct
                || (challenger_pct == holder_pct && challenger.code() < holder.code())
        }
    }
}

fn keep_only(
    candidates: Vec<Candidate>,
    keep: Option<usize>,
    reason: &RejectionReason,
    rejected: &mut Vec<PendingRejection>,
) -> Vec<Candidate> {
    let mut survivors = Vec::with_capacity(1);

    for (idx, candidate) in candidates.into_iter().enumerate() {
        if keep == Some(idx) {
            survivors.push(candidate);
        } else {
            rejected.push(candidate.reject(reason.clone()));
        }
    }

    survivors
}

fn group_exclusivity(
    mut survivors: Vec<Candidate>,
    rejected: &mut Vec<PendingRejection>,
) -> Vec<Candidate> {
    // `sort_by_key` is stable, so equal priorities keep request order.
    survivors.sort_by_key(|c| Reverse(c.coupon().priority));

    let mut used_groups = FxHashSet::default();
    let mut kept = Vec::with_capacity(survivors.len());

    for candidate in survivors {
        if let Some(group) = candidate.coupon().stack_group.clone()
            && !used_groups.insert(group.clone())
        {
            rejected.push(candidate.reject(RejectionReason::GroupConflict(group)));
            continue;
        }

        kept.push(candidate);
    }

    kept
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::coupons::{Coupon, CouponCode};

    use super::*;

    fn candidate(
        position: usize,
        raw: &str,
        build: impl FnOnce(Coupon) -> Coupon,
    ) -> TestResult<Candidate> {
        let code = CouponCode::parse(raw)?;
        let coupon = build(Coupon::new(code.clone(), 10));

        Ok(Candidate::new(position, code, coupon))
    }

    fn codes(candidates: &[Candidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.code().as_str()).collect()
    }

    fn rejections(rejected: &[PendingRejection]) -> Vec<(&str, String)> {
        rejected
            .iter()
            .map(|r| (r.rejected.code.as_str(), r.rejected.reason.to_string()))
            .collect()
    }

    #[test]
    fn single_candidate_passes_untouched() -> TestResult {
        let resolution = resolve(
            vec![candidate(0, "SOLO", |c| c.stackable(false))?],
            ResolverOptions::default(),
        );

        assert_eq!(codes(&resolution.survivors), ["SOLO"]);
        assert!(resolution.rejected.is_empty());

        Ok(())
    }

    #[test]
    fn mixed_stacking_keeps_first_non_stackable() -> TestResult {
        let resolution = resolve(
            vec![
                candidate(0, "STACK1", |c| c.stackable(true))?,
                candidate(1, "PLAIN1", |c| c)?,
                candidate(2, "PLAIN2", |c| c.stackable(false))?,
                candidate(3, "STACK2", |c| c.stackable(true))?,
            ],
            ResolverOptions::default(),
        );

        assert_eq!(codes(&resolution.survivors), ["PLAIN1"]);
        assert_eq!(
            rejections(&resolution.rejected),
            [
                ("STACK1", "cannot stack with another coupon".to_string()),
                ("PLAIN2", "cannot stack with another coupon".to_string()),
                ("STACK2", "cannot stack with another coupon".to_string()),
            ]
        );

        Ok(())
    }

    #[test]
    fn no_stackable_keeps_highest_percent() -> TestResult {
        let resolution = resolve(
            vec![
                candidate(0, "A", |mut c| {
                    c.percent_off = 10;
                    c
                })?,
                candidate(1, "B", |mut c| {
                    c.percent_off = 25;
                    c
                })?,
            ],
            ResolverOptions::default(),
        );

        assert_eq!(codes(&resolution.survivors), ["B"]);
        assert_eq!(
            rejections(&resolution.rejected),
            [("A", "only one coupon allowed".to_string())]
        );

        Ok(())
    }

    #[test]
    fn percent_tie_keeps_first_requested_by_default() -> TestResult {
        let resolution = resolve(
            vec![candidate(0, "ZULU", |c| c)?, candidate(1, "ALPHA", |c| c)?],
            ResolverOptions::default(),
        );

        assert_eq!(codes(&resolution.survivors), ["ZULU"]);

        Ok(())
    }

    #[test]
    fn percent_tie_keeps_smallest_code_with_lexical_tie_break() -> TestResult {
        let resolution = resolve(
            vec![candidate(0, "ZULU", |c| c)?, candidate(1, "ALPHA", |c| c)?],
            ResolverOptions::with_tie_break(TieBreak::Lexical),
        );

        assert_eq!(codes(&resolution.survivors), ["ALPHA"]);
        assert_eq!(
            rejections(&resolution.rejected),
            [("ZULU", "only one coupon allowed".to_string())]
        );

        Ok(())
    }

    #[test]
    fn all_stackable_are_ordered_by_priority() -> TestResult {
        let resolution = resolve(
            vec![
                candidate(0, "LOW", |c| c.stackable(true).priority(1))?,
                candidate(1, "HIGH", |c| c.stackable(true).priority(10))?,
                candidate(2, "MID_A", |c| c.stackable(true).priority(5))?,
                candidate(3, "MID_B", |c| c.stackable(true).priority(5))?,
            ],
            ResolverOptions::default(),
        );

        assert_eq!(
            codes(&resolution.survivors),
            ["HIGH", "MID_A", "MID_B", "LOW"]
        );
        assert!(resolution.rejected.is_empty());

        Ok(())
    }

    #[test]
    fn group_keeps_highest_priority_member() -> TestResult {
        let resolution = resolve(
            vec![
                candidate(0, "FALL", |c| c.stackable(true).stack_group("seasonal").priority(1))?,
                candidate(1, "WINTER", |c| c.stackable(true).stack_group("seasonal").priority(3))?,
                candidate(2, "VIP", |c| c.stackable(true).priority(2))?,
            ],
            ResolverOptions::default(),
        );

        assert_eq!(codes(&resolution.survivors), ["WINTER", "VIP"]);
        assert_eq!(
            rejections(&resolution.rejected),
            [(
                "FALL",
                "only one coupon allowed from group: seasonal".to_string()
            )]
        );

        Ok(())
    }

    #[test]
    fn group_applies_after_stackability_gate() -> TestResult {
        // The gate rejects the stackable coupons first, so the group never sees them.
        let resolution = resolve(
            vec![
                candidate(0, "PLAIN", |c| c.stack_group("g"))?,
                candidate(1, "STACK", |c| c.stackable(true).stack_group("g"))?,
            ],
            ResolverOptions::default(),
        );

        assert_eq!(codes(&resolution.survivors), ["PLAIN"]);
        assert_eq!(
            rejections(&resolution.rejected),
            [("STACK", "cannot stack with another coupon".to_string())]
        );

        Ok(())
    }

    #[test]
    fn empty_input_resolves_to_nothing() {
        let resolution = resolve(Vec::new(), ResolverOptions::default());

        assert!(resolution.survivors.is_empty());
        assert!(resolution.rejected.is_empty());
    }
}
