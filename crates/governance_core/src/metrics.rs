use schemars::JsonSchema;
use serde::Serialize;

use crate::config::DisplayConfig;
use crate::schema::{Proposal, VoteTotals};
use crate::timefmt::{DisplayTimestamp, format_timestamp};

/// Display ordinal of `proposal_id` in a newest-first list.
///
/// The oldest proposal is number 1. A missing id yields 0.
pub fn proposal_ordinal(proposals: &[Proposal], proposal_id: &str) -> usize {
    match proposals
        .iter()
        .position(|proposal| proposal.proposal_id == proposal_id)
    {
        Some(index) => proposals.len() - index,
        None => 0,
    }
}

/// Share of `amount` in `total` as a whole percentage in `0..=100`.
pub fn vote_percentage(amount: u64, total: u128) -> u8 {
    if amount == 0 || total == 0 {
        return 0;
    }
    let value = (amount as f64 / total as f64 * 100.0).round();
    value.min(100.0) as u8
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VotePercentages {
    pub for_pct: u8,
    pub against_pct: u8,
    pub abstain_pct: u8,
}

impl VotePercentages {
    pub fn from_totals(totals: &VoteTotals) -> Self {
        let total = totals.total();
        Self {
            for_pct: vote_percentage(totals.for_votes, total),
            against_pct: vote_percentage(totals.against_votes, total),
            abstain_pct: vote_percentage(totals.abstain_votes, total),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DisplayMetrics {
    pub ordinal: usize,
    pub percentages: VotePercentages,
    pub quorum: u64,
    pub snapshot: DisplayTimestamp,
    pub ends: DisplayTimestamp,
}

impl DisplayMetrics {
    /// Metrics for `proposal` within `proposals`. An absent proposal
    /// produces the zeroed view rather than an error.
    pub fn compute(proposals: &[Proposal], proposal: Option<&Proposal>, config: &DisplayConfig) -> Self {
        let offset = config.time.offset();
        match proposal {
            Some(proposal) => Self {
                ordinal: proposal_ordinal(proposals, &proposal.proposal_id),
                percentages: VotePercentages::from_totals(&proposal.totals()),
                quorum: proposal.display_quorum(),
                snapshot: format_timestamp(proposal.vote_start, offset),
                ends: format_timestamp(proposal.vote_end, offset),
            },
            None => Self {
                ordinal: 0,
                percentages: VotePercentages::default(),
                quorum: 1,
                snapshot: format_timestamp(0, offset),
                ends: format_timestamp(0, offset),
            },
        }
    }
}
