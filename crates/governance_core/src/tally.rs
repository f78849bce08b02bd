use schemars::JsonSchema;
use serde::Serialize;

use crate::schema::{Vote, VoteSupport};

/// Votes partitioned by direction, each bucket in input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VoteTally {
    pub voted_for: Vec<Vote>,
    pub voted_against: Vec<Vote>,
    pub abstained: Vec<Vote>,
}

impl VoteTally {
    pub fn bucket(&self, support: VoteSupport) -> &[Vote] {
        match support {
            VoteSupport::For => &self.voted_for,
            VoteSupport::Against => &self.voted_against,
            VoteSupport::Abstain => &self.abstained,
        }
    }

    pub fn len(&self) -> usize {
        self.voted_for.len() + self.voted_against.len() + self.abstained.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Summed weight of one bucket. Saturates instead of wrapping.
    pub fn weight(&self, support: VoteSupport) -> u64 {
        self.bucket(support)
            .iter()
            .fold(0u64, |acc, vote| acc.saturating_add(vote.weight))
    }
}

/// Builds a fresh tally from `votes`. Duplicate voters are kept as-is.
pub fn tally_votes(votes: &[Vote]) -> VoteTally {
    let mut tally = VoteTally::default();
    for vote in votes {
        match vote.support {
            VoteSupport::For => tally.voted_for.push(vote.clone()),
            VoteSupport::Abstain => tally.abstained.push(vote.clone()),
            VoteSupport::Against => tally.voted_against.push(vote.clone()),
        }
    }
    tally
}
