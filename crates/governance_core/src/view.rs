use schemars::JsonSchema;
use serde::Serialize;

use crate::config::DisplayConfig;
use crate::description::parse_description;
use crate::eligibility::can_vote;
use crate::identity::{NameResolver, display_name};
use crate::metrics::DisplayMetrics;
use crate::render::{HtmlSanitizer, SanitizedDescription};
use crate::schema::{Proposal, ProposalState, Tone, Vote, VoteTotals};
use crate::tally::VoteTally;

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct VoterCard {
    pub name: String,
    pub voter: String,
    pub weight: u64,
    pub direction: String,
    pub tone: Tone,
    pub reason: Option<String>,
}

impl VoterCard {
    pub fn from_vote(vote: &Vote, resolver: &dyn NameResolver, config: &DisplayConfig) -> Self {
        Self {
            name: display_name(resolver, &vote.voter, &config.address),
            voter: vote.voter.clone(),
            weight: vote.weight,
            direction: vote.support.label().to_string(),
            tone: vote.support.tone(),
            reason: vote
                .reason
                .as_ref()
                .filter(|reason| !reason.trim().is_empty())
                .cloned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VoterSections {
    pub voted_for: Vec<VoterCard>,
    pub voted_against: Vec<VoterCard>,
    pub abstained: Vec<VoterCard>,
}

impl VoterSections {
    pub fn from_tally(tally: &VoteTally, resolver: &dyn NameResolver, config: &DisplayConfig) -> Self {
        let cards = |votes: &[Vote]| -> Vec<VoterCard> {
            votes
                .iter()
                .map(|vote| VoterCard::from_vote(vote, resolver, config))
                .collect()
        };
        Self {
            voted_for: cards(&tally.voted_for),
            voted_against: cards(&tally.voted_against),
            abstained: cards(&tally.abstained),
        }
    }
}

/// Everything the proposal page shows, derived from one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProposalView {
    pub proposal_id: String,
    pub title: String,
    pub proposer: String,
    pub proposer_address: String,
    #[schemars(with = "i64")]
    pub state: ProposalState,
    pub totals: VoteTotals,
    pub metrics: DisplayMetrics,
    pub body_html_candidate: String,
    /// `None` until the vote list has been loaded.
    pub voters: Option<VoterSections>,
    pub can_vote: bool,
}

pub struct ViewInput<'a> {
    pub proposals: &'a [Proposal],
    pub proposal: &'a Proposal,
    pub tally: Option<&'a VoteTally>,
    pub balance: Option<f64>,
}

impl ProposalView {
    pub fn build(input: ViewInput<'_>, resolver: &dyn NameResolver, config: &DisplayConfig) -> Self {
        let proposal = input.proposal;
        let description = parse_description(&proposal.description);
        Self {
            proposal_id: proposal.proposal_id.clone(),
            title: description
                .title_or(&config.description.default_title)
                .to_string(),
            proposer: display_name(resolver, &proposal.proposer, &config.address),
            proposer_address: proposal.proposer.clone(),
            state: proposal.state,
            totals: proposal.totals(),
            metrics: DisplayMetrics::compute(input.proposals, Some(proposal), config),
            body_html_candidate: description.body,
            voters: input
                .tally
                .map(|tally| VoterSections::from_tally(tally, resolver, config)),
            can_vote: can_vote(
                proposal.state,
                input.balance,
                config.eligibility.minimum_balance,
            ),
        }
    }

    pub fn sanitized_description(&self, sanitizer: &dyn HtmlSanitizer) -> SanitizedDescription {
        SanitizedDescription::new(&self.title, &self.body_html_candidate, sanitizer)
    }
}
