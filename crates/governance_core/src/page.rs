use serde::Serialize;
use tracing::debug;

use crate::config::DisplayConfig;
use crate::identity::NameResolver;
use crate::metrics::DisplayMetrics;
use crate::schema::{Proposal, Vote};
use crate::tally::{VoteTally, tally_votes};
use crate::view::{ProposalView, ViewInput};

/// Fresh data from one of the page's sources.
#[derive(Debug, Clone)]
pub enum SourceUpdate {
    Proposals(Vec<Proposal>),
    Votes { proposal_id: String, votes: Vec<Vote> },
    Balance(Option<f64>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "view", rename_all = "snake_case")]
pub enum PageView {
    Loading,
    Ready(Box<ProposalView>),
}

/// Latest snapshots for a single proposal page.
///
/// Every update replaces the matching snapshot wholesale, and the view is
/// derived again on each call, so nothing stale carries over.
#[derive(Debug, Clone)]
pub struct ProposalPage {
    proposal_id: String,
    proposals: Vec<Proposal>,
    tally: Option<VoteTally>,
    balance: Option<f64>,
}

impl ProposalPage {
    pub fn new(proposal_id: impl Into<String>) -> Self {
        Self {
            proposal_id: proposal_id.into(),
            proposals: Vec::new(),
            tally: None,
            balance: None,
        }
    }

    pub fn proposal_id(&self) -> &str {
        &self.proposal_id
    }

    pub fn apply(&mut self, update: SourceUpdate) {
        match update {
            SourceUpdate::Proposals(proposals) => {
                debug!(count = proposals.len(), "proposal list refreshed");
                self.proposals = proposals;
            }
            SourceUpdate::Votes { proposal_id, votes } => {
                if proposal_id != self.proposal_id {
                    debug!(%proposal_id, page = %self.proposal_id, "ignoring votes for another proposal");
                    return;
                }
                let tally = tally_votes(&votes);
                debug!(
                    votes = votes.len(),
                    voted_for = tally.voted_for.len(),
                    voted_against = tally.voted_against.len(),
                    abstained = tally.abstained.len(),
                    "tally rebuilt"
                );
                self.tally = Some(tally);
            }
            SourceUpdate::Balance(balance) => self.balance = balance,
        }
    }

    pub fn proposal(&self) -> Option<&Proposal> {
        self.proposals
            .iter()
            .find(|proposal| proposal.proposal_id == self.proposal_id)
    }

    pub fn tally(&self) -> Option<&VoteTally> {
        self.tally.as_ref()
    }

    pub fn metrics(&self, config: &DisplayConfig) -> DisplayMetrics {
        DisplayMetrics::compute(&self.proposals, self.proposal(), config)
    }

    pub fn view(&self, resolver: &dyn NameResolver, config: &DisplayConfig) -> PageView {
        let Some(proposal) = self.proposal() else {
            return PageView::Loading;
        };
        PageView::Ready(Box::new(ProposalView::build(
            ViewInput {
                proposals: &self.proposals,
                proposal,
                tally: self.tally.as_ref(),
                balance: self.balance,
            },
            resolver,
            config,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::NoAliases;
    use crate::schema::{ProposalState, VoteSupport};

    fn proposal(id: &str, state: ProposalState) -> Proposal {
        Proposal {
            proposal_id: id.to_string(),
            proposer: "0xproposer".to_string(),
            for_votes: 1,
            against_votes: 1,
            abstain_votes: 0,
            vote_start: 0,
            vote_end: 0,
            quorum_votes: 3,
            state,
            description: "# Title\nbody".to_string(),
        }
    }

    fn votes(codes: &[i64]) -> Vec<Vote> {
        codes
            .iter()
            .map(|code| Vote {
                voter: format!("0x{code}"),
                support: VoteSupport::from_code(*code),
                weight: 1,
                reason: None,
            })
            .collect()
    }

    #[test]
    fn loading_until_proposal_arrives() {
        let config = DisplayConfig::default();
        let mut page = ProposalPage::new("2");
        assert_eq!(page.view(&NoAliases, &config), PageView::Loading);
        assert_eq!(page.metrics(&config).ordinal, 0);

        page.apply(SourceUpdate::Proposals(vec![
            proposal("3", ProposalState::Pending),
            proposal("2", ProposalState::Active),
            proposal("1", ProposalState::Executed),
        ]));
        let PageView::Ready(view) = page.view(&NoAliases, &config) else {
            panic!("expected ready view");
        };
        assert_eq!(view.metrics.ordinal, 2);
        assert!(view.voters.is_none());
        assert!(!view.can_vote);
    }

    #[test]
    fn votes_replace_tally_instead_of_accumulating() {
        let mut page = ProposalPage::new("2");
        page.apply(SourceUpdate::Votes {
            proposal_id: "2".to_string(),
            votes: votes(&[1, 1, 0]),
        });
        assert_eq!(page.tally().unwrap().voted_for.len(), 2);

        page.apply(SourceUpdate::Votes {
            proposal_id: "2".to_string(),
            votes: votes(&[2]),
        });
        let tally = page.tally().unwrap();
        assert!(tally.voted_for.is_empty());
        assert_eq!(tally.abstained.len(), 1);
    }

    #[test]
    fn votes_for_other_proposal_are_ignored() {
        let mut page = ProposalPage::new("2");
        page.apply(SourceUpdate::Votes {
            proposal_id: "9".to_string(),
            votes: votes(&[1]),
        });
        assert!(page.tally().is_none());
    }

    #[test]
    fn balance_update_enables_voting_and_view_is_idempotent() {
        let config = DisplayConfig::default();
        let mut page = ProposalPage::new("2");
        page.apply(SourceUpdate::Proposals(vec![proposal("2", ProposalState::Active)]));
        page.apply(SourceUpdate::Balance(Some(5.0)));

        let first = page.view(&NoAliases, &config);
        let second = page.view(&NoAliases, &config);
        assert_eq!(first, second);
        let PageView::Ready(view) = first else {
            panic!("expected ready view");
        };
        assert!(view.can_vote);

        page.apply(SourceUpdate::Balance(None));
        let PageView::Ready(view) = page.view(&NoAliases, &config) else {
            panic!("expected ready view");
        };
        assert!(!view.can_vote);
    }
}
