use crate::error::Result;
use crate::schema::{Proposal, Vote};

/// Supplies every known proposal, newest first.
pub trait ProposalSource {
    fn proposals(&self) -> Result<Vec<Proposal>>;
}

/// Supplies the raw vote records cast on one proposal.
pub trait VoteSource {
    fn votes(&self, proposal_id: &str) -> Result<Vec<Vote>>;
}
