use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Governor lifecycle state as reported by the proposal source.
///
/// The wire form is the raw integer code; `from_code` is total so an
/// unrecognised code survives a round trip as `Unknown`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum ProposalState {
    #[default]
    Pending,
    Active,
    Canceled,
    Defeated,
    Succeeded,
    Queued,
    Expired,
    Executed,
    Unknown(i64),
}

impl ProposalState {
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => ProposalState::Pending,
            1 => ProposalState::Active,
            2 => ProposalState::Canceled,
            3 => ProposalState::Defeated,
            4 => ProposalState::Succeeded,
            5 => ProposalState::Queued,
            6 => ProposalState::Expired,
            7 => ProposalState::Executed,
            other => ProposalState::Unknown(other),
        }
    }

    pub fn code(self) -> i64 {
        match self {
            ProposalState::Pending => 0,
            ProposalState::Active => 1,
            ProposalState::Canceled => 2,
            ProposalState::Defeated => 3,
            ProposalState::Succeeded => 4,
            ProposalState::Queued => 5,
            ProposalState::Expired => 6,
            ProposalState::Executed => 7,
            ProposalState::Unknown(code) => code,
        }
    }

    pub fn is_active(self) -> bool {
        self == ProposalState::Active
    }
}

impl From<i64> for ProposalState {
    fn from(code: i64) -> Self {
        ProposalState::from_code(code)
    }
}

impl From<ProposalState> for i64 {
    fn from(state: ProposalState) -> Self {
        state.code()
    }
}

impl std::fmt::Display for ProposalState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let value = match self {
            ProposalState::Pending => "pending",
            ProposalState::Active => "active",
            ProposalState::Canceled => "canceled",
            ProposalState::Defeated => "defeated",
            ProposalState::Succeeded => "succeeded",
            ProposalState::Queued => "queued",
            ProposalState::Expired => "expired",
            ProposalState::Executed => "executed",
            ProposalState::Unknown(code) => return write!(f, "unknown({code})"),
        };
        write!(f, "{value}")
    }
}

/// Direction of a single vote.
///
/// Support code 1 is FOR and 2 is ABSTAIN. Every other code, 0 included,
/// counts as AGAINST: the against bucket is the default bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum VoteSupport {
    For,
    Against,
    Abstain,
}

impl VoteSupport {
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => VoteSupport::For,
            2 => VoteSupport::Abstain,
            _ => VoteSupport::Against,
        }
    }

    pub fn code(self) -> i64 {
        match self {
            VoteSupport::For => 1,
            VoteSupport::Abstain => 2,
            VoteSupport::Against => 0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            VoteSupport::For => "for",
            VoteSupport::Against => "against",
            VoteSupport::Abstain => "abstained",
        }
    }

    pub fn tone(self) -> Tone {
        match self {
            VoteSupport::For => Tone::Success,
            VoteSupport::Against => Tone::Danger,
            VoteSupport::Abstain => Tone::Muted,
        }
    }
}

impl From<i64> for VoteSupport {
    fn from(code: i64) -> Self {
        VoteSupport::from_code(code)
    }
}

impl From<VoteSupport> for i64 {
    fn from(support: VoteSupport) -> Self {
        support.code()
    }
}

impl std::fmt::Display for VoteSupport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Presentation tone for a vote direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Success,
    Danger,
    Muted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    pub proposal_id: String,
    #[serde(default)]
    pub proposer: String,
    #[serde(default)]
    pub for_votes: u64,
    #[serde(default)]
    pub against_votes: u64,
    #[serde(default)]
    pub abstain_votes: u64,
    #[serde(default)]
    pub vote_start: u64, // epoch seconds, 0 when unset
    #[serde(default)]
    pub vote_end: u64,
    #[serde(default)]
    pub quorum_votes: u64,
    #[serde(default)]
    #[schemars(with = "i64")]
    pub state: ProposalState,
    #[serde(default)]
    pub description: String,
}

impl Proposal {
    /// Quorum shown to the viewer; an unset (zero) quorum displays as 1.
    pub fn display_quorum(&self) -> u64 {
        if self.quorum_votes == 0 {
            1
        } else {
            self.quorum_votes
        }
    }

    pub fn totals(&self) -> VoteTotals {
        VoteTotals {
            for_votes: self.for_votes,
            against_votes: self.against_votes,
            abstain_votes: self.abstain_votes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Vote {
    pub voter: String,
    #[schemars(with = "i64")]
    pub support: VoteSupport,
    #[serde(default)]
    pub weight: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Aggregate vote weights reported on the proposal itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VoteTotals {
    pub for_votes: u64,
    pub against_votes: u64,
    pub abstain_votes: u64,
}

impl VoteTotals {
    pub fn total(&self) -> u128 {
        self.for_votes as u128 + self.against_votes as u128 + self.abstain_votes as u128
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn support_codes_map_totally() {
        assert_eq!(VoteSupport::from_code(1), VoteSupport::For);
        assert_eq!(VoteSupport::from_code(2), VoteSupport::Abstain);
        assert_eq!(VoteSupport::from_code(0), VoteSupport::Against);
        assert_eq!(VoteSupport::from_code(3), VoteSupport::Against);
        assert_eq!(VoteSupport::from_code(-1), VoteSupport::Against);
    }

    #[test]
    fn state_codes_round_trip_unknown() {
        assert!(ProposalState::from_code(1).is_active());
        assert_eq!(ProposalState::from_code(42), ProposalState::Unknown(42));
        assert_eq!(ProposalState::Unknown(42).code(), 42);
        assert_eq!(ProposalState::Executed.to_string(), "executed");
    }

    #[test]
    fn proposal_deserializes_with_missing_fields() {
        let proposal: Proposal =
            serde_json::from_str(r#"{"proposalId":"7","forVotes":3,"state":1}"#).unwrap();
        assert_eq!(proposal.for_votes, 3);
        assert_eq!(proposal.against_votes, 0);
        assert_eq!(proposal.vote_end, 0);
        assert_eq!(proposal.state, ProposalState::Active);
        assert_eq!(proposal.description, "");
        assert_eq!(proposal.display_quorum(), 1);
    }

    #[test]
    fn vote_support_uses_wire_code() {
        let vote: Vote = serde_json::from_str(r#"{"voter":"0xabc","support":9,"weight":4}"#).unwrap();
        assert_eq!(vote.support, VoteSupport::Against);
        assert_eq!(vote.reason, None);

        let json = serde_json::to_value(&vote).unwrap();
        assert_eq!(json["support"], 0);
    }
}
