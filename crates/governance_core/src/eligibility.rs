use crate::schema::ProposalState;

pub const DEFAULT_MINIMUM_BALANCE: f64 = 1.0;

/// Whether the viewer is offered the "submit vote" action.
///
/// Fails closed: a missing, NaN or infinite balance is never eligible.
pub fn can_vote(state: ProposalState, balance: Option<f64>, minimum_balance: f64) -> bool {
    if !state.is_active() {
        return false;
    }
    match balance {
        Some(balance) => balance.is_finite() && balance >= minimum_balance,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_with_enough_balance() {
        assert!(can_vote(ProposalState::Active, Some(1.0), DEFAULT_MINIMUM_BALANCE));
        assert!(can_vote(ProposalState::Active, Some(250.0), DEFAULT_MINIMUM_BALANCE));
    }

    #[test]
    fn inactive_states_never_vote() {
        for state in [
            ProposalState::Pending,
            ProposalState::Canceled,
            ProposalState::Defeated,
            ProposalState::Succeeded,
            ProposalState::Queued,
            ProposalState::Expired,
            ProposalState::Executed,
            ProposalState::Unknown(99),
        ] {
            assert!(!can_vote(state, Some(1_000.0), DEFAULT_MINIMUM_BALANCE));
        }
    }

    #[test]
    fn missing_or_bad_balance_fails_closed() {
        assert!(!can_vote(ProposalState::Active, None, DEFAULT_MINIMUM_BALANCE));
        assert!(!can_vote(ProposalState::Active, Some(f64::NAN), DEFAULT_MINIMUM_BALANCE));
        assert!(!can_vote(ProposalState::Active, Some(f64::INFINITY), DEFAULT_MINIMUM_BALANCE));
        assert!(!can_vote(ProposalState::Active, Some(0.99), DEFAULT_MINIMUM_BALANCE));
        assert!(!can_vote(ProposalState::Active, Some(-4.0), DEFAULT_MINIMUM_BALANCE));
    }
}
