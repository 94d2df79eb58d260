/// Friend-relationship state machine.
///
/// Pure pair logic with no storage types. The database layer builds a
/// `PairView` for an ordered (actor, target) pair, asks the planners here
/// what to do, and applies the resulting edge mutations in one transaction.
use thiserror::Error;

/// Rule violations surfaced to the API as 400 responses.
/// The `Display` strings are the exact error messages the client sees.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RelationshipError {
    #[error("Invalid user")]
    SelfTarget,
    #[error("User not found")]
    UserNotFound,
    #[error("Already friends")]
    AlreadyFriends,
    #[error("No pending request")]
    NoPendingRequest,
}

/// Edge membership for an ordered (actor, target) pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PairView {
    /// The canonical friendship row exists.
    pub friends: bool,
    /// A pending actor -> target request exists.
    pub actor_requested: bool,
    /// A pending target -> actor request exists.
    pub target_requested: bool,
}

/// The four states of an ordered pair, as a tag rather than implicit
/// set membership. Crossed pending requests (both directions open)
/// report `SentByActor`: the actor's own edge takes precedence, which is
/// what makes a repeated toggle cancel it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationshipState {
    None,
    SentByActor,
    SentByTarget,
    Friends,
}

impl PairView {
    pub fn state(&self) -> RelationshipState {
        if self.friends {
            RelationshipState::Friends
        } else if self.actor_requested {
            RelationshipState::SentByActor
        } else if self.target_requested {
            RelationshipState::SentByTarget
        } else {
            RelationshipState::None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// A new actor -> target request must be inserted.
    Sent,
    /// The existing actor -> target request must be deleted.
    Cancelled,
}

/// Plan a send-or-cancel toggle. Sending while the target already has a
/// pending request to the actor does NOT convert to friendship; it opens
/// a second, crossed request. Clients resolve that with an explicit
/// accept, so auto-converting here would change the contract.
pub fn plan_toggle(pair: &PairView) -> Result<ToggleOutcome, RelationshipError> {
    if pair.friends {
        return Err(RelationshipError::AlreadyFriends);
    }
    if pair.actor_requested {
        Ok(ToggleOutcome::Cancelled)
    } else {
        Ok(ToggleOutcome::Sent)
    }
}

/// Plan an accept by the actor of a request from the target. Only the
/// pending target -> actor edge matters; an already-established
/// friendship is not an error because the insert is idempotent.
pub fn plan_accept(pair: &PairView) -> Result<(), RelationshipError> {
    if !pair.target_requested {
        return Err(RelationshipError::NoPendingRequest);
    }
    Ok(())
}

/// Order a pair of user ids into the canonical (lo, hi) form used by the
/// friendships table.
pub fn canonical_pair<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_none() {
        let pair = PairView::default();
        assert_eq!(pair.state(), RelationshipState::None);
    }

    #[test]
    fn test_state_friends_wins() {
        let pair = PairView {
            friends: true,
            actor_requested: true,
            target_requested: true,
        };
        assert_eq!(pair.state(), RelationshipState::Friends);
    }

    #[test]
    fn test_state_crossed_requests_report_actor_edge() {
        let pair = PairView {
            friends: false,
            actor_requested: true,
            target_requested: true,
        };
        assert_eq!(pair.state(), RelationshipState::SentByActor);
    }

    #[test]
    fn test_toggle_sends_from_clean_state() {
        let pair = PairView::default();
        assert_eq!(plan_toggle(&pair), Ok(ToggleOutcome::Sent));
    }

    #[test]
    fn test_toggle_cancels_own_request() {
        let pair = PairView {
            actor_requested: true,
            ..Default::default()
        };
        assert_eq!(plan_toggle(&pair), Ok(ToggleOutcome::Cancelled));
    }

    #[test]
    fn test_toggle_does_not_auto_accept_incoming_request() {
        // Target already requested the actor. A toggle still opens a new
        // crossed request rather than converting to friendship.
        let pair = PairView {
            target_requested: true,
            ..Default::default()
        };
        assert_eq!(plan_toggle(&pair), Ok(ToggleOutcome::Sent));
    }

    #[test]
    fn test_toggle_rejects_existing_friendship() {
        let pair = PairView {
            friends: true,
            ..Default::default()
        };
        assert_eq!(plan_toggle(&pair), Err(RelationshipError::AlreadyFriends));
    }

    #[test]
    fn test_accept_requires_incoming_request() {
        let pair = PairView::default();
        assert_eq!(plan_accept(&pair), Err(RelationshipError::NoPendingRequest));

        let pair = PairView {
            actor_requested: true,
            ..Default::default()
        };
        assert_eq!(plan_accept(&pair), Err(RelationshipError::NoPendingRequest));
    }

    #[test]
    fn test_accept_with_incoming_request() {
        let pair = PairView {
            target_requested: true,
            ..Default::default()
        };
        assert_eq!(plan_accept(&pair), Ok(()));
    }

    #[test]
    fn test_accept_with_crossed_requests() {
        // Both sides requested each other; accepting still works and
        // resolves via the target's edge.
        let pair = PairView {
            actor_requested: true,
            target_requested: true,
            ..Default::default()
        };
        assert_eq!(plan_accept(&pair), Ok(()));
    }

    #[test]
    fn test_canonical_pair_orders_ids() {
        assert_eq!(canonical_pair("abc", "xyz"), ("abc", "xyz"));
        assert_eq!(canonical_pair("xyz", "abc"), ("abc", "xyz"));
        assert_eq!(canonical_pair("same", "same"), ("same", "same"));
    }

    #[test]
    fn test_error_messages_match_api_contract() {
        assert_eq!(RelationshipError::UserNotFound.to_string(), "User not found");
        assert_eq!(
            RelationshipError::AlreadyFriends.to_string(),
            "Already friends"
        );
        assert_eq!(
            RelationshipError::NoPendingRequest.to_string(),
            "No pending request"
        );
        assert_eq!(RelationshipError::SelfTarget.to_string(), "Invalid user");
    }
}
