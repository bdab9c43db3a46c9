//! The request workflow engine: one transition table shared by all four
//! request kinds. A transition names the states it connects, the actor
//! allowed to drive it, and the side effects the caller must apply in the
//! same transaction. Callers enforce the optimistic write
//! (`UPDATE … WHERE status = <current>`) so a concurrent decision surfaces
//! as a stale-state conflict instead of a silent overwrite.

use crate::core::error::CoreError;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum RequestKind {
    Leave,
    ShiftChange,
    RemoteWork,
    Dispute,
}

/// Union of the states of all request kinds; each kind only ever visits
/// its own subset.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Display, EnumString, ToSchema,
)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RequestState {
    Pending,
    PendingApproval,
    RejectedApproval,
    Approved,
    Rejected,
    Recalled,
}

impl RequestState {
    /// Terminal states admit no further transition, for any kind.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RequestState::Approved
                | RequestState::Rejected
                | RequestState::Recalled
                | RequestState::RejectedApproval
        )
    }
}

/// Who is acting, resolved by the handler from the authenticated
/// principal: the employee who filed the request, the employee it targets
/// (shift change only), or an admin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Actor {
    Owner,
    Counterparty,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Action {
    Recall,
    Accept,
    Decline,
    Approve,
    Reject,
    Revert,
}

impl Action {
    /// Authority decisions must carry a non-empty response note; recall
    /// and accept only record actor and timestamp.
    pub fn requires_note(self) -> bool {
        matches!(
            self,
            Action::Approve | Action::Reject | Action::Decline | Action::Revert
        )
    }
}

/// Side effects the caller applies atomically with the state write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideEffect {
    /// Debit the leave ledger for the request's inclusive day span.
    DebitLeave,
    /// Credit back a previously debited span (approval revert).
    CreditLeave,
    /// Move the disputed assignment row from target to requester.
    ReassignAssignment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub next: RequestState,
    pub effects: &'static [SideEffect],
}

const NO_EFFECTS: &[SideEffect] = &[];

/// Look up the transition for `(kind, current, actor, action)`.
///
/// Identity-level checks (the caller really is the owner/target) and the
/// domain guards tied to a transition (leave start date not past,
/// sufficient balance, target still owns the assignment) stay with the
/// caller; the table is only about state reachability and role.
pub fn transition(
    kind: RequestKind,
    current: RequestState,
    actor: Actor,
    action: Action,
) -> Result<Transition, CoreError> {
    use Action as A;
    use Actor as R;
    use RequestKind as K;
    use RequestState as S;

    let found = match (kind, current, actor, action) {
        (K::Leave, S::Pending, R::Owner, A::Recall) => Some((S::Recalled, NO_EFFECTS)),
        (K::Leave, S::Pending, R::Admin, A::Approve) => {
            Some((S::Approved, &[SideEffect::DebitLeave][..]))
        }
        (K::Leave, S::Pending, R::Admin, A::Reject) => Some((S::Rejected, NO_EFFECTS)),
        // The one compensating edge out of a terminal state: undoing a
        // leave approval must credit the debited days back, so APPROVED
        // keeps a single admin-driven exit. Every other terminal state
        // is final for every kind.
        (K::Leave, S::Approved, R::Admin, A::Revert) => {
            Some((S::Rejected, &[SideEffect::CreditLeave][..]))
        }

        (K::ShiftChange, S::Pending, R::Owner, A::Recall) => Some((S::Recalled, NO_EFFECTS)),
        (K::ShiftChange, S::Pending, R::Counterparty, A::Accept) => {
            Some((S::PendingApproval, NO_EFFECTS))
        }
        (K::ShiftChange, S::Pending, R::Counterparty, A::Decline) => {
            Some((S::RejectedApproval, NO_EFFECTS))
        }
        (K::ShiftChange, S::PendingApproval, R::Admin, A::Approve) => {
            Some((S::Approved, &[SideEffect::ReassignAssignment][..]))
        }
        (K::ShiftChange, S::PendingApproval, R::Admin, A::Reject) => {
            Some((S::Rejected, NO_EFFECTS))
        }

        (K::RemoteWork, S::Pending, R::Owner, A::Recall) => Some((S::Recalled, NO_EFFECTS)),
        (K::RemoteWork, S::Pending, R::Admin, A::Approve) => Some((S::Approved, NO_EFFECTS)),
        (K::RemoteWork, S::Pending, R::Admin, A::Reject) => Some((S::Rejected, NO_EFFECTS)),

        (K::Dispute, S::Pending, R::Admin, A::Approve) => Some((S::Approved, NO_EFFECTS)),
        (K::Dispute, S::Pending, R::Admin, A::Reject) => Some((S::Rejected, NO_EFFECTS)),

        _ => None,
    };

    match found {
        Some((next, effects)) => Ok(Transition { next, effects }),
        None => Err(CoreError::InvalidTransition {
            state: current,
            action,
        }),
    }
}

/// Validate the response note for an action, trimming whitespace.
pub fn require_note(action: Action, note: Option<&str>) -> Result<Option<String>, CoreError> {
    let trimmed = note.map(str::trim).filter(|n| !n.is_empty());
    if action.requires_note() && trimmed.is_none() {
        return Err(CoreError::Validation(
            "a response note is required for this decision".into(),
        ));
    }
    Ok(trimmed.map(str::to_owned))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_KINDS: [RequestKind; 4] = [
        RequestKind::Leave,
        RequestKind::ShiftChange,
        RequestKind::RemoteWork,
        RequestKind::Dispute,
    ];
    const ALL_STATES: [RequestState; 6] = [
        RequestState::Pending,
        RequestState::PendingApproval,
        RequestState::RejectedApproval,
        RequestState::Approved,
        RequestState::Rejected,
        RequestState::Recalled,
    ];
    const ALL_ACTORS: [Actor; 3] = [Actor::Owner, Actor::Counterparty, Actor::Admin];
    const ALL_ACTIONS: [Action; 6] = [
        Action::Recall,
        Action::Accept,
        Action::Decline,
        Action::Approve,
        Action::Reject,
        Action::Revert,
    ];

    #[test]
    fn leave_happy_paths() {
        let t = transition(
            RequestKind::Leave,
            RequestState::Pending,
            Actor::Admin,
            Action::Approve,
        )
        .unwrap();
        assert_eq!(t.next, RequestState::Approved);
        assert_eq!(t.effects, &[SideEffect::DebitLeave]);

        let t = transition(
            RequestKind::Leave,
            RequestState::Pending,
            Actor::Owner,
            Action::Recall,
        )
        .unwrap();
        assert_eq!(t.next, RequestState::Recalled);
        assert!(t.effects.is_empty());
    }

    #[test]
    fn leave_revert_credits_the_ledger() {
        let t = transition(
            RequestKind::Leave,
            RequestState::Approved,
            Actor::Admin,
            Action::Revert,
        )
        .unwrap();
        assert_eq!(t.next, RequestState::Rejected);
        assert_eq!(t.effects, &[SideEffect::CreditLeave]);
    }

    #[test]
    fn shift_change_two_phase_path() {
        let t = transition(
            RequestKind::ShiftChange,
            RequestState::Pending,
            Actor::Counterparty,
            Action::Accept,
        )
        .unwrap();
        assert_eq!(t.next, RequestState::PendingApproval);

        let t = transition(
            RequestKind::ShiftChange,
            RequestState::PendingApproval,
            Actor::Admin,
            Action::Approve,
        )
        .unwrap();
        assert_eq!(t.next, RequestState::Approved);
        assert_eq!(t.effects, &[SideEffect::ReassignAssignment]);
    }

    #[test]
    fn shift_change_admin_cannot_skip_target_acceptance() {
        let err = transition(
            RequestKind::ShiftChange,
            RequestState::Pending,
            Actor::Admin,
            Action::Approve,
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::InvalidTransition { .. }));
    }

    #[test]
    fn target_decline_is_terminal() {
        let t = transition(
            RequestKind::ShiftChange,
            RequestState::Pending,
            Actor::Counterparty,
            Action::Decline,
        )
        .unwrap();
        assert_eq!(t.next, RequestState::RejectedApproval);
        assert!(t.next.is_terminal());
    }

    #[test]
    fn dispute_is_admin_only() {
        for actor in [Actor::Owner, Actor::Counterparty] {
            for action in ALL_ACTIONS {
                assert!(
                    transition(RequestKind::Dispute, RequestState::Pending, actor, action).is_err()
                );
            }
        }
        assert!(
            transition(
                RequestKind::Dispute,
                RequestState::Pending,
                Actor::Admin,
                Action::Recall
            )
            .is_err()
        );
    }

    #[test]
    fn no_transition_leaves_a_terminal_state_except_leave_revert() {
        for kind in ALL_KINDS {
            for state in ALL_STATES.into_iter().filter(|s| s.is_terminal()) {
                for actor in ALL_ACTORS {
                    for action in ALL_ACTIONS {
                        let is_revert = kind == RequestKind::Leave
                            && state == RequestState::Approved
                            && actor == Actor::Admin
                            && action == Action::Revert;
                        if is_revert {
                            continue;
                        }
                        assert!(
                            transition(kind, state, actor, action).is_err(),
                            "{kind} allowed {action} out of terminal {state}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn every_defined_transition_moves_forward() {
        // The reachable graph is acyclic: pending -> pending_approval ->
        // terminal, with the single revert edge between terminals.
        for kind in ALL_KINDS {
            for state in ALL_STATES {
                for actor in ALL_ACTORS {
                    for action in ALL_ACTIONS {
                        if let Ok(t) = transition(kind, state, actor, action) {
                            assert_ne!(t.next, state);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn the_revert_edge_is_the_only_exit_from_any_terminal_state() {
        let mut exits = Vec::new();
        for kind in ALL_KINDS {
            for state in ALL_STATES.into_iter().filter(|s| s.is_terminal()) {
                for actor in ALL_ACTORS {
                    for action in ALL_ACTIONS {
                        if let Ok(t) = transition(kind, state, actor, action) {
                            exits.push((kind, state, actor, action, t));
                        }
                    }
                }
            }
        }
        // Exactly one compensating edge exists, and it credits the ledger.
        assert_eq!(exits.len(), 1);
        let (kind, state, actor, action, t) = exits[0];
        assert_eq!(kind, RequestKind::Leave);
        assert_eq!(state, RequestState::Approved);
        assert_eq!(actor, Actor::Admin);
        assert_eq!(action, Action::Revert);
        assert_eq!(t.next, RequestState::Rejected);
        assert_eq!(t.effects, &[SideEffect::CreditLeave]);
    }

    #[test]
    fn leave_approval_then_revert_applies_ledger_effects() {
        use crate::core::ledger;

        let mut balance = ledger::open_balance(1000, 1, 2026, 20);

        let approve = transition(
            RequestKind::Leave,
            RequestState::Pending,
            Actor::Admin,
            Action::Approve,
        )
        .unwrap();
        for effect in approve.effects {
            match effect {
                SideEffect::DebitLeave => ledger::debit(&mut balance, 3, false).unwrap(),
                other => panic!("unexpected effect {other:?}"),
            }
        }
        assert_eq!(balance.remaining_day, 17);

        let revert = transition(
            RequestKind::Leave,
            approve.next,
            Actor::Admin,
            Action::Revert,
        )
        .unwrap();
        for effect in revert.effects {
            match effect {
                SideEffect::CreditLeave => ledger::credit(&mut balance, 3).unwrap(),
                other => panic!("unexpected effect {other:?}"),
            }
        }
        assert_eq!(balance.remaining_day, 20);
        assert_eq!(revert.next, RequestState::Rejected);
    }

    #[test]
    fn note_rules() {
        assert!(require_note(Action::Approve, None).is_err());
        assert!(require_note(Action::Reject, Some("   ")).is_err());
        assert!(require_note(Action::Decline, None).is_err());
        assert_eq!(require_note(Action::Recall, None).unwrap(), None);
        assert_eq!(
            require_note(Action::Approve, Some("  ok ")).unwrap().as_deref(),
            Some("ok")
        );
    }

    #[test]
    fn states_round_trip_through_storage_strings() {
        use std::str::FromStr;
        for state in ALL_STATES {
            assert_eq!(RequestState::from_str(&state.to_string()).unwrap(), state);
        }
        assert_eq!(RequestState::PendingApproval.to_string(), "pending_approval");
    }
}
