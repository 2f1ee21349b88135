//! Tier escalation table.

use crate::fetch::Tier;

/// Outcome of running one tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierOutcome {
    /// A usable page was obtained.
    Success,
    /// Access was refused or a protection page was served.
    Blocked,
    /// The page is an unrendered script shell.
    ScriptShell,
    /// Timeout, network, engine or service failure.
    Failed,
}

/// What the orchestrator does after a tier finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Use the page this tier produced.
    Accept,
    /// Try the given tier next.
    Escalate(Tier),
    /// No tier is left.
    GiveUp,
}

/// The escalation state machine.
///
/// Only [`TierOutcome::Success`] stops escalation. Every other outcome moves
/// to the next tier in `Http -> Headless -> ThirdParty` order, and after the
/// last tier acquisition gives up.
pub fn next_step(tier: Tier, outcome: TierOutcome) -> Step {
    match outcome {
        TierOutcome::Success => Step::Accept,
        TierOutcome::Blocked | TierOutcome::ScriptShell | TierOutcome::Failed => {
            tier.next().map_or(Step::GiveUp, Step::Escalate)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_success_is_accepted_on_every_tier() {
        for tier in Tier::iter() {
            assert_eq!(next_step(tier, TierOutcome::Success), Step::Accept);
        }
    }

    #[test]
    fn test_failures_escalate_in_order() {
        for outcome in [
            TierOutcome::Blocked,
            TierOutcome::ScriptShell,
            TierOutcome::Failed,
        ] {
            assert_eq!(
                next_step(Tier::Http, outcome),
                Step::Escalate(Tier::Headless)
            );
            assert_eq!(
                next_step(Tier::Headless, outcome),
                Step::Escalate(Tier::ThirdParty)
            );
            assert_eq!(next_step(Tier::ThirdParty, outcome), Step::GiveUp);
        }
    }

    #[test]
    fn test_escalation_never_goes_backwards() {
        for tier in Tier::iter() {
            if let Step::Escalate(next) = next_step(tier, TierOutcome::Failed) {
                assert!(next > tier);
            }
        }
    }
}
