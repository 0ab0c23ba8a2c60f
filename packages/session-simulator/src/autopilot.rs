//! Plays the human seat by answering every prompt the session sends.

use nightfall_backend::ai::speech::canned_speech;
use nightfall_backend::protocol::{ActionKind, ActionPrompt, Command};
use rand::prelude::*;

/// Chance of spending the protection charge when the prompt offers it.
const SAVE_PROBABILITY: f64 = 0.5;
/// Chance of using the poison on a night where it is available.
const POISON_PROBABILITY: f64 = 0.25;
/// Chance of holding fire instead of retaliating.
const PASS_PROBABILITY: f64 = 0.1;

pub struct Autopilot {
    rng: StdRng,
}

impl Autopilot {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// The command that answers `prompt`, or `None` when nothing is expected.
    pub fn answer(&mut self, prompt: &ActionPrompt) -> Option<Command> {
        let command = match prompt.action {
            ActionKind::ConfirmRole => Command::ConfirmRole,
            ActionKind::BeginVoting => Command::BeginVoting,
            ActionKind::EnterNight => Command::EnterNight,
            ActionKind::Wait => return None,
            ActionKind::EliminatorTarget => {
                // Stay away from teammates when possible.
                let teammates = prompt.teammates.as_deref().unwrap_or_default();
                let outsiders: Vec<_> = prompt
                    .valid_targets
                    .iter()
                    .copied()
                    .filter(|id| !teammates.contains(id))
                    .collect();
                let pool = if outsiders.is_empty() {
                    &prompt.valid_targets
                } else {
                    &outsiders
                };
                Command::EliminatorTarget {
                    target_id: *pool.choose(&mut self.rng)?,
                }
            }
            ActionKind::InvestigatorTarget => Command::InvestigatorTarget {
                target_id: *prompt.valid_targets.choose(&mut self.rng)?,
            },
            ActionKind::ProtectorAction => {
                let save = prompt.can_save == Some(true) && self.rng.random_bool(SAVE_PROBABILITY);
                let poison_target = if prompt.can_poison == Some(true)
                    && self.rng.random_bool(POISON_PROBABILITY)
                {
                    prompt.valid_targets.choose(&mut self.rng).copied()
                } else {
                    None
                };
                Command::ProtectorAction {
                    save,
                    poison_target,
                }
            }
            ActionKind::Speak => Command::Speak {
                content: canned_speech(&mut self.rng).to_string(),
            },
            ActionKind::FinalStatement => Command::FinalStatement {
                content: canned_speech(&mut self.rng).to_string(),
            },
            ActionKind::Vote => Command::Vote {
                target_id: *prompt.valid_targets.choose(&mut self.rng)?,
            },
            ActionKind::RetaliationTarget => {
                let target_id = if self.rng.random_bool(PASS_PROBABILITY) {
                    None
                } else {
                    prompt.valid_targets.choose(&mut self.rng).copied()
                };
                Command::RetaliationTarget { target_id }
            }
        };
        Some(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gates_are_answered_directly() {
        let mut pilot = Autopilot::new(1);
        let prompt = ActionPrompt::new(ActionKind::BeginVoting, "go");
        assert_eq!(pilot.answer(&prompt), Some(Command::BeginVoting));
        let prompt = ActionPrompt::new(ActionKind::Wait, "hold on");
        assert_eq!(pilot.answer(&prompt), None);
    }

    #[test]
    fn targets_come_from_the_prompt() {
        let mut pilot = Autopilot::new(2);
        let prompt = ActionPrompt::new(ActionKind::Vote, "vote").with_targets(vec![3, 5]);
        for _ in 0..20 {
            match pilot.answer(&prompt) {
                Some(Command::Vote { target_id }) => assert!([3, 5].contains(&target_id)),
                other => panic!("unexpected answer {other:?}"),
            }
        }
    }

    #[test]
    fn eliminator_avoids_teammates() {
        let mut pilot = Autopilot::new(3);
        let prompt = ActionPrompt::new(ActionKind::EliminatorTarget, "pick")
            .with_targets(vec![1, 2, 4])
            .with_teammates(vec![1, 2]);
        for _ in 0..20 {
            assert_eq!(
                pilot.answer(&prompt),
                Some(Command::EliminatorTarget { target_id: 4 })
            );
        }
    }

    #[test]
    fn empty_target_list_gets_no_answer() {
        let mut pilot = Autopilot::new(4);
        let prompt = ActionPrompt::new(ActionKind::InvestigatorTarget, "check");
        assert_eq!(pilot.answer(&prompt), None);
    }
}
