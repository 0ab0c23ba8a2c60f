//! Prompt text for the LLM provider, built from a participant's visible state.

use std::fmt::Write as _;

use crate::domain::{ParticipantId, Role, VisibleState};

fn roster(view: &VisibleState, alive: bool) -> String {
    let names: Vec<String> = view
        .participants
        .iter()
        .filter(|p| p.alive == alive)
        .map(|p| format!("{} (#{})", p.name, p.id))
        .collect();
    if names.is_empty() {
        "none".to_string()
    } else {
        names.join(", ")
    }
}

fn target_list(view: &VisibleState, valid: &[ParticipantId]) -> String {
    valid
        .iter()
        .map(|id| format!("#{id} {}", view.name_of(*id).unwrap_or("?")))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn system_prompt(view: &VisibleState) -> String {
    let role = view.role.unwrap_or(Role::Bystander);
    let mut out = String::new();
    let _ = writeln!(
        out,
        "You are {} (#{}) in a social deduction game. Your secret role: {}.",
        view.viewer_name,
        view.viewer_id,
        role.display_name()
    );
    let _ = writeln!(out, "{}", role.description());
    let _ = writeln!(out, "Round {}.", view.round);
    let _ = writeln!(out, "Alive: {}.", roster(view, true));
    let _ = writeln!(out, "Eliminated: {}.", roster(view, false));

    if role == Role::Eliminator {
        if view.teammates.is_empty() {
            let _ = writeln!(out, "You have no teammates.");
        } else {
            let mates = view
                .teammates
                .iter()
                .map(|id| format!("#{id}"))
                .collect::<Vec<_>>()
                .join(", ");
            let _ = writeln!(out, "Your teammates: {mates}. Never expose them.");
        }
    }
    for record in &view.investigations {
        let verdict = if record.is_hostile { "HOSTILE" } else { "not hostile" };
        let _ = writeln!(
            out,
            "You investigated #{} in round {}: {verdict}.",
            record.target_id, record.round
        );
    }
    let _ = write!(out, "Stay in character and keep answers short.");
    out
}

fn speech_history(view: &VisibleState) -> String {
    let lines: Vec<String> = view
        .speeches_this_round()
        .map(|s| {
            format!(
                "{} (#{}): {}",
                view.name_of(s.speaker_id).unwrap_or("?"),
                s.speaker_id,
                s.text
            )
        })
        .collect();
    if lines.is_empty() {
        "No one has spoken yet.".to_string()
    } else {
        lines.join("\n")
    }
}

pub fn speech_prompt(view: &VisibleState) -> String {
    format!(
        "Today's discussion so far:\n{}\n\nIt is your turn to speak. Reply with one or two \
         sentences of what you say out loud, nothing else.",
        speech_history(view)
    )
}

pub fn vote_prompt(view: &VisibleState, valid: &[ParticipantId]) -> String {
    format!(
        "Today's discussion:\n{}\n\nVote to eliminate one of: {}.\nReply with the number only.",
        speech_history(view),
        target_list(view, valid)
    )
}

pub fn night_target_prompt(role: Role, view: &VisibleState, valid: &[ParticipantId]) -> String {
    let ask = match role {
        Role::Eliminator => "Choose tonight's target to eliminate",
        Role::Investigator => "Choose one participant to investigate",
        Role::Retaliator => "You have been eliminated. Choose one participant to take with you",
        _ => "Choose one participant",
    };
    format!(
        "{ask} from: {}.\nReply with the number only.",
        target_list(view, valid)
    )
}

pub fn protect_prompt(view: &VisibleState) -> String {
    let target = view
        .eliminator_target
        .map(|id| format!("#{id} {}", view.name_of(id).unwrap_or("?")))
        .unwrap_or_else(|| "nobody".to_string());
    format!(
        "Tonight the eliminators chose {target}. You have one protection left. \
         Reply SAVE to protect them or PASS to keep it."
    )
}

pub fn poison_prompt(view: &VisibleState, valid: &[ParticipantId]) -> String {
    format!(
        "You have one poison left. Reply with the number of a participant to poison ({}), \
         or NONE to keep it.",
        target_list(view, valid)
    )
}
