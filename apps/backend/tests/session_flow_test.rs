mod common;

use common::{announcements, position, prompt_kinds, scripted, Table};
use nightfall_backend::ai::ScriptedProvider;
use nightfall_backend::domain::{
    DeathCause, GameResult, InvestigationRecord, Phase, Role, Status,
};
use nightfall_backend::protocol::{ActionKind, Command, GameEvent};
use nightfall_backend::Suspension;

fn night_deaths(events: &[GameEvent]) -> Vec<Vec<nightfall_backend::domain::DeathRecord>> {
    events
        .iter()
        .filter_map(|e| match e {
            GameEvent::NightResult { deaths, .. } => Some(deaths.clone()),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn protector_save_gives_a_peaceful_night() {
    let provider = scripted(
        ScriptedProvider::new()
            .night_targets(Role::Eliminator, [3])
            .night_targets(Role::Investigator, [1])
            .protect([true]),
    );
    let mut table = Table::build(6, provider);
    table.start().await;

    assert_eq!(
        table.controller.suspension(),
        Suspension::AwaitingSpeech { speaker: 6 }
    );
    let state = table.controller.state();
    assert_eq!(state.alive_count(), 7);
    assert_eq!(state.charges.protect, 0);
    assert_eq!(state.charges.poison, 1);
    assert_eq!(state.phase, Phase::DayDiscuss);

    let events = table.events();
    assert_eq!(night_deaths(&events), vec![vec![]]);
    assert!(announcements(&events)
        .iter()
        .any(|m| m.contains("peaceful")));

    // The autonomous investigator's finding is logged but never shown to the human.
    assert_eq!(
        state.investigations(),
        &[InvestigationRecord {
            round: 1,
            investigator_id: 3,
            target_id: 1,
            is_hostile: true,
        }]
    );
    assert!(!table.kinds().contains(&"investigation_result"));
}

#[tokio::test]
async fn tied_vote_skips_execution_and_starts_the_next_night() {
    let provider = scripted(
        ScriptedProvider::new()
            .night_targets(Role::Eliminator, [3, 7])
            .night_targets(Role::Investigator, [1, 2])
            .protect([true])
            .votes_for(1, [3])
            .votes_for(2, [3])
            .votes_for(3, [1])
            .votes_for(4, [1])
            .votes_for(5, [2])
            .votes_for(7, [2]),
    );
    let mut table = Table::build(6, provider);
    table.start().await;

    table
        .send(Command::Speak {
            content: "Nobody has given me a reason to trust them.".into(),
        })
        .await;
    assert_eq!(table.controller.suspension(), Suspension::AwaitingBeginVoting);

    table.send(Command::BeginVoting).await;
    assert_eq!(
        table.controller.suspension(),
        Suspension::AwaitingVote { voter: 6 }
    );
    assert_eq!(table.controller.state().votes().len(), 6);

    table.send(Command::Vote { target_id: 5 }).await;

    let events = table.events();
    let result = position(&events, |e| {
        matches!(
            e,
            GameEvent::VoteResult {
                is_tie: true,
                executed_id: None,
                ..
            }
        )
    })
    .expect("tied vote result");
    let second_night = position(&events, |e| {
        matches!(
            e,
            GameEvent::PhaseChange {
                phase: Phase::Night,
                round: 2,
                ..
            }
        )
    })
    .expect("second night");
    assert!(result < second_night);
    assert!(!prompt_kinds(&events).contains(&ActionKind::EnterNight));

    // Night two: the protection charge is spent, so the target dies.
    let state = table.controller.state();
    assert_eq!(state.round(), 2);
    assert_eq!(state.alive_count(), 6);
    assert!(!state.is_alive(7));
    assert!(state.votes().is_empty());
    assert_eq!(
        table.controller.suspension(),
        Suspension::AwaitingSpeech { speaker: 6 }
    );
}

#[tokio::test]
async fn executed_retaliator_shot_hands_hostiles_the_win() {
    let provider = scripted(
        ScriptedProvider::new()
            .night_targets(Role::Eliminator, [3])
            .night_targets(Role::Investigator, [1])
            .night_targets(Role::Retaliator, [4])
            .protect([false])
            .votes_for(1, [5])
            .votes_for(2, [5])
            .votes_for(4, [5])
            .votes_for(5, [1])
            .votes_for(7, [5]),
    );
    let mut table = Table::build(6, provider);
    table.start().await;

    // Seat 3 died overnight and gave a first-round statement before discussion.
    assert!(!table.controller.state().is_alive(3));
    assert_eq!(
        table.controller.suspension(),
        Suspension::AwaitingSpeech { speaker: 6 }
    );

    table
        .send(Command::Speak {
            content: "Five has been far too quiet.".into(),
        })
        .await;
    table.send(Command::BeginVoting).await;
    table.send(Command::Vote { target_id: 5 }).await;

    let state = table.controller.state();
    assert!(table.controller.is_finished());
    assert_eq!(state.result, GameResult::HostileWin);
    assert_eq!(state.participant(5).map(|p| p.status()), Some(Status::Eliminated));
    assert!(!state.is_alive(4));
    assert!(state.pending_retaliation.is_none());

    let events = table.events();
    let shot = position(&events, |e| {
        matches!(
            e,
            GameEvent::RetaliationResult {
                retaliator_id: 5,
                target_id: Some(4),
            }
        )
    })
    .expect("retaliation result");
    let over = position(&events, |e| matches!(e, GameEvent::GameOver { .. })).expect("game over");
    assert!(shot < over);

    match &events[over] {
        GameEvent::GameOver { result, roles } => {
            assert_eq!(*result, GameResult::HostileWin);
            assert_eq!(roles.len(), 7);
            assert!(roles
                .iter()
                .any(|r| r.id == 5 && r.role == Role::Retaliator));
        }
        other => panic!("expected game_over, got {other:?}"),
    }

    // Nothing is accepted once the game is over.
    let before = table.sink.len();
    table.send(Command::EnterNight).await;
    assert_eq!(table.sink.len(), before);
    assert_eq!(table.controller.suspension(), Suspension::Finished);
}

#[tokio::test]
async fn night_killed_retaliator_shoots_before_first_statements() {
    let provider = scripted(
        ScriptedProvider::new()
            .night_targets(Role::Eliminator, [5])
            .night_targets(Role::Investigator, [2])
            .night_targets(Role::Retaliator, [1])
            .protect([false])
            .speech("I was framed, look at seat two."),
    );
    let mut table = Table::build(6, provider);
    table.start().await;

    let state = table.controller.state();
    assert!(!state.is_alive(5));
    assert_eq!(state.participant(1).map(|p| p.status()), Some(Status::Eliminated));
    assert_eq!(
        table.controller.suspension(),
        Suspension::AwaitingSpeech { speaker: 6 }
    );

    // The shot victim is not owed a statement; the night victim is.
    let first = &state.speeches()[0];
    assert_eq!(first.speaker_id, 5);
    assert_eq!(first.phase, Phase::FinalStatement);
    assert_eq!(first.text, "I was framed, look at seat two.");
    assert!(state
        .speeches()
        .iter()
        .all(|s| s.speaker_id != 1));

    let events = table.events();
    let shot = position(&events, |e| matches!(e, GameEvent::RetaliationResult { .. }))
        .expect("retaliation result");
    let statement = position(&events, |e| {
        matches!(e, GameEvent::Speech { record, .. } if record.speaker_id == 5)
    })
    .expect("final statement");
    assert!(shot < statement);

    let deaths = night_deaths(&events);
    assert_eq!(deaths.len(), 1);
    assert_eq!(deaths[0][0].participant_id, 5);
    assert_eq!(deaths[0][0].cause, DeathCause::NightElimination);
}

#[tokio::test]
async fn human_eliminator_sees_teammates_and_bad_targets_are_ignored() {
    let provider = scripted(
        ScriptedProvider::new()
            .night_targets(Role::Investigator, [2])
            .protect([false]),
    );
    let mut table = Table::build(1, provider);
    table.start().await;

    assert_eq!(
        table.controller.suspension(),
        Suspension::AwaitingEliminatorTarget { actor: 1 }
    );
    let prompt = table.last_prompt().expect("prompt");
    assert_eq!(prompt.action, ActionKind::EliminatorTarget);
    assert_eq!(prompt.teammates, Some(vec![2]));
    assert_eq!(prompt.valid_targets, vec![1, 2, 3, 4, 5, 6, 7]);

    let assigned = table.events().into_iter().find_map(|e| match e {
        GameEvent::RoleAssigned {
            role, teammates, ..
        } => Some((role, teammates)),
        _ => None,
    });
    assert_eq!(assigned, Some((Role::Eliminator, vec![2])));

    let before = table.sink.len();
    table.send(Command::Vote { target_id: 3 }).await;
    table.send(Command::EliminatorTarget { target_id: 42 }).await;
    assert_eq!(table.sink.len(), before);
    assert_eq!(
        table.controller.suspension(),
        Suspension::AwaitingEliminatorTarget { actor: 1 }
    );

    table.send(Command::EliminatorTarget { target_id: 3 }).await;
    assert!(!table.controller.state().is_alive(3));
    // Seat 3 gives an autonomous statement, then seat 1 opens the discussion.
    assert_eq!(
        table.controller.suspension(),
        Suspension::AwaitingSpeech { speaker: 1 }
    );
}

#[tokio::test]
async fn dead_human_only_keeps_the_enter_night_gate() {
    let provider = scripted(
        ScriptedProvider::new()
            .night_targets(Role::Eliminator, [3])
            .protect([false])
            .votes_for(1, [4])
            .votes_for(2, [4])
            .votes_for(4, [2])
            .votes_for(5, [2])
            .votes_for(6, [2])
            .votes_for(7, [2]),
    );
    let mut table = Table::build(3, provider);
    table.start().await;

    assert_eq!(
        table.controller.suspension(),
        Suspension::AwaitingInvestigatorTarget { actor: 3 }
    );
    table.send(Command::InvestigatorTarget { target_id: 3 }).await;
    assert_eq!(
        table.controller.suspension(),
        Suspension::AwaitingInvestigatorTarget { actor: 3 }
    );
    table.send(Command::InvestigatorTarget { target_id: 1 }).await;

    let found = table.events().into_iter().find_map(|e| match e {
        GameEvent::InvestigationResult {
            target_id,
            is_hostile,
            ..
        } => Some((target_id, is_hostile)),
        _ => None,
    });
    assert_eq!(found, Some((1, true)));

    assert_eq!(
        table.controller.suspension(),
        Suspension::AwaitingFinalStatement { participant: 3 }
    );
    assert!(table.controller.deadline().is_some());
    let statement_prompt = table.sink.len();

    table
        .send(Command::FinalStatement {
            content: "Seat one is an eliminator.".into(),
        })
        .await;

    let state = table.controller.state();
    assert_eq!(state.participant(2).map(|p| p.status()), Some(Status::Eliminated));
    assert_eq!(table.controller.suspension(), Suspension::AwaitingEnterNight);

    let later = &table.events()[statement_prompt..];
    assert_eq!(prompt_kinds(later), vec![ActionKind::EnterNight]);
    assert!(!later.iter().any(|e| matches!(
        e,
        GameEvent::VoteCast { voter_id: 3, .. }
    )));

    table.send(Command::EnterNight).await;
    assert!(table.controller.state().round() >= 2);
    assert!(matches!(
        table.controller.suspension(),
        Suspension::AwaitingEnterNight | Suspension::Finished
    ));
}

#[tokio::test]
async fn commands_before_open_are_ignored() {
    let mut table = Table::build(6, scripted(ScriptedProvider::new()));
    table.send(Command::StartGame).await;
    assert!(table.sink.is_empty());
    assert_eq!(table.controller.suspension(), Suspension::Running);

    table.controller.open().await;
    assert_eq!(table.kinds(), vec!["game_created"]);
    assert_eq!(table.controller.suspension(), Suspension::AwaitingStart);

    table.send(Command::ConfirmRole).await;
    assert_eq!(table.kinds(), vec!["game_created"]);
    assert_eq!(table.controller.suspension(), Suspension::AwaitingStart);
}

#[tokio::test]
async fn invalid_provider_answer_is_retried() {
    let provider = scripted(
        ScriptedProvider::new()
            .night_targets(Role::Eliminator, [99, 4])
            .protect([false]),
    );
    let mut table = Table::build(6, provider);
    table.start().await;

    let deaths = night_deaths(&table.events());
    assert_eq!(deaths.len(), 1);
    assert_eq!(deaths[0].len(), 1);
    assert_eq!(deaths[0][0].participant_id, 4);
}

#[tokio::test]
async fn protector_may_save_and_poison_in_one_night() {
    let provider = scripted(
        ScriptedProvider::new()
            .night_targets(Role::Eliminator, [3])
            .night_targets(Role::Investigator, [1])
            .protect([true])
            .poison([Some(2)]),
    );
    let mut table = Table::build(6, provider);
    table.start().await;

    let state = table.controller.state();
    assert!(state.is_alive(3));
    assert_eq!(
        state.participant(2).map(|p| p.status()),
        Some(Status::EliminatedByToxin)
    );
    assert_eq!(state.charges.protect, 0);
    assert_eq!(state.charges.poison, 0);

    let deaths = night_deaths(&table.events());
    assert_eq!(deaths[0].len(), 1);
    assert_eq!(deaths[0][0].cause, DeathCause::Toxin);
}

#[tokio::test]
async fn human_protector_rejects_bad_poison_then_saves_and_poisons() {
    let provider = scripted(
        ScriptedProvider::new()
            .night_targets(Role::Eliminator, [3])
            .night_targets(Role::Investigator, [1]),
    );
    let mut table = Table::build(4, provider);
    table.start().await;

    assert_eq!(
        table.controller.suspension(),
        Suspension::AwaitingProtectorDecision { actor: 4 }
    );
    let prompt = table.last_prompt().expect("prompt");
    assert_eq!(prompt.action, ActionKind::ProtectorAction);
    assert_eq!(prompt.eliminator_target, Some(3));
    assert_eq!(prompt.can_save, Some(true));
    assert_eq!(prompt.can_poison, Some(true));
    assert_eq!(prompt.valid_targets, vec![1, 2, 3, 5, 6, 7]);

    // Poisoning oneself or an unknown seat leaves the night untouched.
    let before = table.sink.len();
    table
        .send(Command::ProtectorAction {
            save: true,
            poison_target: Some(4),
        })
        .await;
    table
        .send(Command::ProtectorAction {
            save: false,
            poison_target: Some(42),
        })
        .await;
    assert_eq!(table.sink.len(), before);
    assert_eq!(
        table.controller.suspension(),
        Suspension::AwaitingProtectorDecision { actor: 4 }
    );
    assert_eq!(table.controller.state().charges.protect, 1);
    assert_eq!(table.controller.state().charges.poison, 1);

    table
        .send(Command::ProtectorAction {
            save: true,
            poison_target: Some(2),
        })
        .await;

    let state = table.controller.state();
    assert!(state.is_alive(3));
    assert_eq!(
        state.participant(2).map(|p| p.status()),
        Some(Status::EliminatedByToxin)
    );
    assert_eq!(state.charges.protect, 0);
    assert_eq!(state.charges.poison, 0);
    // Seat 2 gives a first-round statement, seats 1 and 3 speak, then the human.
    assert_eq!(
        table.controller.suspension(),
        Suspension::AwaitingSpeech { speaker: 4 }
    );
}

#[tokio::test]
async fn human_protector_cannot_save_twice() {
    let provider = scripted(
        ScriptedProvider::new()
            .night_targets(Role::Eliminator, [3, 7])
            .night_targets(Role::Investigator, [1, 2])
            .votes_for(1, [3])
            .votes_for(2, [3])
            .votes_for(3, [1])
            .votes_for(5, [1])
            .votes_for(6, [2])
            .votes_for(7, [2]),
    );
    let mut table = Table::build(4, provider);
    table.start().await;

    table
        .send(Command::ProtectorAction {
            save: true,
            poison_target: None,
        })
        .await;
    assert!(table.controller.state().is_alive(3));
    assert_eq!(
        table.controller.suspension(),
        Suspension::AwaitingSpeech { speaker: 4 }
    );

    table
        .send(Command::Speak {
            content: "Quiet night. Someone is hiding.".into(),
        })
        .await;
    table.send(Command::BeginVoting).await;
    table.send(Command::Vote { target_id: 5 }).await;

    // Three-way tie, so the second night starts straight away.
    assert_eq!(table.controller.state().round(), 2);
    assert_eq!(
        table.controller.suspension(),
        Suspension::AwaitingProtectorDecision { actor: 4 }
    );
    let prompt = table.last_prompt().expect("prompt");
    assert_eq!(prompt.eliminator_target, Some(7));
    assert_eq!(prompt.can_save, Some(false));

    let before = table.sink.len();
    table
        .send(Command::ProtectorAction {
            save: true,
            poison_target: None,
        })
        .await;
    assert_eq!(table.sink.len(), before);
    assert_eq!(
        table.controller.suspension(),
        Suspension::AwaitingProtectorDecision { actor: 4 }
    );

    table
        .send(Command::ProtectorAction {
            save: false,
            poison_target: None,
        })
        .await;
    let state = table.controller.state();
    assert!(!state.is_alive(7));
    assert_eq!(state.charges.poison, 1);
    assert_eq!(
        table.controller.suspension(),
        Suspension::AwaitingSpeech { speaker: 4 }
    );
}

#[tokio::test]
async fn executed_human_retaliator_picks_a_target_and_night_follows() {
    let provider = scripted(
        ScriptedProvider::new()
            .night_targets(Role::Eliminator, [3, 3])
            .night_targets(Role::Investigator, [1])
            .protect([true])
            .votes_for(1, [5])
            .votes_for(2, [5])
            .votes_for(3, [5])
            .votes_for(4, [1])
            .votes_for(6, [5])
            .votes_for(7, [1]),
    );
    let mut table = Table::build(5, provider);
    table.start().await;

    assert_eq!(
        table.controller.suspension(),
        Suspension::AwaitingSpeech { speaker: 5 }
    );
    table
        .send(Command::Speak {
            content: "I have nothing to hide.".into(),
        })
        .await;
    table.send(Command::BeginVoting).await;
    table.send(Command::Vote { target_id: 1 }).await;

    assert_eq!(
        table.controller.state().participant(5).map(|p| p.status()),
        Some(Status::Eliminated)
    );
    assert_eq!(
        table.controller.suspension(),
        Suspension::AwaitingRetaliationTarget { retaliator: 5 }
    );
    let prompt = table.last_prompt().expect("prompt");
    assert_eq!(prompt.action, ActionKind::RetaliationTarget);
    assert_eq!(prompt.valid_targets, vec![1, 2, 3, 4, 6, 7]);

    // Oneself, an unknown seat and unrelated commands are all ignored.
    let before = table.sink.len();
    table.send(Command::RetaliationTarget { target_id: Some(5) }).await;
    table.send(Command::RetaliationTarget { target_id: Some(42) }).await;
    table.send(Command::EnterNight).await;
    assert_eq!(table.sink.len(), before);
    assert_eq!(
        table.controller.suspension(),
        Suspension::AwaitingRetaliationTarget { retaliator: 5 }
    );

    table.send(Command::RetaliationTarget { target_id: Some(1) }).await;

    let state = table.controller.state();
    assert_eq!(state.participant(1).map(|p| p.status()), Some(Status::Eliminated));
    assert!(state.pending_retaliation.is_none());
    assert!(state.round() >= 2);
    // The shot replaces the executed retaliator's final statement.
    assert!(state
        .speeches()
        .iter()
        .all(|s| !(s.speaker_id == 5 && s.phase == Phase::FinalStatement)));

    let events = table.events();
    let shot = position(&events, |e| {
        matches!(
            e,
            GameEvent::RetaliationResult {
                retaliator_id: 5,
                target_id: Some(1),
            }
        )
    })
    .expect("retaliation result");
    let second_night = position(&events, |e| {
        matches!(
            e,
            GameEvent::PhaseChange {
                phase: Phase::Night,
                round: 2,
                ..
            }
        )
    })
    .expect("second night");
    assert!(shot < second_night);
    assert!(!prompt_kinds(&events[shot..second_night]).contains(&ActionKind::EnterNight));
    assert!(!prompt_kinds(&events[shot..]).contains(&ActionKind::FinalStatement));
}

#[tokio::test]
async fn night_killed_human_retaliator_may_pass_before_their_statement() {
    let provider = scripted(
        ScriptedProvider::new()
            .night_targets(Role::Eliminator, [5])
            .night_targets(Role::Investigator, [1])
            .protect([false]),
    );
    let mut table = Table::build(5, provider);
    table.start().await;

    assert_eq!(
        table.controller.suspension(),
        Suspension::AwaitingRetaliationTarget { retaliator: 5 }
    );
    let before = table.sink.len();
    table.send(Command::FinalStatement { content: "Too early.".into() }).await;
    table.send(Command::RetaliationTarget { target_id: Some(5) }).await;
    assert_eq!(table.sink.len(), before);

    table.send(Command::RetaliationTarget { target_id: None }).await;

    let state = table.controller.state();
    assert_eq!(state.alive_count(), 6);
    assert!(state.pending_retaliation.is_none());
    assert_eq!(
        table.controller.suspension(),
        Suspension::AwaitingFinalStatement { participant: 5 }
    );

    let events = table.events();
    let pass = position(&events, |e| {
        matches!(
            e,
            GameEvent::RetaliationResult {
                retaliator_id: 5,
                target_id: None,
            }
        )
    })
    .expect("retaliation result");
    assert!(announcements(&events[pass..])
        .iter()
        .any(|m| m.ends_with("held their fire.")));
    assert_eq!(
        prompt_kinds(&events[pass..]),
        vec![ActionKind::FinalStatement]
    );
}
