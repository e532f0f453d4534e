//! Integration tests for the match lifecycle: start, live score, completion, reschedule.

use bracket_engine::{
    add_friendly_match, generate_bracket, generate_round_robin, record_score, register_team,
    reschedule_match, set_format, set_match_venue, start_match, update_live_score, ErrorKind,
    Format, GenerationOptions, MatchId, MatchStatus, TeamId, Tournament, TournamentError,
};
use chrono::{TimeZone, Utc};

fn tournament_with_teams(format: Format, n: usize) -> (Tournament, Vec<TeamId>) {
    let mut t = Tournament::new("Test", format);
    let ids = (0..n)
        .map(|i| register_team(&mut t, &format!("Team {i}"), &[format!("Player {i}")]).unwrap())
        .collect();
    (t, ids)
}

/// 4-team cup; returns the first round-1 match id.
fn cup() -> (Tournament, Vec<TeamId>, MatchId) {
    let (mut t, ids) = tournament_with_teams(Format::Cup, 4);
    generate_bracket(&mut t, &ids, &GenerationOptions::default()).unwrap();
    let id = t.matches[0].id;
    (t, ids, id)
}

#[test]
fn decisive_cup_score_completes_with_home_winner() {
    let (mut t, ids, id) = cup();
    let live = start_match(&mut t, id).unwrap().clone();
    assert_eq!(live.status, MatchStatus::Live);
    assert_eq!((live.home_score, live.away_score), (Some(0), Some(0)));

    let done = record_score(&mut t, id, 3, 2, live.version).unwrap();
    assert_eq!(done.status, MatchStatus::Completed);
    assert_eq!(done.winner, Some(ids[0]));
    assert_eq!((done.home_score, done.away_score), (Some(3), Some(2)));
}

#[test]
fn cup_draw_is_rejected_and_leaves_match_live() {
    let (mut t, _, id) = cup();
    let live = start_match(&mut t, id).unwrap().clone();

    let err = record_score(&mut t, id, 2, 2, live.version).unwrap_err();
    assert_eq!(err, TournamentError::DrawNotAllowed);
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(t.get_match(id).unwrap(), &live);
}

#[test]
fn second_score_with_same_version_conflicts() {
    let (mut t, _, id) = cup();
    let version = start_match(&mut t, id).unwrap().version;
    record_score(&mut t, id, 1, 0, version).unwrap();

    let err = record_score(&mut t, id, 0, 1, version).unwrap_err();
    assert!(matches!(err, TournamentError::StaleVersion { .. }));
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(t.get_match(id).unwrap().home_score, Some(1));

    // Even with a fresh version a completed match stays completed.
    let current = t.get_match(id).unwrap().version;
    assert!(matches!(
        record_score(&mut t, id, 0, 1, current),
        Err(TournamentError::InvalidTransition {
            status: MatchStatus::Completed,
            ..
        })
    ));
}

#[test]
fn start_rules() {
    let (mut t, ids) = tournament_with_teams(Format::Cup, 3);
    generate_bracket(&mut t, &ids, &GenerationOptions::default()).unwrap();

    let bye = t.matches.iter().find(|m| m.is_bye).unwrap().id;
    assert_eq!(start_match(&mut t, bye).unwrap_err(), TournamentError::ByeMatch(bye));

    let waiting = t.matches.iter().find(|m| m.round_ordinal == 2).unwrap().id;
    let err = start_match(&mut t, waiting).unwrap_err();
    assert_eq!(err, TournamentError::MatchNotReady(waiting));
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let real = t.matches.iter().find(|m| m.round_ordinal == 1 && !m.is_bye).unwrap().id;
    start_match(&mut t, real).unwrap();
    assert!(matches!(
        start_match(&mut t, real),
        Err(TournamentError::InvalidTransition {
            status: MatchStatus::Live,
            ..
        })
    ));

    let missing = uuid::Uuid::new_v4();
    assert_eq!(
        start_match(&mut t, missing).unwrap_err().kind(),
        ErrorKind::NotFound
    );
}

#[test]
fn skipping_live_requires_the_policy_flag() {
    let (mut t, _, id) = cup();
    let err = record_score(&mut t, id, 2, 0, 0).unwrap_err();
    assert!(matches!(
        err,
        TournamentError::InvalidTransition {
            status: MatchStatus::Scheduled,
            ..
        }
    ));

    t.settings.allow_skip_live = true;
    let done = record_score(&mut t, id, 2, 0, 0).unwrap();
    assert_eq!(done.status, MatchStatus::Completed);
}

#[test]
fn bye_never_takes_a_score() {
    let (mut t, ids) = tournament_with_teams(Format::Cup, 3);
    t.settings.allow_skip_live = true;
    generate_bracket(&mut t, &ids, &GenerationOptions::default()).unwrap();
    let bye = t.matches.iter().find(|m| m.is_bye).unwrap().clone();
    assert_eq!(
        record_score(&mut t, bye.id, 1, 0, bye.version).unwrap_err(),
        TournamentError::ByeMatch(bye.id)
    );
}

#[test]
fn league_draw_leaves_winner_unset() {
    let (mut t, ids) = tournament_with_teams(Format::Liga, 4);
    generate_round_robin(&mut t, &ids, &GenerationOptions::default()).unwrap();
    let id = t.matches[0].id;
    let version = start_match(&mut t, id).unwrap().version;

    let done = record_score(&mut t, id, 2, 2, version).unwrap();
    assert_eq!(done.status, MatchStatus::Completed);
    assert_eq!(done.winner, None);
    assert!(done.is_draw());
}

#[test]
fn live_score_updates_bump_the_version() {
    let (mut t, ids, id) = cup();
    let v0 = start_match(&mut t, id).unwrap().version;
    let v1 = update_live_score(&mut t, id, 1, 0, v0).unwrap().version;
    assert_eq!(v1, v0 + 1);
    assert_eq!(t.get_match(id).unwrap().status, MatchStatus::Live);

    assert!(matches!(
        update_live_score(&mut t, id, 2, 0, v0),
        Err(TournamentError::StaleVersion { .. })
    ));
    let done = record_score(&mut t, id, 1, 2, v1).unwrap();
    assert_eq!(done.winner, Some(ids[3]));
}

#[test]
fn reschedule_and_venue_only_while_scheduled() {
    let (mut t, _, id) = cup();
    let when = Utc.with_ymd_and_hms(2026, 5, 2, 19, 30, 0).unwrap();
    let m = reschedule_match(&mut t, id, when).unwrap();
    assert_eq!(m.scheduled_at, Some(when));
    assert_eq!(m.version, 1);

    let m = set_match_venue(&mut t, id, Some("  Court 2 ".to_string())).unwrap();
    assert_eq!(m.venue.as_deref(), Some("Court 2"));

    start_match(&mut t, id).unwrap();
    assert!(matches!(
        reschedule_match(&mut t, id, when),
        Err(TournamentError::InvalidTransition { .. })
    ));
    assert!(matches!(
        set_match_venue(&mut t, id, None),
        Err(TournamentError::InvalidTransition { .. })
    ));
}

#[test]
fn friendly_matches_for_fun_format() {
    let (mut t, ids) = tournament_with_teams(Format::Fun, 3);
    t.venue = Some("Park".to_string());
    let a = add_friendly_match(&mut t, ids[0], ids[1], None, None).unwrap();
    let b = add_friendly_match(&mut t, ids[1], ids[2], None, Some("Gym".to_string())).unwrap();
    assert_eq!(t.rounds.len(), 1);
    assert_eq!(t.get_match(a).unwrap().venue.as_deref(), Some("Park"));
    assert_eq!(t.get_match(b).unwrap().position, 2);

    assert_eq!(
        add_friendly_match(&mut t, ids[0], ids[0], None, None).unwrap_err(),
        TournamentError::SameTeam
    );

    let v = start_match(&mut t, a).unwrap().version;
    assert_eq!(record_score(&mut t, a, 0, 0, v).unwrap().winner, None);

    assert_eq!(
        set_format(&mut t, Format::Cup).unwrap_err(),
        TournamentError::FormatLocked
    );
}

#[test]
fn friendly_matches_require_fun_format() {
    let (mut t, ids) = tournament_with_teams(Format::Liga, 2);
    assert!(matches!(
        add_friendly_match(&mut t, ids[0], ids[1], None, None),
        Err(TournamentError::WrongFormat {
            expected: Format::Fun,
            actual: Format::Liga
        })
    ));
}
