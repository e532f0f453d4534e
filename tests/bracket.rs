//! Integration tests for cup brackets: generation, byes, advancement and champion.

use bracket_engine::{
    draw_seeds, generate_bracket, generate_schedule, propagate_winner, record_score,
    register_team, start_match, withdraw_team, Advance, ErrorKind, Format, GenerationOptions,
    MatchStatus, Slot, TeamId, Tournament, TournamentError,
};
use chrono::{TimeZone, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn cup_with_teams(n: usize) -> (Tournament, Vec<TeamId>) {
    let mut t = Tournament::new("Cup", Format::Cup);
    t.settings.allow_skip_live = true;
    let ids = (0..n)
        .map(|i| register_team(&mut t, &format!("Team {i}"), &[format!("Player {i}")]).unwrap())
        .collect();
    (t, ids)
}

fn expected_rounds(n: usize) -> u32 {
    let mut rounds = 0;
    while (1usize << rounds) < n {
        rounds += 1;
    }
    rounds
}

/// Play every ready match, home side winning 2-1, until nothing is left.
fn play_out(t: &mut Tournament) {
    loop {
        let next = t
            .matches
            .iter()
            .find(|m| m.status == MatchStatus::Scheduled && m.is_ready())
            .map(|m| (m.id, m.version));
        let Some((id, version)) = next else { break };
        record_score(t, id, 2, 1, version).unwrap();
    }
}

#[test]
fn round_and_match_counts_for_all_sizes() {
    for n in 2..=33 {
        let (mut t, ids) = cup_with_teams(n);
        let schedule = generate_bracket(&mut t, &ids, &GenerationOptions::default()).unwrap();
        let size = n.next_power_of_two();

        assert_eq!(schedule.rounds.len() as u32, expected_rounds(n), "n={n}");
        let real = schedule.matches.iter().filter(|m| !m.is_bye).count();
        let byes = schedule.matches.iter().filter(|m| m.is_bye).count();
        assert_eq!(real, n - 1, "n={n}");
        assert_eq!(byes, size - n, "n={n}");

        let last = schedule.rounds.len() as u32;
        let finals: Vec<_> = schedule.matches.iter().filter(|m| m.round_ordinal == last).collect();
        assert_eq!(finals.len(), 1);

        let ordinals: Vec<u32> = schedule.rounds.iter().map(|r| r.ordinal).collect();
        assert_eq!(ordinals, (1..=last).collect::<Vec<_>>());
    }
}

#[test]
fn five_teams_get_three_byes_feeding_round_two() {
    let (mut t, ids) = cup_with_teams(5);
    generate_bracket(&mut t, &ids, &GenerationOptions::default()).unwrap();

    let round1: Vec<_> = t.matches.iter().filter(|m| m.round_ordinal == 1).collect();
    assert_eq!(round1.len(), 4);
    assert_eq!(round1.iter().filter(|m| m.is_bye).count(), 3);
    assert_eq!(round1.iter().filter(|m| !m.is_bye).count(), 1);

    // Seeds 1-3 have byes; 4 plays 5.
    let real = round1.iter().find(|m| !m.is_bye).unwrap();
    assert_eq!(real.home, Some(ids[3]));
    assert_eq!(real.away, Some(ids[4]));
    let (real_id, real_version) = (real.id, real.version);
    for bye in round1.iter().filter(|m| m.is_bye) {
        assert_eq!(bye.status, MatchStatus::Completed);
        assert_eq!(bye.winner, bye.home);
        assert_eq!(bye.away, None);
        assert_eq!(bye.home_score, None);
        assert_eq!(bye.away_score, None);
    }

    // Byes are already advanced: three of round 2's four slots are filled.
    let round2: Vec<_> = t.matches.iter().filter(|m| m.round_ordinal == 2).collect();
    assert_eq!(round2.len(), 2);
    let filled = round2
        .iter()
        .map(|m| m.home.is_some() as usize + m.away.is_some() as usize)
        .sum::<usize>();
    assert_eq!(filled, 3);
    assert_eq!(round2[0].home, Some(ids[0]));
    assert_eq!(round2[0].away, None);
    assert_eq!(round2[1].home, Some(ids[1]));
    assert_eq!(round2[1].away, Some(ids[2]));

    // The real match's winner fills the fourth slot.
    record_score(&mut t, real_id, 0, 3, real_version).unwrap();
    let round2_first = t
        .matches
        .iter()
        .find(|m| m.round_ordinal == 2 && m.position == 1)
        .unwrap();
    assert_eq!(round2_first.away, Some(ids[4]));
}

#[test]
fn two_teams_play_a_single_final() {
    let (mut t, ids) = cup_with_teams(2);
    generate_bracket(&mut t, &ids, &GenerationOptions::default()).unwrap();
    assert_eq!(t.rounds.len(), 1);
    assert_eq!(t.matches.len(), 1);
    assert!(t.champion.is_none());

    let m = t.matches[0].clone();
    record_score(&mut t, m.id, 1, 4, m.version).unwrap();
    assert_eq!(t.champion, Some(ids[1]));
}

#[test]
fn playing_out_crowns_top_seed_and_losers_disappear() {
    for n in [3, 6, 8, 11] {
        let (mut t, ids) = cup_with_teams(n);
        generate_bracket(&mut t, &ids, &GenerationOptions::default()).unwrap();
        play_out(&mut t);

        assert!(t.matches.iter().all(|m| m.status == MatchStatus::Completed));
        assert_eq!(t.champion, Some(ids[0]), "n={n}");

        for m in t.matches.iter().filter(|m| !m.is_bye) {
            let loser = m.loser().unwrap();
            assert!(
                t.matches
                    .iter()
                    .filter(|later| later.round_ordinal > m.round_ordinal)
                    .all(|later| !later.involves(loser)),
                "eliminated team reappeared (n={n})"
            );
        }
        for round in 1..=t.round_count() {
            let mut seen = Vec::new();
            for m in t.matches.iter().filter(|m| m.round_ordinal == round) {
                for team in [m.home, m.away].into_iter().flatten() {
                    assert!(!seen.contains(&team), "team twice in round {round}");
                    seen.push(team);
                }
            }
        }
    }
}

#[test]
fn winners_go_home_for_odd_positions_and_away_for_even() {
    let (mut t, ids) = cup_with_teams(8);
    generate_bracket(&mut t, &ids, &GenerationOptions::default()).unwrap();

    let first = t.matches[0].clone();
    let second = t.matches[1].clone();
    let outcome_first = {
        record_score(&mut t, first.id, 1, 0, first.version).unwrap();
        propagate_winner(&mut t, first.id).unwrap()
    };
    assert!(matches!(
        outcome_first,
        Advance::AlreadyPlaced { slot: Slot::Home, .. }
    ));
    record_score(&mut t, second.id, 0, 1, second.version).unwrap();

    let target = t
        .matches
        .iter()
        .find(|m| m.round_ordinal == 2 && m.position == 1)
        .unwrap();
    assert_eq!(target.home, first.home);
    assert_eq!(target.away, second.away);
}

#[test]
fn repeated_propagation_is_a_no_op() {
    let (mut t, ids) = cup_with_teams(4);
    generate_bracket(&mut t, &ids, &GenerationOptions::default()).unwrap();
    let m = t.matches[0].clone();
    record_score(&mut t, m.id, 5, 2, m.version).unwrap();

    let before = t.matches.clone();
    for _ in 0..3 {
        let outcome = propagate_winner(&mut t, m.id).unwrap();
        assert!(matches!(outcome, Advance::AlreadyPlaced { .. }));
    }
    assert_eq!(t.matches, before);

    play_out(&mut t);
    let champion = t.champion;
    let final_id = t.matches.iter().find(|m| m.round_ordinal == 2).unwrap().id;
    assert_eq!(
        propagate_winner(&mut t, final_id).unwrap(),
        Advance::Champion(champion.unwrap())
    );
    assert_eq!(t.champion, champion);
}

#[test]
fn occupied_target_slot_aborts_the_score_update() {
    let (mut t, ids) = cup_with_teams(4);
    generate_bracket(&mut t, &ids, &GenerationOptions::default()).unwrap();
    let m = t.matches[0].clone();

    // Corrupt the downstream slot with a team that did not play in the feeder.
    let target = t
        .matches
        .iter_mut()
        .find(|x| x.round_ordinal == 2 && x.position == 1)
        .unwrap();
    target.home = Some(ids[2]);

    let err = record_score(&mut t, m.id, 3, 1, m.version).unwrap_err();
    assert!(matches!(err, TournamentError::SlotOccupied { .. }));
    assert_eq!(err.kind(), ErrorKind::Invariant);

    let restored = t.get_match(m.id).unwrap();
    assert_eq!(restored, &m);
    assert_eq!(restored.status, MatchStatus::Scheduled);
}

#[test]
fn generation_rejects_bad_rosters() {
    let (mut t, ids) = cup_with_teams(3);
    let opts = GenerationOptions::default();

    assert_eq!(
        generate_bracket(&mut t, &ids[..1], &opts).unwrap_err(),
        TournamentError::NotEnoughTeams { count: 1 }
    );
    assert_eq!(
        generate_bracket(&mut t, &[ids[0], ids[1], ids[0]], &opts).unwrap_err(),
        TournamentError::DuplicateTeam(ids[0])
    );
    let stranger = uuid::Uuid::new_v4();
    assert_eq!(
        generate_bracket(&mut t, &[ids[0], stranger], &opts).unwrap_err(),
        TournamentError::TeamNotFound(stranger)
    );
    withdraw_team(&mut t, ids[2]).unwrap();
    let err = generate_bracket(&mut t, &ids, &opts).unwrap_err();
    assert_eq!(err, TournamentError::TeamWithdrawn(ids[2]));
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(t.matches.is_empty());

    let mut league = Tournament::new("League", Format::Liga);
    assert!(matches!(
        generate_bracket(&mut league, &ids, &opts),
        Err(TournamentError::WrongFormat { .. })
    ));
}

#[test]
fn reseed_allowed_until_a_match_starts() {
    let (mut t, ids) = cup_with_teams(6);
    let opts = GenerationOptions::default();
    generate_bracket(&mut t, &ids, &opts).unwrap();

    let mut reversed = ids.clone();
    reversed.reverse();
    generate_bracket(&mut t, &reversed, &opts).unwrap();
    let first_bye = t.matches.iter().find(|m| m.is_bye).unwrap();
    assert_eq!(first_bye.home, Some(reversed[0]));

    let playable = t.matches.iter().find(|m| !m.is_bye && m.is_ready()).unwrap().id;
    start_match(&mut t, playable).unwrap();
    let before = t.matches.clone();
    assert_eq!(
        generate_bracket(&mut t, &ids, &opts).unwrap_err(),
        TournamentError::ScheduleLocked
    );
    assert_eq!(t.matches, before);
}

#[test]
fn identical_seeds_give_identical_structure() {
    let (mut t, ids) = cup_with_teams(7);
    let opts = GenerationOptions::default();
    let a = generate_bracket(&mut t, &ids, &opts).unwrap();
    let b = generate_bracket(&mut t, &ids, &opts).unwrap();
    let shape = |s: &bracket_engine::Schedule| {
        s.matches
            .iter()
            .map(|m| (m.round_ordinal, m.position, m.home, m.away, m.is_bye, m.status))
            .collect::<Vec<_>>()
    };
    assert_eq!(shape(&a), shape(&b));
}

#[test]
fn generation_options_stamp_kickoff_and_venue() {
    let (mut t, ids) = cup_with_teams(4);
    let start = Utc.with_ymd_and_hms(2026, 3, 1, 18, 0, 0).unwrap();
    let opts = GenerationOptions {
        first_round_at: Some(start),
        days_between_rounds: 2,
        venue: Some("Main hall".to_string()),
    };
    generate_bracket(&mut t, &ids, &opts).unwrap();
    for m in &t.matches {
        let days = i64::from(m.round_ordinal - 1) * 2;
        assert_eq!(m.scheduled_at, Some(start + chrono::Duration::days(days)));
        assert_eq!(m.venue.as_deref(), Some("Main hall"));
    }
}

#[test]
fn schedule_dispatch_uses_active_teams_in_registration_order() {
    let (mut t, ids) = cup_with_teams(5);
    withdraw_team(&mut t, ids[4]).unwrap();
    generate_schedule(&mut t, &GenerationOptions::default()).unwrap();
    assert_eq!(t.rounds.len(), 2);
    assert!(t.matches.iter().all(|m| !m.involves(ids[4])));
    assert_eq!(t.matches[0].home, Some(ids[0]));
    assert!(t.team(ids[4]).is_some());

    let mut fun = Tournament::new("Friendlies", Format::Fun);
    assert_eq!(
        generate_schedule(&mut fun, &GenerationOptions::default()).unwrap_err(),
        TournamentError::NoGenerator(Format::Fun)
    );
}

#[test]
fn seed_draw_is_reproducible_with_a_seeded_rng() {
    let (_, ids) = cup_with_teams(12);
    let a = draw_seeds(&ids, &mut StdRng::seed_from_u64(7));
    let b = draw_seeds(&ids, &mut StdRng::seed_from_u64(7));
    assert_eq!(a, b);

    let mut sorted_a = a.clone();
    sorted_a.sort();
    let mut sorted_ids = ids.clone();
    sorted_ids.sort();
    assert_eq!(sorted_a, sorted_ids);
}
