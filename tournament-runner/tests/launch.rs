use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tempfile::TempDir;
use tournament_runner::config::TournamentConfig;
use tournament_runner::player::PlayerFactory;
use tournament_runner::runner::{Runner, TournamentService};
use tournament_runner::status::{Broadcaster, TournamentState, TournamentStatus};
use tournament_runner::EngineFactory;

use crate::games::{
    broken_engine, fast_runner_config, practice_config, seat_order_engine,
};


fn init_logger() {
    let format = tracing_subscriber::fmt::format()
        .without_time()
        .with_ansi(true)
        .with_target(false);

    let _ = tracing_subscriber::fmt()
        .event_format(format)
        .with_max_level(tracing::Level::INFO)
        .try_init();
}

/// Run one tournament synchronously, capturing the full status stream.
fn run_tournament(
    dir: &Path,
    engine: Arc<dyn EngineFactory>,
    config: &TournamentConfig,
    id: &str,
) -> (anyhow::Result<()>, Vec<TournamentStatus>) {
    let broadcaster = Arc::new(Broadcaster::new());
    let runner = Runner::new(
        fast_runner_config(dir),
        engine,
        Arc::new(PlayerFactory::new()),
        Arc::clone(&broadcaster),
    );
    let updates = broadcaster.subscribe(id);
    let outcome = runner.run(id, config);
    (outcome, updates.try_iter().collect())
}

fn read_json(path: impl AsRef<Path>) -> serde_json::Value {
    let raw = std::fs::read_to_string(path.as_ref())
        .unwrap_or_else(|e| panic!("reading {}: {e}", path.as_ref().display()));
    serde_json::from_str(&raw).unwrap()
}

fn assert_monotone(statuses: &[TournamentStatus]) {
    for pair in statuses.windows(2) {
        assert!(
            pair[1].completed_games >= pair[0].completed_games,
            "completedGames regressed: {} -> {}",
            pair[0].completed_games,
            pair[1].completed_games
        );
        let regressed = matches!(
            (pair[0].state, pair[1].state),
            (TournamentState::Running, TournamentState::Queued)
                | (TournamentState::Completed, _)
        );
        assert!(!regressed, "state regressed: {:?} -> {:?}", pair[0].state, pair[1].state);
    }
}

#[test]
fn single_game_tournament_completes() {
    init_logger();
    let dir = TempDir::new().unwrap();
    let config = practice_config("solo", 1, 1, 4);
    let (outcome, statuses) = run_tournament(dir.path(), seat_order_engine(), &config, "t-solo");
    outcome.unwrap();

    assert_monotone(&statuses);
    assert_eq!(statuses.first().unwrap().completed_games, 0);
    let last = statuses.last().unwrap();
    assert_eq!(last.state, TournamentState::Completed);
    assert_eq!(last.completed_games, 1);
    assert_eq!(last.total_games, 1);

    let tape = read_json(dir.path().join("solo/tape.json"));
    assert_eq!(tape["events"].as_array().unwrap().len(), 1);
    assert!(dir.path().join("solo/round-01.json").exists());
}

#[test]
fn two_round_schedule_is_balanced() {
    init_logger();
    let dir = TempDir::new().unwrap();
    let config = practice_config("pairs", 2, 4, 4);
    let (outcome, statuses) = run_tournament(dir.path(), seat_order_engine(), &config, "t-pairs");
    outcome.unwrap();

    assert_monotone(&statuses);
    assert_eq!(statuses.last().unwrap().total_games, 8);
    assert_eq!(statuses.last().unwrap().completed_games, 8);

    for round in ["round-01.json", "round-02.json"] {
        let round = read_json(dir.path().join("pairs").join(round));
        let matches = round["matches"].as_array().unwrap();
        assert_eq!(matches.len(), 4, "4 players x 4 games / 4 seats");

        let mut appearances: HashMap<String, usize> = HashMap::new();
        for table in matches {
            let ids = table["playerIds"].as_array().unwrap();
            assert_eq!(ids.len(), 4);
            for id in ids {
                *appearances.entry(id.as_str().unwrap().to_string()).or_default() += 1;
            }
        }
        for count in appearances.values() {
            assert_eq!(*count, 4, "every player plays exactly 4 games per round");
        }
    }
}

#[test]
fn five_players_adjust_to_a_valid_schedule() {
    init_logger();
    let dir = TempDir::new().unwrap();
    // 5 x 3 is not divisible by 4; the runner adjusts to 4 games each.
    let config = practice_config("fiver", 1, 3, 5);
    let (outcome, statuses) = run_tournament(dir.path(), seat_order_engine(), &config, "t-fiver");
    outcome.unwrap();

    assert_eq!(statuses.last().unwrap().total_games, 5);

    let round = read_json(dir.path().join("fiver/round-01.json"));
    let matches = round["matches"].as_array().unwrap();
    assert_eq!(matches.len(), 5);

    let mut appearances: HashMap<String, usize> = HashMap::new();
    for table in matches {
        for id in table["playerIds"].as_array().unwrap() {
            *appearances.entry(id.as_str().unwrap().to_string()).or_default() += 1;
        }
    }
    for count in appearances.values() {
        assert_eq!(*count, 4);
    }
}

#[test]
fn broken_engine_still_completes_with_zero_scores() {
    init_logger();
    let dir = TempDir::new().unwrap();
    let config = practice_config("wreck", 1, 1, 4);
    let (outcome, statuses) = run_tournament(dir.path(), broken_engine(), &config, "t-wreck");
    outcome.unwrap();

    let last = statuses.last().unwrap();
    assert_eq!(last.state, TournamentState::Completed);
    assert_eq!(last.completed_games, 1);
    // Failed games carry no ordering signal; every rating stays at the
    // default display value.
    for rating in last.ratings.as_ref().unwrap().values() {
        assert_eq!(*rating, 0.0);
    }

    let round = read_json(dir.path().join("wreck/round-01.json"));
    for table in round["matches"].as_array().unwrap() {
        for game in table["outcomes"].as_array().unwrap() {
            for placement in game["placements"].as_array().unwrap() {
                assert_eq!(placement["score"], 0);
                assert!(placement.get("deck").is_none(), "failed games have no deck");
            }
        }
    }
}

#[test]
fn resume_skips_existing_rounds_and_keeps_their_files() {
    init_logger();
    let dir = TempDir::new().unwrap();
    let config = practice_config("resumable", 3, 1, 4);

    let (first, _) = run_tournament(dir.path(), seat_order_engine(), &config, "t-first");
    first.unwrap();

    let tournament_dir = dir.path().join("resumable");
    let round1_before = std::fs::read(tournament_dir.join("round-01.json")).unwrap();
    // Simulate a crash after round 1 was written.
    std::fs::remove_file(tournament_dir.join("round-02.json")).unwrap();
    std::fs::remove_file(tournament_dir.join("round-03.json")).unwrap();
    std::fs::remove_file(tournament_dir.join("tape.json")).unwrap();

    let (second, statuses) = run_tournament(dir.path(), seat_order_engine(), &config, "t-second");
    second.unwrap();

    let round1_after = std::fs::read(tournament_dir.join("round-01.json")).unwrap();
    assert_eq!(round1_before, round1_after, "resumed round file reused verbatim");
    assert!(tournament_dir.join("round-02.json").exists());
    assert!(tournament_dir.join("round-03.json").exists());

    // Counters were advanced past the resumed round before any dispatch.
    let first_status = statuses.first().unwrap();
    assert_eq!(first_status.completed_games, 1);
    assert_eq!(first_status.current_round, 1);
    assert_monotone(&statuses);

    let tape = read_json(tournament_dir.join("tape.json"));
    let events = tape["events"].as_array().unwrap();
    assert_eq!(events.len(), 3, "tape covers resumed and fresh rounds alike");
    let rounds: Vec<u64> = events.iter().map(|e| e["round"].as_u64().unwrap()).collect();
    assert_eq!(rounds, vec![1, 2, 3]);
    for (i, event) in events.iter().enumerate() {
        assert_eq!(event["seq"].as_u64().unwrap() as usize, i);
    }
}

#[test]
fn resubmitting_the_same_name_resumes_into_the_same_directory() {
    init_logger();
    let dir = TempDir::new().unwrap();
    let service = TournamentService::new(
        fast_runner_config(dir.path()),
        seat_order_engine(),
        Arc::new(PlayerFactory::new()),
    );
    let config = practice_config("twice", 1, 1, 4);

    let first = service.submit(config.clone()).unwrap();
    service.wait(&first);
    assert_eq!(service.status(&first).unwrap().state, TournamentState::Completed);
    let round1_before = std::fs::read(dir.path().join("twice/round-01.json")).unwrap();

    let second = service.submit(config).unwrap();
    service.wait(&second);
    assert_ne!(first, second, "each submission gets its own id");
    assert_eq!(service.status(&second).unwrap().state, TournamentState::Completed);

    let round1_after = std::fs::read(dir.path().join("twice/round-01.json")).unwrap();
    assert_eq!(round1_before, round1_after, "second run resumed, did not replay");
}

#[test]
fn malformed_config_is_rejected_at_admission() {
    init_logger();
    let dir = TempDir::new().unwrap();
    let service = TournamentService::new(
        fast_runner_config(dir.path()),
        seat_order_engine(),
        Arc::new(PlayerFactory::new()),
    );

    let mut config = practice_config("Bad Name", 1, 1, 4);
    assert!(service.submit(config.clone()).is_err());
    config.name = "ok-name".into();
    config.players.truncate(2);
    assert!(service.submit(config).is_err());
    assert!(service.all().is_empty(), "rejected tournaments never enter the registry");
}

#[test]
fn delay_wrapped_players_slow_games_down_but_complete() {
    init_logger();
    let dir = TempDir::new().unwrap();
    let mut config = practice_config("latency", 1, 1, 4);
    for player in &mut config.players {
        player.delay_wrap = true;
    }
    let (outcome, statuses) = run_tournament(dir.path(), seat_order_engine(), &config, "t-latency");
    outcome.unwrap();
    assert_eq!(statuses.last().unwrap().state, TournamentState::Completed);
}
