use std::{fs, time::Duration};

use crop_rivals_core::{
    Carried, CropType, Event, GridSize, Interaction, LevelLayout, MatchReport, OrderLine,
    OrderSpec, Side,
};
use crop_rivals_simulation::{Config, NullSink, ScoreSink, Simulation};
use crop_rivals_system_ai_planner::PlannerState;
use crop_rivals_world::{level, query};
use glam::Vec2;

const PLAYER_FARM: &str = "........\n........\n1TM.....\n........\n";

fn small_field() -> Config {
    Config {
        columns: 8,
        rows: 4,
        tile_length: 10.0,
        agent_radius: 3.0,
        player_speed: 10.0,
        ai_path_speed: 10.0,
        ..Config::default()
    }
}

fn layout(text: &str, config: &Config) -> LevelLayout {
    let (layout, warnings) = level::parse(text, config.grid_size());
    assert!(warnings.is_empty(), "fixture layout is complete");
    layout
}

fn one_tomato() -> Vec<OrderSpec> {
    vec![OrderSpec::new(vec![OrderLine {
        crop: CropType::Tomato,
        quantity: 1,
    }])]
}

#[test]
fn player_input_runs_before_planning_and_time() {
    let config = small_field();
    let mut simulation =
        Simulation::with_orders(&config, layout(PLAYER_FARM, &config), one_tomato(), NullSink);
    let _ = simulation.drain_events();

    simulation.update(Duration::from_millis(500), Vec2::NEG_X);
    let events = simulation.drain_events();

    assert!(matches!(
        events.first(),
        Some(Event::AgentMoved {
            side: Side::Player,
            ..
        })
    ));
    assert!(matches!(events.last(), Some(Event::TimeAdvanced { .. })));
}

#[test]
fn player_fills_a_request_through_the_loop() {
    let config = small_field();
    let mut simulation =
        Simulation::with_orders(&config, layout(PLAYER_FARM, &config), one_tomato(), NullSink);

    simulation.update(Duration::from_millis(1500), Vec2::NEG_X);
    simulation.interact(Interaction::Take);
    assert_eq!(
        query::agent(simulation.world(), Side::Player).carried(),
        Carried::Seed(CropType::Tomato)
    );

    simulation.update(Duration::from_millis(500), Vec2::X);
    simulation.interact(Interaction::Drop);
    simulation.update(Duration::from_secs(4), Vec2::ZERO);
    simulation.interact(Interaction::Take);
    simulation.update(Duration::from_secs(1), Vec2::X);
    simulation.interact(Interaction::Drop);

    let events = simulation.drain_events();
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::RequestCompleted { .. })));
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::AllRequestsCompleted)));

    let tally = query::tally(simulation.world(), Side::Player);
    assert_eq!(tally.score, 5 + 3);
    assert_eq!(tally.completed_requests, 1);
    assert_eq!(query::tally(simulation.world(), Side::Ai).score, 0);

    simulation.update(Duration::from_millis(50), Vec2::ZERO);
    assert!(
        matches!(simulation.planner().state(), PlannerState::Idle { .. }),
        "nothing left to chase on the AI half"
    );
}

#[derive(Default)]
struct Recorder {
    reports: Vec<MatchReport>,
}

impl ScoreSink for Recorder {
    fn record(&mut self, report: &MatchReport) {
        self.reports.push(*report);
    }
}

#[test]
fn report_reaches_sink_only_at_game_over() {
    let config = Config {
        match_seconds: 2.0,
        ..small_field()
    };
    let mut simulation =
        Simulation::new(&config, LevelLayout::empty(GridSize::new(8, 4)), Recorder::default());

    for _ in 0..19 {
        simulation.update(Duration::from_millis(100), Vec2::ZERO);
    }
    assert!(simulation.sink().reports.is_empty());

    for _ in 0..30 {
        simulation.update(Duration::from_millis(100), Vec2::X);
    }
    assert!(simulation.is_over());
    assert_eq!(simulation.sink().reports.len(), 1);

    let ended = simulation
        .drain_events()
        .iter()
        .filter(|event| matches!(event, Event::MatchEnded { .. }))
        .count();
    assert_eq!(ended, 1);
}

#[test]
fn identical_seeds_replay_identically() {
    let config = Config {
        seed: 0xC0FFEE,
        columns: 10,
        rows: 6,
        tile_length: 20.0,
        agent_radius: 6.0,
        ai_path_speed: 80.0,
        match_seconds: 30.0,
        ..Config::default()
    };
    let text = ".....1...M\n.........3\n.....TTT..\n........4.\n.....TT...\n..........\n";

    let run = || {
        let mut simulation = Simulation::new(&config, layout(text, &config), NullSink);
        let mut log = Vec::new();
        for _ in 0..700 {
            simulation.update(Duration::from_millis(50), Vec2::ZERO);
            log.extend(simulation.drain_events());
        }
        log
    };

    let first = run();
    let second = run();
    assert!(first
        .iter()
        .any(|event| matches!(event, Event::MatchEnded { .. })));
    assert_eq!(first, second);
}

#[test]
fn config_file_drives_the_match() {
    let directory = tempfile::tempdir().expect("temporary directory");
    let path = directory.path().join("crop-rivals.toml");
    fs::write(&path, "columns = 8\nrows = 4\nlevel = 4\nmatch_seconds = 0.5\n")
        .expect("write config");

    let config = Config::load(&path).expect("config loads");
    let mut simulation =
        Simulation::new(&config, LevelLayout::empty(config.grid_size()), NullSink);

    assert_eq!(query::ledger(simulation.world()).requests().len(), 12);
    assert_eq!(query::remaining_time(simulation.world()), Duration::from_millis(500));

    simulation.update(Duration::from_secs(1), Vec2::ZERO);
    assert!(simulation.is_over());
}
