use std::{fs, time::Duration};

use crop_rivals_core::{
    Carried, Command, CropType, Event, GridSize, GroundCell, GroundType, GrowthState,
    Interaction, Level, LevelLayout, OrderLine, OrderSpec, Side, TileCoord, TileIndex,
};
use crop_rivals_world::{self as world, level, query, requests::RequestLedger, World};
use glam::Vec2;
use proptest::prelude::*;

#[test]
fn level_with_missing_rows_loads_with_empty_floor() {
    let directory = tempfile::tempdir().expect("temporary directory");
    let path = directory.path().join(level::file_name(Level::new(1)));
    fs::write(&path, "TTTT\n1MPE\nS..T\n").expect("write level");

    let size = GridSize::new(4, 6);
    let layout = level::load(&path, size);

    assert_eq!(layout.size(), size);
    assert_eq!(layout.cell(TileIndex::new(0)).ground, GroundType::Soil);
    assert_eq!(layout.cell(TileIndex::new(4)), GroundCell::seed_box(CropType::Tomato));
    for row in 3..6 {
        for column in 0..4 {
            let index = size
                .index_of(TileCoord::new(column, row))
                .expect("inside grid");
            assert_eq!(layout.cell(index), GroundCell::EMPTY, "row {row} column {column}");
        }
    }

    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::ConfigureMatch {
            setup: Box::new(world::default_setup(Level::new(1), layout, Vec::new())),
        },
        &mut events,
    );
    let grid = query::tile_grid(&world);
    assert!((0..size.tile_count() as u32).all(|slot| grid.is_walkable(TileIndex::new(slot))));
}

#[test]
fn missing_level_file_falls_back_to_empty_layout() {
    let directory = tempfile::tempdir().expect("temporary directory");
    let path = directory.path().join("level9.txt");
    let size = GridSize::new(5, 3);

    assert!(level::read(&path, size).is_err());
    assert_eq!(level::load(&path, size), LevelLayout::empty(size));
}

fn configure(layout: LevelLayout) -> World {
    let mut setup = world::default_setup(Level::new(1), layout, Vec::new());
    setup.tile_length = 10.0;
    setup.agent_radius = 3.0;
    setup.player_speed = 10.0;
    setup.match_duration = Duration::from_secs(3600);

    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::ConfigureMatch {
            setup: Box::new(setup),
        },
        &mut events,
    );
    world
}

/// Field whose player starts on an empty soil plot.
fn soil_world() -> World {
    let mut layout = LevelLayout::empty(GridSize::new(8, 4));
    let _ = layout.set(TileCoord::new(2, 2), GroundCell::plain(GroundType::Soil));
    configure(layout)
}

/// Field where the player took a carrot seed and planted it one tile to the left,
/// next to a water source.
fn seeded_world() -> World {
    let mut layout = LevelLayout::empty(GridSize::new(8, 4));
    let _ = layout.set(TileCoord::new(2, 2), GroundCell::seed_box(CropType::Carrot));
    let _ = layout.set(TileCoord::new(1, 2), GroundCell::plain(GroundType::Soil));
    let _ = layout.set(TileCoord::new(0, 2), GroundCell::plain(GroundType::WaterSource));
    let mut world = configure(layout);

    let mut events = Vec::new();
    for command in [
        Command::Interact {
            side: Side::Player,
            interaction: Interaction::Take,
        },
        Command::MoveAgent {
            side: Side::Player,
            direction: Vec2::NEG_X,
            dt: Duration::from_secs(1),
        },
        Command::Interact {
            side: Side::Player,
            interaction: Interaction::Drop,
        },
    ] {
        world::apply(&mut world, command, &mut events);
    }
    world
}

fn growth_at(world: &World, coord: TileCoord) -> GrowthState {
    query::tile_grid(world)
        .tile_at(coord)
        .map(|tile| tile.growth())
        .unwrap_or_default()
}

#[test]
fn watered_plot_grows_after_the_threshold() {
    let mut world = seeded_world();
    let plot = TileCoord::new(1, 2);
    let mut events = Vec::new();

    for command in [
        Command::MoveAgent {
            side: Side::Player,
            direction: Vec2::NEG_X,
            dt: Duration::from_millis(500),
        },
        Command::Interact {
            side: Side::Player,
            interaction: Interaction::Take,
        },
        Command::MoveAgent {
            side: Side::Player,
            direction: Vec2::X,
            dt: Duration::from_millis(500),
        },
        Command::Interact {
            side: Side::Player,
            interaction: Interaction::Drop,
        },
    ] {
        world::apply(&mut world, command, &mut events);
    }
    assert_eq!(growth_at(&world, plot), GrowthState::Watered);
    assert_eq!(query::agent(&world, Side::Player).carried(), Carried::Nothing);

    events.clear();
    world::apply(
        &mut world,
        Command::Tick {
            dt: Duration::from_millis(3_500),
        },
        &mut events,
    );
    assert_eq!(growth_at(&world, plot), GrowthState::Grown);
    assert_eq!(
        events
            .iter()
            .filter(|event| matches!(event, Event::CropGrown { crop: CropType::Carrot, .. }))
            .count(),
        1
    );
}

#[test]
fn empty_soil_never_grows() {
    let mut world = soil_world();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::Tick {
            dt: Duration::from_secs(30),
        },
        &mut events,
    );
    assert_eq!(growth_at(&world, TileCoord::new(2, 2)), GrowthState::Empty);
    assert!(!events.iter().any(|event| matches!(event, Event::CropGrown { .. })));
}

#[test]
fn drop_with_empty_hands_on_soil_does_nothing() {
    let mut world = soil_world();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::Interact {
            side: Side::Player,
            interaction: Interaction::Drop,
        },
        &mut events,
    );
    assert!(events.is_empty());
    assert_eq!(query::agent(&world, Side::Player).carried(), Carried::Nothing);
}

proptest! {
    #[test]
    fn growing_plot_reaches_grown_exactly_once(steps in prop::collection::vec(1u64..800, 1..60)) {
        let total: u64 = steps.iter().sum();
        prop_assume!(total > 3_000);

        let mut world = seeded_world();
        let plot = TileCoord::new(1, 2);
        prop_assert_eq!(growth_at(&world, plot), GrowthState::Seeded);

        let mut events = Vec::new();
        let mut grown = 0;
        let mut reached = false;
        for step in steps {
            events.clear();
            world::apply(&mut world, Command::Tick { dt: Duration::from_millis(step) }, &mut events);
            grown += events.iter().filter(|event| matches!(event, Event::CropGrown { .. })).count();

            let state = growth_at(&world, plot);
            if reached {
                prop_assert_eq!(state, GrowthState::Grown, "grown plot never regresses");
            }
            reached |= state == GrowthState::Grown;
        }

        prop_assert_eq!(grown, 1);
        prop_assert!(reached);
    }

    #[test]
    fn contributions_and_remaining_cover_initial_quantity(
        deliveries in prop::collection::vec((any::<bool>(), 0usize..5), 0..80)
    ) {
        let orders = vec![
            OrderSpec::new(vec![
                OrderLine { crop: CropType::Tomato, quantity: 3 },
                OrderLine { crop: CropType::Corn, quantity: 2 },
            ]),
            OrderSpec::new(vec![OrderLine { crop: CropType::Lettuce, quantity: 4 }]),
            OrderSpec::new(vec![
                OrderLine { crop: CropType::Carrot, quantity: 1 },
                OrderLine { crop: CropType::Potato, quantity: 5 },
                OrderLine { crop: CropType::Tomato, quantity: 2 },
            ]),
        ];
        let mut ledger = RequestLedger::new(&orders);
        let mut completions = 0;

        for (by_player, crop) in deliveries {
            let side = if by_player { Side::Player } else { Side::Ai };
            let _ = ledger.deliver(side, CropType::ALL[crop]);
            if ledger.try_complete().is_some() {
                completions += 1;
            }

            for request in ledger.requests() {
                let accounted: u32 = request
                    .items()
                    .iter()
                    .map(|item| {
                        item.contribution(Side::Player) + item.contribution(Side::Ai) + item.remaining()
                    })
                    .sum();
                prop_assert_eq!(accounted, request.total_quantity());
            }
        }

        let completed = ledger.requests().iter().filter(|request| request.is_completed()).count();
        prop_assert_eq!(completions, completed);
        prop_assert_eq!(ledger.current_index(), completed);
    }
}
