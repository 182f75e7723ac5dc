use cascade_crush::core::{
    find_matches, Board, Event, LevelConfig, Objective, Rejection, RunState, ScriptedRng,
};
use cascade_crush::types::{Coord, SpecialKind, Token};

// (2,3) and (3,3) swap to line up row 3, cols 1-4, in color 1.
const RUN_OF_FOUR: [&str; 6] = [
    "012345", //
    "234501", //
    "450123", //
    "511213", //
    "023450", //
    "345012", //
];

// Red run already sitting in row 2.
const RED_ROW: [&str; 6] = [
    "123451", //
    "345123", //
    "000234", //
    "451345", //
    "234512", //
    "512431", //
];

fn level(moves: u32, objective: Objective) -> LevelConfig {
    LevelConfig::new(6, 6, moves, 6, objective, [500, 1000, 2000])
}

fn quiet_rng() -> ScriptedRng {
    ScriptedRng::new(vec![4, 5, 3, 1, 0, 2])
}

fn state(layout: &[&str], moves: u32, objective: Objective) -> RunState<ScriptedRng> {
    let board = Board::from_layout(layout).unwrap();
    RunState::with_board(level(moves, objective), board, quiet_rng()).unwrap()
}

fn with_bombs(layout: &[&str]) -> Board {
    let mut board = Board::from_layout(layout).unwrap();
    board.set(Coord::new(0, 0), Some(Token::new(0, SpecialKind::ColorBomb)));
    board.set(Coord::new(0, 1), Some(Token::new(1, SpecialKind::ColorBomb)));
    board
}

#[test]
fn unrelated_swap_leaves_existing_run_alone() {
    let mut run = state(&RED_ROW, 10, Objective::Score { target: 5000 });
    let before = run.board().clone();

    let out = run.attempt_swap(Coord::new(5, 4), Coord::new(5, 5));

    assert!(!out.accepted);
    assert_eq!(out.rejection, Some(Rejection::NoEffect));
    assert_eq!(run.board(), &before);
    for col in 0..3 {
        assert_eq!(run.board().token(Coord::new(2, col)), Some(Token::plain(0)));
    }
    assert_eq!(run.moves_remaining(), 10);
    assert_eq!(run.score(), 0);
}

#[test]
fn horizontal_four_creates_column_stripe_at_second_cell() {
    let mut run = state(&RUN_OF_FOUR, 10, Objective::Score { target: 5000 });
    assert!(find_matches(run.board()).is_empty());

    let out = run.begin_swap(Coord::new(2, 3), Coord::new(3, 3));
    assert!(out.accepted);

    let events = run.step();
    let cleared = events.iter().find_map(|e| match e {
        Event::Clear { cells, points } => Some((cells.clone(), *points)),
        _ => None,
    });
    let (cells, points) = cleared.expect("first pass clears");
    assert_eq!(cells, vec![Coord::new(3, 1), Coord::new(3, 3), Coord::new(3, 4)]);
    assert_eq!(points, 180);

    assert!(events.contains(&Event::SpecialCreated {
        at: Coord::new(3, 2),
        kind: SpecialKind::StripedCol,
        color: 1,
        bonus: 120,
    }));
}

#[test]
fn two_color_bombs_clear_every_token() {
    let mut board = with_bombs(&RUN_OF_FOUR);
    board.set(Coord::new(0, 5), None);
    let mut run =
        RunState::with_board(level(10, Objective::Score { target: 100_000 }), board, quiet_rng())
            .unwrap();

    assert!(run.begin_swap(Coord::new(0, 0), Coord::new(0, 1)).accepted);
    let events = run.step();

    let cells = events
        .iter()
        .find_map(|e| match e {
            Event::Clear { cells, .. } => Some(cells.clone()),
            _ => None,
        })
        .expect("bombs clear");
    assert_eq!(cells.len(), 35);
    assert!(!cells.contains(&Coord::new(0, 5)));
}

#[test]
fn color_bombs_skip_holes_in_the_shape() {
    let layout = [
        "01234#", //
        "234501", //
        "450123", //
        "511213", //
        "023450", //
        "#45012", //
    ];
    let mut board = Board::from_layout(&layout).unwrap();
    board.set(Coord::new(0, 0), Some(Token::new(0, SpecialKind::ColorBomb)));
    board.set(Coord::new(0, 1), Some(Token::new(1, SpecialKind::ColorBomb)));
    let mut shape = vec![vec![true; 6]; 6];
    shape[0][5] = false;
    shape[5][0] = false;
    let config = level(10, Objective::Score { target: 100_000 }).with_shape(shape);
    let mut run = RunState::with_board(config, board, quiet_rng()).unwrap();

    assert!(run.begin_swap(Coord::new(0, 0), Coord::new(0, 1)).accepted);
    let events = run.step();
    let cells = events
        .iter()
        .find_map(|e| match e {
            Event::Clear { cells, .. } => Some(cells.clone()),
            _ => None,
        })
        .expect("bombs clear");
    assert_eq!(cells.len(), 34);
    assert!(!cells.contains(&Coord::new(0, 5)));
    assert!(!cells.contains(&Coord::new(5, 0)));

    run.resolve();
    assert!(!run.board().is_active(Coord::new(0, 5)));
    assert_eq!(run.board().get(Coord::new(5, 0)), Some(None));
}

#[test]
fn reaching_the_score_on_the_last_move_completes() {
    let board = with_bombs(&RUN_OF_FOUR);
    let mut run =
        RunState::with_board(level(1, Objective::Score { target: 1000 }), board, quiet_rng())
            .unwrap();

    let out = run.attempt_swap(Coord::new(0, 0), Coord::new(0, 1));

    assert!(out.accepted);
    assert!(run.score() >= 1000);
    assert!(matches!(
        out.events.last(),
        Some(Event::LevelComplete { stars: 3, .. })
    ));
    assert!(!out.events.iter().any(|e| matches!(e, Event::LevelFailed { .. })));
    assert_eq!(run.moves_remaining(), 0);
}

#[test]
fn resolving_rejects_input_without_events() {
    let mut run = state(&RUN_OF_FOUR, 10, Objective::Score { target: 5000 });
    assert!(run.begin_swap(Coord::new(2, 3), Coord::new(3, 3)).accepted);

    let out = run.attempt_swap(Coord::new(0, 0), Coord::new(0, 1));
    assert_eq!(out.rejection, Some(Rejection::Resolving));
    assert!(out.events.is_empty());
    assert_eq!(run.moves_remaining(), 9);
}

#[test]
fn collect_objective_counts_cleared_colors() {
    let objective = Objective::CollectColors {
        targets: vec![(1, 3)],
    };
    let mut run = state(&RUN_OF_FOUR, 10, objective);

    let out = run.attempt_swap(Coord::new(2, 3), Coord::new(3, 3));

    assert!(out.accepted);
    assert!(run.tracker().colors_captured(1) >= 3);
    assert!(out
        .events
        .iter()
        .any(|e| matches!(e, Event::LevelComplete { .. })));
}

// (2,3) and (3,3) swap to line up row 3, cols 1-3, in color 1.
const RUN_OF_THREE: [&str; 6] = [
    "012345", //
    "234501", //
    "450123", //
    "511234", //
    "023450", //
    "345012", //
];

fn first_clear(events: &[Event]) -> Vec<Coord> {
    events
        .iter()
        .find_map(|e| match e {
            Event::Clear { cells, .. } => Some(cells.clone()),
            _ => None,
        })
        .expect("pass clears")
}

fn activations(events: &[Event]) -> Vec<(Coord, SpecialKind)> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::SpecialActivated { at, kind, .. } => Some((*at, *kind)),
            _ => None,
        })
        .collect()
}

#[test]
fn striped_token_in_a_plain_run_clears_its_row() {
    let mut board = Board::from_layout(&RUN_OF_THREE).unwrap();
    board.set(Coord::new(3, 1), Some(Token::new(1, SpecialKind::StripedRow)));
    let mut run = RunState::with_board(level(10, Objective::Score { target: 5000 }), board, quiet_rng()).unwrap();

    assert!(run.begin_swap(Coord::new(2, 3), Coord::new(3, 3)).accepted);
    let events = run.step();

    assert!(events.contains(&Event::SpecialActivated {
        at: Coord::new(3, 1),
        kind: SpecialKind::StripedRow,
        cells: 6,
    }));
    let cells = first_clear(&events);
    assert_eq!(cells, (0..6).map(|c| Coord::new(3, c)).collect::<Vec<_>>());
    assert!(events.contains(&Event::Clear { cells, points: 360 }));
}

#[test]
fn stripe_blast_sets_off_a_wrapped_token() {
    let mut board = Board::from_layout(&RUN_OF_THREE).unwrap();
    board.set(Coord::new(3, 1), Some(Token::new(1, SpecialKind::StripedRow)));
    board.set(Coord::new(3, 5), Some(Token::new(4, SpecialKind::Wrapped)));
    let mut run = RunState::with_board(level(10, Objective::Score { target: 5000 }), board, quiet_rng()).unwrap();

    assert!(run.begin_swap(Coord::new(2, 3), Coord::new(3, 3)).accepted);
    let events = run.step();

    assert_eq!(
        activations(&events),
        vec![
            (Coord::new(3, 1), SpecialKind::StripedRow),
            (Coord::new(3, 5), SpecialKind::Wrapped),
        ]
    );
    let cells = first_clear(&events);
    assert_eq!(cells.len(), 10);
    for at in [(2, 4), (2, 5), (4, 4), (4, 5)] {
        assert!(cells.contains(&Coord::new(at.0, at.1)));
    }
    assert!(!cells.contains(&Coord::new(2, 3)));
}

#[test]
fn chained_color_bomb_clears_its_own_color() {
    let mut board = Board::from_layout(&RUN_OF_THREE).unwrap();
    board.set(Coord::new(3, 1), Some(Token::new(1, SpecialKind::StripedRow)));
    board.set(Coord::new(3, 5), Some(Token::new(4, SpecialKind::ColorBomb)));
    let mut run = RunState::with_board(level(10, Objective::Score { target: 5000 }), board, quiet_rng()).unwrap();

    assert!(run.begin_swap(Coord::new(2, 3), Coord::new(3, 3)).accepted);
    let events = run.step();

    assert_eq!(
        activations(&events),
        vec![
            (Coord::new(3, 1), SpecialKind::StripedRow),
            (Coord::new(3, 5), SpecialKind::ColorBomb),
        ]
    );
    let cells = first_clear(&events);
    for at in [(0, 4), (1, 2), (2, 0), (4, 3), (5, 1)] {
        assert!(cells.contains(&Coord::new(at.0, at.1)), "color 4 at {:?}", at);
    }
    assert!(!cells.contains(&Coord::new(0, 0)));
}

#[test]
fn special_on_a_spawn_cell_fires_before_it_is_replaced() {
    let mut board = Board::from_layout(&RUN_OF_FOUR).unwrap();
    board.set(Coord::new(3, 2), Some(Token::new(1, SpecialKind::StripedRow)));
    let mut run = RunState::with_board(level(10, Objective::Score { target: 5000 }), board, quiet_rng()).unwrap();

    assert!(run.begin_swap(Coord::new(2, 3), Coord::new(3, 3)).accepted);
    let events = run.step();

    assert_eq!(activations(&events), vec![(Coord::new(3, 2), SpecialKind::StripedRow)]);
    let cells = first_clear(&events);
    assert_eq!(
        cells,
        vec![
            Coord::new(3, 0),
            Coord::new(3, 1),
            Coord::new(3, 3),
            Coord::new(3, 4),
            Coord::new(3, 5),
        ]
    );
    assert!(events.contains(&Event::SpecialCreated {
        at: Coord::new(3, 2),
        kind: SpecialKind::StripedCol,
        color: 1,
        bonus: 120,
    }));
    assert_eq!(
        run.board().token(Coord::new(3, 2)),
        Some(Token::new(1, SpecialKind::StripedCol))
    );
}
