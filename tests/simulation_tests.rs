use std::time::Duration;
use std::time::Instant;

use proptest::prelude::*;

use gridlife::cell::CellState;
use gridlife::events::EngineEvent;
use gridlife::grid::Grid;
use gridlife::grid::GridError;
use gridlife::pattern::Pattern;
use gridlife::simulation::PlaybackState;
use gridlife::simulation::Simulation;

/// A grid of the given size with cells alive according to `alive`, row-major.
fn grid_from(rows: usize, cols: usize, alive: &[bool]) -> Grid {
    let mut grid = Grid::new(rows, cols).unwrap();

    for (i, _) in alive.iter().enumerate().filter(|(_, a)| **a) {
        grid.set(i / cols, i % cols, CellState::Alive).unwrap();
    }

    grid
}

/// Any grid up to 12x12
fn arb_grid() -> impl Strategy<Value = Grid> {
    (1usize..=12, 1usize..=12).prop_flat_map(|(rows, cols)| {
        proptest::collection::vec(any::<bool>(), rows * cols)
            .prop_map(move |alive| grid_from(rows, cols, &alive))
    })
}

proptest! {
    #[test]
    fn new_grid_has_requested_shape(rows in 1usize..64, cols in 1usize..64) {
        let grid = Grid::new(rows, cols).unwrap();

        prop_assert_eq!(grid.iter_rows().count(), rows);
        prop_assert!(grid.iter_rows().all(|r| r.len() == cols));
        prop_assert!(grid.iter_rows().flatten().all(|c| *c == CellState::Dead));
    }

    #[test]
    fn toggle_twice_is_identity(grid in arb_grid(), r in any::<prop::sample::Index>(), c in any::<prop::sample::Index>()) {
        let (row, col) = (r.index(grid.rows()), c.index(grid.cols()));
        let mut toggled = grid.clone();

        toggled.toggle(row, col).unwrap();
        prop_assert_ne!(&toggled, &grid);

        toggled.toggle(row, col).unwrap();
        prop_assert_eq!(toggled, grid);
    }

    #[test]
    fn out_of_bounds_toggle_is_rejected(grid in arb_grid(), extra in 0usize..4) {
        let mut mutated = grid.clone();

        let res = mutated.toggle(grid.rows() + extra, 0);
        prop_assert!(
            matches!(res, Err(GridError::OutOfBounds { .. })),
            "expected OutOfBounds, got {:?}",
            res
        );

        let res = mutated.toggle(0, grid.cols() + extra);
        prop_assert!(
            matches!(res, Err(GridError::OutOfBounds { .. })),
            "expected OutOfBounds, got {:?}",
            res
        );

        prop_assert_eq!(mutated, grid);
    }

    #[test]
    fn next_generation_is_deterministic(grid in arb_grid()) {
        let a = grid.next_generation();
        let b = grid.next_generation();

        prop_assert_eq!(a.rows(), grid.rows());
        prop_assert_eq!(a.cols(), grid.cols());
        prop_assert_eq!(a, b);
    }

    #[test]
    fn neighbor_counts_are_bounded(grid in arb_grid()) {
        for row in 0..grid.rows() {
            for col in 0..grid.cols() {
                prop_assert!(grid.count_alive_neighbors(row, col).unwrap() <= 8);
            }
        }
    }
}

#[test]
fn corner_does_not_see_the_opposite_corner() {
    let mut grid = Grid::new(5, 6).unwrap();
    grid.toggle(0, 0).unwrap();

    assert_eq!(grid.count_alive_neighbors(4, 5), Ok(0));
}

#[test]
fn blinker_scenario() {
    let mut grid = Grid::new(5, 5).unwrap();
    for col in 1..=3 {
        grid.toggle(2, col).unwrap();
    }
    let horizontal = grid.clone();

    let vertical = grid.next_generation();
    assert_eq!(
        vertical.alive_cells().collect::<Vec<_>>(),
        vec![(1, 2), (2, 2), (3, 2)]
    );

    assert_eq!(vertical.next_generation(), horizontal);
}

#[test]
fn glider_moves_diagonally() {
    let glider = Pattern::builtin("glider").unwrap();

    let mut grid = Grid::new(8, 8).unwrap();
    grid.stamp(&glider, 1, 1).unwrap();

    let mut expected = Grid::new(8, 8).unwrap();
    expected.stamp(&glider, 2, 2).unwrap();

    for _ in 0..4 {
        grid = grid.next_generation();
    }

    assert_eq!(grid, expected);
}

#[test]
fn reset_from_running() {
    let t0 = Instant::now();
    let mut sim = Simulation::new(6, 7).unwrap();

    for (row, col) in [(1, 1), (1, 2), (2, 1), (4, 5)] {
        sim.apply(EngineEvent::Toggle { row, col }, t0).unwrap();
    }

    sim.apply(EngineEvent::Start, t0).unwrap();
    assert_eq!(sim.state(), PlaybackState::Running);

    sim.apply(EngineEvent::Reset, t0).unwrap();

    assert_eq!(sim.state(), PlaybackState::Stopped);
    assert_eq!(sim.grid(), &Grid::new(6, 7).unwrap());
    assert_eq!(sim.next_deadline(), None);
}

#[test]
fn ticks_and_toggles_apply_in_arrival_order() {
    let t0 = Instant::now();
    let period = Duration::from_millis(100);
    let mut sim = Simulation::new(5, 5).unwrap().with_tick_interval(period);

    // A blinker built one toggle at a time, with a tick arriving halfway through.
    sim.apply(EngineEvent::Toggle { row: 2, col: 1 }, t0).unwrap();
    sim.apply(EngineEvent::Toggle { row: 2, col: 2 }, t0).unwrap();
    sim.apply(EngineEvent::Start, t0).unwrap();

    // Two cells have too few neighbors: the tick wipes them out.
    assert!(sim.poll(t0 + period));
    assert!(sim.grid().is_empty());

    sim.apply(EngineEvent::Toggle { row: 2, col: 3 }, t0 + period).unwrap();
    assert_eq!(sim.grid().population(), 1);
    assert_eq!(sim.generation(), 1);
}

#[test]
fn population_is_not_auto_paused() {
    let t0 = Instant::now();
    let period = Duration::from_millis(100);
    let mut sim = Simulation::new(4, 4).unwrap().with_tick_interval(period);

    sim.start_at(t0).unwrap();

    for i in 1..=5u32 {
        assert!(sim.poll(t0 + i * period));
    }

    assert!(sim.grid().is_empty());
    assert_eq!(sim.state(), PlaybackState::Running);
    assert_eq!(sim.generation(), 5);
}
