//! Rotating-cube grid puzzle.
//!
//! Each cell of a [`CubePuzzle`] is a [`RotatingCube`] with four rotation states. Clicking a
//! cell turns it and its up/down/left/right neighbours one quarter turn. The puzzle is solved
//! once every cube is back at rotation 0.
//!
//! Scrambling only ever applies clicks, so any scrambled board can be solved again.

use rand::Rng;
use thiserror::Error;

/// Number of distinct rotation states of a cube.
pub const ROTATION_STATES: u8 = 4;

/// Degrees per second the displayed angle turns while catching up with the target.
const TURN_SPEED: f32 = 360.0;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CubePuzzleError {
    #[error("cell ({row}, {col}) is outside the {rows}x{cols} grid")]
    OutOfRange {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },
}

/// A single cube with a quarter-turn rotation state.
///
/// `display_angle` trails the logical rotation so the renderer can animate the turn.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RotatingCube {
    rotation: u8,
    display_angle: f32,
}

impl RotatingCube {
    pub fn rotation(&self) -> u8 {
        self.rotation
    }

    /// Advances one quarter turn, wrapping after the fourth.
    pub fn rotate(&mut self) {
        self.rotation = (self.rotation + 1) % ROTATION_STATES;
    }

    pub fn is_home(&self) -> bool {
        self.rotation == 0
    }

    /// Angle in degrees matching the logical rotation.
    pub fn target_angle(&self) -> f32 {
        self.rotation as f32 * 90.0
    }

    /// Angle in degrees the cube is currently drawn at, in `[0, 360)`.
    pub fn display_angle(&self) -> f32 {
        self.display_angle
    }

    /// Turns the displayed angle forward toward the target.
    pub fn animate(&mut self, dt: f32) {
        let target = self.target_angle();
        let mut remaining = (target - self.display_angle).rem_euclid(360.0);
        if remaining < 0.01 {
            self.display_angle = target;
            return;
        }
        let step = (TURN_SPEED * dt).min(remaining);
        remaining -= step;
        self.display_angle = (target - remaining).rem_euclid(360.0);
    }

    fn snap(&mut self) {
        self.display_angle = self.target_angle();
    }
}

/// A `rows` x `cols` grid of rotating cubes.
#[derive(Debug, Clone, PartialEq)]
pub struct CubePuzzle {
    rows: usize,
    cols: usize,
    cells: Vec<RotatingCube>,
    moves: u32,
}

impl CubePuzzle {
    /// Creates a solved grid.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![RotatingCube::default(); rows * cols],
            moves: 0,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Clicks made since the last scramble or reset.
    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn cube(&self, row: usize, col: usize) -> Option<&RotatingCube> {
        self.index(row, col).map(|index| &self.cells[index])
    }

    pub fn rotation(&self, row: usize, col: usize) -> Option<u8> {
        self.cube(row, col).map(RotatingCube::rotation)
    }

    /// Rotates the clicked cube and each existing orthogonal neighbour.
    pub fn click(&mut self, row: usize, col: usize) -> Result<(), CubePuzzleError> {
        if self.index(row, col).is_none() {
            return Err(CubePuzzleError::OutOfRange {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }

        self.rotate_plus(row, col);
        self.moves += 1;
        Ok(())
    }

    pub fn is_solved(&self) -> bool {
        self.cells.iter().all(RotatingCube::is_home)
    }

    /// Applies `clicks` random clicks, retrying until the board is not already solved.
    ///
    /// With `clicks == 0` the board is left solved; any other count leaves it unsolved.
    pub fn scramble<R: Rng + ?Sized>(&mut self, rng: &mut R, clicks: u32) {
        self.reset();
        if clicks == 0 || self.cells.is_empty() {
            return;
        }

        for _ in 0..16 {
            for _ in 0..clicks {
                let row = rng.gen_range(0..self.rows);
                let col = rng.gen_range(0..self.cols);
                self.rotate_plus(row, col);
            }
            if !self.is_solved() {
                break;
            }
        }
        // Clicks that cancel out (four on one cell of a 1x1 board) can survive every retry.
        // One more click always leaves a solved board unsolved.
        if self.is_solved() {
            let row = rng.gen_range(0..self.rows);
            let col = rng.gen_range(0..self.cols);
            self.rotate_plus(row, col);
        }

        for cube in &mut self.cells {
            cube.snap();
        }
        self.moves = 0;
    }

    pub fn animate(&mut self, dt: f32) {
        for cube in &mut self.cells {
            cube.animate(dt);
        }
    }

    /// Puts every cube back home and clears the move counter.
    pub fn reset(&mut self) {
        for cube in &mut self.cells {
            *cube = RotatingCube::default();
        }
        self.moves = 0;
    }

    fn index(&self, row: usize, col: usize) -> Option<usize> {
        (row < self.rows && col < self.cols).then(|| row * self.cols + col)
    }

    fn rotate_plus(&mut self, row: usize, col: usize) {
        let neighbours = [
            Some((row, col)),
            row.checked_sub(1).map(|r| (r, col)),
            Some((row + 1, col)),
            col.checked_sub(1).map(|c| (row, c)),
            Some((row, col + 1)),
        ];

        for (r, c) in neighbours.into_iter().flatten() {
            if let Some(index) = self.index(r, c) {
                self.cells[index].rotate();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn new_grid_is_solved() {
        let puzzle = CubePuzzle::new(3, 3);
        assert!(puzzle.is_solved());
        assert_eq!(puzzle.moves(), 0);
    }

    #[test]
    fn centre_click_rotates_plus_shape() {
        let mut puzzle = CubePuzzle::new(3, 3);
        puzzle.click(1, 1).unwrap();

        let expected = [[0, 1, 0], [1, 1, 1], [0, 1, 0]];
        for (row, cols) in expected.iter().enumerate() {
            for (col, rotation) in cols.iter().enumerate() {
                assert_eq!(puzzle.rotation(row, col), Some(*rotation), "({row}, {col})");
            }
        }
        assert!(!puzzle.is_solved());
        assert_eq!(puzzle.moves(), 1);
    }

    #[test]
    fn corner_click_skips_missing_neighbours() {
        let mut puzzle = CubePuzzle::new(2, 3);
        puzzle.click(0, 0).unwrap();

        assert_eq!(puzzle.rotation(0, 0), Some(1));
        assert_eq!(puzzle.rotation(0, 1), Some(1));
        assert_eq!(puzzle.rotation(1, 0), Some(1));
        assert_eq!(puzzle.rotation(1, 1), Some(0));
        assert_eq!(puzzle.rotation(0, 2), Some(0));
    }

    #[test]
    fn four_clicks_on_same_cell_restore_the_board() {
        let mut puzzle = CubePuzzle::new(3, 3);
        for _ in 0..4 {
            puzzle.click(0, 1).unwrap();
        }
        assert!(puzzle.is_solved());
        assert_eq!(puzzle.moves(), 4);
    }

    #[test]
    fn out_of_range_click_changes_nothing() {
        let mut puzzle = CubePuzzle::new(2, 2);
        assert_eq!(
            puzzle.click(2, 0),
            Err(CubePuzzleError::OutOfRange {
                row: 2,
                col: 0,
                rows: 2,
                cols: 2
            })
        );
        assert!(puzzle.is_solved());
        assert_eq!(puzzle.moves(), 0);
    }

    #[test]
    fn scramble_leaves_board_unsolved() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut puzzle = CubePuzzle::new(3, 3);
        puzzle.scramble(&mut rng, 5);
        assert!(!puzzle.is_solved());
        assert_eq!(puzzle.moves(), 0);
    }

    #[test]
    fn scramble_of_single_cell_never_cancels_out() {
        for seed in 0..8 {
            let mut rng = StdRng::seed_from_u64(seed);
            for clicks in [4, 8, 12] {
                let mut puzzle = CubePuzzle::new(1, 1);
                puzzle.scramble(&mut rng, clicks);
                assert!(!puzzle.is_solved(), "{} clicks left the board solved", clicks);
            }
        }
    }

    #[test]
    fn single_cell_grid_cycles_through_states() {
        let mut puzzle = CubePuzzle::new(1, 1);
        puzzle.click(0, 0).unwrap();
        assert_eq!(puzzle.rotation(0, 0), Some(1));
        puzzle.click(0, 0).unwrap();
        puzzle.click(0, 0).unwrap();
        puzzle.click(0, 0).unwrap();
        assert!(puzzle.is_solved());
    }

    #[test]
    fn display_angle_turns_forward_through_wrap() {
        let mut cube = RotatingCube::default();
        for _ in 0..3 {
            cube.rotate();
        }
        cube.snap();
        cube.rotate();
        assert_eq!(cube.target_angle(), 0.0);

        cube.animate(0.125);
        assert!((cube.display_angle() - 315.0).abs() < 1e-3);
        cube.animate(1.0);
        assert_eq!(cube.display_angle(), 0.0);
    }

    proptest! {
        #[test]
        fn replaying_each_click_three_more_times_solves(
            clicks in proptest::collection::vec((0usize..3, 0usize..4), 0..20)
        ) {
            let mut puzzle = CubePuzzle::new(3, 4);
            for &(row, col) in &clicks {
                puzzle.click(row, col).unwrap();
            }
            for &(row, col) in &clicks {
                for _ in 0..3 {
                    puzzle.click(row, col).unwrap();
                }
            }
            prop_assert!(puzzle.is_solved());
        }

        #[test]
        fn rotations_stay_in_range(
            clicks in proptest::collection::vec((0usize..4, 0usize..4), 0..40)
        ) {
            let mut puzzle = CubePuzzle::new(4, 4);
            for (row, col) in clicks {
                puzzle.click(row, col).unwrap();
            }
            for row in 0..4 {
                for col in 0..4 {
                    prop_assert!(puzzle.rotation(row, col).unwrap() < ROTATION_STATES);
                }
            }
        }
    }
}
