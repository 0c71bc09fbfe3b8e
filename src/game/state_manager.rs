//! Puzzle flags, inventory, keypad input and flashlight state.
//!
//! [`GameStateManager`] is the single source of truth for everything the room graph can be
//! gated on. The scene only reads it; interactions are the only writers.

use serde::Deserialize;
use std::collections::HashMap;

/// Longest digit sequence a keypad buffer will hold.
pub const KEYPAD_MAX_DIGITS: usize = 8;

/// Colors the flashlight cycles through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlashlightColor {
    #[default]
    White,
    Red,
    Green,
    Blue,
}

impl FlashlightColor {
    /// The color after this one in the cycle, wrapping back to white.
    pub fn next(self) -> Self {
        match self {
            FlashlightColor::White => FlashlightColor::Red,
            FlashlightColor::Red => FlashlightColor::Green,
            FlashlightColor::Green => FlashlightColor::Blue,
            FlashlightColor::Blue => FlashlightColor::White,
        }
    }

    /// Linear RGB used by the spotlight and by colored doors.
    pub fn rgb(self) -> [f32; 3] {
        match self {
            FlashlightColor::White => [1.0, 0.95, 0.85],
            FlashlightColor::Red => [1.0, 0.15, 0.1],
            FlashlightColor::Green => [0.15, 1.0, 0.2],
            FlashlightColor::Blue => [0.2, 0.35, 1.0],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FlashlightColor::White => "white",
            FlashlightColor::Red => "red",
            FlashlightColor::Green => "green",
            FlashlightColor::Blue => "blue",
        }
    }
}

/// Result of submitting the keypad buffer against a code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeypadResult {
    Accepted,
    Rejected,
    AlreadySolved,
}

/// Tracks puzzle-solved flags, the player's inventory, the keypad input buffer and the
/// flashlight color.
///
/// Every mutation that changes observable state bumps [`GameStateManager::revision`], which
/// lets renderers and the HUD skip work when nothing changed.
#[derive(Debug, Clone, Default)]
pub struct GameStateManager {
    puzzles: HashMap<String, bool>,
    inventory: Vec<String>,
    keypad_buffer: String,
    flashlight: FlashlightColor,
    revision: u64,
}

impl GameStateManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an unsolved flag for `id`. An already known puzzle keeps its state.
    pub fn register_puzzle(&mut self, id: &str) {
        if !self.puzzles.contains_key(id) {
            self.puzzles.insert(id.to_string(), false);
            self.revision += 1;
        }
    }

    /// Marks `id` solved, registering it if needed. Returns `true` if the flag changed.
    pub fn set_puzzle_solved(&mut self, id: &str) -> bool {
        let solved = self.puzzles.entry(id.to_string()).or_insert(false);
        if *solved {
            return false;
        }
        *solved = true;
        self.revision += 1;
        log::info!("Puzzle '{}' solved", id);
        true
    }

    /// Unknown puzzles are reported as unsolved.
    pub fn is_puzzle_solved(&self, id: &str) -> bool {
        self.puzzles.get(id).copied().unwrap_or(false)
    }

    pub fn puzzle_count(&self) -> usize {
        self.puzzles.len()
    }

    pub fn solved_count(&self) -> usize {
        self.puzzles.values().filter(|solved| **solved).count()
    }

    /// Appends `item` unless it is already held. Returns `true` if it was added.
    pub fn add_item(&mut self, item: &str) -> bool {
        if self.has_item(item) {
            return false;
        }
        self.inventory.push(item.to_string());
        self.revision += 1;
        log::info!("Picked up '{}'", item);
        true
    }

    pub fn has_item(&self, item: &str) -> bool {
        self.inventory.iter().any(|held| held == item)
    }

    pub fn remove_item(&mut self, item: &str) -> bool {
        match self.inventory.iter().position(|held| held == item) {
            Some(index) => {
                self.inventory.remove(index);
                self.revision += 1;
                true
            }
            None => false,
        }
    }

    pub fn inventory(&self) -> &[String] {
        &self.inventory
    }

    /// Appends a digit to the keypad buffer.
    ///
    /// Non-digits and digits past [`KEYPAD_MAX_DIGITS`] are ignored and return `false`.
    pub fn press_keypad_digit(&mut self, digit: char) -> bool {
        if !digit.is_ascii_digit() || self.keypad_buffer.len() >= KEYPAD_MAX_DIGITS {
            return false;
        }
        self.keypad_buffer.push(digit);
        self.revision += 1;
        true
    }

    pub fn keypad_backspace(&mut self) {
        if self.keypad_buffer.pop().is_some() {
            self.revision += 1;
        }
    }

    pub fn clear_keypad(&mut self) {
        if !self.keypad_buffer.is_empty() {
            self.keypad_buffer.clear();
            self.revision += 1;
        }
    }

    pub fn keypad_buffer(&self) -> &str {
        &self.keypad_buffer
    }

    /// Checks the buffer against `code`. The buffer is cleared whatever the outcome.
    pub fn submit_keypad(&mut self, puzzle_id: &str, code: &str) -> KeypadResult {
        let entered = std::mem::take(&mut self.keypad_buffer);
        self.revision += 1;

        if self.is_puzzle_solved(puzzle_id) {
            return KeypadResult::AlreadySolved;
        }

        if entered == code {
            self.set_puzzle_solved(puzzle_id);
            KeypadResult::Accepted
        } else {
            log::debug!("Keypad '{}' rejected '{}'", puzzle_id, entered);
            KeypadResult::Rejected
        }
    }

    /// Advances the flashlight to the next color and returns it.
    pub fn cycle_flashlight(&mut self) -> FlashlightColor {
        self.flashlight = self.flashlight.next();
        self.revision += 1;
        self.flashlight
    }

    pub fn flashlight(&self) -> FlashlightColor {
        self.flashlight
    }

    /// Monotonic change counter.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Forgets every puzzle, item and keypad digit and resets the flashlight.
    pub fn reset(&mut self) {
        self.puzzles.clear();
        self.inventory.clear();
        self.keypad_buffer.clear();
        self.flashlight = FlashlightColor::default();
        self.revision += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_puzzles_are_unsolved() {
        let state = GameStateManager::new();
        assert!(!state.is_puzzle_solved("vault"));
    }

    #[test]
    fn solving_is_sticky_and_registration_does_not_undo_it() {
        let mut state = GameStateManager::new();
        state.register_puzzle("vault");
        assert!(state.set_puzzle_solved("vault"));
        assert!(!state.set_puzzle_solved("vault"));
        state.register_puzzle("vault");
        assert!(state.is_puzzle_solved("vault"));
        assert_eq!(state.solved_count(), 1);
        assert_eq!(state.puzzle_count(), 1);
    }

    #[test]
    fn inventory_keeps_order_and_rejects_duplicates() {
        let mut state = GameStateManager::new();
        assert!(state.add_item("brass_key"));
        assert!(state.add_item("fuse"));
        assert!(!state.add_item("brass_key"));
        assert_eq!(state.inventory(), ["brass_key", "fuse"]);

        assert!(state.remove_item("brass_key"));
        assert!(!state.remove_item("brass_key"));
        assert!(!state.has_item("brass_key"));
        assert!(state.has_item("fuse"));
    }

    #[test]
    fn keypad_accepts_only_digits_up_to_limit() {
        let mut state = GameStateManager::new();
        assert!(!state.press_keypad_digit('x'));
        for _ in 0..KEYPAD_MAX_DIGITS {
            assert!(state.press_keypad_digit('7'));
        }
        assert!(!state.press_keypad_digit('1'));
        assert_eq!(state.keypad_buffer().len(), KEYPAD_MAX_DIGITS);

        state.keypad_backspace();
        assert_eq!(state.keypad_buffer().len(), KEYPAD_MAX_DIGITS - 1);
        state.clear_keypad();
        assert_eq!(state.keypad_buffer(), "");
    }

    #[test]
    fn keypad_submission_solves_on_match_and_always_clears() {
        let mut state = GameStateManager::new();
        state.register_puzzle("door_code");

        for digit in "12".chars() {
            state.press_keypad_digit(digit);
        }
        assert_eq!(state.submit_keypad("door_code", "4127"), KeypadResult::Rejected);
        assert_eq!(state.keypad_buffer(), "");
        assert!(!state.is_puzzle_solved("door_code"));

        for digit in "4127".chars() {
            state.press_keypad_digit(digit);
        }
        assert_eq!(state.submit_keypad("door_code", "4127"), KeypadResult::Accepted);
        assert!(state.is_puzzle_solved("door_code"));

        state.press_keypad_digit('0');
        assert_eq!(
            state.submit_keypad("door_code", "4127"),
            KeypadResult::AlreadySolved
        );
        assert_eq!(state.keypad_buffer(), "");
    }

    #[test]
    fn flashlight_cycles_through_all_colors() {
        let mut state = GameStateManager::new();
        assert_eq!(state.flashlight(), FlashlightColor::White);
        assert_eq!(state.cycle_flashlight(), FlashlightColor::Red);
        assert_eq!(state.cycle_flashlight(), FlashlightColor::Green);
        assert_eq!(state.cycle_flashlight(), FlashlightColor::Blue);
        assert_eq!(state.cycle_flashlight(), FlashlightColor::White);
    }

    #[test]
    fn revision_tracks_changes_only() {
        let mut state = GameStateManager::new();
        let before = state.revision();
        state.clear_keypad();
        state.keypad_backspace();
        assert_eq!(state.revision(), before);
        state.add_item("fuse");
        assert!(state.revision() > before);
    }

    #[test]
    fn reset_returns_to_fresh_state() {
        let mut state = GameStateManager::new();
        state.set_puzzle_solved("a");
        state.add_item("fuse");
        state.press_keypad_digit('3');
        state.cycle_flashlight();
        state.reset();

        assert_eq!(state.puzzle_count(), 0);
        assert!(state.inventory().is_empty());
        assert_eq!(state.keypad_buffer(), "");
        assert_eq!(state.flashlight(), FlashlightColor::White);
    }
}
