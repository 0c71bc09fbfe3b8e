//! Keyboard and mouse input handling for the game.
//!
//! This module defines the [`GameKey`] enum for abstracting game actions from physical keys,
//! and provides [`KeyState`] for tracking held keys. Held keys drive movement every simulation
//! step; single presses are routed to [`GameState::press`](crate::game::GameState::press).

use crate::game::MoveInput;
use std::collections::HashSet;
use winit::keyboard;

/// Every in-game action that can be triggered by keyboard or mouse input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameKey {
    /// Left mouse button; interacts like `E`.
    MouseButtonLeft,
    /// Move player forward (W or Up Arrow).
    MoveForward,
    /// Move player backward (S or Down Arrow).
    MoveBackward,
    /// Move player left (A or Left Arrow).
    MoveLeft,
    /// Move player right (D or Right Arrow).
    MoveRight,
    /// Use whatever is under the crosshair (E).
    Interact,
    /// Cycle the flashlight color (F).
    Flashlight,
    /// Keypad digit (0-9, including the numpad).
    Digit(char),
    /// Submit the keypad code (Enter).
    Enter,
    /// Delete the last keypad digit (Backspace).
    Backspace,
    /// Start a new run from an end screen (R).
    Restart,
    /// Quit the game (`).
    Quit,
    /// Escape key (close keypad or toggle mouse capture).
    Escape,
}

/// Tracks the set of currently pressed game keys.
#[derive(Debug, Default)]
pub struct KeyState {
    /// Set of currently pressed keys.
    pub pressed_keys: HashSet<GameKey>,
}

impl KeyState {
    pub fn new() -> Self {
        Self {
            pressed_keys: HashSet::new(),
        }
    }

    /// Marks a key as pressed.
    pub fn press_key(&mut self, key: GameKey) {
        self.pressed_keys.insert(key);
    }

    /// Marks a key as released.
    pub fn release_key(&mut self, key: GameKey) {
        self.pressed_keys.remove(&key);
    }

    /// Checks if a key is currently pressed.
    pub fn is_pressed(&self, key: GameKey) -> bool {
        self.pressed_keys.contains(&key)
    }

    /// Releases everything, used when the window loses focus.
    pub fn clear(&mut self) {
        self.pressed_keys.clear();
    }

    /// Movement directions currently held.
    pub fn move_input(&self) -> MoveInput {
        MoveInput {
            forward: self.is_pressed(GameKey::MoveForward),
            backward: self.is_pressed(GameKey::MoveBackward),
            left: self.is_pressed(GameKey::MoveLeft),
            right: self.is_pressed(GameKey::MoveRight),
        }
    }
}

macro_rules! match_char_key {
    ($c:expr, {
        $($key:literal => $variant:expr),* $(,)?
    }) => {{
        match $c.to_ascii_lowercase().as_str() {
            $($key => Some($variant),)*
            _ => None,
        }
    }};
}

macro_rules! match_named_key {
    ($k:expr, {
        $($key:ident => $variant:expr),* $(,)?
    }) => {{
        match $k {
            $(winit::keyboard::NamedKey::$key => Some($variant),)*
            _ => None,
        }
    }};
}

/// Converts a winit [`keyboard::Key`] to a [`GameKey`] if it matches a mapped action.
///
/// Digits map to [`GameKey::Digit`] whatever layer produced them, so numpad entry works too.
pub fn winit_key_to_game_key(key: &keyboard::Key) -> Option<GameKey> {
    match key {
        keyboard::Key::Named(named) => match_named_key!(named, {
            ArrowUp => GameKey::MoveForward,
            ArrowDown => GameKey::MoveBackward,
            ArrowLeft => GameKey::MoveLeft,
            ArrowRight => GameKey::MoveRight,
            Enter => GameKey::Enter,
            Backspace => GameKey::Backspace,
            Escape => GameKey::Escape,
        }),

        keyboard::Key::Character(c) => {
            let mut chars = c.chars();
            if let (Some(digit), None) = (chars.next(), chars.next()) {
                if digit.is_ascii_digit() {
                    return Some(GameKey::Digit(digit));
                }
            }

            match_char_key!(c, {
                "w" => GameKey::MoveForward,
                "s" => GameKey::MoveBackward,
                "a" => GameKey::MoveLeft,
                "d" => GameKey::MoveRight,
                "e" => GameKey::Interact,
                "f" => GameKey::Flashlight,
                "r" => GameKey::Restart,
                "`" => GameKey::Quit,
            })
        }

        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::keyboard::{Key, NamedKey, SmolStr};

    #[test]
    fn characters_map_case_insensitively() {
        assert_eq!(
            winit_key_to_game_key(&Key::Character(SmolStr::new("W"))),
            Some(GameKey::MoveForward)
        );
        assert_eq!(
            winit_key_to_game_key(&Key::Character(SmolStr::new("f"))),
            Some(GameKey::Flashlight)
        );
        assert_eq!(winit_key_to_game_key(&Key::Character(SmolStr::new("q"))), None);
    }

    #[test]
    fn digits_and_keypad_keys_map() {
        assert_eq!(
            winit_key_to_game_key(&Key::Character(SmolStr::new("7"))),
            Some(GameKey::Digit('7'))
        );
        assert_eq!(
            winit_key_to_game_key(&Key::Named(NamedKey::Enter)),
            Some(GameKey::Enter)
        );
        assert_eq!(
            winit_key_to_game_key(&Key::Named(NamedKey::Backspace)),
            Some(GameKey::Backspace)
        );
    }

    #[test]
    fn move_input_reflects_held_keys() {
        let mut keys = KeyState::new();
        keys.press_key(GameKey::MoveForward);
        keys.press_key(GameKey::MoveLeft);
        keys.release_key(GameKey::MoveLeft);
        let input = keys.move_input();
        assert!(input.forward && !input.left && !input.backward && !input.right);
        keys.clear();
        assert!(!keys.move_input().forward);
    }
}
