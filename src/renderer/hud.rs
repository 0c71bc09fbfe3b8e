//! Heads-up display: what the text buffers and overlay rectangles show for a game state.
//!
//! The content functions are pure so they can be tested without a GPU. [`Hud`] pushes their
//! output into a [`TextRenderer`] each frame.

use crate::game::room::InteractableKind;
use crate::game::state_manager::KEYPAD_MAX_DIGITS;
use crate::game::{CurrentScreen, GameState, format_clock};
use crate::renderer::rectangle::Rectangle;
use crate::renderer::text::{TextPosition, TextRenderer, TextStyle};
use glyphon::{Color, Weight};

const ROOM: &str = "room";
const INVENTORY: &str = "inventory";
const FLASHLIGHT: &str = "flashlight";
const TIMER: &str = "timer";
const MESSAGE: &str = "message";
const PROMPT: &str = "prompt";
const KEYPAD: &str = "keypad";
const BANNER: &str = "banner";

const KEYPAD_PANEL: (f32, f32) = (380.0, 230.0);
const BANNER_WIDTH: f32 = 720.0;

/// Every piece of HUD text for one frame. `None` hides the buffer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HudText {
    pub room: Option<String>,
    pub inventory: Option<String>,
    pub flashlight: Option<String>,
    pub timer: Option<(String, Color)>,
    pub message: Option<String>,
    pub prompt: Option<String>,
    pub keypad: Option<String>,
    pub banner: Option<String>,
}

/// Item ids are snake_case; the HUD shows them as words.
pub fn display_name(id: &str) -> String {
    id.replace('_', " ")
}

pub fn inventory_line(items: &[String]) -> String {
    if items.is_empty() {
        return "Inventory: empty".to_string();
    }
    let names: Vec<String> = items.iter().map(|item| display_name(item)).collect();
    format!("Inventory: {}", names.join(", "))
}

/// Typed digits followed by underscores for the ones still missing.
pub fn keypad_display(buffer: &str, code_length: usize) -> String {
    let slots = code_length.max(buffer.len()).min(KEYPAD_MAX_DIGITS);
    let mut display: Vec<String> = buffer.chars().map(String::from).collect();
    display.resize(slots.max(display.len()), "_".to_string());
    display.join(" ")
}

/// What pressing interact would do with the object under the crosshair.
pub fn prompt_for(kind: &InteractableKind) -> String {
    let action = match kind {
        InteractableKind::Keypad { .. } => "use keypad".to_string(),
        InteractableKind::Key { item, .. } => format!("take {}", display_name(item)),
        InteractableKind::Door { .. } => "open door".to_string(),
        InteractableKind::CubePanel { .. } => "turn cube".to_string(),
        InteractableKind::Note { .. } => "read".to_string(),
    };
    format!("[E] {}", action)
}

pub fn hud_text(game: &GameState) -> HudText {
    let state = &game.session.state;
    let room = game.session.scene.current_room();

    let banner = match game.current_screen {
        CurrentScreen::Title => {
            let mut text = game.level.name.clone();
            if let Some(intro) = &game.level.intro {
                text.push_str("\n\n");
                text.push_str(intro);
            }
            text.push_str("\n\nWASD to move, mouse to look, E to interact, F to change light");
            text.push_str("\nClick or press Enter to begin");
            Some(text)
        }
        CurrentScreen::Won => Some(format!(
            "You escaped!\n\nTime: {}\nPuzzles solved: {}/{}\n\nPress R to play again",
            format_clock(game.elapsed),
            state.solved_count(),
            state.puzzle_count()
        )),
        CurrentScreen::GameOver => Some(format!(
            "You were caught.\n\n{}\nPuzzles solved: {}/{}\n\nPress R to try again",
            room.name,
            state.solved_count(),
            state.puzzle_count()
        )),
        CurrentScreen::Playing | CurrentScreen::Keypad => None,
    };

    if game.current_screen == CurrentScreen::Title {
        return HudText {
            banner,
            ..HudText::default()
        };
    }

    let keypad = (game.current_screen == CurrentScreen::Keypad).then(|| {
        let code_length = game
            .active_keypad_code()
            .map_or(0, |(_, code)| code.chars().count());
        format!(
            "KEYPAD\n\n{}\n\n[0-9] type   [Backspace] delete\n[Enter] submit   [Esc] close",
            keypad_display(state.keypad_buffer(), code_length)
        )
    });

    let prompt = (game.current_screen == CurrentScreen::Playing)
        .then_some(game.target)
        .flatten()
        .and_then(|target| room.interactables.get(target.index))
        .map(|item| prompt_for(&item.kind));

    HudText {
        room: Some(format!(
            "{}   |   solved {}/{}",
            room.name,
            state.solved_count(),
            state.puzzle_count()
        )),
        inventory: Some(inventory_line(state.inventory())),
        flashlight: Some(format!("Flashlight: {} [F]", state.flashlight().name())),
        timer: game
            .timer
            .as_ref()
            .map(|timer| (timer.format_time(), timer.get_current_color())),
        message: game.message.as_ref().map(|message| message.text.clone()),
        prompt,
        keypad,
        banner,
    }
}

/// Crosshair, keypad panel and screen tints for the current screen.
pub fn overlay_rectangles(game: &GameState, width: f32, height: f32) -> Vec<Rectangle> {
    let (cx, cy) = (width / 2.0, height / 2.0);
    let full_screen = |color| vec![Rectangle::new(0.0, 0.0, width, height, color)];
    match game.current_screen {
        CurrentScreen::Playing => {
            let color = if game.target.is_some() {
                [1.0, 0.85, 0.3, 0.95]
            } else {
                [1.0, 1.0, 1.0, 0.7]
            };
            vec![
                Rectangle::centered(cx, cy, 16.0, 2.0, color),
                Rectangle::centered(cx, cy, 2.0, 16.0, color),
            ]
        }
        CurrentScreen::Keypad => {
            let (panel_width, panel_height) = KEYPAD_PANEL;
            vec![
                Rectangle::new(0.0, 0.0, width, height, [0.0, 0.0, 0.0, 0.45]),
                Rectangle::centered(cx, cy, panel_width, panel_height, [0.07, 0.07, 0.09, 0.92]),
            ]
        }
        CurrentScreen::Title => full_screen([0.0, 0.0, 0.0, 0.75]),
        CurrentScreen::Won => full_screen([0.03, 0.18, 0.07, 0.8]),
        CurrentScreen::GameOver => full_screen([0.3, 0.02, 0.02, 0.8]),
    }
}

/// Owns the layout of the HUD buffers inside a [`TextRenderer`].
pub struct Hud;

impl Hud {
    /// Creates every HUD buffer, laid out for a `width` x `height` window.
    pub fn init(text_renderer: &mut TextRenderer, width: u32, height: u32) {
        let small = TextStyle::default();
        let large = TextStyle {
            font_size: 34.0,
            line_height: 42.0,
            weight: Weight::BOLD,
            ..TextStyle::default()
        };
        let centred = TextStyle {
            font_size: 22.0,
            line_height: 30.0,
            ..TextStyle::default()
        };

        let layout = Self::layout(width as f32, height as f32);
        for (id, position) in layout {
            let style = match id {
                TIMER => large.clone(),
                KEYPAD | BANNER | MESSAGE => centred.clone(),
                _ => small.clone(),
            };
            text_renderer.create_text_buffer(id, "", style, position);
        }
    }

    /// Re-positions the buffers after a resize.
    pub fn resize(text_renderer: &mut TextRenderer, width: u32, height: u32) {
        for (id, position) in Self::layout(width as f32, height as f32) {
            if let Err(e) = text_renderer.update_position(id, position) {
                log::warn!("Failed to position HUD text: {}", e);
            }
        }
    }

    fn layout(width: f32, height: f32) -> [(&'static str, TextPosition); 8] {
        let at = |x: f32, y: f32, w: f32, h: f32| TextPosition {
            x: x.max(0.0),
            y: y.max(0.0),
            max_width: Some(w),
            max_height: Some(h),
        };
        let (cx, cy) = (width / 2.0, height / 2.0);
        [
            (ROOM, at(20.0, 16.0, 520.0, 30.0)),
            (INVENTORY, at(20.0, height - 64.0, width - 40.0, 30.0)),
            (FLASHLIGHT, at(20.0, height - 36.0, 400.0, 30.0)),
            (TIMER, at(width - 150.0, 12.0, 140.0, 50.0)),
            (MESSAGE, at(cx - 360.0, cy - 130.0, 720.0, 70.0)),
            (PROMPT, at(cx + 18.0, cy + 14.0, 320.0, 30.0)),
            (
                KEYPAD,
                at(
                    cx - KEYPAD_PANEL.0 / 2.0 + 24.0,
                    cy - KEYPAD_PANEL.1 / 2.0 + 16.0,
                    KEYPAD_PANEL.0 - 48.0,
                    KEYPAD_PANEL.1 - 24.0,
                ),
            ),
            (
                BANNER,
                at(cx - BANNER_WIDTH / 2.0, height * 0.2, BANNER_WIDTH, height * 0.7),
            ),
        ]
    }

    /// Copies `hud` into the text buffers, hiding the ones with nothing to show.
    pub fn apply(text_renderer: &mut TextRenderer, hud: &HudText) {
        let lines = [
            (ROOM, hud.room.as_deref()),
            (INVENTORY, hud.inventory.as_deref()),
            (FLASHLIGHT, hud.flashlight.as_deref()),
            (TIMER, hud.timer.as_ref().map(|(text, _)| text.as_str())),
            (MESSAGE, hud.message.as_deref()),
            (PROMPT, hud.prompt.as_deref()),
            (KEYPAD, hud.keypad.as_deref()),
            (BANNER, hud.banner.as_deref()),
        ];

        for (id, text) in lines {
            let result = text_renderer
                .set_visible(id, text.is_some())
                .and_then(|_| match text {
                    Some(text) => text_renderer.update_text(id, text),
                    None => Ok(()),
                });
            if let Err(e) = result {
                log::warn!("Failed to update HUD text: {}", e);
            }
        }

        if let Some((_, color)) = hud.timer {
            if let Err(e) = text_renderer.update_color(TIMER, color) {
                log::warn!("Failed to update timer color: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::game::MoveInput;
    use crate::game::interaction::PickTarget;
    use crate::game::keys::GameKey;
    use crate::game::level::Level;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn game() -> GameState {
        let level = Level::builtin().unwrap();
        GameState::with_rng(GameConfig::default(), level, None, StdRng::seed_from_u64(5)).unwrap()
    }

    #[test]
    fn inventory_lists_item_names() {
        assert_eq!(inventory_line(&[]), "Inventory: empty");
        assert_eq!(
            inventory_line(&["brass_key".to_string(), "torch".to_string()]),
            "Inventory: brass key, torch"
        );
    }

    #[test]
    fn keypad_display_pads_to_code_length() {
        assert_eq!(keypad_display("", 4), "_ _ _ _");
        assert_eq!(keypad_display("41", 4), "4 1 _ _");
        assert_eq!(keypad_display("41273", 4), "4 1 2 7 3");
    }

    #[test]
    fn title_shows_only_the_banner() {
        let game = game();
        let hud = hud_text(&game);
        let banner = hud.banner.unwrap();
        assert!(banner.starts_with(&game.level.name));
        assert!(hud.room.is_none() && hud.timer.is_none());
        assert_eq!(overlay_rectangles(&game, 800.0, 600.0).len(), 1);
    }

    #[test]
    fn playing_hud_tracks_state() {
        let mut game = game();
        game.press(GameKey::Enter);
        game.press(GameKey::Flashlight);
        game.step(0.5, MoveInput::default());

        let hud = hud_text(&game);
        assert!(hud.banner.is_none());
        assert!(hud.room.unwrap().contains("solved 0/"));
        assert_eq!(hud.flashlight.unwrap(), "Flashlight: red [F]");
        let (clock, _) = hud.timer.unwrap();
        assert_eq!(clock, "10:00");
        assert!(hud.keypad.is_none());
    }

    #[test]
    fn prompt_names_the_target() {
        let mut game = game();
        game.press(GameKey::Enter);
        let index = game
            .session
            .scene
            .current_room()
            .interactables
            .iter()
            .position(|item| item.id == "cell_keypad")
            .unwrap();
        game.target = Some(PickTarget {
            index,
            cell: None,
            distance: 1.0,
        });
        assert_eq!(hud_text(&game).prompt.as_deref(), Some("[E] use keypad"));

        let rects = overlay_rectangles(&game, 800.0, 600.0);
        assert_eq!(rects.len(), 2);
        assert_eq!(rects[0].color, [1.0, 0.85, 0.3, 0.95]);
    }

    #[test]
    fn won_banner_reports_time() {
        let mut game = game();
        game.press(GameKey::Enter);
        game.elapsed = 125.0;
        game.current_screen = CurrentScreen::Won;
        let banner = hud_text(&game).banner.unwrap();
        assert!(banner.contains("You escaped!"));
        assert!(banner.contains("02:05"));
    }

    #[test]
    fn layout_stays_on_screen() {
        for (_, position) in Hud::layout(320.0, 240.0) {
            assert!(position.x >= 0.0 && position.y >= 0.0);
        }
    }
}
