//! Game state management module.
//!
//! This module defines the [`GameState`] struct, which owns one run through a level: the
//! player, the puzzle state, the room graph, the countdown and the screen being shown. It is
//! advanced in fixed steps by [`FixedTimestep`] and fed discrete key presses through
//! [`GameState::press`].

pub mod audio;
pub mod collision;
pub mod cube_puzzle;
pub mod interaction;
pub mod keys;
pub mod level;
pub mod player;
pub mod room;
pub mod scene;
pub mod state_manager;

use self::audio::{GameAudioManager, SoundCue};
use self::collision::CollisionSystem;
use self::interaction::{InteractionOutcome, PickTarget};
use self::keys::GameKey;
use self::level::{Level, LevelError, LevelInstance};
use self::player::Player;
use self::room::{InteractableKind, RoomKind};
use self::state_manager::KeypadResult;
use crate::config::GameConfig;
use glyphon::Color;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Seconds a HUD message stays on screen.
const MESSAGE_SECONDS: f32 = 3.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrentScreen {
    Title,
    Playing,
    /// Typing into the keypad named by [`GameState::active_keypad`].
    Keypad,
    Won,
    GameOver,
}

impl CurrentScreen {
    pub fn is_finished(self) -> bool {
        matches!(self, CurrentScreen::Won | CurrentScreen::GameOver)
    }
}

/// Movement keys held during a simulation step.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MoveInput {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

impl MoveInput {
    pub fn any(&self) -> bool {
        self.forward || self.backward || self.left || self.right
    }
}

/// Fixed-step accumulator.
///
/// Frame time is added with [`FixedTimestep::advance`], which returns how many steps of
/// [`FixedTimestep::step`] seconds to simulate. Long frames are capped at `max_steps` and the
/// remaining backlog is dropped so a stall never turns into a burst of catch-up steps.
#[derive(Debug, Clone, Copy)]
pub struct FixedTimestep {
    step: f32,
    max_steps: u32,
    accumulator: f32,
}

impl FixedTimestep {
    pub fn new(step: f32, max_steps: u32) -> Self {
        Self {
            step,
            max_steps: max_steps.max(1),
            accumulator: 0.0,
        }
    }

    pub fn step(&self) -> f32 {
        self.step
    }

    pub fn advance(&mut self, frame_seconds: f32) -> u32 {
        self.accumulator += frame_seconds.max(0.0);
        let mut steps = 0;
        while self.accumulator >= self.step && steps < self.max_steps {
            self.accumulator -= self.step;
            steps += 1;
        }
        if steps == self.max_steps && self.accumulator >= self.step {
            log::debug!("Dropping {:.3}s of simulation backlog", self.accumulator);
            self.accumulator %= self.step;
        }
        steps
    }
}

/// Timer configuration for the level countdown.
#[derive(Debug, Clone)]
pub struct TimerConfig {
    pub duration: f32,
    pub warning_threshold: f32,  // When to turn yellow
    pub critical_threshold: f32, // When to turn red
    pub normal_color: Color,
    pub warning_color: Color,
    pub critical_color: Color,
}

impl TimerConfig {
    pub fn with_duration(duration: f32) -> Self {
        Self {
            duration,
            warning_threshold: (duration * 0.25).min(120.0),
            critical_threshold: (duration * 0.1).min(30.0),
            ..Self::default()
        }
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            duration: 600.0,
            warning_threshold: 120.0,
            critical_threshold: 30.0,
            normal_color: Color::rgb(230, 230, 220),
            warning_color: Color::rgb(255, 220, 100),
            critical_color: Color::rgb(255, 90, 80),
        }
    }
}

/// Countdown driven by simulation time.
#[derive(Debug, Clone)]
pub struct GameTimer {
    pub config: TimerConfig,
    remaining: f32,
    pub is_running: bool,
}

impl GameTimer {
    pub fn new(config: TimerConfig) -> Self {
        Self {
            remaining: config.duration,
            config,
            is_running: false,
        }
    }

    pub fn start(&mut self) {
        self.is_running = true;
    }

    pub fn stop(&mut self) {
        self.is_running = false;
    }

    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    pub fn is_expired(&self) -> bool {
        self.remaining <= 0.0
    }

    /// Counts down by `dt`. Returns `true` on the step the timer runs out.
    pub fn update(&mut self, dt: f32) -> bool {
        if !self.is_running || self.is_expired() {
            return false;
        }
        self.remaining = (self.remaining - dt).max(0.0);
        self.is_expired()
    }

    pub fn get_current_color(&self) -> Color {
        if self.remaining <= self.config.critical_threshold {
            self.config.critical_color
        } else if self.remaining <= self.config.warning_threshold {
            self.config.warning_color
        } else {
            self.config.normal_color
        }
    }

    pub fn format_time(&self) -> String {
        format_clock(self.remaining)
    }
}

/// `MM:SS`, rounding partial seconds up so the clock reads `00:00` only once time is out.
pub fn format_clock(seconds: f32) -> String {
    let total = seconds.max(0.0).ceil() as u32;
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// Short-lived line of feedback shown above the crosshair.
#[derive(Debug, Clone, PartialEq)]
pub struct HudMessage {
    pub text: String,
    pub remaining: f32,
}

/// One run through a level, plus the screen being shown.
pub struct GameState {
    pub config: GameConfig,
    pub level: Level,
    pub session: LevelInstance,
    pub player: Player,
    pub collision_system: CollisionSystem,
    pub current_screen: CurrentScreen,
    /// Interactable id of the keypad being typed into.
    pub active_keypad: Option<String>,
    /// What the crosshair is over, refreshed every step.
    pub target: Option<PickTarget>,
    pub timer: Option<GameTimer>,
    pub message: Option<HudMessage>,
    /// Seconds spent playing this run.
    pub elapsed: f32,
    /// Whether the mouse is captured for camera movement.
    pub capture_mouse: bool,
    pub timestep: FixedTimestep,
    pub audio_manager: Option<GameAudioManager>,
    rng: StdRng,
}

impl GameState {
    pub fn new(
        config: GameConfig,
        level: Level,
        audio_manager: Option<GameAudioManager>,
    ) -> Result<Self, LevelError> {
        Self::with_rng(config, level, audio_manager, StdRng::from_entropy())
    }

    /// Builds a session with a caller-supplied rng, which fixes the cube scrambles.
    pub fn with_rng(
        config: GameConfig,
        level: Level,
        audio_manager: Option<GameAudioManager>,
        mut rng: StdRng,
    ) -> Result<Self, LevelError> {
        let session = level.instantiate(&mut rng)?;
        let mut player = Player::from_config(&config);
        player.spawn_in(session.scene.current_room());
        let timestep = FixedTimestep::new(config.tick_seconds(), config.max_steps_per_frame);

        Ok(Self {
            timer: level
                .time_limit
                .map(|limit| GameTimer::new(TimerConfig::with_duration(limit))),
            config,
            level,
            session,
            player,
            collision_system: CollisionSystem::default(),
            current_screen: CurrentScreen::Title,
            active_keypad: None,
            target: None,
            message: None,
            elapsed: 0.0,
            capture_mouse: false,
            timestep,
            audio_manager,
            rng,
        })
    }

    /// Leaves the title screen.
    pub fn start(&mut self) {
        if self.current_screen != CurrentScreen::Title {
            return;
        }
        log::info!("Starting '{}'", self.level.name);
        self.current_screen = CurrentScreen::Playing;
        self.capture_mouse = true;
        if let Some(timer) = &mut self.timer {
            timer.start();
        }
        if let Some(intro) = self.level.intro.clone() {
            self.show_message(intro);
        }
    }

    /// Throws the current run away and starts the level again.
    pub fn restart(&mut self) -> Result<(), LevelError> {
        self.session = self.level.instantiate(&mut self.rng)?;
        self.player.spawn_in(self.session.scene.current_room());
        self.timer = self
            .level
            .time_limit
            .map(|limit| GameTimer::new(TimerConfig::with_duration(limit)));
        self.active_keypad = None;
        self.target = None;
        self.message = None;
        self.elapsed = 0.0;
        self.current_screen = CurrentScreen::Title;
        self.start();
        log::info!("Run restarted");
        Ok(())
    }

    pub fn show_message(&mut self, text: impl Into<String>) {
        self.message = Some(HudMessage {
            text: text.into(),
            remaining: MESSAGE_SECONDS,
        });
    }

    /// Handles a single key press according to the current screen.
    pub fn press(&mut self, key: GameKey) {
        match (self.current_screen, key) {
            (CurrentScreen::Title, GameKey::MouseButtonLeft | GameKey::Interact | GameKey::Enter) => {
                self.start();
            }

            (CurrentScreen::Playing, GameKey::MouseButtonLeft) if !self.capture_mouse => {
                self.capture_mouse = true;
            }
            (CurrentScreen::Playing, GameKey::MouseButtonLeft | GameKey::Interact) => {
                self.interact();
            }
            (CurrentScreen::Playing, GameKey::Flashlight) => {
                let color = self.session.state.cycle_flashlight();
                log::debug!("Flashlight is now {}", color.name());
            }
            (CurrentScreen::Playing, GameKey::Escape) => {
                self.capture_mouse = !self.capture_mouse;
            }

            (CurrentScreen::Keypad, GameKey::Digit(digit)) => {
                if self.session.state.press_keypad_digit(digit) {
                    self.play(SoundCue::KeypadBeep);
                }
            }
            (CurrentScreen::Keypad, GameKey::Backspace) => self.session.state.keypad_backspace(),
            (CurrentScreen::Keypad, GameKey::Enter) => self.submit_keypad(),
            (CurrentScreen::Keypad, GameKey::Escape) => self.close_keypad(),

            (CurrentScreen::Won | CurrentScreen::GameOver, GameKey::Restart) => {
                if let Err(e) = self.restart() {
                    log::error!("Failed to restart: {}", e);
                }
            }

            _ => {}
        }
    }

    pub fn mouse_look(&mut self, delta_x: f64, delta_y: f64) {
        if self.current_screen == CurrentScreen::Playing && self.capture_mouse {
            self.player.mouse_movement(delta_x, delta_y);
        }
    }

    /// Advances the simulation by one fixed step.
    pub fn step(&mut self, dt: f32, input: MoveInput) {
        if let Some(message) = &mut self.message {
            message.remaining -= dt;
            if message.remaining <= 0.0 {
                self.message = None;
            }
        }
        for cubes in self.session.cube_puzzles.values_mut() {
            cubes.animate(dt);
        }

        let playing = self.current_screen == CurrentScreen::Playing;
        if playing {
            self.player.move_with_collision(
                &self.collision_system,
                self.session.scene.current_room(),
                &self.session.state,
                dt,
                input.forward,
                input.backward,
                input.left,
                input.right,
            );
            self.target = interaction::pick(
                self.player.position,
                self.player.forward().into(),
                self.session.scene.current_room(),
                &self.session.state,
                self.config.reach,
            );
        } else {
            self.target = None;
        }
        self.update_footsteps(playing && input.any());

        if matches!(
            self.current_screen,
            CurrentScreen::Playing | CurrentScreen::Keypad
        ) {
            self.elapsed += dt;
            let expired = self.timer.as_mut().is_some_and(|timer| timer.update(dt));
            if expired {
                self.time_up();
            }
        }
    }

    /// Uses whatever is under the crosshair.
    pub fn interact(&mut self) {
        let Some(target) = self.target else {
            return;
        };
        let outcome = interaction::interact(&target, &mut self.session);
        if let Some(cue) = SoundCue::for_interaction(&outcome) {
            self.play(cue);
        }
        if let Some(text) = outcome.message() {
            self.show_message(text);
        }

        match outcome {
            InteractionOutcome::OpenKeypad { interactable } => {
                self.active_keypad = Some(interactable);
                self.current_screen = CurrentScreen::Keypad;
            }
            InteractionOutcome::Moved { .. } => self.enter_current_room(),
            _ => {}
        }
    }

    /// Code and puzzle of the keypad being typed into.
    pub fn active_keypad_code(&self) -> Option<(&str, &str)> {
        let id = self.active_keypad.as_deref()?;
        match &self.session.scene.current_room().interactable(id)?.kind {
            InteractableKind::Keypad { puzzle, code } => Some((puzzle.as_str(), code.as_str())),
            _ => None,
        }
    }

    fn submit_keypad(&mut self) {
        let Some((puzzle, code)) = self
            .active_keypad_code()
            .map(|(puzzle, code)| (puzzle.to_string(), code.to_string()))
        else {
            self.close_keypad();
            return;
        };

        let result = self.session.state.submit_keypad(&puzzle, &code);
        self.play(SoundCue::for_keypad(result));
        match result {
            KeypadResult::Accepted => {
                self.show_message("Access granted.");
                self.close_keypad();
            }
            KeypadResult::AlreadySolved => self.close_keypad(),
            KeypadResult::Rejected => self.show_message("Wrong code."),
        }
    }

    fn close_keypad(&mut self) {
        self.session.state.clear_keypad();
        self.active_keypad = None;
        if self.current_screen == CurrentScreen::Keypad {
            self.current_screen = CurrentScreen::Playing;
        }
    }

    /// Respawns in the room the scene now points at and ends the run on a terminal room.
    fn enter_current_room(&mut self) {
        let room = self.session.scene.current_room();
        log::info!("Entered '{}'", room.name);
        self.player.spawn_in(room);
        self.target = None;

        match self.session.scene.outcome() {
            Some(RoomKind::Win) => self.finish(CurrentScreen::Won),
            Some(RoomKind::GameOver) => self.finish(CurrentScreen::GameOver),
            Some(RoomKind::Normal) | None => {}
        }
    }

    fn time_up(&mut self) {
        log::info!("Time limit reached");
        self.active_keypad = None;
        self.session.state.clear_keypad();
        if let Some(index) = self.level.game_over_room {
            if let Err(e) = self.session.scene.switch_to(index) {
                log::error!("Cannot switch to game-over room: {}", e);
            }
        }
        self.show_message("Time is up.");
        self.enter_current_room();
        // A level whose game-over room is not marked as such still ends here.
        if !self.current_screen.is_finished() {
            self.finish(CurrentScreen::GameOver);
        }
    }

    fn finish(&mut self, screen: CurrentScreen) {
        self.current_screen = screen;
        self.capture_mouse = false;
        if let Some(timer) = &mut self.timer {
            timer.stop();
        }
        self.update_footsteps(false);
        log::info!("Run finished: {:?} after {}", screen, format_clock(self.elapsed));
    }

    fn play(&mut self, cue: SoundCue) {
        if let Some(audio) = &mut self.audio_manager {
            if let Err(e) = audio.play(cue) {
                log::warn!("Failed to play {:?}: {}", cue, e);
            }
        }
    }

    fn update_footsteps(&mut self, walking: bool) {
        let Some(audio) = &mut self.audio_manager else {
            return;
        };
        let result = match (walking, audio.is_walking()) {
            (true, false) => audio.start_walking(),
            (false, true) => audio.stop_walking(),
            _ => Ok(()),
        };
        if let Err(e) = result {
            log::warn!("Footstep audio failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state_manager::FlashlightColor;

    fn game() -> GameState {
        let level = Level::builtin().unwrap();
        GameState::with_rng(GameConfig::default(), level, None, StdRng::seed_from_u64(11))
            .unwrap()
    }

    /// Turns the player to face the centre of interactable `id` in the current room.
    fn aim_at(game: &mut GameState, id: &str) {
        let item = game
            .session
            .scene
            .current_room()
            .interactable(id)
            .unwrap()
            .clone();
        let [x, y, z] = item.position;
        // Stand a little over a metre in front of it, on the side facing the spawn point.
        let spawn = game.session.scene.current_room().spawn;
        let (away_x, away_z) = (spawn[0] - x, spawn[1] - z);
        let length = (away_x * away_x + away_z * away_z).sqrt();
        game.player.position = [
            x + away_x / length * 1.2,
            player::EYE_HEIGHT,
            z + away_z / length * 1.2,
        ];
        let eye = game.player.position;
        let (dx, dy, dz) = (x - eye[0], y - eye[1], z - eye[2]);
        game.player.yaw = dx.atan2(-dz).to_degrees();
        game.player.pitch = dy.atan2((dx * dx + dz * dz).sqrt()).to_degrees();
        game.step(game.timestep.step(), MoveInput::default());
    }

    #[test]
    fn fixed_timestep_counts_whole_steps_and_caps_backlog() {
        let mut timestep = FixedTimestep::new(0.25, 4);
        assert_eq!(timestep.advance(0.625), 2);
        assert_eq!(timestep.advance(0.125), 1);
        assert_eq!(timestep.advance(10.0), 4);
        assert_eq!(timestep.advance(0.125), 0);
        assert_eq!(timestep.advance(-1.0), 0);
    }

    #[test]
    fn clock_formatting_rounds_up() {
        assert_eq!(format_clock(600.0), "10:00");
        assert_eq!(format_clock(59.2), "01:00");
        assert_eq!(format_clock(0.0), "00:00");
        assert_eq!(format_clock(-3.0), "00:00");
    }

    #[test]
    fn timer_changes_color_and_expires_once() {
        let mut timer = GameTimer::new(TimerConfig::with_duration(100.0));
        assert!(!timer.update(50.0));
        timer.start();
        assert_eq!(timer.get_current_color(), timer.config.normal_color);
        assert!(!timer.update(80.0));
        assert_eq!(timer.get_current_color(), timer.config.warning_color);
        assert!(timer.update(30.0));
        assert!(!timer.update(1.0));
        assert_eq!(timer.format_time(), "00:00");
    }

    #[test]
    fn title_screen_waits_for_input() {
        let mut game = game();
        assert_eq!(game.current_screen, CurrentScreen::Title);
        game.press(GameKey::Flashlight);
        assert_eq!(game.session.state.flashlight(), FlashlightColor::White);
        game.press(GameKey::Interact);
        assert_eq!(game.current_screen, CurrentScreen::Playing);
        assert!(game.capture_mouse);
        assert!(game.message.is_some());
    }

    #[test]
    fn keypad_flow_opens_and_solves() {
        let mut game = game();
        game.start();
        aim_at(&mut game, "cell_keypad");
        game.press(GameKey::Interact);
        assert_eq!(game.current_screen, CurrentScreen::Keypad);

        for digit in ['1', '1'] {
            game.press(GameKey::Digit(digit));
        }
        game.press(GameKey::Enter);
        assert_eq!(game.current_screen, CurrentScreen::Keypad);
        assert_eq!(game.session.state.keypad_buffer(), "");

        for digit in "4127".chars() {
            game.press(GameKey::Digit(digit));
        }
        game.press(GameKey::Backspace);
        game.press(GameKey::Digit('7'));
        game.press(GameKey::Enter);
        assert_eq!(game.current_screen, CurrentScreen::Playing);
        assert!(game.session.state.is_puzzle_solved("cell_code"));

        aim_at(&mut game, "cell_door");
        game.press(GameKey::MouseButtonLeft);
        assert_eq!(game.session.scene.current_room().id, "gallery");
        let spawn = game.session.scene.current_room().spawn;
        assert_eq!([game.player.position[0], game.player.position[2]], spawn);
    }

    #[test]
    fn escape_closes_keypad_without_solving() {
        let mut game = game();
        game.start();
        aim_at(&mut game, "cell_keypad");
        game.press(GameKey::Interact);
        game.press(GameKey::Digit('4'));
        game.press(GameKey::Escape);
        assert_eq!(game.current_screen, CurrentScreen::Playing);
        assert_eq!(game.session.state.keypad_buffer(), "");
        assert!(game.active_keypad.is_none());
    }

    #[test]
    fn click_recaptures_mouse_before_interacting() {
        let mut game = game();
        game.start();
        game.press(GameKey::Escape);
        assert!(!game.capture_mouse);

        aim_at(&mut game, "cell_keypad");
        game.press(GameKey::MouseButtonLeft);
        assert!(game.capture_mouse);
        assert_eq!(game.current_screen, CurrentScreen::Playing);
    }

    #[test]
    fn movement_only_happens_while_playing() {
        let mut game = game();
        let start = game.player.position;
        let forward = MoveInput {
            forward: true,
            ..MoveInput::default()
        };
        game.step(0.1, forward);
        assert_eq!(game.player.position, start);

        game.start();
        game.step(0.1, forward);
        assert!(game.player.position[2] < start[2]);
    }

    #[test]
    fn time_limit_switches_to_game_over_room() {
        let mut game = game();
        game.start();
        let limit = game.level.time_limit.unwrap();
        game.step(limit + 1.0, MoveInput::default());

        assert_eq!(game.current_screen, CurrentScreen::GameOver);
        assert_eq!(game.session.scene.current_room().id, "caught");
        assert!(!game.capture_mouse);

        game.press(GameKey::Restart);
        assert_eq!(game.current_screen, CurrentScreen::Playing);
        assert_eq!(game.session.scene.current_room().id, "cell");
        assert_eq!(game.session.state.solved_count(), 0);
        assert!(game.timer.as_ref().is_some_and(|timer| !timer.is_expired()));
    }
}
