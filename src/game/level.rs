//! Level files.
//!
//! A level is a TOML document with one `[level]` table, any number of `[[room]]` tables (each
//! with nested `[[room.interactable]]` entries) and `[[transition]]` edges. Rooms are referred
//! to by id in the file; [`Level::from_toml_str`] resolves those ids to indices and validates
//! the whole graph before anything is built from it.

use crate::game::cube_puzzle::CubePuzzle;
use crate::game::room::{Interactable, InteractableKind, Room, RoomKind};
use crate::game::scene::{Requirement, SceneError, SceneManager, Transition};
use crate::game::state_manager::{FlashlightColor, GameStateManager, KEYPAD_MAX_DIGITS};
use rand::Rng;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Level shipped with the binary, used when no level path is configured.
const BUILTIN_LEVEL: &str = include_str!("../../assets/levels/default.toml");

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("failed to read level {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse level: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("level has no rooms")]
    NoRooms,
    #[error("room id '{0}' is used more than once")]
    DuplicateRoom(String),
    #[error("interactable id '{0}' is used more than once")]
    DuplicateInteractable(String),
    #[error("{context} refers to unknown room '{room}'")]
    UnknownRoom { context: String, room: String },
    #[error("cube panel '{0}' needs at least one row and one column")]
    EmptyCubePanel(String),
    #[error("keypad '{id}' has invalid code '{code}'")]
    InvalidCode { id: String, code: String },
    #[error("a time limit needs a game-over room")]
    MissingGameOverRoom,
    #[error("time limit must be a positive number of seconds, got {0}")]
    InvalidTimeLimit(f32),
    #[error("start room '{0}' ends the run before it begins")]
    TerminalStart(String),
    #[error(transparent)]
    Scene(#[from] SceneError),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LevelFile {
    level: LevelHeader,
    #[serde(default, rename = "room")]
    rooms: Vec<RoomDef>,
    #[serde(default, rename = "transition")]
    transitions: Vec<TransitionDef>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LevelHeader {
    name: String,
    start: String,
    #[serde(default)]
    intro: Option<String>,
    /// Seconds before the run is lost.
    #[serde(default)]
    time_limit: Option<f32>,
    /// Room entered when the time limit expires. Defaults to the first game-over room.
    #[serde(default)]
    game_over: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RoomDef {
    id: String,
    name: String,
    #[serde(default)]
    kind: RoomKind,
    size: [f32; 3],
    #[serde(default)]
    spawn: [f32; 2],
    #[serde(default)]
    spawn_yaw: f32,
    #[serde(default = "default_wall_color")]
    wall_color: [u8; 3],
    #[serde(default = "default_floor_color")]
    floor_color: [u8; 3],
    #[serde(default, rename = "interactable")]
    interactables: Vec<InteractableDef>,
}

#[derive(Debug, Deserialize)]
struct InteractableDef {
    id: String,
    position: [f32; 3],
    #[serde(default = "default_half_extents")]
    half_extents: [f32; 3],
    #[serde(flatten)]
    kind: InteractableKindDef,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum InteractableKindDef {
    Keypad {
        puzzle: String,
        code: String,
    },
    Key {
        item: String,
        #[serde(default)]
        revealed_by: Option<String>,
    },
    Door {
        target: String,
        #[serde(default)]
        color: Option<FlashlightColor>,
    },
    CubePanel {
        puzzle: String,
        rows: usize,
        cols: usize,
        #[serde(default = "default_scramble")]
        scramble: u32,
    },
    Note {
        text: String,
    },
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TransitionDef {
    from: String,
    to: String,
    #[serde(default)]
    requires_item: Option<String>,
    #[serde(default)]
    requires_puzzle: Option<String>,
}

fn default_wall_color() -> [u8; 3] {
    [120, 112, 100]
}

fn default_floor_color() -> [u8; 3] {
    [70, 60, 52]
}

fn default_half_extents() -> [f32; 3] {
    [0.25, 0.25, 0.25]
}

fn default_scramble() -> u32 {
    6
}

/// A validated level with room references resolved to indices.
#[derive(Debug, Clone)]
pub struct Level {
    pub name: String,
    pub intro: Option<String>,
    pub rooms: Vec<Room>,
    pub transitions: Vec<Transition>,
    pub start: usize,
    pub time_limit: Option<f32>,
    pub game_over_room: Option<usize>,
}

/// Fresh runtime state built from a [`Level`].
#[derive(Debug, Clone)]
pub struct LevelInstance {
    pub scene: SceneManager,
    pub state: GameStateManager,
    /// Cube puzzles keyed by puzzle id.
    pub cube_puzzles: HashMap<String, CubePuzzle>,
}

impl Level {
    pub fn builtin() -> Result<Self, LevelError> {
        Self::from_toml_str(BUILTIN_LEVEL)
    }

    pub fn load(path: &Path) -> Result<Self, LevelError> {
        let content = std::fs::read_to_string(path).map_err(|source| LevelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let level = Self::from_toml_str(&content)?;
        log::info!(
            "Loaded level '{}' from {} ({} rooms)",
            level.name,
            path.display(),
            level.rooms.len()
        );
        Ok(level)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, LevelError> {
        let file: LevelFile = toml::from_str(content)?;
        Self::from_file(file)
    }

    fn from_file(file: LevelFile) -> Result<Self, LevelError> {
        if file.rooms.is_empty() {
            return Err(LevelError::NoRooms);
        }

        let mut room_index = HashMap::new();
        for (index, room) in file.rooms.iter().enumerate() {
            if room_index.insert(room.id.clone(), index).is_some() {
                return Err(LevelError::DuplicateRoom(room.id.clone()));
            }
        }
        let resolve = |context: String, id: &str| {
            room_index
                .get(id)
                .copied()
                .ok_or_else(|| LevelError::UnknownRoom {
                    context,
                    room: id.to_string(),
                })
        };

        let start = resolve("level start".to_string(), &file.level.start)?;
        if file.rooms[start].kind.is_terminal() {
            return Err(LevelError::TerminalStart(file.level.start.clone()));
        }
        let game_over_room = match &file.level.game_over {
            Some(id) => Some(resolve("level game_over".to_string(), id)?),
            None => file
                .rooms
                .iter()
                .position(|room| room.kind == RoomKind::GameOver),
        };
        if let Some(limit) = file.level.time_limit {
            if !limit.is_finite() || limit <= 0.0 {
                return Err(LevelError::InvalidTimeLimit(limit));
            }
            if game_over_room.is_none() {
                return Err(LevelError::MissingGameOverRoom);
            }
        }

        let mut seen_interactables = HashSet::new();
        let mut rooms = Vec::with_capacity(file.rooms.len());
        for room in file.rooms {
            let mut interactables = Vec::with_capacity(room.interactables.len());
            for def in room.interactables {
                if !seen_interactables.insert(def.id.clone()) {
                    return Err(LevelError::DuplicateInteractable(def.id));
                }
                let kind = match def.kind {
                    InteractableKindDef::Keypad { puzzle, code } => {
                        if code.is_empty()
                            || code.len() > KEYPAD_MAX_DIGITS
                            || !code.chars().all(|c| c.is_ascii_digit())
                        {
                            return Err(LevelError::InvalidCode { id: def.id, code });
                        }
                        InteractableKind::Keypad { puzzle, code }
                    }
                    InteractableKindDef::Key { item, revealed_by } => {
                        InteractableKind::Key { item, revealed_by }
                    }
                    InteractableKindDef::Door { target, color } => InteractableKind::Door {
                        target: resolve(format!("door '{}'", def.id), &target)?,
                        color,
                    },
                    InteractableKindDef::CubePanel {
                        puzzle,
                        rows,
                        cols,
                        scramble,
                    } => {
                        if rows == 0 || cols == 0 {
                            return Err(LevelError::EmptyCubePanel(def.id));
                        }
                        InteractableKind::CubePanel {
                            puzzle,
                            rows,
                            cols,
                            scramble,
                        }
                    }
                    InteractableKindDef::Note { text } => InteractableKind::Note { text },
                };
                interactables.push(Interactable {
                    id: def.id,
                    position: def.position,
                    half_extents: def.half_extents,
                    kind,
                });
            }

            rooms.push(Room {
                id: room.id,
                name: room.name,
                kind: room.kind,
                size: room.size,
                spawn: room.spawn,
                spawn_yaw: room.spawn_yaw,
                wall_color: room.wall_color,
                floor_color: room.floor_color,
                interactables,
            });
        }

        let transitions = file
            .transitions
            .into_iter()
            .map(|def| {
                let context = format!("transition {} -> {}", def.from, def.to);
                Ok(Transition {
                    from: resolve(context.clone(), &def.from)?,
                    to: resolve(context, &def.to)?,
                    requirement: Requirement::from_parts(def.requires_item, def.requires_puzzle),
                })
            })
            .collect::<Result<Vec<_>, LevelError>>()?;

        Ok(Self {
            name: file.level.name,
            intro: file.level.intro,
            rooms,
            transitions,
            start,
            time_limit: file.level.time_limit,
            game_over_room,
        })
    }

    /// Every puzzle id the level can solve: keypads, cube panels and colored doors.
    pub fn puzzle_ids(&self) -> Vec<&str> {
        let mut ids = Vec::new();
        for item in self.rooms.iter().flat_map(|room| &room.interactables) {
            match &item.kind {
                InteractableKind::Keypad { puzzle, .. }
                | InteractableKind::CubePanel { puzzle, .. } => ids.push(puzzle.as_str()),
                InteractableKind::Door { color: Some(_), .. } => ids.push(item.id.as_str()),
                _ => {}
            }
        }
        ids
    }

    /// Builds a fresh scene, state and scrambled cube puzzles.
    pub fn instantiate<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<LevelInstance, LevelError> {
        let scene = SceneManager::new(self.rooms.clone(), self.transitions.clone(), self.start)?;

        let mut state = GameStateManager::new();
        for id in self.puzzle_ids() {
            state.register_puzzle(id);
        }

        let mut cube_puzzles = HashMap::new();
        for item in self.rooms.iter().flat_map(|room| &room.interactables) {
            if let InteractableKind::CubePanel {
                puzzle,
                rows,
                cols,
                scramble,
            } = &item.kind
            {
                let mut cubes = CubePuzzle::new(*rows, *cols);
                cubes.scramble(rng, *scramble);
                if cubes.is_solved() {
                    state.set_puzzle_solved(puzzle);
                }
                cube_puzzles.insert(puzzle.clone(), cubes);
            }
        }

        Ok(LevelInstance {
            scene,
            state,
            cube_puzzles,
        })
    }
}
