//! Rooms and the interactable objects placed in them.
//!
//! Rooms are axis-aligned boxes centred on the origin with the floor at `y = 0`. Interactables
//! are boxes described by a centre and half extents in room coordinates.

use crate::game::collision::AABB;
use crate::game::state_manager::{FlashlightColor, GameStateManager};
use serde::Deserialize;

/// Spacing between cube centres on a cube panel, in metres.
pub const CUBE_PITCH: f32 = 0.3;
/// Half the edge length of a single cube on a cube panel.
pub const CUBE_HALF: f32 = 0.12;

/// What reaching a room means for the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomKind {
    #[default]
    Normal,
    Win,
    GameOver,
}

impl RoomKind {
    pub fn is_terminal(self) -> bool {
        self != RoomKind::Normal
    }
}

/// A room the player can occupy.
#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    pub id: String,
    pub name: String,
    pub kind: RoomKind,
    /// Interior width (x), height (y) and depth (z).
    pub size: [f32; 3],
    /// Spawn point on the floor plane `[x, z]`.
    pub spawn: [f32; 2],
    /// Spawn heading in degrees; 0 looks toward -z.
    pub spawn_yaw: f32,
    pub wall_color: [u8; 3],
    pub floor_color: [u8; 3],
    pub interactables: Vec<Interactable>,
}

impl Room {
    pub fn half_width(&self) -> f32 {
        self.size[0] / 2.0
    }

    pub fn half_depth(&self) -> f32 {
        self.size[2] / 2.0
    }

    pub fn height(&self) -> f32 {
        self.size[1]
    }

    pub fn interactable(&self, id: &str) -> Option<&Interactable> {
        self.interactables.iter().find(|item| item.id == id)
    }
}

/// Behaviour attached to an [`Interactable`].
#[derive(Debug, Clone, PartialEq)]
pub enum InteractableKind {
    /// Numeric keypad that solves `puzzle` when `code` is entered.
    Keypad { puzzle: String, code: String },
    /// Pick-up item. Hidden while `revealed_by` is unsolved.
    Key {
        item: String,
        revealed_by: Option<String>,
    },
    /// Door leading to room index `target`. A colored door is also a puzzle whose id is the
    /// door's own id, solved by shining a matching flashlight on it.
    Door {
        target: usize,
        color: Option<FlashlightColor>,
    },
    /// Grid of rotating cubes facing +z.
    CubePanel {
        puzzle: String,
        rows: usize,
        cols: usize,
        scramble: u32,
    },
    /// Hint text shown on interaction.
    Note { text: String },
}

/// An object the player can look at and use.
#[derive(Debug, Clone, PartialEq)]
pub struct Interactable {
    pub id: String,
    pub position: [f32; 3],
    pub half_extents: [f32; 3],
    pub kind: InteractableKind,
}

impl Interactable {
    pub fn bounds(&self) -> AABB {
        AABB::from_center(self.position, self.half_extents)
    }

    /// Whether the object is currently present in the world.
    pub fn is_visible(&self, state: &GameStateManager) -> bool {
        match &self.kind {
            InteractableKind::Key { item, revealed_by } => {
                !state.has_item(item)
                    && revealed_by
                        .as_deref()
                        .is_none_or(|puzzle| state.is_puzzle_solved(puzzle))
            }
            _ => true,
        }
    }

    /// Whether the player collides with this object.
    pub fn is_solid(&self) -> bool {
        !matches!(self.kind, InteractableKind::Key { .. })
    }

    /// Centre of cube `(row, col)` on a cube panel. Row 0 is the top row.
    pub fn cube_center(&self, row: usize, col: usize) -> Option<[f32; 3]> {
        let InteractableKind::CubePanel { rows, cols, .. } = &self.kind else {
            return None;
        };
        if row >= *rows || col >= *cols {
            return None;
        }

        let x_offset = (col as f32 - (*cols as f32 - 1.0) / 2.0) * CUBE_PITCH;
        let y_offset = ((*rows as f32 - 1.0) / 2.0 - row as f32) * CUBE_PITCH;
        Some([
            self.position[0] + x_offset,
            self.position[1] + y_offset,
            self.position[2] + self.half_extents[2] + CUBE_HALF,
        ])
    }

    pub fn cube_bounds(&self, row: usize, col: usize) -> Option<AABB> {
        self.cube_center(row, col)
            .map(|center| AABB::from_center(center, [CUBE_HALF; 3]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel() -> Interactable {
        Interactable {
            id: "panel".into(),
            position: [0.0, 1.5, -3.0],
            half_extents: [0.5, 0.5, 0.05],
            kind: InteractableKind::CubePanel {
                puzzle: "cubes".into(),
                rows: 3,
                cols: 3,
                scramble: 4,
            },
        }
    }

    #[test]
    fn cube_centres_are_laid_out_on_the_panel_face() {
        let panel = panel();
        let top_left = panel.cube_center(0, 0).unwrap();
        let middle = panel.cube_center(1, 1).unwrap();

        assert!((top_left[0] + CUBE_PITCH).abs() < 1e-6);
        assert!((top_left[1] - (1.5 + CUBE_PITCH)).abs() < 1e-6);
        assert_eq!(middle[0], 0.0);
        assert_eq!(middle[1], 1.5);
        assert!(middle[2] > -3.0);
        assert!(panel.cube_center(3, 0).is_none());
    }

    #[test]
    fn keys_disappear_once_held_and_wait_for_their_puzzle() {
        let key = Interactable {
            id: "key".into(),
            position: [0.0; 3],
            half_extents: [0.1; 3],
            kind: InteractableKind::Key {
                item: "brass_key".into(),
                revealed_by: Some("cubes".into()),
            },
        };
        let mut state = GameStateManager::new();
        assert!(!key.is_visible(&state));
        state.set_puzzle_solved("cubes");
        assert!(key.is_visible(&state));
        state.add_item("brass_key");
        assert!(!key.is_visible(&state));
        assert!(!key.is_solid());
    }

    #[test]
    fn only_non_normal_rooms_are_terminal() {
        assert!(!RoomKind::Normal.is_terminal());
        assert!(RoomKind::Win.is_terminal());
        assert!(RoomKind::GameOver.is_terminal());
    }
}
