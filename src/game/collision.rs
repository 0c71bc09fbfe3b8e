//! Collision primitives and player movement resolution.
//!
//! # Overview
//!
//! Rooms are small enough that every solid object can be tested directly, so there is no
//! spatial hierarchy here. The module provides:
//!
//! * [`AABB`] - Axis-Aligned Bounding Box used for interactables, cube cells and the player
//! * [`CollisionSystem`] - Keeps the player inside the current room and out of solid objects
//!
//! # How Movement Is Resolved
//!
//! 1. The desired move is split into its X and Z components
//! 2. Each component is applied on its own and rejected if it would overlap a solid object
//! 3. The result is clamped to the room's interior walls
//!
//! Applying the axes separately gives wall sliding for free: pushing diagonally into a
//! cabinet keeps the component that runs along its face.

use crate::game::room::Room;
use crate::game::state_manager::GameStateManager;

/// Axis-Aligned Bounding Box.
///
/// An AABB is a box whose faces are aligned with the world axes, defined by its minimum and
/// maximum corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl AABB {
    /// Creates a new AABB from minimum and maximum corner points.
    pub fn new(min: [f32; 3], max: [f32; 3]) -> Self {
        Self { min, max }
    }

    /// Creates an AABB from its centre and half extents.
    pub fn from_center(center: [f32; 3], half_extents: [f32; 3]) -> Self {
        Self::new(
            [
                center[0] - half_extents[0],
                center[1] - half_extents[1],
                center[2] - half_extents[2],
            ],
            [
                center[0] + half_extents[0],
                center[1] + half_extents[1],
                center[2] + half_extents[2],
            ],
        )
    }

    /// Checks if this AABB intersects with another AABB.
    ///
    /// Two AABBs intersect if they overlap on all three axes. Touching faces do not count,
    /// so a player standing flush against a wall can still slide along it.
    pub fn intersects(&self, other: &AABB) -> bool {
        for i in 0..3 {
            if self.max[i] <= other.min[i] || self.min[i] >= other.max[i] {
                return false;
            }
        }
        true
    }

    pub fn contains_point(&self, point: [f32; 3]) -> bool {
        (0..3).all(|i| point[i] >= self.min[i] && point[i] <= self.max[i])
    }

    /// Returns the center point of this AABB.
    pub fn center(&self) -> [f32; 3] {
        [
            (self.min[0] + self.max[0]) * 0.5,
            (self.min[1] + self.max[1]) * 0.5,
            (self.min[2] + self.max[2]) * 0.5,
        ]
    }

    /// Distance along `direction` at which a ray from `origin` enters the box.
    ///
    /// Uses the slab method. A ray starting inside the box hits at distance `0.0`; boxes
    /// entirely behind the origin are missed.
    ///
    /// # Arguments
    ///
    /// * `origin` - Ray start point
    /// * `direction` - Ray direction; does not need to be normalized, distances are measured
    ///   in multiples of it
    pub fn ray_intersect(&self, origin: [f32; 3], direction: [f32; 3]) -> Option<f32> {
        let mut t_min = 0.0_f32;
        let mut t_max = f32::INFINITY;

        for i in 0..3 {
            if direction[i].abs() < f32::EPSILON {
                // Parallel to this slab: must already be between its planes.
                if origin[i] < self.min[i] || origin[i] > self.max[i] {
                    return None;
                }
                continue;
            }

            let inverse = 1.0 / direction[i];
            let mut t0 = (self.min[i] - origin[i]) * inverse;
            let mut t1 = (self.max[i] - origin[i]) * inverse;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }

            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_min > t_max {
                return None;
            }
        }

        Some(t_min)
    }
}

/// Resolves player movement against the current room.
///
/// The player is treated as an upright box `2 * player_radius` wide and `player_height`
/// tall standing on the floor.
#[derive(Debug, Clone, Copy)]
pub struct CollisionSystem {
    pub player_radius: f32,
    pub player_height: f32,
}

impl Default for CollisionSystem {
    fn default() -> Self {
        Self::new(0.3, 1.7)
    }
}

impl CollisionSystem {
    pub fn new(player_radius: f32, player_height: f32) -> Self {
        Self {
            player_radius,
            player_height,
        }
    }

    /// Player volume when standing at floor position `[x, z]`.
    pub fn player_bounds(&self, x: f32, z: f32) -> AABB {
        AABB::new(
            [x - self.player_radius, 0.0, z - self.player_radius],
            [x + self.player_radius, self.player_height, z + self.player_radius],
        )
    }

    /// Whether a player at `[x, z]` overlaps any solid, visible interactable.
    pub fn is_blocked(&self, room: &Room, state: &GameStateManager, x: f32, z: f32) -> bool {
        let player = self.player_bounds(x, z);
        room.interactables
            .iter()
            .filter(|item| item.is_solid() && item.is_visible(state))
            .any(|item| item.bounds().intersects(&player))
    }

    /// Keeps a floor position inside the room's walls.
    pub fn clamp_to_room(&self, room: &Room, x: f32, z: f32) -> (f32, f32) {
        let limit_x = (room.half_width() - self.player_radius).max(0.0);
        let limit_z = (room.half_depth() - self.player_radius).max(0.0);
        (x.clamp(-limit_x, limit_x), z.clamp(-limit_z, limit_z))
    }

    /// Moves from `current` toward `desired` (both `[x, z]`), sliding along obstacles.
    ///
    /// # Returns
    ///
    /// The furthest reachable position, never inside a wall or a solid object unless the
    /// player already started there.
    pub fn resolve(
        &self,
        room: &Room,
        state: &GameStateManager,
        current: [f32; 2],
        desired: [f32; 2],
    ) -> [f32; 2] {
        let (desired_x, desired_z) = self.clamp_to_room(room, desired[0], desired[1]);
        let [mut x, mut z] = current;

        // A player spawned inside something may always move.
        let stuck = self.is_blocked(room, state, x, z);

        if stuck || !self.is_blocked(room, state, desired_x, z) {
            x = desired_x;
        }
        if stuck || !self.is_blocked(room, state, x, desired_z) {
            z = desired_z;
        }

        [x, z]
    }
}
