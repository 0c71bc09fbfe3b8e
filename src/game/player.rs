//! Player state and movement logic.
//!
//! This module defines the [`Player`] struct, which tracks the player's position and
//! orientation, and provides methods for movement and view matrix calculation.
//!
//! # Coordinate System
//!
//! Right-handed, y up, metres:
//! - X-axis: East
//! - Y-axis: Up (the player's `y` is eye height above the floor)
//! - Z-axis: South; yaw 0 looks toward -Z
//!
//! Angles are measured in degrees:
//! - **Pitch**: Up/down look angle (-89° to +89°)
//! - **Yaw**: Left/right look angle, increasing clockwise when seen from above

use crate::config::GameConfig;
use crate::game::collision::CollisionSystem;
use crate::game::room::Room;
use crate::game::state_manager::GameStateManager;
use crate::math::mat::Mat4;
use crate::math::vec::Vec3;

/// Eye height above the floor in metres.
pub const EYE_HEIGHT: f32 = 1.6;

/// Represents the player character's state in the world.
#[derive(Debug, Clone)]
pub struct Player {
    /// Eye position in world space `[x, y, z]`.
    pub position: [f32; 3],

    /// Pitch angle in degrees. Positive looks up; clamped to ±89° to prevent flipping.
    pub pitch: f32,

    /// Yaw angle in degrees.
    ///
    /// - 0°: Looking north (-Z)
    /// - 90°: Looking east (+X)
    /// - 180°: Looking south
    /// - 270°: Looking west
    pub yaw: f32,

    /// Vertical field of view in degrees.
    pub fov: f32,

    /// Movement speed in metres per second.
    pub speed: f32,

    /// Degrees of rotation per pixel of mouse motion.
    pub mouse_sensitivity: f32,
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

impl Player {
    pub fn new() -> Self {
        Self {
            position: [0.0, EYE_HEIGHT, 0.0],
            pitch: 0.0,
            yaw: 0.0,
            fov: 75.0,
            speed: 2.5,
            mouse_sensitivity: 0.12,
        }
    }

    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            fov: config.fov,
            speed: config.move_speed,
            mouse_sensitivity: config.mouse_sensitivity,
            ..Self::new()
        }
    }

    /// Places the player at the room's spawn point, level with the horizon.
    pub fn spawn_in(&mut self, room: &Room) {
        self.position = [room.spawn[0], EYE_HEIGHT, room.spawn[1]];
        self.yaw = room.spawn_yaw;
        self.pitch = 0.0;
    }

    /// Unit vector the camera looks along.
    pub fn forward(&self) -> Vec3 {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        Vec3::new(
            yaw.sin() * pitch.cos(),
            pitch.sin(),
            -yaw.cos() * pitch.cos(),
        )
    }

    /// Horizontal unit vector to the player's right.
    pub fn right(&self) -> Vec3 {
        let yaw = self.yaw.to_radians();
        Vec3::new(yaw.cos(), 0.0, yaw.sin())
    }

    pub fn eye(&self) -> Vec3 {
        Vec3::from(self.position)
    }

    /// Computes the view matrix for the player's current position and orientation.
    pub fn get_view_matrix(&self) -> Mat4 {
        Mat4::look_to(self.eye(), self.forward(), Vec3::UP)
    }

    /// Combined projection and view matrix, ready for the vertex shader.
    pub fn get_view_proj_matrix(&self, aspect_ratio: f32, near: f32, far: f32) -> Mat4 {
        let projection = Mat4::perspective(self.fov.to_radians(), aspect_ratio, near, far);
        projection.multiply(&self.get_view_matrix())
    }

    /// Applies a mouse delta in pixels. Moving right turns right, moving down looks down.
    pub fn mouse_movement(&mut self, delta_x: f64, delta_y: f64) {
        self.yaw = (self.yaw + delta_x as f32 * self.mouse_sensitivity).rem_euclid(360.0);
        self.pitch -= delta_y as f32 * self.mouse_sensitivity;

        // Clamp pitch to prevent flipping
        self.pitch = self.pitch.clamp(-89.0, 89.0);
    }

    /// Floor-plane displacement `[dx, dz]` for the pressed directions over `delta_time`.
    ///
    /// Diagonal movement is normalized so it is no faster than straight movement.
    pub fn movement_delta(
        &self,
        delta_time: f32,
        forward: bool,
        backward: bool,
        left: bool,
        right: bool,
    ) -> [f32; 2] {
        let yaw = self.yaw.to_radians();
        let ahead = [yaw.sin(), -yaw.cos()];
        let side = [yaw.cos(), yaw.sin()];

        let axis = |positive: bool, negative: bool| positive as i32 as f32 - negative as i32 as f32;
        let along = axis(forward, backward);
        let across = axis(right, left);

        let dx = ahead[0] * along + side[0] * across;
        let dz = ahead[1] * along + side[1] * across;
        let length = (dx * dx + dz * dz).sqrt();
        if length <= f32::EPSILON {
            return [0.0, 0.0];
        }

        let scale = self.speed * delta_time / length;
        [dx * scale, dz * scale]
    }

    /// Walks in the pressed directions, sliding along walls and solid objects.
    #[allow(clippy::too_many_arguments)]
    pub fn move_with_collision(
        &mut self,
        collision_system: &CollisionSystem,
        room: &Room,
        state: &GameStateManager,
        delta_time: f32,
        forward: bool,
        backward: bool,
        left: bool,
        right: bool,
    ) {
        let [dx, dz] = self.movement_delta(delta_time, forward, backward, left, right);
        if dx == 0.0 && dz == 0.0 {
            return;
        }

        let current = [self.position[0], self.position[2]];
        let desired = [current[0] + dx, current[1] + dz];
        let [x, z] = collision_system.resolve(room, state, current, desired);
        self.position[0] = x;
        self.position[2] = z;
    }
}
