//! Math utilities and types for 3D graphics and game logic.
//!
//! This module provides matrix and vector types and operations, as well as
//! helper functions for angle conversions. All types are designed to be
//! compatible with GPU memory layouts (e.g., for use with WGPU/WGSL).
//!
//! # Module Organization
//!
//! - [`vec`] module contains the vector type used for picking and camera math
//! - [`mat`] module contains the 4x4 matrix used for view/projection uniforms
//! - Utility functions like angle conversions are provided at root level

pub mod mat;
pub mod vec;

/// Converts degrees to radians.
///
/// This handles angle wrapping by first normalizing the input to the range (-360, 360).
///
/// # Arguments
///
/// * `degrees` - The angle in degrees (can be any finite value)
///
/// # Returns
///
/// The angle in radians.
pub fn deg_to_rad(degrees: f32) -> f32 {
    (degrees % 360.0) * (std::f32::consts::PI / 180.0)
}

/// Shortest signed difference `to - from` in degrees, in `(-180, 180]`.
pub fn angle_delta(from: f32, to: f32) -> f32 {
    let mut delta = (to - from) % 360.0;
    if delta > 180.0 {
        delta -= 360.0;
    } else if delta <= -180.0 {
        delta += 360.0;
    }
    delta
}
