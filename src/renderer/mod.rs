//! Rendering.
//!
//! The room is rebuilt on the CPU every frame ([`mesh`]) and drawn by [`room_renderer`] with a
//! flashlight spotlight. Screen-space rectangles and glyphon text make up the HUD ([`hud`]).
//! [`wgpu_lib`] owns the device and orders the passes.

/// Heads-up display content and layout.
pub mod hud;
/// CPU mesh of the current room.
pub mod mesh;
/// Pipeline building utilities for WGPU.
pub mod pipeline_builder;
/// Vertex and uniform layouts.
pub mod primitives;
/// Screen-space rectangle rendering.
pub mod rectangle;
/// Room pass: pipeline, buffers and depth texture.
pub mod room_renderer;
/// Text rendering system.
pub mod text;
/// Wall texture loading with a generated fallback.
pub mod texture;
/// Core WGPU setup and frame orchestration.
pub mod wgpu_lib;
