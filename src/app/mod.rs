//! Application module.
//!
//! Ties winit, the renderer and the game together.
//!
//! # Module Structure
//!
//! - [`app_state`]: [`AppState`], everything that exists once a window and GPU are available
//! - [`event_handler`]: [`App`] and its winit event routing
//! - [`update`]: the per-frame simulation and render step
//!
//! # Event Flow
//!
//! 1. Window and device events are translated to [`GameKey`](crate::game::keys::GameKey)
//!    presses, held keys and mouse deltas.
//! 2. Each redraw advances the simulation in fixed steps by the time since the last frame.
//! 3. The HUD is refreshed from the game state and the frame is drawn.

pub mod app_state;
pub mod event_handler;
pub mod update;

pub use app_state::AppState;
pub use event_handler::App;
