//! Terminal UI module using ratatui.
//!
//! Single-screen interface:
//!
//! - `render`: frame rendering for the sign-in / signed-in states
//! - `input`: keyboard event handling
//! - `styles`: color palette and text styling

pub mod input;
pub mod render;
pub mod styles;
