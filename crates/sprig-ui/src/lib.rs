//! Terminal rendering for the SPRIG preview host.
//!
//! Maps the engine's pixel screen onto a ratatui stage, blits sprite frames
//! with half-block characters and draws the HUD around them. All rendering
//! uses [`ratatui`]; sprite state lives in [`sprig_engine`].

pub mod layout;
pub mod shell;
pub mod sprite;
pub mod stage;

pub use stage::{StageMapping, TerminalSurface};
