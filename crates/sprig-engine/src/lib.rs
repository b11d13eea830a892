//! Behavior engine for a screen-overlay sprite.
//!
//! This crate loads animation clips from JSON descriptors and PNG frames,
//! parses a behavior graph of weighted, conditioned transitions, and advances
//! a sprite's frame, position and state once per host tick. It never renders;
//! hosts draw through the [`Surface`] trait.
//!
//! # Quick start
//!
//! ```no_run
//! use std::time::Instant;
//! use sprig_engine::{SpriteController, SpriteSettings};
//!
//! let now = Instant::now();
//! let mut sprite = SpriteController::with_demo_pack(SpriteSettings::default(), now).unwrap();
//! sprite.set_height(96);
//! sprite.update(Instant::now());
//! let _frame = sprite.current_frame();
//! ```

mod clock;
mod controller;
mod demo_pack;
mod graph;
mod issue;
mod library;
mod loader;
mod motion;
mod sprite;
mod surface;
mod transition;
mod types;

pub use clock::FrameClock;
pub use controller::{SpriteController, SpriteSettings};
pub use graph::{BehaviorGraph, Condition, ConditionGroup, StateId, StateNode, Transition};
pub use issue::{LoadIssue, LoadReport};
pub use library::AnimationLibrary;
pub use loader::{decode_image_bytes, decode_image_file};
pub use motion::{BoundaryPolicy, MotionModel, Position, Screen, Size};
pub use sprite::{ClickLatch, SpriteInstance};
pub use surface::{DrawRect, Surface};
pub use transition::TransitionEngine;
pub use types::{Clip, ClipId, Frame, FrameImage, Movement};
