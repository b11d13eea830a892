//! Configuration types and loaders for SPRIG.
//!
//! This crate owns the on-disk `sprig.toml` schema so the host and its
//! tests share a single source of truth.

pub mod settings;

pub use settings::{
    AssetsConfig, BoundaryMode, ConfigSource, ScreenConfig, SpriteConfig, SprigConfig,
    TimingConfig, CONFIG_ENV,
};
