use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "SPRIG_CONFIG";

/// Top-level schema of `sprig.toml`. Every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SprigConfig {
    pub screen: ScreenConfig,
    pub sprite: SpriteConfig,
    pub assets: AssetsConfig,
    pub timing: TimingConfig,
}

/// Virtual screen the sprite moves across, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScreenConfig {
    pub width: i32,
    pub height: i32,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpriteConfig {
    pub height: i32,
    pub x: i32,
    pub y: i32,
    pub boundary: BoundaryMode,
}

impl Default for SpriteConfig {
    fn default() -> Self {
        Self {
            height: 100,
            x: 0,
            y: 0,
            boundary: BoundaryMode::Wrap,
        }
    }
}

/// Horizontal edge behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryMode {
    Clamp,
    #[default]
    Wrap,
}

/// Asset locations. Both unset means the embedded demo pack.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssetsConfig {
    pub animations: Option<PathBuf>,
    pub state_machine: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimingConfig {
    pub tick_ms: u64,
    pub seed: Option<u64>,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            tick_ms: 16,
            seed: None,
        }
    }
}

/// Where the active configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Named by [`CONFIG_ENV`].
    Env(PathBuf),
    /// Found in the platform config directory.
    UserDir(PathBuf),
    /// No file; built-in defaults.
    Defaults,
}

impl ConfigSource {
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigSource::Env(p) | ConfigSource::UserDir(p) => Some(p),
            ConfigSource::Defaults => None,
        }
    }
}

impl SprigConfig {
    /// Parse and validate config TOML.
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let config: Self = toml::from_str(input).context("failed to parse sprig config TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file. Relative asset paths are resolved
    /// against the file's directory.
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;

        let mut config = Self::from_toml_str(&raw)
            .with_context(|| format!("invalid config at {}", path.display()))?;
        if let Some(dir) = path.parent() {
            config.assets.resolve_against(dir);
        }
        Ok(config)
    }

    /// Find and load the active config: `SPRIG_CONFIG`, then
    /// `<config dir>/sprig/sprig.toml`, then defaults.
    pub fn discover() -> Result<(Self, ConfigSource)> {
        let explicit = env::var_os(CONFIG_ENV).map(PathBuf::from);
        let user = dirs::config_dir().map(|d| d.join("sprig").join("sprig.toml"));
        Self::discover_from(explicit, user)
    }

    /// Discovery with the candidate locations supplied by the caller.
    ///
    /// An explicit path must exist; the user-dir path is optional.
    pub fn discover_from(
        explicit: Option<PathBuf>,
        user: Option<PathBuf>,
    ) -> Result<(Self, ConfigSource)> {
        if let Some(path) = explicit {
            let config = Self::from_path(&path)?;
            return Ok((config, ConfigSource::Env(path)));
        }
        if let Some(path) = user.filter(|p| p.is_file()) {
            let config = Self::from_path(&path)?;
            return Ok((config, ConfigSource::UserDir(path)));
        }
        Ok((Self::default(), ConfigSource::Defaults))
    }

    /// Validate semantic constraints.
    pub fn validate(&self) -> Result<()> {
        validate_positive("screen.width", i64::from(self.screen.width))?;
        validate_positive("screen.height", i64::from(self.screen.height))?;
        validate_positive("sprite.height", i64::from(self.sprite.height))?;
        if self.timing.tick_ms == 0 {
            bail!("timing.tick_ms must be positive");
        }

        match (&self.assets.animations, &self.assets.state_machine) {
            (Some(_), None) => bail!("assets.animations is set but assets.state_machine is not"),
            (None, Some(_)) => bail!("assets.state_machine is set but assets.animations is not"),
            _ => {}
        }
        for path in [&self.assets.animations, &self.assets.state_machine]
            .into_iter()
            .flatten()
        {
            if path.as_os_str().is_empty() {
                bail!("asset paths must not be empty");
            }
        }

        Ok(())
    }

    /// Whether the embedded demo pack should be used.
    pub fn uses_demo_pack(&self) -> bool {
        self.assets.animations.is_none()
    }
}

impl AssetsConfig {
    fn resolve_against(&mut self, base: &Path) {
        for slot in [&mut self.animations, &mut self.state_machine] {
            if let Some(path) = slot.as_mut() {
                if path.is_relative() {
                    *path = base.join(&*path);
                }
            }
        }
    }
}

fn validate_positive(field: &str, value: i64) -> Result<()> {
    if value <= 0 {
        bail!("{field} must be positive, got {value}");
    }
    Ok(())
}
