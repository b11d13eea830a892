use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::issue::{LoadIssue, LoadReport};
use crate::loader;
use crate::types::{Clip, ClipId};

/// Catalog of named clips.
///
/// The library is the sole owner of decoded frame images. Everything else
/// refers to clips through a [`ClipId`] or by name. Entries are never
/// replaced or removed once inserted.
#[derive(Debug, Default)]
pub struct AnimationLibrary {
    clips: Vec<Clip>,
    index: HashMap<String, ClipId>,
}

impl AnimationLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `*.json` clip descriptor in `dir`, in file-name order.
    ///
    /// Per-file and per-frame failures are recorded in the returned report
    /// and skipped. A clip whose name is already loaded is left untouched.
    /// Only an unreadable directory is an error.
    pub fn load_animations(&mut self, dir: &Path) -> Result<LoadReport> {
        let entries = fs::read_dir(dir)
            .with_context(|| format!("failed to read animation directory {}", dir.display()))?;

        let mut paths: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && is_descriptor(path))
            .collect();
        paths.sort();

        let mut report = LoadReport::default();
        for path in paths {
            self.load_descriptor(&path, &mut report);
        }

        tracing::info!(
            dir = %dir.display(),
            loaded = report.loaded.len(),
            skipped = report.issues.len(),
            "animation scan finished"
        );
        Ok(report)
    }

    fn load_descriptor(&mut self, path: &Path, report: &mut LoadReport) {
        let location = path.display().to_string();

        let desc = match loader::read_descriptor(path) {
            Ok(desc) => desc,
            Err(issue) => {
                report.record(issue);
                return;
            }
        };

        if self.contains(&desc.name) {
            report.record(LoadIssue::DuplicateClip {
                name: desc.name,
                location,
            });
            return;
        }

        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        match loader::build_clip(desc, base_dir, &location, report) {
            Ok(clip) => {
                let name = clip.name.clone();
                tracing::debug!(clip = %name, frames = clip.frame_count(), "loaded clip");
                if self.insert(clip) {
                    report.loaded.push(name);
                }
            }
            Err(issue) => report.record(issue),
        }
    }

    /// Add an in-memory clip.
    ///
    /// Returns `false` (and leaves the catalog unchanged) when the name is
    /// already taken, the clip has no frames, or a frame has zero duration.
    pub fn insert(&mut self, clip: Clip) -> bool {
        if self.index.contains_key(&clip.name) {
            return false;
        }
        if clip.frames.is_empty() || clip.frames.iter().any(|f| f.duration.is_zero()) {
            return false;
        }
        let id = ClipId(self.clips.len());
        self.index.insert(clip.name.clone(), id);
        self.clips.push(clip);
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Look up a clip by name.
    pub fn get(&self, name: &str) -> Option<&Clip> {
        self.id_of(name).map(|id| self.clip(id))
    }

    pub fn id_of(&self, name: &str) -> Option<ClipId> {
        self.index.get(name).copied()
    }

    /// Resolve a handle issued by this library.
    pub fn clip(&self, id: ClipId) -> &Clip {
        &self.clips[id.0]
    }

    /// Clip names in load order.
    pub fn names(&self) -> Vec<&str> {
        self.clips.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }
}

fn is_descriptor(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}
