use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Decoded pixels for a single animation frame.
///
/// Stored as a flat `Vec<u8>` in row-major RGBA order (4 bytes per pixel)
/// so renderers don't need to depend on the `image` crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameImage {
    /// Raw RGBA pixel data, length = `width * height * 4`.
    pub data: Vec<u8>,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
}

impl FrameImage {
    /// Build an image filled with a single RGBA colour.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = width as usize * height as usize;
        let mut data = Vec::with_capacity(pixels * 4);
        for _ in 0..pixels {
            data.extend_from_slice(&rgba);
        }
        Self {
            data,
            width,
            height,
        }
    }

    /// Width divided by height, or `None` for a degenerate image.
    pub fn aspect_ratio(&self) -> Option<f32> {
        if self.width == 0 || self.height == 0 {
            return None;
        }
        Some(self.width as f32 / self.height as f32)
    }
}

/// One frame of a clip: the image and how long it stays on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub image: FrameImage,
    pub duration: Duration,
}

/// Per-tick displacement applied while a clip is active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct Movement {
    #[serde(default)]
    pub dx: i32,
    #[serde(default)]
    pub dy: i32,
}

/// A named animation: ordered frames plus a fixed movement vector.
#[derive(Debug, Clone, PartialEq)]
pub struct Clip {
    pub name: String,
    pub frames: Vec<Frame>,
    pub movement: Movement,
}

impl Clip {
    /// First frame of the clip, used for aspect-ratio sizing.
    pub fn first_frame(&self) -> Option<&Frame> {
        self.frames.first()
    }

    /// Number of frames in the clip.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Sum of all frame durations (one full loop).
    pub fn cycle_duration(&self) -> Duration {
        self.frames.iter().map(|f| f.duration).sum()
    }
}

/// Non-owning handle to a clip stored in an
/// [`AnimationLibrary`](crate::AnimationLibrary).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClipId(pub(crate) usize);

/// JSON descriptor for one clip file.
#[derive(Debug, Deserialize)]
pub(crate) struct ClipDescriptor {
    pub name: String,
    pub frames: Vec<FrameDescriptor>,
    #[serde(default)]
    pub movement: Movement,
}

/// A frame entry inside a [`ClipDescriptor`].
#[derive(Debug, Deserialize)]
pub(crate) struct FrameDescriptor {
    pub image: PathBuf,
    /// Milliseconds on screen.
    pub duration: u64,
}
