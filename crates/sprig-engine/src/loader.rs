use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use image::GenericImageView;

use crate::issue::{malformed, LoadIssue, LoadReport};
use crate::types::{Clip, ClipDescriptor, Frame, FrameImage};

/// Decode a PNG (or any enabled `image` format) into RGBA pixels.
pub fn decode_image_bytes(bytes: &[u8]) -> Result<FrameImage> {
    let img = image::load_from_memory(bytes).context("failed to decode frame image")?;
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        bail!("frame image is {width}×{height}");
    }
    Ok(FrameImage {
        data: img.to_rgba8().into_raw(),
        width,
        height,
    })
}

/// Read and decode an image file from disk.
pub fn decode_image_file(path: &Path) -> Result<FrameImage> {
    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    decode_image_bytes(&bytes)
}

/// Read and parse a clip descriptor without touching its images.
pub(crate) fn read_descriptor(path: &Path) -> Result<ClipDescriptor, LoadIssue> {
    let location = path.display().to_string();
    let raw = fs::read(path).map_err(|e| LoadIssue::AssetLoad {
        location: location.clone(),
        reason: e.to_string(),
    })?;
    parse_descriptor(&raw, &location)
}

pub(crate) fn parse_descriptor(json: &[u8], location: &str) -> Result<ClipDescriptor, LoadIssue> {
    let desc: ClipDescriptor = serde_json::from_slice(json)
        .map_err(|e| malformed(location, format!("invalid clip descriptor: {e}")))?;
    if desc.name.trim().is_empty() {
        return Err(malformed(location, "clip name must not be empty"));
    }
    Ok(desc)
}

/// Decode every frame of a descriptor into a [`Clip`].
///
/// Frames that fail to load are recorded in `report` and skipped. A clip
/// that ends up with no frames is rejected.
pub(crate) fn build_clip(
    desc: ClipDescriptor,
    base_dir: &Path,
    location: &str,
    report: &mut LoadReport,
) -> Result<Clip, LoadIssue> {
    let mut frames = Vec::with_capacity(desc.frames.len());

    for (i, frame) in desc.frames.iter().enumerate() {
        if frame.duration == 0 {
            report.record(malformed(
                format!("{location} frame {i}"),
                "frame duration must be greater than zero",
            ));
            continue;
        }

        let image_path = resolve_image_path(base_dir, &frame.image);
        match decode_image_file(&image_path) {
            Ok(image) => frames.push(Frame {
                image,
                duration: Duration::from_millis(frame.duration),
            }),
            Err(err) => report.record(LoadIssue::AssetLoad {
                location: image_path.display().to_string(),
                reason: format!("{err:#}"),
            }),
        }
    }

    if frames.is_empty() {
        return Err(malformed(
            location,
            format!("clip \"{}\" has no usable frames", desc.name),
        ));
    }

    Ok(Clip {
        name: desc.name,
        frames,
        movement: desc.movement,
    })
}

/// Image paths in a descriptor are relative to the descriptor's directory.
fn resolve_image_path(base_dir: &Path, image: &Path) -> PathBuf {
    if image.is_absolute() {
        image.to_path_buf()
    } else {
        base_dir.join(image)
    }
}
