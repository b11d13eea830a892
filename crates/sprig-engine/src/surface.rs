use crate::types::FrameImage;

/// Destination rectangle in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// Render target the controller draws through.
///
/// Implementors scale `image` to fit `rect`. The rectangle may lie partly or
/// wholly off screen.
pub trait Surface {
    fn draw_image(&mut self, image: &FrameImage, rect: DrawRect);
}
