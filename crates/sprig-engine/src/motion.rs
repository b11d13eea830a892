use crate::types::Movement;

/// What happens when the sprite reaches a horizontal screen edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BoundaryPolicy {
    /// Keep the sprite fully on screen: `x ∈ [0, screen_width − width]`.
    Clamp,
    /// Leave one edge and re-enter from the other.
    #[default]
    Wrap,
}

/// Screen dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Screen {
    pub width: i32,
    pub height: i32,
}

impl Default for Screen {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
        }
    }
}

/// Top-left corner of the sprite in screen pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

/// Sprite size in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Default for Size {
    fn default() -> Self {
        Self {
            width: 100,
            height: 100,
        }
    }
}

/// Applies clip movement and the horizontal boundary policy.
///
/// The vertical axis is never constrained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionModel {
    pub screen: Screen,
    pub policy: BoundaryPolicy,
}

impl MotionModel {
    pub fn new(screen: Screen, policy: BoundaryPolicy) -> Self {
        Self { screen, policy }
    }

    /// Move by one tick's worth of `movement`, then enforce the policy.
    pub fn step(&self, pos: &mut Position, size: Size, movement: Movement) {
        pos.x = pos.x.saturating_add(movement.dx);
        pos.y = pos.y.saturating_add(movement.dy);
        self.enforce(pos, size);
    }

    /// Apply the boundary policy to `pos` without moving it.
    pub fn enforce(&self, pos: &mut Position, size: Size) {
        match self.policy {
            BoundaryPolicy::Clamp => {
                let max_x = (self.screen.width - size.width).max(0);
                pos.x = pos.x.clamp(0, max_x);
            }
            BoundaryPolicy::Wrap => {
                if pos.x > self.screen.width {
                    pos.x = -size.width;
                } else if pos.x.saturating_add(size.width) < 0 {
                    pos.x = self.screen.width;
                }
            }
        }
    }
}
