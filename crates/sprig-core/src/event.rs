use std::time::Instant;

/// Host events carried on the [`EventBus`](crate::bus::EventBus).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The tick timer fired.
    Tick { now: Instant },
    /// A mouse press, already translated to screen pixels.
    Click { x: i32, y: i32 },
    /// The terminal was resized.
    Resize { cols: u16, rows: u16 },
    Quit,
}
