//! Host-side infrastructure for SPRIG.
//!
//! This crate provides the pieces the preview host wires around the
//! behavior engine: the event type and FIFO bus, a tick-rate counter, and
//! the logging subsystem.

pub mod bus;
pub mod event;
pub mod fps;
pub mod logging;
