//! # meshless-telemetry
//!
//! Event bus for simulation telemetry. The frame loop emits structured
//! events (timing, shape-matching fit, containment, energy, interaction)
//! that pluggable sinks consume: an in-memory log, `tracing`, or a
//! JSON-lines writer.

pub mod bus;
pub mod events;
pub mod sinks;

pub use bus::EventBus;
pub use events::{EventKind, SimulationEvent};
pub use sinks::{EventLog, EventSink, JsonLinesSink, TracingSink, VecSink};
