//! Pluggable event sinks.

use std::io::Write;
use std::sync::{Arc, Mutex};

use crate::events::SimulationEvent;

/// Trait for event consumers.
pub trait EventSink: Send {
    /// Process a single event.
    fn handle(&mut self, event: &SimulationEvent);

    /// Called when the simulation ends.
    fn finalize(&mut self) {}

    /// Human-readable name for this sink.
    fn name(&self) -> &str;
}

/// Shared, inspectable list of events collected by a [`VecSink`].
#[derive(Debug, Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<SimulationEvent>>>);

impl EventLog {
    /// A copy of everything collected so far.
    pub fn snapshot(&self) -> Vec<SimulationEvent> {
        self.0.lock().map(|events| events.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.0.lock().map(|events| events.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Empties the log.
    pub fn clear(&self) {
        if let Ok(mut events) = self.0.lock() {
            events.clear();
        }
    }
}

/// Collects events in memory. Keep the [`EventLog`] handle to read them
/// after the sink has been boxed into a bus.
#[derive(Debug, Default)]
pub struct VecSink {
    log: EventLog,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle to the collected events.
    pub fn log(&self) -> EventLog {
        self.log.clone()
    }
}

impl EventSink for VecSink {
    fn handle(&mut self, event: &SimulationEvent) {
        if let Ok(mut events) = self.log.0.lock() {
            events.push(event.clone());
        }
    }

    fn name(&self) -> &str {
        "vec_sink"
    }
}

/// Forwards events to `tracing` at a fixed level.
pub struct TracingSink {
    level: tracing::Level,
}

impl TracingSink {
    pub fn new(level: tracing::Level) -> Self {
        Self { level }
    }
}

impl EventSink for TracingSink {
    fn handle(&mut self, event: &SimulationEvent) {
        let step = event.step;
        let kind = &event.kind;
        match self.level {
            tracing::Level::ERROR => tracing::error!(step, event = ?kind, "simulation_event"),
            tracing::Level::WARN => tracing::warn!(step, event = ?kind, "simulation_event"),
            tracing::Level::INFO => tracing::info!(step, event = ?kind, "simulation_event"),
            tracing::Level::DEBUG => tracing::debug!(step, event = ?kind, "simulation_event"),
            tracing::Level::TRACE => tracing::trace!(step, event = ?kind, "simulation_event"),
        }
    }

    fn name(&self) -> &str {
        "tracing_sink"
    }
}

/// Writes one JSON object per event, one per line.
///
/// Write errors are logged once and the sink goes quiet afterwards.
pub struct JsonLinesSink<W: Write + Send> {
    writer: W,
    failed: bool,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            failed: false,
        }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> EventSink for JsonLinesSink<W> {
    fn handle(&mut self, event: &SimulationEvent) {
        if self.failed {
            return;
        }
        let result = serde_json::to_writer(&mut self.writer, event)
            .map_err(std::io::Error::from)
            .and_then(|()| self.writer.write_all(b"\n"));
        if let Err(e) = result {
            tracing::warn!(error = %e, "json lines sink disabled after write error");
            self.failed = true;
        }
    }

    fn finalize(&mut self) {
        if let Err(e) = self.writer.flush() {
            tracing::warn!(error = %e, "json lines sink flush failed");
        }
    }

    fn name(&self) -> &str {
        "json_lines_sink"
    }
}
