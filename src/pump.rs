//! The translation loop
//!
//! Consumes the real device's events, drives the per-axis threshold state and
//! writes to the virtual device. Every original event is forwarded verbatim;
//! a threshold crossing additionally writes its synthetic key event, always
//! before the absolute event that caused it.

use evdev::{EventStream, EventType, InputEvent};
use thiserror::Error;
use tracing::{info, trace};

use crate::mapper::ButtonMapper;
use crate::sentinel;
use crate::sink::EventSink;

/// Fatal pump conditions
#[derive(Debug, Error)]
pub enum PumpError {
    #[error("Failed to read from the real device: {0}")]
    Read(#[source] std::io::Error),

    #[error("Failed to write to the virtual device: {0}")]
    Write(#[source] std::io::Error),
}

/// Event translation loop over a mapper and a sink
pub struct EventPump<S: EventSink> {
    mapper: ButtonMapper,
    sink: S,
}

impl<S: EventSink> EventPump<S> {
    pub fn new(mapper: ButtonMapper, sink: S) -> Self {
        Self { mapper, sink }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Translate one event.
    ///
    /// An absolute-axis event first feeds the mapper; a resulting synthetic
    /// key event is written before the original. The original is then
    /// forwarded unconditionally, unchanged.
    pub fn handle_event(&mut self, event: InputEvent) -> Result<(), PumpError> {
        if event.event_type() == EventType::ABSOLUTE {
            if let Some(synthetic) =
                self.mapper
                    .observe(event.code(), event.value(), event.timestamp())
            {
                trace!(
                    "Axis {} crossed its threshold, button {} -> {}",
                    event.code(),
                    synthetic.code(),
                    synthetic.value()
                );
                self.sink.write_event(synthetic).map_err(PumpError::Write)?;
            }
        }

        self.sink.write_event(event).map_err(PumpError::Write)
    }

    /// Run until the real device fails, ctrl-c arrives or the stdout consumer
    /// hangs up. The signal and sentinel branches are clean shutdowns, not
    /// faults. An event that has been read is always fully translated and
    /// forwarded before the loop can suspend again, so cancellation never
    /// splits a synthetic/original pair.
    pub async fn run(mut self, mut stream: EventStream) -> Result<(), PumpError> {
        let hangup = sentinel::stdout_hangup();
        tokio::pin!(hangup);

        loop {
            tokio::select! {
                event = stream.next_event() => {
                    self.handle_event(event.map_err(PumpError::Read)?)?;
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Interrupted, shutting down");
                    return Ok(());
                }
                _ = &mut hangup => {
                    info!("Output consumer went away, shutting down");
                    return Ok(());
                }
            }
        }
    }
}
