//! Event sinks: where translated events go
//!
//! The pump writes through the [`EventSink`] seam so the translation logic
//! can be exercised against an in-memory recorder instead of a kernel device.

use std::io;

use evdev::uinput::VirtualDevice;
use evdev::{EventType, InputEvent, Synchronization};
use tracing::debug;

/// Flush even without a report boundary once this many events are pending.
const FLUSH_LIMIT: usize = 256;

/// Write half of the translation loop
pub trait EventSink {
    fn write_event(&mut self, event: InputEvent) -> io::Result<()>;
}

/// Sink backed by the registered uinput device.
///
/// `VirtualDevice::emit` terminates every call with its own SYN_REPORT, so
/// events are batched and flushed when the real device's SYN_REPORT arrives.
/// The source's report framing is preserved on the virtual side. Writes block
/// until the kernel accepts them; a failed write is fatal to the caller.
pub struct UinputSink {
    device: VirtualDevice,
    pending: Vec<InputEvent>,
}

impl UinputSink {
    pub fn new(device: VirtualDevice) -> Self {
        Self {
            device,
            pending: Vec::new(),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        self.device.emit(&self.pending)?;
        self.pending.clear();
        Ok(())
    }
}

impl EventSink for UinputSink {
    fn write_event(&mut self, event: InputEvent) -> io::Result<()> {
        if event.event_type() == EventType::SYNCHRONIZATION
            && event.code() == Synchronization::SYN_REPORT.0
        {
            // emit() appends the SYN_REPORT itself
            return self.flush();
        }

        self.pending.push(event);
        if self.pending.len() >= FLUSH_LIMIT {
            debug!("Source stopped framing reports, flushing {FLUSH_LIMIT} pending events");
            return self.flush();
        }
        Ok(())
    }
}

/// Sink recording every event verbatim.
///
/// Deterministic stand-in for the uinput device in unit tests, also usable as
/// a diagnostic tap.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Vec<InputEvent>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded events in write order
    pub fn events(&self) -> &[InputEvent] {
        &self.events
    }

    pub fn take(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.events)
    }
}

impl EventSink for MemorySink {
    fn write_event(&mut self, event: InputEvent) -> io::Result<()> {
        self.events.push(event);
        Ok(())
    }
}
