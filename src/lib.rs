//! Mirror an axis-only input device as a virtual device with synthetic buttons.
//!
//! Axis-only hardware (a throttle quadrant, a pedal set) cannot drive
//! software that expects discrete buttons. This crate reads such a device,
//! registers a virtual clone whose capabilities mirror the original, forwards
//! every event unchanged and additionally presses or releases one synthetic
//! button per axis whenever the axis moves past 10% of its declared maximum.

pub mod descriptor;
pub mod mapper;
pub mod mirror;
pub mod pump;
pub mod sentinel;
pub mod sink;

pub use descriptor::{AxisInfo, DescriptorError, DeviceCapabilities, AXIS_CODE_LIMIT};
pub use mapper::{AxisButton, ButtonMapper, BUTTON_BASE};
pub use mirror::{MirrorError, MirrorSpec};
pub use pump::{EventPump, PumpError};
pub use sink::{EventSink, MemorySink, UinputSink};
