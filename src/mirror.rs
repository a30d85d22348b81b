//! Virtual mirror device construction
//!
//! Declares a uinput device whose capability set mirrors the real device's
//! axes exactly (no rescaling) and adds one synthetic button per axis plus
//! MSC_SCAN. Identity is cloned from the real device on a virtual bus.

use evdev::uinput::{VirtualDevice, VirtualDeviceBuilder};
use evdev::{AbsoluteAxisType, AttributeSet, BusType, InputId, Key, MiscType, UinputAbsSetup};
use thiserror::Error;

use crate::descriptor::{AxisInfo, DeviceCapabilities};
use crate::mapper::ButtonMapper;

/// Version reported by the virtual device
const VIRTUAL_VERSION: u16 = 1;

/// Errors from virtual device registration
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("Failed to create virtual device: {0}")]
    Create(#[source] std::io::Error),
}

/// Capability description of the virtual device.
///
/// Built once from the capability snapshot and the button mapping, then
/// registered through [`MirrorSpec::build`]. Immutable afterwards.
pub struct MirrorSpec {
    name: String,
    id: InputId,
    buttons: Vec<Key>,
    axes: Vec<AxisInfo>,
}

impl MirrorSpec {
    pub fn new(caps: &DeviceCapabilities, mapper: &ButtonMapper) -> Self {
        Self {
            name: format!("Virtual {}", caps.name()),
            id: InputId::new(
                BusType::BUS_VIRTUAL,
                caps.vendor(),
                caps.product(),
                VIRTUAL_VERSION,
            ),
            buttons: mapper.entries().iter().map(|e| e.button).collect(),
            axes: caps.axes().to_vec(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> InputId {
        self.id.clone()
    }

    pub fn buttons(&self) -> &[Key] {
        &self.buttons
    }

    pub fn axes(&self) -> &[AxisInfo] {
        &self.axes
    }

    /// Register the device with uinput.
    ///
    /// Registration is atomic: on failure the builder's uinput handle is
    /// dropped before the error propagates, so no half-registered device
    /// stays visible.
    pub fn build(&self) -> Result<VirtualDevice, MirrorError> {
        let mut keys = AttributeSet::<Key>::new();
        for &button in &self.buttons {
            keys.insert(button);
        }

        let mut misc = AttributeSet::<MiscType>::new();
        misc.insert(MiscType::MSC_SCAN);

        let mut builder = VirtualDeviceBuilder::new()
            .map_err(MirrorError::Create)?
            .name(&self.name)
            .input_id(self.id.clone())
            .with_keys(&keys)
            .map_err(MirrorError::Create)?
            .with_msc(&misc)
            .map_err(MirrorError::Create)?;

        for axis in &self.axes {
            let setup = UinputAbsSetup::new(AbsoluteAxisType(axis.code), axis.abs);
            builder = builder
                .with_absolute_axis(&setup)
                .map_err(MirrorError::Create)?;
        }

        builder.build().map_err(MirrorError::Create)
    }
}
