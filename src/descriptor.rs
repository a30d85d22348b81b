//! Real device introspection
//!
//! Takes an immutable snapshot of an opened evdev device's identity and
//! absolute-axis capabilities, refusing devices this tool cannot usefully
//! mirror.

use std::fmt;

use evdev::{AbsInfo, Device, EventType};
use thiserror::Error;

/// Number of absolute-axis codes the input subsystem defines (ABS_CNT).
pub const AXIS_CODE_LIMIT: usize = 0x40;

/// Errors from device introspection
#[derive(Debug, Error)]
pub enum DescriptorError {
    /// The device already reports key/button events and needs no synthetic buttons
    #[error("\"{name}\" already has buttons")]
    HasButtons { name: String },

    /// The device reports no absolute axes, so there is nothing to threshold
    #[error("\"{name}\" has no absolute axes")]
    NoAxes { name: String },

    /// Reading device metadata failed
    #[error("Failed to query device capabilities: {0}")]
    Io(#[from] std::io::Error),
}

/// One absolute axis as declared by the real device
#[derive(Clone, Copy)]
pub struct AxisInfo {
    /// Axis code (ABS_X, ABS_Y, ...)
    pub code: u16,
    /// Declared range: min, max, fuzz, flat, resolution
    pub abs: AbsInfo,
}

// AbsInfo has no Debug of its own; print its getters
impl fmt::Debug for AxisInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AxisInfo")
            .field("code", &self.code)
            .field("min", &self.abs.minimum())
            .field("max", &self.abs.maximum())
            .field("fuzz", &self.abs.fuzz())
            .field("flat", &self.abs.flat())
            .field("resolution", &self.abs.resolution())
            .finish()
    }
}

/// Immutable snapshot of a real device's identity and axis capabilities
#[derive(Clone)]
pub struct DeviceCapabilities {
    name: String,
    vendor: u16,
    product: u16,
    axes: Vec<AxisInfo>,
}

impl fmt::Debug for DeviceCapabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceCapabilities")
            .field("name", &self.name)
            .field("vendor", &self.vendor)
            .field("product", &self.product)
            .field("axes", &self.axes)
            .finish()
    }
}

impl DeviceCapabilities {
    /// Snapshot an opened device, or refuse it.
    ///
    /// Never mutates the device; only metadata queries are issued.
    pub fn from_device(device: &Device) -> Result<Self, DescriptorError> {
        let name = device.name().unwrap_or("Unnamed device").to_string();
        let id = device.input_id();
        let has_keys = device.supported_events().contains(EventType::KEY);

        let mut axes = Vec::new();
        if !has_keys {
            if let Some(supported) = device.supported_absolute_axes() {
                let abs_state = device.get_abs_state()?;
                for axis in supported.iter() {
                    let code = axis.0;
                    let Some(raw) = abs_state.get(code as usize) else {
                        continue;
                    };
                    axes.push(AxisInfo {
                        code,
                        abs: AbsInfo::new(
                            raw.value,
                            raw.minimum,
                            raw.maximum,
                            raw.fuzz,
                            raw.flat,
                            raw.resolution,
                        ),
                    });
                }
            }
        }

        Self::from_parts(name, id.vendor(), id.product(), has_keys, axes)
    }

    /// Build a snapshot from already-gathered parts, applying the same
    /// refusal rules as [`DeviceCapabilities::from_device`]. Axes are kept in
    /// ascending code order; codes outside the ABS range are discarded.
    pub fn from_parts(
        name: String,
        vendor: u16,
        product: u16,
        has_keys: bool,
        mut axes: Vec<AxisInfo>,
    ) -> Result<Self, DescriptorError> {
        if has_keys {
            return Err(DescriptorError::HasButtons { name });
        }
        axes.retain(|axis| (axis.code as usize) < AXIS_CODE_LIMIT);
        if axes.is_empty() {
            return Err(DescriptorError::NoAxes { name });
        }
        axes.sort_by_key(|axis| axis.code);

        Ok(Self {
            name,
            vendor,
            product,
            axes,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vendor(&self) -> u16 {
        self.vendor
    }

    pub fn product(&self) -> u16 {
        self.product
    }

    /// Axes in ascending code order
    pub fn axes(&self) -> &[AxisInfo] {
        &self.axes
    }
}
