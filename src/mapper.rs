//! Axis-to-button mapping and threshold state
//!
//! Each absolute axis of the real device gets one synthetic button. The
//! mapping is fixed at startup: the i-th axis in ascending code order owns
//! `BTN_TRIGGER + i`. A button is pressed while its axis sits strictly above
//! one tenth of the axis's declared maximum.

use std::time::SystemTime;

use evdev::{EventType, InputEvent, Key};

use crate::descriptor::{DeviceCapabilities, AXIS_CODE_LIMIT};

/// First synthetic button code (start of the joystick button range)
pub const BUTTON_BASE: Key = Key::BTN_TRIGGER;

/// A button engages above `max / THRESHOLD_DIVISOR`
const THRESHOLD_DIVISOR: i32 = 10;

/// One axis→button mapping entry
#[derive(Debug, Clone)]
pub struct AxisButton {
    /// Axis code on the real device
    pub axis: u16,
    /// Synthetic button emitted for this axis
    pub button: Key,
    /// Declared axis maximum
    pub max: i32,
    /// Press threshold, exact integer tenth of the maximum
    pub threshold: i32,
    pressed: bool,
}

impl AxisButton {
    pub fn pressed(&self) -> bool {
        self.pressed
    }
}

/// Per-axis threshold state machine
pub struct ButtonMapper {
    /// Entries in axis-code order
    entries: Vec<AxisButton>,
    /// Axis code → entry slot; event codes are range-checked against this
    index: [Option<u8>; AXIS_CODE_LIMIT],
}

impl ButtonMapper {
    /// Derive the mapping from a capability snapshot. Buttons start at
    /// [`BUTTON_BASE`] and are assigned sequentially in axis discovery order.
    pub fn new(caps: &DeviceCapabilities) -> Self {
        let mut entries = Vec::with_capacity(caps.axes().len());
        let mut index = [None; AXIS_CODE_LIMIT];

        for (slot, axis) in caps.axes().iter().enumerate() {
            let max = axis.abs.maximum();
            index[axis.code as usize] = Some(slot as u8);
            entries.push(AxisButton {
                axis: axis.code,
                button: Key::new(BUTTON_BASE.code() + slot as u16),
                max,
                threshold: max / THRESHOLD_DIVISOR,
                pressed: false,
            });
        }

        Self { entries, index }
    }

    /// Entries in axis-code order
    pub fn entries(&self) -> &[AxisButton] {
        &self.entries
    }

    /// Feed one absolute-axis sample.
    ///
    /// Returns the synthetic key event when the sample moves the axis across
    /// its threshold (strictly greater than: a value equal to the threshold
    /// counts as released), `None` otherwise. The synthetic event carries the
    /// triggering sample's timestamp; only type, code and value differ from
    /// the original record. Codes that do not belong to a mapped axis are
    /// ignored.
    pub fn observe(
        &mut self,
        axis_code: u16,
        value: i32,
        timestamp: SystemTime,
    ) -> Option<InputEvent> {
        let slot = (*self.index.get(axis_code as usize)?)?;
        let entry = &mut self.entries[slot as usize];

        let pressed = value > entry.threshold;
        if pressed == entry.pressed {
            return None;
        }
        entry.pressed = pressed;

        Some(InputEvent::from(libc::input_event {
            time: timeval_from(timestamp),
            type_: EventType::KEY.0,
            code: entry.button.code(),
            value: pressed as i32,
        }))
    }
}

fn timeval_from(timestamp: SystemTime) -> libc::timeval {
    // Pre-epoch timestamps collapse to zero, like a zeroed input_event
    let since_epoch = timestamp
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default();
    libc::timeval {
        tv_sec: since_epoch.as_secs() as libc::time_t,
        tv_usec: since_epoch.subsec_micros() as libc::suseconds_t,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{AxisInfo, DeviceCapabilities};
    use evdev::AbsInfo;
    use std::time::{Duration, SystemTime};

    fn ts(secs: u64) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(secs)
    }

    fn mapper(axes: &[(u16, i32)]) -> ButtonMapper {
        let axes = axes
            .iter()
            .map(|&(code, max)| AxisInfo {
                code,
                abs: AbsInfo::new(0, 0, max, 0, 0, 0),
            })
            .collect();
        let caps =
            DeviceCapabilities::from_parts("Test Throttle".into(), 0x1234, 0x5678, false, axes)
                .unwrap();
        ButtonMapper::new(&caps)
    }

    #[test]
    fn threshold_is_integer_tenth_of_max() {
        let m = mapper(&[(0, 255), (1, 1023)]);
        assert_eq!(m.entries()[0].threshold, 25);
        assert_eq!(m.entries()[1].threshold, 102);
    }

    #[test]
    fn boundary_is_strictly_greater_than() {
        let mut m = mapper(&[(0, 255)]);
        assert!(m.observe(0, 25, ts(1)).is_none());
        let press = m.observe(0, 26, ts(2)).expect("26 > 25 must press");
        assert_eq!(press.event_type(), EventType::KEY);
        assert_eq!(press.code(), BUTTON_BASE.code());
        assert_eq!(press.value(), 1);
    }

    #[test]
    fn no_redundant_events_on_same_side() {
        let mut m = mapper(&[(0, 255)]);
        assert!(m.observe(0, 0, ts(1)).is_none());
        assert!(m.observe(0, 10, ts(2)).is_none());
        assert!(!m.entries()[0].pressed());
        assert!(m.observe(0, 200, ts(3)).is_some());
        assert!(m.observe(0, 210, ts(4)).is_none());
        assert!(m.observe(0, 30, ts(5)).is_none());
        assert!(m.entries()[0].pressed());
        let release = m
            .observe(0, 10, ts(6))
            .expect("drop below threshold must release");
        assert_eq!(release.value(), 0);
        assert!(!m.entries()[0].pressed());
    }

    #[test]
    fn synthetic_event_carries_the_trigger_timestamp() {
        let mut m = mapper(&[(0, 255)]);
        let stamp = ts(946_684_800);
        let press = m.observe(0, 200, stamp).unwrap();
        assert_eq!(press.timestamp(), stamp);

        let release = m.observe(0, 0, ts(946_684_801)).unwrap();
        assert_eq!(release.timestamp(), ts(946_684_801));
    }

    #[test]
    fn buttons_are_assigned_sequentially_over_sparse_axes() {
        let mut m = mapper(&[(0, 255), (2, 255), (40, 255)]);
        let buttons: Vec<u16> = m.entries().iter().map(|e| e.button.code()).collect();
        assert_eq!(
            buttons,
            vec![
                BUTTON_BASE.code(),
                BUTTON_BASE.code() + 1,
                BUTTON_BASE.code() + 2
            ]
        );

        // The entry is looked up by axis code, not by button offset
        let press = m.observe(40, 200, ts(1)).unwrap();
        assert_eq!(press.code(), BUTTON_BASE.code() + 2);
    }

    #[test]
    fn unmapped_and_out_of_range_codes_are_ignored() {
        let mut m = mapper(&[(0, 255)]);
        assert!(m.observe(1, 1000, ts(1)).is_none());
        assert!(m.observe(AXIS_CODE_LIMIT as u16, 1000, ts(2)).is_none());
        assert!(m.observe(u16::MAX, 1000, ts(3)).is_none());
        // Axis 0 state is untouched by the stray codes
        assert!(m.observe(0, 200, ts(4)).is_some());
    }

    #[test]
    fn identical_inputs_produce_identical_outputs() {
        let samples = [0, 26, 30, 25, 25, 400, 12, 0, 26];
        let run = |mut m: ButtonMapper| -> Vec<(u16, i32, SystemTime)> {
            samples
                .iter()
                .enumerate()
                .filter_map(|(i, &v)| m.observe(0, v, ts(i as u64)))
                .map(|ev| (ev.code(), ev.value(), ev.timestamp()))
                .collect()
        };
        let a = run(mapper(&[(0, 255)]));
        let b = run(mapper(&[(0, 255)]));
        assert_eq!(a, b);

        let values: Vec<(u16, i32)> = a.iter().map(|&(code, value, _)| (code, value)).collect();
        assert_eq!(
            values,
            vec![
                (BUTTON_BASE.code(), 1),
                (BUTTON_BASE.code(), 0),
                (BUTTON_BASE.code(), 1),
                (BUTTON_BASE.code(), 0),
                (BUTTON_BASE.code(), 1)
            ]
        );
    }
}
