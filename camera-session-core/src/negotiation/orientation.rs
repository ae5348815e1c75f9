//! Sensor-versus-display orientation math.
//!
//! Candidate sizes are reported in sensor orientation while requested sizes
//! and display bounds are in display orientation. When exactly one of the
//! two is a quarter turn, width and height must be exchanged before fitting.

use crate::models::camera_models::{Resolution, Rotation};

/// Whether width and height must be exchanged to move between display
/// orientation and sensor orientation.
pub fn swapped(display_rotation: Rotation, sensor_orientation: Rotation) -> bool {
    display_rotation.is_quarter_turn() != sensor_orientation.is_quarter_turn()
}

/// Clockwise rotation, in degrees, to apply to captured frames so they
/// appear upright on the display.
pub fn capture_rotation_degrees(display_rotation: Rotation, sensor_orientation: Rotation) -> u32 {
    (sensor_orientation.degrees() + 360 - display_rotation.degrees()) % 360
}

/// Display rotation and sensor orientation with the derived swap flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrientationState {
    sensor_orientation: Rotation,
    display_rotation: Rotation,
    swapped: bool,
}

impl OrientationState {
    pub fn new(display_rotation: Rotation, sensor_orientation: Rotation) -> Self {
        Self {
            sensor_orientation,
            display_rotation,
            swapped: swapped(display_rotation, sensor_orientation),
        }
    }

    pub fn sensor_orientation(&self) -> Rotation {
        self.sensor_orientation
    }

    pub fn display_rotation(&self) -> Rotation {
        self.display_rotation
    }

    pub fn is_swapped(&self) -> bool {
        self.swapped
    }

    pub fn capture_rotation_degrees(&self) -> u32 {
        capture_rotation_degrees(self.display_rotation, self.sensor_orientation)
    }

    /// Expresses a display-oriented size in sensor orientation.
    pub fn to_sensor(&self, size: Resolution) -> Resolution {
        if self.swapped {
            size.swap()
        } else {
            size
        }
    }
}
