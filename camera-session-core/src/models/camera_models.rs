use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::CameraError;

/// Output size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Width and height exchanged.
    pub fn swap(&self) -> Self {
        Self::new(self.height, self.width)
    }

    /// Exact aspect ratio match, compared by cross-multiplication.
    pub fn same_aspect(&self, other: &Resolution) -> bool {
        self.width as u64 * other.height as u64 == self.height as u64 * other.width as u64
    }

    /// Component-wise minimum of two sizes.
    pub fn min_each(&self, other: &Resolution) -> Self {
        Self::new(self.width.min(other.width), self.height.min(other.height))
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Rotation in quarter turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rotation {
    #[serde(rename = "0")]
    Deg0,
    #[serde(rename = "90")]
    Deg90,
    #[serde(rename = "180")]
    Deg180,
    #[serde(rename = "270")]
    Deg270,
}

impl Rotation {
    pub const ALL: [Rotation; 4] = [Self::Deg0, Self::Deg90, Self::Deg180, Self::Deg270];

    /// Maps a platform display-rotation code (0..=3, quarter turns).
    pub fn from_code(code: u8) -> Result<Self, CameraError> {
        match code {
            0 => Ok(Self::Deg0),
            1 => Ok(Self::Deg90),
            2 => Ok(Self::Deg180),
            3 => Ok(Self::Deg270),
            other => Err(CameraError::ConfigurationFailed(format!(
                "unknown display rotation code: {}",
                other
            ))),
        }
    }

    pub fn from_degrees(degrees: u32) -> Result<Self, CameraError> {
        match degrees {
            0 => Ok(Self::Deg0),
            90 => Ok(Self::Deg90),
            180 => Ok(Self::Deg180),
            270 => Ok(Self::Deg270),
            other => Err(CameraError::CharacteristicsUnavailable(format!(
                "rotation must be a multiple of 90 below 360, got {}",
                other
            ))),
        }
    }

    pub fn degrees(&self) -> u32 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }

    /// True for 90 and 270, the rotations that cross width and height.
    pub fn is_quarter_turn(&self) -> bool {
        matches!(self, Self::Deg90 | Self::Deg270)
    }

    /// Adds `other` modulo a full turn.
    pub fn plus(&self, other: Rotation) -> Self {
        match (self.degrees() + other.degrees()) % 360 {
            0 => Self::Deg0,
            90 => Self::Deg90,
            180 => Self::Deg180,
            _ => Self::Deg270,
        }
    }
}

/// Kind of output a surface consumes. Devices report candidate sizes per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceKind {
    Preview,
    StillCapture,
    Record,
}

/// Which way the lens points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LensFacing {
    #[default]
    Back,
    Front,
    External,
}

/// Capability record returned by the device service for one camera.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceCharacteristics {
    pub facing: LensFacing,
    pub sensor_orientation: Rotation,
    pub flash_available: bool,
    pub output_sizes: HashMap<SurfaceKind, Vec<Resolution>>,
}

impl DeviceCharacteristics {
    pub fn new(facing: LensFacing, sensor_orientation: Rotation) -> Self {
        Self {
            facing,
            sensor_orientation,
            flash_available: false,
            output_sizes: HashMap::new(),
        }
    }

    pub fn with_flash(mut self, available: bool) -> Self {
        self.flash_available = available;
        self
    }

    pub fn with_sizes(mut self, kind: SurfaceKind, sizes: Vec<Resolution>) -> Self {
        self.output_sizes.insert(kind, sizes);
        self
    }

    /// Candidate sizes for `kind`; empty if the device reports none.
    pub fn sizes_for(&self, kind: SurfaceKind) -> &[Resolution] {
        self.output_sizes.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }
}
