//! Characteristics of typical phone cameras.

use camera_session_core::models::camera_models::{
    DeviceCharacteristics, LensFacing, Resolution, Rotation, SurfaceKind,
};

/// Rear camera mounted at 90 degrees, with flash.
pub fn back_camera() -> DeviceCharacteristics {
    DeviceCharacteristics::new(LensFacing::Back, Rotation::Deg90)
        .with_flash(true)
        .with_sizes(
            SurfaceKind::Preview,
            vec![
                Resolution::new(3840, 2160),
                Resolution::new(1920, 1080),
                Resolution::new(1280, 720),
                Resolution::new(1440, 1080),
                Resolution::new(640, 480),
                Resolution::new(320, 240),
            ],
        )
        .with_sizes(
            SurfaceKind::StillCapture,
            vec![Resolution::new(3840, 2160), Resolution::new(1920, 1080)],
        )
        .with_sizes(
            SurfaceKind::Record,
            vec![Resolution::new(1920, 1080), Resolution::new(1280, 720)],
        )
}

/// Front camera mounted at 270 degrees, no flash.
pub fn front_camera() -> DeviceCharacteristics {
    DeviceCharacteristics::new(LensFacing::Front, Rotation::Deg270)
        .with_sizes(
            SurfaceKind::Preview,
            vec![
                Resolution::new(1920, 1080),
                Resolution::new(1280, 720),
                Resolution::new(640, 480),
            ],
        )
        .with_sizes(SurfaceKind::StillCapture, vec![Resolution::new(1920, 1080)])
        .with_sizes(SurfaceKind::Record, vec![Resolution::new(1280, 720)])
}
