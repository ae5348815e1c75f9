use std::sync::{Arc, Weak};

use crate::models::error::CameraError;
use crate::models::surface::{Surface, SurfaceSet};

/// Weak references to the caller's render and record targets.
///
/// Produces the ordered target list for each streaming mode.
#[derive(Debug, Clone)]
pub struct SurfaceRegistry {
    render: Weak<Surface>,
    record: Option<Weak<Surface>>,
}

impl SurfaceRegistry {
    pub fn new(render: Weak<Surface>) -> Self {
        Self {
            render,
            record: None,
        }
    }

    pub fn set_record(&mut self, record: Weak<Surface>) {
        self.record = Some(record);
    }

    pub fn clear_record(&mut self) {
        self.record = None;
    }

    pub fn has_record(&self) -> bool {
        self.record.is_some()
    }

    /// `[render]`
    pub fn preview_set(&self) -> Result<SurfaceSet, CameraError> {
        Ok(SurfaceSet::new(vec![upgrade(&self.render, "render")?]))
    }

    /// `[render, record]`
    pub fn record_set(&self) -> Result<SurfaceSet, CameraError> {
        let record = self
            .record
            .as_ref()
            .ok_or_else(|| CameraError::DeviceAccess("no record target registered".into()))?;
        Ok(SurfaceSet::new(vec![
            upgrade(&self.render, "render")?,
            upgrade(record, "record")?,
        ]))
    }
}

fn upgrade(target: &Weak<Surface>, role: &str) -> Result<Arc<Surface>, CameraError> {
    target
        .upgrade()
        .ok_or_else(|| CameraError::DeviceAccess(format!("{} target was released", role)))
}
