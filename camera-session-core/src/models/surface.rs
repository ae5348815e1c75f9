use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::camera_models::SurfaceKind;

pub type SurfaceId = u64;

static NEXT_SURFACE_ID: AtomicU64 = AtomicU64::new(1);

/// An output target owned by the caller (display texture, encoder input).
///
/// The caller keeps the `Arc`; the core only holds `Weak` references and
/// never uses a surface after the caller drops it.
#[derive(Debug, PartialEq, Eq)]
pub struct Surface {
    id: SurfaceId,
    kind: SurfaceKind,
    name: String,
}

impl Surface {
    pub fn new(kind: SurfaceKind, name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            id: NEXT_SURFACE_ID.fetch_add(1, Ordering::Relaxed),
            kind,
            name: name.into(),
        })
    }

    pub fn id(&self) -> SurfaceId {
        self.id
    }

    pub fn kind(&self) -> SurfaceKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Ordered output targets bound to one capture session.
///
/// Built fresh for every session; never edited after construction.
#[derive(Debug, Clone, Default)]
pub struct SurfaceSet {
    surfaces: Vec<Arc<Surface>>,
}

impl SurfaceSet {
    pub fn new(surfaces: Vec<Arc<Surface>>) -> Self {
        Self { surfaces }
    }

    pub fn ids(&self) -> Vec<SurfaceId> {
        self.surfaces.iter().map(|s| s.id()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Surface>> {
        self.surfaces.iter()
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }
}

impl fmt::Display for SurfaceSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.surfaces.iter().map(|s| s.name()).collect();
        write!(f, "[{}]", names.join(", "))
    }
}
