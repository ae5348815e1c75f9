//! Output size negotiation.

use crate::models::camera_models::Resolution;
use crate::models::error::CameraError;

use super::orientation::OrientationState;

/// Inputs to [`choose_optimal_size`], all in sensor orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeRequest {
    pub target: Resolution,
    pub bound: Resolution,
    pub aspect_reference: Resolution,
}

impl SizeRequest {
    /// Builds a request from display-oriented inputs.
    ///
    /// `requested` and `display_bound` are swapped into sensor orientation
    /// when `orientation` requires it; the bound is then capped
    /// component-wise by `max_preview`.
    pub fn oriented(
        requested: Resolution,
        display_bound: Resolution,
        max_preview: Resolution,
        aspect_reference: Resolution,
        orientation: &OrientationState,
    ) -> Self {
        Self {
            target: orientation.to_sensor(requested),
            bound: orientation.to_sensor(display_bound).min_each(&max_preview),
            aspect_reference,
        }
    }

    pub fn fit(&self, candidates: &[Resolution]) -> Result<Resolution, CameraError> {
        choose_optimal_size(candidates, self.target, self.bound, self.aspect_reference)
    }
}

/// Ordering for "smallest": area, then width, then height.
fn smallest<'a>(sizes: impl Iterator<Item = &'a Resolution>) -> Option<Resolution> {
    sizes
        .min_by_key(|s| (s.area(), s.width, s.height))
        .copied()
}

/// Picks the output size closest to `target` without exceeding `bound`,
/// preferring the exact aspect ratio of `aspect_reference`.
///
/// 1. aspect match, at least `target`, at most `bound` → smallest such
/// 2. aspect match only → smallest such
/// 3. smallest candidate overall
pub fn choose_optimal_size(
    candidates: &[Resolution],
    target: Resolution,
    bound: Resolution,
    aspect_reference: Resolution,
) -> Result<Resolution, CameraError> {
    if candidates.is_empty() {
        return Err(CameraError::NoCandidate);
    }

    let fits = |s: &&Resolution| {
        s.width >= target.width
            && s.height >= target.height
            && s.width <= bound.width
            && s.height <= bound.height
    };
    let matches_aspect = |s: &&Resolution| s.same_aspect(&aspect_reference);

    if let Some(best) = smallest(candidates.iter().filter(fits).filter(matches_aspect)) {
        return Ok(best);
    }

    if let Some(best) = smallest(candidates.iter().filter(matches_aspect)) {
        log::debug!(
            "no {} candidate between {} and {}, falling back to aspect-only match {}",
            aspect_reference,
            target,
            bound,
            best
        );
        return Ok(best);
    }

    let best = smallest(candidates.iter()).ok_or(CameraError::NoCandidate)?;
    log::warn!(
        "no candidate matches aspect of {}, using smallest size {}",
        aspect_reference,
        best
    );
    Ok(best)
}

/// Largest size by area; ties go to the wider size.
pub fn largest_by_area(candidates: &[Resolution]) -> Result<Resolution, CameraError> {
    candidates
        .iter()
        .max_by_key(|s| (s.area(), s.width))
        .copied()
        .ok_or(CameraError::NoCandidate)
}
