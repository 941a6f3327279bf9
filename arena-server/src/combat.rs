//! Ray-versus-player hit detection.
//!
//! A shot is a half-line from the shooter's position. Every other live player
//! is tested against the ray: the perpendicular distance at the closest point
//! must stay below a tolerance that widens with distance along the ray, and
//! among all candidates that pass, the nearest one along the ray is the unique
//! hit. There is no obstacle occlusion; the server carries no world geometry.

use protocol::PlayerId;
use protocol::math::Vec3;

/// Hit tolerance in world units at zero ray distance.
const BASE_THRESHOLD: f64 = 2.5;

/// Additional tolerance per world unit travelled along the ray.
const THRESHOLD_PER_UNIT: f64 = 0.15;

/// How the shooter specified the shot.
#[derive(Debug, Clone, Copy)]
pub enum Aim {
    /// Aim at a world-space point; the ray direction is derived from it.
    Target(Vec3),
    /// Explicit ray direction, normalized before use.
    Direction(Vec3),
}

impl Aim {
    /// The normalized ray direction from the given origin.
    /// `None` when the aim is degenerate (zero length, or a target on the origin).
    pub fn ray_direction(&self, origin: Vec3) -> Option<Vec3> {
        match self {
            Aim::Target(point) => (*point - origin).normalized(),
            Aim::Direction(direction) => direction.normalized(),
        }
    }
}

/// The candidate a ray grazed closest to the shooter.
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    /// Id of the struck player.
    pub victim: PlayerId,
    /// Distance along the ray to the victim's closest point.
    pub ray_distance: f64,
}

/// The perpendicular cutoff at the given distance along the ray.
///
/// Close range gets generous angular slack, far range is intentionally
/// forgiving as a gameplay tradeoff for the missing occlusion model.
pub fn hit_threshold(ray_distance: f64) -> f64 {
    BASE_THRESHOLD + THRESHOLD_PER_UNIT * ray_distance
}

/// Finds the nearest candidate the ray passes close enough to.
///
/// `direction` must be unit length. Candidates behind the origin never count.
/// Equal ray distances keep the earlier candidate, so the iteration order of
/// the players map makes the tie deterministic per run.
pub fn resolve_hit(origin: Vec3, direction: Vec3, candidates: &[(PlayerId, Vec3)]) -> Option<Hit> {
    let mut best: Option<Hit> = None;
    for (id, position) in candidates {
        let offset = *position - origin;
        let along = offset.dot(direction);
        if along <= 0.0 {
            continue;
        }
        let closest = origin.plus(direction.scaled(along));
        let miss = (*position - closest).length();
        if miss >= hit_threshold(along) {
            continue;
        }
        if best.as_ref().map_or(true, |hit| along < hit.ray_distance) {
            best = Some(Hit {
                victim: id.clone(),
                ray_distance: along,
            });
        }
    }
    best
}
