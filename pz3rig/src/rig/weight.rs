//! Per-vertex weight maps handed to the host's vertex-group painting.

use super::bone::{Axis, Bone};
use crate::Error;
use glam::{DMat4, DVec3};
use std::collections::HashMap;

/// Domain end of maps that do not restrict their domain.
pub const UNBOUNDED_DOMAIN_END: usize = 1_000_000_000;

/// Weights at or below this are not worth a vertex-group entry.
pub const DEFAULT_MIN_WEIGHT: f32 = 0.01;

/// A weight for every vertex index; indices outside [`WeightMap::domain`] weigh 0.
pub trait WeightMap {
    /// Half-open index range `[start, end)` the map is defined on.
    fn domain(&self) -> (usize, usize) {
        (0, UNBOUNDED_DOMAIN_END)
    }

    fn weight(&self, index: usize) -> f32;
}

/// Intersects `domain` with the vertex range of a mesh.
pub fn clip_domain(domain: (usize, usize), vertex_count: usize) -> (usize, usize) {
    (domain.0, domain.1.min(vertex_count))
}

/// `(index, weight)` for every vertex of a mesh whose weight exceeds `min_weight`.
pub fn collect_weights(
    map: &impl WeightMap,
    vertex_count: usize,
    min_weight: f32,
) -> Vec<(usize, f32)> {
    let (start, end) = clip_domain(map.domain(), vertex_count);
    (start..end)
        .filter_map(|i| {
            let w = map.weight(i);
            (w > min_weight).then_some((i, w))
        })
        .collect()
}

/// Angle in `[0, 360)` degrees of a point projected onto the XY plane, +X at 0.
pub fn plane_angle(point: DVec3) -> f64 {
    let angle = point.y.atan2(point.x).to_degrees();
    if angle < 0.0 { angle + 360.0 } else { angle }
}

/// Weights stored per vertex index.
#[derive(Clone, Debug, Default)]
pub struct TableMap {
    weights: HashMap<usize, f32>,
    domain: (usize, usize),
}

impl TableMap {
    pub fn new(indices: &[usize], weights: &[f32]) -> Result<Self, Error> {
        if indices.len() != weights.len() {
            return Err(Error::WeightTableMismatch {
                indices: indices.len(),
                weights: weights.len(),
            });
        }
        let domain = match (indices.iter().min(), indices.iter().max()) {
            (Some(&lo), Some(&hi)) => (lo, hi + 1),
            _ => (0, 0),
        };
        Ok(Self {
            weights: indices.iter().copied().zip(weights.iter().copied()).collect(),
            domain,
        })
    }
}

impl WeightMap for TableMap {
    fn domain(&self) -> (usize, usize) {
        self.domain
    }

    fn weight(&self, index: usize) -> f32 {
        self.weights.get(&index).copied().unwrap_or(0.0)
    }
}

/// Turns vertex coordinates in a bone's falloff frame into a weight.
///
/// The angular, z-distance and sphere falloff curves are supplied by the caller.
pub trait Falloff {
    fn weight(&self, local: DVec3) -> f32;
}

impl<F: Fn(DVec3) -> f32> Falloff for F {
    fn weight(&self, local: DVec3) -> f32 {
        self(local)
    }
}

/// Weights computed from transformed vertex positions.
pub struct TransformMap<L, F> {
    lookup: L,
    transform: DMat4,
    falloff: F,
    domain: Option<(usize, usize)>,
}

impl<L, F> TransformMap<L, F>
where
    L: Fn(usize) -> DVec3,
    F: Falloff,
{
    /// `lookup` maps a vertex index to its world-space position.
    pub fn new(lookup: L, transform: DMat4, falloff: F) -> Self {
        Self {
            lookup,
            transform,
            falloff,
            domain: None,
        }
    }

    /// A map evaluated in `bone`'s falloff frame for `axis`.
    pub fn for_bone(bone: &Bone, axis: Axis, lookup: L, falloff: F) -> Self {
        Self::new(lookup, bone.weight_angle_transform(axis), falloff)
    }

    pub fn with_domain(mut self, start: usize, end: usize) -> Self {
        self.domain = Some((start, end));
        self
    }

    pub fn local_coords(&self, index: usize) -> DVec3 {
        self.transform.transform_point3((self.lookup)(index))
    }
}

impl<L, F> WeightMap for TransformMap<L, F>
where
    L: Fn(usize) -> DVec3,
    F: Falloff,
{
    fn domain(&self) -> (usize, usize) {
        self.domain.unwrap_or((0, UNBOUNDED_DOMAIN_END))
    }

    fn weight(&self, index: usize) -> f32 {
        self.falloff.weight(self.local_coords(index))
    }
}
