//! Photon map: a balanced kd-tree over stored photons.
//!
//! Building happens in two phases with two types. `PhotonMapBuilder` only
//! accepts insertions; `PhotonMapBuilder::build` balances the tree and returns
//! an immutable `PhotonMap` that only answers queries. A map can therefore
//! never be queried half-built or modified while shading threads read it.
//!
//! The tree is implicit: photons are reordered in place so that, for every
//! index range, the median element splits the range on the longest axis of
//! its bounds. No node allocations, and queries only need the photon array
//! plus one split axis per photon.

use crate::Photon;
use lux_math::{Aabb, Vec3};
use std::cmp::Ordering;

/// Insertion-phase photon map.
#[derive(Debug, Default, Clone)]
pub struct PhotonMapBuilder {
    photons: Vec<Photon>,
}

impl PhotonMapBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            photons: Vec::with_capacity(capacity),
        }
    }

    /// Add one photon.
    pub fn insert(&mut self, photon: Photon) {
        self.photons.push(photon);
    }

    /// Move all photons of another builder (e.g. a per-thread buffer) into
    /// this one, keeping their order.
    pub fn merge(&mut self, mut other: PhotonMapBuilder) {
        self.photons.append(&mut other.photons);
    }

    pub fn len(&self) -> usize {
        self.photons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photons.is_empty()
    }

    /// Balance the tree and freeze the map.
    pub fn build(self) -> PhotonMap {
        let mut photons = self.photons;
        let mut axes = vec![0u8; photons.len()];
        let bounds = Aabb::enclosing(photons.iter().map(|p| p.position));

        balance(&mut photons, &mut axes);

        PhotonMap {
            photons,
            axes,
            bounds,
        }
    }
}

impl Extend<Photon> for PhotonMapBuilder {
    fn extend<I: IntoIterator<Item = Photon>>(&mut self, iter: I) {
        self.photons.extend(iter);
    }
}

/// Reorder `photons` into implicit kd-tree order, recording split axes.
fn balance(photons: &mut [Photon], axes: &mut [u8]) {
    if photons.is_empty() {
        return;
    }

    let bounds = Aabb::enclosing(photons.iter().map(|p| p.position));
    let axis = bounds.longest_axis();
    let mid = photons.len() / 2;

    photons.select_nth_unstable_by(mid, |a, b| {
        a.position[axis]
            .partial_cmp(&b.position[axis])
            .unwrap_or(Ordering::Equal)
    });
    axes[mid] = axis as u8;

    let (left, rest) = photons.split_at_mut(mid);
    let (left_axes, rest_axes) = axes.split_at_mut(mid);
    balance(left, left_axes);
    balance(&mut rest[1..], &mut rest_axes[1..]);
}

/// Query-phase photon map. Immutable and safe to share across threads.
#[derive(Debug, Clone)]
pub struct PhotonMap {
    photons: Vec<Photon>,
    axes: Vec<u8>,
    bounds: Aabb,
}

impl PhotonMap {
    /// A map with no photons.
    pub fn empty() -> Self {
        PhotonMapBuilder::new().build()
    }

    pub fn len(&self) -> usize {
        self.photons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photons.is_empty()
    }

    /// Bounds of all stored photon positions.
    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    /// All photons, in tree order.
    pub fn iter(&self) -> impl Iterator<Item = &Photon> {
        self.photons.iter()
    }

    /// Photons whose distance to `point` is at most `radius`.
    pub fn find_within_radius(&self, point: Vec3, radius: f32) -> Vec<&Photon> {
        let mut found = Vec::new();
        self.find_within_radius_into(point, radius, &mut found);
        found
    }

    /// Like `find_within_radius`, appending to `found` so results from
    /// several maps can be pooled.
    pub fn find_within_radius_into<'a>(
        &'a self,
        point: Vec3,
        radius: f32,
        found: &mut Vec<&'a Photon>,
    ) {
        if !(radius.is_finite() && radius > 0.0) || self.photons.is_empty() {
            return;
        }
        self.collect_within(0, self.photons.len(), point, radius * radius, found);
    }

    fn collect_within<'a>(
        &'a self,
        lo: usize,
        hi: usize,
        point: Vec3,
        radius_sq: f32,
        found: &mut Vec<&'a Photon>,
    ) {
        if lo >= hi {
            return;
        }

        let mid = lo + (hi - lo) / 2;
        let photon = &self.photons[mid];
        let axis = self.axes[mid] as usize;

        if photon.position.distance_squared(point) <= radius_sq {
            found.push(photon);
        }

        // Left of the split holds coordinates <= the median, right >= it
        let delta = point[axis] - photon.position[axis];
        let (near, far) = if delta <= 0.0 {
            ((lo, mid), (mid + 1, hi))
        } else {
            ((mid + 1, hi), (lo, mid))
        };

        self.collect_within(near.0, near.1, point, radius_sq, found);
        if delta * delta <= radius_sq {
            self.collect_within(far.0, far.1, point, radius_sq, found);
        }
    }
}

impl Default for PhotonMap {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Color, LightPath, PathTag, Ray};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn photon_at(position: Vec3) -> Photon {
        let mut path = LightPath::from_light();
        path.push(PathTag::Diffuse);
        Photon::new(
            position,
            Color::ONE,
            &Ray::new(position + Vec3::Y, -Vec3::Y),
            Vec3::Y,
            &path,
        )
    }

    fn random_builder(count: usize, seed: u64) -> PhotonMapBuilder {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut builder = PhotonMapBuilder::with_capacity(count);
        for _ in 0..count {
            let p = Vec3::new(rng.gen(), rng.gen(), rng.gen()) * 2.0 - Vec3::ONE;
            builder.insert(photon_at(p));
        }
        builder
    }

    fn sorted_positions(photons: &[&Photon]) -> Vec<[u32; 3]> {
        let mut keys: Vec<[u32; 3]> = photons
            .iter()
            .map(|p| [p.position.x.to_bits(), p.position.y.to_bits(), p.position.z.to_bits()])
            .collect();
        keys.sort_unstable();
        keys
    }

    #[test]
    fn test_matches_brute_force() {
        let builder = random_builder(2000, 5);
        let all: Vec<Photon> = builder.photons.clone();
        let map = builder.build();

        let mut rng = StdRng::seed_from_u64(17);
        for _ in 0..50 {
            let query = Vec3::new(rng.gen(), rng.gen(), rng.gen()) * 2.0 - Vec3::ONE;
            let radius = rng.gen_range(0.01..0.5);

            let expected: Vec<&Photon> = all
                .iter()
                .filter(|p| p.position.distance_squared(query) <= radius * radius)
                .collect();
            let found = map.find_within_radius(query, radius);

            assert_eq!(sorted_positions(&found), sorted_positions(&expected));
        }
    }

    #[test]
    fn test_build_loses_no_insertions() {
        let builder = random_builder(1000, 9);
        let map = builder.build();

        assert_eq!(map.len(), 1000);
        let everything = map.find_within_radius(Vec3::ZERO, 10.0);
        assert_eq!(everything.len(), 1000);
        for photon in map.iter() {
            assert!(map.bounds().contains(photon.position));
        }
    }

    #[test]
    fn test_radius_monotonicity() {
        let map = random_builder(1500, 23).build();
        let query = Vec3::new(0.1, -0.2, 0.3);

        let mut previous = 0;
        for step in 1..=20 {
            let count = map.find_within_radius(query, step as f32 * 0.05).len();
            assert!(count >= previous);
            previous = count;
        }
    }

    #[test]
    fn test_boundary_distance_is_included() {
        let mut builder = PhotonMapBuilder::new();
        builder.insert(photon_at(Vec3::new(0.5, 0.0, 0.0)));
        builder.insert(photon_at(Vec3::new(0.0, 2.0, 0.0)));
        let map = builder.build();

        assert_eq!(map.find_within_radius(Vec3::ZERO, 0.5).len(), 1);
    }

    #[test]
    fn test_degenerate_queries() {
        let map = random_builder(100, 2).build();

        assert!(map.find_within_radius(Vec3::ZERO, 0.0).is_empty());
        assert!(map.find_within_radius(Vec3::ZERO, -1.0).is_empty());
        assert!(map.find_within_radius(Vec3::ZERO, f32::NAN).is_empty());
        assert!(PhotonMap::empty().find_within_radius(Vec3::ZERO, 1.0).is_empty());
    }

    #[test]
    fn test_coincident_photons() {
        let mut builder = PhotonMapBuilder::new();
        for _ in 0..64 {
            builder.insert(photon_at(Vec3::splat(0.25)));
        }
        let map = builder.build();

        assert_eq!(map.find_within_radius(Vec3::splat(0.25), 1e-3).len(), 64);
    }

    #[test]
    fn test_merge_pools_buffers() {
        let mut a = random_builder(10, 1);
        let b = random_builder(15, 2);
        a.merge(b);
        a.extend(std::iter::once(photon_at(Vec3::ZERO)));

        assert_eq!(a.len(), 26);
        assert_eq!(a.build().len(), 26);
    }

    #[test]
    fn test_pooled_queries() {
        let mut diffuse = PhotonMapBuilder::new();
        diffuse.insert(photon_at(Vec3::ZERO));
        let mut caustic = PhotonMapBuilder::new();
        caustic.insert(photon_at(Vec3::new(0.01, 0.0, 0.0)));
        let (diffuse, caustic) = (diffuse.build(), caustic.build());

        let mut found = Vec::new();
        diffuse.find_within_radius_into(Vec3::ZERO, 0.03, &mut found);
        caustic.find_within_radius_into(Vec3::ZERO, 0.03, &mut found);
        assert_eq!(found.len(), 2);
    }
}
