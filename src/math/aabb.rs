use super::{Isometry3, Point3, Vector3, TOLERANCE};

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box.
    pub min: Point3,
    /// Maximum corner of the bounding box.
    pub max: Point3,
}

impl Aabb {
    /// Creates a box from two corners. The corners are reordered per axis.
    #[must_use]
    pub fn new(a: Point3, b: Point3) -> Self {
        Self {
            min: Point3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Point3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// Creates a box centred on the origin.
    #[must_use]
    pub fn from_half_extents(half: Vector3) -> Self {
        Self {
            min: Point3::from(-half),
            max: Point3::from(half),
        }
    }

    /// Full edge lengths along each axis.
    #[must_use]
    pub fn extents(&self) -> Vector3 {
        self.max - self.min
    }

    /// The eight corner points.
    #[must_use]
    pub fn corners(&self) -> [Point3; 8] {
        let (lo, hi) = (self.min, self.max);
        [
            Point3::new(lo.x, lo.y, lo.z),
            Point3::new(hi.x, lo.y, lo.z),
            Point3::new(lo.x, hi.y, lo.z),
            Point3::new(hi.x, hi.y, lo.z),
            Point3::new(lo.x, lo.y, hi.z),
            Point3::new(hi.x, lo.y, hi.z),
            Point3::new(lo.x, hi.y, hi.z),
            Point3::new(hi.x, hi.y, hi.z),
        ]
    }

    /// Bounding box of this box after a rigid transform.
    #[must_use]
    pub fn transformed(&self, iso: &Isometry3) -> Self {
        let corners = self.corners();
        let first = iso * corners[0];
        corners[1..].iter().fold(Self::new(first, first), |acc, c| {
            acc.expanded_to(&(iso * c))
        })
    }

    /// Smallest box containing both this box and `point`.
    #[must_use]
    pub fn expanded_to(&self, point: &Point3) -> Self {
        Self {
            min: self.min.inf(point),
            max: self.max.sup(point),
        }
    }

    /// Common region of two boxes, or `None` if they are disjoint.
    ///
    /// Boxes that only touch yield a flat (zero-thickness) box.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        let min = self.min.sup(&other.min);
        let max = self.max.inf(&other.max);
        if (0..3).all(|i| max[i] >= min[i] - TOLERANCE) {
            Some(Self { min, max: max.sup(&min) })
        } else {
            None
        }
    }

    /// Returns `true` if the boxes share a region of positive volume.
    ///
    /// Touching faces do not count as an overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        (0..3).all(|i| {
            self.max[i].min(other.max[i]) - self.min[i].max(other.min[i]) > TOLERANCE
        })
    }

    /// Returns `true` if `other` lies inside this box (boundaries may coincide).
    #[must_use]
    pub fn contains_box(&self, other: &Self) -> bool {
        (0..3).all(|i| {
            other.min[i] >= self.min[i] - TOLERANCE && other.max[i] <= self.max[i] + TOLERANCE
        })
    }

    /// Parts of this box outside `cut`, as up to six axis slabs.
    ///
    /// Slabs may overlap each other. Slabs thinner than [`TOLERANCE`] are
    /// left out.
    #[must_use]
    pub fn slabs_outside(&self, cut: &Self) -> Vec<Self> {
        let mut slabs = Vec::new();
        for axis in 0..3 {
            if cut.min[axis] - self.min[axis] > TOLERANCE {
                let mut below = *self;
                below.max[axis] = cut.min[axis].min(self.max[axis]);
                slabs.push(below);
            }
            if self.max[axis] - cut.max[axis] > TOLERANCE {
                let mut above = *self;
                above.min[axis] = cut.max[axis].max(self.min[axis]);
                slabs.push(above);
            }
        }
        slabs
    }

    /// Returns `true` if `other` lies inside this box with a gap on every side.
    #[must_use]
    pub fn strictly_contains_box(&self, other: &Self) -> bool {
        (0..3).all(|i| other.min[i] > self.min[i] && other.max[i] < self.max[i])
    }
}
