use glam::Vec2;

/// An axis-aligned rectangle, used for boundaries and spatial index domains.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundingBox {
    /// Lower corner.
    pub min: Vec2,
    /// Upper corner.
    pub max: Vec2,
}

impl BoundingBox {
    /// Box that contains nothing. Extending it with a point yields a box containing only that point.
    pub const IDENTITY: Self = Self {
        min: Vec2::splat(f32::INFINITY),
        max: Vec2::splat(f32::NEG_INFINITY),
    };

    /// Creates a new [`BoundingBox`] from its corners.
    #[inline]
    pub const fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Creates a new [`BoundingBox`] of the given size centred on `centre`.
    #[inline]
    pub fn from_centre(centre: Vec2, size: Vec2) -> Self {
        let half = size * 0.5;
        Self::new(centre - half, centre + half)
    }

    /// Smallest box containing all the given positions.
    pub fn containing(positions: impl IntoIterator<Item = Vec2>) -> Self {
        let mut result = Self::IDENTITY;
        for position in positions {
            result.extend(position);
        }
        result
    }

    /// Grows the box so that it contains `with`.
    #[inline]
    pub fn extend(&mut self, with: Vec2) {
        self.min = self.min.min(with);
        self.max = self.max.max(with);
    }

    /// Centre of the box.
    #[inline]
    pub fn centre(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Size of the box along each axis.
    #[inline]
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Returns true if the box has no area, including the [`IDENTITY`](Self::IDENTITY) box.
    #[inline]
    pub fn is_empty(&self) -> bool {
        !(self.min.x < self.max.x && self.min.y < self.max.y)
    }

    /// Returns true if `point` lies inside the box or on its edges.
    #[inline]
    pub fn contains(&self, point: Vec2) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn containing_positions() {
        let bbox = BoundingBox::containing([
            Vec2::new(1.0, -2.0),
            Vec2::new(-3.0, 4.0),
            Vec2::new(0.5, 0.5),
        ]);

        assert_eq!(bbox.min, Vec2::new(-3.0, -2.0));
        assert_eq!(bbox.max, Vec2::new(1.0, 4.0));
        assert_eq!(bbox.centre(), Vec2::new(-1.0, 1.0));
        assert_eq!(bbox.size(), Vec2::new(4.0, 6.0));
    }

    #[test]
    fn identity_is_empty() {
        assert!(BoundingBox::IDENTITY.is_empty());
        assert!(BoundingBox::containing([Vec2::ONE]).is_empty());
        assert!(!BoundingBox::from_centre(Vec2::ZERO, Vec2::ONE).is_empty());
    }

    #[test]
    fn contains_edges() {
        let bbox = BoundingBox::new(Vec2::ZERO, Vec2::splat(2.0));

        assert!(bbox.contains(Vec2::ZERO));
        assert!(bbox.contains(Vec2::splat(2.0)));
        assert!(!bbox.contains(Vec2::new(2.1, 1.0)));
    }
}
