/// A signed distance to an edge, paired with a tie-breaking score.
///
/// `dot` is the absolute cosine between the edge's end tangent and the
/// direction towards the query point. It is zero whenever the closest point
/// lies inside the edge's parameter range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignedDistance {
    pub distance: f64,
    pub dot: f64,
}

impl SignedDistance {
    /// Creates a new signed distance.
    #[must_use]
    pub fn new(distance: f64, dot: f64) -> Self {
        Self { distance, dot }
    }

    /// Returns `true` if `self` is a better (closer) estimate than `other`.
    ///
    /// Lesser absolute distance wins; equal magnitudes are ordered by the
    /// lower `dot`, i.e. the more perpendicular approach.
    #[must_use]
    pub fn is_closer_than(&self, other: &Self) -> bool {
        let a = self.distance.abs();
        let b = other.distance.abs();
        a < b || (a == b && self.dot < other.dot)
    }
}

impl Default for SignedDistance {
    /// An infinitely distant placeholder that any real distance beats.
    fn default() -> Self {
        Self {
            distance: -f64::MAX,
            dot: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn magnitude_decides_first() {
        let near = SignedDistance::new(-1.0, 0.9);
        let far = SignedDistance::new(2.0, 0.0);
        assert!(near.is_closer_than(&far));
        assert!(!far.is_closer_than(&near));
    }

    #[test]
    fn dot_breaks_ties() {
        let perpendicular = SignedDistance::new(1.0, 0.1);
        let oblique = SignedDistance::new(-1.0, 0.8);
        assert!(perpendicular.is_closer_than(&oblique));
        assert!(!oblique.is_closer_than(&perpendicular));
    }

    #[test]
    fn default_loses_to_everything() {
        let d = SignedDistance::new(1e300, 1.0);
        assert!(d.is_closer_than(&SignedDistance::default()));
    }
}
