use serde::{Deserialize, Serialize};

/// A location surveyed in the reference frame and observed in the point cloud frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlPoint {
    /// Identifying label of the point.
    pub name: String,
    /// Position in the reference frame as easting, northing and height.
    pub reference: [f64; 3],
    /// Position in the point cloud frame as x, y and z.
    pub source: [f64; 3],
}

impl ControlPoint {
    /// Create a new control point.
    ///
    /// # Arguments
    ///
    /// * `name` - Identifying label of the point.
    /// * `reference` - Surveyed `[E, N, H]` position.
    /// * `source` - Observed `[X, Y, Z]` position in the point cloud.
    pub fn new(name: impl Into<String>, reference: [f64; 3], source: [f64; 3]) -> Self {
        Self {
            name: name.into(),
            reference,
            source,
        }
    }

    /// Whether all six coordinates are finite.
    pub fn is_finite(&self) -> bool {
        self.reference.iter().chain(self.source.iter()).all(|v| v.is_finite())
    }

    /// Raw offset between the reference and source positions.
    pub fn delta(&self) -> [f64; 3] {
        [
            self.reference[0] - self.source[0],
            self.reference[1] - self.source[1],
            self.reference[2] - self.source[2],
        ]
    }
}

/// An ordered collection of control points.
///
/// A set is built fresh from parsed input and never mutated by the estimators.
/// Deselecting points produces a new set via [`ControlPointSet::excluding`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlPointSet {
    points: Vec<ControlPoint>,
}

impl ControlPointSet {
    /// Create a new control point set.
    pub fn new(points: Vec<ControlPoint>) -> Self {
        Self { points }
    }

    /// Number of control points in the set.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the set holds no control points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The control points in input order.
    pub fn points(&self) -> &[ControlPoint] {
        &self.points
    }

    /// Iterate over the control points in input order.
    pub fn iter(&self) -> std::slice::Iter<'_, ControlPoint> {
        self.points.iter()
    }

    /// The names of the control points in input order.
    pub fn names(&self) -> Vec<&str> {
        self.points.iter().map(|p| p.name.as_str()).collect()
    }

    /// The reference positions `[E, N, H]` in input order.
    pub fn reference_positions(&self) -> Vec<[f64; 3]> {
        self.points.iter().map(|p| p.reference).collect()
    }

    /// The source positions `[X, Y, Z]` in input order.
    pub fn source_positions(&self) -> Vec<[f64; 3]> {
        self.points.iter().map(|p| p.source).collect()
    }

    /// Return a new set without the points whose names are listed.
    ///
    /// Every point carrying an excluded name is dropped, the remaining points
    /// keep their order.
    pub fn excluding<S: AsRef<str>>(&self, names: &[S]) -> Self {
        for name in names {
            let name = name.as_ref();
            if !self.points.iter().any(|p| p.name == name) {
                log::warn!("Excluded control point '{}' not found in the set", name);
            }
        }

        let points = self
            .points
            .iter()
            .filter(|p| !names.iter().any(|n| n.as_ref() == p.name))
            .cloned()
            .collect();

        Self { points }
    }
}

impl From<Vec<ControlPoint>> for ControlPointSet {
    fn from(points: Vec<ControlPoint>) -> Self {
        Self::new(points)
    }
}

impl FromIterator<ControlPoint> for ControlPointSet {
    fn from_iter<I: IntoIterator<Item = ControlPoint>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a ControlPointSet {
    type Item = &'a ControlPoint;
    type IntoIter = std::slice::Iter<'a, ControlPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
