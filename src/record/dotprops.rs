use super::{ExtraColumns, RecordId};

/// Point cloud with per-point tangent vectors.
///
/// Point order carries no meaning; two dotprops are equivalent when they
/// hold the same multiset of points (see [`Dotprops::eq_unordered`]).
#[derive(Debug, Clone, PartialEq)]
pub struct Dotprops {
    /// Record identifier
    pub id: RecordId,
    /// Point coordinates
    pub points: Vec<[f32; 3]>,
    /// Tangent vectors, one per point
    pub vect: Option<Vec<[f32; 3]>>,
    /// Alpha (linearity) values, one per point
    pub alpha: Option<Vec<f32>>,
    /// Pass-through per-point columns
    pub extra: ExtraColumns,
}

impl Dotprops {
    /// Create dotprops from bare points
    pub fn new(id: impl Into<RecordId>, points: Vec<[f32; 3]>) -> Self {
        Self {
            id: id.into(),
            points,
            vect: None,
            alpha: None,
            extra: ExtraColumns::new(),
        }
    }

    /// Attach tangent vectors
    pub fn with_vectors(mut self, vect: Vec<[f32; 3]>) -> Self {
        self.vect = Some(vect);
        self
    }

    /// Attach alpha values
    pub fn with_alpha(mut self, alpha: Vec<f32>) -> Self {
        self.alpha = Some(alpha);
        self
    }

    /// Attach pass-through columns
    pub fn with_extra(mut self, extra: ExtraColumns) -> Self {
        self.extra = extra;
        self
    }

    /// Number of points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True if there are no points
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Compare ignoring point order.
    ///
    /// Extra columns are not compared since their rows cannot be matched
    /// up without an order.
    pub fn eq_unordered(&self, other: &Dotprops) -> bool {
        if self.id != other.id || self.len() != other.len() {
            return false;
        }
        if self.vect.is_some() != other.vect.is_some() || self.alpha.is_some() != other.alpha.is_some() {
            return false;
        }
        let mut a = self.point_rows();
        let mut b = other.point_rows();
        a.sort_by(|l, r| l.partial_cmp(r).unwrap_or(std::cmp::Ordering::Equal));
        b.sort_by(|l, r| l.partial_cmp(r).unwrap_or(std::cmp::Ordering::Equal));
        a == b
    }

    fn point_rows(&self) -> Vec<[f32; 7]> {
        (0..self.points.len())
            .map(|i| {
                let p = self.points[i];
                let v = self.vect.as_ref().and_then(|v| v.get(i).copied()).unwrap_or([0.0; 3]);
                let a = self.alpha.as_ref().and_then(|a| a.get(i).copied()).unwrap_or(0.0);
                [p[0], p[1], p[2], v[0], v[1], v[2], a]
            })
            .collect()
    }
}
