//! Grids of momentum fractions.

use super::convert;
use super::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Specification of a grid of momentum fractions with nodes equidistant in `ln(x)`.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct XGrid {
    /// Number of nodes.
    pub points: usize,
    /// First node.
    pub min: f64,
    /// Last node.
    pub max: f64,
}

impl Default for XGrid {
    fn default() -> Self {
        Self {
            points: 50,
            min: 1e-4,
            max: 1.0,
        }
    }
}

impl XGrid {
    /// Constructor.
    #[must_use]
    pub const fn new(points: usize, min: f64, max: f64) -> Self {
        Self { points, min, max }
    }

    /// Checks that this specification describes a non-empty, strictly increasing grid inside
    /// `(0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.points == 0 {
            return Err(Error::Configuration(
                "the x grid needs at least one point".to_owned(),
            ));
        }

        if !(self.min.is_finite() && self.min > 0.0) {
            return Err(Error::Configuration(format!(
                "the lower x bound must be positive, got {}",
                self.min
            )));
        }

        if !(self.max.is_finite() && self.max > 0.0 && self.max <= 1.0) {
            return Err(Error::Configuration(format!(
                "the upper x bound must lie in (0, 1], got {}",
                self.max
            )));
        }

        if self.min > self.max || (self.points > 1 && self.min == self.max) {
            return Err(Error::Configuration(format!(
                "the lower x bound {} must be smaller than the upper bound {}",
                self.min, self.max
            )));
        }

        Ok(())
    }

    /// Returns the nodes of this grid in increasing order. The first and last node are exactly
    /// `min` and `max`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if [`XGrid::validate`] fails.
    pub fn nodes(&self) -> Result<Vec<f64>> {
        self.validate()?;

        if self.points == 1 {
            return Ok(vec![self.min]);
        }

        let ymin = self.min.ln();
        let ymax = self.max.ln();
        let deltay = (ymax - ymin) / convert::f64_from_usize(self.points - 1);

        Ok((0..self.points)
            .map(|index| {
                if index == 0 {
                    self.min
                } else if index == self.points - 1 {
                    self.max
                } else {
                    convert::f64_from_usize(index).mul_add(deltay, ymin).exp()
                }
            })
            .collect())
    }
}
