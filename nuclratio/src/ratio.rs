//! Nuclear modification ratios over grids of momentum fractions.

use super::ensemble::Ensemble;
use super::envelope::RatioSample;
use super::error::{Error, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// What to do with a point at which the ratio is undefined.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MissingPolicy {
    /// Fail the whole curve.
    #[default]
    Abort,
    /// Keep the point, but without a sample.
    Skip,
}

/// A single node of a [`RatioCurve`].
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct RatioPoint {
    /// Momentum fraction.
    pub x: f64,
    /// The ratio at `x`, or `None` if it is undefined there and the curve was computed with
    /// [`MissingPolicy::Skip`].
    pub sample: Option<RatioSample>,
}

/// The ratio for a fixed virtuality, with nodes ordered by strictly increasing `x`.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct RatioCurve {
    q2: f64,
    points: Vec<RatioPoint>,
}

impl RatioCurve {
    /// Virtuality of this curve in GeV^2.
    #[must_use]
    pub const fn q2(&self) -> f64 {
        self.q2
    }

    /// All nodes, including the ones without a sample.
    #[must_use]
    pub fn points(&self) -> &[RatioPoint] {
        &self.points
    }

    /// The tuples `(x, central, min, max)` of all nodes that have a sample.
    pub fn tuples(&self) -> impl Iterator<Item = (f64, f64, f64, f64)> + '_ {
        self.points.iter().filter_map(|point| {
            point
                .sample
                .map(|sample| (point.x, sample.central, sample.min, sample.max))
        })
    }

    /// Number of nodes without a sample.
    #[must_use]
    pub fn missing(&self) -> usize {
        self.points
            .iter()
            .filter(|point| point.sample.is_none())
            .count()
    }
}

/// Computes the ratio of a numerator (nuclear) over a denominator (proton) ensemble for a single
/// parton flavour.
pub struct RatioEngine<'a, N: ?Sized, D: ?Sized> {
    numerator: &'a N,
    denominator: &'a D,
    pid: i32,
    policy: MissingPolicy,
}

impl<'a, N: Ensemble + Sync + ?Sized, D: Ensemble + Sync + ?Sized> RatioEngine<'a, N, D> {
    /// Constructor. Undefined points abort a curve unless [`RatioEngine::with_policy`] says
    /// otherwise.
    #[must_use]
    pub const fn new(numerator: &'a N, denominator: &'a D, pid: i32) -> Self {
        Self {
            numerator,
            denominator,
            pid,
            policy: MissingPolicy::Abort,
        }
    }

    /// Sets the policy for undefined points.
    #[must_use]
    pub const fn with_policy(mut self, policy: MissingPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// PDG id of the parton.
    #[must_use]
    pub const fn pid(&self) -> i32 {
        self.pid
    }

    /// Computes the ratio at a single point.
    ///
    /// # Errors
    ///
    /// Returns an [`Error::Domain`](super::error::Error::Domain) if either ensemble cannot be
    /// evaluated at `(x, q2)` or if the denominator vanishes, and any error of the reductions.
    pub fn sample(&self, x: f64, q2: f64) -> Result<RatioSample> {
        let denominator = self
            .denominator
            .reduce(&self.denominator.evaluate_all(self.pid, x, q2)?)?;
        let numerator = self
            .numerator
            .reduce(&self.numerator.evaluate_all(self.pid, x, q2)?)?;

        RatioSample::from_uncertainties(&numerator, &denominator).map_err(|err| err.at(x, q2))
    }

    /// Computes the ratio at every node of `xgrid`, which must be strictly increasing. The nodes
    /// are evaluated in parallel on the current rayon thread pool.
    ///
    /// # Errors
    ///
    /// Returns an [`Error::Configuration`] if `xgrid` is not strictly increasing. With
    /// [`MissingPolicy::Abort`] the error of the first failing node is returned. With
    /// [`MissingPolicy::Skip`] only errors that are not tied to a single node are returned.
    pub fn curve(&self, q2: f64, xgrid: &[f64]) -> Result<RatioCurve> {
        if !xgrid.windows(2).all(|pair| pair[0] < pair[1]) {
            return Err(Error::Configuration(format!(
                "the x grid must be strictly increasing, got {xgrid:?}"
            )));
        }

        let points = xgrid
            .par_iter()
            .map(|&x| match self.sample(x, q2) {
                Ok(sample) => Ok(RatioPoint {
                    x,
                    sample: Some(sample),
                }),
                Err(err) if err.is_domain() && self.policy == MissingPolicy::Skip => {
                    warn!(
                        "{}/{}: skipping point: {err}",
                        self.numerator.name(),
                        self.denominator.name()
                    );
                    Ok(RatioPoint { x, sample: None })
                }
                Err(err) => Err(err),
            })
            .collect::<Result<Vec<_>>>()?;

        let curve = RatioCurve { q2, points };

        debug!(
            numerator = self.numerator.name(),
            denominator = self.denominator.name(),
            pid = self.pid,
            q2,
            nodes = curve.points.len(),
            missing = curve.missing(),
            "computed ratio curve"
        );

        Ok(curve)
    }

    /// Computes one curve for each value in `q2s`, in the same order. All `(Q2, x)` nodes are
    /// evaluated in parallel.
    ///
    /// # Errors
    ///
    /// See [`RatioEngine::curve`].
    pub fn curves(&self, q2s: &[f64], xgrid: &[f64]) -> Result<Vec<RatioCurve>> {
        q2s.par_iter().map(|&q2| self.curve(q2, xgrid)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ensemble::{FnEnsemble, Hessian};
    use crate::error::{Bound, DomainError, Error};
    use float_cmp::assert_approx_eq;

    fn proton() -> impl Ensemble + Sync {
        FnEnsemble::new(
            "proton",
            3,
            |_, _, _, member| [1.0, 1.1, 0.9][member],
            Hessian,
        )
        .unwrap()
    }

    #[test]
    fn curve_keeps_grid_order() {
        let proton = proton();
        let lead = FnEnsemble::new(
            "lead",
            3,
            |_, x, _, member| x * [1.0, 1.05, 0.95][member],
            Hessian,
        )
        .unwrap();
        let xgrid = [1e-3, 1e-2, 1e-1, 1.0];
        let curve = RatioEngine::new(&lead, &proton, 21)
            .curve(10.0, &xgrid)
            .unwrap();

        assert_eq!(curve.q2(), 10.0);
        assert_eq!(curve.missing(), 0);
        let nodes: Vec<_> = curve.points().iter().map(|point| point.x).collect();

        assert_eq!(nodes, xgrid);

        for (x, central, min, max) in curve.tuples() {
            assert_approx_eq!(f64, central, x, epsilon = 1e-12);
            assert!(min <= central && central <= max);
        }
    }

    #[test]
    fn unordered_grids_are_rejected() {
        let proton = proton();
        let engine = RatioEngine::new(&proton, &proton, 21).with_policy(MissingPolicy::Skip);

        for xgrid in [&[0.5, 0.1][..], &[0.1, 0.1][..], &[0.1, f64::NAN, 0.5][..]] {
            assert!(matches!(engine.curve(10.0, xgrid), Err(Error::Configuration(_))));
        }

        assert!(engine.curve(10.0, &[]).unwrap().points().is_empty());
        assert_eq!(engine.curve(10.0, &[0.1]).unwrap().points().len(), 1);
    }

    #[test]
    fn skip_marks_points_as_missing() {
        let proton = proton();
        let lead = FnEnsemble::new(
            "lead",
            3,
            |_, _, _, member| [1.2, 1.3, 1.1][member],
            Hessian,
        )
        .unwrap()
        .with_x_range(1e-2, 1.0);
        let xgrid = [1e-3, 1e-2, 1e-1];

        let err = RatioEngine::new(&lead, &proton, 21)
            .curve(10.0, &xgrid)
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Domain {
                source: DomainError::XOutOfRange { .. },
                ..
            }
        ));

        let curve = RatioEngine::new(&lead, &proton, 21)
            .with_policy(MissingPolicy::Skip)
            .curve(10.0, &xgrid)
            .unwrap();

        assert_eq!(curve.missing(), 1);
        assert_eq!(curve.points()[0].sample, None);
        assert_eq!(curve.tuples().count(), 2);
    }

    #[test]
    fn skip_keeps_fatal_errors() {
        // two members cannot be reduced with the Hessian method
        let broken = FnEnsemble::new("broken", 2, |_, _, _, _| 1.0, Hessian).unwrap();
        let proton = proton();

        let result = RatioEngine::new(&broken, &proton, 21)
            .with_policy(MissingPolicy::Skip)
            .curve(10.0, &[0.1]);

        assert!(matches!(result, Err(Error::General(_))));
    }

    #[test]
    fn zero_denominator_reports_point() {
        let zero = FnEnsemble::new("zero", 3, |_, _, _, _| 0.0, Hessian).unwrap();
        let proton = proton();

        let err = RatioEngine::new(&proton, &zero, 21)
            .sample(0.5, 3.0)
            .unwrap_err();

        match err {
            Error::Domain { x, q2, source } => {
                assert_eq!(x, 0.5);
                assert_eq!(q2, 3.0);
                assert_eq!(source, DomainError::ZeroDenominator(Bound::Central));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn curves_follow_q2_order() {
        let proton = proton();
        let curves = RatioEngine::new(&proton, &proton, 21)
            .curves(&[10.0, 3.0, 100.0], &[0.01, 0.1])
            .unwrap();

        assert_eq!(
            curves.iter().map(RatioCurve::q2).collect::<Vec<_>>(),
            [10.0, 3.0, 100.0]
        );
    }
}
