//! Ensembles of parton distributions and the rules that reduce their members to uncertainties.

use super::convert;
use super::error::{DomainError, Error, Result};
use serde::{Deserialize, Serialize};

/// Central value with an asymmetric uncertainty, the result of reducing all members of an
/// ensemble at a single kinematic point.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct Uncertainty {
    /// Best estimate.
    pub central: f64,
    /// Distance from `central` to the upper edge of the interval. Never negative.
    pub errplus: f64,
    /// Distance from `central` to the lower edge of the interval. Never negative.
    pub errminus: f64,
}

impl Uncertainty {
    /// Constructor.
    #[must_use]
    pub const fn new(central: f64, errplus: f64, errminus: f64) -> Self {
        Self {
            central,
            errplus,
            errminus,
        }
    }

    /// Returns `central + errplus`.
    #[must_use]
    pub fn upper(&self) -> f64 {
        self.central + self.errplus
    }

    /// Returns `central - errminus`.
    #[must_use]
    pub fn lower(&self) -> f64 {
        self.central - self.errminus
    }
}

/// Rule turning one value per member into an [`Uncertainty`].
pub trait UncertaintyModel {
    /// Reduces `values`, which contains exactly one value per member in member order.
    ///
    /// # Errors
    ///
    /// Returns an error if the number of values is not compatible with this model.
    fn reduce(&self, values: &[f64]) -> Result<Uncertainty>;
}

/// Read-only collection of members of a parton distribution.
pub trait Ensemble: UncertaintyModel {
    /// Identifier of this ensemble, for example the name of an LHAPDF set.
    fn name(&self) -> &str;

    /// Number of members, always at least one.
    fn member_count(&self) -> usize;

    /// Returns `x f(x, Q2)` of the parton with PDG id `pid` for the given member.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Domain`] if `member` is not smaller than [`Ensemble::member_count`] or if
    /// `(x, q2)` lies outside of the range this ensemble supports.
    fn evaluate(&self, pid: i32, x: f64, q2: f64, member: usize) -> Result<f64>;

    /// Evaluates all members at the same point, in member order.
    ///
    /// # Errors
    ///
    /// Fails whenever [`Ensemble::evaluate`] fails for any of the members.
    fn evaluate_all(&self, pid: i32, x: f64, q2: f64) -> Result<Vec<f64>> {
        (0..self.member_count())
            .map(|member| self.evaluate(pid, x, q2, member))
            .collect()
    }
}

fn check_len(values: &[f64], expected: usize, ensemble: &str) -> Result<()> {
    if values.len() == expected {
        Ok(())
    } else {
        Err(Error::General(format!(
            "`{ensemble}` expects {expected} values for its reduction, got {}",
            values.len()
        )))
    }
}

/// Asymmetric Hessian uncertainties. The first member is the central value, the remaining ones
/// come in pairs of eigenvector directions.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Hessian;

impl UncertaintyModel for Hessian {
    fn reduce(&self, values: &[f64]) -> Result<Uncertainty> {
        if values.len() % 2 == 0 {
            return Err(Error::General(format!(
                "Hessian reduction expects an odd number of values, got {}",
                values.len()
            )));
        }

        let central = values[0];
        let (plus, minus) = values[1..]
            .chunks_exact(2)
            .fold((0.0, 0.0), |(plus, minus): (f64, f64), pair| {
                let up = (pair[0] - central).max(pair[1] - central).max(0.0);
                let down = (central - pair[0]).max(central - pair[1]).max(0.0);
                (up.mul_add(up, plus), down.mul_add(down, minus))
            });

        Ok(Uncertainty::new(central, plus.sqrt(), minus.sqrt()))
    }
}

/// Symmetric Hessian uncertainties. The first member is the central value, every other member is
/// one eigenvector direction.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct SymmHessian;

impl UncertaintyModel for SymmHessian {
    fn reduce(&self, values: &[f64]) -> Result<Uncertainty> {
        let Some((&central, rest)) = values.split_first() else {
            return Err(Error::General(
                "symmetric Hessian reduction expects at least one value".to_owned(),
            ));
        };

        let err = rest
            .iter()
            .map(|value| (value - central).powi(2))
            .sum::<f64>()
            .sqrt();

        Ok(Uncertainty::new(central, err, err))
    }
}

/// Monte Carlo replicas. The first member is the average replica and is ignored; the central
/// value is the mean and the uncertainty the standard deviation of the remaining replicas.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Replicas;

impl UncertaintyModel for Replicas {
    fn reduce(&self, values: &[f64]) -> Result<Uncertainty> {
        if values.len() < 3 {
            return Err(Error::General(format!(
                "replica reduction expects at least three values, got {}",
                values.len()
            )));
        }

        let replicas = &values[1..];
        let n = convert::f64_from_usize(replicas.len());
        let mean = replicas.iter().sum::<f64>() / n;
        let variance = replicas
            .iter()
            .map(|value| (value - mean).powi(2))
            .sum::<f64>()
            / (n - 1.0);
        let err = variance.sqrt();

        Ok(Uncertainty::new(mean, err, err))
    }
}

/// Ensemble whose members are given by a function, `xfx(pid, x, q2, member)`. Useful to wrap
/// tabulated or analytic parametrizations and as a stand-in for LHAPDF in tests.
pub struct FnEnsemble<F, M> {
    name: String,
    members: usize,
    xfx: F,
    model: M,
    x_range: Option<(f64, f64)>,
    q2_range: Option<(f64, f64)>,
}

impl<F: Fn(i32, f64, f64, usize) -> f64, M: UncertaintyModel> FnEnsemble<F, M> {
    /// Constructor. Without further restrictions every `x` and `q2` is accepted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Load`] if `members` is zero.
    pub fn new(name: &str, members: usize, xfx: F, model: M) -> Result<Self> {
        if members == 0 {
            return Err(Error::Load {
                name: name.to_owned(),
                reason: "an ensemble needs at least one member".to_owned(),
            });
        }

        Ok(Self {
            name: name.to_owned(),
            members,
            xfx,
            model,
            x_range: None,
            q2_range: None,
        })
    }

    /// Restricts the supported momentum fractions to `[min, max]`.
    #[must_use]
    pub fn with_x_range(mut self, min: f64, max: f64) -> Self {
        self.x_range = Some((min, max));
        self
    }

    /// Restricts the supported virtualities to `[min, max]`.
    #[must_use]
    pub fn with_q2_range(mut self, min: f64, max: f64) -> Self {
        self.q2_range = Some((min, max));
        self
    }
}

impl<F, M: UncertaintyModel> UncertaintyModel for FnEnsemble<F, M> {
    fn reduce(&self, values: &[f64]) -> Result<Uncertainty> {
        check_len(values, self.members, &self.name)?;
        self.model.reduce(values)
    }
}

impl<F: Fn(i32, f64, f64, usize) -> f64, M: UncertaintyModel> Ensemble for FnEnsemble<F, M> {
    fn name(&self) -> &str {
        &self.name
    }

    fn member_count(&self) -> usize {
        self.members
    }

    fn evaluate(&self, pid: i32, x: f64, q2: f64, member: usize) -> Result<f64> {
        if member >= self.members {
            return Err(DomainError::MemberOutOfRange {
                ensemble: self.name.clone(),
                member,
                count: self.members,
            }
            .at(x, q2));
        }

        let (x_min, x_max) = self.x_range.unwrap_or((f64::MIN_POSITIVE, 1.0));

        if !(x_min..=x_max).contains(&x) {
            return Err(DomainError::XOutOfRange {
                ensemble: self.name.clone(),
                x,
                min: x_min,
                max: x_max,
            }
            .at(x, q2));
        }

        let (q2_min, q2_max) = self.q2_range.unwrap_or((f64::MIN_POSITIVE, f64::INFINITY));

        if !(q2_min..=q2_max).contains(&q2) {
            return Err(DomainError::Q2OutOfRange {
                ensemble: self.name.clone(),
                q2,
                min: q2_min,
                max: q2_max,
            }
            .at(x, q2));
        }

        Ok((self.xfx)(pid, x, q2, member))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn hessian_pairs() {
        let uncertainty = Hessian.reduce(&[1.0, 1.1, 0.9]).unwrap();

        assert_eq!(uncertainty.central, 1.0);
        assert_approx_eq!(f64, uncertainty.errplus, 0.1, epsilon = 1e-12);
        assert_approx_eq!(f64, uncertainty.errminus, 0.1, epsilon = 1e-12);

        // both directions of the second eigenvector move up
        let uncertainty = Hessian.reduce(&[2.0, 2.3, 1.6, 2.1, 2.4]).unwrap();

        assert_approx_eq!(f64, uncertainty.errplus, 0.5, epsilon = 1e-12);
        assert_approx_eq!(f64, uncertainty.errminus, 0.4, epsilon = 1e-12);
    }

    #[test]
    fn hessian_rejects_unpaired_members() {
        assert!(Hessian.reduce(&[1.0, 1.1]).is_err());
    }

    #[test]
    fn symm_hessian() {
        let uncertainty = SymmHessian.reduce(&[1.0, 1.3, 0.6]).unwrap();

        assert_eq!(uncertainty.central, 1.0);
        assert_approx_eq!(f64, uncertainty.errplus, 0.5, epsilon = 1e-12);
        assert_eq!(uncertainty.errplus, uncertainty.errminus);
        assert!(SymmHessian.reduce(&[]).is_err());
    }

    #[test]
    fn replicas_ignore_member_zero() {
        let uncertainty = Replicas.reduce(&[100.0, 1.0, 2.0, 3.0]).unwrap();

        assert_approx_eq!(f64, uncertainty.central, 2.0, epsilon = 1e-12);
        assert_approx_eq!(f64, uncertainty.errplus, 1.0, epsilon = 1e-12);
        assert_approx_eq!(f64, uncertainty.errminus, 1.0, epsilon = 1e-12);
        assert!(Replicas.reduce(&[1.0, 2.0]).is_err());
    }

    #[test]
    fn reduce_is_pure() {
        let values = [0.7, 0.75, 0.64, 0.71, 0.69];

        assert_eq!(
            Hessian.reduce(&values).unwrap(),
            Hessian.reduce(&values).unwrap()
        );
        assert_eq!(
            Replicas.reduce(&values).unwrap(),
            Replicas.reduce(&values).unwrap()
        );
    }

    #[test]
    fn fn_ensemble_checks_arguments() {
        let ensemble = FnEnsemble::new(
            "toy",
            3,
            |_, x, _, member| x * convert::f64_from_usize(member + 1),
            Hessian,
        )
        .unwrap()
        .with_x_range(1e-5, 1.0)
        .with_q2_range(1.69, 1e8);

        assert_eq!(ensemble.name(), "toy");
        assert_eq!(ensemble.member_count(), 3);
        assert_eq!(ensemble.evaluate(21, 0.5, 10.0, 2).unwrap(), 1.5);
        assert_eq!(
            ensemble.evaluate_all(21, 0.5, 10.0).unwrap(),
            [0.5, 1.0, 1.5]
        );

        for error in [
            ensemble.evaluate(21, 0.5, 10.0, 3).unwrap_err(),
            ensemble.evaluate(21, 1e-6, 10.0, 0).unwrap_err(),
            ensemble.evaluate(21, 0.5, 1.0, 0).unwrap_err(),
        ] {
            assert!(error.is_domain());
        }

        assert!(matches!(ensemble.reduce(&[1.0]), Err(Error::General(_))));
    }

    #[test]
    fn fn_ensemble_needs_members() {
        assert!(matches!(
            FnEnsemble::new("empty", 0, |_, _, _, _| 0.0, SymmHessian),
            Err(Error::Load { .. })
        ));
    }
}
