//! Combination of two asymmetric uncertainties into the uncertainty band of their ratio.

use super::ensemble::Uncertainty;
use super::error::{Bound, DomainError};
use itertools::{Itertools, MinMaxResult};
use serde::{Deserialize, Serialize};

/// Ratio of two uncertain quantities at a single point.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct RatioSample {
    /// Ratio of the central values.
    pub central: f64,
    /// Lower edge of the band.
    pub min: f64,
    /// Upper edge of the band.
    pub max: f64,
}

impl RatioSample {
    /// Computes the ratio `numerator / denominator`.
    ///
    /// The band is the envelope of the four ratios formed from the upper and lower bounds of the
    /// numerator over the upper and lower bounds of the denominator. It makes no assumption
    /// about the correlation between numerator and denominator. The central value is the ratio
    /// of the central values and need not be the midpoint of the band.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::ZeroDenominator`] if the central value or one of the bounds of the
    /// denominator vanishes, and [`DomainError::NonFinite`] if any input or result is infinite
    /// or NaN.
    pub fn from_uncertainties(
        numerator: &Uncertainty,
        denominator: &Uncertainty,
    ) -> Result<Self, DomainError> {
        let numerator_bounds = [numerator.upper(), numerator.lower()];
        let denominator_bounds = [
            (Bound::Upper, denominator.upper()),
            (Bound::Lower, denominator.lower()),
        ];

        finite("numerator", numerator.central)?;
        finite("denominator", denominator.central)?;
        for value in numerator_bounds {
            finite("numerator bound", value)?;
        }

        if denominator.central == 0.0 {
            return Err(DomainError::ZeroDenominator(Bound::Central));
        }

        for (bound, value) in denominator_bounds {
            finite("denominator bound", value)?;

            if value == 0.0 {
                return Err(DomainError::ZeroDenominator(bound));
            }
        }

        let candidates: Vec<_> = numerator_bounds
            .iter()
            .cartesian_product(&denominator_bounds)
            .map(|(num, (_, den))| num / den)
            .collect();

        for &candidate in &candidates {
            finite("bound ratio", candidate)?;
        }

        let (min, max) = match candidates.iter().copied().minmax_by(f64::total_cmp) {
            MinMaxResult::MinMax(min, max) => (min, max),
            // there are always four candidates
            MinMaxResult::OneElement(value) => (value, value),
            MinMaxResult::NoElements => unreachable!(),
        };

        let central = finite("central ratio", numerator.central / denominator.central)?;

        Ok(Self { central, min, max })
    }

    /// Width of the band, `max - min`.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.max - self.min
    }

    /// Returns `true` if the band contains `value`.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

fn finite(what: &'static str, value: f64) -> Result<f64, DomainError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(DomainError::NonFinite { what, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;
    use proptest::prelude::*;

    #[test]
    fn four_candidates() {
        let proton = Uncertainty::new(1.0, 0.1, 0.1);
        let lead = Uncertainty::new(1.2, 0.1, 0.1);
        let sample = RatioSample::from_uncertainties(&lead, &proton).unwrap();

        assert_approx_eq!(f64, sample.central, 1.2, epsilon = 1e-12);
        assert_approx_eq!(f64, sample.min, 1.0, epsilon = 1e-12);
        assert_approx_eq!(f64, sample.max, 1.3 / 0.9, epsilon = 1e-12);
    }

    #[test]
    fn central_is_not_the_midpoint() {
        let sample = RatioSample::from_uncertainties(
            &Uncertainty::new(1.0, 0.5, 0.0),
            &Uncertainty::new(1.0, 0.0, 0.0),
        )
        .unwrap();

        assert_eq!(sample.central, 1.0);
        assert_eq!(sample.min, 1.0);
        assert_eq!(sample.max, 1.5);
        assert_eq!(sample.width(), 0.5);
    }

    #[test]
    fn vanishing_denominator() {
        let numerator = Uncertainty::new(1.0, 0.1, 0.1);

        assert_eq!(
            RatioSample::from_uncertainties(&numerator, &Uncertainty::new(0.0, 0.1, 0.1)),
            Err(DomainError::ZeroDenominator(Bound::Central))
        );
        assert_eq!(
            RatioSample::from_uncertainties(&numerator, &Uncertainty::new(0.5, 0.1, 0.5)),
            Err(DomainError::ZeroDenominator(Bound::Lower))
        );
        assert_eq!(
            RatioSample::from_uncertainties(&numerator, &Uncertainty::new(-0.5, 0.5, 0.1)),
            Err(DomainError::ZeroDenominator(Bound::Upper))
        );
    }

    #[test]
    fn non_finite_input() {
        assert!(matches!(
            RatioSample::from_uncertainties(
                &Uncertainty::new(f64::NAN, 0.1, 0.1),
                &Uncertainty::new(1.0, 0.1, 0.1)
            ),
            Err(DomainError::NonFinite { .. })
        ));
        assert!(matches!(
            RatioSample::from_uncertainties(
                &Uncertainty::new(1.0, 0.1, 0.1),
                &Uncertainty::new(1.0, f64::INFINITY, 0.1)
            ),
            Err(DomainError::NonFinite { .. })
        ));
    }

    proptest! {
        #[test]
        fn band_is_ordered(
            num in 0.01..10.0f64,
            num_plus in 0.0..1.0f64,
            num_minus in 0.0..0.009f64,
            den in 0.01..10.0f64,
            den_plus in 0.0..1.0f64,
            den_minus in 0.0..0.009f64,
        ) {
            let sample = RatioSample::from_uncertainties(
                &Uncertainty::new(num, num_plus, num_minus),
                &Uncertainty::new(den, den_plus, den_minus),
            )
            .unwrap();

            prop_assert!(sample.min <= sample.max);
            // with positive bounds the central ratio lies inside the band
            prop_assert!(sample.contains(sample.central));
        }

        #[test]
        fn identical_inputs_contain_one(
            central in 0.01..10.0f64,
            errplus in 0.0..1.0f64,
            errminus in 0.0..0.009f64,
        ) {
            let uncertainty = Uncertainty::new(central, errplus, errminus);
            let sample = RatioSample::from_uncertainties(&uncertainty, &uncertainty).unwrap();

            prop_assert_eq!(sample.central, 1.0);
            prop_assert!(sample.min <= 1.0);
            prop_assert!(sample.max >= 1.0);
        }
    }
}
