//! Error types of this crate.

use std::fmt::{self, Display, Formatter};
use thiserror::Error;

/// Which of the two bounds of an uncertainty interval is meant.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Bound {
    /// The central value itself.
    Central,
    /// `central + errplus`.
    Upper,
    /// `central - errminus`.
    Lower,
}

impl Display for Bound {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(match self {
            Self::Central => "central value",
            Self::Upper => "upper bound",
            Self::Lower => "lower bound",
        })
    }
}

/// Evaluation requested at a point where it is undefined.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum DomainError {
    /// The momentum fraction lies outside of the range supported by an ensemble.
    #[error("x = {x:e} outside of the range [{min:e}, {max:e}] of `{ensemble}`")]
    XOutOfRange {
        /// Name of the ensemble.
        ensemble: String,
        /// Requested momentum fraction.
        x: f64,
        /// Smallest supported momentum fraction.
        min: f64,
        /// Largest supported momentum fraction.
        max: f64,
    },
    /// The virtuality lies outside of the range supported by an ensemble.
    #[error("Q2 = {q2} GeV^2 outside of the range [{min}, {max}] GeV^2 of `{ensemble}`")]
    Q2OutOfRange {
        /// Name of the ensemble.
        ensemble: String,
        /// Requested virtuality.
        q2: f64,
        /// Smallest supported virtuality.
        min: f64,
        /// Largest supported virtuality.
        max: f64,
    },
    /// The member index is not smaller than the member count.
    #[error("member {member} requested, but `{ensemble}` has only {count} members")]
    MemberOutOfRange {
        /// Name of the ensemble.
        ensemble: String,
        /// Requested member.
        member: usize,
        /// Number of members of the ensemble.
        count: usize,
    },
    /// The denominator of the ratio vanishes.
    #[error("the {0} of the denominator vanishes")]
    ZeroDenominator(Bound),
    /// An ensemble produced a value that is infinite or NaN.
    #[error("non-finite value {value} for {what}")]
    NonFinite {
        /// Which quantity is affected.
        what: &'static str,
        /// The offending value.
        value: f64,
    },
}

impl DomainError {
    /// Attaches the kinematic point `(x, q2)` to this error.
    #[must_use]
    pub fn at(self, x: f64, q2: f64) -> Error {
        Error::Domain {
            x,
            q2,
            source: self,
        }
    }
}

/// Catch-all error for this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// An ensemble could not be loaded.
    #[error("could not load ensemble `{name}`: {reason}")]
    Load {
        /// Name or identifier of the ensemble.
        name: String,
        /// Why loading failed.
        reason: String,
    },
    /// Evaluation failed at a specific kinematic point.
    #[error("at x = {x:e}, Q2 = {q2} GeV^2: {source}")]
    Domain {
        /// Momentum fraction of the failing point.
        x: f64,
        /// Virtuality of the failing point.
        q2: f64,
        /// What went wrong.
        source: DomainError,
    },
    /// The run configuration is malformed.
    #[error("invalid configuration: {0}")]
    Configuration(String),
    /// An error that originates in this crate.
    #[error("{0}")]
    General(String),
    /// Error that does not originate from this crate.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Returns `true` if this error is tied to a single kinematic point, and a caller may decide
    /// to continue with other points.
    #[must_use]
    pub const fn is_domain(&self) -> bool {
        matches!(self, Self::Domain { .. })
    }
}

/// Result type used throughout this crate.
pub type Result<T> = std::result::Result<T, Error>;
