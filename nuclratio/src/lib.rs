#![warn(clippy::all, clippy::cargo, clippy::nursery, clippy::pedantic)]
#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

//! `nuclratio` computes nuclear modification ratios of parton distributions.
//!
//! For each virtuality and each momentum fraction of a grid, all members of a nuclear and of a
//! free-proton [`Ensemble`](ensemble::Ensemble) are evaluated and reduced to an
//! [`Uncertainty`](ensemble::Uncertainty) each. The two are then combined into a
//! [`RatioSample`](envelope::RatioSample): the ratio of the central values together with the
//! envelope of all ratios of the interval bounds.
//!
//! ```
//! use nuclratio::ensemble::{FnEnsemble, Hessian};
//! use nuclratio::ratio::RatioEngine;
//!
//! let proton = FnEnsemble::new("p", 3, |_, _, _, m| [1.0, 1.1, 0.9][m], Hessian)?;
//! let lead = FnEnsemble::new("Pb", 3, |_, _, _, m| [1.2, 1.3, 1.1][m], Hessian)?;
//! let sample = RatioEngine::new(&lead, &proton, 21).sample(0.01, 10.0)?;
//!
//! assert!((sample.central - 1.2).abs() < 1e-12);
//! assert!((sample.max - 1.3 / 0.9).abs() < 1e-12);
//! # Ok::<(), nuclratio::error::Error>(())
//! ```

mod convert;

pub mod config;
pub mod ensemble;
pub mod envelope;
pub mod error;
pub mod pids;
pub mod ratio;
pub mod xgrid;
