//! Configuration of a run: which ensembles, which parton and which kinematics.

use super::error::{Error, Result};
use super::ratio::MissingPolicy;
use super::xgrid::XGrid;
use serde::{Deserialize, Serialize};
use std::io::Read;

/// Placeholder in [`RunConfig::nuclear_template`] that is replaced by the nucleus.
pub const NUCLEUS_PLACEHOLDER: &str = "{}";

/// Confidence level corresponding to one standard deviation, in per cent.
pub const CL_1_SIGMA: f64 = 68.268_949_213_708_58;

/// Everything needed to compute the ratios for a list of nuclei.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct RunConfig {
    /// Name or LHAPDF id of the free-proton set.
    pub proton: String,
    /// Name of the nuclear sets, with [`NUCLEUS_PLACEHOLDER`] standing for the nucleus.
    pub nuclear_template: String,
    /// Nuclei, for example `Pb208`.
    pub nuclei: Vec<String>,
    /// PDG id of the parton.
    pub flavor: i32,
    /// Virtualities in GeV^2.
    pub q2: Vec<f64>,
    /// Grid of momentum fractions.
    pub xgrid: XGrid,
    /// Confidence level in per cent passed to the uncertainty reduction of the ensembles.
    pub cl: f64,
    /// What to do with points where the ratio is undefined.
    pub missing: MissingPolicy,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            proton: "CT18Anlo".to_owned(),
            nuclear_template: format!("EPPS21nlo_CT18Anlo_{NUCLEUS_PLACEHOLDER}"),
            nuclei: vec!["Pb208".to_owned()],
            flavor: 21,
            q2: vec![3.0, 10.0],
            xgrid: XGrid::default(),
            cl: CL_1_SIGMA,
            missing: MissingPolicy::Abort,
        }
    }
}

impl RunConfig {
    /// Reads a configuration in YAML format. Keys that are not given take their default values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the input is not valid YAML or contains unknown keys.
    /// The returned configuration is not validated.
    pub fn from_reader(reader: impl Read) -> Result<Self> {
        serde_yaml::from_reader(reader).map_err(|err| Error::Configuration(err.to_string()))
    }

    /// Checks the whole configuration, before any ensemble is loaded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.proton.is_empty() {
            return Err(Error::Configuration("no proton set given".to_owned()));
        }

        if !self.nuclear_template.contains(NUCLEUS_PLACEHOLDER) {
            return Err(Error::Configuration(format!(
                "the nuclear set template `{}` does not contain `{NUCLEUS_PLACEHOLDER}`",
                self.nuclear_template
            )));
        }

        if self.nuclei.is_empty() {
            return Err(Error::Configuration("no nuclei given".to_owned()));
        }

        if let Some(nucleus) = self.nuclei.iter().find(|nucleus| nucleus.is_empty()) {
            return Err(Error::Configuration(format!(
                "invalid nucleus name `{nucleus}`"
            )));
        }

        if self.q2.is_empty() {
            return Err(Error::Configuration("no Q2 values given".to_owned()));
        }

        if let Some(q2) = self.q2.iter().find(|q2| !(q2.is_finite() && **q2 > 0.0)) {
            return Err(Error::Configuration(format!(
                "Q2 values must be positive, got {q2}"
            )));
        }

        if !(self.cl > 0.0 && self.cl < 100.0) {
            return Err(Error::Configuration(format!(
                "the confidence level must lie in (0, 100), got {}",
                self.cl
            )));
        }

        self.xgrid.validate()
    }

    /// Name of the nuclear set for `nucleus`.
    #[must_use]
    pub fn nuclear_set(&self, nucleus: &str) -> String {
        self.nuclear_template.replace(NUCLEUS_PLACEHOLDER, nucleus)
    }
}
