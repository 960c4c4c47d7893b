use super::GlobalConfiguration;
use anyhow::{Context, Result};
use clap::{Args, ValueHint};
use lhapdf::{Pdf, PdfSet};
use nuclratio::config::RunConfig;
use nuclratio::ensemble::{Ensemble, Uncertainty, UncertaintyModel};
use nuclratio::error::{self, DomainError, Error};
use nuclratio::pids;
use nuclratio::ratio::{MissingPolicy, RatioCurve, RatioEngine};
use nuclratio::xgrid::XGrid;
use prettytable::format::{FormatBuilder, LinePosition, LineSeparator};
use prettytable::Table;
use rayon::ThreadPoolBuilder;
use std::cell::RefCell;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt::Display;
use std::fs::File;
use std::io::BufReader;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};
use std::thread;
use tracing::{debug, info};

pub fn create_table() -> Table {
    let mut table = Table::new();
    table.set_format(
        FormatBuilder::new()
            .column_separator(' ')
            .separator(LinePosition::Title, LineSeparator::new('-', '+', ' ', ' '))
            .build(),
    );
    table
}

pub fn parse_flavor(flavor: &str) -> std::result::Result<i32, String> {
    pids::parse_pid(flavor).ok_or_else(|| format!("unknown parton flavour `{flavor}`"))
}

/// An LHAPDF set with all of its members loaded.
pub struct LhapdfEnsemble {
    name: String,
    members: Vec<Mutex<Pdf>>,
    cl: f64,
    error_type: Option<String>,
    x_range: Option<(f64, f64)>,
    q2_range: Option<(f64, f64)>,
}

thread_local! {
    // sets used for the reductions, opened at most once per set and thread
    static PDF_SETS: RefCell<HashMap<String, PdfSet>> = RefCell::new(HashMap::new());
}

fn with_pdf_set<T>(name: &str, f: impl FnOnce(&PdfSet) -> error::Result<T>) -> error::Result<T> {
    PDF_SETS.with(|sets| {
        let mut sets = sets.borrow_mut();
        let set = match sets.entry(name.to_owned()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                entry.insert(PdfSet::new(name).map_err(|err| load_error(name, err))?)
            }
        };

        f(set)
    })
}

fn lock<T>(mutex: &Mutex<T>) -> error::Result<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| Error::General("an LHAPDF object was poisoned by a panic".to_owned()))
}

fn load_error(name: &str, err: impl Display) -> Error {
    Error::Load {
        name: name.to_owned(),
        reason: err.to_string(),
    }
}

fn entry_range(set: &PdfSet, min_key: &str, max_key: &str) -> Option<(f64, f64)> {
    let min = set.entry(min_key)?.trim().parse().ok()?;
    let max = set.entry(max_key)?.trim().parse().ok()?;

    Some((min, max))
}

impl LhapdfEnsemble {
    /// Loads all members of the set with the name or LHAPDF id `setname`. Uncertainties are
    /// computed for the confidence level `cl`, given in per cent.
    pub fn load(setname: &str, cl: f64, cfg: &GlobalConfiguration) -> error::Result<Self> {
        if !cfg.lhapdf_banner {
            lhapdf::set_verbosity(0);
        }

        let name = match setname.parse() {
            Ok(lhaid) => lhapdf::lookup_pdf(lhaid)
                .map(|(name, _)| name)
                .ok_or_else(|| Error::Load {
                    name: setname.to_owned(),
                    reason: format!("no set with LHAPDF id {lhaid} found"),
                })?,
            Err(_) => setname.to_owned(),
        };

        let (mut pdfs, error_type, x_range, q2_range) = with_pdf_set(&name, |set| {
            Ok((
                set.mk_pdfs().map_err(|err| load_error(&name, err))?,
                set.entry("ErrorType").map(|value| value.trim().to_owned()),
                entry_range(set, "XMin", "XMax"),
                entry_range(set, "QMin", "QMax"),
            ))
        })?;
        let q2_range = q2_range.map(|(qmin, qmax)| (qmin * qmin, qmax * qmax));

        if pdfs.is_empty() {
            return Err(Error::Load {
                name,
                reason: "the set has no members".to_owned(),
            });
        }

        if cfg.force_positive {
            for pdf in &mut pdfs {
                pdf.set_force_positive(1);
            }
        }

        debug!(
            set = %name,
            members = pdfs.len(),
            ?error_type,
            ?x_range,
            ?q2_range,
            "loaded LHAPDF set"
        );

        Ok(Self {
            name,
            members: pdfs.into_iter().map(Mutex::new).collect(),
            cl,
            error_type,
            x_range,
            q2_range,
        })
    }

    /// Range of momentum fractions given in the metadata of the set.
    pub const fn x_range(&self) -> Option<(f64, f64)> {
        self.x_range
    }

    /// Range of virtualities in GeV^2 given in the metadata of the set.
    pub const fn q2_range(&self) -> Option<(f64, f64)> {
        self.q2_range
    }

    /// Value of `ErrorType` in the metadata of the set.
    pub fn error_type(&self) -> Option<&str> {
        self.error_type.as_deref()
    }
}

impl UncertaintyModel for LhapdfEnsemble {
    fn reduce(&self, values: &[f64]) -> error::Result<Uncertainty> {
        if values.len() != self.members.len() {
            return Err(Error::General(format!(
                "`{}` expects {} values for its reduction, got {}",
                self.name,
                self.members.len(),
                values.len()
            )));
        }

        let uncertainty = with_pdf_set(&self.name, |set| {
            set.uncertainty(values, self.cl, false)
                .map_err(|err| Error::General(err.to_string()))
        })?;

        Ok(Uncertainty::new(
            uncertainty.central,
            uncertainty.errplus,
            uncertainty.errminus,
        ))
    }
}

impl Ensemble for LhapdfEnsemble {
    fn name(&self) -> &str {
        &self.name
    }

    fn member_count(&self) -> usize {
        self.members.len()
    }

    fn evaluate(&self, pid: i32, x: f64, q2: f64, member: usize) -> error::Result<f64> {
        let Some(pdf) = self.members.get(member) else {
            return Err(DomainError::MemberOutOfRange {
                ensemble: self.name.clone(),
                member,
                count: self.members.len(),
            }
            .at(x, q2));
        };

        let (min, max) = self.x_range.unwrap_or((f64::MIN_POSITIVE, 1.0));

        if !(min..=max).contains(&x) {
            return Err(DomainError::XOutOfRange {
                ensemble: self.name.clone(),
                x,
                min,
                max,
            }
            .at(x, q2));
        }

        if let Some((min, max)) = self.q2_range {
            if !(min..=max).contains(&q2) {
                return Err(DomainError::Q2OutOfRange {
                    ensemble: self.name.clone(),
                    q2,
                    min,
                    max,
                }
                .at(x, q2));
            }
        }

        Ok(lock(pdf)?.xfx_q2(pid, x, q2))
    }
}

/// Options describing a run, shared by the subcommands that compute ratios.
#[derive(Args)]
pub struct RunArgs {
    /// YAML file with the run configuration; the options below override its values.
    #[arg(long, value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,
    /// LHAPDF id or name of the free-proton set [default: CT18Anlo].
    #[arg(long, value_name = "SET")]
    proton: Option<String>,
    /// Nuclear set names, `{}` stands for the nucleus [default: EPPS21nlo_CT18Anlo_{}].
    #[arg(long, value_name = "TEMPLATE")]
    nuclear_template: Option<String>,
    /// Nuclei to compute the ratio for [default: Pb208].
    #[arg(long, num_args = 1, value_delimiter = ',')]
    nuclei: Vec<String>,
    /// PDG id or label of the parton [default: 21].
    #[arg(long, value_parser = parse_flavor)]
    flavor: Option<i32>,
    /// Virtualities in GeV^2 [default: 3,10].
    #[arg(long, num_args = 1, value_delimiter = ',', allow_negative_numbers = true)]
    q2: Vec<f64>,
    /// Number of momentum fractions [default: 50].
    #[arg(long, value_name = "POINTS")]
    x_points: Option<usize>,
    /// Smallest momentum fraction [default: 1e-4].
    #[arg(long, value_name = "MIN", allow_negative_numbers = true)]
    x_min: Option<f64>,
    /// Largest momentum fraction [default: 1].
    #[arg(long, value_name = "MAX", allow_negative_numbers = true)]
    x_max: Option<f64>,
    /// Confidence level in per cent [default: 68.26894921370858].
    #[arg(long)]
    cl: Option<f64>,
    /// Mark points where the ratio is undefined as missing instead of failing.
    #[arg(long)]
    skip_invalid: bool,
    /// Number of threads to utilize.
    #[arg(default_value_t = thread::available_parallelism().map_or(1, NonZeroUsize::get), long)]
    threads: usize,
}

impl RunArgs {
    /// Merges the configuration file, the defaults and the command-line options and validates
    /// the result.
    pub fn run_config(&self) -> Result<RunConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let file = File::open(path)
                    .with_context(|| format!("could not open `{}`", path.display()))?;
                RunConfig::from_reader(BufReader::new(file))
                    .with_context(|| format!("could not read `{}`", path.display()))?
            }
            None => RunConfig::default(),
        };

        if let Some(proton) = &self.proton {
            config.proton.clone_from(proton);
        }
        if let Some(template) = &self.nuclear_template {
            config.nuclear_template.clone_from(template);
        }
        if !self.nuclei.is_empty() {
            config.nuclei.clone_from(&self.nuclei);
        }
        if let Some(flavor) = self.flavor {
            config.flavor = flavor;
        }
        if !self.q2.is_empty() {
            config.q2.clone_from(&self.q2);
        }
        config.xgrid = XGrid::new(
            self.x_points.unwrap_or(config.xgrid.points),
            self.x_min.unwrap_or(config.xgrid.min),
            self.x_max.unwrap_or(config.xgrid.max),
        );
        if let Some(cl) = self.cl {
            config.cl = cl;
        }
        if self.skip_invalid {
            config.missing = MissingPolicy::Skip;
        }

        config.validate()?;

        Ok(config)
    }

    /// Sets up the global thread pool and computes the ratios for all nuclei.
    pub fn compute(&self, cfg: &GlobalConfiguration) -> Result<(RunConfig, Vec<NucleusRatios>)> {
        let config = self.run_config()?;

        ThreadPoolBuilder::new()
            .num_threads(self.threads)
            .build_global()?;

        let ratios = compute_ratios(&config, cfg)?;

        Ok((config, ratios))
    }
}

/// All curves of a single nucleus.
pub struct NucleusRatios {
    pub nucleus: String,
    pub nuclear_set: String,
    pub curves: Vec<RatioCurve>,
}

pub fn compute_ratios(
    config: &RunConfig,
    cfg: &GlobalConfiguration,
) -> Result<Vec<NucleusRatios>> {
    let xgrid = config.xgrid.nodes()?;
    let proton = LhapdfEnsemble::load(&config.proton, config.cl, cfg)?;

    config
        .nuclei
        .iter()
        .map(|nucleus| -> Result<NucleusRatios> {
            let nuclear_set = config.nuclear_set(nucleus);
            let nuclear = LhapdfEnsemble::load(&nuclear_set, config.cl, cfg)?;

            info!(
                %nucleus,
                %nuclear_set,
                proton = %config.proton,
                "computing ratios"
            );

            let curves = RatioEngine::new(&nuclear, &proton, config.flavor)
                .with_policy(config.missing)
                .curves(&config.q2, &xgrid)
                .with_context(|| format!("computing the ratio for `{nucleus}` failed"))?;

            Ok(NucleusRatios {
                nucleus: nucleus.clone(),
                nuclear_set,
                curves,
            })
        })
        .collect()
}
