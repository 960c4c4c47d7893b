use super::helpers::{self, LhapdfEnsemble};
use super::{GlobalConfiguration, Subcommand};
use anyhow::Result;
use clap::Parser;
use nuclratio::config;
use nuclratio::ensemble::Ensemble;
use prettytable::{cell, row};
use std::process::ExitCode;

/// Shows the metadata of an LHAPDF set relevant for the ratio.
#[derive(Parser)]
pub struct Opts {
    /// LHAPDF id or name of the set.
    #[arg(value_name = "SET")]
    set: String,
    /// Confidence level in per cent.
    #[arg(default_value_t = config::CL_1_SIGMA, long)]
    cl: f64,
}

fn format_range(range: Option<(f64, f64)>) -> String {
    range.map_or_else(
        || "unknown".to_owned(),
        |(min, max)| format!("{min:e} - {max:e}"),
    )
}

impl Subcommand for Opts {
    fn run(&self, cfg: &GlobalConfiguration) -> Result<ExitCode> {
        let ensemble = LhapdfEnsemble::load(&self.set, self.cl, cfg)?;

        let mut table = helpers::create_table();
        table.set_titles(row![c => "key", "value"]);

        table.add_row(row!["name", ensemble.name()]);
        table.add_row(row!["members", r->ensemble.member_count()]);
        table.add_row(row!["error type", ensemble.error_type().unwrap_or("unknown")]);
        table.add_row(row!["x range", format_range(ensemble.x_range())]);
        table.add_row(row!["Q2 range [GeV^2]", format_range(ensemble.q2_range())]);

        table.printstd();

        Ok(ExitCode::SUCCESS)
    }
}
