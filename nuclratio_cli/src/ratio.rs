use super::helpers::{self, NucleusRatios, RunArgs};
use super::{GlobalConfiguration, Subcommand};
use anyhow::Result;
use clap::Parser;
use nuclratio::config::RunConfig;
use nuclratio::pids;
use prettytable::{cell, Row};
use std::process::ExitCode;

/// Computes the nuclear modification ratio and prints it as a table.
#[derive(Parser)]
pub struct Opts {
    #[command(flatten)]
    run: RunArgs,
    /// Set the number of fractional digits shown for absolute numbers.
    #[arg(default_value_t = 7, long, value_name = "ABS")]
    digits_abs: usize,
    /// Set the number of fractional digits shown for relative numbers.
    #[arg(default_value_t = 2, long, value_name = "REL")]
    digits_rel: usize,
}

/// Deviation of `bound` from `central` in per cent. It is undefined for a vanishing ratio.
fn relative_band(bound: f64, central: f64, digits: usize) -> String {
    let band = 100.0 * (bound / central - 1.0);

    if band.is_finite() {
        format!("{band:.digits$}")
    } else {
        "undefined".to_owned()
    }
}

impl Opts {
    fn print(&self, config: &RunConfig, ratios: &NucleusRatios) {
        for curve in &ratios.curves {
            println!(
                "{} ({}/{}), flavour = {}, Q2 = {} GeV^2",
                ratios.nucleus,
                ratios.nuclear_set,
                config.proton,
                pids::flavor_label(config.flavor),
                curve.q2()
            );

            let mut title = Row::empty();
            title.add_cell(cell!(c->"i"));
            title.add_cell(cell!(c->"x"));
            title.add_cell(cell!(c->"R"));
            title.add_cell(cell!(c->"R min"));
            title.add_cell(cell!(c->"R max"));
            title.add_cell(cell!(c->"band\n[%]").with_hspan(2));

            let mut table = helpers::create_table();
            table.set_titles(title);

            for (index, point) in curve.points().iter().enumerate() {
                let row = table.add_empty_row();
                row.add_cell(cell!(r->format!("{index}")));
                row.add_cell(cell!(r->format!("{:.*e}", self.digits_abs, point.x)));

                if let Some(sample) = point.sample {
                    row.add_cell(cell!(r->format!("{:.*e}", self.digits_abs, sample.central)));
                    row.add_cell(cell!(r->format!("{:.*e}", self.digits_abs, sample.min)));
                    row.add_cell(cell!(r->format!("{:.*e}", self.digits_abs, sample.max)));
                    row.add_cell(cell!(r->relative_band(sample.min, sample.central, self.digits_rel)));
                    row.add_cell(cell!(r->relative_band(sample.max, sample.central, self.digits_rel)));
                } else {
                    for _ in 0..5 {
                        row.add_cell(cell!(r->"missing"));
                    }
                }
            }

            table.printstd();
            println!();
        }
    }
}

impl Subcommand for Opts {
    fn run(&self, cfg: &GlobalConfiguration) -> Result<ExitCode> {
        let (config, ratios) = self.run.compute(cfg)?;

        for nucleus in &ratios {
            self.print(&config, nucleus);
        }

        Ok(ExitCode::SUCCESS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_band_of_vanishing_ratio() {
        assert_eq!(relative_band(1.1, 1.0, 2), "10.00");
        assert_eq!(relative_band(0.9, 1.0, 1), "-10.0");
        assert_eq!(relative_band(0.5, 0.0, 2), "undefined");
        assert_eq!(relative_band(0.0, 0.0, 2), "undefined");
    }
}
