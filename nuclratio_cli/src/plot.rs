use super::helpers::{NucleusRatios, RunArgs};
use super::{GlobalConfiguration, Subcommand};
use anyhow::Result;
use clap::Parser;
use itertools::Itertools;
use nuclratio::config::RunConfig;
use nuclratio::ratio::RatioCurve;
use std::process::ExitCode;

const COLORS: [&str; 6] = ["crimson", "navy", "darkgreen", "darkorange", "purple", "teal"];

/// Creates a matplotlib script plotting the nuclear modification ratios.
#[derive(Parser)]
pub struct Opts {
    #[command(flatten)]
    run: RunArgs,
}

fn map_format_e_join(values: impl Iterator<Item = Option<f64>>) -> String {
    values
        .map(|value| value.map_or_else(|| "np.nan".to_owned(), |value| format!("{value:e}")))
        .join(", ")
}

fn format_curves(curves: &[RatioCurve]) -> String {
    let mut result = String::new();

    for (curve, color) in curves.iter().zip(COLORS.iter().cycle()) {
        let points = curve.points();
        let samples = || points.iter().map(|point| point.sample);

        result.push_str(&format!(
            "            (
                {},
                '{}',
                np.array([{}]),
                np.array([{}]),
                np.array([{}]),
                np.array([{}]),
            ),\n",
            curve.q2(),
            color,
            map_format_e_join(points.iter().map(|point| Some(point.x))),
            map_format_e_join(samples().map(|sample| sample.map(|s| s.central))),
            map_format_e_join(samples().map(|sample| sample.map(|s| s.min))),
            map_format_e_join(samples().map(|sample| sample.map(|s| s.max))),
        ));
    }

    result
}

fn format_figures(ratios: &[NucleusRatios]) -> String {
    let mut result = String::new();

    for nucleus in ratios {
        result.push_str(&format!(
            "    {{
        'nucleus': '{}',
        'set': '{}',
        'output': 'R_{}.pdf',
        'curves': [
{}        ],
    }},\n",
            nucleus.nucleus,
            nucleus.nuclear_set,
            nucleus.nucleus,
            format_curves(&nucleus.curves),
        ));
    }

    result
}

fn format_script(config: &RunConfig, ratios: &[NucleusRatios]) -> String {
    format!(
        "#!/usr/bin/env python3

import matplotlib.pyplot as plt
import numpy as np
from matplotlib import gridspec
from matplotlib.backends.backend_pdf import PdfPages

def plot_ratio(axis, figure):
    axis.grid(True, lw=0.5, ls=':', zorder=0)
    axis.tick_params(axis='both', which='both', direction='in', bottom=True, top=True, left=True, right=True)
    axis.set_ylim(0, 2)
    axis.set_xscale('log')
    axis.set_title('Nucleus=' + figure['nucleus'] + ' , flavour=' + FLAVOUR)
    axis.set_xlabel(r'$x$', fontsize=16)
    axis.set_ylabel(r'$R(x,Q^2)$', fontsize=16)

    for q2, color, x, r, rmin, rmax in figure['curves']:
        axis.plot(x, r, color=color, label=rf'$Q^2={{q2}}$ GeV$^2$')
        axis.fill_between(x, rmin, rmax, color=color, alpha=0.2)

    axis.legend(loc='best', title=figure['set'] + ' / ' + PROTON)
    axis.hlines(1, XMIN, XMAX, color='gray', ls='--')

def main():
    for figure in FIGURES:
        with PdfPages(figure['output']) as pdf:
            plt.figure(figsize=(5, 3.8))
            grid = gridspec.GridSpec(1, 1)
            axis = plt.subplot(grid[0])
            plot_ratio(axis, figure)
            pdf.savefig(bbox_inches='tight')
            plt.close()

PROTON = '{proton}'
FLAVOUR = '{flavor}'
XMIN = {xmin:e}
XMAX = {xmax:e}
FIGURES = [
{figures}]

if __name__ == '__main__':
    main()
",
        proton = config.proton,
        flavor = config.flavor,
        xmin = config.xgrid.min,
        xmax = config.xgrid.max,
        figures = format_figures(ratios),
    )
}

impl Subcommand for Opts {
    fn run(&self, cfg: &GlobalConfiguration) -> Result<ExitCode> {
        let (config, ratios) = self.run.compute(cfg)?;

        for nucleus in &ratios {
            for curve in &nucleus.curves {
                if curve.missing() != 0 {
                    tracing::warn!(
                        "{} at Q2 = {} GeV^2: {} points missing, the curve has gaps",
                        nucleus.nucleus,
                        curve.q2(),
                        curve.missing()
                    );
                }
            }
        }

        print!("{}", format_script(&config, &ratios));

        Ok(ExitCode::SUCCESS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nuclratio::ensemble::{FnEnsemble, Hessian};
    use nuclratio::ratio::{MissingPolicy, RatioEngine};

    #[test]
    fn script_contains_all_curves() {
        let config = RunConfig::default();
        let proton =
            FnEnsemble::new("p", 3, |_, _, _, m| [1.0, 1.1, 0.9][m], Hessian).unwrap();
        let lead = FnEnsemble::new("Pb", 3, |_, _, _, m| [1.2, 1.3, 1.1][m], Hessian)
            .unwrap()
            .with_x_range(1e-3, 1.0);
        let curves = RatioEngine::new(&lead, &proton, config.flavor)
            .with_policy(MissingPolicy::Skip)
            .curves(&config.q2, &[1e-4, 1e-2, 1.0])
            .unwrap();
        let ratios = [NucleusRatios {
            nucleus: "Pb208".to_owned(),
            nuclear_set: config.nuclear_set("Pb208"),
            curves,
        }];

        let script = format_script(&config, &ratios);

        assert!(script.starts_with("#!/usr/bin/env python3\n"));
        assert!(script.contains("FLAVOUR = '21'"));
        assert!(script.contains("'output': 'R_Pb208.pdf'"));
        assert!(script.contains("'set': 'EPPS21nlo_CT18Anlo_Pb208'"));
        assert!(script.contains("PROTON = 'CT18Anlo'"));
        assert!(script.contains("title=figure['set'] + ' / ' + PROTON"));
        assert!(script.contains("                3,\n                'crimson',"));
        assert!(script.contains("                10,\n                'navy',"));
        assert!(script.contains("np.array([1e-4, 1e-2, 1e0])"));
        // the first node lies outside of the nuclear set and must show up as a gap
        assert!(script.contains("np.array([np.nan, 1.2e0, 1.2e0])"));
    }
}
