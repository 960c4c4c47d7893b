mod helpers;
mod info;
mod plot;
mod ratio;

use anyhow::Result;
use clap::Parser;
use enum_dispatch::enum_dispatch;
use git_version::git_version;
use std::process::ExitCode;

#[derive(Parser)]
pub struct GlobalConfiguration {
    /// Allow LHAPDF to print banners.
    #[arg(long)]
    pub lhapdf_banner: bool,
    /// Forces negative PDF values to zero.
    #[arg(long)]
    pub force_positive: bool,
}

#[enum_dispatch]
pub trait Subcommand {
    fn run(&self, cfg: &GlobalConfiguration) -> Result<ExitCode>;
}

#[enum_dispatch(Subcommand)]
#[derive(Parser)]
pub enum SubcommandEnum {
    Info(info::Opts),
    Plot(plot::Opts),
    Ratio(ratio::Opts),
}

#[derive(Parser)]
#[command(
    arg_required_else_help = true,
    author,
    about,
    disable_help_subcommand = true,
    name = "nuclratio",
    version = git_version!(
        args = ["--always", "--dirty", "--long", "--tags"],
        cargo_prefix = "",
        fallback = "unknown"
    )
)]
pub struct Opts {
    #[command(flatten)]
    pub configuration: GlobalConfiguration,
    #[command(subcommand)]
    pub subcommand: SubcommandEnum,
}
