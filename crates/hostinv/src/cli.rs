//! Command line arguments, banner and usage text

use std::path::PathBuf;

use clap::Parser;
use hostinv_report::{InfoLevel, OutputFormat, Palette};
use tracing::warn;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// hostinv command line
///
/// clap's generated help and version flags are disabled so that `-h` can
/// select the hardware report.
#[derive(Parser, Debug, Default)]
#[command(name = "hostinv", disable_help_flag = true, disable_version_flag = true)]
pub struct Cli {
    /// Display system information
    #[arg(short = 's', long)]
    pub system: bool,

    /// Display hardware information
    #[arg(short = 'h', long)]
    pub hardware: bool,

    /// Display installed packages
    #[arg(short = 'p', long)]
    pub packages: bool,

    /// Collect system logs (not supported)
    #[arg(short = 'l', long)]
    pub logs: bool,

    /// Display all information
    #[arg(short = 'a', long)]
    pub all: bool,

    /// List available package updates
    #[arg(short = 'u', long)]
    pub updates: bool,

    /// Write the report to FILE
    #[arg(short = 'o', long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (text, json, csv); anything else falls back to text
    #[arg(short = 'f', long, value_name = "FORMAT", default_value = "text")]
    pub format: String,

    /// Detailed system information
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// No banner and no text output
    #[arg(short = 'q', long)]
    pub quiet: bool,

    #[arg(long)]
    pub version: bool,

    #[arg(long)]
    pub help: bool,
}

/// Reports requested on the command line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    pub system: bool,
    pub hardware: bool,
    pub packages: bool,
    pub logs: bool,
    pub updates: bool,
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        !(self.system || self.hardware || self.packages || self.logs || self.updates)
    }
}

impl Cli {
    /// Selected reports with `--all` expanded
    pub fn selection(&self) -> Selection {
        Selection {
            system: self.system || self.all,
            hardware: self.hardware || self.all,
            packages: self.packages || self.all,
            logs: self.logs || self.all,
            updates: self.updates,
        }
    }

    /// Requested output format, text when the name is not recognised
    pub fn output_format(&self) -> OutputFormat {
        self.format.parse().unwrap_or_else(|e| {
            warn!(error = %e, "falling back to text output");
            OutputFormat::Text
        })
    }

    pub fn info_level(&self) -> InfoLevel {
        if self.verbose {
            InfoLevel::Detailed
        } else {
            InfoLevel::Basic
        }
    }
}

pub fn usage() -> String {
    format!(
        "\
hostinv - Linux host inventory tool
Version: {VERSION}

Usage: hostinv [OPTIONS]

Options:
  -s, --system        Display system information
  -h, --hardware      Display hardware information
  -p, --packages      Display installed packages
  -u, --updates       Display available package updates
  -l, --logs          Collect system logs (not supported)
  -a, --all           Display all information
  -o, --output FILE   Export output to file
  -f, --format FORMAT Output format (text, json, csv)
  -v, --verbose       Verbose output
  -q, --quiet         Quiet mode (minimal output)
  --version           Display version information
  --help              Display this help message

Examples:
  hostinv --system --hardware
  hostinv --packages --format json
  hostinv --all --format csv --output report.csv
"
    )
}

pub fn banner(palette: &Palette) -> String {
    let art = r"
 _               _   _
| |__   ___  ___| |_(_)_ __ __   __
| '_ \ / _ \/ __| __| | '_ \\ \ / /
| | | | (_) \__ \ |_| | | | |\ V /
|_| |_|\___/|___/\__|_|_| |_| \_/
";
    palette.title(art)
}
