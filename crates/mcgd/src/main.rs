use camino::Utf8PathBuf;
use clap::builder::{styling::AnsiColor, Styles};
use clap::ColorChoice;
use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use commands::{build_generated_data, print_latest, BuildArgs};
use miette::Result;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;
mod errors;
mod utils;

/// Process status of a failed run.
const FAILURE_CODE: u8 = 255;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the generated data and listings of a version
    Build {
        /// Target version: an id, r/release for the latest release, s/snapshot for the latest snapshot
        #[arg(short, long)]
        version: Option<String>,

        /// Run without any prompt; requires --version or --manifest-json
        #[arg(short, long)]
        quiet: bool,

        /// Replace an existing output directory
        #[arg(short = 'f', long)]
        overwrite: bool,

        /// Pack the result into <id>.zip inside the output
        #[arg(short, long, conflicts_with = "no_zip")]
        zip: bool,

        /// Do not pack the result, and do not ask
        #[arg(long)]
        no_zip: bool,

        /// Output directory
        #[arg(short, long)]
        output: Option<Utf8PathBuf>,

        /// Local version descriptor to build instead of a catalog version
        #[arg(long)]
        manifest_json: Option<Utf8PathBuf>,
    },
    /// Print the latest release and snapshot
    Latest,
}

fn parse_args() -> Args {
    // Configure colored/styled help output
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default())
        .placeholder(AnsiColor::Blue.on_default());

    let matches = Args::command()
        .styles(styles)
        .color(ColorChoice::Auto)
        .get_matches();

    Args::from_arg_matches(&matches).unwrap_or_else(|err| err.exit())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Build {
            version,
            quiet,
            overwrite,
            zip,
            no_zip,
            output,
            manifest_json,
        } => build_generated_data(BuildArgs {
            version,
            quiet,
            overwrite,
            zip: match (zip, no_zip) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            },
            output,
            manifest_json,
        }),
        Commands::Latest => print_latest(),
    }
}

/// Report a failure on stderr and map the outcome to a process status.
fn exit_status(result: Result<()>) -> u8 {
    match result {
        Ok(()) => 0,
        Err(report) => {
            eprintln!("{report:?}");
            FAILURE_CODE
        }
    }
}

fn main() -> ExitCode {
    init_tracing();

    let args = parse_args();
    ExitCode::from(exit_status(run(args.command)))
}
