#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::perf,
    clippy::style,
    clippy::missing_safety_doc,
    clippy::missing_const_for_fn
)]
#![allow(clippy::as_conversions, clippy::mod_module_files)]

use std::{path::PathBuf, process};

use pubfetch::{Config, Summary, AUTHOR_ID, OUTPUT_FILE};

use clap::Parser;
use eyre::{eyre, Context};
use log::{error, trace};

fn main() {
    if let Err(err) = try_main() {
        eprintln!("{err:#}");
        process::exit(2);
    }
}

fn try_main() -> eyre::Result<()> {
    let Cli {
        author_id,
        output,
        verbosity,
        quiet,
        strict,
    } = Cli::parse();

    setup_errlog(verbosity as usize, quiet)?;

    let config = Config { author_id, output };

    outcome(pubfetch::fetch_publications(config), strict)
}

/// Decides whether a fetch result fails the process.
///
/// Without `strict` a failed fetch is only logged so that it never fails the surrounding build.
fn outcome(result: Result<Summary, pubfetch::Error>, strict: bool) -> eyre::Result<()> {
    match result {
        Ok(summary) => {
            trace!(
                "{} of {} publications written, {} skipped",
                summary.written,
                summary.found,
                summary.skipped
            );
            Ok(())
        }
        // the library error already displays its causes, so it is reported as a single message
        Err(err) if strict => Err(eyre!("Publications were not fetched: {err}")),
        Err(err) => {
            error!("An error occurred: {err}");
            Ok(())
        }
    }
}

fn setup_errlog(verbosity: usize, quiet: bool) -> eyre::Result<()> {
    // if quiet then ignore verbosity but still show errors
    let verbosity = if quiet { 0 } else { verbosity + 2 };

    stderrlog::new()
        .verbosity(verbosity)
        .init()
        .wrap_err("Cannot initialise the logger")
}

#[derive(Parser)]
#[clap(name = "pubfetch")]
#[clap(
    about = "Fetch a researcher's publications from Google Scholar into a JSON file for a static site"
)]
#[clap(version, author)]
struct Cli {
    /// The Google Scholar identifier of the author
    #[clap(long, default_value = AUTHOR_ID)]
    author_id: String,

    /// The JSON file the publications are written to
    #[clap(short, long, parse(from_os_str), default_value = OUTPUT_FILE)]
    output: PathBuf,

    /// How chatty the program is while fetching
    ///
    /// The number of times this flag is used will increase how chatty
    /// the program is.
    #[clap(short, long, parse(from_occurrences))]
    verbosity: u8,

    /// Only errors will be printed to stderr.
    #[clap(short, long)]
    quiet: bool,

    /// Exit with a non-zero status when the publications could not be fetched.
    #[clap(long)]
    strict: bool,
}
