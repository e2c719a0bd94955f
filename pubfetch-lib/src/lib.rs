#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::perf,
    clippy::style,
    clippy::missing_safety_doc,
    clippy::missing_const_for_fn
)]
#![warn(missing_docs, rust_2018_idioms)]
#![allow(clippy::module_name_repetitions)]
#![doc = include_str!("../README.md")]

use std::path::PathBuf;

mod api;
mod error;
mod fetcher;
pub mod file;
pub mod record;

pub use api::{scholar::Scholar, Client, Provider};
pub use error::{Error, ErrorKind};
pub use fetcher::{Fetcher, Summary};

use log::trace;

/// Google Scholar identifier of the author whose publications are fetched by default.
pub const AUTHOR_ID: &str = "uZXXYEIAAAAJ";

/// Path the publications are written to by default.
pub const OUTPUT_FILE: &str = "public/publications.json";

/// Which author to fetch and where to write their publications.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Google Scholar identifier of the author.
    pub author_id: String,
    /// Path of the JSON file the publications are written to.
    pub output: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            author_id: AUTHOR_ID.to_owned(),
            output: PathBuf::from(OUTPUT_FILE),
        }
    }
}

/// Fetches the publications of the author in `config` from Google Scholar and writes them to
/// the output file.
///
/// # Errors
///
/// An [`Err`] of [`ErrorKind::Provider`] is returned when the author cannot be resolved or Google
/// Scholar cannot be reached, the output file is not touched in that case.
/// An [`Err`] of [`ErrorKind::IO`] is returned when the output file cannot be written.
pub fn fetch_publications(config: Config) -> Result<Summary, Error> {
    trace!(
        "Fetch publications of '{}' into '{}'",
        config.author_id,
        config.output.display()
    );
    let scholar =
        Scholar::with_default_client().map_err(|e| Error::wrap(ErrorKind::Provider, e))?;
    Fetcher::new(scholar, config).run()
}
