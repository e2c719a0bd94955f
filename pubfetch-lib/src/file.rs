//! Filesystem operations on the publications file.
//!
//! The publications file is a JSON array of [`PublicationRecord`]s, indented with two spaces and
//! with non-ASCII characters written as is.

use std::{
    fs::{self, File},
    io::{BufReader, BufWriter, Write},
    path::Path,
};

use crate::{record::PublicationRecord, Error, ErrorKind};

/// Writes `records` to the file at `path`, replacing anything already there.
///
/// Missing parent directories of `path` are created first.
///
/// # Errors
/// This function will return an error if the parent directory cannot be created or the user
/// lacks permissions to write the file.
///
/// # Examples
/// ```no_run
/// fn main() -> Result<(), pubfetch::Error> {
///     pubfetch::file::persist(&[], "public/publications.json")?;
///     Ok(())
/// }
/// ```
pub fn persist<P: AsRef<Path>>(records: &[PublicationRecord], path: P) -> Result<(), Error> {
    let path = path.as_ref();

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            Error::wrap_with(
                ErrorKind::IO,
                e,
                format!("Failed to create the '{}' directory", parent.display()),
            )
        })?;
    }

    let file = File::create(path).map_err(|e| {
        Error::wrap_with(
            ErrorKind::IO,
            e,
            format!("Failed to create the '{}' file for writing", path.display()),
        )
    })?;

    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, records)
        .map_err(|e| Error::wrap_with(ErrorKind::IO, e, "Cannot write publications to file"))?;
    log::trace!("{} publications written to {}", records.len(), path.display());
    writer
        .flush()
        .map_err(|e| Error::wrap_with(ErrorKind::IO, e, "Cannot write publications to file"))
}

/// Reads the publications previously written to the file at `path`.
///
/// # Errors
/// This function will return an error if the file cannot be opened or its content is not a
/// JSON array of publications.
pub fn read_publications<P: AsRef<Path>>(path: P) -> Result<Vec<PublicationRecord>, Error> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        Error::wrap_with(
            ErrorKind::IO,
            e,
            format!("Failed to open the '{}' file for reading", path.display()),
        )
    })?;

    serde_json::from_reader(BufReader::new(file)).map_err(|e| {
        Error::wrap_with(
            ErrorKind::Deserialize,
            e,
            format!("Cannot read publications from '{}'", path.display()),
        )
    })
}
