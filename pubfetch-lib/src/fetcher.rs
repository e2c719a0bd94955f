use std::path::PathBuf;

use log::{info, warn};

use crate::{
    api::Provider,
    file,
    record::{self, AuthorProfile, PublicationRecord, PublicationRef, RawPublication},
    Config, Error, ErrorKind,
};

/// Number of characters of a title shown in progress logs.
const LOG_TITLE_LEN: usize = 30;

/// Outcome of a successful [`Fetcher::run`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Summary {
    /// Publications listed on the author's profile.
    pub found: usize,
    /// Publications written to the output file.
    pub written: usize,
    /// Publications skipped because their detail could not be retrieved.
    pub skipped: usize,
    /// Path of the output file.
    pub output: PathBuf,
}

/// Fetches the publications of an author from a [`Provider`] and writes them to the output file.
pub struct Fetcher<P: Provider> {
    provider: P,
    config: Config,
}

impl<P: Provider> Fetcher<P> {
    /// Creates a `Fetcher` for the author and output file of `config`.
    pub const fn new(provider: P, config: Config) -> Self {
        Self { provider, config }
    }

    /// Resolves the author's profile with the summary of each publication.
    ///
    /// # Errors
    ///
    /// An [`Err`] of [`ErrorKind::Provider`] is returned when the author cannot be resolved or the
    /// provider is unreachable.
    pub fn fetch_author_publication_list(&self) -> Result<AuthorProfile, Error> {
        info!(
            "Fetching publications for author ID: {}",
            self.config.author_id
        );
        self.provider
            .author_profile(&self.config.author_id)
            .map_err(|e| into_kind(ErrorKind::Provider, e))
    }

    /// Retrieves the full detail of a single publication.
    ///
    /// # Errors
    ///
    /// An [`Err`] of [`ErrorKind::Enrichment`] is returned when the detail cannot be retrieved.
    pub fn enrich_publication(&self, publication: &PublicationRef) -> Result<RawPublication, Error> {
        self.provider
            .fill_publication(publication)
            .map_err(|e| into_kind(ErrorKind::Enrichment, e))
    }

    /// Runs the whole pipeline once.
    ///
    /// Publications whose detail cannot be retrieved are logged and left out, the remaining
    /// publications are sorted newest first and written to the output file.
    ///
    /// # Errors
    ///
    /// An [`Err`] of [`ErrorKind::Provider`] is returned when the author cannot be resolved, in
    /// which case the output file is left untouched.
    /// An [`Err`] of [`ErrorKind::IO`] is returned when the output file cannot be written.
    pub fn run(&self) -> Result<Summary, Error> {
        let profile = self.fetch_author_publication_list()?;
        let found = profile.publications.len();
        info!("Found {found} publications for {}", profile.name);

        let mut records = profile
            .publications
            .iter()
            .filter_map(|publication| match self.enrich_publication(publication) {
                Ok(raw) => {
                    let record = record::normalize(raw, &self.config.author_id);
                    info!("Processed: {}...", truncate_title(&record.title));
                    Some(record)
                }
                Err(err) => {
                    warn!("Error processing publication: {err}");
                    None
                }
            })
            .collect::<Vec<PublicationRecord>>();

        record::sort_descending_by_year(&mut records);
        file::persist(&records, &self.config.output)?;

        info!(
            "Successfully saved {} publications to {}",
            records.len(),
            self.config.output.display()
        );

        Ok(Summary {
            found,
            written: records.len(),
            skipped: found - records.len(),
            output: self.config.output.clone(),
        })
    }
}

fn into_kind(kind: ErrorKind, err: Error) -> Error {
    if err.kind() == kind {
        err
    } else {
        Error::wrap(kind, err)
    }
}

fn truncate_title(title: &str) -> String {
    title.chars().take(LOG_TITLE_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Bib;

    use assert_fs::{
        fixture::{FileWriteStr, PathChild},
        TempDir,
    };

    const AUTHOR_ID: &str = "uZXXYEIAAAAJ";

    /// A provider serving a fixed profile, failing the detail of the publications in `failing`.
    #[derive(Default)]
    struct FakeProvider {
        unreachable: bool,
        publications: Vec<PublicationRef>,
        failing: Vec<String>,
    }

    impl Provider for FakeProvider {
        fn author_profile(&self, author_id: &str) -> Result<AuthorProfile, Error> {
            if self.unreachable {
                return Err(Error::new(ErrorKind::IO, "Network error"));
            }
            Ok(AuthorProfile {
                id: author_id.to_owned(),
                name: "Test Author".to_owned(),
                publications: self.publications.clone(),
            })
        }

        fn fill_publication(&self, publication: &PublicationRef) -> Result<RawPublication, Error> {
            let id = publication.author_pub_id.as_deref().unwrap_or_default();
            if self.failing.iter().any(|f| f == id) {
                Err(Error::new(ErrorKind::NoValue, "No citation found on the page"))
            } else {
                Ok(RawPublication::from(publication.clone()))
            }
        }
    }

    fn publication(id: &str, title: &str, year: &str) -> PublicationRef {
        PublicationRef {
            author_pub_id: Some(format!("{AUTHOR_ID}:{id}")),
            bib: Bib {
                title: Some(title.to_owned()),
                author: Some("A Smith".to_owned()),
                pub_year: Some(year.to_owned()),
                venue: None,
            },
        }
    }

    fn fetcher(provider: FakeProvider, dir: &TempDir) -> Fetcher<FakeProvider> {
        let config = Config {
            author_id: AUTHOR_ID.to_owned(),
            output: dir.child("public").child("publications.json").path().to_path_buf(),
        };
        Fetcher::new(provider, config)
    }

    #[test]
    fn publications_are_written_newest_first() {
        let dir = TempDir::new().expect("Cannot create temp directory for test");
        let provider = FakeProvider {
            publications: vec![
                publication("old", "Older paper", "2020"),
                publication("new", "Newer paper", "2022"),
            ],
            ..FakeProvider::default()
        };
        let fetcher = fetcher(provider, &dir);

        let summary = fetcher.run().unwrap();

        assert_eq!(2, summary.found);
        assert_eq!(2, summary.written);
        assert_eq!(0, summary.skipped);

        let records = file::read_publications(&summary.output).unwrap();
        let years = records
            .iter()
            .map(|r| r.publication_year.as_str())
            .collect::<Vec<_>>();
        assert_eq!(vec!["2022", "2020"], years);
        assert_eq!(
            "https://scholar.google.com/citations?view_op=view_citation&hl=en&user=uZXXYEIAAAAJ&citation_for_view=uZXXYEIAAAAJ:new",
            records[0].link
        );
    }

    #[test]
    fn failed_enrichment_skips_only_that_publication() {
        let dir = TempDir::new().expect("Cannot create temp directory for test");
        let provider = FakeProvider {
            publications: vec![
                publication("ok", "Good paper", "2020"),
                publication("bad", "Blocked paper", "2022"),
            ],
            failing: vec!["uZXXYEIAAAAJ:bad".to_owned()],
            ..FakeProvider::default()
        };
        let fetcher = fetcher(provider, &dir);

        let summary = fetcher.run().unwrap();

        assert_eq!(2, summary.found);
        assert_eq!(1, summary.written);
        assert_eq!(1, summary.skipped);

        let records = file::read_publications(&summary.output).unwrap();
        assert_eq!(1, records.len());
        assert_eq!("Good paper", records[0].title);
    }

    #[test]
    fn unresolved_author_writes_nothing() {
        let dir = TempDir::new().expect("Cannot create temp directory for test");
        let provider = FakeProvider {
            unreachable: true,
            publications: vec![publication("ok", "Good paper", "2020")],
            ..FakeProvider::default()
        };
        let fetcher = fetcher(provider, &dir);

        let err = fetcher.run().unwrap_err();

        assert_eq!(ErrorKind::Provider, err.kind());
        assert!(!dir.child("public").path().exists());
    }

    #[test]
    fn unresolved_author_keeps_previous_output() {
        let dir = TempDir::new().expect("Cannot create temp directory for test");
        let previous = dir.child("public").child("publications.json");
        std::fs::create_dir_all(dir.child("public").path()).unwrap();
        previous.write_str("[]").unwrap();

        let provider = FakeProvider {
            unreachable: true,
            ..FakeProvider::default()
        };
        let fetcher = fetcher(provider, &dir);

        assert!(fetcher.run().is_err());
        assert_eq!("[]", std::fs::read_to_string(previous.path()).unwrap());
    }

    #[test]
    fn author_without_publications_writes_empty_array() {
        let dir = TempDir::new().expect("Cannot create temp directory for test");
        let fetcher = fetcher(FakeProvider::default(), &dir);

        let summary = fetcher.run().unwrap();

        assert_eq!(0, summary.written);
        assert!(file::read_publications(&summary.output).unwrap().is_empty());
    }

    #[test]
    fn provider_errors_are_reported_with_pipeline_kinds() {
        let dir = TempDir::new().expect("Cannot create temp directory for test");
        let provider = FakeProvider {
            failing: vec!["uZXXYEIAAAAJ:bad".to_owned()],
            ..FakeProvider::default()
        };
        let fetcher = fetcher(provider, &dir);

        let err = fetcher
            .enrich_publication(&publication("bad", "Blocked paper", "2022"))
            .unwrap_err();
        assert_eq!(ErrorKind::Enrichment, err.kind());
        assert!(err.to_string().contains("No citation found"), "{err}");
    }

    #[test]
    fn output_never_exceeds_listed_publications() {
        let ids = ["a", "b", "c", "d", "e"];

        // fail every subset of the first three publications
        for mask in 0..8_u8 {
            let dir = TempDir::new().expect("Cannot create temp directory for test");
            let failing = ids
                .iter()
                .take(3)
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, id)| format!("{AUTHOR_ID}:{id}"))
                .collect::<Vec<_>>();
            let provider = FakeProvider {
                publications: ids
                    .iter()
                    .map(|id| publication(id, id, "2000"))
                    .collect(),
                failing,
                ..FakeProvider::default()
            };

            let summary = fetcher(provider, &dir).run().unwrap();

            assert_eq!(ids.len(), summary.found);
            assert_eq!(mask.count_ones() as usize, summary.skipped);
            assert_eq!(summary.found, summary.written + summary.skipped);
        }
    }

    #[test]
    fn long_titles_are_truncated_in_logs() {
        assert_eq!(
            "Über eine sehr lange Überschri",
            truncate_title("Über eine sehr lange Überschrift für Tests")
        );
        assert_eq!("Short", truncate_title("Short"));
    }
}
