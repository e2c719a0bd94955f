//! Publication data model.
//!
//! The provider hands back [`AuthorProfile`]s and [`RawPublication`]s with every bibliographic
//! field optional. [`normalize`] turns a [`RawPublication`] into the fixed [`PublicationRecord`]
//! schema that is written to disk.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

const UNTITLED: &str = "Untitled";
const UNKNOWN_AUTHOR: &str = "Unknown";

macro_rules! citation_url {
    ($author_id: expr, $author_pub_id: expr) => {
        format!(
            "https://scholar.google.com/citations?view_op=view_citation&hl=en&user={}&citation_for_view={}",
            $author_id, $author_pub_id
        )
    };
}

/// Bibliographic fields of a publication as far as the provider knows them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Bib {
    /// Title of the publication.
    pub title: Option<String>,
    /// Authors of the publication joined with `" and "`.
    pub author: Option<String>,
    /// Year of publication.
    pub pub_year: Option<String>,
    /// Journal, conference or other place the publication appeared in.
    pub venue: Option<String>,
}

impl Bib {
    /// Overlays the fields of `detail` on top of `self`, keeping the current value of any field
    /// that `detail` does not have.
    #[must_use]
    pub fn updated_with(self, detail: Self) -> Self {
        Self {
            title: detail.title.or(self.title),
            author: detail.author.or(self.author),
            pub_year: detail.pub_year.or(self.pub_year),
            venue: detail.venue.or(self.venue),
        }
    }
}

/// A researcher's profile with the summary form of each of their publications.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthorProfile {
    /// Provider assigned identifier of the author.
    pub id: String,
    /// Display name of the author.
    pub name: String,
    /// Publications listed on the profile, in the order the provider lists them.
    pub publications: Vec<PublicationRef>,
}

/// Summary form of a publication as listed on an [`AuthorProfile`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PublicationRef {
    /// Provider assigned identifier of the publication, `<author id>:<publication id>`.
    pub author_pub_id: Option<String>,
    /// Summary bibliographic fields.
    pub bib: Bib,
}

/// A publication after its detail has been filled in by the provider.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawPublication {
    /// Provider assigned identifier of the publication.
    pub author_pub_id: Option<String>,
    /// Detailed bibliographic fields.
    pub bib: Bib,
}

impl From<PublicationRef> for RawPublication {
    fn from(publication: PublicationRef) -> Self {
        Self {
            author_pub_id: publication.author_pub_id,
            bib: publication.bib,
        }
    }
}

/// A cleaned publication as written to the output file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PublicationRecord {
    /// Title, `"Untitled"` when unknown.
    pub title: String,
    /// Authors, `"Unknown"` when unknown.
    pub author: String,
    /// Year of publication, empty when unknown.
    pub publication_year: String,
    /// Venue of the publication, empty when unknown.
    pub publication_place: String,
    /// Link to the publication's citation page.
    pub link: String,
}

/// Builds the citation page URL of a publication on the profile of `author_id`.
///
/// An empty `author_pub_id` still produces a well formed URL, with an empty
/// `citation_for_view` value.
#[must_use]
pub fn citation_link(author_id: &str, author_pub_id: &str) -> String {
    citation_url!(author_id, author_pub_id)
}

/// Normalizes a [`RawPublication`] into a [`PublicationRecord`].
///
/// Missing fields fall back to their defaults, this never fails.
#[must_use]
pub fn normalize(raw: RawPublication, author_id: &str) -> PublicationRecord {
    let RawPublication {
        author_pub_id,
        bib:
            Bib {
                title,
                author,
                pub_year,
                venue,
            },
    } = raw;

    PublicationRecord {
        title: title.unwrap_or_else(|| UNTITLED.to_owned()),
        author: author.unwrap_or_else(|| UNKNOWN_AUTHOR.to_owned()),
        publication_year: pub_year.unwrap_or_default(),
        publication_place: venue.unwrap_or_default(),
        link: citation_link(author_id, author_pub_id.as_deref().unwrap_or_default()),
    }
}

/// Sorts records by `publication_year`, newest first.
///
/// Years are compared as strings, so records without a year end up last. The sort is stable:
/// records with equal years keep their relative order.
pub fn sort_descending_by_year(records: &mut [PublicationRecord]) {
    records.sort_by(compare_year_descending);
}

fn compare_year_descending(a: &PublicationRecord, b: &PublicationRecord) -> Ordering {
    b.publication_year.cmp(&a.publication_year)
}
