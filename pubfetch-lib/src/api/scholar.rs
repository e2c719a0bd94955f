use log::{info, trace, warn};
use scraper::{ElementRef, Html, Selector};

use crate::record::{AuthorProfile, Bib, PublicationRef, RawPublication};

use super::{Client, Error, ErrorKind, Provider};

const SCHOLAR_URL: &str = "https://scholar.google.com";
const PAGE_SIZE: usize = 100;
const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";

/// Fields of the citation page that can hold the venue, in order of preference.
const VENUE_FIELDS: [&str; 4] = ["journal", "conference", "book", "source"];

macro_rules! profile_url {
    ($author_id: expr, $cstart: expr) => {
        format!(
            "{SCHOLAR_URL}/citations?hl=en&user={}&cstart={}&pagesize={PAGE_SIZE}",
            $author_id, $cstart
        )
    };
}

macro_rules! citation_page_url {
    ($author_pub_id: expr) => {
        format!(
            "{SCHOLAR_URL}/citations?view_op=view_citation&hl=en&citation_for_view={}",
            $author_pub_id
        )
    };
}

/// Google Scholar as a [`Provider`], scraping the profile and citation pages.
pub struct Scholar<C: Client> {
    client: C,
}

impl Scholar<reqwest::blocking::Client> {
    /// Creates a `Scholar` provider backed by a blocking [`reqwest`] client.
    ///
    /// # Errors
    ///
    /// An [`Err`] is returned when the HTTP client cannot be initialised.
    pub fn with_default_client() -> Result<Self, Error> {
        reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map(Self::new)
            .map_err(|e| Error::wrap_with(ErrorKind::IO, e, "Cannot build the HTTP client"))
    }
}

impl<C: Client> Scholar<C> {
    /// Creates a `Scholar` provider which makes its requests through `client`.
    pub const fn new(client: C) -> Self {
        Self { client }
    }
}

impl<C: Client> Provider for Scholar<C> {
    fn author_profile(&self, author_id: &str) -> Result<AuthorProfile, Error> {
        info!("Searching for author '{author_id}' using Google Scholar");

        let mut name = None;
        let mut publications = Vec::new();
        let mut cstart = 0;
        let mut previous_first: Option<String> = None;

        // The profile lists at most `PAGE_SIZE` publications per page, a short page is the last.
        loop {
            let html = self
                .client
                .get_text(&profile_url!(author_id, cstart))
                .map_err(|e| {
                    Error::wrap_with(
                        ErrorKind::Provider,
                        e,
                        format!("Cannot retrieve the profile of author '{author_id}'"),
                    )
                })?;

            let page = parse_profile_page(&html).map_err(|e| {
                Error::wrap_with(
                    ErrorKind::Provider,
                    e,
                    format!("Cannot resolve author '{author_id}'"),
                )
            })?;

            let rows = page.publications.len();
            trace!("{rows} publications listed from offset {cstart}");

            let first = page
                .publications
                .first()
                .and_then(|p| p.author_pub_id.clone());
            if first.is_some() && first == previous_first {
                warn!("Offset {cstart} repeats the previous page - stop paging");
                break;
            }
            previous_first = first;

            if name.is_none() {
                name = Some(page.name);
            }
            publications.extend(page.publications);

            if rows < PAGE_SIZE {
                break;
            }
            cstart += rows;
        }

        Ok(AuthorProfile {
            id: author_id.to_owned(),
            name: name.unwrap_or_default(),
            publications,
        })
    }

    fn fill_publication(&self, publication: &PublicationRef) -> Result<RawPublication, Error> {
        let author_pub_id = publication.author_pub_id.as_deref().ok_or_else(|| {
            Error::new(
                ErrorKind::Enrichment,
                format!(
                    "'{}' has no publication identifier",
                    publication.bib.title.as_deref().unwrap_or("Untitled")
                ),
            )
        })?;

        trace!("Filling publication '{author_pub_id}'");

        let html = self
            .client
            .get_text(&citation_page_url!(author_pub_id))
            .map_err(|e| {
                Error::wrap_with(
                    ErrorKind::Enrichment,
                    e,
                    format!("Cannot retrieve publication '{author_pub_id}'"),
                )
            })?;

        let detail = parse_citation_page(&html).map_err(|e| {
            Error::wrap_with(
                ErrorKind::Enrichment,
                e,
                format!("Cannot read publication '{author_pub_id}'"),
            )
        })?;

        Ok(RawPublication {
            author_pub_id: Some(author_pub_id.to_owned()),
            bib: publication.bib.clone().updated_with(detail),
        })
    }
}

struct ProfilePage {
    name: String,
    publications: Vec<PublicationRef>,
}

fn parse_profile_page(html: &str) -> Result<ProfilePage, Error> {
    let name_selector = parse_selector("#gsc_prf_in")?;
    let row_selector = parse_selector("tr.gsc_a_tr")?;
    let title_selector = parse_selector("a.gsc_a_at")?;
    let gray_selector = parse_selector("div.gs_gray")?;
    let year_selector = parse_selector(".gsc_a_y span")?;

    let document = Html::parse_document(html);

    let name = document
        .select(&name_selector)
        .next()
        .map(element_text)
        .ok_or_else(|| Error::new(ErrorKind::NoValue, "No author profile found on the page"))?;

    let publications = document
        .select(&row_selector)
        .filter_map(|row| {
            // rows without a title link are placeholders, e.g. "There are no articles"
            let link = row.select(&title_selector).next()?;
            let author_pub_id = link
                .value()
                .attr("data-href")
                .or_else(|| link.value().attr("href"))
                .and_then(citation_for_view);

            let mut gray = row.select(&gray_selector).map(element_text);

            Some(PublicationRef {
                author_pub_id,
                bib: Bib {
                    title: non_empty(element_text(link)),
                    author: gray.next().and_then(non_empty),
                    venue: gray.next().and_then(non_empty),
                    pub_year: row
                        .select(&year_selector)
                        .next()
                        .map(element_text)
                        .and_then(non_empty),
                },
            })
        })
        .collect();

    Ok(ProfilePage { name, publications })
}

fn parse_citation_page(html: &str) -> Result<Bib, Error> {
    let title_selector = parse_selector("#gsc_oci_title")?;
    let row_selector = parse_selector("#gsc_oci_table .gs_scl")?;
    let field_selector = parse_selector(".gsc_oci_field")?;
    let value_selector = parse_selector(".gsc_oci_value")?;

    let document = Html::parse_document(html);

    let title = document
        .select(&title_selector)
        .next()
        .map(element_text)
        .ok_or_else(|| Error::new(ErrorKind::NoValue, "No citation found on the page"))?;

    let mut bib = Bib {
        title: non_empty(title),
        ..Bib::default()
    };
    let mut venue: Option<(usize, String)> = None;

    for row in document.select(&row_selector) {
        let field = row.select(&field_selector).next().map(element_text);
        let value = row
            .select(&value_selector)
            .next()
            .map(element_text)
            .and_then(non_empty);

        let (Some(field), Some(value)) = (field, value) else {
            continue;
        };
        let field = field.to_lowercase();

        match field.as_str() {
            "authors" | "inventors" => bib.author = non_empty(join_authors(&value)),
            "publication date" => {
                bib.pub_year = value
                    .split('/')
                    .next()
                    .map(str::trim)
                    .map(str::to_owned)
                    .and_then(non_empty);
            }
            other => {
                if let Some(rank) = VENUE_FIELDS.iter().position(|f| *f == other) {
                    if venue.as_ref().map_or(true, |(current, _)| rank < *current) {
                        venue = Some((rank, value));
                    }
                }
            }
        }
    }

    bib.venue = venue.map(|(_, value)| value);
    Ok(bib)
}

fn parse_selector(selector: &str) -> Result<Selector, Error> {
    Selector::parse(selector).map_err(|e| {
        Error::new(
            ErrorKind::Deserialize,
            format!("Invalid selector '{selector}': {e}"),
        )
    })
}

/// Text content of an element with runs of whitespace collapsed to a single space.
fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

fn join_authors(authors: &str) -> String {
    authors
        .split(',')
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .collect::<Vec<_>>()
        .join(" and ")
}

/// Extracts the `citation_for_view` query value from a (possibly relative) citation link.
fn citation_for_view(href: &str) -> Option<String> {
    let url = reqwest::Url::parse(SCHOLAR_URL).ok()?.join(href).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == "citation_for_view")
        .map(|(_, value)| value.into_owned())
        .and_then(non_empty)
}
