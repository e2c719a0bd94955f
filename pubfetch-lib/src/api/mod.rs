use crate::record::{AuthorProfile, PublicationRef, RawPublication};

pub(crate) mod scholar;

/// A blocking HTTP client able to retrieve the textual body of a URL.
pub trait Client {
    /// Retrieves the body of `url` as text.
    ///
    /// # Errors
    ///
    /// An [`Err`] is returned when the request fails, the response has a non success status or
    /// the body is empty.
    fn get_text(&self, url: &str) -> Result<String, Error>;
}

impl Client for reqwest::blocking::Client {
    fn get_text(&self, url: &str) -> Result<String, Error> {
        let resp = self
            .get(url)
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .map_err(|e| Error::wrap(ErrorKind::IO, e))?;
        let text = resp
            .text()
            .map_err(|e| Error::wrap(ErrorKind::Deserialize, e))?;

        if text.is_empty() {
            Err(Error::new(ErrorKind::NoValue, "Response text is empty"))
        } else {
            Ok(text)
        }
    }
}

/// A source of bibliographic data for an author.
pub trait Provider {
    /// Resolves the profile of `author_id` along with the summary of its publications.
    ///
    /// # Errors
    ///
    /// An [`Err`] is returned when the author cannot be resolved or the provider is unreachable.
    fn author_profile(&self, author_id: &str) -> Result<AuthorProfile, Error>;

    /// Fills in the full bibliographic detail of a publication listed on a profile.
    ///
    /// # Errors
    ///
    /// An [`Err`] is returned when the detail of this publication cannot be retrieved.
    fn fill_publication(&self, publication: &PublicationRef) -> Result<RawPublication, Error>;
}

#[cfg(test)]
pub(crate) use test::{
    assert_url, impl_text_producer, MockClient, NetworkErrorProducer, Producer, URL_SINK,
};

use crate::{Error, ErrorKind};
