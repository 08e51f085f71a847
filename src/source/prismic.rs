//! Prismic content-repository source.
//!
//! Queries a Prismic-style REST API (`/api/v2`) for documents of one type
//! and converts them into [`PostSummary`] pages.
//!
//! A first-page query is two requests: the API root is read to find the
//! master ref, then `documents/search` is queried with that ref, a
//! `document.type` predicate and the configured page size.  Every later
//! page is fetched by requesting the `next_page` URL from the previous
//! response verbatim.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

use super::{ContentSource, Cursor, Page, PostSummary};
use crate::error::{Error, Result};

/// A Prismic repository queried over HTTP.
pub struct PrismicSource {
    /// API root, e.g. `https://my-repo.cdn.prismic.io/api/v2`.
    endpoint: Url,
    document_type: String,
    page_size: u32,
    access_token: Option<String>,
    client: reqwest::blocking::Client,
    label: String,
}

// -- response shapes ---------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ApiRoot {
    #[serde(default)]
    refs: Vec<ApiRef>,
}

#[derive(Debug, Deserialize)]
struct ApiRef {
    #[serde(rename = "ref")]
    reference: String,
    #[serde(rename = "isMasterRef", default)]
    is_master_ref: bool,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<Document>,
    next_page: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Document {
    id: String,
    uid: Option<String>,
    first_publication_date: Option<String>,
    #[serde(default)]
    data: PostData,
}

#[derive(Debug, Default, Deserialize)]
struct PostData {
    #[serde(default)]
    title: Value,
    #[serde(default)]
    subtitle: Value,
    #[serde(default)]
    author: Value,
}

impl PrismicSource {
    /// Create a source for documents of `document_type` under `endpoint`.
    ///
    /// `timeout` bounds every request; there is no retry.
    pub fn new(
        endpoint: Url,
        document_type: impl Into<String>,
        page_size: u32,
        access_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let label = endpoint.host_str().unwrap_or("prismic").to_string();

        Ok(Self {
            endpoint,
            document_type: document_type.into(),
            page_size,
            access_token,
            client,
            label,
        })
    }

    /// The `q` predicate selecting documents of the configured type.
    fn type_predicate(&self) -> String {
        format!("[[at(document.type, \"{}\")]]", self.document_type)
    }

    fn root_url(&self) -> Url {
        let mut url = self.endpoint.clone();
        if let Some(token) = &self.access_token {
            url.query_pairs_mut().append_pair("access_token", token);
        }
        url
    }

    /// Build the first-page search URL for a given master ref.
    fn search_url(&self, master_ref: &str) -> Result<Url> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|()| Error::InvalidConfigValue {
                field: "endpoint".into(),
                message: format!("{} cannot be used as a base URL", self.endpoint),
            })?
            .pop_if_empty()
            .extend(["documents", "search"]);

        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("ref", master_ref)
                .append_pair("q", &self.type_predicate())
                .append_pair("pageSize", &self.page_size.to_string());
            if let Some(token) = &self.access_token {
                query.append_pair("access_token", token);
            }
        }
        Ok(url)
    }

    fn master_ref(&self) -> Result<String> {
        let root: ApiRoot = self.get_json(self.root_url().as_str())?;
        root.refs
            .into_iter()
            .find(|r| r.is_master_ref)
            .map(|r| r.reference)
            .ok_or_else(|| Error::MissingMasterRef {
                endpoint: self.endpoint.to_string(),
            })
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!(url, "GET");
        let response = self.client.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        let body = response.text()?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Decode a `documents/search` response body into a [`Page`].
    ///
    /// This is a pure function (no I/O) so that tests can exercise the
    /// decoding logic without hitting the network.
    pub fn parse_search_response(body: &str) -> Result<Page> {
        let response: SearchResponse = serde_json::from_str(body)?;
        Ok(response.into_page())
    }
}

impl SearchResponse {
    fn into_page(self) -> Page {
        let results = self
            .results
            .into_iter()
            .map(|doc| PostSummary {
                // `uid` is the routable slug; older documents may lack one.
                id: doc.uid.unwrap_or(doc.id),
                published: doc
                    .first_publication_date
                    .as_deref()
                    .and_then(parse_publication_date),
                title: text_field(&doc.data.title),
                subtitle: text_field(&doc.data.subtitle),
                author: text_field(&doc.data.author),
            })
            .collect();

        Page::new(results, self.next_page.map(Cursor::new))
    }
}

/// Parse a publication timestamp.
///
/// Accepts RFC 3339 as well as the `+0000` offset form the API emits.
/// Unparsable values degrade to `None`.
fn parse_publication_date(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z"))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Flatten a key-text or rich-text field into plain text.
fn text_field(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(blocks) => blocks
            .iter()
            .filter_map(|block| block.get("text").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join(" "),
        _ => String::new(),
    }
}

impl ContentSource for PrismicSource {
    fn name(&self) -> &str {
        &self.label
    }

    fn first_page(&self) -> Result<Page> {
        let master_ref = self.master_ref()?;
        let url = self.search_url(&master_ref)?;
        let page: SearchResponse = self.get_json(url.as_str())?;
        let page = page.into_page();
        info!(
            document_type = %self.document_type,
            results = page.results.len(),
            has_more = !page.is_last(),
            "fetched first page"
        );
        Ok(page)
    }

    fn fetch_page(&self, cursor: &Cursor) -> Result<Page> {
        let page: SearchResponse = self.get_json(cursor.as_str())?;
        let page = page.into_page();
        info!(
            results = page.results.len(),
            has_more = !page.is_last(),
            "fetched next page"
        );
        Ok(page)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
