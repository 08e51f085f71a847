//! The core data types shared by every content source.
//!
//! `PostSummary` is a single post preview as shown on the index; `Page` is
//! one page of query results together with the cursor for the page after
//! it.
//!
//! ## For contributors
//!
//! Publication dates are stored raw and formatted only when drawn (see
//! `ui::format_published`).  Sources must not pre-format them.

use std::fmt;

use chrono::{DateTime, Utc};

/// A single post preview, normalised from any content source.
///
/// Immutable once fetched.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct PostSummary {
    /// Stable identifier, unique per post.  Used to build the post route.
    pub id: String,

    /// First publication timestamp.  `None` when the document was never
    /// published or the source sent an unparsable value.
    pub published: Option<DateTime<Utc>>,

    pub title: String,
    pub subtitle: String,
    pub author: String,
}

impl PostSummary {
    /// Route of the full post page, keyed by the post identifier.
    pub fn route(&self) -> String {
        format!("/post/{}", self.id)
    }
}

/// Opaque reference to the next page of results.
///
/// For the HTTP source this is a fully-qualified URL that returns the same
/// page shape when fetched.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Cursor(String);

impl Cursor {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One page of query results.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Page {
    /// Results in fetch order.  Never re-sorted.
    pub results: Vec<PostSummary>,
    /// `None` means this is the last page.
    pub next_page: Option<Cursor>,
}

impl Page {
    pub fn new(results: Vec<PostSummary>, next_page: Option<Cursor>) -> Self {
        Self { results, next_page }
    }

    pub fn is_last(&self) -> bool {
        self.next_page.is_none()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
