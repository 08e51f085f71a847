//! The pagination accumulator.
//!
//! [`Feed`] holds every post fetched so far, in fetch order, plus the cursor
//! for the next page.  Loading more is split into [`Feed::begin_load_more`]
//! and [`Feed::complete_load_more`] / [`Feed::fail_load_more`] so the fetch
//! itself can run on the loader thread while the UI thread keeps drawing.
//!
//! Only one request may be outstanding.  While the feed is
//! [`RequestState::Loading`], further triggers return [`LoadMore::InFlight`]
//! and fetch nothing, so responses can never land out of order.

use tracing::{debug, warn};

use crate::error::Result;
use crate::source::{ContentSource, Cursor, Page, PostSummary};

/// Progress of the single outstanding "load more" request.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub enum RequestState {
    #[default]
    Idle,
    Loading,
    /// The last request failed.  Posts and cursor are unchanged, so the
    /// user may try again.
    Failed(String),
}

/// What the caller should do after [`Feed::begin_load_more`].
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum LoadMore {
    /// Fetch this cursor, then report back with `complete_load_more` or
    /// `fail_load_more`.
    Fetch(Cursor),
    /// The last page has been reached.  Nothing was fetched.
    NoMorePages,
    /// A request is already outstanding.  Nothing was fetched.
    InFlight,
}

/// Result of a synchronous [`Feed::load_more`].
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum LoadOutcome {
    /// This many posts were appended.
    Appended(usize),
    NoMorePages,
    InFlight,
}

/// Append-only store of fetched posts for the current session.
#[derive(Debug, Clone)]
pub struct Feed {
    posts: Vec<PostSummary>,
    cursor: Option<Cursor>,
    state: RequestState,
}

impl Feed {
    /// Start a feed from the first fetched page.
    pub fn initialize(page: Page) -> Self {
        Self {
            posts: page.results,
            cursor: page.next_page,
            state: RequestState::Idle,
        }
    }

    pub fn posts(&self) -> &[PostSummary] {
        &self.posts
    }

    pub fn cursor(&self) -> Option<&Cursor> {
        self.cursor.as_ref()
    }

    pub fn has_more(&self) -> bool {
        self.cursor.is_some()
    }

    pub fn state(&self) -> &RequestState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == RequestState::Loading
    }

    /// Claim the next page for fetching.
    ///
    /// On [`LoadMore::Fetch`] the feed moves to [`RequestState::Loading`]
    /// and stays there until the result is reported.
    pub fn begin_load_more(&mut self) -> LoadMore {
        if self.is_loading() {
            return LoadMore::InFlight;
        }
        match &self.cursor {
            None => LoadMore::NoMorePages,
            Some(cursor) => {
                debug!(%cursor, "loading next page");
                self.state = RequestState::Loading;
                LoadMore::Fetch(cursor.clone())
            }
        }
    }

    /// Append a fetched page and take its cursor.
    pub fn complete_load_more(&mut self, page: Page) {
        self.posts.extend(page.results);
        self.cursor = page.next_page;
        self.state = RequestState::Idle;
    }

    /// Record a failed fetch.  Posts and cursor are left untouched.
    pub fn fail_load_more(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!(error = %message, "loading next page failed");
        self.state = RequestState::Failed(message);
    }

    /// Fetch and append the next page on the calling thread.
    ///
    /// Errors are recorded in [`Feed::state`] and also returned.
    pub fn load_more(&mut self, source: &dyn ContentSource) -> Result<LoadOutcome> {
        let cursor = match self.begin_load_more() {
            LoadMore::Fetch(cursor) => cursor,
            LoadMore::NoMorePages => return Ok(LoadOutcome::NoMorePages),
            LoadMore::InFlight => return Ok(LoadOutcome::InFlight),
        };

        match source.fetch_page(&cursor) {
            Ok(page) => {
                let count = page.results.len();
                self.complete_load_more(page);
                Ok(LoadOutcome::Appended(count))
            }
            Err(e) => {
                self.fail_load_more(e.to_string());
                Err(e)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
