//! Content source abstraction layer.
//!
//! This module defines the [`ContentSource`] trait and the shared
//! [`PostSummary`] / [`Page`] types.  Concrete sources live in sub-modules
//! (currently only [`prismic`]).
//!
//! ## For contributors: adding a new source
//!
//! 1. Create a new file in this directory (e.g. `contentful.rs`).
//! 2. Define a struct and implement [`ContentSource`] for it.
//! 3. Add `mod contentful;` below and re-export your struct.
//! 4. Construct an instance in `main.rs`.
//!
//! The accumulator, loader and UI are all source-agnostic.

mod post;
mod prismic;

pub use post::{Cursor, Page, PostSummary};
pub use prismic::PrismicSource;

#[cfg(test)]
pub(crate) use post::tests::make_post;

use crate::error::Result;

/// Trait that every content source must implement.
///
/// [`fetch_page()`](ContentSource::fetch_page) runs on the loader's
/// background thread, so implementations must be [`Send`].
pub trait ContentSource: Send {
    /// Human-readable label shown in the status bar.
    fn name(&self) -> &str;

    /// Query the first page of posts.
    fn first_page(&self) -> Result<Page>;

    /// Fetch the page a cursor points at.
    fn fetch_page(&self, cursor: &Cursor) -> Result<Page>;
}
