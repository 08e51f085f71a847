//! Background page loading.
//!
//! Runs on a dedicated thread that owns the [`ContentSource`].  The UI
//! thread sends it a [`Cursor`] whenever the user asks for more posts and
//! drains [`LoaderMsg`] replies on every tick over an [`mpsc`] channel.
//!
//! ## For contributors
//!
//! The loader does not guard against overlapping requests itself; it
//! serves them in order.  Overlap is prevented upstream by
//! [`crate::feed::Feed::begin_load_more`].

use std::sync::mpsc;
use std::thread;

use tracing::debug;

use crate::source::{ContentSource, Cursor, Page};

/// Messages sent from the loader thread to the UI thread.
#[derive(Debug)]
pub enum LoaderMsg {
    /// The requested page was fetched.
    Page(Page),
    /// The fetch failed with this error description.
    Error(String),
}

/// Handle to the loader thread.
pub struct Loader {
    requests: mpsc::Sender<Cursor>,
    replies: mpsc::Receiver<LoaderMsg>,
}

impl Loader {
    /// Ask the loader to fetch the page `cursor` points at.
    ///
    /// Returns `false` if the loader thread has gone away.
    pub fn request(&self, cursor: Cursor) -> bool {
        self.requests.send(cursor).is_ok()
    }

    /// Next reply, if one is ready.  Never blocks.
    pub fn try_recv(&self) -> Option<LoaderMsg> {
        self.replies.try_recv().ok()
    }
}

/// Spawn the background loader thread.
///
/// The thread runs until the [`Loader`] is dropped, which closes the
/// request channel.
pub fn spawn(source: Box<dyn ContentSource>) -> Loader {
    let (request_tx, request_rx) = mpsc::channel::<Cursor>();
    let (reply_tx, reply_rx) = mpsc::channel();

    thread::spawn(move || {
        for cursor in request_rx {
            let msg = match source.fetch_page(&cursor) {
                Ok(page) => LoaderMsg::Page(page),
                Err(e) => LoaderMsg::Error(format!("{}: {e}", source.name())),
            };
            // If the receiver is gone the main thread has exited;
            // silently stop loading.
            if reply_tx.send(msg).is_err() {
                return;
            }
        }
        debug!("loader channel closed, exiting");
    });

    Loader {
        requests: request_tx,
        replies: reply_rx,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::tests::StubSource;
    use crate::source::make_post;
    use std::time::{Duration, Instant};

    fn wait_for_reply(loader: &Loader) -> LoaderMsg {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(msg) = loader.try_recv() {
                return msg;
            }
            assert!(Instant::now() < deadline, "loader did not reply in time");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn replies_with_fetched_page() {
        let page = Page::new(vec![make_post("b", "B", None)], None);
        let loader = spawn(Box::new(StubSource::new(vec![("/page2", page.clone())])));

        assert!(loader.request(Cursor::new("/page2")));
        match wait_for_reply(&loader) {
            LoaderMsg::Page(got) => assert_eq!(got, page),
            LoaderMsg::Error(e) => panic!("unexpected error: {e}"),
        }
    }

    #[test]
    fn replies_with_error_prefixed_by_source_name() {
        let loader = spawn(Box::new(StubSource::new(vec![])));

        assert!(loader.request(Cursor::new("/nowhere")));
        match wait_for_reply(&loader) {
            LoaderMsg::Error(e) => assert!(e.starts_with("stub: HTTP 404"), "got {e}"),
            LoaderMsg::Page(_) => panic!("expected an error"),
        }
    }

    #[test]
    fn try_recv_is_empty_before_any_request() {
        let loader = spawn(Box::new(StubSource::new(vec![])));
        assert!(loader.try_recv().is_none());
    }
}
