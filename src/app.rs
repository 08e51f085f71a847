use chrono::Locale;
use ratatui::widgets::ListState;

use crate::feed::{Feed, LoadMore};
use crate::loader::LoaderMsg;
use crate::source::{Cursor, PostSummary};

/// Severity of a [`Notice`].
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum NoticeKind {
    Info,
    Error,
}

/// A dismissible banner shown above the status bar.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }
}

pub struct App {
    /// Posts fetched so far, in fetch order.
    pub feed: Feed,
    /// List selection state.  Index `posts.len()` is the "load more" row.
    pub list_state: ListState,
    /// Whether the user has requested to quit.
    pub quit: bool,
    /// Last status message.
    pub status: String,
    /// Banner shown until dismissed or replaced.
    pub notice: Option<Notice>,
    /// Label of the content source, shown in the list title.
    pub source_name: String,
    /// Locale for month names in publication dates.
    pub date_locale: Locale,
}

impl App {
    pub fn new(feed: Feed, source_name: impl Into<String>) -> Self {
        let status = format!("Loaded {} posts", feed.posts().len());
        Self {
            feed,
            list_state: ListState::default(),
            quit: false,
            status,
            notice: None,
            source_name: source_name.into(),
            date_locale: Locale::pt_BR,
        }
    }

    pub fn with_date_locale(mut self, locale: Locale) -> Self {
        self.date_locale = locale;
        self
    }

    /// Number of selectable rows: every post plus the trailing
    /// "load more" row while another page exists.
    pub fn row_count(&self) -> usize {
        self.feed.posts().len() + usize::from(self.feed.has_more())
    }

    pub fn is_load_more_row(&self, index: usize) -> bool {
        self.feed.has_more() && index == self.feed.posts().len()
    }

    pub fn selected_post(&self) -> Option<&PostSummary> {
        self.list_state
            .selected()
            .and_then(|i| self.feed.posts().get(i))
    }

    // -- loading -------------------------------------------------------------

    /// Ask for the next page.  Returns the cursor the loader should fetch,
    /// or `None` if nothing should be fetched.
    pub fn request_load_more(&mut self) -> Option<Cursor> {
        self.notice = None;
        match self.feed.begin_load_more() {
            LoadMore::Fetch(cursor) => {
                self.status = "Loading more posts…".into();
                Some(cursor)
            }
            LoadMore::NoMorePages => {
                self.notice = Some(Notice::info("No more posts to load"));
                None
            }
            LoadMore::InFlight => {
                self.status = "Already loading…".into();
                None
            }
        }
    }

    /// Act on the selected row: load more on the trailing row, otherwise
    /// show the selected post's route.
    pub fn activate_selected(&mut self) -> Option<Cursor> {
        let index = self.list_state.selected()?;
        if self.is_load_more_row(index) {
            return self.request_load_more();
        }
        if let Some(line) = self
            .selected_post()
            .map(|post| format!("{} → {}", post.title, post.route()))
        {
            self.status = line;
        }
        None
    }

    /// Apply a reply from the loader thread.
    pub fn apply(&mut self, msg: LoaderMsg) {
        match msg {
            LoaderMsg::Page(page) => {
                let count = page.results.len();
                self.feed.complete_load_more(page);
                self.status = format!("Loaded {count} more posts");
                self.clamp_selection();
            }
            LoaderMsg::Error(e) => {
                self.feed.fail_load_more(e.clone());
                self.status = "Load failed".into();
                self.notice = Some(Notice::error(e));
            }
        }
    }

    /// Returns `true` if a notice was showing.
    pub fn dismiss_notice(&mut self) -> bool {
        self.notice.take().is_some()
    }

    /// The "load more" row disappears with the last page, so a selection
    /// on it must move back onto a post.
    fn clamp_selection(&mut self) {
        if let Some(i) = self.list_state.selected() {
            let rows = self.row_count();
            if rows == 0 {
                self.list_state.select(None);
            } else if i >= rows {
                self.list_state.select(Some(rows - 1));
            }
        }
    }

    // -- navigation ----------------------------------------------------------

    pub fn select_next(&mut self) {
        let rows = self.row_count();
        if rows == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => (i + 1).min(rows - 1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_previous(&mut self) {
        if self.row_count() == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_first(&mut self) {
        if self.row_count() > 0 {
            self.list_state.select(Some(0));
        }
    }

    pub fn select_last(&mut self) {
        let rows = self.row_count();
        if rows > 0 {
            self.list_state.select(Some(rows - 1));
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::feed::RequestState;
    use crate::source::{make_post, Page};

    pub fn app_with(ids: &[&str], next: Option<&str>) -> App {
        let page = Page::new(
            ids.iter().map(|id| make_post(id, id, None)).collect(),
            next.map(Cursor::new),
        );
        App::new(Feed::initialize(page), "test")
    }

    // -- construction --------------------------------------------------------

    #[test]
    fn new_app_reports_initial_count() {
        let app = app_with(&["a", "b"], Some("/p2"));
        assert_eq!(app.status, "Loaded 2 posts");
        assert!(!app.quit);
        assert!(app.notice.is_none());
        assert!(app.list_state.selected().is_none());
    }

    #[test]
    fn load_more_row_exists_only_while_more_pages() {
        let more = app_with(&["a", "b"], Some("/p2"));
        assert_eq!(more.row_count(), 3);
        assert!(more.is_load_more_row(2));

        let done = app_with(&["a", "b"], None);
        assert_eq!(done.row_count(), 2);
        assert!(!done.is_load_more_row(2));
    }

    // -- loading -------------------------------------------------------------

    #[test]
    fn request_load_more_returns_cursor() {
        let mut app = app_with(&["a"], Some("/p2"));
        assert_eq!(app.request_load_more(), Some(Cursor::new("/p2")));
        assert!(app.feed.is_loading());
    }

    #[test]
    fn request_load_more_twice_fetches_once() {
        let mut app = app_with(&["a"], Some("/p2"));
        assert!(app.request_load_more().is_some());
        assert!(app.request_load_more().is_none());
        assert_eq!(app.status, "Already loading…");
    }

    #[test]
    fn no_more_pages_shows_info_notice() {
        let mut app = app_with(&["a"], None);
        assert!(app.request_load_more().is_none());
        assert_eq!(app.notice, Some(Notice::info("No more posts to load")));
    }

    #[test]
    fn applying_a_page_appends_and_updates_status() {
        let mut app = app_with(&["a"], Some("/p2"));
        app.request_load_more();
        app.apply(LoaderMsg::Page(Page::new(vec![make_post("b", "B", None)], None)));

        assert_eq!(app.feed.posts().len(), 2);
        assert!(!app.feed.has_more());
        assert_eq!(app.status, "Loaded 1 more posts");
    }

    #[test]
    fn applying_an_error_shows_error_notice() {
        let mut app = app_with(&["a"], Some("/p2"));
        app.request_load_more();
        app.apply(LoaderMsg::Error("timeout".into()));

        assert_eq!(app.notice, Some(Notice::error("timeout")));
        assert_eq!(app.feed.state(), &RequestState::Failed("timeout".into()));
        assert!(app.feed.has_more());
    }

    #[test]
    fn selection_leaves_vanished_load_more_row() {
        let mut app = app_with(&["a"], Some("/p2"));
        app.select_last();
        assert_eq!(app.list_state.selected(), Some(1));

        app.request_load_more();
        app.apply(LoaderMsg::Page(Page::new(vec![], None)));
        assert_eq!(app.list_state.selected(), Some(0));
    }

    #[test]
    fn activate_on_load_more_row_requests_next_page() {
        let mut app = app_with(&["a"], Some("/p2"));
        app.select_last();
        assert_eq!(app.activate_selected(), Some(Cursor::new("/p2")));
    }

    #[test]
    fn activate_on_post_shows_route() {
        let mut app = app_with(&["hello-world"], Some("/p2"));
        app.select_first();
        assert!(app.activate_selected().is_none());
        assert_eq!(app.status, "hello-world → /post/hello-world");
        assert!(!app.feed.is_loading());
    }

    #[test]
    fn dismiss_notice_reports_whether_one_was_shown() {
        let mut app = app_with(&["a"], None);
        assert!(!app.dismiss_notice());
        app.request_load_more();
        assert!(app.dismiss_notice());
        assert!(app.notice.is_none());
    }

    // -- navigation ----------------------------------------------------------

    #[test]
    fn navigation_on_empty_is_noop() {
        let mut app = app_with(&[], None);
        app.select_next();
        app.select_previous();
        app.select_first();
        app.select_last();
        assert!(app.list_state.selected().is_none());
    }

    #[test]
    fn select_next_reaches_load_more_row_and_clamps() {
        let mut app = app_with(&["a", "b"], Some("/p2"));

        app.select_next();
        assert_eq!(app.list_state.selected(), Some(0));
        app.select_next();
        app.select_next();
        assert_eq!(app.list_state.selected(), Some(2));
        app.select_next();
        assert_eq!(app.list_state.selected(), Some(2));
    }

    #[test]
    fn select_previous_clamps_at_zero() {
        let mut app = app_with(&["a", "b"], None);
        app.select_first();
        app.select_previous();
        assert_eq!(app.list_state.selected(), Some(0));
    }

    #[test]
    fn select_previous_moves_up() {
        let mut app = app_with(&["a", "b", "c"], None);
        app.select_last();
        app.select_previous();
        assert_eq!(app.list_state.selected(), Some(1));
    }
}
