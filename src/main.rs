//! postfeed: a paginated blog index for the terminal.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌──────────┐  LoaderMsg ┌──────────┐  draw()  ┌──────────┐
//! │ loader.rs│ ─────────► │  app.rs  │ ───────► │  ui.rs   │
//! │ (thread) │ ◄───────── │ (state)  │          │ (render) │
//! └──────────┘   Cursor   └──────────┘          └──────────┘
//!                              ▲
//!                              │ handle_key_event()
//!                         ┌──────────┐
//!                         │ input.rs │
//!                         └──────────┘
//! ```
//!
//! * **`source/`**: the `ContentSource` trait, the post/page types, and the
//!   Prismic implementation.
//! * **`feed`**: the append-only accumulator of fetched posts.
//! * **`loader`**: a background thread that fetches the next page on request.
//! * **`app`**: owns all application state (feed, selection, notices).
//! * **`ui`**: pure rendering: reads `App` state and draws widgets.
//! * **`input`**: maps key events to `App` mutations.
//! * **`config`**: command-line arguments and validation.
//! * **`main`**: wires everything together: parse args, fetch the first
//!   page, set up the terminal, and run the event loop.

mod app;
mod config;
mod error;
mod feed;
mod input;
mod loader;
mod source;
mod ui;

use std::fs::File;
use std::io::{self, Write};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Locale;
use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use app::App;
use config::{Cli, Config, Mode};
use feed::Feed;
use loader::LoaderMsg;
use source::{ContentSource, PrismicSource};

// ---------------------------------------------------------------------------
// RAII terminal guard, restores the terminal even on panic
// ---------------------------------------------------------------------------

/// Manages terminal raw-mode and alternate-screen lifetime via [`Drop`].
///
/// Constructing this struct enters raw mode + alternate screen.  When the
/// value is dropped (normally or during stack unwinding) it restores the
/// terminal.
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalGuard {
    fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Install a panic hook that restores the terminal before printing the
/// panic message.
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(info);
    }));
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Level used when `RUST_LOG` is unset, empty or unparsable.
const DEFAULT_LOG_LEVEL: &str = "info";

/// Build the log filter from the value of `RUST_LOG`, if any.
fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_LEVEL))
}

/// Route `tracing` output somewhere that won't corrupt the UI.
///
/// The terminal UI owns stdout, so interactive sessions log only when a
/// log file is given.  Plain-text mode logs to stderr.
fn init_logging(config: &Config) -> Result<()> {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = log_filter(directives.as_deref());

    if let Some(path) = &config.log_file {
        let file = File::create(path)
            .with_context(|| format!("creating log file {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .init();
    } else if matches!(config.mode, Mode::Print { .. }) {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Plain-text mode
// ---------------------------------------------------------------------------

fn print_index(
    out: &mut impl Write,
    mut feed: Feed,
    source: &dyn ContentSource,
    all_pages: bool,
    locale: Locale,
) -> Result<()> {
    if all_pages {
        while feed.has_more() {
            feed.load_more(source).context("loading next page")?;
        }
    }

    for post in feed.posts() {
        writeln!(out, "{}", post.title)?;
        if !post.subtitle.is_empty() {
            writeln!(out, "  {}", post.subtitle)?;
        }
        writeln!(
            out,
            "  {} · {} · {}",
            ui::format_published(post.published, locale),
            post.author,
            post.route()
        )?;
        writeln!(out)?;
    }
    if let Some(cursor) = feed.cursor() {
        writeln!(out, "More posts: {cursor}")?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Terminal UI
// ---------------------------------------------------------------------------

fn run_ui(feed: Feed, source: PrismicSource, locale: Locale) -> Result<()> {
    install_panic_hook();

    let mut app = App::new(feed, source.name()).with_date_locale(locale);

    // -- start background loader ---------------------------------------------
    let loader = loader::spawn(Box::new(source));

    // -- terminal setup (Drop restores on exit or panic) ---------------------
    let mut guard = TerminalGuard::new()?;

    // -- main event loop -----------------------------------------------------
    // Runs at ~10 fps (100 ms tick).  Each iteration:
    //   1. Apply any replies from the loader.
    //   2. Render the UI.
    //   3. Poll for keyboard input (non-blocking, up to tick_rate).
    let tick_rate = Duration::from_millis(100);

    loop {
        // 1. Process loader replies
        while let Some(msg) = loader.try_recv() {
            app.apply(msg);
        }

        // 2. Render
        guard.terminal.draw(|f| ui::draw(&mut app, f))?;

        // 3. Handle input
        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                if let Some(cursor) = input::handle_key_event(&mut app, key) {
                    if !loader.request(cursor) {
                        app.apply(LoaderMsg::Error("page loader stopped".into()));
                    }
                }
            }
        }

        if app.quit {
            break;
        }
    }

    // `guard` is dropped here, restoring the terminal.
    Ok(())
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let config = Config::from_cli(Cli::parse())?;
    init_logging(&config)?;

    let source = PrismicSource::new(
        config.endpoint.clone(),
        config.document_type.clone(),
        config.page_size,
        config.access_token.clone(),
        config.timeout,
    )?;

    // The first page is fetched before anything is drawn; without it there
    // is no index to show.
    let first = source
        .first_page()
        .with_context(|| format!("fetching first page from {}", config.endpoint))?;
    info!(posts = first.results.len(), "initial page loaded");
    let feed = Feed::initialize(first);

    match config.mode {
        Mode::Print { all_pages } => print_index(
            &mut io::stdout().lock(),
            feed,
            &source,
            all_pages,
            config.date_locale,
        ),
        Mode::Interactive => run_ui(feed, source, config.date_locale),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::tests::StubSource;
    use crate::source::{make_post, Cursor, Page};
    use pretty_assertions::assert_eq;
    use tracing::level_filters::LevelFilter;

    fn first_page() -> Feed {
        Feed::initialize(Page::new(
            vec![make_post("a", "Post A", None)],
            Some(Cursor::new("/page2")),
        ))
    }

    fn stub() -> StubSource {
        StubSource::new(vec![
            (
                "/page2",
                Page::new(
                    vec![make_post("b", "Post B", None)],
                    Some(Cursor::new("/page3")),
                ),
            ),
            (
                "/page3",
                Page::new(vec![make_post("c", "Post C", None)], None),
            ),
        ])
    }

    fn print(feed: Feed, source: &StubSource, all_pages: bool) -> String {
        let mut out = Vec::new();
        print_index(&mut out, feed, source, all_pages, Locale::pt_BR).unwrap();
        String::from_utf8(out).unwrap()
    }

    // -- plain-text mode -----------------------------------------------------

    #[test]
    fn print_first_page_ends_with_next_cursor() {
        let source = stub();
        let text = print(first_page(), &source, false);

        assert_eq!(
            text,
            "Post A\n  Post A subtitle\n  unpublished · Tester · /post/a\n\nMore posts: /page2\n"
        );
        assert_eq!(source.fetch_count(), 0);
    }

    #[test]
    fn print_all_follows_every_cursor_in_order() {
        let source = stub();
        let text = print(first_page(), &source, true);

        let titles: Vec<&str> = text
            .lines()
            .filter(|line| line.starts_with("Post") && !line.contains("subtitle"))
            .collect();
        assert_eq!(titles, vec!["Post A", "Post B", "Post C"]);
        assert!(text.contains("/post/c"));
        assert!(!text.contains("More posts:"));
        assert_eq!(source.fetch_count(), 2);
    }

    #[test]
    fn print_all_stops_on_fetch_error() {
        let source = StubSource::new(vec![]);
        let mut out = Vec::new();
        let result = print_index(&mut out, first_page(), &source, true, Locale::pt_BR);
        assert!(result.is_err());
        assert!(out.is_empty());
    }

    // -- logging -------------------------------------------------------------

    #[test]
    fn log_filter_defaults_to_info() {
        assert_eq!(log_filter(None).max_level_hint(), Some(LevelFilter::INFO));
        assert_eq!(
            log_filter(Some("  ")).max_level_hint(),
            Some(LevelFilter::INFO)
        );
    }

    #[test]
    fn log_filter_honours_a_more_verbose_level() {
        assert_eq!(
            log_filter(Some("debug")).max_level_hint(),
            Some(LevelFilter::DEBUG)
        );
        assert_eq!(
            log_filter(Some("postfeed=trace")).max_level_hint(),
            Some(LevelFilter::TRACE)
        );
    }

    #[test]
    fn log_filter_falls_back_on_bad_directives() {
        assert_eq!(
            log_filter(Some("postfeed=loud")).max_level_hint(),
            Some(LevelFilter::INFO)
        );
    }
}
