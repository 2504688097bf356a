use std::time::{Duration, Instant};

use tracing::error;

use crate::fetch::{FetchMessage, Fetcher};
use crate::omdb::{MovieDetail, OmdbError, SearchResultItem};

/// Input mode for the search bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// How long an error banner stays visible before auto-hiding.
pub const ERROR_DISPLAY: Duration = Duration::from_secs(5);

/// Rows consumed by the chrome around the results grid
/// (header, search bar, banner line, status line).
pub const GRID_OVERHEAD: u16 = 8;

/// Cell size of one result card in the grid.
pub const CARD_WIDTH: u16 = 30;
pub const CARD_HEIGHT: u16 = 5;

pub const EMPTY_QUERY_MSG: &str = "Please enter a movie name to search";
pub const SEARCH_FAILED_MSG: &str =
    "An error occurred while fetching movies. Please check your internet connection and try again.";
pub const DETAIL_UNAVAILABLE_MSG: &str = "Unable to fetch movie details. Please try again.";
pub const DETAIL_FAILED_MSG: &str =
    "An error occurred while fetching movie details. Please try again.";

/// An error banner with its auto-hide deadline.
///
/// There is at most one banner; showing a new error replaces the message
/// and restarts the deadline, so an old deadline can never hide a newer
/// message early.
#[derive(Debug, Clone)]
pub struct Banner {
    pub message: String,
    deadline: Instant,
}

impl Banner {
    fn expired(&self, now: Instant) -> bool {
        now >= self.deadline
    }
}

/// Main application state.
pub struct App {
    pub fetcher: Fetcher,
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub show_help: bool,

    // Search bar state
    pub query: String,

    // Results grid state
    pub results: Vec<SearchResultItem>,
    pub selected: usize,
    pub grid_cols: usize,
    pub grid_rows: usize,
    pub row_offset: usize, // First visible grid row

    // Detail overlay state
    pub detail: Option<MovieDetail>,
    pub detail_scroll: u16,

    // Busy indicator
    pub busy: bool,
    pub spinner_frame: usize,

    // Error banner
    pub banner: Option<Banner>,

    // Status message
    pub status_msg: String,

    // Monotonic request counter. Completions tagged with anything but the
    // latest value are stale and dropped.
    seq: u64,
}

impl App {
    pub fn new(fetcher: Fetcher) -> Self {
        Self {
            fetcher,
            should_quit: false,
            input_mode: InputMode::Editing,
            show_help: false,

            query: String::new(),

            results: Vec::new(),
            selected: 0,
            grid_cols: 1,
            grid_rows: 1,
            row_offset: 0,

            detail: None,
            detail_scroll: 0,

            busy: false,
            spinner_frame: 0,

            banner: None,

            status_msg: "Type a movie name and press Enter to search".to_string(),

            seq: 0,
        }
    }

    /// Recompute grid geometry from the terminal size.
    pub fn update_grid_size(&mut self, width: u16, height: u16) {
        self.grid_cols = (width / CARD_WIDTH).max(1) as usize;
        let grid_height = height.saturating_sub(GRID_OVERHEAD);
        self.grid_rows = (grid_height / CARD_HEIGHT).max(1) as usize;
        self.ensure_selected_visible();
    }

    pub fn show_busy(&mut self) {
        self.busy = true;
    }

    pub fn hide_busy(&mut self) {
        self.busy = false;
    }

    /// Show an error banner, replacing any current one and restarting the
    /// auto-hide deadline.
    pub fn show_error(&mut self, message: impl Into<String>, now: Instant) {
        self.banner = Some(Banner {
            message: message.into(),
            deadline: now + ERROR_DISPLAY,
        });
    }

    pub fn hide_error(&mut self) {
        self.banner = None;
    }

    pub fn clear_results(&mut self) {
        self.results.clear();
        self.selected = 0;
        self.row_offset = 0;
        self.status_msg.clear();
    }

    /// Advance time-driven state. Called once per event-loop pass.
    pub fn tick(&mut self, now: Instant) {
        if self.banner.as_ref().is_some_and(|banner| banner.expired(now)) {
            self.banner = None;
        }
        if self.busy {
            self.spinner_frame = self.spinner_frame.wrapping_add(1);
        }
    }

    /// Validate and submit the current query. An all-whitespace query only
    /// raises the banner; nothing already on screen is touched.
    pub fn submit_search(&mut self, now: Instant) {
        let query = self.query.trim().to_string();
        if query.is_empty() {
            self.show_error(EMPTY_QUERY_MSG, now);
            return;
        }

        self.hide_error();
        self.show_busy();
        self.clear_results();
        self.seq += 1;
        self.fetcher.spawn_search(self.seq, &query);
        self.input_mode = InputMode::Normal;
    }

    /// Request the full record for the selected card. Always refetches;
    /// records are never cached across openings.
    pub fn open_selected_detail(&mut self) {
        let Some(imdb_id) = self.selected_item().map(|item| item.imdb_id.clone()) else {
            return;
        };
        self.show_busy();
        self.seq += 1;
        self.fetcher.spawn_detail(self.seq, &imdb_id);
    }

    /// Fold a fetch completion into the state.
    pub fn apply_fetch(&mut self, msg: FetchMessage, now: Instant) {
        match msg {
            FetchMessage::SearchFinished { seq, query, result } => {
                if seq != self.seq {
                    return;
                }
                self.hide_busy();
                match result {
                    Ok(items) if items.is_empty() => {
                        self.show_error(
                            format!(
                                "No movies found for \"{query}\". Please try a different search term."
                            ),
                            now,
                        );
                    }
                    Ok(items) => {
                        self.status_msg = format!("{} results for \"{query}\"", items.len());
                        self.results = items;
                        self.selected = 0;
                        self.row_offset = 0;
                    }
                    Err(err) => {
                        error!("search for {query:?} failed: {err}");
                        self.show_error(SEARCH_FAILED_MSG, now);
                    }
                }
            }
            FetchMessage::DetailFinished { seq, result } => {
                if seq != self.seq {
                    return;
                }
                self.hide_busy();
                match result {
                    Ok(detail) => {
                        self.detail = Some(detail);
                        self.detail_scroll = 0;
                    }
                    Err(OmdbError::Provider(reason)) => {
                        error!("detail lookup rejected: {reason}");
                        self.show_error(DETAIL_UNAVAILABLE_MSG, now);
                    }
                    Err(err) => {
                        error!("detail lookup failed: {err}");
                        self.show_error(DETAIL_FAILED_MSG, now);
                    }
                }
            }
        }
    }

    pub fn close_detail(&mut self) {
        self.detail = None;
        self.detail_scroll = 0;
    }

    pub fn selected_item(&self) -> Option<&SearchResultItem> {
        self.results.get(self.selected)
    }

    /// Move selection right, wrapping to the next row via linear order.
    pub fn select_next(&mut self) {
        if self.selected + 1 < self.results.len() {
            self.selected += 1;
            self.ensure_selected_visible();
        }
    }

    pub fn select_prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
            self.ensure_selected_visible();
        }
    }

    /// Move selection one grid row down.
    pub fn select_down(&mut self) {
        let next = self.selected + self.grid_cols;
        if next < self.results.len() {
            self.selected = next;
            self.ensure_selected_visible();
        }
    }

    /// Move selection one grid row up.
    pub fn select_up(&mut self) {
        if self.selected >= self.grid_cols {
            self.selected -= self.grid_cols;
            self.ensure_selected_visible();
        }
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
        self.row_offset = 0;
    }

    pub fn select_last(&mut self) {
        if self.results.is_empty() {
            return;
        }
        self.selected = self.results.len() - 1;
        self.ensure_selected_visible();
    }

    /// Scroll the grid so the selected card's row is on screen.
    fn ensure_selected_visible(&mut self) {
        let row = self.selected / self.grid_cols.max(1);
        if row < self.row_offset {
            self.row_offset = row;
        } else if row >= self.row_offset + self.grid_rows {
            self.row_offset = row + 1 - self.grid_rows;
        }
    }

    pub fn scroll_detail_down(&mut self) {
        self.detail_scroll = self.detail_scroll.saturating_add(1);
    }

    pub fn scroll_detail_up(&mut self) {
        self.detail_scroll = self.detail_scroll.saturating_sub(1);
    }

    pub fn scroll_detail_page_down(&mut self) {
        self.detail_scroll = self.detail_scroll.saturating_add(10);
    }

    pub fn scroll_detail_page_up(&mut self) {
        self.detail_scroll = self.detail_scroll.saturating_sub(10);
    }
}
