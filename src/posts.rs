//! Posts list state: page, applied filters, filter draft and the request
//! sequence used to drop out-of-order responses.
//!
//! The controller never performs I/O. Every user action that needs data
//! returns a [`PostsRequest`]; the caller runs it and feeds the outcome back
//! through [`PostsController::apply`] or [`PostsController::fail`]. Only the
//! response to the most recently issued request is ever applied.

use std::time::Duration;

use tokio::time::Instant;

use crate::api::{Post, PostsPage};
use crate::debounce::Debouncer;
use crate::filters::{FilterForm, FilterSet};
use crate::pagination::{PageControl, PageState};

/// A posts fetch the caller should run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostsRequest {
    pub seq: u64,
    pub page: u32,
    pub limit: u32,
    pub filters: FilterSet,
}

/// Result of feeding a response back into the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The response belonged to the latest request.
    Current,
    /// A newer request was issued since; the response was discarded.
    Stale,
}

#[derive(Debug)]
pub struct PostsController {
    page: PageState,
    /// Page of the latest request; leads `page` while a fetch is in flight.
    requested_page: u32,
    filters: FilterSet,
    form: FilterForm,
    posts: Vec<Post>,
    selected: usize,
    page_size: u32,
    issued_seq: u64,
    in_flight: bool,
    loaded: bool,
    debounce: Debouncer,
}

impl PostsController {
    pub fn new(page_size: u32, debounce_delay: Duration) -> Self {
        Self {
            page: PageState::default(),
            requested_page: 1,
            filters: FilterSet::new(),
            form: FilterForm::default(),
            posts: Vec::new(),
            selected: 0,
            page_size: page_size.max(1),
            issued_seq: 0,
            in_flight: false,
            loaded: false,
            debounce: Debouncer::new(debounce_delay),
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn page(&self) -> &PageState {
        &self.page
    }

    /// Filters the displayed list was requested with.
    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    pub fn form(&self) -> &FilterForm {
        &self.form
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_post(&self) -> Option<&Post> {
        self.posts.get(self.selected)
    }

    pub fn strip(&self) -> Vec<PageControl> {
        self.page.strip()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight
    }

    /// Whether any fetch has succeeded yet.
    pub fn has_loaded(&self) -> bool {
        self.loaded
    }

    /// Page the latest request asked for.
    pub fn requested_page(&self) -> u32 {
        self.requested_page
    }

    pub fn latest_seq(&self) -> u64 {
        self.issued_seq
    }

    pub fn debounce_deadline(&self) -> Option<Instant> {
        self.debounce.deadline()
    }

    // ========================================================================
    // Selection
    // ========================================================================

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.posts.len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    // ========================================================================
    // Page actions (use the applied filters)
    // ========================================================================

    /// Reload the displayed page.
    pub fn refresh(&mut self) -> PostsRequest {
        self.issue(self.page.current_page)
    }

    /// Reload from page 1 keeping the applied filters.
    pub fn reload_first_page(&mut self) -> PostsRequest {
        self.issue(1)
    }

    /// `None` for the requested page or a page outside the known range.
    pub fn goto_page(&mut self, page: u32) -> Option<PostsRequest> {
        if self.navigation().can_activate(page) {
            Some(self.issue(page))
        } else {
            None
        }
    }

    pub fn next_page(&mut self) -> Option<PostsRequest> {
        let page = self.navigation().next_page()?;
        Some(self.issue(page))
    }

    pub fn prev_page(&mut self) -> Option<PostsRequest> {
        let page = self.navigation().prev_page()?;
        Some(self.issue(page))
    }

    /// Page actions count from the last requested page, bounded by the
    /// last known page count.
    fn navigation(&self) -> PageState {
        PageState::new(self.requested_page, self.page.total_pages, self.page.total)
    }

    // ========================================================================
    // Filter actions
    // ========================================================================

    pub fn focus_next_field(&mut self) {
        self.form.focus = self.form.focus.next();
    }

    pub fn focus_prev_field(&mut self) {
        self.form.focus = self.form.focus.prev();
    }

    /// Type into the focused filter field and restart the debounce window.
    pub fn input_char(&mut self, c: char) {
        if self.form.push_char(c) {
            self.debounce.trigger();
        }
    }

    pub fn input_backspace(&mut self) {
        if self.form.backspace() {
            self.debounce.trigger();
        }
    }

    pub fn cycle_push_status(&mut self) {
        self.form.cycle_push_status();
        self.debounce.trigger();
    }

    /// Fire the debounced filter application once its window has elapsed.
    pub fn poll_debounce(&mut self) -> Option<PostsRequest> {
        if self.debounce.poll() {
            Some(self.apply_form())
        } else {
            None
        }
    }

    /// Apply the form immediately, cancelling any pending debounce.
    pub fn submit(&mut self) -> PostsRequest {
        self.debounce.cancel();
        self.apply_form()
    }

    /// Blank the form and the applied filters and go back to page 1.
    pub fn clear(&mut self) -> PostsRequest {
        self.debounce.cancel();
        self.form.reset();
        self.filters.clear();
        self.issue(1)
    }

    fn apply_form(&mut self) -> PostsRequest {
        self.filters = self.form.to_filter_set();
        self.issue(1)
    }

    fn issue(&mut self, page: u32) -> PostsRequest {
        let page = page.max(1);
        self.issued_seq += 1;
        self.in_flight = true;
        self.requested_page = page;
        tracing::debug!(
            seq = self.issued_seq,
            page,
            filters = self.filters.len(),
            "Issuing posts request"
        );
        PostsRequest {
            seq: self.issued_seq,
            page,
            limit: self.page_size,
            filters: self.filters.clone(),
        }
    }

    // ========================================================================
    // Responses
    // ========================================================================

    /// Commit a successful response if it answers the latest request.
    pub fn apply(&mut self, seq: u64, response: PostsPage) -> Applied {
        if seq != self.issued_seq {
            tracing::debug!(seq, latest = self.issued_seq, "Discarding stale posts response");
            return Applied::Stale;
        }
        self.page = PageState::new(response.page, response.total_pages, response.total);
        self.requested_page = self.page.current_page;
        self.posts = response.posts;
        self.selected = self.selected.min(self.posts.len().saturating_sub(1));
        self.in_flight = false;
        self.loaded = true;
        Applied::Current
    }

    /// Record a failed fetch. The displayed list and page strip are kept,
    /// and page actions count from the displayed page again.
    pub fn fail(&mut self, seq: u64) -> Applied {
        if seq != self.issued_seq {
            return Applied::Stale;
        }
        self.in_flight = false;
        self.requested_page = self.page.current_page;
        Applied::Current
    }
}
