//! Page-number strip computation for the posts list.
//!
//! The strip shows every page when there are few of them, and otherwise
//! collapses long ranges around the current page into ellipses:
//!
//! ```text
//! total = 10, current = 1   ->  [1] 2 … 10
//! total = 10, current = 5   ->  1 … 4 [5] 6 … 10
//! total = 10, current = 10  ->  1 … 9 [10]
//! ```

/// Largest page count rendered without ellipses.
pub const FULL_STRIP_MAX_PAGES: u32 = 7;

/// One element of the page-number strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageControl {
    /// A page button. The active button is the page currently displayed and
    /// cannot be activated.
    Page { number: u32, active: bool },
    /// A collapsed range of pages.
    Ellipsis,
}

impl PageControl {
    /// Page number this control requests when activated, if any.
    pub fn target(&self) -> Option<u32> {
        match self {
            PageControl::Page { number, active } if !active => Some(*number),
            _ => None,
        }
    }
}

/// Compute the page-number strip for `current_page` out of `total_pages`.
///
/// Returns an empty strip when there are no pages.
pub fn page_strip(current_page: u32, total_pages: u32) -> Vec<PageControl> {
    let page = |number: u32| PageControl::Page {
        number,
        active: number == current_page,
    };

    if total_pages == 0 {
        return Vec::new();
    }

    if total_pages <= FULL_STRIP_MAX_PAGES {
        return (1..=total_pages).map(page).collect();
    }

    let mut strip = Vec::with_capacity(9);
    strip.push(page(1));

    if current_page > 3 {
        strip.push(PageControl::Ellipsis);
    }

    let start = current_page.saturating_sub(1).max(2);
    let end = current_page.saturating_add(1).min(total_pages - 1);
    strip.extend((start..=end).map(page));

    if current_page < total_pages - 2 {
        strip.push(PageControl::Ellipsis);
    }

    // total_pages > FULL_STRIP_MAX_PAGES here, so the last page is distinct from 1
    strip.push(page(total_pages));
    strip
}

/// Pagination metadata from the most recent successful posts fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageState {
    /// Page currently displayed (1-based).
    pub current_page: u32,
    /// Total number of pages reported by the backend.
    pub total_pages: u32,
    /// Total number of matching records.
    pub total: u64,
}

impl Default for PageState {
    fn default() -> Self {
        Self {
            current_page: 1,
            total_pages: 0,
            total: 0,
        }
    }
}

impl PageState {
    pub fn new(current_page: u32, total_pages: u32, total: u64) -> Self {
        Self {
            current_page: current_page.max(1),
            total_pages,
            total,
        }
    }

    /// Whether the "previous" control is enabled.
    pub fn has_prev(&self) -> bool {
        self.current_page > 1
    }

    /// Whether the "next" control is enabled.
    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    pub fn prev_page(&self) -> Option<u32> {
        self.has_prev().then(|| self.current_page - 1)
    }

    pub fn next_page(&self) -> Option<u32> {
        self.has_next().then(|| self.current_page + 1)
    }

    /// Whether `page` can be requested from the strip: inside the known
    /// range and not the page already displayed.
    pub fn can_activate(&self, page: u32) -> bool {
        page >= 1 && page <= self.total_pages && page != self.current_page
    }

    pub fn strip(&self) -> Vec<PageControl> {
        page_strip(self.current_page, self.total_pages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn p(number: u32) -> PageControl {
        PageControl::Page {
            number,
            active: false,
        }
    }

    fn active(number: u32) -> PageControl {
        PageControl::Page {
            number,
            active: true,
        }
    }

    const E: PageControl = PageControl::Ellipsis;

    fn button_count(strip: &[PageControl]) -> usize {
        strip
            .iter()
            .filter(|c| matches!(c, PageControl::Page { .. }))
            .count()
    }

    #[test]
    fn test_small_totals_render_every_page() {
        for total in 1..=FULL_STRIP_MAX_PAGES {
            for current in 1..=total {
                let strip = page_strip(current, total);
                assert_eq!(button_count(&strip), total as usize);
                assert!(!strip.contains(&E));
            }
        }
    }

    #[test]
    fn test_zero_pages_is_empty() {
        assert!(page_strip(1, 0).is_empty());
    }

    #[test]
    fn test_ten_pages_first_page() {
        assert_eq!(page_strip(1, 10), vec![active(1), p(2), E, p(10)]);
    }

    #[test]
    fn test_ten_pages_middle_page() {
        assert_eq!(
            page_strip(5, 10),
            vec![p(1), E, p(4), active(5), p(6), E, p(10)]
        );
    }

    #[test]
    fn test_ten_pages_last_page() {
        assert_eq!(page_strip(10, 10), vec![p(1), E, p(9), active(10)]);
    }

    #[test]
    fn test_ten_pages_near_edges() {
        assert_eq!(page_strip(3, 10), vec![p(1), p(2), active(3), p(4), E, p(10)]);
        assert_eq!(page_strip(4, 10), vec![p(1), E, p(3), active(4), p(5), E, p(10)]);
        assert_eq!(page_strip(8, 10), vec![p(1), E, p(7), active(8), p(9), p(10)]);
    }

    #[test]
    fn test_eight_pages_boundary() {
        assert_eq!(page_strip(2, 8), vec![p(1), active(2), p(3), E, p(8)]);
    }

    #[test]
    fn test_last_page_disables_next() {
        let state = PageState::new(10, 10, 195);
        assert!(!state.has_next());
        assert_eq!(state.next_page(), None);
        assert_eq!(state.prev_page(), Some(9));
    }

    #[test]
    fn test_first_page_disables_prev() {
        let state = PageState::new(1, 10, 195);
        assert!(!state.has_prev());
        assert_eq!(state.prev_page(), None);
        assert_eq!(state.next_page(), Some(2));
    }

    #[test]
    fn test_active_page_is_not_a_target() {
        assert_eq!(active(3).target(), None);
        assert_eq!(p(3).target(), Some(3));
        assert_eq!(E.target(), None);
    }

    #[test]
    fn test_can_activate_rejects_current_and_out_of_range() {
        let state = PageState::new(2, 5, 90);
        assert!(!state.can_activate(2));
        assert!(!state.can_activate(0));
        assert!(!state.can_activate(6));
        assert!(state.can_activate(5));
    }

    #[test]
    fn test_new_clamps_page_to_one() {
        assert_eq!(PageState::new(0, 3, 10).current_page, 1);
    }

    proptest! {
        #[test]
        fn prop_strip_is_well_formed(total in 1u32..500, offset in 0u32..500) {
            let current = offset % total + 1;
            let strip = page_strip(current, total);

            let pages: Vec<u32> = strip
                .iter()
                .filter_map(|c| match c {
                    PageControl::Page { number, .. } => Some(*number),
                    PageControl::Ellipsis => None,
                })
                .collect();

            // Always starts at 1, ends at total, strictly increasing
            prop_assert_eq!(pages.first().copied(), Some(1));
            prop_assert_eq!(pages.last().copied(), Some(total));
            prop_assert!(pages.windows(2).all(|w| w[0] < w[1]));

            // Exactly one active button, and it is the current page
            let actives: Vec<&PageControl> = strip
                .iter()
                .filter(|c| matches!(c, PageControl::Page { active: true, .. }))
                .collect();
            prop_assert_eq!(actives.len(), 1);
            prop_assert_eq!(*actives[0], PageControl::Page { number: current, active: true });

            // Bounded width, and no two ellipses side by side
            prop_assert!(strip.len() <= 9);
            prop_assert!(!strip.windows(2).any(|w| w[0] == PageControl::Ellipsis && w[1] == PageControl::Ellipsis));
        }

        #[test]
        fn prop_ellipsis_only_hides_pages(total in 8u32..500, offset in 0u32..500) {
            let current = offset % total + 1;
            let strip = page_strip(current, total);
            for (i, control) in strip.iter().enumerate() {
                if *control == PageControl::Ellipsis {
                    let before = strip[i - 1];
                    let after = strip[i + 1];
                    match (before, after) {
                        (PageControl::Page { number: a, .. }, PageControl::Page { number: b, .. }) => {
                            prop_assert!(b > a + 1);
                        }
                        _ => prop_assert!(false, "ellipsis must sit between page buttons"),
                    }
                }
            }
        }
    }
}
