//! Posts list filters.
//!
//! `FilterSet` is the applied set of constraints sent to the backend.
//! `FilterForm` is the editable draft shown in the posts tab; it becomes a
//! `FilterSet` when the debounce expires or the form is submitted.

use crate::api::PushStatus;
use std::collections::BTreeMap;

/// Maximum length of a single filter field, in characters.
pub const MAX_FILTER_LENGTH: usize = 256;

/// Named filter understood by `GET /api/posts`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FilterKey {
    Search,
    PushStatus,
    Creator,
    Category,
}

impl FilterKey {
    pub const ALL: [FilterKey; 4] = [
        FilterKey::Search,
        FilterKey::PushStatus,
        FilterKey::Creator,
        FilterKey::Category,
    ];

    /// Query parameter name on the wire.
    pub fn wire_name(self) -> &'static str {
        match self {
            FilterKey::Search => "search",
            FilterKey::PushStatus => "pushStatus",
            FilterKey::Creator => "creator",
            FilterKey::Category => "category",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FilterKey::Search => "Title",
            FilterKey::PushStatus => "Status",
            FilterKey::Creator => "Creator",
            FilterKey::Category => "Category",
        }
    }
}

/// The active set of named search constraints.
///
/// Values are trimmed on insertion and empty values are never stored, so a
/// set built from blank inputs is equal to an empty set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    entries: BTreeMap<FilterKey, String>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value`, or remove it when the trimmed value is empty.
    pub fn set(&mut self, key: FilterKey, value: impl AsRef<str>) {
        let value = value.as_ref().trim();
        if value.is_empty() {
            self.entries.remove(&key);
        } else {
            self.entries.insert(key, value.to_string());
        }
    }

    pub fn with(mut self, key: FilterKey, value: impl AsRef<str>) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: FilterKey) -> Option<&str> {
        self.entries.get(&key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Iterate `(wire_name, value)` pairs in a stable order.
    pub fn query_pairs(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.wire_name(), value.as_str()))
    }
}

/// Which field of the filter form receives typed characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormField {
    #[default]
    Search,
    PushStatus,
    Creator,
    Category,
}

impl FormField {
    pub fn next(self) -> Self {
        match self {
            FormField::Search => FormField::PushStatus,
            FormField::PushStatus => FormField::Creator,
            FormField::Creator => FormField::Category,
            FormField::Category => FormField::Search,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            FormField::Search => FormField::Category,
            FormField::PushStatus => FormField::Search,
            FormField::Creator => FormField::PushStatus,
            FormField::Category => FormField::Creator,
        }
    }
}

/// Editable filter inputs of the posts tab.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterForm {
    pub search: String,
    /// `None` means "any status".
    pub push_status: Option<PushStatus>,
    pub creator: String,
    pub category: String,
    pub focus: FormField,
}

impl FilterForm {
    /// Build the filter set these inputs describe.
    pub fn to_filter_set(&self) -> FilterSet {
        let mut set = FilterSet::new();
        set.set(FilterKey::Search, &self.search);
        if let Some(status) = self.push_status {
            set.set(FilterKey::PushStatus, status.code().to_string());
        }
        set.set(FilterKey::Creator, &self.creator);
        set.set(FilterKey::Category, &self.category);
        set
    }

    /// Blank every input. Keeps the focused field.
    pub fn reset(&mut self) {
        self.search.clear();
        self.push_status = None;
        self.creator.clear();
        self.category.clear();
    }

    fn focused_text(&mut self) -> Option<&mut String> {
        match self.focus {
            FormField::Search => Some(&mut self.search),
            FormField::Creator => Some(&mut self.creator),
            FormField::Category => Some(&mut self.category),
            FormField::PushStatus => None,
        }
    }

    /// Type a character into the focused field.
    ///
    /// Returns true if the form changed. On the status selector, any
    /// character cycles the selection.
    pub fn push_char(&mut self, c: char) -> bool {
        if c.is_control() {
            return false;
        }
        match self.focused_text() {
            Some(text) => {
                if text.chars().count() >= MAX_FILTER_LENGTH {
                    return false;
                }
                text.push(c);
                true
            }
            None => {
                self.cycle_push_status();
                true
            }
        }
    }

    /// Delete the last character of the focused field (or reset the status
    /// selector). Returns true if the form changed.
    pub fn backspace(&mut self) -> bool {
        match self.focused_text() {
            Some(text) => text.pop().is_some(),
            None => self.push_status.take().is_some(),
        }
    }

    /// Any → not pushed → pushed → no push needed → any.
    pub fn cycle_push_status(&mut self) {
        self.push_status = match self.push_status {
            None => Some(PushStatus::Pending),
            Some(PushStatus::Pending) => Some(PushStatus::Pushed),
            Some(PushStatus::Pushed) => Some(PushStatus::Skipped),
            Some(PushStatus::Skipped) => None,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_values_are_omitted() {
        let set = FilterSet::new()
            .with(FilterKey::Search, "")
            .with(FilterKey::Creator, "   ")
            .with(FilterKey::Category, "\t");
        assert!(set.is_empty());
        assert_eq!(set, FilterSet::new());
        assert_eq!(set.query_pairs().count(), 0);
    }

    #[test]
    fn test_values_are_trimmed() {
        let set = FilterSet::new().with(FilterKey::Search, "  rust  ");
        assert_eq!(set.get(FilterKey::Search), Some("rust"));
    }

    #[test]
    fn test_setting_empty_removes_existing() {
        let mut set = FilterSet::new().with(FilterKey::Creator, "alice");
        set.set(FilterKey::Creator, "");
        assert!(set.get(FilterKey::Creator).is_none());
        assert!(set.is_empty());
    }

    #[test]
    fn test_query_pairs_use_wire_names() {
        let set = FilterSet::new()
            .with(FilterKey::Category, "dev")
            .with(FilterKey::PushStatus, "1")
            .with(FilterKey::Search, "vps");
        let pairs: Vec<_> = set.query_pairs().collect();
        assert_eq!(
            pairs,
            vec![("search", "vps"), ("pushStatus", "1"), ("category", "dev")]
        );
    }

    #[test]
    fn test_blank_form_yields_empty_set() {
        let form = FilterForm::default();
        assert!(form.to_filter_set().is_empty());
    }

    #[test]
    fn test_form_to_filter_set() {
        let form = FilterForm {
            search: " cheap vps ".to_string(),
            push_status: Some(PushStatus::Pushed),
            creator: String::new(),
            category: "trade".to_string(),
            focus: FormField::Search,
        };
        let set = form.to_filter_set();
        assert_eq!(set.get(FilterKey::Search), Some("cheap vps"));
        assert_eq!(set.get(FilterKey::PushStatus), Some("1"));
        assert_eq!(set.get(FilterKey::Creator), None);
        assert_eq!(set.get(FilterKey::Category), Some("trade"));
    }

    #[test]
    fn test_push_char_goes_to_focused_field() {
        let mut form = FilterForm::default();
        assert!(form.push_char('a'));
        form.focus = FormField::Creator;
        assert!(form.push_char('b'));
        assert_eq!(form.search, "a");
        assert_eq!(form.creator, "b");
    }

    #[test]
    fn test_status_selector_cycles() {
        let mut form = FilterForm {
            focus: FormField::PushStatus,
            ..Default::default()
        };
        form.push_char(' ');
        assert_eq!(form.push_status, Some(PushStatus::Pending));
        form.cycle_push_status();
        form.cycle_push_status();
        assert_eq!(form.push_status, Some(PushStatus::Skipped));
        form.cycle_push_status();
        assert_eq!(form.push_status, None);
    }

    #[test]
    fn test_backspace_on_empty_field_reports_no_change() {
        let mut form = FilterForm::default();
        assert!(!form.backspace());
        form.focus = FormField::PushStatus;
        assert!(!form.backspace());
        form.push_status = Some(PushStatus::Pushed);
        assert!(form.backspace());
        assert_eq!(form.push_status, None);
    }

    #[test]
    fn test_field_length_is_capped() {
        let mut form = FilterForm {
            search: "x".repeat(MAX_FILTER_LENGTH),
            ..Default::default()
        };
        assert!(!form.push_char('y'));
        assert_eq!(form.search.len(), MAX_FILTER_LENGTH);
    }

    #[test]
    fn test_reset_clears_inputs() {
        let mut form = FilterForm {
            search: "a".into(),
            push_status: Some(PushStatus::Pending),
            creator: "b".into(),
            category: "c".into(),
            focus: FormField::Category,
        };
        form.reset();
        assert_eq!(form.to_filter_set(), FilterSet::new());
        assert_eq!(form.focus, FormField::Category);
    }

    #[test]
    fn test_field_cycle_round_trips() {
        let mut field = FormField::Search;
        for _ in 0..4 {
            field = field.next();
        }
        assert_eq!(field, FormField::Search);
        assert_eq!(FormField::Search.prev(), FormField::Category);
    }
}
