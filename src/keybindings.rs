//! Keybinding registry: maps key events to dashboard actions per context,
//! with user overrides from config.toml.
use crossterm::event::{KeyCode, KeyModifiers};
use std::collections::HashMap;

// ============================================================================
// Action Enum
// ============================================================================

/// All user-facing actions that can be triggered by keybindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Quit,
    Logout,
    ShowHelp,
    Back,
    NextTab,
    PrevTab,
    TabConfig,
    TabSubscriptions,
    TabPosts,
    TabStats,
    NavDown,
    NavUp,
    Refresh,

    // Config tab
    SetBotToken,
    TestBot,
    SendTestMessage,
    UnbindUser,
    ToggleStopPush,
    ToggleOnlyTitle,

    // Subscriptions tab
    AddSubscription,
    DeleteSubscription,

    // Posts tab
    EditFilters,
    ClearFilters,
    NextPage,
    PrevPage,
    FirstPage,
    LastPage,
    GotoPage,
    OpenInBrowser,
    FetchRss,

    // Forms and prompts
    Submit,
    Cancel,
    NextField,
    PrevField,

    // Confirmation dialog
    Confirm,
    Deny,
}

impl Action {
    const ALL: [Action; 36] = [
        Action::Quit,
        Action::Logout,
        Action::ShowHelp,
        Action::Back,
        Action::NextTab,
        Action::PrevTab,
        Action::TabConfig,
        Action::TabSubscriptions,
        Action::TabPosts,
        Action::TabStats,
        Action::NavDown,
        Action::NavUp,
        Action::Refresh,
        Action::SetBotToken,
        Action::TestBot,
        Action::SendTestMessage,
        Action::UnbindUser,
        Action::ToggleStopPush,
        Action::ToggleOnlyTitle,
        Action::AddSubscription,
        Action::DeleteSubscription,
        Action::EditFilters,
        Action::ClearFilters,
        Action::NextPage,
        Action::PrevPage,
        Action::FirstPage,
        Action::LastPage,
        Action::GotoPage,
        Action::OpenInBrowser,
        Action::FetchRss,
        Action::Submit,
        Action::Cancel,
        Action::NextField,
        Action::PrevField,
        Action::Confirm,
        Action::Deny,
    ];

    /// Name used for overrides in the `[keybindings]` config table.
    pub fn name(self) -> &'static str {
        match self {
            Self::Quit => "quit",
            Self::Logout => "logout",
            Self::ShowHelp => "show_help",
            Self::Back => "back",
            Self::NextTab => "next_tab",
            Self::PrevTab => "prev_tab",
            Self::TabConfig => "tab_config",
            Self::TabSubscriptions => "tab_subscriptions",
            Self::TabPosts => "tab_posts",
            Self::TabStats => "tab_stats",
            Self::NavDown => "nav_down",
            Self::NavUp => "nav_up",
            Self::Refresh => "refresh",
            Self::SetBotToken => "set_bot_token",
            Self::TestBot => "test_bot",
            Self::SendTestMessage => "send_test_message",
            Self::UnbindUser => "unbind_user",
            Self::ToggleStopPush => "toggle_stop_push",
            Self::ToggleOnlyTitle => "toggle_only_title",
            Self::AddSubscription => "add_subscription",
            Self::DeleteSubscription => "delete_subscription",
            Self::EditFilters => "edit_filters",
            Self::ClearFilters => "clear_filters",
            Self::NextPage => "next_page",
            Self::PrevPage => "prev_page",
            Self::FirstPage => "first_page",
            Self::LastPage => "last_page",
            Self::GotoPage => "goto_page",
            Self::OpenInBrowser => "open_in_browser",
            Self::FetchRss => "fetch_rss",
            Self::Submit => "submit",
            Self::Cancel => "cancel",
            Self::NextField => "next_field",
            Self::PrevField => "prev_field",
            Self::Confirm => "confirm",
            Self::Deny => "deny",
        }
    }

    /// Human-readable description for the help screen.
    pub fn describe(self) -> &'static str {
        match self {
            Self::Quit => "Quit",
            Self::Logout => "Log out and quit",
            Self::ShowHelp => "Show help",
            Self::Back => "Dismiss notice / help",
            Self::NextTab => "Next tab",
            Self::PrevTab => "Previous tab",
            Self::TabConfig => "Config tab",
            Self::TabSubscriptions => "Subscriptions tab",
            Self::TabPosts => "Posts tab",
            Self::TabStats => "Stats tab",
            Self::NavDown => "Move selection down",
            Self::NavUp => "Move selection up",
            Self::Refresh => "Reload current tab",
            Self::SetBotToken => "Set bot token",
            Self::TestBot => "Test bot connection",
            Self::SendTestMessage => "Send test message",
            Self::UnbindUser => "Unbind Telegram user",
            Self::ToggleStopPush => "Toggle stop push",
            Self::ToggleOnlyTitle => "Toggle title-only push",
            Self::AddSubscription => "Add subscription",
            Self::DeleteSubscription => "Delete subscription",
            Self::EditFilters => "Edit filters",
            Self::ClearFilters => "Clear filters",
            Self::NextPage => "Next page",
            Self::PrevPage => "Previous page",
            Self::FirstPage => "First page",
            Self::LastPage => "Last page",
            Self::GotoPage => "Go to page",
            Self::OpenInBrowser => "Open post in browser",
            Self::FetchRss => "Fetch RSS now",
            Self::Submit => "Submit",
            Self::Cancel => "Cancel",
            Self::NextField => "Next field",
            Self::PrevField => "Previous field",
            Self::Confirm => "Confirm",
            Self::Deny => "Cancel",
        }
    }
}

// ============================================================================
// Context Enum
// ============================================================================

/// Dispatch context; determines which bindings are active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Context {
    Global,
    Config,
    Subscriptions,
    Posts,
    Stats,
    /// Text entry. Unbound keys are typed into the focused field.
    Form,
    Confirm,
}

impl Context {
    /// Modal contexts never fall through to global bindings.
    pub fn is_modal(self) -> bool {
        matches!(self, Context::Form | Context::Confirm)
    }

    pub fn label(self) -> &'static str {
        match self {
            Context::Global => "Global",
            Context::Config => "Config",
            Context::Subscriptions => "Subscriptions",
            Context::Posts => "Posts",
            Context::Stats => "Stats",
            Context::Form => "Forms",
            Context::Confirm => "Confirm",
        }
    }
}

// ============================================================================
// Key Specification
// ============================================================================

/// A key event: code + modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeySpec {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeySpec {
    pub const fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub const fn ch(c: char) -> Self {
        Self::plain(KeyCode::Char(c))
    }

    pub const fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }
}

/// Parse a key string from config into a KeySpec.
///
/// Supported formats:
/// - Single char: "q", "j", "/"
/// - Named keys: "Enter", "Esc", "Tab", "BackTab", "Up", "Down", "Home", ...
/// - Modifier combos: "Ctrl+d"
/// - Function keys: "F1" through "F12"
fn parse_key_string(s: &str) -> Option<KeySpec> {
    let s = s.trim();

    if let Some(rest) = s.strip_prefix("Ctrl+") {
        let mut chars = rest.trim().chars();
        return match (chars.next(), chars.next()) {
            (Some(c), None) => Some(KeySpec::ctrl(c)),
            _ => None,
        };
    }

    let named = match s.to_lowercase().as_str() {
        "enter" | "return" => Some(KeyCode::Enter),
        "esc" | "escape" => Some(KeyCode::Esc),
        "tab" => Some(KeyCode::Tab),
        "backtab" | "shift+tab" => Some(KeyCode::BackTab),
        "up" => Some(KeyCode::Up),
        "down" => Some(KeyCode::Down),
        "left" => Some(KeyCode::Left),
        "right" => Some(KeyCode::Right),
        "home" => Some(KeyCode::Home),
        "end" => Some(KeyCode::End),
        "pageup" => Some(KeyCode::PageUp),
        "pagedown" => Some(KeyCode::PageDown),
        "delete" | "del" => Some(KeyCode::Delete),
        "backspace" => Some(KeyCode::Backspace),
        "space" => Some(KeyCode::Char(' ')),
        _ => None,
    };
    if let Some(code) = named {
        return Some(KeySpec::plain(code));
    }

    if let Some(n) = s
        .strip_prefix(['F', 'f'])
        .and_then(|n| n.parse::<u8>().ok())
    {
        return (1..=12)
            .contains(&n)
            .then(|| KeySpec::plain(KeyCode::F(n)));
    }

    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(KeySpec::ch(c)),
        _ => None,
    }
}

/// Format a KeySpec as a human-readable string for the help screen.
pub fn format_key(key: &KeySpec) -> String {
    let modifier = if key.modifiers.contains(KeyModifiers::CONTROL) {
        "Ctrl+"
    } else {
        ""
    };

    let key_name = match key.code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::BackTab => "Shift+Tab".to_string(),
        KeyCode::Up => "Up".to_string(),
        KeyCode::Down => "Down".to_string(),
        KeyCode::Left => "Left".to_string(),
        KeyCode::Right => "Right".to_string(),
        KeyCode::Home => "Home".to_string(),
        KeyCode::End => "End".to_string(),
        KeyCode::PageUp => "PageUp".to_string(),
        KeyCode::PageDown => "PageDown".to_string(),
        KeyCode::Delete => "Del".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::F(n) => format!("F{}", n),
        _ => "?".to_string(),
    };

    format!("{}{}", modifier, key_name)
}

// ============================================================================
// Keybinding Registry
// ============================================================================

const DEFAULT_BINDINGS: &[(Context, KeySpec, Action)] = &[
    (Context::Global, KeySpec::ch('q'), Action::Quit),
    (Context::Global, KeySpec::ctrl('c'), Action::Quit),
    (Context::Global, KeySpec::ch('L'), Action::Logout),
    (Context::Global, KeySpec::ch('?'), Action::ShowHelp),
    (Context::Global, KeySpec::plain(KeyCode::Esc), Action::Back),
    (Context::Global, KeySpec::plain(KeyCode::Tab), Action::NextTab),
    (Context::Global, KeySpec::plain(KeyCode::BackTab), Action::PrevTab),
    (Context::Global, KeySpec::ch('1'), Action::TabConfig),
    (Context::Global, KeySpec::ch('2'), Action::TabSubscriptions),
    (Context::Global, KeySpec::ch('3'), Action::TabPosts),
    (Context::Global, KeySpec::ch('4'), Action::TabStats),
    (Context::Global, KeySpec::ch('j'), Action::NavDown),
    (Context::Global, KeySpec::plain(KeyCode::Down), Action::NavDown),
    (Context::Global, KeySpec::ch('k'), Action::NavUp),
    (Context::Global, KeySpec::plain(KeyCode::Up), Action::NavUp),
    (Context::Global, KeySpec::ch('r'), Action::Refresh),
    // Config tab
    (Context::Config, KeySpec::ch('b'), Action::SetBotToken),
    (Context::Config, KeySpec::ch('t'), Action::TestBot),
    (Context::Config, KeySpec::ch('m'), Action::SendTestMessage),
    (Context::Config, KeySpec::ch('u'), Action::UnbindUser),
    (Context::Config, KeySpec::ch('s'), Action::ToggleStopPush),
    (Context::Config, KeySpec::ch('o'), Action::ToggleOnlyTitle),
    // Subscriptions tab
    (Context::Subscriptions, KeySpec::ch('a'), Action::AddSubscription),
    (Context::Subscriptions, KeySpec::ch('d'), Action::DeleteSubscription),
    (Context::Subscriptions, KeySpec::plain(KeyCode::Delete), Action::DeleteSubscription),
    // Posts tab
    (Context::Posts, KeySpec::ch('/'), Action::EditFilters),
    (Context::Posts, KeySpec::ch('c'), Action::ClearFilters),
    (Context::Posts, KeySpec::ch('n'), Action::NextPage),
    (Context::Posts, KeySpec::plain(KeyCode::Right), Action::NextPage),
    (Context::Posts, KeySpec::ch('p'), Action::PrevPage),
    (Context::Posts, KeySpec::plain(KeyCode::Left), Action::PrevPage),
    (Context::Posts, KeySpec::plain(KeyCode::Home), Action::FirstPage),
    (Context::Posts, KeySpec::plain(KeyCode::End), Action::LastPage),
    (Context::Posts, KeySpec::ch('g'), Action::GotoPage),
    (Context::Posts, KeySpec::ch('o'), Action::OpenInBrowser),
    (Context::Posts, KeySpec::plain(KeyCode::Enter), Action::OpenInBrowser),
    (Context::Posts, KeySpec::ch('f'), Action::FetchRss),
    // Forms
    (Context::Form, KeySpec::plain(KeyCode::Enter), Action::Submit),
    (Context::Form, KeySpec::plain(KeyCode::Esc), Action::Cancel),
    (Context::Form, KeySpec::plain(KeyCode::Tab), Action::NextField),
    (Context::Form, KeySpec::plain(KeyCode::Down), Action::NextField),
    (Context::Form, KeySpec::plain(KeyCode::BackTab), Action::PrevField),
    (Context::Form, KeySpec::plain(KeyCode::Up), Action::PrevField),
    // Confirmation
    (Context::Confirm, KeySpec::ch('y'), Action::Confirm),
    (Context::Confirm, KeySpec::plain(KeyCode::Enter), Action::Confirm),
    (Context::Confirm, KeySpec::ch('n'), Action::Deny),
    (Context::Confirm, KeySpec::plain(KeyCode::Esc), Action::Deny),
];

/// Registry of keybindings, supporting default bindings and config overrides.
///
/// The same key can map to different actions in different contexts. Tab
/// contexts fall back to `Global`; modal contexts do not.
pub struct KeybindingRegistry {
    lookup: HashMap<(Context, KeySpec), Action>,
    bindings: Vec<(Context, KeySpec, Action)>,
}

impl KeybindingRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            lookup: HashMap::new(),
            bindings: Vec::new(),
        };
        for &(context, key, action) in DEFAULT_BINDINGS {
            registry.bind(context, key, action);
        }
        registry
    }

    fn bind(&mut self, context: Context, key: KeySpec, action: Action) {
        self.lookup.insert((context, key), action);
        self.bindings.push((context, key, action));
    }

    /// Apply user overrides from the config `[keybindings]` table.
    ///
    /// Keys in the map are action names (e.g. "quit", "fetch_rss"); values
    /// are key strings (e.g. "q", "Ctrl+r", "F5"). The new key replaces every
    /// default key of that action in each context where it was bound.
    ///
    /// Returns warnings for unrecognized action names or unparseable keys.
    pub fn apply_overrides(&mut self, overrides: &HashMap<String, String>) -> Vec<String> {
        let mut warnings = Vec::new();

        for (action_name, key_str) in overrides {
            let Some(action) = parse_action_name(action_name) else {
                warnings.push(format!("Unknown action '{}', ignoring", action_name));
                continue;
            };

            let Some(key) = parse_key_string(key_str) else {
                warnings.push(format!(
                    "Cannot parse key '{}' for action '{}', ignoring",
                    key_str, action_name
                ));
                continue;
            };

            let mut contexts: Vec<Context> = Vec::new();
            for (ctx, _, a) in &self.bindings {
                if *a == action && !contexts.contains(ctx) {
                    contexts.push(*ctx);
                }
            }

            self.lookup.retain(|_, a| *a != action);
            self.bindings.retain(|(_, _, a)| *a != action);

            for ctx in contexts {
                if let Some(previous) = self.lookup.get(&(ctx, key)).copied() {
                    warnings.push(format!(
                        "Key '{}' for '{}' replaces '{}' in {} context",
                        key_str,
                        action.name(),
                        previous.name(),
                        ctx.label()
                    ));
                    self.bindings
                        .retain(|(c, k, _)| !(*c == ctx && *k == key));
                }
                self.bind(ctx, key, action);
            }

            tracing::info!(action = %action_name, key = %key_str, "Applied keybinding override");
        }

        warnings
    }

    /// Look up the action for a key in a context.
    ///
    /// Tries the specific context first, then falls back to `Global` unless
    /// the context is modal.
    pub fn action_for_key(
        &self,
        code: KeyCode,
        modifiers: KeyModifiers,
        context: Context,
    ) -> Option<Action> {
        // Shift is already folded into the character (and into BackTab).
        let modifiers = match code {
            KeyCode::Char(_) | KeyCode::BackTab => modifiers.difference(KeyModifiers::SHIFT),
            _ => modifiers,
        };
        let key = KeySpec::new(code, modifiers);

        if let Some(&action) = self.lookup.get(&(context, key)) {
            return Some(action);
        }

        if context != Context::Global && !context.is_modal() {
            return self.lookup.get(&(Context::Global, key)).copied();
        }

        None
    }

    /// Keys bound to `action` in `context`, formatted for hints.
    pub fn keys_for(&self, context: Context, action: Action) -> Vec<String> {
        self.bindings
            .iter()
            .filter(|(c, _, a)| *c == context && *a == action)
            .map(|(_, k, _)| format_key(k))
            .collect()
    }

    /// Every binding for the help screen:
    /// `(context, key display, action, description)`.
    pub fn all_bindings(&self) -> Vec<(Context, String, Action, &'static str)> {
        self.bindings
            .iter()
            .map(|(ctx, key, action)| (*ctx, format_key(key), *action, action.describe()))
            .collect()
    }
}

impl Default for KeybindingRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a config action name. Accepts the canonical snake_case name, or
/// the same without underscores.
fn parse_action_name(name: &str) -> Option<Action> {
    let wanted = name.trim().to_lowercase().replace(['-', '_'], "");
    Action::ALL
        .into_iter()
        .find(|a| a.name().replace('_', "") == wanted)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_has_quit() {
        let reg = KeybindingRegistry::new();
        let action = reg.action_for_key(KeyCode::Char('q'), KeyModifiers::NONE, Context::Global);
        assert_eq!(action, Some(Action::Quit));
    }

    #[test]
    fn test_tab_contexts_fall_back_to_global() {
        let reg = KeybindingRegistry::new();
        assert_eq!(
            reg.action_for_key(KeyCode::Char('j'), KeyModifiers::NONE, Context::Posts),
            Some(Action::NavDown)
        );
        assert_eq!(
            reg.action_for_key(KeyCode::Char('3'), KeyModifiers::NONE, Context::Stats),
            Some(Action::TabPosts)
        );
    }

    #[test]
    fn test_same_key_differs_by_tab() {
        let reg = KeybindingRegistry::new();
        assert_eq!(
            reg.action_for_key(KeyCode::Char('o'), KeyModifiers::NONE, Context::Posts),
            Some(Action::OpenInBrowser)
        );
        assert_eq!(
            reg.action_for_key(KeyCode::Char('o'), KeyModifiers::NONE, Context::Config),
            Some(Action::ToggleOnlyTitle)
        );
        assert_eq!(
            reg.action_for_key(KeyCode::Char('o'), KeyModifiers::NONE, Context::Stats),
            None
        );
    }

    #[test]
    fn test_form_context_does_not_fall_back() {
        let reg = KeybindingRegistry::new();
        // 'q' must be typeable inside a form
        assert_eq!(
            reg.action_for_key(KeyCode::Char('q'), KeyModifiers::NONE, Context::Form),
            None
        );
        assert_eq!(
            reg.action_for_key(KeyCode::Enter, KeyModifiers::NONE, Context::Form),
            Some(Action::Submit)
        );
        assert_eq!(
            reg.action_for_key(KeyCode::Esc, KeyModifiers::NONE, Context::Confirm),
            Some(Action::Deny)
        );
    }

    #[test]
    fn test_shift_folded_into_char() {
        let reg = KeybindingRegistry::new();
        assert_eq!(
            reg.action_for_key(KeyCode::Char('L'), KeyModifiers::SHIFT, Context::Posts),
            Some(Action::Logout)
        );
        assert_eq!(
            reg.action_for_key(KeyCode::BackTab, KeyModifiers::SHIFT, Context::Global),
            Some(Action::PrevTab)
        );
    }

    #[test]
    fn test_unknown_key_returns_none() {
        let reg = KeybindingRegistry::new();
        assert_eq!(
            reg.action_for_key(KeyCode::F(12), KeyModifiers::NONE, Context::Global),
            None
        );
    }

    #[test]
    fn test_apply_overrides_valid() {
        let mut reg = KeybindingRegistry::new();
        let mut overrides = HashMap::new();
        overrides.insert("fetch_rss".to_string(), "F5".to_string());

        let warnings = reg.apply_overrides(&overrides);
        assert!(warnings.is_empty());

        assert_eq!(
            reg.action_for_key(KeyCode::Char('f'), KeyModifiers::NONE, Context::Posts),
            None
        );
        assert_eq!(
            reg.action_for_key(KeyCode::F(5), KeyModifiers::NONE, Context::Posts),
            Some(Action::FetchRss)
        );
    }

    #[test]
    fn test_override_replaces_all_keys_of_action() {
        let mut reg = KeybindingRegistry::new();
        let mut overrides = HashMap::new();
        overrides.insert("nextpage".to_string(), "l".to_string());
        assert!(reg.apply_overrides(&overrides).is_empty());

        assert_eq!(reg.keys_for(Context::Posts, Action::NextPage), vec!["l"]);
        assert_eq!(
            reg.action_for_key(KeyCode::Right, KeyModifiers::NONE, Context::Posts),
            None
        );
    }

    #[test]
    fn test_override_collision_warns() {
        let mut reg = KeybindingRegistry::new();
        let mut overrides = HashMap::new();
        overrides.insert("fetch_rss".to_string(), "c".to_string());

        let warnings = reg.apply_overrides(&overrides);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("clear_filters"));
        assert_eq!(
            reg.action_for_key(KeyCode::Char('c'), KeyModifiers::NONE, Context::Posts),
            Some(Action::FetchRss)
        );
        assert!(reg.keys_for(Context::Posts, Action::ClearFilters).is_empty());
    }

    #[test]
    fn test_apply_overrides_unknown_action() {
        let mut reg = KeybindingRegistry::new();
        let mut overrides = HashMap::new();
        overrides.insert("mark_all_read".to_string(), "q".to_string());

        let warnings = reg.apply_overrides(&overrides);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("Unknown action"));
    }

    #[test]
    fn test_apply_overrides_bad_key() {
        let mut reg = KeybindingRegistry::new();
        let mut overrides = HashMap::new();
        overrides.insert("quit".to_string(), "Ctrl+Alt+Shift+Q".to_string());

        let warnings = reg.apply_overrides(&overrides);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("Cannot parse key"));
    }

    #[test]
    fn test_parse_key_string() {
        assert_eq!(parse_key_string("Enter"), Some(KeySpec::plain(KeyCode::Enter)));
        assert_eq!(parse_key_string("esc"), Some(KeySpec::plain(KeyCode::Esc)));
        assert_eq!(parse_key_string("Home"), Some(KeySpec::plain(KeyCode::Home)));
        assert_eq!(parse_key_string("space"), Some(KeySpec::ch(' ')));
        assert_eq!(parse_key_string("F12"), Some(KeySpec::plain(KeyCode::F(12))));
        assert_eq!(parse_key_string("F13"), None);
        assert_eq!(parse_key_string("Ctrl+r"), Some(KeySpec::ctrl('r')));
        assert_eq!(parse_key_string("/"), Some(KeySpec::ch('/')));
        assert_eq!(parse_key_string("é"), Some(KeySpec::ch('é')));
        assert_eq!(parse_key_string("xy"), None);
    }

    #[test]
    fn test_parse_action_name_variants() {
        assert_eq!(parse_action_name("fetch_rss"), Some(Action::FetchRss));
        assert_eq!(parse_action_name("FetchRss"), Some(Action::FetchRss));
        assert_eq!(parse_action_name("fetch-rss"), Some(Action::FetchRss));
        assert_eq!(parse_action_name("bogus"), None);
    }

    #[test]
    fn test_every_action_name_round_trips() {
        for action in Action::ALL {
            assert_eq!(parse_action_name(action.name()), Some(action));
        }
    }

    #[test]
    fn test_format_key_display() {
        assert_eq!(format_key(&KeySpec::ch('q')), "q");
        assert_eq!(format_key(&KeySpec::ctrl('c')), "Ctrl+c");
        assert_eq!(format_key(&KeySpec::plain(KeyCode::BackTab)), "Shift+Tab");
        assert_eq!(format_key(&KeySpec::plain(KeyCode::F(5))), "F5");
    }
}
