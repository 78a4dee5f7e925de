//! Modal text forms: bot token, new subscription, test message, page jump.

use secrecy::SecretString;

pub const MAX_FIELD_LENGTH: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    BotToken,
    AddSubscription,
    SendTestMessage,
    GotoPage,
}

impl FormKind {
    pub fn title(self) -> &'static str {
        match self {
            FormKind::BotToken => "Set Bot Token",
            FormKind::AddSubscription => "Add Subscription",
            FormKind::SendTestMessage => "Send Test Message",
            FormKind::GotoPage => "Go to Page",
        }
    }
}

pub struct TextField {
    pub label: &'static str,
    pub value: String,
    /// Rendered as bullets.
    pub masked: bool,
    /// Only ASCII digits are accepted.
    pub numeric: bool,
}

impl TextField {
    fn new(label: &'static str) -> Self {
        Self {
            label,
            value: String::new(),
            masked: false,
            numeric: false,
        }
    }

    fn masked(mut self) -> Self {
        self.masked = true;
        self
    }

    fn numeric(mut self) -> Self {
        self.numeric = true;
        self
    }

    fn prefilled(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    /// Text to draw for this field.
    pub fn display(&self) -> String {
        if self.masked {
            "•".repeat(self.value.chars().count())
        } else {
            self.value.clone()
        }
    }
}

impl std::fmt::Debug for TextField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let value: &dyn std::fmt::Debug = if self.masked {
            &"[REDACTED]"
        } else {
            &self.value
        };
        f.debug_struct("TextField")
            .field("label", &self.label)
            .field("value", value)
            .finish()
    }
}

#[derive(Debug)]
pub struct Form {
    pub kind: FormKind,
    pub fields: Vec<TextField>,
    pub focus: usize,
}

impl Form {
    /// Token plus webhook URL, the latter prefilled with the default.
    pub fn bot_token(default_webhook: &str) -> Self {
        Self::new(
            FormKind::BotToken,
            vec![
                TextField::new("Bot token").masked(),
                TextField::new("Webhook URL (optional)").prefilled(default_webhook),
            ],
        )
    }

    pub fn add_subscription() -> Self {
        Self::new(
            FormKind::AddSubscription,
            vec![
                TextField::new("Keyword 1"),
                TextField::new("Keyword 2"),
                TextField::new("Keyword 3"),
                TextField::new("Creator"),
                TextField::new("Category"),
            ],
        )
    }

    pub fn send_test_message() -> Self {
        Self::new(
            FormKind::SendTestMessage,
            vec![TextField::new("Message (optional)")],
        )
    }

    pub fn goto_page() -> Self {
        Self::new(
            FormKind::GotoPage,
            vec![TextField::new("Page number").numeric()],
        )
    }

    fn new(kind: FormKind, fields: Vec<TextField>) -> Self {
        Self {
            kind,
            fields,
            focus: 0,
        }
    }

    pub fn value(&self, index: usize) -> &str {
        self.fields.get(index).map(|f| f.value.as_str()).unwrap_or("")
    }

    pub fn next_field(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + 1) % self.fields.len();
        }
    }

    pub fn prev_field(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
        }
    }

    pub fn push_char(&mut self, c: char) {
        if c.is_control() {
            return;
        }
        if let Some(field) = self.fields.get_mut(self.focus) {
            if field.numeric && !c.is_ascii_digit() {
                return;
            }
            if field.value.chars().count() < MAX_FIELD_LENGTH {
                field.value.push(c);
            }
        }
    }

    pub fn backspace(&mut self) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            field.value.pop();
        }
    }

    /// Move a field's trimmed value out of the form as a secret.
    pub fn take_secret(&mut self, index: usize) -> SecretString {
        let value = self
            .fields
            .get_mut(index)
            .map(|f| std::mem::take(&mut f.value))
            .unwrap_or_default();
        SecretString::from(value.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_focus_wraps() {
        let mut form = Form::add_subscription();
        form.prev_field();
        assert_eq!(form.focus, 4);
        form.next_field();
        assert_eq!(form.focus, 0);
    }

    #[test]
    fn test_typing_goes_to_focused_field() {
        let mut form = Form::add_subscription();
        form.push_char('v');
        form.next_field();
        form.push_char('x');
        form.backspace();
        form.push_char('y');
        assert_eq!(form.value(0), "v");
        assert_eq!(form.value(1), "y");
        assert_eq!(form.value(9), "");
    }

    #[test]
    fn test_numeric_field_rejects_letters() {
        let mut form = Form::goto_page();
        for c in "1a2".chars() {
            form.push_char(c);
        }
        assert_eq!(form.value(0), "12");
    }

    #[test]
    fn test_bot_token_masked_and_webhook_prefilled() {
        let mut form = Form::bot_token("https://push.example.com/telegram/webhook");
        for c in "123:abc".chars() {
            form.push_char(c);
        }
        assert_eq!(form.fields[0].display(), "•••••••");
        assert_eq!(form.value(1), "https://push.example.com/telegram/webhook");
        assert!(!format!("{:?}", form).contains("123:abc"));

        let secret = form.take_secret(0);
        assert_eq!(secret.expose_secret(), "123:abc");
        assert_eq!(form.value(0), "");
    }

    #[test]
    fn test_control_chars_ignored() {
        let mut form = Form::send_test_message();
        form.push_char('\u{1b}');
        form.push_char('\n');
        assert_eq!(form.value(0), "");
    }
}
