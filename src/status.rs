//! The single shared status line.
//!
//! Only the most recent message is visible; severity is nothing more than
//! the green/red/orange color convention.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Green
    Success,
    /// Red
    Error,
    /// Orange, informational (e.g. a cancelled dialog)
    Notice,
}

#[derive(Debug, Clone)]
pub struct StatusLine {
    text: String,
    severity: Severity,
}

impl Default for StatusLine {
    fn default() -> Self {
        Self {
            text: String::new(),
            severity: Severity::Success,
        }
    }
}

impl StatusLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_success(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.severity = Severity::Success;
    }

    pub fn set_error(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.severity = Severity::Error;
    }

    pub fn set_notice(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.severity = Severity::Notice;
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_empty() {
        let status = StatusLine::new();
        assert!(status.is_empty());
    }

    #[test]
    fn test_only_latest_message_is_kept() {
        let mut status = StatusLine::new();
        status.set_success("Crowd Model Loaded");
        status.set_error("Failed to read image");

        assert_eq!(status.text(), "Failed to read image");
        assert_eq!(status.severity(), Severity::Error);
    }

    #[test]
    fn test_cancellation_is_a_notice() {
        let mut status = StatusLine::new();
        status.set_notice("Video selection cancelled.");
        assert_eq!(status.severity(), Severity::Notice);
        assert_eq!(status.text(), "Video selection cancelled.");
    }
}
