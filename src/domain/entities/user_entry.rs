use std::fmt;

/// Base URL for public Telegram profile and channel links
pub const TME_BASE: &str = "https://t.me/";

/// A person or channel found in an export
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct UserEntry {
    /// Handle without the leading `@`
    pub username: Option<String>,
    pub display_name: Option<String>,
    pub link: Option<String>,
}

impl UserEntry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entry for a bare `@handle` / `t.me/handle` reference
    pub fn from_handle(handle: impl Into<String>) -> Self {
        let handle = handle.into();
        Self {
            link: Some(format!("{}{}", TME_BASE, handle)),
            username: Some(handle),
            display_name: None,
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    pub fn username(&self) -> Option<&str> {
        non_blank(self.username.as_deref())
    }

    pub fn display_name(&self) -> Option<&str> {
        non_blank(self.display_name.as_deref())
    }

    pub fn link(&self) -> Option<&str> {
        non_blank(self.link.as_deref())
    }
}

impl fmt::Display for UserEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = self.display_name() {
            write!(f, "{}", name)
        } else if let Some(username) = self.username() {
            write!(f, "@{}", username)
        } else if let Some(link) = self.link() {
            write!(f, "{}", link)
        } else {
            write!(f, "(unknown)")
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
