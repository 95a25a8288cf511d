//! Load/save diagnostics.
//!
//! Non-fatal issues encountered while reading or writing are collected as
//! `Notification` items on the document rather than being silently dropped.
//! Reference fallbacks substituted during resolution land here too, so a
//! caller can audit what a permissive load actually did.

use std::fmt;

/// Severity / category of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    /// A section or object type is not implemented and was skipped
    NotImplemented,
    /// Recovered warning (duplicate key, odd flag value, ...)
    Warning,
    /// Error that was recovered from in failsafe mode
    Error,
    /// A dangling reference was replaced by its fallback object
    Substituted,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotImplemented => write!(f, "NotImplemented"),
            Self::Warning => write!(f, "Warning"),
            Self::Error => write!(f, "Error"),
            Self::Substituted => write!(f, "Substituted"),
        }
    }
}

/// A single diagnostic produced during reading or writing
#[derive(Debug, Clone)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn new(kind: NotificationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

/// Diagnostics accumulated during one read/write pass
#[derive(Debug, Clone, Default)]
pub struct NotificationCollection {
    items: Vec<Notification>,
}

impl NotificationCollection {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Record a notification
    pub fn notify(&mut self, kind: NotificationKind, message: impl Into<String>) {
        self.items.push(Notification::new(kind, message));
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Notification> {
        self.items.iter()
    }

    /// Whether any notification of the given kind exists
    pub fn has_kind(&self, kind: NotificationKind) -> bool {
        self.items.iter().any(|n| n.kind == kind)
    }

    /// Drop all collected notifications
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<'a> IntoIterator for &'a NotificationCollection {
    type Item = &'a Notification;
    type IntoIter = std::slice::Iter<'a, Notification>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_basics() {
        let mut c = NotificationCollection::new();
        assert!(c.is_empty());

        c.notify(NotificationKind::Warning, "w1");
        c.notify(NotificationKind::Substituted, "layer 'MISSING' -> '0'");

        assert_eq!(c.len(), 2);
        assert!(c.has_kind(NotificationKind::Substituted));
        assert!(!c.has_kind(NotificationKind::Error));
    }

    #[test]
    fn test_display() {
        let n = Notification::new(NotificationKind::NotImplemented, "THUMBNAILIMAGE section");
        assert_eq!(format!("{}", n), "[NotImplemented] THUMBNAILIMAGE section");
    }
}
