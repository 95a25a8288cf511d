//! Group object

use crate::types::Handle;

/// A named selection group of entities
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    /// Unique handle
    pub handle: Handle,
    /// Group name
    pub name: String,
    /// Description text
    pub description: String,
    /// Whether selecting one member selects the group
    pub is_selectable: bool,
    /// Handles of the member entities
    pub entity_handles: Vec<Handle>,
}

impl Group {
    /// Create an empty group
    pub fn new(name: impl Into<String>) -> Self {
        Group {
            handle: Handle::NULL,
            name: name.into(),
            description: String::new(),
            is_selectable: true,
            entity_handles: Vec::new(),
        }
    }

    /// Add a member entity by handle
    pub fn add(&mut self, handle: Handle) {
        if !self.entity_handles.contains(&handle) {
            self.entity_handles.push(handle);
        }
    }

    /// Remove a member entity by handle; returns whether it was a member
    pub fn remove(&mut self, handle: Handle) -> bool {
        let before = self.entity_handles.len();
        self.entity_handles.retain(|h| *h != handle);
        self.entity_handles.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_membership() {
        let mut group = Group::new("G1");
        group.add(Handle::new(1));
        group.add(Handle::new(1));
        assert_eq!(group.entity_handles.len(), 1);
        assert!(group.remove(Handle::new(1)));
        assert!(!group.remove(Handle::new(1)));
    }
}
