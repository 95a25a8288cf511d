//! Named-object registries (TABLES section)
//!
//! Each table kind (layers, line types, text styles, ...) is one `Table<T>`
//! registry. The registry owns its entries; everything else in the document
//! refers to an entry by name, so two holders of "layer X" always observe
//! the one canonical instance.

use crate::error::{DxfError, Result};
use crate::types::Handle;
use indexmap::IndexMap;

pub mod appid;
pub mod dimstyle;
pub mod layer;
pub mod linetype;
pub mod mlinestyle;
pub mod textstyle;
pub mod ucs;
pub mod view;

pub use appid::AppId;
pub use dimstyle::DimStyle;
pub use layer::{Layer, LayerFlags};
pub use linetype::{LineType, LineTypeSegment};
pub use mlinestyle::{MLineStyle, MLineStyleElement};
pub use textstyle::{TextStyle, TextStyleFlags};
pub use ucs::Ucs;
pub use view::View;

/// Base trait for all registry entries
pub trait TableEntry {
    /// Get the entry's unique handle
    fn handle(&self) -> Handle;

    /// Set the entry's handle
    fn set_handle(&mut self, handle: Handle);

    /// Get the entry's name
    fn name(&self) -> &str;

    /// Set the entry's name
    fn set_name(&mut self, name: String);

    /// Whether this is a built-in entry that cannot be renamed or removed
    fn is_reserved(&self) -> bool {
        false
    }
}

/// Case-insensitive registry key
pub(crate) fn table_key(name: &str) -> String {
    name.to_uppercase()
}

/// Generic named-object registry.
///
/// Names are case-insensitive and unique; iteration order is insertion
/// order, which keeps serialization deterministic.
#[derive(Debug, Clone)]
pub struct Table<T: TableEntry> {
    entries: IndexMap<String, T>,
    handle: Handle,
}

impl<T: TableEntry> Table<T> {
    /// Create a new empty table
    pub fn new() -> Self {
        Table {
            entries: IndexMap::new(),
            handle: Handle::NULL,
        }
    }

    /// Get the table's own handle (the table header object)
    pub fn handle(&self) -> Handle {
        self.handle
    }

    /// Set the table's handle
    pub fn set_handle(&mut self, handle: Handle) {
        self.handle = handle;
    }

    /// Add an entry, merging by name.
    ///
    /// If an entry with the same (case-insensitive) name already exists the
    /// supplied instance is discarded and the canonical existing entry is
    /// returned, so every holder of that name shares one instance. Reserved
    /// names always resolve to the reserved entry.
    pub fn add(&mut self, entry: T) -> &mut T {
        let key = table_key(entry.name());
        self.entries.entry(key).or_insert(entry)
    }

    /// Whether `add` would merge instead of insert
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&table_key(name))
    }

    /// Get an entry by name (case-insensitive)
    pub fn get(&self, name: &str) -> Option<&T> {
        self.entries.get(&table_key(name))
    }

    /// Get a mutable entry by name (case-insensitive)
    pub fn get_mut(&mut self, name: &str) -> Option<&mut T> {
        self.entries.get_mut(&table_key(name))
    }

    /// Rename an entry.
    ///
    /// Fails with `ReservedName` for built-ins and with `DuplicateName` when
    /// the new name is already taken by a different entry. On success the
    /// name index is rebuilt in place: the entry keeps its position and at
    /// no point does a lookup miss it.
    pub fn rename(&mut self, name: &str, new_name: &str) -> Result<()> {
        let old_key = table_key(name);
        let new_key = table_key(new_name);

        let entry = self
            .entries
            .get(&old_key)
            .ok_or_else(|| DxfError::NameNotFound(name.to_string()))?;
        if entry.is_reserved() {
            return Err(DxfError::ReservedName(entry.name().to_string()));
        }
        if new_key != old_key && self.entries.contains_key(&new_key) {
            return Err(DxfError::DuplicateName(new_name.to_string()));
        }

        let (index, _, mut entry) = self
            .entries
            .shift_remove_full(&old_key)
            .expect("entry checked above");
        entry.set_name(new_name.to_string());
        self.entries.shift_insert(index, new_key, entry);
        Ok(())
    }

    /// Remove an entry without reference checking.
    ///
    /// Document-level removal wraps this with the in-use and reserved
    /// checks; the registry itself only maintains the name index.
    pub(crate) fn remove_unchecked(&mut self, name: &str) -> Option<T> {
        self.entries.shift_remove(&table_key(name))
    }

    /// Get the number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over all entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.values()
    }

    /// Iterate over all entries mutably
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.entries.values_mut()
    }

    /// Get all entry names
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.values().map(|e| e.name())
    }
}

impl<T: TableEntry> Default for Table<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone)]
    struct MockEntry {
        handle: Handle,
        name: String,
        payload: i32,
    }

    impl MockEntry {
        fn new(name: &str, payload: i32) -> Self {
            MockEntry {
                handle: Handle::NULL,
                name: name.to_string(),
                payload,
            }
        }
    }

    impl TableEntry for MockEntry {
        fn handle(&self) -> Handle {
            self.handle
        }

        fn set_handle(&mut self, handle: Handle) {
            self.handle = handle;
        }

        fn name(&self) -> &str {
            &self.name
        }

        fn set_name(&mut self, name: String) {
            self.name = name;
        }

        fn is_reserved(&self) -> bool {
            self.name == "STANDARD"
        }
    }

    #[test]
    fn test_add_merges_by_name() {
        let mut table = Table::new();
        table.add(MockEntry::new("Test", 1));
        let merged = table.add(MockEntry::new("TEST", 2));
        // The canonical first instance wins
        assert_eq!(merged.payload, 1);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_case_insensitive_lookup() {
        let mut table = Table::new();
        table.add(MockEntry::new("Test", 1));
        assert!(table.contains("test"));
        assert!(table.get("TEST").is_some());
    }

    #[test]
    fn test_rename_keeps_position() {
        let mut table = Table::new();
        table.add(MockEntry::new("A", 1));
        table.add(MockEntry::new("B", 2));
        table.add(MockEntry::new("C", 3));

        table.rename("B", "Middle").unwrap();

        let names: Vec<_> = table.names().collect();
        assert_eq!(names, vec!["A", "Middle", "C"]);
        assert!(table.get("middle").is_some());
        assert!(table.get("B").is_none());
    }

    #[test]
    fn test_rename_duplicate_fails() {
        let mut table = Table::new();
        table.add(MockEntry::new("A", 1));
        table.add(MockEntry::new("B", 2));
        assert!(matches!(
            table.rename("A", "b"),
            Err(DxfError::DuplicateName(_))
        ));
    }

    #[test]
    fn test_rename_reserved_fails() {
        let mut table = Table::new();
        table.add(MockEntry::new("STANDARD", 1));
        assert!(matches!(
            table.rename("Standard", "Other"),
            Err(DxfError::ReservedName(_))
        ));
    }

    #[test]
    fn test_rename_to_same_name_different_case() {
        let mut table = Table::new();
        table.add(MockEntry::new("abc", 1));
        table.rename("abc", "ABC").unwrap();
        assert_eq!(table.names().next(), Some("ABC"));
    }
}
