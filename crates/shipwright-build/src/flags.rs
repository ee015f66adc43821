//! Per-invocation flag state

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Ordered flag id to enabled map with case-insensitive lookup
///
/// Insertion order is kept so the resolver can walk flags in the order a
/// profile declares them. Setting an id that differs only in case replaces
/// the existing entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagStates {
    entries: Vec<(String, bool)>,
}

impl FlagStates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a flag state; blank ids are ignored
    pub fn set(&mut self, id: &str, enabled: bool) {
        let id = id.trim();
        if id.is_empty() {
            return;
        }
        match self.position(id) {
            Some(index) => self.entries[index].1 = enabled,
            None => self.entries.push((id.to_string(), enabled)),
        }
    }

    /// Builder form of [`FlagStates::set`]
    pub fn with(mut self, id: &str, enabled: bool) -> Self {
        self.set(id, enabled);
        self
    }

    pub fn get(&self, id: &str) -> Option<bool> {
        self.position(id.trim()).map(|index| self.entries[index].1)
    }

    /// Whether a flag is present and enabled
    pub fn is_enabled(&self, id: &str) -> bool {
        self.get(id).unwrap_or(false)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id.trim()).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.entries.iter().map(|(id, enabled)| (id.as_str(), *enabled))
    }

    /// Ids of enabled flags, in insertion order
    pub fn enabled_ids(&self) -> impl Iterator<Item = &str> {
        self.iter().filter(|(_, enabled)| *enabled).map(|(id, _)| id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(existing, _)| existing.eq_ignore_ascii_case(id))
    }
}

impl<S: AsRef<str>> FromIterator<(S, bool)> for FlagStates {
    fn from_iter<I: IntoIterator<Item = (S, bool)>>(iter: I) -> Self {
        let mut states = Self::new();
        for (id, enabled) in iter {
            states.set(id.as_ref(), enabled);
        }
        states
    }
}

impl Serialize for FlagStates {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (id, enabled) in &self.entries {
            map.serialize_entry(id, enabled)?;
        }
        map.end()
    }
}
