//! Identifier interning.
//!
//! The front end refers to every name (struct, field, function, variable,
//! label, literal token) through an [`Id`] handle. [`IdMap`] is the
//! bidirectional table between handles and their printable strings.
//!
//! On the wire the table is a plain JSON array of strings: id `n` is the
//! `n`th entry. Entry 0 is always the empty string.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::PackageError;

/// A handle to an interned identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id(pub u32);

impl Id {
    /// The reserved handle for the empty string.
    pub const NONE: Id = Id(0);
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Bidirectional identifier ↔ string table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct IdMap {
    names: Vec<String>,
    by_name: HashMap<String, Id>,
}

impl IdMap {
    pub fn new() -> Self {
        let mut by_name = HashMap::new();
        by_name.insert(String::new(), Id::NONE);
        Self {
            names: vec![String::new()],
            by_name,
        }
    }

    /// Intern `name`, returning its existing handle if already present.
    pub fn intern(&mut self, name: &str) -> Id {
        if let Some(&id) = self.by_name.get(name) {
            return id;
        }
        let id = Id(self.names.len() as u32);
        self.names.push(name.to_string());
        self.by_name.insert(name.to_string(), id);
        id
    }

    /// Find the handle of an already-interned name.
    pub fn lookup(&self, name: &str) -> Option<Id> {
        self.by_name.get(name).copied()
    }

    /// Resolve a handle to its string.
    pub fn get(&self, id: Id) -> Option<&str> {
        self.names.get(id.0 as usize).map(String::as_str)
    }

    /// Number of interned names, including the reserved empty string.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.len() <= 1
    }
}

impl Default for IdMap {
    fn default() -> Self {
        Self::new()
    }
}

impl TryFrom<Vec<String>> for IdMap {
    type Error = PackageError;

    fn try_from(names: Vec<String>) -> Result<Self, Self::Error> {
        if names.is_empty() {
            return Ok(Self::new());
        }
        if !names[0].is_empty() {
            return Err(PackageError::MalformedIdTable(format!(
                "entry 0 must be the empty string, found {:?}",
                names[0]
            )));
        }
        let mut by_name = HashMap::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            if by_name.insert(name.clone(), Id(i as u32)).is_some() {
                return Err(PackageError::MalformedIdTable(format!(
                    "duplicate entry {name:?} at index {i}"
                )));
            }
        }
        Ok(Self { names, by_name })
    }
}

impl From<IdMap> for Vec<String> {
    fn from(map: IdMap) -> Self {
        map.names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_is_idempotent() {
        let mut ids = IdMap::new();
        let a = ids.intern("decoder");
        let b = ids.intern("decoder");
        assert_eq!(a, b);
        assert_eq!(ids.get(a), Some("decoder"));
        assert_eq!(ids.lookup("decoder"), Some(a));
        assert_eq!(ids.lookup("missing"), None);
    }

    #[test]
    fn handles_are_dense_and_ordered() {
        let mut ids = IdMap::new();
        assert_eq!(ids.intern("a"), Id(1));
        assert_eq!(ids.intern("b"), Id(2));
        assert_eq!(ids.get(Id::NONE), Some(""));
        assert_eq!(ids.get(Id(3)), None);
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn serializes_as_string_array() {
        let mut ids = IdMap::new();
        ids.intern("this");
        ids.intern("x");
        let json = serde_json::to_string(&ids).unwrap();
        assert_eq!(json, r#"["","this","x"]"#);
        let back: IdMap = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ids);
        assert_eq!(back.lookup("x"), Some(Id(2)));
    }

    #[test]
    fn rejects_duplicate_entries() {
        let err = serde_json::from_str::<IdMap>(r#"["","x","x"]"#).unwrap_err();
        assert!(err.to_string().contains("duplicate"), "{err}");
    }

    #[test]
    fn rejects_missing_reserved_entry() {
        assert!(serde_json::from_str::<IdMap>(r#"["x"]"#).is_err());
    }
}
