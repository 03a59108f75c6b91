//! Boundary input types
//!
//! Request bodies arrive as JSON or multipart forms, where a list field can be
//! absent, a single value, an array, or a JSON-encoded array string. These
//! types collapse every shape into one ordered, duplicate-free sequence so
//! the catalog logic never branches on shape.

use crate::error::{MusicifyError, Result};
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Ordered set of entity identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct IdList(Vec<i64>);

impl IdList {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Normalize any request shape into an id list.
    pub fn from_value(value: &Value) -> Result<Self> {
        let mut ids = Self::new();
        ids.extend_from_value(value, true)?;
        Ok(ids)
    }

    fn extend_from_value(&mut self, value: &Value, top_level: bool) -> Result<()> {
        match value {
            Value::Null => Ok(()),
            // Objects carry no ids
            Value::Object(_) if top_level => Ok(()),
            Value::Number(n) => {
                let id = n
                    .as_i64()
                    .ok_or_else(|| MusicifyError::validation(format!("Malformed id: {}", n)))?;
                self.push(id);
                Ok(())
            }
            Value::String(s) => {
                let s = s.trim();
                if s.is_empty() {
                    return Ok(());
                }
                if top_level && s.starts_with('[') {
                    let inner: Value = serde_json::from_str(s)
                        .map_err(|_| MusicifyError::validation(format!("Malformed id list: {}", s)))?;
                    return self.extend_from_value(&inner, false);
                }
                let id = s
                    .parse::<i64>()
                    .map_err(|_| MusicifyError::validation(format!("Malformed id: {}", s)))?;
                self.push(id);
                Ok(())
            }
            Value::Array(items) if top_level || items.iter().all(|v| !v.is_array()) => {
                for item in items {
                    if item.is_array() || item.is_object() {
                        return Err(MusicifyError::validation("Nested id lists are not allowed"));
                    }
                    self.extend_from_value(item, false)?;
                }
                Ok(())
            }
            other => Err(MusicifyError::validation(format!("Malformed id: {}", other))),
        }
    }

    /// Append an id unless already present. Returns whether it was added.
    pub fn push(&mut self, id: i64) -> bool {
        if self.0.contains(&id) {
            return false;
        }
        self.0.push(id);
        true
    }

    pub fn contains(&self, id: i64) -> bool {
        self.0.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = i64> + '_ {
        self.0.iter().copied()
    }

    pub fn as_slice(&self) -> &[i64] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<i64> {
        self.0
    }

    /// Ids in `self` that are not in `other`, in `self`'s order.
    pub fn difference(&self, other: &IdList) -> IdList {
        self.iter().filter(|id| !other.contains(*id)).collect()
    }

    /// `self` followed by the ids of `other` not already present.
    pub fn union(&self, other: &IdList) -> IdList {
        let mut out = self.clone();
        for id in other.iter() {
            out.push(id);
        }
        out
    }
}

impl FromIterator<i64> for IdList {
    fn from_iter<T: IntoIterator<Item = i64>>(iter: T) -> Self {
        let mut ids = IdList::new();
        for id in iter {
            ids.push(id);
        }
        ids
    }
}

impl From<Vec<i64>> for IdList {
    fn from(ids: Vec<i64>) -> Self {
        ids.into_iter().collect()
    }
}

impl<'de> Deserialize<'de> for IdList {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        IdList::from_value(&value).map_err(de::Error::custom)
    }
}

/// Ordered set of free-text names (inline genre names).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NameList(Vec<String>);

impl NameList {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn from_value(value: &Value) -> Result<Self> {
        let mut names = Self::new();
        names.extend_from_value(value, true)?;
        Ok(names)
    }

    fn extend_from_value(&mut self, value: &Value, top_level: bool) -> Result<()> {
        match value {
            Value::Null => Ok(()),
            Value::Object(_) if top_level => Ok(()),
            Value::String(s) => {
                if top_level && s.trim_start().starts_with('[') {
                    if let Ok(inner @ Value::Array(_)) = serde_json::from_str::<Value>(s) {
                        return self.extend_from_value(&inner, false);
                    }
                }
                self.push(s);
                Ok(())
            }
            Value::Number(n) => {
                self.push(&n.to_string());
                Ok(())
            }
            Value::Array(items) if top_level => {
                for item in items {
                    self.extend_from_value(item, false)?;
                }
                Ok(())
            }
            Value::Array(items) => {
                for item in items {
                    match item {
                        Value::String(_) | Value::Number(_) | Value::Null => {
                            self.extend_from_value(item, false)?;
                        }
                        _ => return Err(MusicifyError::validation("Malformed name list")),
                    }
                }
                Ok(())
            }
            _ => Err(MusicifyError::validation("Malformed name list")),
        }
    }

    /// Append a trimmed name; blanks and exact repeats are dropped.
    pub fn push(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || self.0.iter().any(|n| n == name) {
            return false;
        }
        self.0.push(name.to_string());
        true
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.iter().map(String::as_str)
    }
}

impl<S: AsRef<str>> FromIterator<S> for NameList {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        let mut names = NameList::new();
        for name in iter {
            names.push(name.as_ref());
        }
        names
    }
}

impl<'de> Deserialize<'de> for NameList {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        NameList::from_value(&value).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_id_list_shapes() {
        assert!(IdList::from_value(&Value::Null).unwrap().is_empty());
        assert!(IdList::from_value(&json!({})).unwrap().is_empty());
        assert_eq!(IdList::from_value(&json!("7")).unwrap().as_slice(), &[7]);
        assert_eq!(IdList::from_value(&json!(7)).unwrap().as_slice(), &[7]);
        assert_eq!(
            IdList::from_value(&json!(["2", 1, " 3 "])).unwrap().as_slice(),
            &[2, 1, 3]
        );
        assert_eq!(IdList::from_value(&json!("[4,\"5\"]")).unwrap().as_slice(), &[4, 5]);
        assert!(IdList::from_value(&json!("")).unwrap().is_empty());
    }

    #[test]
    fn test_id_list_deduplicates_in_order() {
        let ids = IdList::from_value(&json!([3, 1, 3, 2, 1])).unwrap();
        assert_eq!(ids.as_slice(), &[3, 1, 2]);
    }

    #[test]
    fn test_id_list_rejects_malformed() {
        assert!(IdList::from_value(&json!("abc")).is_err());
        assert!(IdList::from_value(&json!([1, "x"])).is_err());
        assert!(IdList::from_value(&json!([[1]])).is_err());
        assert!(IdList::from_value(&json!(true)).is_err());
        assert!(IdList::from_value(&json!(1.5)).is_err());
    }

    #[test]
    fn test_id_list_set_operations() {
        let old: IdList = vec![1, 2].into();
        let new: IdList = vec![2, 3].into();
        assert_eq!(old.difference(&new).as_slice(), &[1]);
        assert_eq!(new.difference(&old).as_slice(), &[3]);
        assert_eq!(old.union(&new).as_slice(), &[1, 2, 3]);
    }

    #[test]
    fn test_id_list_deserialize_field() {
        #[derive(Deserialize)]
        struct Form {
            #[serde(default)]
            genres: IdList,
        }

        let form: Form = serde_json::from_value(json!({})).unwrap();
        assert!(form.genres.is_empty());
        let form: Form = serde_json::from_value(json!({ "genres": "9" })).unwrap();
        assert_eq!(form.genres.as_slice(), &[9]);
        assert!(serde_json::from_value::<Form>(json!({ "genres": "nope" })).is_err());
    }

    #[test]
    fn test_name_list_shapes() {
        assert!(NameList::from_value(&Value::Null).unwrap().is_empty());
        let single = NameList::from_value(&json!("  Jazz ")).unwrap();
        assert_eq!(single.iter().collect::<Vec<_>>(), vec!["Jazz"]);

        let many = NameList::from_value(&json!(["Rock", "", "Rock", "Blues"])).unwrap();
        assert_eq!(many.iter().collect::<Vec<_>>(), vec!["Rock", "Blues"]);

        let encoded = NameList::from_value(&json!("[\"Lo-fi\",\"Ambient\"]")).unwrap();
        assert_eq!(encoded.len(), 2);
    }
}
