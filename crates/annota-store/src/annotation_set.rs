//! In-memory annotation structure of one data object.

use annota_core::{Annotation, Annotations, Location, MetadataObject};
use serde_json::Value as JsonValue;

use crate::error::{Result, StoreError};

/// Annotations held by an open data object, keyed by annotator then type
/// name. Reads hand out copies.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnotationSet {
    entries: Annotations,
}

impl AnnotationSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_annotations(entries: Annotations) -> Self {
        Self { entries }
    }

    /// Copy of the whole structure.
    pub fn snapshot(&self) -> Annotations {
        self.entries.clone()
    }

    pub fn as_annotations(&self) -> &Annotations {
        &self.entries
    }

    pub fn annotators(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// Annotations of `type_name` by `annotator`; empty when either is unknown.
    pub fn get(&self, annotator: &str, type_name: &str) -> Vec<Annotation> {
        self.entries
            .get(annotator)
            .and_then(|per_type| per_type.get(type_name))
            .cloned()
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn len(&self) -> usize {
        self.entries
            .values()
            .flat_map(|per_type| per_type.values())
            .map(Vec::len)
            .sum()
    }

    pub fn add(&mut self, annotator: &str, object: MetadataObject, location: Option<Location>) {
        self.entries
            .entry(annotator.to_string())
            .or_default()
            .entry(object.type_name().to_string())
            .or_default()
            .push(Annotation::new(object, location));
    }

    /// Remove one annotation and return it.
    ///
    /// The first entry equal to `object` at exactly `location` goes; numbers
    /// in locations compare by value, so `1` matches `1.0`. With no location
    /// and no exact match, the first entry equal to `object` goes
    /// wherever it is located. Empty buckets and annotators are pruned.
    pub fn remove(
        &mut self,
        annotator: &str,
        object: &MetadataObject,
        location: Option<&Location>,
    ) -> Result<Annotation> {
        let per_type = self.entries.get_mut(annotator).ok_or_else(|| {
            StoreError::AnnotationNotFound(format!("no annotations from '{}'", annotator))
        })?;
        let type_name = object.type_name();
        let not_found = || {
            StoreError::AnnotationNotFound(format!(
                "no matching {} from '{}'",
                type_name, annotator
            ))
        };
        let bucket = per_type.get_mut(type_name).ok_or_else(not_found)?;

        let exact = bucket
            .iter()
            .position(|a| {
                a.object == *object
                    && match (a.location.as_ref(), location) {
                        (None, None) => true,
                        (Some(stored), Some(wanted)) => same_location(stored, wanted),
                        _ => false,
                    }
            });
        let index = match (exact, location) {
            (Some(index), _) => index,
            (None, None) => bucket
                .iter()
                .position(|a| a.object == *object)
                .ok_or_else(not_found)?,
            (None, Some(_)) => return Err(not_found()),
        };

        let removed = bucket.remove(index);
        if bucket.is_empty() {
            per_type.remove(type_name);
        }
        if per_type.is_empty() {
            self.entries.remove(annotator);
        }
        Ok(removed)
    }

    pub fn replace(&mut self, entries: Annotations) {
        self.entries = entries;
    }
}

fn same_location(a: &Location, b: &Location) -> bool {
    match (a, b) {
        (JsonValue::Number(x), JsonValue::Number(y)) => x.as_f64() == y.as_f64(),
        (JsonValue::Array(xs), JsonValue::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| same_location(x, y))
        }
        (JsonValue::Object(xs), JsonValue::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(key, x)| ys.get(key).is_some_and(|y| same_location(x, y)))
        }
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use annota_core::{Person, Property};
    use serde_json::json;

    fn pepper() -> MetadataObject {
        Person::named("Pepper").unwrap()
    }

    #[test]
    fn test_add_groups_by_type() {
        let mut set = AnnotationSet::new();
        set.add("alice", pepper(), None);
        set.add("alice", Property::pair("k", "v").unwrap(), None);
        set.add("bob", pepper(), Some(json!([[0, 0], [1, 1]])));

        assert_eq!(set.annotators(), vec!["alice", "bob"]);
        assert_eq!(set.get("alice", "Person").len(), 1);
        assert_eq!(set.get("alice", "Property").len(), 1);
        assert!(set.get("carol", "Person").is_empty());
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut set = AnnotationSet::new();
        set.add("alice", pepper(), None);
        let mut copy = set.snapshot();
        copy.clear();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_remove_without_location_takes_one() {
        let mut set = AnnotationSet::new();
        for x in 0..3 {
            set.add("alice", pepper(), Some(json!([[x, 0], [x + 1, 1]])));
        }
        let removed = set.remove("alice", &pepper(), None).unwrap();
        assert_eq!(removed.location, Some(json!([[0, 0], [1, 1]])));
        assert_eq!(set.get("alice", "Person").len(), 2);
    }

    #[test]
    fn test_remove_prefers_exact_location() {
        let mut set = AnnotationSet::new();
        set.add("alice", pepper(), Some(json!([[0, 0], [1, 1]])));
        set.add("alice", pepper(), None);
        let removed = set.remove("alice", &pepper(), None).unwrap();
        assert_eq!(removed.location, None);

        let loc = json!([[0, 0], [1, 1]]);
        set.remove("alice", &pepper(), Some(&loc)).unwrap();
        assert!(set.is_empty());
        assert!(set.annotators().is_empty());
    }

    #[test]
    fn test_remove_with_location_requires_exact_match() {
        let mut set = AnnotationSet::new();
        set.add("alice", pepper(), Some(json!([[0, 0], [1, 1]])));
        let other = json!([[5, 5], [6, 6]]);
        let err = set.remove("alice", &pepper(), Some(&other)).unwrap_err();
        assert!(matches!(err, StoreError::AnnotationNotFound(_)));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_remove_unknown_annotator() {
        let mut set = AnnotationSet::new();
        let err = set.remove("nobody", &pepper(), None).unwrap_err();
        assert!(err.to_string().contains("nobody"));
    }

    #[test]
    fn test_remove_different_value() {
        let mut set = AnnotationSet::new();
        set.add("alice", pepper(), None);
        let other = Person::named("Nao").unwrap();
        assert!(set.remove("alice", &other, None).is_err());
    }

    #[test]
    fn test_remove_matches_numerically_equal_location() {
        let mut set = AnnotationSet::new();
        set.add("alice", pepper(), Some(json!([[0, 0], [1, 1]])));
        set.add("alice", pepper(), Some(json!([[0, 0], [2, 2]])));

        let removed = set
            .remove("alice", &pepper(), Some(&json!([[0.0, 0.0], [1.0, 1.0]])))
            .unwrap();
        assert_eq!(removed.location, Some(json!([[0, 0], [1, 1]])));
        assert_eq!(set.get("alice", "Person").len(), 1);
        assert!(set
            .remove("alice", &pepper(), Some(&json!([[0.0, 0.0], [1.5, 1.0]])))
            .is_err());
    }
}
