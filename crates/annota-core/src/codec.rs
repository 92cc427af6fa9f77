//! Annotation codec: converts between the annotation namespace tree and the
//! in-memory `annotator -> type name -> [(object, location)]` structure.
//!
//! Stored layout, after prefix stripping:
//!
//! ```text
//! <annotator>:
//!   <TypeName>:
//!     - info: { <attributes...>, version: "<x.y>" }
//!       location: <optional, any shape>
//! ```

use serde_json::{Map, Number, Value as JsonValue};
use std::collections::BTreeMap;
use tracing::{debug, trace, warn};

use crate::defaults::{INFO_KEY, LOCATION_KEY, VERSION_KEY};
use crate::error::{Error, Result};
use crate::registry::{make_metadata_object, MetadataType};
use crate::schema::{Dict, MetadataObject};
use crate::tree::Node;

/// Data-type specific location of an annotation (pixel rectangle, sample
/// range, ...). Validated by the owning data object, not here.
pub type Location = JsonValue;

/// One annotation: a metadata object and where it applies.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub object: MetadataObject,
    /// `None` when the annotation covers the whole item.
    pub location: Option<Location>,
}

impl Annotation {
    pub fn new(object: MetadataObject, location: Option<Location>) -> Self {
        Annotation { object, location }
    }
}

/// Annotations grouped by annotator, then by type name.
pub type Annotations = BTreeMap<String, BTreeMap<String, Vec<Annotation>>>;

/// Decode the annotation namespace.
///
/// Keys are stripped of their namespace prefix first. A bucket holding a
/// malformed entry (no `info` map) is skipped as if empty; errors raised
/// while building a metadata object are returned.
pub fn load_annotations(tree: Option<&Node>) -> Result<Annotations> {
    let mut annotations = Annotations::new();
    let stripped = match tree {
        Some(tree) => tree.clone().strip_prefixes(),
        None => return Ok(annotations),
    };
    let Some(annotators) = stripped.as_map() else {
        debug!(
            subsystem = "codec",
            op = "load",
            "Annotation namespace is not a map, treating as empty"
        );
        return Ok(annotations);
    };

    for (annotator, per_type) in annotators {
        let mut buckets = BTreeMap::new();
        for metadata_type in MetadataType::all() {
            let Some(entries) = per_type.get(metadata_type.name()).and_then(Node::as_list) else {
                continue;
            };
            if entries.is_empty() {
                continue;
            }
            match decode_bucket(*metadata_type, entries)? {
                Some(bucket) => {
                    trace!(
                        subsystem = "codec",
                        op = "load",
                        annotator = %annotator,
                        metadata_type = %metadata_type,
                        entry_count = bucket.len(),
                        "Bucket decoded"
                    );
                    buckets.insert(metadata_type.name().to_string(), bucket);
                }
                None => warn!(
                    subsystem = "codec",
                    op = "load",
                    annotator = %annotator,
                    metadata_type = %metadata_type,
                    "Malformed annotation entry, skipping bucket"
                ),
            }
        }
        if !buckets.is_empty() {
            annotations.insert(annotator.clone(), buckets);
        }
    }

    debug!(
        subsystem = "codec",
        op = "load",
        entry_count = count(&annotations),
        "Annotations loaded"
    );
    Ok(annotations)
}

/// `Ok(None)` when an entry lacks its `info` map.
fn decode_bucket(metadata_type: MetadataType, entries: &[Node]) -> Result<Option<Vec<Annotation>>> {
    let mut bucket = Vec::with_capacity(entries.len());
    for entry in entries {
        let Some(JsonValue::Object(info)) = entry.get(INFO_KEY).map(Node::to_json) else {
            return Ok(None);
        };
        let object = make_metadata_object(metadata_type, Some(&info))?;
        let location = entry
            .get(LOCATION_KEY)
            .map(|node| coerce_location(node.to_json()));
        bucket.push(Annotation { object, location });
    }
    Ok(Some(bucket))
}

/// Replace the annotation namespace with `annotations`.
///
/// Each object is written as `{info, location?}` with its version stamped
/// into `info`. Empty buckets and annotators are not written.
pub fn save_annotations(tree: &mut Node, annotations: &Annotations) {
    let mut annotators = BTreeMap::new();
    for (annotator, per_type) in annotations {
        let buckets: BTreeMap<String, Node> = per_type
            .iter()
            .filter(|(_, bucket)| !bucket.is_empty())
            .map(|(type_name, bucket)| {
                let entries = bucket.iter().filter_map(encode_entry).collect();
                (type_name.clone(), Node::List(entries))
            })
            .collect();
        if !buckets.is_empty() {
            annotators.insert(annotator.clone(), Node::Map(buckets));
        }
    }
    *tree = Node::Map(annotators);

    debug!(
        subsystem = "codec",
        op = "save",
        entry_count = count(annotations),
        "Annotations saved"
    );
}

fn encode_entry(annotation: &Annotation) -> Option<Node> {
    let mut info: Dict = annotation.object.to_dict();
    info.insert(
        VERSION_KEY.to_string(),
        JsonValue::String(annotation.object.version().to_string()),
    );
    let mut entry = Map::new();
    entry.insert(INFO_KEY.to_string(), JsonValue::Object(info));
    if let Some(location) = &annotation.location {
        entry.insert(LOCATION_KEY.to_string(), location.clone());
    }
    Node::from_json(&JsonValue::Object(entry))
}

fn count(annotations: &Annotations) -> usize {
    annotations
        .values()
        .flat_map(|per_type| per_type.values())
        .map(Vec::len)
        .sum()
}

/// Integer if `text` parses as one, else a finite float, else the text
/// itself. `inf` and `nan` spellings stay text: JSON numbers cannot hold them.
pub fn parse_scalar(text: &str) -> JsonValue {
    if let Ok(i) = text.trim().parse::<i64>() {
        return JsonValue::from(i);
    }
    text.trim()
        .parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(JsonValue::Number)
        .unwrap_or_else(|| JsonValue::String(text.to_string()))
}

/// Apply [`parse_scalar`] to every string of a (nested) list, in place.
pub fn parse_scalars_in_list(list: &mut JsonValue) -> Result<()> {
    let JsonValue::Array(items) = list else {
        return Err(Error::Codec(format!("expected a list, got {}", list)));
    };
    for item in items.iter_mut() {
        match item {
            JsonValue::String(text) => *item = parse_scalar(text),
            JsonValue::Array(_) => parse_scalars_in_list(item)?,
            _ => {}
        }
    }
    Ok(())
}

/// Convert every string leaf of a location into a number where it parses.
/// Empty text is read back as null, the form a null list element is stored in.
pub fn coerce_location(location: JsonValue) -> JsonValue {
    match location {
        JsonValue::String(text) if text.is_empty() => JsonValue::Null,
        JsonValue::String(text) => parse_scalar(&text),
        JsonValue::Array(items) => JsonValue::Array(items.into_iter().map(coerce_location).collect()),
        JsonValue::Object(map) => JsonValue::Object(
            map.into_iter()
                .map(|(k, v)| (k, coerce_location(v)))
                .collect(),
        ),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::{Face, Person, Property};
    use crate::schema::MetadataKind;
    use serde_json::json;

    fn tree(value: JsonValue) -> Node {
        Node::from_json(&value).unwrap()
    }

    #[test]
    fn test_parse_scalar() {
        assert_eq!(parse_scalar("1"), json!(1));
        assert_eq!(parse_scalar("1.0"), json!(1.0));
        assert_eq!(parse_scalar("a"), json!("a"));
        assert_eq!(parse_scalar("-3"), json!(-3));
        assert_eq!(parse_scalar("NaN"), json!("NaN"));
        assert_eq!(parse_scalar("inf"), json!("inf"));
        assert_eq!(parse_scalar("-inf"), json!("-inf"));
        assert_eq!(parse_scalar("1e400"), json!("1e400"));
    }

    #[test]
    fn test_parse_scalars_in_list_in_place() {
        let mut list = json!(["a", ["1", "2.0"]]);
        parse_scalars_in_list(&mut list).unwrap();
        assert_eq!(list, json!(["a", [1, 2.0]]));

        let mut not_a_list = json!("1");
        assert!(matches!(
            parse_scalars_in_list(&mut not_a_list),
            Err(Error::Codec(_))
        ));
    }

    #[test]
    fn test_load_strips_prefixes_and_coerces_location() {
        let ns = tree(json!({
            "annota:jdoe": {
                "annota:Person": [
                    {
                        "annota:info": {"annota:name": "Pepper", "annota:version": "0.2"},
                        "annota:location": [["0", "0"], ["10", "20.5"]]
                    },
                    {"annota:info": {"annota:name": "Nao", "annota:version": "0.2"}}
                ]
            }
        }));
        let annotations = load_annotations(Some(&ns)).unwrap();
        let people = &annotations["jdoe"]["Person"];
        assert_eq!(people.len(), 2);
        assert_eq!(people[0].object, Person::named("Pepper").unwrap());
        assert_eq!(people[0].location, Some(json!([[0, 0], [10, 20.5]])));
        assert_eq!(people[1].location, None);
    }

    #[test]
    fn test_load_migrates_old_entries() {
        let ns = tree(json!({
            "jdoe": {"Person": [{"info": {"name": "Pepper", "id": "10", "version": "0.1"}}]}
        }));
        let annotations = load_annotations(Some(&ns)).unwrap();
        assert_eq!(annotations["jdoe"]["Person"][0].object, Person::named("Pepper").unwrap());
    }

    #[test]
    fn test_load_skips_malformed_bucket_only() {
        let ns = tree(json!({
            "jdoe": {
                "Person": [{"info": {"name": "a"}}, {"location": ["1", "2"]}],
                "Face": [{"info": {"name": "b", "age": "3"}}],
                "Unknown": [{"info": {}}],
                "Speech": []
            },
            "empty": {}
        }));
        let annotations = load_annotations(Some(&ns)).unwrap();
        assert_eq!(annotations.len(), 1);
        let jdoe = &annotations["jdoe"];
        assert_eq!(jdoe.keys().collect::<Vec<_>>(), vec!["Face"]);
        assert_eq!(jdoe["Face"][0].object, Face::with("b", 3, "male").unwrap());
    }

    #[test]
    fn test_load_propagates_factory_errors() {
        let ns = tree(json!({"jdoe": {"Face": [{"info": {"gender": "robot"}}]}}));
        assert!(load_annotations(Some(&ns)).is_err());
    }

    #[test]
    fn test_load_missing_or_non_map_namespace() {
        assert!(load_annotations(None).unwrap().is_empty());
        assert!(load_annotations(Some(&Node::Text("x".to_string()))).unwrap().is_empty());
    }

    #[test]
    fn test_save_stamps_version_and_skips_empty() {
        let mut annotations = Annotations::new();
        annotations.entry("jdoe".to_string()).or_default().insert(
            "Person".to_string(),
            vec![Annotation::new(Person::named("Pepper").unwrap(), Some(json!([1, 2])))],
        );
        annotations
            .entry("jdoe".to_string())
            .or_default()
            .insert("Face".to_string(), vec![]);
        annotations.insert("idle".to_string(), BTreeMap::new());

        let mut ns = tree(json!({"stale": {"Person": []}}));
        save_annotations(&mut ns, &annotations);
        assert_eq!(
            ns.to_json(),
            json!({
                "jdoe": {
                    "Person": [{"info": {"name": "Pepper", "version": "0.2"}, "location": ["1", "2"]}]
                }
            })
        );
    }

    #[test]
    fn test_save_then_load_is_identity() {
        let mut annotations = Annotations::new();
        let jdoe = annotations.entry("jdoe".to_string()).or_default();
        jdoe.insert(
            "Face".to_string(),
            vec![
                Annotation::new(Face::with("a", 27, "female").unwrap(), Some(json!([[0, 0], [5, 5]]))),
                Annotation::new(Face::with("a", 27, "female").unwrap(), None),
            ],
        );
        jdoe.insert(
            "Property".to_string(),
            vec![Annotation::new(Property::create(), Some(json!([0.5, 2])))],
        );
        annotations.entry("other".to_string()).or_default().insert(
            "Person".to_string(),
            vec![Annotation::new(Person::create(), None)],
        );

        let mut ns = Node::empty_map();
        save_annotations(&mut ns, &annotations);
        assert_eq!(load_annotations(Some(&ns)).unwrap(), annotations);
    }

    #[test]
    fn test_null_location_element_keeps_its_position() {
        let mut annotations = Annotations::new();
        annotations.entry("jdoe".to_string()).or_default().insert(
            "Person".to_string(),
            vec![Annotation::new(Person::named("Pepper").unwrap(), Some(json!([null, 1])))],
        );

        let mut ns = Node::empty_map();
        save_annotations(&mut ns, &annotations);
        assert_eq!(ns.to_json()["jdoe"]["Person"][0]["location"], json!(["", "1"]));
        let loaded = load_annotations(Some(&ns)).unwrap();
        assert_eq!(loaded["jdoe"]["Person"][0].location, Some(json!([null, 1])));
    }
}
