use std::str::FromStr;

use log::warn;

use crate::audit::vocabulary::{LOWER_COLON, PROBLEM_CHARS};
use crate::data::osm::{Element, ElementKind, Tag};
use crate::data::rows::{NodeRow, ShapedElement, TagRow, WayNodeRow, WayRow};
use crate::errors::{Error, Result};

pub const DEFAULT_TAG_TYPE: &str = "regular";

fn parse_field<T: FromStr>(element: &Element, field: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| {
        Error::schema_violation(
            element.kind.name(),
            &[format!("{}: could not parse '{}'", field, value)],
        )
    })
}

fn required<'a>(element: &'a Element, field: &str) -> Result<&'a str> {
    element
        .attribute(field)
        .ok_or_else(|| Error::missing_field(element.kind.name(), element.id(), field))
}

fn optional<T: FromStr>(element: &Element, field: &str) -> Result<Option<T>> {
    element
        .attribute(field)
        .map(|value| parse_field(element, field, value))
        .transpose()
}

/// A coordinate must parse as a number but is kept as written.
fn coordinate(element: &Element, field: &str) -> Result<Option<String>> {
    match element.attribute(field) {
        Some(value) => {
            parse_field::<f64>(element, field, value)?;
            Ok(Some(value.to_string()))
        },
        None => Ok(None),
    }
}

/// Shapes the child tags of one element. A key with problem characters ends
/// tag processing for the whole element, not just for that tag.
pub fn shape_tags(id: i64, tags: &[Tag]) -> Vec<TagRow> {
    let mut rows = Vec::new();
    for tag in tags {
        if PROBLEM_CHARS.is_match(&tag.key) {
            warn!(element_id = id, key = tag.key.as_str(); "Skipping remaining tags after malformed key");
            break;
        }
        let (tag_type, key) = match tag.key.split_once(':') {
            Some((tag_type, key)) if LOWER_COLON.is_match(&tag.key) => (tag_type, key),
            _ => (DEFAULT_TAG_TYPE, tag.key.as_str()),
        };
        rows.push(TagRow {
            id,
            key: key.to_string(),
            value: tag.value.clone(),
            tag_type: tag_type.to_string(),
        });
    }
    rows
}

fn shape_node(element: &Element) -> Result<ShapedElement> {
    let id = parse_field(element, "id", required(element, "id")?)?;
    let node = NodeRow {
        id,
        lat: coordinate(element, "lat")?,
        lon: coordinate(element, "lon")?,
        user: element.attribute("user").map(str::to_string),
        uid: optional(element, "uid")?,
        version: element.attribute("version").map(str::to_string),
        changeset: optional(element, "changeset")?,
        timestamp: element.attribute("timestamp").map(str::to_string),
    };

    Ok(ShapedElement::Node {
        node,
        node_tags: shape_tags(id, &element.tags),
    })
}

fn shape_way(element: &Element) -> Result<ShapedElement> {
    let id = parse_field(element, "id", required(element, "id")?)?;
    let way = WayRow {
        id,
        user: required(element, "user")?.to_string(),
        uid: parse_field(element, "uid", required(element, "uid")?)?,
        version: required(element, "version")?.to_string(),
        changeset: parse_field(element, "changeset", required(element, "changeset")?)?,
        timestamp: required(element, "timestamp")?.to_string(),
    };

    let mut way_nodes = Vec::with_capacity(element.node_refs.len());
    for (position, nd) in element.node_refs.iter().enumerate() {
        let node_ref = nd
            .node_ref
            .as_deref()
            .ok_or_else(|| Error::missing_field("nd of way", element.id(), "ref"))?;
        way_nodes.push(WayNodeRow {
            id,
            node_id: parse_field(element, "ref", node_ref)?,
            position,
        });
    }

    Ok(ShapedElement::Way {
        way,
        way_nodes,
        way_tags: shape_tags(id, &element.tags),
    })
}

/// Flattens a node or way into its rows. Other element kinds have no rows.
pub fn shape_element(element: &Element) -> Result<Option<ShapedElement>> {
    match element.kind {
        ElementKind::Node => shape_node(element).map(Some),
        ElementKind::Way => shape_way(element).map(Some),
        ElementKind::Relation => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::street::StreetTypes;
    use crate::audit::vocabulary::{Vocabulary, VocabularyTable};
    use crate::audit::audit_element;
    use crate::data::osm::NodeRef;
    use crate::errors::ErrorKind;

    fn way(refs: &[&str]) -> Element {
        let mut element = Element::new(ElementKind::Way);
        for (key, value) in [
            ("id", "209809850"),
            ("user", "chishu"),
            ("uid", "674454"),
            ("version", "1"),
            ("changeset", "15353317"),
            ("timestamp", "2013-03-13T15:58:04Z"),
        ] {
            element.attributes.push((key.to_string(), value.to_string()));
        }
        element.node_refs = refs
            .iter()
            .map(|node_ref| NodeRef { node_ref: Some(node_ref.to_string()) })
            .collect();
        element
    }

    #[test]
    fn test_shape_tags_splits_namespaced_keys() {
        let tags = vec![
            Tag::new("addr:street", "Pike Street"),
            Tag::new("highway", "residential"),
            Tag::new("addr:street:name", "Pike"),
            Tag::new("FIXME:note", "check"),
        ];
        let rows = shape_tags(1, &tags);

        let shaped: Vec<(&str, &str)> = rows.iter().map(|row| (row.tag_type.as_str(), row.key.as_str())).collect();
        assert_eq!(
            shaped,
            vec![
                ("addr", "street"),
                ("regular", "highway"),
                ("addr", "street:name"),
                ("regular", "FIXME:note"),
            ]
        );
        assert_eq!(rows[0].value, "Pike Street");
        assert!(rows.iter().all(|row| row.id == 1));
    }

    #[test]
    fn test_problem_key_abandons_remaining_tags() {
        let tags = vec![
            Tag::new("addr:city", "Seattle"),
            Tag::new("bad key#", "x"),
            Tag::new("addr:street", "Main St"),
        ];
        let rows = shape_tags(1, &tags);

        assert_eq!(
            rows,
            vec![TagRow {
                id: 1,
                key: "city".to_string(),
                value: "Seattle".to_string(),
                tag_type: "addr".to_string(),
            }]
        );
    }

    #[test]
    fn test_way_nodes_keep_document_order() {
        let Some(ShapedElement::Way { way, way_nodes, way_tags }) = shape_element(&way(&["10", "20", "30"])).unwrap() else {
            panic!("expected a way");
        };

        assert_eq!(way.id, 209809850);
        assert_eq!(way.uid, 674454);
        assert!(way_tags.is_empty());
        let order: Vec<(i64, usize)> = way_nodes.iter().map(|nd| (nd.node_id, nd.position)).collect();
        assert_eq!(order, vec![(10, 0), (20, 1), (30, 2)]);
        assert!(way_nodes.iter().all(|nd| nd.id == 209809850));
    }

    #[test]
    fn test_way_missing_attribute_is_fatal() {
        let mut element = way(&["10"]);
        element.attributes.retain(|(key, _)| key != "changeset");

        let err = shape_element(&element).unwrap_err();
        assert_eq!(err.kind, ErrorKind::MissingRequiredField);
        assert!(err.message.contains("changeset"));
    }

    #[test]
    fn test_way_node_without_ref_is_fatal() {
        let mut element = way(&["10"]);
        element.node_refs.push(NodeRef { node_ref: None });

        let err = shape_element(&element).unwrap_err();
        assert_eq!(err.kind, ErrorKind::MissingRequiredField);
    }

    #[test]
    fn test_node_optional_attributes() {
        let mut element = Element::new(ElementKind::Node);
        element.attributes.push(("id".to_string(), "42".to_string()));
        element.attributes.push(("lat".to_string(), "47.6".to_string()));

        let shaped = shape_element(&element).unwrap().unwrap();
        assert_eq!(
            shaped,
            ShapedElement::Node {
                node: NodeRow {
                    id: 42,
                    lat: Some("47.6".to_string()),
                    lon: None,
                    user: None,
                    uid: None,
                    version: None,
                    changeset: None,
                    timestamp: None,
                },
                node_tags: Vec::new(),
            }
        );
    }

    #[test]
    fn test_unparseable_number_is_a_schema_violation() {
        let mut element = Element::new(ElementKind::Node);
        element.attributes.push(("id".to_string(), "42".to_string()));
        element.attributes.push(("uid".to_string(), "five".to_string()));

        let err = shape_element(&element).unwrap_err();
        assert_eq!(err.kind, ErrorKind::SchemaViolation);
        assert!(err.message.contains("uid"));
    }

    #[test]
    fn test_coordinates_keep_source_text() {
        let mut element = Element::new(ElementKind::Node);
        element.attributes.push(("id".to_string(), "42".to_string()));
        element.attributes.push(("lat".to_string(), "47.6100000".to_string()));
        element.attributes.push(("lon".to_string(), "-122.3000000".to_string()));

        let Some(ShapedElement::Node { node, .. }) = shape_element(&element).unwrap() else {
            panic!("expected a node");
        };
        assert_eq!(node.lat.as_deref(), Some("47.6100000"));
        assert_eq!(node.lon.as_deref(), Some("-122.3000000"));
    }

    #[test]
    fn test_unparseable_coordinate_is_a_schema_violation() {
        let mut element = Element::new(ElementKind::Node);
        element.attributes.push(("id".to_string(), "42".to_string()));
        element.attributes.push(("lat".to_string(), "north".to_string()));

        let err = shape_element(&element).unwrap_err();
        assert_eq!(err.kind, ErrorKind::SchemaViolation);
        assert!(err.message.contains("lat: could not parse 'north'"));
    }

    #[test]
    fn test_relations_have_no_rows() {
        let element = Element::new(ElementKind::Relation);
        assert_eq!(shape_element(&element).unwrap(), None);
    }

    #[test]
    fn test_audited_node_end_to_end() {
        let vocabulary = Vocabulary::new(VocabularyTable::default()).unwrap();
        let mut street_types = StreetTypes::new();
        let mut element = Element::new(ElementKind::Node);
        for (key, value) in [
            ("id", "1"),
            ("lat", "47.6"),
            ("lon", "-122.3"),
            ("user", "u"),
            ("uid", "5"),
            ("version", "1"),
            ("changeset", "100"),
            ("timestamp", "2020-01-01"),
        ] {
            element.attributes.push((key.to_string(), value.to_string()));
        }
        element.tags.push(Tag::new("addr:street", "123 Main St N"));

        audit_element(&mut element, &mut street_types, &vocabulary);
        let shaped = shape_element(&element).unwrap().unwrap();

        assert_eq!(
            shaped,
            ShapedElement::Node {
                node: NodeRow {
                    id: 1,
                    lat: Some("47.6".to_string()),
                    lon: Some("-122.3".to_string()),
                    user: Some("u".to_string()),
                    uid: Some(5),
                    version: Some("1".to_string()),
                    changeset: Some(100),
                    timestamp: Some("2020-01-01".to_string()),
                },
                node_tags: vec![TagRow {
                    id: 1,
                    key: "street".to_string(),
                    value: "123 Main Street North".to_string(),
                    tag_type: "addr".to_string(),
                }],
            }
        );
    }
}
