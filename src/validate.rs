use crate::data::rows::{NodeRow, ShapedElement, TagRow, WayRow};
use crate::errors::{Error, Result};

const LAT_RANGE: (f64, f64) = (-90.0, 90.0);
const LON_RANGE: (f64, f64) = (-180.0, 180.0);

fn require<T>(errors: &mut Vec<String>, field: &str, value: &Option<T>) {
    if value.is_none() {
        errors.push(format!("{}: required field", field));
    }
}

fn not_empty(errors: &mut Vec<String>, field: &str, value: &str) {
    if value.is_empty() {
        errors.push(format!("{}: empty values not allowed", field));
    }
}

fn in_range(errors: &mut Vec<String>, field: &str, value: Option<&str>, (min, max): (f64, f64)) {
    let Some(value) = value else {
        return;
    };
    match value.parse::<f64>() {
        Ok(number) if (min..=max).contains(&number) => (),
        Ok(_) => errors.push(format!("{}: {} is outside [{}, {}]", field, value, min, max)),
        Err(_) => errors.push(format!("{}: '{}' is not a number", field, value)),
    }
}

fn node_errors(node: &NodeRow) -> Vec<String> {
    let mut errors = Vec::new();
    require(&mut errors, "lat", &node.lat);
    require(&mut errors, "lon", &node.lon);
    require(&mut errors, "user", &node.user);
    require(&mut errors, "uid", &node.uid);
    require(&mut errors, "version", &node.version);
    require(&mut errors, "changeset", &node.changeset);
    require(&mut errors, "timestamp", &node.timestamp);
    in_range(&mut errors, "lat", node.lat.as_deref(), LAT_RANGE);
    in_range(&mut errors, "lon", node.lon.as_deref(), LON_RANGE);
    errors
}

fn way_errors(way: &WayRow) -> Vec<String> {
    let mut errors = Vec::new();
    not_empty(&mut errors, "user", &way.user);
    not_empty(&mut errors, "version", &way.version);
    not_empty(&mut errors, "timestamp", &way.timestamp);
    errors
}

fn tag_errors(tags: &[TagRow]) -> Vec<String> {
    let mut errors = Vec::new();
    for (idx, tag) in tags.iter().enumerate() {
        not_empty(&mut errors, &format!("[{}].key", idx), &tag.key);
        not_empty(&mut errors, &format!("[{}].value", idx), &tag.value);
        not_empty(&mut errors, &format!("[{}].type", idx), &tag.tag_type);
    }
    errors
}

/// Checks a shaped element against the row-set schema. The first row-set with
/// errors fails the whole element.
pub fn validate_element(shaped: &ShapedElement) -> Result<()> {
    let checks = match shaped {
        ShapedElement::Node { node, node_tags } => vec![
            ("node", node_errors(node)),
            ("node_tags", tag_errors(node_tags)),
        ],
        ShapedElement::Way { way, way_tags, .. } => vec![
            ("way", way_errors(way)),
            ("way_tags", tag_errors(way_tags)),
        ],
    };

    match checks.into_iter().find(|(_, errors)| !errors.is_empty()) {
        Some((field, errors)) => Err(Error::schema_violation(field, &errors)),
        None => Ok(()),
    }
}
