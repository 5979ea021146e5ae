use std::collections::{BTreeMap, BTreeSet};

use regex::Match;
use serde::Serialize;

use super::vocabulary::{Vocabulary, STREET_TYPE};

/// Every distinct street name seen, grouped by its resolved street type.
#[derive(Serialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(transparent)]
pub struct StreetTypes(BTreeMap<String, BTreeSet<String>>);

impl StreetTypes {
    pub fn new() -> Self {
        StreetTypes::default()
    }

    pub fn record(&mut self, street_type: &str, street_name: &str) {
        self.0
            .entry(street_type.to_string())
            .or_default()
            .insert(street_name.to_string());
    }

    pub fn get(&self, street_type: &str) -> Option<&BTreeSet<String>> {
        self.0.get(street_type)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Street types that are neither canonical nor known abbreviations.
    pub fn unrecognized<'a>(&'a self, vocabulary: &'a Vocabulary) -> impl Iterator<Item = &'a str> + 'a {
        self.0
            .keys()
            .map(String::as_str)
            .filter(|token| !vocabulary.is_expected(token) && vocabulary.canonical_street_type(token).is_none())
    }
}

/// Expands the first standalone direction abbreviation, e.g. "N" to "North".
pub fn normalize_direction(street_name: &str, vocabulary: &Vocabulary) -> String {
    if let Some(m) = vocabulary.direction_re.find(street_name) {
        if let Some(direction) = vocabulary.direction(m.as_str()) {
            return format!("{}{}{}", &street_name[..m.start()], direction, &street_name[m.end()..]);
        }
    }
    street_name.to_string()
}

/// Trailing token of a street name as a match into it. A trailing direction
/// word is skipped when a token precedes it, so "Pike Street North" resolves
/// to "Street".
pub fn street_type_match<'a>(street_name: &'a str, vocabulary: &Vocabulary) -> Option<Match<'a>> {
    let m = STREET_TYPE.find(street_name)?;
    if vocabulary.is_direction_word(m.as_str()) {
        // Offsets into the remainder stay valid for the full name.
        let remainder = street_name[..m.start()].trim_end();
        if let Some(inner) = STREET_TYPE.find(remainder) {
            return Some(inner);
        }
    }
    Some(m)
}

pub fn street_type<'a>(street_name: &'a str, vocabulary: &Vocabulary) -> Option<&'a str> {
    street_type_match(street_name, vocabulary).map(|m| m.as_str())
}

pub fn audit_street_type(street_types: &mut StreetTypes, street_name: &str, vocabulary: &Vocabulary) {
    if let Some(street_type) = street_type(street_name, vocabulary) {
        street_types.record(street_type, street_name);
    }
}

/// Replaces a known abbreviated street type with its canonical form. Only the
/// street type token itself is rewritten.
pub fn update_name(street_name: &str, vocabulary: &Vocabulary) -> String {
    let Some(m) = street_type_match(street_name, vocabulary) else {
        return street_name.to_string();
    };
    if vocabulary.is_expected(m.as_str()) {
        return street_name.to_string();
    }
    match vocabulary.canonical_street_type(m.as_str()) {
        Some(canonical) => format!("{}{}{}", &street_name[..m.start()], canonical, &street_name[m.end()..]),
        None => street_name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::vocabulary::VocabularyTable;

    fn vocabulary() -> Vocabulary {
        Vocabulary::new(VocabularyTable::default()).unwrap()
    }

    #[test]
    fn test_normalize_every_direction() {
        let vocabulary = vocabulary();
        for (abbreviation, direction) in &vocabulary.table.directions {
            let normalized = normalize_direction(&format!("123 Main St {abbreviation}"), &vocabulary);
            assert!(normalized.ends_with(direction.as_str()), "{normalized}");
            assert!(!normalized.split_whitespace().any(|word| word == abbreviation));
        }
    }

    #[test]
    fn test_normalize_replaces_only_first_occurrence() {
        let vocabulary = vocabulary();
        assert_eq!(normalize_direction("N 45th St N", &vocabulary), "North 45th St N");
        assert_eq!(normalize_direction("1000 NE Northgate Way", &vocabulary), "1000 Northeast Northgate Way");
    }

    #[test]
    fn test_normalize_ignores_embedded_letters() {
        let vocabulary = vocabulary();
        assert_eq!(normalize_direction("Nest Road", &vocabulary), "Nest Road");
        assert_eq!(normalize_direction("123 n Main St", &vocabulary), "123 n Main St");
    }

    #[test]
    fn test_street_type_skips_trailing_direction() {
        let vocabulary = vocabulary();
        assert_eq!(street_type("Pike Street North", &vocabulary), Some("Street"));
        assert_eq!(street_type("123 Main St.", &vocabulary), Some("St."));
        assert_eq!(street_type("North", &vocabulary), Some("North"));
        assert_eq!(street_type("", &vocabulary), None);
    }

    #[test]
    fn test_audit_street_type_groups_names() {
        let vocabulary = vocabulary();
        let mut street_types = StreetTypes::new();
        audit_street_type(&mut street_types, "Pike St", &vocabulary);
        audit_street_type(&mut street_types, "Pine St", &vocabulary);
        audit_street_type(&mut street_types, "Pike St", &vocabulary);
        audit_street_type(&mut street_types, "Aurora Avenue North", &vocabulary);

        assert_eq!(street_types.len(), 2);
        let st: Vec<&str> = street_types.get("St").unwrap().iter().map(String::as_str).collect();
        assert_eq!(st, vec!["Pike St", "Pine St"]);
        assert!(street_types.get("Avenue").unwrap().contains("Aurora Avenue North"));
    }

    #[test]
    fn test_unrecognized_street_types() {
        let vocabulary = vocabulary();
        let mut street_types = StreetTypes::new();
        audit_street_type(&mut street_types, "Pike St", &vocabulary);
        audit_street_type(&mut street_types, "Pine Street", &vocabulary);
        audit_street_type(&mut street_types, "Market Mall", &vocabulary);

        let unrecognized: Vec<&str> = street_types.unrecognized(&vocabulary).collect();
        assert_eq!(unrecognized, vec!["Mall"]);
    }

    #[test]
    fn test_update_every_abbreviation() {
        let vocabulary = vocabulary();
        for (abbreviation, canonical) in &vocabulary.table.abbreviations {
            for prefix in ["123 Main", "Stewart", "Dravus", "Avenue of Stars"] {
                let updated = update_name(&format!("{prefix} {abbreviation}"), &vocabulary);
                assert_eq!(updated, format!("{prefix} {canonical}"), "{abbreviation}");
            }
        }
    }

    #[test]
    fn test_update_name_leaves_canonical_and_unknown() {
        let vocabulary = vocabulary();
        assert_eq!(update_name("123 Main Street", &vocabulary), "123 Main Street");
        assert_eq!(update_name("Market Mall", &vocabulary), "Market Mall");
        assert_eq!(update_name("Main St ", &vocabulary), "Main St ");
    }

    #[test]
    fn test_update_name_before_direction() {
        let vocabulary = vocabulary();
        assert_eq!(update_name("123 Main St North", &vocabulary), "123 Main Street North");
        assert_eq!(update_name("Aurora Ave. North", &vocabulary), "Aurora Avenue North");
    }

    #[test]
    fn test_update_name_rewrites_only_the_street_type_token() {
        let vocabulary = vocabulary();
        assert_eq!(update_name("Stewart St", &vocabulary), "Stewart Street");
        assert_eq!(update_name("Dravus Dr", &vocabulary), "Dravus Drive");
        let normalized = normalize_direction("Stewart St N", &vocabulary);
        assert_eq!(update_name(&normalized, &vocabulary), "Stewart Street North");
        assert_eq!(update_name("Stewart Street North", &vocabulary), "Stewart Street North");
    }

    #[test]
    fn test_update_name_is_idempotent() {
        let vocabulary = vocabulary();
        for name in [
            "123 Main St",
            "Aurora Ave. North",
            "Market Mall",
            "15th Ave NE",
            "456 MainStreet",
            "Stewart St",
            "Stewart St N",
            "Dravus Dr",
        ] {
            let once = update_name(&normalize_direction(name, &vocabulary), &vocabulary);
            let twice = update_name(&once, &vocabulary);
            assert_eq!(once, twice);
        }
    }
}
