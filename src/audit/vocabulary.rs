use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::Result;

pub const STREET_KEY: &str = "addr:street";
pub const POSTCODE_KEY: &str = "addr:postcode";

const POSTCODE_LENGTH: usize = 5;

pub static LOWER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([a-z]|_)*$").unwrap());

pub static LOWER_COLON: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([a-z]|_)+:([a-z]|_)+").unwrap());

pub static PROBLEM_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[=\+/&<>;'"\?%#$@,\. \t\r\n]"#).unwrap());

/// Last whitespace-delimited token, optionally ending in a period.
pub static STREET_TYPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b\S+\.?$").unwrap());

/// Classification of a tag key by its characters.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum KeyType {
    Lower,
    LowerColon,
    ProblemChars,
    Other,
}

pub fn key_type(key: &str) -> KeyType {
    if LOWER.is_match(key) {
        KeyType::Lower
    } else if LOWER_COLON.is_match(key) {
        KeyType::LowerColon
    } else if PROBLEM_CHARS.is_match(key) {
        KeyType::ProblemChars
    } else {
        KeyType::Other
    }
}

/// The swappable word lists behind street-name and postcode correction.
#[derive(Deserialize, Debug, Clone)]
pub struct VocabularyTable {
    pub expected: Vec<String>,
    pub abbreviations: BTreeMap<String, String>,
    pub directions: BTreeMap<String, String>,
    pub postcode_prefix: String,
}

impl Default for VocabularyTable {
    /// Street vocabulary of the Seattle, Washington extract.
    fn default() -> Self {
        let expected = [
            "Street", "Avenue", "Boulevard", "Drive", "Court", "Place", "Square", "Lane", "Road",
            "Trail", "Parkway", "Commons", "Way", "Crescent", "Highway", "Ridge", "Terrace",
            "Heights", "Point", "Loop", "Esplanade", "Circle", "Walk", "Broadway", "Crest", "Close",
            "Main Street", "Island", "Driveway",
        ];
        let abbreviations = [
            ("St", "Street"),
            ("St.", "Street"),
            ("st", "Street"),
            ("ST", "Street"),
            ("street", "Street"),
            ("Stree", "Street"),
            ("Ave", "Avenue"),
            ("Av.", "Avenue"),
            ("Ave.", "Avenue"),
            ("av.", "Avenue"),
            ("avenue", "Avenue"),
            ("AVE", "Avenue"),
            ("Rd.", "Road"),
            ("Rd", "Road"),
            ("RD", "Road"),
            ("MainStreet", "Main Street"),
            ("Dr", "Drive"),
            ("Blvd", "Boulevard"),
            ("Blvd.", "Boulevard"),
            ("Pl", "Place"),
            ("Hwy", "Highway"),
            ("lane", "Lane"),
            ("driveway", "Driveway"),
        ];
        let directions = [
            ("N", "North"),
            ("S", "South"),
            ("W", "West"),
            ("E", "East"),
            ("NE", "Northeast"),
            ("NW", "Northwest"),
            ("SE", "Southeast"),
            ("SW", "Southwest"),
        ];

        VocabularyTable {
            expected: expected.iter().map(|word| word.to_string()).collect(),
            abbreviations: abbreviations
                .iter()
                .map(|(short, long)| (short.to_string(), long.to_string()))
                .collect(),
            directions: directions
                .iter()
                .map(|(short, long)| (short.to_string(), long.to_string()))
                .collect(),
            postcode_prefix: "98".to_string(),
        }
    }
}

/// A vocabulary table together with the matchers compiled from it.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    pub table: VocabularyTable,
    pub direction_re: Regex,
    pub postcode_re: Regex,
}

impl Vocabulary {
    pub fn new(table: VocabularyTable) -> Result<Self> {
        if table.directions.is_empty() {
            return Err("Vocabulary needs at least one direction".into());
        }
        let prefix_is_digits = table.postcode_prefix.chars().all(|c| c.is_ascii_digit());
        if !prefix_is_digits || table.postcode_prefix.len() > POSTCODE_LENGTH {
            return Err(format!("Invalid postcode prefix '{}'", table.postcode_prefix).into());
        }

        let alternatives: Vec<String> = table.directions.keys().map(|abbr| regex::escape(abbr)).collect();
        let direction_re = Regex::new(&format!(r"\b({})\b", alternatives.join("|")))?;
        let postcode_re = Regex::new(&format!(
            "{}[0-9]{{{}}}",
            table.postcode_prefix,
            POSTCODE_LENGTH - table.postcode_prefix.len()
        ))?;

        Ok(Vocabulary {
            table,
            direction_re,
            postcode_re,
        })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let table: VocabularyTable = serde_json::from_reader(file)?;
        Vocabulary::new(table)
    }

    pub fn is_expected(&self, street_type: &str) -> bool {
        self.table.expected.iter().any(|word| word == street_type)
    }

    pub fn is_direction_word(&self, word: &str) -> bool {
        self.table.directions.values().any(|direction| direction == word)
    }

    pub fn direction(&self, abbreviation: &str) -> Option<&str> {
        self.table.directions.get(abbreviation).map(String::as_str)
    }

    pub fn canonical_street_type(&self, abbreviation: &str) -> Option<&str> {
        self.table.abbreviations.get(abbreviation).map(String::as_str)
    }
}
