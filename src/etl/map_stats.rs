use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufWriter};
use std::path::Path;
use std::str;

use log::info;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use serde::Serialize;

use crate::audit::vocabulary::{key_type, KeyType};
use crate::errors::Result;
use crate::reader::{open_osm, read_attributes};

use super::{remove_outputs, Etl};

pub const ETL_NAME: &str = "map_stats";
pub const OUTPUT_FILE_NAME: &str = "stats.json";

const TOP_USER_COUNT: usize = 10;

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct UserShare {
    pub user: String,
    pub edits: u64,
    /// Percent of all edits, rounded to two decimals.
    pub share: f64,
}

/// Contributor and tag statistics of a whole map file.
#[derive(Serialize, Debug, Default, Clone, PartialEq)]
pub struct MapStats {
    pub unique_users: usize,
    pub top_users: Vec<UserShare>,
    pub element_counts: BTreeMap<String, u64>,
    pub key_types: BTreeMap<KeyType, u64>,
}

#[derive(Default)]
struct StatsCounter {
    uids: HashSet<String>,
    edits: HashMap<String, u64>,
    element_counts: BTreeMap<String, u64>,
    key_types: BTreeMap<KeyType, u64>,
}

impl StatsCounter {
    fn observe(&mut self, el: &BytesStart) -> Result<()> {
        let name = str::from_utf8(el.name().as_ref())?.to_string();
        let is_tag = name == "tag";
        *self.element_counts.entry(name).or_insert(0) += 1;

        for (key, value) in read_attributes(el)? {
            match key.as_str() {
                "uid" => {
                    self.uids.insert(value);
                },
                "user" => *self.edits.entry(value).or_insert(0) += 1,
                "k" if is_tag => *self.key_types.entry(key_type(&value)).or_insert(0) += 1,
                _ => (),
            }
        }
        Ok(())
    }

    fn finish(self) -> MapStats {
        MapStats {
            unique_users: self.uids.len(),
            top_users: top_users(&self.edits),
            element_counts: self.element_counts,
            key_types: self.key_types,
        }
    }
}

/// Every user whose edit count is among the ten largest counts, so ties at the
/// cut-off may yield more than ten users.
fn top_users(edits: &HashMap<String, u64>) -> Vec<UserShare> {
    let total: u64 = edits.values().sum();
    let mut counts: Vec<u64> = edits.values().copied().collect();
    counts.sort_unstable_by(|a, b| b.cmp(a));
    let Some(&threshold) = counts.get(TOP_USER_COUNT - 1).or(counts.last()) else {
        return Vec::new();
    };

    let mut top: Vec<UserShare> = edits
        .iter()
        .filter(|(_, count)| **count >= threshold)
        .map(|(user, &count)| UserShare {
            user: user.clone(),
            edits: count,
            share: (count as f64 / total as f64 * 10000.0).round() / 100.0,
        })
        .collect();
    top.sort_by(|a, b| b.edits.cmp(&a.edits).then_with(|| a.user.cmp(&b.user)));
    top
}

pub struct MapStatsEtl<'a> {
    input_path: &'a Path,
}

impl<'a> MapStatsEtl<'a> {
    pub fn new(input_path: &'a Path) -> Self {
        MapStatsEtl { input_path }
    }
}

impl Etl for MapStatsEtl<'_> {
    type Input = Reader<Box<dyn BufRead + Send>>;
    type Output = MapStats;

    fn etl_name(&self) -> &str {
        ETL_NAME
    }

    fn is_cached(&self, dir: &Path) -> Result<bool> {
        Ok(dir.join(OUTPUT_FILE_NAME).exists())
    }

    fn clean(&self, dir: &Path) -> Result<()> {
        remove_outputs(dir, &[OUTPUT_FILE_NAME])
    }

    fn extract(&mut self, _dir: &Path) -> Result<Self::Input> {
        open_osm(self.input_path)
    }

    fn transform(&mut self, mut input: Self::Input) -> Result<Self::Output> {
        let mut counter = StatsCounter::default();
        let mut buf = Vec::new();

        loop {
            match input.read_event_into(&mut buf)? {
                Event::Eof => break,
                Event::Start(e) | Event::Empty(e) => counter.observe(&e)?,
                _ => (),
            }
            buf.clear();
        }
        Ok(counter.finish())
    }

    fn load(&mut self, dir: &Path, output: Self::Output) -> Result<()> {
        let output_file = File::create(dir.join(OUTPUT_FILE_NAME))?;
        serde_json::to_writer_pretty(BufWriter::new(output_file), &output)?;
        info!(etl_name = ETL_NAME, unique_users = output.unique_users; "Map statistics written");
        Ok(())
    }
}
