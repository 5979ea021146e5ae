use std::fs::File;
use std::io::{BufRead, BufWriter};
use std::path::Path;

use log::{info, warn};

use crate::audit::street::StreetTypes;
use crate::audit::vocabulary::Vocabulary;
use crate::audit::AuditedElements;
use crate::data::osm::ElementKind;
use crate::errors::Result;
use crate::reader::{open_osm, ElementReader};
use crate::shape::shape_element;
use crate::validate::validate_element;
use crate::writer::{RowWriter, ROW_SET_FILE_NAMES};

use super::{remove_outputs, Etl};

pub const ETL_NAME: &str = "process_map";
pub const REPORT_FILE_NAME: &str = "street_types.json";

type OsmElements = ElementReader<Box<dyn BufRead + Send>>;

/// Audits every node and way of the map and writes them out as row-sets,
/// together with the street type report gathered on the way.
pub struct ProcessMapEtl<'a> {
    input_path: &'a Path,
    vocabulary: &'a Vocabulary,
    validate: bool,
}

impl<'a> ProcessMapEtl<'a> {
    pub fn new(input_path: &'a Path, vocabulary: &'a Vocabulary, validate: bool) -> Self {
        ProcessMapEtl {
            input_path,
            vocabulary,
            validate,
        }
    }

    fn output_file_names() -> Vec<&'static str> {
        let mut names = ROW_SET_FILE_NAMES.to_vec();
        names.push(REPORT_FILE_NAME);
        names
    }
}

impl<'a> Etl for ProcessMapEtl<'a> {
    type Input = OsmElements;
    type Output = AuditedElements<'a, OsmElements>;

    fn etl_name(&self) -> &str {
        ETL_NAME
    }

    fn is_cached(&self, dir: &Path) -> Result<bool> {
        Ok(Self::output_file_names()
            .iter()
            .all(|file_name| dir.join(file_name).exists()))
    }

    fn clean(&self, dir: &Path) -> Result<()> {
        remove_outputs(dir, &Self::output_file_names())
    }

    fn extract(&mut self, _dir: &Path) -> Result<Self::Input> {
        let reader = open_osm(self.input_path)?;
        Ok(ElementReader::new(reader, &[ElementKind::Node, ElementKind::Way]))
    }

    fn transform(&mut self, input: Self::Input) -> Result<Self::Output> {
        Ok(AuditedElements::new(input, self.vocabulary, StreetTypes::new()))
    }

    fn load(&mut self, dir: &Path, mut output: Self::Output) -> Result<()> {
        let mut writer = RowWriter::create(dir)?;
        let mut element_count: u64 = 0;

        for element in tqdm::tqdm(output.by_ref()) {
            let element = element?;
            if let Some(shaped) = shape_element(&element)? {
                if self.validate {
                    validate_element(&shaped)?;
                }
                writer.write(&shaped)?;
                element_count += 1;
            }
        }
        writer.flush()?;

        let street_types = output.into_street_types();
        let report_file = File::create(dir.join(REPORT_FILE_NAME))?;
        serde_json::to_writer_pretty(BufWriter::new(report_file), &street_types)?;

        for street_type in street_types.unrecognized(self.vocabulary) {
            let names = street_types.get(street_type).map_or(0, |names| names.len());
            warn!(etl_name = ETL_NAME, street_type = street_type, names = names; "Unrecognized street type left uncorrected");
        }
        info!(etl_name = ETL_NAME, elements = element_count, street_types = street_types.len(); "Row-sets written");
        Ok(())
    }
}
