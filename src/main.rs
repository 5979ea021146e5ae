mod audit;
mod data;
mod errors;
mod etl;
mod reader;
mod shape;
mod validate;
mod writer;

use std::env;
use std::fs::{create_dir_all, File};
use std::io;
use std::path::{Path, PathBuf};

use log::info;
use serde::Deserialize;
use structured_logger::json::new_writer;
use structured_logger::Builder;

use crate::audit::vocabulary::{Vocabulary, VocabularyTable};
use crate::errors::Result;
use crate::etl::map_stats::MapStatsEtl;
use crate::etl::process_map::ProcessMapEtl;
use crate::etl::sample_osm::{self, SampleOsmEtl};
use crate::etl::Etl;

const DEFAULT_CONFIG_PATH: &str = "config/seattle.json";

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Deserialize)]
pub struct UserConfig {
    pub data_path: String,
    pub dest_path: String,
    #[serde(default)]
    pub validate: bool,
    #[serde(default)]
    pub sample_every: Option<usize>,
    #[serde(default)]
    pub vocabulary_path: Option<String>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn load_user_config(path: &str) -> Result<UserConfig> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(file)?)
}

fn load_vocabulary(config: &UserConfig) -> Result<Vocabulary> {
    match &config.vocabulary_path {
        Some(path) => Vocabulary::from_file(Path::new(path)),
        None => Vocabulary::new(VocabularyTable::default()),
    }
}

/// Sampled runs get their own directory so that cached outputs of different
/// sample intervals never mix.
fn output_dir_path(config: &UserConfig) -> Result<PathBuf> {
    let input_fname = Path::new(&config.data_path)
        .file_name()
        .ok_or("Could not get input file name")?;
    let mut dir_name = input_fname.to_os_string();
    if let Some(every) = config.sample_every {
        dir_name.push(format!(".sample_{}", every));
    }
    Ok(Path::new(&config.dest_path).join(dir_name))
}

fn create_output_dir(config: &UserConfig) -> Result<PathBuf> {
    let output_dir = output_dir_path(config)?;
    create_dir_all(&output_dir)?;
    Ok(output_dir)
}

fn setup_logging(level: &str) {
    Builder::with_level(level)
        .with_target_writer("*", new_writer(io::stdout()))
        .init();
}

fn main() -> Result<()> {
    let config_path = env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let user_config = load_user_config(&config_path)?;
    setup_logging(&user_config.log_level);

    let vocabulary = load_vocabulary(&user_config)?;
    let output_dir = create_output_dir(&user_config)?;

    let input_path = match user_config.sample_every {
        Some(every) => {
            SampleOsmEtl::new(Path::new(&user_config.data_path), every).process(&output_dir)?;
            output_dir.join(sample_osm::OUTPUT_FILE_NAME)
        },
        None => PathBuf::from(&user_config.data_path),
    };

    MapStatsEtl::new(&input_path).process(&output_dir)?;
    ProcessMapEtl::new(&input_path, &vocabulary, user_config.validate).process(&output_dir)?;

    let output_dir_name = output_dir.display().to_string();
    info!(output_dir = output_dir_name.as_str(); "Done writing files");
    Ok(())
}
