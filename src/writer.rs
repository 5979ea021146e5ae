use std::fs::File;
use std::path::{Path, PathBuf};

use csv::{Writer, WriterBuilder};
use serde::Serialize;

use crate::data::rows::{
    ShapedElement, NODE_FIELDS, NODE_TAGS_FIELDS, WAY_FIELDS, WAY_NODES_FIELDS, WAY_TAGS_FIELDS,
};
use crate::errors::Result;

pub const NODES_FILE_NAME: &str = "nodes.csv";
pub const NODE_TAGS_FILE_NAME: &str = "nodes_tags.csv";
pub const WAYS_FILE_NAME: &str = "ways.csv";
pub const WAY_NODES_FILE_NAME: &str = "ways_nodes.csv";
pub const WAY_TAGS_FILE_NAME: &str = "ways_tags.csv";

pub const ROW_SET_FILE_NAMES: [&str; 5] = [
    NODES_FILE_NAME,
    NODE_TAGS_FILE_NAME,
    WAYS_FILE_NAME,
    WAY_NODES_FILE_NAME,
    WAY_TAGS_FILE_NAME,
];

/// One CSV file per row-set. Headers are written up front so that empty
/// row-sets still carry their columns.
pub struct RowWriter {
    nodes: Writer<File>,
    node_tags: Writer<File>,
    ways: Writer<File>,
    way_nodes: Writer<File>,
    way_tags: Writer<File>,
}

fn create_writer(path: PathBuf, header: &[&str]) -> Result<Writer<File>> {
    let mut writer = WriterBuilder::new().has_headers(false).from_path(path)?;
    writer.write_record(header)?;
    Ok(writer)
}

fn write_rows<T: Serialize>(writer: &mut Writer<File>, rows: &[T]) -> Result<()> {
    for row in rows {
        writer.serialize(row)?;
    }
    Ok(())
}

impl RowWriter {
    pub fn create(dir: &Path) -> Result<Self> {
        Ok(RowWriter {
            nodes: create_writer(dir.join(NODES_FILE_NAME), &NODE_FIELDS)?,
            node_tags: create_writer(dir.join(NODE_TAGS_FILE_NAME), &NODE_TAGS_FIELDS)?,
            ways: create_writer(dir.join(WAYS_FILE_NAME), &WAY_FIELDS)?,
            way_nodes: create_writer(dir.join(WAY_NODES_FILE_NAME), &WAY_NODES_FIELDS)?,
            way_tags: create_writer(dir.join(WAY_TAGS_FILE_NAME), &WAY_TAGS_FIELDS)?,
        })
    }

    pub fn write(&mut self, shaped: &ShapedElement) -> Result<()> {
        match shaped {
            ShapedElement::Node { node, node_tags } => {
                self.nodes.serialize(node)?;
                write_rows(&mut self.node_tags, node_tags)
            },
            ShapedElement::Way { way, way_nodes, way_tags } => {
                self.ways.serialize(way)?;
                write_rows(&mut self.way_nodes, way_nodes)?;
                write_rows(&mut self.way_tags, way_tags)
            },
        }
    }

    pub fn flush(&mut self) -> Result<()> {
        for writer in [
            &mut self.nodes,
            &mut self.node_tags,
            &mut self.ways,
            &mut self.way_nodes,
            &mut self.way_tags,
        ] {
            writer.flush()?;
        }
        Ok(())
    }
}
