use serde::Serialize;

// Column order of each row-set. Struct fields below are declared in the same order.
pub const NODE_FIELDS: [&str; 8] = ["id", "lat", "lon", "user", "uid", "version", "changeset", "timestamp"];
pub const NODE_TAGS_FIELDS: [&str; 4] = ["id", "key", "value", "type"];
pub const WAY_FIELDS: [&str; 6] = ["id", "user", "uid", "version", "changeset", "timestamp"];
pub const WAY_NODES_FIELDS: [&str; 3] = ["id", "node_id", "position"];
pub const WAY_TAGS_FIELDS: [&str; 4] = ["id", "key", "value", "type"];

/// Node attributes. Everything but the id may be absent in the source.
/// Coordinates keep their source text so they are written out verbatim.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct NodeRow {
    pub id: i64,
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub user: Option<String>,
    pub uid: Option<i64>,
    pub version: Option<String>,
    pub changeset: Option<i64>,
    pub timestamp: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct TagRow {
    pub id: i64,
    pub key: String,
    pub value: String,
    #[serde(rename = "type")]
    pub tag_type: String,
}

pub type NodeTagRow = TagRow;
pub type WayTagRow = TagRow;

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct WayRow {
    pub id: i64,
    pub user: String,
    pub uid: i64,
    pub version: String,
    pub changeset: i64,
    pub timestamp: String,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct WayNodeRow {
    pub id: i64,
    pub node_id: i64,
    pub position: usize,
}

/// All rows produced from a single source element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapedElement {
    Node {
        node: NodeRow,
        node_tags: Vec<NodeTagRow>,
    },
    Way {
        way: WayRow,
        way_nodes: Vec<WayNodeRow>,
        way_tags: Vec<WayTagRow>,
    },
}
