//! Elements as read from the .osm file, and the flat rows shaped from them.

pub mod osm;
pub mod rows;
