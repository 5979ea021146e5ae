use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use xz::bufread::XzDecoder;

use crate::data::osm::{Element, ElementKind, NodeRef, Tag};
use crate::errors::{Error, ErrorKind, Result};

/// Opens an .osm file for streaming, decompressing on the fly if it ends in `.xz`.
pub fn open_osm(path: &Path) -> Result<Reader<Box<dyn BufRead + Send>>> {
    let file = fs::File::open(path)?;
    let file_reader = BufReader::new(file);
    let input: Box<dyn BufRead + Send> = if path.extension().is_some_and(|ext| ext == "xz") {
        Box::new(BufReader::new(XzDecoder::new(file_reader)))
    } else {
        Box::new(file_reader)
    };
    let mut reader = Reader::from_reader(input);
    reader.trim_text(true);

    Ok(reader)
}

/// Reads all attributes of an XML start tag as unescaped strings, in document order.
pub fn read_attributes(el: &BytesStart) -> Result<Vec<(String, String)>> {
    let mut attributes = Vec::new();
    for attribute_res in el.attributes() {
        let attribute = attribute_res?;
        let key = str::from_utf8(attribute.key.as_ref())?.to_string();
        let value = attribute.unescape_value()?.into_owned();
        attributes.push((key, value));
    }
    Ok(attributes)
}

fn find<'a>(attributes: &'a [(String, String)], name: &str) -> Option<&'a str> {
    attributes
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

/// Pull-based iterator over the top-level elements of an .osm document.
///
/// Only one element is held in memory at a time; the event buffer is cleared
/// after every event.
pub struct ElementReader<R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
    kinds: Vec<ElementKind>,
    finished: bool,
}

impl<R: BufRead> ElementReader<R> {
    pub fn new(reader: Reader<R>, kinds: &[ElementKind]) -> Self {
        ElementReader {
            reader,
            buf: Vec::new(),
            kinds: kinds.to_vec(),
            finished: false,
        }
    }

    fn start_element(kind: ElementKind, el: &BytesStart) -> Result<Element> {
        let mut element = Element::new(kind);
        element.attributes = read_attributes(el)?;
        Ok(element)
    }

    fn push_child(element: &mut Element, el: &BytesStart) -> Result<()> {
        match el.name().as_ref() {
            b"tag" => {
                let attributes = read_attributes(el)?;
                let key = find(&attributes, "k")
                    .ok_or_else(|| Error::missing_field("tag of", element.id(), "k"))?;
                let value = find(&attributes, "v")
                    .ok_or_else(|| Error::missing_field("tag of", element.id(), "v"))?;
                element.tags.push(Tag::new(key, value));
            },
            b"nd" => {
                let attributes = read_attributes(el)?;
                element.node_refs.push(NodeRef {
                    node_ref: find(&attributes, "ref").map(str::to_string),
                });
            },
            // Relation members are not shaped.
            _ => (),
        }
        Ok(())
    }

    fn read_element(&mut self) -> Result<Option<Element>> {
        let mut current: Option<Element> = None;

        loop {
            self.buf.clear();
            match self.reader.read_event_into(&mut self.buf)? {
                Event::Eof => {
                    return match current {
                        Some(element) => Err(Error::new(
                            ErrorKind::Xml,
                            format!("Unexpected end of file inside {} {}", element.kind.name(), element.id().unwrap_or("<no id>")),
                        )),
                        None => Ok(None),
                    }
                },
                Event::Start(e) => match current.as_mut() {
                    Some(element) => Self::push_child(element, &e)?,
                    None => {
                        if let Some(kind) = ElementKind::from_name(e.name().as_ref()) {
                            current = Some(Self::start_element(kind, &e)?);
                        }
                    },
                },
                Event::Empty(e) => match current.as_mut() {
                    Some(element) => Self::push_child(element, &e)?,
                    None => {
                        if let Some(kind) = ElementKind::from_name(e.name().as_ref()) {
                            return Ok(Some(Self::start_element(kind, &e)?));
                        }
                    },
                },
                Event::End(e) => {
                    let closes_current = current
                        .as_ref()
                        .is_some_and(|element| e.name().as_ref() == element.kind.name().as_bytes());
                    if closes_current {
                        return Ok(current);
                    }
                },
                // Declarations, comments and whitespace carry no map data.
                _ => (),
            }
        }
    }
}

impl<R: BufRead> Iterator for ElementReader<R> {
    type Item = Result<Element>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.finished {
            match self.read_element() {
                Ok(Some(element)) => {
                    if self.kinds.contains(&element.kind) {
                        return Some(Ok(element));
                    }
                },
                Ok(None) => self.finished = true,
                Err(err) => {
                    self.finished = true;
                    return Some(Err(err));
                },
            }
        }
        None
    }
}
