pub mod postcode;
pub mod street;
pub mod vocabulary;

use log::debug;

use crate::data::osm::{Element, ElementKind};
use crate::errors::Result;

use self::postcode::{find_postcode, update_postcode};
use self::street::{audit_street_type, normalize_direction, update_name, StreetTypes};
use self::vocabulary::{Vocabulary, POSTCODE_KEY, STREET_KEY};

/// Corrects the street name and postcode tags of one element in place and
/// records its street types.
///
/// Directions are expanded before the street type is audited and corrected,
/// so names like "Pike St N" classify on "St" rather than on the direction.
pub fn audit_element(element: &mut Element, street_types: &mut StreetTypes, vocabulary: &Vocabulary) {
    if !matches!(element.kind, ElementKind::Node | ElementKind::Way) {
        return;
    }

    for tag in element.tags.iter_mut() {
        if tag.key == STREET_KEY {
            let street_name = normalize_direction(&tag.value, vocabulary);
            audit_street_type(street_types, &street_name, vocabulary);
            tag.value = update_name(&street_name, vocabulary);
        } else if tag.key == POSTCODE_KEY {
            if find_postcode(&tag.value, vocabulary).is_none() {
                debug!(postcode = tag.value.as_str(); "Postcode left for manual review");
            }
            tag.value = update_postcode(&tag.value, vocabulary);
        }
    }
}

/// Audits a stream of elements as they are pulled through it, so that whatever
/// consumes the stream only ever sees corrected values.
pub struct AuditedElements<'v, I> {
    elements: I,
    vocabulary: &'v Vocabulary,
    street_types: StreetTypes,
}

impl<'v, I> AuditedElements<'v, I>
where
    I: Iterator<Item = Result<Element>>,
{
    pub fn new(elements: I, vocabulary: &'v Vocabulary, street_types: StreetTypes) -> Self {
        AuditedElements {
            elements,
            vocabulary,
            street_types,
        }
    }

    /// Hands back the report accumulated over the elements pulled so far.
    pub fn into_street_types(self) -> StreetTypes {
        self.street_types
    }
}

impl<I> Iterator for AuditedElements<'_, I>
where
    I: Iterator<Item = Result<Element>>,
{
    type Item = Result<Element>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut element = match self.elements.next()? {
            Ok(element) => element,
            Err(err) => return Some(Err(err)),
        };
        audit_element(&mut element, &mut self.street_types, self.vocabulary);
        Some(Ok(element))
    }
}
