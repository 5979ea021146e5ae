use super::vocabulary::Vocabulary;

pub fn find_postcode<'a>(postcode: &'a str, vocabulary: &Vocabulary) -> Option<&'a str> {
    vocabulary.postcode_re.find(postcode).map(|m| m.as_str())
}

/// Reduces a postcode to its first regional 5-digit code. Values without one
/// are returned unchanged for manual review.
pub fn update_postcode(postcode: &str, vocabulary: &Vocabulary) -> String {
    find_postcode(postcode, vocabulary)
        .unwrap_or(postcode)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::vocabulary::VocabularyTable;

    #[test]
    fn test_update_postcode() {
        let vocabulary = Vocabulary::new(VocabularyTable::default()).unwrap();
        assert_eq!(update_postcode("WA 98101", &vocabulary), "98101");
        assert_eq!(update_postcode("98101-4567", &vocabulary), "98101");
        assert_eq!(update_postcode("98101", &vocabulary), "98101");
        assert_eq!(update_postcode("not a zip", &vocabulary), "not a zip");
        assert_eq!(update_postcode("97201", &vocabulary), "97201");
    }

    #[test]
    fn test_first_match_wins() {
        let vocabulary = Vocabulary::new(VocabularyTable::default()).unwrap();
        assert_eq!(find_postcode("98052 or 98053", &vocabulary), Some("98052"));
        assert_eq!(find_postcode("9810", &vocabulary), None);
    }
}
