/// Lower-cased view of a text payload, built once per assessment.
#[derive(Debug)]
pub(crate) struct TextContext<'a> {
    original: &'a str,
    lower: String,
}

impl<'a> TextContext<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Self {
            original: text,
            lower: text.to_lowercase(),
        }
    }

    pub(crate) fn is_blank(&self) -> bool {
        self.original.trim().is_empty()
    }

    pub(crate) fn contains_keyword(&self, keyword: &str) -> bool {
        !keyword.is_empty() && self.lower.contains(keyword)
    }

    /// Distinct terms that appear anywhere in the text, in term order.
    /// Terms are expected lower-cased already.
    pub(crate) fn matched_terms<'t>(&self, terms: &'t [String]) -> Vec<&'t str> {
        let mut matched: Vec<&str> = Vec::new();
        for term in terms {
            if matched.iter().any(|existing| *existing == term.as_str()) {
                continue;
            }
            if self.contains_keyword(term) {
                matched.push(term.as_str());
            }
        }
        matched
    }
}
