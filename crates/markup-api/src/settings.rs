use rustc_hash::FxHashSet;

/// Markup flavor the tokenizer applies.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum Dialect {
    /// HTML syntax: case-insensitive names, void elements, raw-text
    /// elements, HTML character references.
    #[default]
    Html,

    /// The restricted XML syntax: case-sensitive names, no void elements,
    /// real CDATA sections, the five predefined entities, and raw text
    /// only inside elements declared as PCDATA.
    Xml,
}

/// Construction-time options for a processor.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub dialect: Dialect,

    /// XML element names whose contents are opaque text up to the matching
    /// closing tag. Ignored for HTML documents.
    pub pcdata_elements: FxHashSet<Box<str>>,
}

impl Settings {
    #[inline]
    pub fn html() -> Self {
        Self::default()
    }

    #[inline]
    pub fn xml() -> Self {
        Settings {
            dialect: Dialect::Xml,
            ..Self::default()
        }
    }

    #[inline]
    pub fn pcdata_element(mut self, name: &str) -> Self {
        self.pcdata_elements.insert(name.into());

        self
    }

    #[inline]
    pub fn is_xml(&self) -> bool {
        self.dialect == Dialect::Xml
    }
}
