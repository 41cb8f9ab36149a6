use crate::{
    attributes::{AttributeToken, AttributeValue},
    errors::TextUpdateError,
    settings::Settings,
    tag_name::TagName,
    tag_processor::{ParsingNamespace, TagProcessor, TagQuery},
    token::{CommentType, NodeName, Token, TokenType},
};
use std::rc::Rc;

/// Scans a document in the restricted XML dialect.
///
/// Names are case-sensitive, there are no void elements, `<![CDATA[`
/// opens a real CDATA section, and only the five predefined entities
/// and numeric character references are decoded.
///
/// Example:
///
/// ```text
/// let mut processor = XmlProcessor::create_fragment("<post><title>A &amp; B</title></post>");
/// processor.next_tag(&TagQuery::tag("title"));
/// processor.step();
/// processor.get_modifiable_text() == Some("A & B".to_string());
/// ```
pub struct XmlProcessor {
    pub tag_processor: TagProcessor,
}

impl XmlProcessor {
    pub fn new(xml: &[u8]) -> Self {
        Self {
            tag_processor: TagProcessor::with_settings(xml, Settings::xml()),
        }
    }

    pub fn create_fragment(xml: &str) -> Self {
        Self::new(xml.as_bytes())
    }

    /// Treats the contents of every later `name` element as opaque text
    /// ending at the first `</name>`.
    ///
    /// Elements already entered keep the mode they were entered with.
    pub fn declare_element_as_pcdata(&mut self, name: &str) {
        self.tag_processor.declare_pcdata_element(name);
    }

    /// Moves to the next token.
    ///
    /// @return bool Whether a token was parsed.
    pub fn step(&mut self) -> bool {
        self.tag_processor.next_token()
    }

    pub fn next_token(&mut self) -> bool {
        self.tag_processor.next_token()
    }

    pub fn next_tag(&mut self, query: &TagQuery) -> bool {
        self.tag_processor.next_tag(query)
    }

    pub fn advance(&mut self) -> Token {
        self.tag_processor.advance()
    }

    pub fn current_token(&self) -> Option<Token> {
        self.tag_processor.current_token()
    }

    pub fn paused_at_incomplete_token(&self) -> bool {
        self.tag_processor.paused_at_incomplete_token()
    }

    pub fn get_token_type(&self) -> Option<TokenType> {
        self.tag_processor.get_token_type()
    }

    pub fn get_token_name(&self) -> Option<NodeName> {
        self.tag_processor.get_token_name()
    }

    pub fn get_tag(&self) -> Option<TagName> {
        self.tag_processor.get_tag()
    }

    pub fn get_comment_type(&self) -> Option<CommentType> {
        self.tag_processor.get_comment_type()
    }

    /// Always `html`: XML documents have no foreign content.
    pub fn get_namespace(&self) -> ParsingNamespace {
        self.tag_processor.get_namespace()
    }

    pub fn is_tag_closer(&self) -> bool {
        self.tag_processor.is_tag_closer()
    }

    pub fn has_self_closing_flag(&self) -> bool {
        self.tag_processor.has_self_closing_flag()
    }

    pub fn get_attribute(&self, name: &str) -> Option<AttributeValue> {
        self.tag_processor.get_attribute(name)
    }

    pub fn get_attribute_token(&self, name: &str) -> Option<AttributeToken> {
        self.tag_processor.get_attribute_token(name)
    }

    pub fn has_class(&self, wanted_class: &str) -> Option<bool> {
        self.tag_processor.has_class(wanted_class)
    }

    pub fn get_attribute_names_with_prefix(&self, prefix: &str) -> Option<Vec<Rc<str>>> {
        self.tag_processor.get_attribute_names_with_prefix(prefix)
    }

    pub fn get_breadcrumbs(&self) -> Vec<&str> {
        self.tag_processor.get_breadcrumbs()
    }

    pub fn get_current_depth(&self) -> usize {
        self.tag_processor.get_current_depth()
    }

    pub fn matches_breadcrumbs(&self, breadcrumbs: &[&str]) -> bool {
        self.tag_processor.matches_breadcrumbs(breadcrumbs)
    }

    pub fn get_modifiable_text(&self) -> Option<String> {
        self.tag_processor.get_modifiable_text()
    }

    pub fn set_modifiable_text(&mut self, updated_text: &str) -> bool {
        self.tag_processor.set_modifiable_text(updated_text)
    }

    pub fn try_set_modifiable_text(&mut self, updated_text: &str) -> Result<(), TextUpdateError> {
        self.tag_processor.try_set_modifiable_text(updated_text)
    }

    pub fn get_updated_xml(&self) -> String {
        self.tag_processor.get_updated_html()
    }

    pub fn get_updated_bytes(&self) -> Box<[u8]> {
        self.tag_processor.get_updated_bytes()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn names_keep_their_case() {
        let mut processor = XmlProcessor::create_fragment("<Post><Title>x</Title></Post>");
        assert!(processor.step());
        assert_eq!(processor.get_tag(), Some(TagName::from_xml(b"Post")));
        assert!(processor.step());
        assert_eq!(processor.get_breadcrumbs(), vec!["Post", "Title"]);
    }

    #[test]
    fn pcdata_elements_hide_markup() {
        let mut processor = XmlProcessor::create_fragment("<code><b>bold</b></code>");
        processor.declare_element_as_pcdata("code");
        assert!(processor.step());
        assert!(processor.step());
        assert_eq!(processor.get_token_type(), Some(TokenType::Text));
        assert_eq!(processor.get_modifiable_text().as_deref(), Some("<b>bold</b>"));
        assert!(processor.step());
        assert!(processor.is_tag_closer());
        assert_eq!(processor.get_current_depth(), 1);
    }
}
