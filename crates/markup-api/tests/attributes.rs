use markup_api::{attributes::QuoteStyle, AttributeValue, TagProcessor, TagQuery};
use pretty_assertions::assert_eq;

fn string(value: &str) -> Option<AttributeValue> {
    Some(AttributeValue::String(value.into()))
}

#[test]
fn attribute_values_are_decoded() {
    let mut processor = TagProcessor::create_fragment(
        r#"<a href="/search?q=fish&amp;chips" title='&lt;hello&gt;' data-x=&copy;2024 download>"#,
    );
    assert!(processor.next_tag(&TagQuery::default()));

    assert_eq!(processor.get_attribute("href"), string("/search?q=fish&chips"));
    assert_eq!(processor.get_attribute("TITLE"), string("<hello>"));
    assert_eq!(processor.get_attribute("data-x"), string("©2024"));
    assert_eq!(processor.get_attribute("download"), Some(AttributeValue::BooleanTrue));
    assert_eq!(processor.get_attribute("missing"), Some(AttributeValue::BooleanFalse));
}

#[test]
fn ambiguous_ampersands_in_attributes_stay_literal() {
    let mut processor = TagProcessor::create_fragment(r#"<a href="?a=1&copy=2&amp;b">"#);
    processor.next_token();
    assert_eq!(processor.get_attribute("href"), string("?a=1&copy=2&b"));
}

#[test]
fn first_duplicate_attribute_wins() {
    let mut processor = TagProcessor::create_fragment(r#"<div id="one" ID="two" id=three>"#);
    processor.next_token();

    assert_eq!(processor.get_attribute("id"), string("one"));
    let token = processor.get_attribute_token("id").unwrap();
    assert_eq!(token.quote_style, QuoteStyle::Double);
    assert_eq!(token.span.range(), 5..13);
}

#[test]
fn attribute_names_with_prefix() {
    let mut processor = TagProcessor::create_fragment(
        r#"<div data-ENABLED class="test" DATA-test-id="14" data-enabled=no>Test</div>"#,
    );
    processor.next_token();

    let names = processor.get_attribute_names_with_prefix("data-").unwrap();
    let names: Vec<&str> = names.iter().map(|name| name.as_ref()).collect();
    assert_eq!(names, vec!["data-enabled", "data-test-id"]);

    processor.next_token();
    assert_eq!(processor.get_attribute_names_with_prefix("data-"), None);
}

#[test]
fn non_tags_have_no_attributes() {
    let mut processor = TagProcessor::create_fragment("<p class=x>text</p class=y>");
    assert_eq!(processor.get_attribute("class"), None);

    processor.next_token();
    assert_eq!(processor.get_attribute("class"), string("x"));

    processor.next_token();
    assert_eq!(processor.get_attribute("class"), None);
    assert_eq!(processor.has_class("x"), None);

    processor.next_token();
    assert!(processor.is_tag_closer());
    assert_eq!(processor.get_attribute("class"), None);
}

#[test]
fn quoted_values_may_contain_tag_closers() {
    let mut processor = TagProcessor::create_fragment(r#"<img alt="a > b" src=x.png>after"#);
    processor.next_token();
    assert_eq!(processor.get_attribute("alt"), string("a > b"));
    assert_eq!(processor.get_attribute("src"), string("x.png"));

    processor.next_token();
    assert_eq!(processor.get_modifiable_text().as_deref(), Some("after"));
}

#[test]
fn class_names_split_on_html_whitespace() {
    let mut processor =
        TagProcessor::create_fragment("<div class=\"  one\ttwo\nthree  Four \">");
    processor.next_token();

    for class_name in ["one", "two", "three", "Four"] {
        assert_eq!(processor.has_class(class_name), Some(true), "{class_name}");
    }
    assert_eq!(processor.has_class("four"), Some(false));
    assert_eq!(processor.has_class("on"), Some(false));
}
