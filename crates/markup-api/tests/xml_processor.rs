use markup_api::{
    AttributeValue, NodeName, TagName, TagQuery, TextUpdateError, TokenType, XmlProcessor,
};
use pretty_assertions::assert_eq;

/// One line per token: type, name and breadcrumbs for tags, collapsed text otherwise.
fn dump_tokens(processor: &mut XmlProcessor) -> Vec<String> {
    let mut lines = Vec::new();
    while processor.step() {
        let token_type = processor.get_token_type().map(|t| t.to_string()).unwrap_or_default();
        let line = match processor.get_token_type() {
            Some(TokenType::Tag) => format!(
                "{token_type} ({}{}) IN {}",
                if processor.is_tag_closer() { "/" } else { "" },
                processor.get_token_name().map(|n| n.to_string()).unwrap_or_default(),
                processor.get_breadcrumbs().join(" > ")
            ),
            Some(TokenType::Text) => {
                let text = processor.get_modifiable_text().unwrap_or_default();
                format!("{token_type} ({})", text.split_whitespace().collect::<Vec<_>>().join(" "))
            }
            _ => token_type,
        };
        lines.push(line);
    }
    lines
}

#[test]
fn pcdata_elements_are_scanned_as_raw_text() {
    let mut processor = XmlProcessor::create_fragment(
        "<root>\n    <span>\n        Im inside\n        </input>\n    </span>\n    <div>Heyya</div>\n</root>",
    );
    processor.declare_element_as_pcdata("span");

    assert_eq!(
        dump_tokens(&mut processor),
        vec![
            "#tag (root) IN root",
            "#text ()",
            "#tag (span) IN root > span",
            "#text (Im inside </input>)",
            "#tag (/span) IN root > span",
            "#text ()",
            "#tag (div) IN root > div",
            "#text (Heyya)",
            "#tag (/div) IN root > div",
            "#text ()",
            "#tag (/root) IN root",
        ]
    );
    assert!(!processor.paused_at_incomplete_token());
}

#[test]
fn names_are_case_sensitive() {
    let mut processor = XmlProcessor::create_fragment("<Item><item>x</Item></item></Item>");
    let lines = dump_tokens(&mut processor);
    assert_eq!(
        lines,
        vec![
            "#tag (Item) IN Item",
            "#tag (item) IN Item > item",
            "#text (x)",
            "#tag (/Item) IN Item",
            "#tag (/item) IN item",
            "#tag (/Item) IN Item",
        ]
    );
}

#[test]
fn no_void_elements() {
    let mut processor = XmlProcessor::create_fragment("<br><img/>text</br>");
    assert!(processor.step());
    assert_eq!(processor.get_breadcrumbs(), vec!["br"]);
    assert!(processor.step());
    assert!(processor.has_self_closing_flag());
    assert_eq!(processor.get_breadcrumbs(), vec!["br", "img"]);
    assert!(processor.step());
    assert_eq!(processor.get_current_depth(), 1);
}

#[test]
fn xml_text_decoding() {
    let mut processor =
        XmlProcessor::create_fragment("<t>&lt;a&gt; &amp; &quot;b&quot; &#65;&#x42; &copy;</t>");
    processor.next_tag(&TagQuery::tag("t"));
    processor.step();
    assert_eq!(
        processor.get_modifiable_text().as_deref(),
        Some("<a> & \"b\" AB &copy;")
    );
}

#[test]
fn xml_attributes() {
    let mut processor =
        XmlProcessor::create_fragment(r#"<entry Lang="en" xml:id="a&amp;b" lang="fr"/>"#);
    assert!(processor.next_tag(&TagQuery::tag("entry")));
    assert_eq!(processor.get_attribute("Lang"), Some(AttributeValue::String("en".into())));
    assert_eq!(processor.get_attribute("lang"), Some(AttributeValue::String("fr".into())));
    assert_eq!(processor.get_attribute("LANG"), Some(AttributeValue::BooleanFalse));
    assert_eq!(processor.get_attribute("xml:id"), Some(AttributeValue::String("a&b".into())));

    let names = processor.get_attribute_names_with_prefix("L").unwrap();
    assert_eq!(names.len(), 1);
    assert_eq!(&*names[0], "Lang");

    let token = processor.get_attribute_token("Lang").unwrap();
    assert_eq!((token.name.start, token.name.length), (7, 4));
    assert!(processor.get_attribute_token("LANG").is_none());
}

#[test]
fn xml_class_names() {
    let mut processor = XmlProcessor::create_fragment(r#"<p class="Note wide"/><q/>"#);
    assert!(processor.next_tag(&TagQuery::tag("p")));
    assert_eq!(processor.has_class("Note"), Some(true));
    assert_eq!(processor.has_class("note"), Some(false));
    assert!(processor.next_tag(&TagQuery::tag("q")));
    assert_eq!(processor.has_class("Note"), Some(false));
}

#[test]
fn self_closing_pcdata_elements_are_empty() {
    let mut processor = XmlProcessor::create_fragment("<root><span/><div>x</div></root>");
    processor.declare_element_as_pcdata("span");

    assert_eq!(
        dump_tokens(&mut processor),
        vec![
            "#tag (root) IN root",
            "#tag (span) IN root > span",
            "#tag (div) IN root > div",
            "#text (x)",
            "#tag (/div) IN root > div",
            "#tag (/root) IN root",
        ]
    );
    assert!(!processor.paused_at_incomplete_token());
}

#[test]
fn queries_match_exact_names() {
    let mut processor = XmlProcessor::create_fragment("<Title>a</Title><title>b</title>");
    assert!(processor.next_tag(&TagQuery::tag("title")));
    assert_eq!(processor.get_tag(), Some(TagName::from_xml(b"title")));
    assert_eq!(
        processor.get_token_name(),
        Some(NodeName::Tag(TagName::from_xml(b"title")))
    );
}

#[test]
fn updating_xml_text() {
    let mut processor = XmlProcessor::create_fragment(
        "<post><title>Old</title><content>keep <b>me</b></content></post>",
    );
    processor.declare_element_as_pcdata("content");

    processor.next_tag(&TagQuery::tag("title"));
    processor.step();
    assert!(processor.set_modifiable_text("Fish & <Chips>"));

    processor.next_tag(&TagQuery::tag("content"));
    processor.step();
    assert_eq!(processor.get_modifiable_text().as_deref(), Some("keep <b>me</b>"));
    assert_eq!(
        processor.try_set_modifiable_text("</content>"),
        Err(TextUpdateError::WouldCloseElement("content".into()))
    );
    assert!(processor.set_modifiable_text("</Content> is fine"));

    assert_eq!(
        processor.get_updated_xml(),
        "<post><title>Fish &amp; &lt;Chips&gt;</title><content></Content> is fine</content></post>"
    );
}

#[test]
fn processing_instructions_report_their_target() {
    let mut processor = XmlProcessor::create_fragment("<?xml version=\"1.0\"?><root/>");
    assert!(processor.step());
    assert_eq!(processor.get_tag(), Some(TagName::from_xml(b"xml")));
    assert_eq!(processor.get_modifiable_text().as_deref(), Some(" version=\"1.0\""));
    assert!(!processor.set_modifiable_text("x"));
}
