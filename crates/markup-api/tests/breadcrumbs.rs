use markup_api::{ParsingNamespace, TagProcessor, TagQuery, TokenType, VisitClosers};
use pretty_assertions::assert_eq;

/// Breadcrumbs at every token, rendered like `div > p`.
fn breadcrumb_trail(html: &str) -> Vec<String> {
    let mut processor = TagProcessor::create_fragment(html);
    let mut trail = Vec::new();
    while processor.next_token() {
        trail.push(processor.get_breadcrumbs().join(" > "));
    }
    trail
}

#[test]
fn text_inside_nested_elements() {
    let mut processor = TagProcessor::create_fragment("<span><em>x</em></span>");
    while processor.next_token() {
        if processor.get_token_type() == Some(TokenType::Text) {
            break;
        }
    }

    assert_eq!(processor.get_modifiable_text().as_deref(), Some("x"));
    assert_eq!(processor.get_breadcrumbs(), vec!["span", "em"]);
    assert_eq!(processor.get_current_depth(), 2);
}

#[test]
fn tags_end_their_own_breadcrumbs() {
    assert_eq!(
        breadcrumb_trail("<div><img><br/><p>a</p></div>"),
        vec![
            "div",
            "div > img",
            "div > br",
            "div > p",
            "div > p",
            "div > p",
            "div",
        ]
    );
}

#[test]
fn closers_pop_implicitly_closed_elements() {
    assert_eq!(
        breadcrumb_trail("<div><p><b>a</div>b"),
        vec!["div", "div > p", "div > p > b", "div > p > b", "div", ""]
    );
}

#[test]
fn unmatched_closers_are_ignored() {
    assert_eq!(
        breadcrumb_trail("<div></span>a</div>"),
        vec!["div", "div > span", "div", "div"]
    );
}

#[test]
fn self_closing_flag_only_matters_outside_raw_text() {
    let mut processor = TagProcessor::create_fragment("<custom-el/><div/>x");
    assert!(processor.next_token());
    assert!(processor.has_self_closing_flag());
    assert!(processor.next_token());
    assert!(processor.has_self_closing_flag());
    assert!(processor.next_token());
    assert_eq!(processor.get_current_depth(), 0);

    let mut processor = TagProcessor::create_fragment("<title/>not a tag <b></title>");
    assert!(processor.next_token());
    assert!(processor.next_token());
    assert_eq!(processor.get_token_type(), Some(TokenType::Text));
    assert_eq!(processor.get_modifiable_text().as_deref(), Some("not a tag <b>"));
    assert_eq!(processor.get_breadcrumbs(), vec!["title"]);
}

#[test]
fn tag_names_are_lowercased() {
    let mut processor = TagProcessor::create_fragment("<DIV><Span>");
    processor.next_token();
    processor.next_token();
    assert_eq!(processor.get_breadcrumbs(), vec!["div", "span"]);
    assert!(processor.matches_breadcrumbs(&["DIV", "span"]));
    assert!(processor.matches_breadcrumbs(&["*", "SPAN"]));
    assert!(!processor.matches_breadcrumbs(&["p", "span"]));
    assert!(!processor.matches_breadcrumbs(&["html", "div", "span"]));
}

#[test]
fn br_closers_are_openers() {
    let mut processor = TagProcessor::create_fragment("<p></br>");
    processor.next_token();
    assert!(processor.next_token());
    assert!(!processor.is_tag_closer());
    assert_eq!(processor.get_breadcrumbs(), vec!["p", "br"]);
    assert_eq!(processor.get_attribute("class"), None);
}

#[test]
fn foreign_content_namespaces() {
    let mut processor =
        TagProcessor::create_fragment("<svg><title><b>x</b></title><rect/></svg><p>");
    let mut namespaces = Vec::new();
    while processor.next_token() {
        namespaces.push((
            processor.get_token_name().map(|n| n.to_string()).unwrap_or_default(),
            processor.get_namespace(),
        ));
    }

    let expected = [
        ("svg", ParsingNamespace::Svg),
        ("title", ParsingNamespace::Svg),
        ("b", ParsingNamespace::Html),
        ("#text", ParsingNamespace::Html),
        ("b", ParsingNamespace::Html),
        ("title", ParsingNamespace::Svg),
        ("rect", ParsingNamespace::Svg),
        ("svg", ParsingNamespace::Svg),
        ("p", ParsingNamespace::Html),
    ];
    let expected: Vec<_> = expected
        .into_iter()
        .map(|(name, namespace)| (name.to_string(), namespace))
        .collect();
    assert_eq!(namespaces, expected);
}

#[test]
fn integration_points_parse_html() {
    let mut processor = TagProcessor::create_fragment("<math><mi><style>a</style></mi></math>");
    processor.next_tag(&TagQuery::tag("style"));
    assert_eq!(processor.get_namespace(), ParsingNamespace::Html);
    assert!(processor.next_token());
    assert_eq!(processor.get_modifiable_text().as_deref(), Some("a"));
    assert_eq!(processor.get_breadcrumbs(), vec!["math", "mi", "style"]);
}

#[test]
fn next_tag_queries() {
    let html = r#"<div class="wrap"><p class="a b">1</p><p class="b">2</p><span><p class="b">3</p></span></div>"#;

    let mut processor = TagProcessor::create_fragment(html);
    assert!(processor.next_tag(&TagQuery::class("b")));
    assert_eq!(processor.get_attribute("class").and_then(|v| v.as_str().map(String::from)).as_deref(), Some("a b"));

    let mut processor = TagProcessor::create_fragment(html);
    assert!(processor.next_tag(&TagQuery {
        match_offset: 3,
        ..TagQuery::tag("P")
    }));
    assert_eq!(processor.get_breadcrumbs(), vec!["div", "span", "p"]);

    let mut processor = TagProcessor::create_fragment(html);
    assert!(processor.next_tag(&TagQuery::breadcrumbs(&["span", "p"])));
    assert_eq!(processor.has_class("b"), Some(true));
    assert_eq!(processor.has_class("a"), Some(false));
    assert!(!processor.next_tag(&TagQuery::breadcrumbs(&["span", "p"])));

    let mut processor = TagProcessor::create_fragment(html);
    let mut closers = 0;
    while processor.next_tag(&TagQuery {
        tag_closers: VisitClosers::Visit,
        ..TagQuery::tag("p")
    }) {
        if processor.is_tag_closer() {
            closers += 1;
        }
    }
    assert_eq!(closers, 3);
}
