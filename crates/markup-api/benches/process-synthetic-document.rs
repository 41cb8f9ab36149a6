use markup_api::{TagProcessor, TagQuery, TokenType, XmlProcessor};

fn main() {
    divan::main();
}

/// A document mixing every kind of token the processors scan.
fn synthetic_document(sections: usize) -> String {
    let mut html = String::from("<!DOCTYPE html><html><head><title>Fish &amp; Chips</title>");
    html.push_str("<style>body > p { color: red; }</style></head><body>");

    for i in 0..sections {
        html.push_str(&format!(
            "<section class=\"post post-{i}\" data-id={i}><h2>Heading {i}</h2>\
             <!-- comment {i} --><p>Text with <em>emphasis</em> &amp; a <a href=\"/x?a=1&b=2\">link</a>.</p>\
             <pre>\nformatted</pre><textarea>a < b</textarea><img src=\"{i}.png\" alt=\"\">\
             <script>if (a < b && c) {{ document.write('<p>'); }}</script>\
             <svg><![CDATA[ data ]]><title>Icon</title></svg><?pi target?></section>"
        ));
    }

    html.push_str("</body></html>");
    html
}

fn synthetic_xml(sections: usize) -> String {
    let mut xml = String::from("<?xml version=\"1.0\"?><feed>");
    for i in 0..sections {
        xml.push_str(&format!(
            "<entry id=\"{i}\"><title>Entry &lt;{i}&gt;</title><![CDATA[ <raw> ]]>\
             <code><b>not a tag</b></code></entry>"
        ));
    }
    xml.push_str("</feed>");
    xml
}

#[divan::bench(args = [10, 1000])]
fn bench_tag_processor_tokens(bencher: divan::Bencher, sections: usize) {
    let html = synthetic_document(sections);
    bencher.bench(|| {
        let mut processor = TagProcessor::new(html.as_bytes());
        while processor.next_token() {}
        processor
    });
}

#[divan::bench(args = [10, 1000])]
fn bench_tag_processor_class_query(bencher: divan::Bencher, sections: usize) {
    let html = synthetic_document(sections);
    bencher.bench(|| {
        let mut processor = TagProcessor::new(html.as_bytes());
        let mut found = 0;
        while processor.next_tag(&TagQuery::class("post")) {
            found += 1;
        }
        found
    });
}

#[divan::bench(args = [10, 1000])]
fn bench_rewrite_text(bencher: divan::Bencher, sections: usize) {
    let html = synthetic_document(sections);
    bencher.bench(|| {
        let mut processor = TagProcessor::new(html.as_bytes());
        while processor.next_token() {
            if processor.get_token_type() == Some(TokenType::Text) {
                if let Some(text) = processor.get_modifiable_text() {
                    processor.set_modifiable_text(&text.to_uppercase());
                }
            }
        }
        processor.get_updated_html()
    });
}

#[divan::bench(args = [10, 1000])]
fn bench_xml_processor_tokens(bencher: divan::Bencher, sections: usize) {
    let xml = synthetic_xml(sections);
    bencher.bench(|| {
        let mut processor = XmlProcessor::create_fragment(&xml);
        processor.declare_element_as_pcdata("code");
        while processor.step() {}
        processor.get_updated_xml()
    });
}
