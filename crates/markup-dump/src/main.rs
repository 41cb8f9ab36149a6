use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use clap::Parser;
use markup_api::{Settings, TagProcessor, TokenKind, TokenType};

/// Prints the token stream of an HTML or XML document, one token per line.
#[derive(Parser, Debug)]
#[command(name = "markup-dump")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Dump a file
    markup-dump ./index.html

    # Dump an XML feed, treating <code> contents as text
    markup-dump --xml --pcdata code ./feed.xml

    # Dump inline markup
    markup-dump --html '<p>Fish &amp; Chips</p>'

    # Read from stdin
    cat index.html | markup-dump -
"#)]
struct Cli {
    /// Path to the document, or - for stdin
    #[arg(value_name = "FILE")]
    path: Option<PathBuf>,

    /// Markup to scan instead of a file
    #[arg(long, value_name = "STRING", conflicts_with = "path")]
    html: Option<String>,

    /// Scan the document as XML
    #[arg(long)]
    xml: bool,

    /// Treat the contents of this XML element as text (repeatable)
    #[arg(long, value_name = "NAME", requires = "xml")]
    pcdata: Vec<String>,

    /// Print the raw byte offsets of every token
    #[arg(long)]
    offsets: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let input = read_input(&cli)?;

    let settings = if cli.xml {
        cli.pcdata
            .iter()
            .fold(Settings::xml(), |settings, name| settings.pcdata_element(name))
    } else {
        Settings::html()
    };

    let mut processor = TagProcessor::with_settings(&input, settings);
    while processor.next_token() {
        let line = describe_token(&processor);
        match (cli.offsets, processor.current_token()) {
            (true, Some(token)) => println!(
                "{:>6}..{:<6} {line}",
                token.full_span.start,
                token.full_span.end()
            ),
            _ => println!("{line}"),
        }
    }

    if let Some(token) = processor.current_token() {
        if token.kind == TokenKind::Incomplete {
            anyhow::bail!(
                "document ends inside an unfinished token at byte {}",
                token.full_span.start
            );
        }
    }

    Ok(())
}

fn read_input(cli: &Cli) -> anyhow::Result<Vec<u8>> {
    if let Some(ref html) = cli.html {
        return Ok(html.as_bytes().to_vec());
    }

    match cli.path.as_deref() {
        Some(path) if path.as_os_str() == "-" => {
            let mut input = Vec::new();
            io::stdin().read_to_end(&mut input)?;
            Ok(input)
        }
        Some(path) => fs::read(path)
            .map_err(|e| anyhow::anyhow!("could not read {}: {}", path.display(), e)),
        None => anyhow::bail!("nothing to dump: pass a file path, - for stdin, or --html"),
    }
}

fn describe_token(processor: &TagProcessor) -> String {
    let Some(token_type) = processor.get_token_type() else {
        return String::new();
    };

    let name = processor
        .get_token_name()
        .map(|name| name.to_string())
        .unwrap_or_default();

    match token_type {
        TokenType::Tag => format!(
            "{token_type} ({}{name}) IN {}",
            if processor.is_tag_closer() { "/" } else { "" },
            processor.get_breadcrumbs().join(" > ")
        ),

        TokenType::Comment => format!(
            "{token_type} [{:?}] ({})",
            processor.get_comment_type(),
            collapse_whitespace(&processor.get_modifiable_text().unwrap_or_default())
        ),

        _ => match processor.get_modifiable_text() {
            Some(text) => format!("{token_type} ({})", collapse_whitespace(&text)),
            None => token_type.to_string(),
        },
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
