use proc_macro::TokenStream;
use proc_macro2::Literal;
use quote::quote;
use serde::Deserialize;
use std::{collections::BTreeMap, fs, path::PathBuf};
use syn::{parse_macro_input, LitStr};

#[derive(Deserialize)]
struct DeserializedJSONEntity {
    characters: Box<str>,
}

/// Named references grouped by the two bytes following the `&`.
///
/// Every named reference in the HTML table has at least two bytes after the
/// ampersand, so the first two bytes make a cheap bucket key. The remaining
/// bytes (including the optional trailing `;`) are the suffix to compare.
type PrefixGroups = BTreeMap<[u8; 2], Vec<(Vec<u8>, Vec<u8>)>>;

fn resolve_path(file_path: &str) -> PathBuf {
    let relative = PathBuf::from(file_path);
    if relative.is_absolute() {
        return relative;
    }

    // Paths are relative to the crate invoking the macro, not to the cwd of rustc.
    match std::env::var_os("CARGO_MANIFEST_DIR") {
        Some(manifest_dir) => PathBuf::from(manifest_dir).join(relative),
        None => relative,
    }
}

fn process_file(file_path: &str) -> PrefixGroups {
    let path = resolve_path(file_path);
    let json_content = fs::read_to_string(&path)
        .unwrap_or_else(|_| panic!("Failed to read entity table: {}", path.display()));

    let entities: BTreeMap<String, DeserializedJSONEntity> =
        serde_json::from_str(&json_content).expect("Failed to parse entity table JSON");

    let mut prefix_map = PrefixGroups::new();

    for (entity_name, entity_data) in entities {
        let Some(name) = entity_name.strip_prefix('&') else {
            continue;
        };
        let name = name.as_bytes();
        if name.len() < 2 {
            continue;
        }

        let prefix = [name[0], name[1]];
        let suffix = name[2..].to_vec();
        let characters = entity_data.characters.as_bytes().to_vec();

        prefix_map
            .entry(prefix)
            .or_default()
            .push((suffix, characters));
    }

    // Longest suffix first so that `&notin;` wins over `&not`.
    for entries in prefix_map.values_mut() {
        entries.sort_by(|(a, _), (b, _)| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    }

    prefix_map
}

/// Expands to a static table of named references and a `lazy_static`
/// index over it named `NAMED_REFERENCES`.
///
/// ```ignore
/// gen_entities::entities_lookup!("data/entities.json");
/// let candidates = NAMED_REFERENCES.get(b"am");
/// ```
#[proc_macro]
pub fn entities_lookup(input: TokenStream) -> TokenStream {
    let file_path = parse_macro_input!(input as LitStr).value();
    let prefix_map = process_file(&file_path);

    let groups = prefix_map.into_iter().map(|(prefix, suffixes)| {
        let [first, second] = prefix;
        let pairs = suffixes.iter().map(|(suffix, characters)| {
            let suffix = Literal::byte_string(suffix);
            let characters = Literal::byte_string(characters);
            quote! { (#suffix as &[u8], #characters as &[u8]) }
        });

        quote! {
            ([#first, #second], &[#(#pairs),*] as &[(&[u8], &[u8])])
        }
    });

    let result = quote! {
        static NAMED_REFERENCE_GROUPS: &[([u8; 2], &[(&[u8], &[u8])])] = &[#(#groups),*];

        ::lazy_static::lazy_static! {
            static ref NAMED_REFERENCES: ::std::collections::BTreeMap<
                [u8; 2],
                &'static [(&'static [u8], &'static [u8])],
            > = NAMED_REFERENCE_GROUPS.iter().copied().collect();
        }
    };

    result.into()
}
