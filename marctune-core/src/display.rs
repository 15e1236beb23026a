//! Display formatting for generated MARC text
//!
//! Models answer in mnemonic form (`=245  10$aTitle`). Cataloguers read
//! records as `245 10 |aTitle`, with blank indicators written as `_`.

use regex::Regex;
use std::sync::OnceLock;

static DATA_FIELD_TAG: OnceLock<Regex> = OnceLock::new();

/// Three ASCII digits that do not start with `00`
fn data_field_tag() -> &'static Regex {
    DATA_FIELD_TAG.get_or_init(|| {
        Regex::new(r"^(?:[1-9][0-9]{2}|0[1-9][0-9])").expect("data field tag pattern is valid")
    })
}

/// Reformat raw generated MARC text for display
///
/// Lines are trimmed, blank ones dropped, and every `$` delimiter becomes ` |`.
///
/// Mnemonic data field lines (`=TAG  II...`) are rebuilt as `TAG II...`.
/// Lines without the leading `=` are taken to use a single separator
/// (`TAG II...`) and only have their indicator positions rewritten. In both
/// cases a blank indicator (`\` or space) is shown as `_`. Control fields
/// and the leader only lose the leading `=`.
pub fn format_for_display(raw: &str) -> String {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(format_line)
        .collect::<Vec<_>>()
        .join("\n")
}

fn blank_indicator(c: char) -> char {
    match c {
        '\\' | ' ' => '_',
        _ => c,
    }
}

fn format_line(line: &str) -> String {
    match line.strip_prefix('=') {
        Some(mnemonic) => format_mnemonic(mnemonic),
        None => format_spaced(line),
    }
}

/// `TAG  II$a...` with two separator spaces
fn format_mnemonic(line: &str) -> String {
    let chars: Vec<char> = line.chars().collect();
    if chars.len() < 7 || !data_field_tag().is_match(line) {
        return line.replace('$', " |");
    }

    let tag: String = chars[..3].iter().collect();
    let indicators: String = chars[5..7].iter().copied().map(blank_indicator).collect();
    let rest: String = chars[7..].iter().collect();
    format!("{tag} {indicators}{}", rest.replace('$', " |"))
}

/// `TAG II$a...` with one separator space
fn format_spaced(line: &str) -> String {
    let line = line.replace('$', " |");
    if line.chars().count() < 6 || !data_field_tag().is_match(&line) {
        return line;
    }

    line.chars()
        .enumerate()
        .map(|(i, c)| if i == 4 || i == 5 { blank_indicator(c) } else { c })
        .collect()
}
