use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

pub(crate) const SOFT_HYPHEN: char = '\u{00AD}';

/// Sub- and superscript digits with their ASCII counterparts.
const UNICODE_DIGITS: [(char, char); 20] = [
	('\u{2080}', '0'),
	('\u{2081}', '1'),
	('\u{2082}', '2'),
	('\u{2083}', '3'),
	('\u{2084}', '4'),
	('\u{2085}', '5'),
	('\u{2086}', '6'),
	('\u{2087}', '7'),
	('\u{2088}', '8'),
	('\u{2089}', '9'),
	('\u{2070}', '0'),
	('\u{00B9}', '1'),
	('\u{00B2}', '2'),
	('\u{00B3}', '3'),
	('\u{2074}', '4'),
	('\u{2075}', '5'),
	('\u{2076}', '6'),
	('\u{2077}', '7'),
	('\u{2078}', '8'),
	('\u{2079}', '9'),
];

// Hyphen-minus, hyphen, non-breaking hyphen, en dash and em dash.
static DASH_BETWEEN_LETTERS: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"(\p{L})\s*[\-\x{2010}\x{2011}\x{2013}\x{2014}]\s*(\p{L})")
		.expect("dash pattern must compile")
});
pub(crate) static WHITESPACE_RUN: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern must compile"));

/// Canonical form used for diacritic- and hyphenation-insensitive matching.
///
/// Steps run in a fixed order: soft hyphens are stripped, dashes between letters are removed so
/// line-wrapped compounds fuse, whitespace is collapsed, sub/superscript digits become ASCII,
/// umlauts fold to digraphs and the result is lowercased. The function is idempotent.
pub fn normalize_query(text: &str) -> String {
	if text.is_empty() {
		return String::new();
	}

	// A soft hyphen between a letter and a combining mark blocks composition.
	let composed: String = text.chars().filter(|ch| *ch != SOFT_HYPHEN).nfc().collect();
	let joined = join_dashed_letters(&composed);
	let collapsed = collapse_whitespace(&joined);
	let digits = normalize_unicode_digits(&collapsed);

	fold_umlauts(&digits).to_lowercase()
}

pub fn fold_umlauts(text: &str) -> String {
	let mut out = String::with_capacity(text.len() + 4);

	for ch in text.chars() {
		match ch {
			'ä' => out.push_str("ae"),
			'ö' => out.push_str("oe"),
			'ü' => out.push_str("ue"),
			'Ä' => out.push_str("Ae"),
			'Ö' => out.push_str("Oe"),
			'Ü' => out.push_str("Ue"),
			'ß' => out.push_str("ss"),
			'ẞ' => out.push_str("SS"),
			other => out.push(other),
		}
	}

	out
}

pub fn normalize_unicode_digits(text: &str) -> String {
	text.chars()
		.map(|ch| {
			UNICODE_DIGITS
				.iter()
				.find_map(|(unicode, ascii)| (*unicode == ch).then_some(*ascii))
				.unwrap_or(ch)
		})
		.collect()
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
	WHITESPACE_RUN.replace_all(text, " ").trim().to_string()
}

fn join_dashed_letters(text: &str) -> String {
	let mut out = text.to_string();

	// Matches cannot overlap, so "a-b-c" needs a second pass.
	loop {
		let next = DASH_BETWEEN_LETTERS.replace_all(&out, "${1}${2}").into_owned();

		if next == out {
			return out;
		}

		out = next;
	}
}
