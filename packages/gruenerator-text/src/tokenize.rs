use crate::normalize::SOFT_HYPHEN;

/// Splits a query into words, keeping letters (including umlauts and ß), digits and hyphens.
pub fn tokenize_query(text: &str) -> Vec<String> {
	let cleaned: String = text
		.chars()
		.filter(|ch| *ch != SOFT_HYPHEN)
		.map(|ch| if is_token_char(ch) { ch } else { ' ' })
		.collect();

	cleaned.split_whitespace().map(str::to_string).collect()
}

fn is_token_char(ch: char) -> bool {
	ch.is_ascii_alphanumeric()
		|| ch == '-'
		|| ch.is_whitespace()
		|| matches!(ch, 'Ä' | 'Ö' | 'Ü' | 'ä' | 'ö' | 'ü' | 'ß')
}
