use gruenerator_text::{normalize_query, tokenize_query};

use crate::models::LexicalQuery;

/// Lexical relevance of `text` for `query` in `[0, 1]`.
///
/// A normalized phrase match scores 1.0; otherwise the score is the share of query tokens
/// found in the normalized text.
pub fn lexical_score(query: &str, text: &str) -> f32 {
	score_normalized(query, &normalize_query(text))
}

/// Best [`lexical_score`] over the query text and each of its variants.
pub fn best_lexical_score(query: &LexicalQuery, text: &str) -> f32 {
	let normalized_text = normalize_query(text);

	std::iter::once(&query.text)
		.chain(&query.variants)
		.map(|candidate| score_normalized(candidate, &normalized_text))
		.fold(0.0, f32::max)
}

fn score_normalized(query: &str, normalized_text: &str) -> f32 {
	let normalized_query = normalize_query(query);

	if normalized_query.is_empty() {
		return 0.0;
	}
	if normalized_text.contains(&normalized_query) {
		return 1.0;
	}

	let tokens: Vec<String> = tokenize_query(&normalized_query)
		.iter()
		.map(|token| normalize_query(token))
		.filter(|token| !token.is_empty())
		.collect();

	if tokens.is_empty() {
		return 0.0;
	}

	let found = tokens.iter().filter(|token| normalized_text.contains(token.as_str())).count();

	found as f32 / tokens.len() as f32
}
