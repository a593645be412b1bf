use std::{collections::HashSet, sync::LazyLock};

use regex::Regex;

use crate::normalize::{WHITESPACE_RUN, collapse_whitespace, fold_umlauts, normalize_unicode_digits};

const MIN_VARIANT_CHARS: usize = 2;
const MIN_COMPOUND_CHARS: usize = 3;

static DASH: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"[\-\x{2013}\x{2014}]").expect("dash pattern must compile"));
static SEPARATOR: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"[\-\x{2013}\x{2014}\s]").expect("separator pattern must compile"));
static DECIMAL_COMMA: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"([0-9]),([0-9])").expect("decimal comma pattern must compile"));
static DECIMAL_POINT: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"([0-9])\.([0-9])").expect("decimal point pattern must compile"));

#[derive(Default)]
struct VariantSet {
	items: Vec<String>,
	seen: HashSet<String>,
}
impl VariantSet {
	fn push(&mut self, value: String) {
		if value.is_empty() || self.seen.contains(&value) {
			return;
		}

		self.seen.insert(value.clone());
		self.items.push(value);
	}
}

/// Alternate spellings of `query` that should all hit the same documents in a lexical search.
///
/// Hyphenated, space-separated and fused compound spellings are all kept, so this deliberately
/// does not run the hyphen joining of [`crate::normalize_query`]. Order is first-seen and stable.
pub fn query_variants(query: &str) -> Vec<String> {
	let base = query.trim().to_lowercase();

	if base.is_empty() {
		return Vec::new();
	}

	let mut variants = VariantSet::default();

	variants.push(base.clone());
	variants.push(collapse_whitespace(&DASH.replace_all(&base, " ")));
	variants.push(WHITESPACE_RUN.replace_all(&base, "-").into_owned());

	let compound = SEPARATOR.replace_all(&base, "").into_owned();

	// Two-letter compounds match far too much.
	if compound.chars().count() >= MIN_COMPOUND_CHARS {
		variants.push(compound);
	}

	for candidate in [
		normalize_unicode_digits(&base),
		DECIMAL_COMMA.replace_all(&base, "${1}.${2}").into_owned(),
		DECIMAL_POINT.replace_all(&base, "${1},${2}").into_owned(),
	] {
		if candidate != base {
			variants.push(candidate);
		}
	}

	let folded: Vec<String> = variants.items.iter().map(|variant| fold_umlauts(variant)).collect();

	for variant in folded {
		variants.push(variant);
	}

	variants
		.items
		.into_iter()
		.filter(|variant| variant.trim().chars().count() >= MIN_VARIANT_CHARS)
		.collect()
}
