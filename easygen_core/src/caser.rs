use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// An identifier naming convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Convention {
	/// `lower_snake_case`
	LowerSnake,
	/// `kebab-case`
	Kebab,
	/// `lowerCamelCase`
	LowerCamel,
	/// `UpperCamelCase`
	UpperCamel,
	/// `SCREAMING_SNAKE_CASE`
	ScreamingSnake,
}

impl Convention {
	/// Split an identifier written in this convention into its words. Empty
	/// words produced by repeated or surrounding separators are dropped.
	pub fn split(self, identifier: &str) -> Vec<&str> {
		match self {
			Self::LowerSnake | Self::ScreamingSnake => split_on(identifier, '_'),
			Self::Kebab => split_on(identifier, '-'),
			Self::LowerCamel | Self::UpperCamel => split_camel(identifier),
		}
	}

	/// Join words using this convention's separator and capitalization.
	pub fn join<S: AsRef<str>>(self, words: &[S]) -> String {
		let words = words.iter().map(S::as_ref);
		match self {
			Self::LowerSnake => words.map(str::to_lowercase).collect::<Vec<_>>().join("_"),
			Self::Kebab => words.map(str::to_lowercase).collect::<Vec<_>>().join("-"),
			Self::ScreamingSnake => words.map(str::to_uppercase).collect::<Vec<_>>().join("_"),
			Self::UpperCamel => words.map(capitalize).collect(),
			Self::LowerCamel => {
				words
					.enumerate()
					.map(|(index, word)| {
						if index == 0 {
							word.to_lowercase()
						} else {
							capitalize(word)
						}
					})
					.collect()
			}
		}
	}
}

impl fmt::Display for Convention {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Self::LowerSnake => "lower_snake_case",
			Self::Kebab => "kebab-case",
			Self::LowerCamel => "lowerCamelCase",
			Self::UpperCamel => "UpperCamelCase",
			Self::ScreamingSnake => "SCREAMING_SNAKE_CASE",
		};
		f.write_str(name)
	}
}

/// Converts identifiers from one naming convention to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caser {
	pub from: Convention,
	pub to: Convention,
}

impl Caser {
	pub const fn new(from: Convention, to: Convention) -> Self {
		Self { from, to }
	}

	/// Tokenize `identifier` using the source convention and rejoin the words
	/// using the target convention.
	pub fn convert(self, identifier: &str) -> String {
		convert(identifier, self.from, self.to)
	}
}

/// Convert `identifier` from the `from` convention to the `to` convention.
///
/// Never fails. Input that does not follow `from` is split on a best-effort
/// basis.
pub fn convert(identifier: &str, from: Convention, to: Convention) -> String {
	to.join(&from.split(identifier))
}

/// The case converters available to every template, keyed by helper name.
pub const CASERS: [(&str, Caser); 9] = [
	(
		"cls2lc",
		Caser::new(Convention::LowerSnake, Convention::LowerCamel),
	),
	(
		"cls2uc",
		Caser::new(Convention::LowerSnake, Convention::UpperCamel),
	),
	(
		"cls2ss",
		Caser::new(Convention::LowerSnake, Convention::ScreamingSnake),
	),
	("ck2lc", Caser::new(Convention::Kebab, Convention::LowerCamel)),
	("ck2uc", Caser::new(Convention::Kebab, Convention::UpperCamel)),
	("ck2ls", Caser::new(Convention::Kebab, Convention::LowerSnake)),
	(
		"ck2ss",
		Caser::new(Convention::Kebab, Convention::ScreamingSnake),
	),
	(
		"clc2ss",
		Caser::new(Convention::LowerCamel, Convention::ScreamingSnake),
	),
	(
		"cuc2ss",
		Caser::new(Convention::UpperCamel, Convention::ScreamingSnake),
	),
];

/// A string helper callable from templates.
pub type Helper = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Named template helpers, registered both as filters and as functions.
pub type Helpers = BTreeMap<String, Helper>;

/// Build the helper table holding every case converter in [`CASERS`].
pub fn case_helpers() -> Helpers {
	CASERS
		.iter()
		.map(|&(name, caser)| {
			let helper: Helper = Arc::new(move |value: &str| caser.convert(value));
			(name.to_string(), helper)
		})
		.collect()
}

fn split_on(identifier: &str, separator: char) -> Vec<&str> {
	identifier
		.split(separator)
		.filter(|word| !word.is_empty())
		.collect()
}

fn split_camel(identifier: &str) -> Vec<&str> {
	let chars: Vec<(usize, char)> = identifier.char_indices().collect();
	let mut words = Vec::new();
	let mut start = 0;

	for (position, &(offset, current)) in chars.iter().enumerate().skip(1) {
		if !current.is_uppercase() {
			continue;
		}

		let previous = chars[position - 1].1;
		let next_is_lower = chars
			.get(position + 1)
			.is_some_and(|&(_, next)| next.is_lowercase());
		let boundary = previous.is_lowercase()
			|| previous.is_ascii_digit()
			|| (previous.is_uppercase() && next_is_lower);

		if boundary {
			words.push(&identifier[start..offset]);
			start = offset;
		}
	}

	words.push(&identifier[start..]);
	words
		.into_iter()
		.flat_map(|word| word.split(['_', '-']))
		.filter(|word| !word.is_empty())
		.collect()
}

fn capitalize(word: &str) -> String {
	let mut chars = word.chars();
	let Some(first) = chars.next() else {
		return String::new();
	};

	first
		.to_uppercase()
		.chain(chars.flat_map(char::to_lowercase))
		.collect()
}
