use std::fmt::Write as _;

use minijinja::Environment;
use minijinja::Error;
use minijinja::ErrorKind;
use minijinja::Value;
use minijinja::value::ValueKind;

/// Written in place of a URL whose scheme is not `http`, `https` or `mailto`.
pub const UNSAFE_URL: &str = "#ZgotmplZ";

/// Attributes whose values are URLs.
const URL_ATTRIBUTES: [&str; 17] = [
	"action",
	"archive",
	"background",
	"cite",
	"classid",
	"codebase",
	"data",
	"formaction",
	"href",
	"icon",
	"longdesc",
	"manifest",
	"poster",
	"profile",
	"src",
	"usemap",
	"xmlns",
];

/// Register the context escapers that [`contextualize`] inserts. They are
/// ordinary filters, so templates can also apply them by hand.
pub(crate) fn register_escapers(env: &mut Environment<'static>) {
	env.add_filter("escape_attr", escape_attr);
	env.add_filter("escape_url", escape_url);
	env.add_filter("escape_url_path", escape_url_path);
	env.add_filter("escape_url_part", escape_url_part);
	env.add_filter("escape_js_string", escape_js_string);
	env.add_filter("escape_js_value", escape_js_value);
	env.add_filter("escape_css", escape_css);
}

/// Rewrite every `{{ … }}` output of an HTML template so that it passes
/// through the escaper for the markup context it appears in: attribute
/// values, URLs, scripts and styles. Outputs in element text are left to the
/// environment's HTML auto-escaping.
///
/// The context is tracked over the literal text in source order. Tags and
/// comments do not change it, and the body of a `{% raw %}` block is scanned
/// as literal text.
pub(crate) fn contextualize(source: &str) -> String {
	let mut output = String::with_capacity(source.len());
	let mut context = Context::default();
	let mut rest = source;

	while let Some(start) = find_tag_start(rest) {
		let (text, tag) = rest.split_at(start);
		context.feed(text);
		output.push_str(text);

		let Some(end) = tag_end(tag) else {
			output.push_str(tag);
			return output;
		};
		let (tag, after) = tag.split_at(end);
		rest = after;

		if tag.starts_with("{{") {
			push_expression(&mut output, tag, context.escapers());
			context.note_output();
		} else if tag.starts_with("{%") && block_name(tag) == "raw" {
			output.push_str(tag);
			let (body, remainder) = split_raw_body(rest);
			context.feed(body);
			output.push_str(body);
			rest = remainder;
		} else {
			output.push_str(tag);
		}
	}

	output.push_str(rest);
	output
}

/// Byte offset of the next `{{`, `{%` or `{#`.
fn find_tag_start(text: &str) -> Option<usize> {
	let bytes = text.as_bytes();
	(0..bytes.len().saturating_sub(1))
		.find(|&i| bytes[i] == b'{' && matches!(bytes[i + 1], b'{' | b'%' | b'#'))
}

/// Byte offset just past the delimiter closing the tag that starts `tag`.
/// String literals and nested braces inside the tag are skipped.
fn tag_end(tag: &str) -> Option<usize> {
	let bytes = tag.as_bytes();
	let close = match bytes.get(1) {
		Some(b'{') => b'}',
		Some(b'%') => b'%',
		_ => return tag.get(2..)?.find("#}").map(|offset| offset + 4),
	};

	let mut depth = 0usize;
	let mut quote = None;
	let mut i = 2;
	while i < bytes.len() {
		let byte = bytes[i];
		if let Some(open) = quote {
			if byte == b'\\' {
				i += 1;
			} else if byte == open {
				quote = None;
			}
		} else {
			match byte {
				b'\'' | b'"' => quote = Some(byte),
				b'{' => depth += 1,
				_ if depth == 0 && byte == close && bytes.get(i + 1) == Some(&b'}') => {
					return Some(i + 2);
				}
				b'}' => depth = depth.saturating_sub(1),
				_ => {}
			}
		}
		i += 1;
	}

	None
}

/// The statement inside a `{% … %}` tag without whitespace control markers.
fn block_name(tag: &str) -> &str {
	tag.get(2..tag.len().saturating_sub(2))
		.unwrap_or_default()
		.trim()
		.trim_matches(['-', '+'])
		.trim()
}

/// Split the text following `{% raw %}` at its `{% endraw %}` tag.
fn split_raw_body(text: &str) -> (&str, &str) {
	let mut from = 0;
	while let Some(offset) = text[from..].find("{%") {
		let start = from + offset;
		let tag = &text[start..];
		if tag_end(tag).is_some_and(|end| block_name(&tag[..end]) == "endraw") {
			return text.split_at(start);
		}
		from = start + 2;
	}

	(text, "")
}

fn push_expression(output: &mut String, tag: &str, escapers: &[&str]) {
	if escapers.is_empty() {
		output.push_str(tag);
		return;
	}

	let inner = &tag[2..tag.len() - 2];
	let (open, inner) = match inner.as_bytes().first() {
		Some(b'-' | b'+') => inner.split_at(1),
		_ => ("", inner),
	};
	let (inner, close) = match inner.as_bytes().last() {
		Some(b'-' | b'+') => inner.split_at(inner.len() - 1),
		_ => (inner, ""),
	};

	output.push_str("{{");
	output.push_str(open);
	output.push_str(" (");
	output.push_str(inner.trim());
	output.push(')');
	for escaper in escapers {
		output.push_str(" | ");
		output.push_str(escaper);
	}
	output.push(' ');
	output.push_str(close);
	output.push_str("}}");
}

fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
	text.get(..prefix.len())
		.is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

/// Where in an HTML document the scanner currently is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
enum Context {
	#[default]
	Text,
	Comment {
		dashes: usize,
	},
	/// Reading the element name after `<`.
	TagName {
		name: String,
		closing: bool,
	},
	/// Inside a start tag, between attributes.
	Tag(Element),
	AttrName {
		element: Element,
		name: String,
	},
	AfterAttrName {
		element: Element,
		name: String,
	},
	BeforeValue {
		element: Element,
		attr: Attr,
	},
	Value {
		element: Element,
		attr: Attr,
		quote: Option<char>,
	},
	Script(Js),
	Style,
}

impl Context {
	fn feed(&mut self, text: &str) {
		for (index, c) in text.char_indices() {
			*self = std::mem::take(self).step(c, &text[index..]);
		}
	}

	/// Advance over `c`. `rest` is the remaining text, starting with `c`.
	fn step(self, c: char, rest: &str) -> Self {
		match self {
			Self::Text => {
				if c != '<' {
					return Self::Text;
				}
				if rest.starts_with("<!--") {
					return Self::Comment { dashes: 0 };
				}
				match rest[1..].chars().next() {
					Some(next) if next.is_ascii_alphabetic() || next == '/' => {
						Self::TagName {
							name: String::new(),
							closing: false,
						}
					}
					_ => Self::Text,
				}
			}
			Self::Comment { dashes } => {
				match c {
					'-' => Self::Comment { dashes: dashes + 1 },
					'>' if dashes >= 2 => Self::Text,
					_ => Self::Comment { dashes: 0 },
				}
			}
			Self::TagName { mut name, closing } => {
				match c {
					'/' if name.is_empty() => Self::TagName { name, closing: true },
					'>' => Element::new(&name, closing).enter(),
					c if c == '/' || c.is_whitespace() => Self::Tag(Element::new(&name, closing)),
					c => {
						name.push(c.to_ascii_lowercase());
						Self::TagName { name, closing }
					}
				}
			}
			Self::Tag(element) => {
				match c {
					'>' => element.enter(),
					c if c == '/' || c.is_whitespace() => Self::Tag(element),
					c => {
						Self::AttrName {
							element,
							name: c.to_ascii_lowercase().to_string(),
						}
					}
				}
			}
			Self::AttrName { element, mut name } => {
				match c {
					'=' => {
						Self::BeforeValue {
							element,
							attr: Attr::new(&name),
						}
					}
					'>' => element.enter(),
					'/' => Self::Tag(element),
					c if c.is_whitespace() => Self::AfterAttrName { element, name },
					c => {
						name.push(c.to_ascii_lowercase());
						Self::AttrName { element, name }
					}
				}
			}
			Self::AfterAttrName { element, name } => {
				match c {
					'=' => {
						Self::BeforeValue {
							element,
							attr: Attr::new(&name),
						}
					}
					'>' => element.enter(),
					'/' => Self::Tag(element),
					c if c.is_whitespace() => Self::AfterAttrName { element, name },
					c => {
						Self::AttrName {
							element,
							name: c.to_ascii_lowercase().to_string(),
						}
					}
				}
			}
			Self::BeforeValue { element, attr } => {
				match c {
					'"' | '\'' => {
						Self::Value {
							element,
							attr,
							quote: Some(c),
						}
					}
					'>' => element.enter(),
					c if c.is_whitespace() => Self::BeforeValue { element, attr },
					c => {
						Self::Value {
							element,
							attr: attr.step(c),
							quote: None,
						}
					}
				}
			}
			Self::Value {
				element,
				attr,
				quote,
			} => {
				match quote {
					Some(open) if c == open => Self::Tag(element),
					None if c == '>' => element.enter(),
					None if c.is_whitespace() => Self::Tag(element),
					_ => {
						Self::Value {
							element,
							attr: attr.step(c),
							quote,
						}
					}
				}
			}
			Self::Script(js) => {
				if c == '<' && starts_with_ignore_case(rest, "</script") {
					Self::TagName {
						name: String::new(),
						closing: false,
					}
				} else {
					Self::Script(js.step(c))
				}
			}
			Self::Style => {
				if c == '<' && starts_with_ignore_case(rest, "</style") {
					Self::TagName {
						name: String::new(),
						closing: false,
					}
				} else {
					Self::Style
				}
			}
		}
	}

	/// Record that an expression was written at the current position.
	fn note_output(&mut self) {
		*self = match std::mem::take(self) {
			Self::BeforeValue { element, attr } => {
				Self::Value {
					element,
					attr: attr.after_output(),
					quote: None,
				}
			}
			Self::Value {
				element,
				attr,
				quote,
			} => {
				Self::Value {
					element,
					attr: attr.after_output(),
					quote,
				}
			}
			Self::Script(js) => Self::Script(js.after_output()),
			other => other,
		};
	}

	/// Filters applied to an expression written at the current position.
	fn escapers(&self) -> &'static [&'static str] {
		match self {
			Self::BeforeValue { attr, .. } => attr.escapers(false),
			Self::Value { attr, quote, .. } => attr.escapers(quote.is_some()),
			Self::Script(js) => js.escapers(),
			Self::Style => &["escape_css"],
			_ => &[],
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Element {
	Script,
	Style,
	Other,
}

impl Element {
	fn new(name: &str, closing: bool) -> Self {
		match name {
			"script" if !closing => Self::Script,
			"style" if !closing => Self::Style,
			_ => Self::Other,
		}
	}

	/// The context following the `>` that ends this element's tag.
	fn enter(self) -> Context {
		match self {
			Self::Script => Context::Script(Js::Code),
			Self::Style => Context::Style,
			Self::Other => Context::Text,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attr {
	Plain,
	Url(UrlPart),
	Script(Js),
	Style,
}

impl Attr {
	fn new(name: &str) -> Self {
		if name.starts_with("on") {
			Self::Script(Js::Code)
		} else if name == "style" {
			Self::Style
		} else if URL_ATTRIBUTES.contains(&name) {
			Self::Url(UrlPart::Start)
		} else {
			Self::Plain
		}
	}

	fn step(self, c: char) -> Self {
		match self {
			Self::Url(part) => Self::Url(part.step(c)),
			Self::Script(js) => Self::Script(js.step(c)),
			other => other,
		}
	}

	fn after_output(self) -> Self {
		match self {
			Self::Url(UrlPart::Start) => Self::Url(UrlPart::Path),
			Self::Script(js) => Self::Script(js.after_output()),
			other => other,
		}
	}

	fn escapers(self, quoted: bool) -> &'static [&'static str] {
		match self {
			Self::Plain if quoted => &[],
			Self::Plain => &["escape_attr"],
			Self::Url(UrlPart::Start) => &["escape_url"],
			Self::Url(UrlPart::Path) => &["escape_url_path"],
			Self::Url(UrlPart::Query) => &["escape_url_part"],
			Self::Script(js) if js.in_string() => &["escape_js_string", "escape_attr"],
			Self::Script(_) => &["escape_js_value", "escape_attr"],
			Self::Style => &["escape_css"],
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UrlPart {
	/// Nothing of the URL has been written yet, so a scheme may follow.
	Start,
	Path,
	/// After `?` or `#`.
	Query,
}

impl UrlPart {
	fn step(self, c: char) -> Self {
		match (self, c) {
			(_, '?' | '#') => Self::Query,
			(Self::Start, _) => Self::Path,
			(part, _) => part,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Js {
	Code,
	/// A `/` that may open a comment.
	Slash,
	Str(char),
	StrEscape(char),
	LineComment,
	BlockComment {
		star: bool,
	},
}

impl Js {
	fn step(self, c: char) -> Self {
		match self {
			Self::Code => {
				match c {
					'\'' | '"' | '`' => Self::Str(c),
					'/' => Self::Slash,
					_ => Self::Code,
				}
			}
			Self::Slash => {
				match c {
					'/' => Self::LineComment,
					'*' => Self::BlockComment { star: false },
					_ => Self::Code.step(c),
				}
			}
			Self::Str(quote) => {
				match c {
					'\\' => Self::StrEscape(quote),
					c if c == quote => Self::Code,
					_ => Self::Str(quote),
				}
			}
			Self::StrEscape(quote) => Self::Str(quote),
			Self::LineComment => {
				if c == '\n' {
					Self::Code
				} else {
					Self::LineComment
				}
			}
			Self::BlockComment { star } => {
				if star && c == '/' {
					Self::Code
				} else {
					Self::BlockComment { star: c == '*' }
				}
			}
		}
	}

	fn after_output(self) -> Self {
		match self {
			Self::Slash => Self::Code,
			other => other,
		}
	}

	fn in_string(self) -> bool {
		!matches!(self, Self::Code | Self::Slash)
	}

	fn escapers(self) -> &'static [&'static str] {
		if self.in_string() {
			&["escape_js_string"]
		} else {
			&["escape_js_value"]
		}
	}
}

fn escape_attr(value: &Value) -> Value {
	escape_with(value, attribute)
}

fn escape_url(value: &Value) -> Value {
	escape_with(value, |text| {
		if has_unsafe_scheme(text) {
			UNSAFE_URL.to_string()
		} else {
			html(&percent_encode(text, is_url_byte))
		}
	})
}

fn escape_url_path(value: &Value) -> Value {
	escape_with(value, |text| html(&percent_encode(text, is_url_byte)))
}

fn escape_url_part(value: &Value) -> Value {
	escape_with(value, |text| percent_encode(text, is_unreserved_byte))
}

fn escape_js_string(value: &Value) -> Value {
	escape_with(value, js_string)
}

fn escape_css(value: &Value) -> Value {
	escape_with(value, css)
}

/// Encode the value as a JavaScript literal.
fn escape_js_value(value: &Value) -> Result<Value, Error> {
	if value.is_undefined() {
		return Ok(value.clone());
	}

	let json = serde_json::to_string(value).map_err(|e| {
		Error::new(
			ErrorKind::BadSerialization,
			"cannot encode the value for a script",
		)
		.with_source(e)
	})?;

	let mut literal = String::with_capacity(json.len());
	for c in json.chars() {
		match c {
			'<' | '>' | '&' | '\'' | '\u{2028}' | '\u{2029}' => push_js_unicode(&mut literal, c),
			c => literal.push(c),
		}
	}

	Ok(Value::from_safe_string(literal))
}

/// Undefined values pass through untouched so the environment's undefined
/// behaviour still applies when they are printed.
fn escape_with(value: &Value, escape: impl FnOnce(&str) -> String) -> Value {
	if value.is_undefined() {
		return value.clone();
	}

	Value::from_safe_string(escape(&text_of(value)))
}

/// The text a value prints as.
fn text_of(value: &Value) -> String {
	if value.kind() == ValueKind::Bool {
		return value.is_true().to_string();
	}

	value
		.as_str()
		.map_or_else(|| value.to_string(), str::to_string)
}

fn html(text: &str) -> String {
	let mut escaped = String::with_capacity(text.len());
	for c in text.chars() {
		match c {
			'&' => escaped.push_str("&amp;"),
			'<' => escaped.push_str("&lt;"),
			'>' => escaped.push_str("&gt;"),
			'"' => escaped.push_str("&#34;"),
			'\'' => escaped.push_str("&#39;"),
			c => escaped.push(c),
		}
	}
	escaped
}

/// HTML escaping that is also safe in unquoted attribute values.
fn attribute(text: &str) -> String {
	let mut escaped = String::with_capacity(text.len());
	for c in html(text).chars() {
		if c == '=' || c == '`' || c.is_whitespace() {
			let _ = write!(escaped, "&#{};", u32::from(c));
		} else {
			escaped.push(c);
		}
	}
	escaped
}

fn has_unsafe_scheme(url: &str) -> bool {
	let Some(colon) = url.find(':') else {
		return false;
	};
	let scheme = &url[..colon];
	if scheme.contains('/') {
		return false;
	}

	!["http", "https", "mailto"]
		.iter()
		.any(|safe| scheme.eq_ignore_ascii_case(safe))
}

fn percent_encode(text: &str, keep: fn(u8) -> bool) -> String {
	let mut encoded = String::with_capacity(text.len());
	for &byte in text.as_bytes() {
		if keep(byte) {
			encoded.push(char::from(byte));
		} else {
			let _ = write!(encoded, "%{byte:02X}");
		}
	}
	encoded
}

fn is_unreserved_byte(byte: u8) -> bool {
	byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'_' | b'~')
}

/// Characters left alone when normalizing a URL. Existing `%` escapes are
/// kept.
fn is_url_byte(byte: u8) -> bool {
	is_unreserved_byte(byte)
		|| matches!(
			byte,
			b'!' | b'#' | b'$' | b'%' | b'&' | b'*' | b'+' | b',' | b'/' | b':' | b';' | b'=' | b'?'
				| b'@' | b'[' | b']'
		)
}

fn js_string(text: &str) -> String {
	let mut escaped = String::with_capacity(text.len());
	for c in text.chars() {
		match c {
			'\\' => escaped.push_str("\\\\"),
			'\n' => escaped.push_str("\\n"),
			'\r' => escaped.push_str("\\r"),
			'\t' => escaped.push_str("\\t"),
			'/' => escaped.push_str("\\/"),
			'\'' | '"' | '`' | '$' | '<' | '>' | '&' | '=' | '\u{2028}' | '\u{2029}' => {
				push_js_unicode(&mut escaped, c);
			}
			c if c.is_control() => push_js_unicode(&mut escaped, c),
			c => escaped.push(c),
		}
	}
	escaped
}

fn push_js_unicode(escaped: &mut String, c: char) {
	let _ = write!(escaped, "\\u{:04x}", u32::from(c));
}

fn css(text: &str) -> String {
	let mut escaped = String::with_capacity(text.len());
	for c in text.chars() {
		if c.is_ascii_alphanumeric() || matches!(c, ' ' | '#' | '%' | '.' | ',' | '_' | '-') {
			escaped.push(c);
		} else {
			let _ = write!(escaped, "\\{:x} ", u32::from(c));
		}
	}
	escaped
}
