use std::path::Path;

use miette::NamedSource;
use miette::SourceSpan;
use serde_yaml_ng::Mapping;

use crate::EasygenError;
use crate::EasygenResult;

/// The in-memory tree produced from a data document.
pub type GenericValue = serde_yaml_ng::Value;

/// Read the data file at `path` and parse it into a [`GenericValue`].
pub fn load(path: &Path) -> EasygenResult<GenericValue> {
	let path_name = path.display().to_string();
	let content = std::fs::read_to_string(path).map_err(|source| {
		EasygenError::Io {
			path: path_name.clone(),
			source,
		}
	})?;

	let value = parse(&content, &path_name)?;
	tracing::debug!(
		path = %path_name,
		keys = value.as_mapping().map_or(0, Mapping::len),
		"loaded data file"
	);

	Ok(value)
}

/// Parse YAML `content` into a [`GenericValue`]. `name` identifies the
/// document in error messages.
///
/// Merge keys (`<<`) are resolved and tags (`!custom foo`) are dropped so
/// templates only see the tagged value. The root of the document must be a
/// mapping; an empty document is treated as an empty mapping.
pub fn parse(content: &str, name: &str) -> EasygenResult<GenericValue> {
	let mut value: GenericValue =
		serde_yaml_ng::from_str(content).map_err(|e| parse_error(&e, content, name))?;

	value
		.apply_merge()
		.map_err(|e| parse_error(&e, content, name))?;

	match untag(value) {
		GenericValue::Null => Ok(GenericValue::Mapping(Mapping::new())),
		mapping @ GenericValue::Mapping(_) => Ok(mapping),
		other => {
			Err(EasygenError::Parse {
				path: name.to_string(),
				line: None,
				column: None,
				reason: format!(
					"expected a mapping at the document root, found {}",
					describe(&other)
				),
				src: NamedSource::new(name, content.to_string()),
				span: None,
			})
		}
	}
}

fn untag(value: GenericValue) -> GenericValue {
	match value {
		GenericValue::Tagged(tagged) => untag(tagged.value),
		GenericValue::Sequence(items) => {
			GenericValue::Sequence(items.into_iter().map(untag).collect())
		}
		GenericValue::Mapping(mapping) => {
			GenericValue::Mapping(
				mapping
					.into_iter()
					.map(|(key, value)| (untag(key), untag(value)))
					.collect(),
			)
		}
		other => other,
	}
}

fn parse_error(error: &serde_yaml_ng::Error, content: &str, name: &str) -> EasygenError {
	let location = error.location();

	EasygenError::Parse {
		path: name.to_string(),
		line: location.as_ref().map(serde_yaml_ng::Location::line),
		column: location.as_ref().map(serde_yaml_ng::Location::column),
		reason: error.to_string(),
		src: NamedSource::new(name, content.to_string()),
		span: location.map(|loc| SourceSpan::from(loc.index())),
	}
}

fn describe(value: &GenericValue) -> &'static str {
	match value {
		GenericValue::Null => "null",
		GenericValue::Bool(_) => "a boolean",
		GenericValue::Number(_) => "a number",
		GenericValue::String(_) => "a string",
		GenericValue::Sequence(_) => "a sequence",
		GenericValue::Mapping(_) => "a mapping",
		GenericValue::Tagged(_) => "a tagged value",
	}
}
