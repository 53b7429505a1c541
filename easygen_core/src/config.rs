use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::EasygenError;
use crate::EasygenResult;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] =
	["easygen.toml", ".easygen.toml", ".config/easygen.toml"];

/// How a field path that does not resolve against the data is treated while
/// rendering.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UndefinedMode {
	/// Printing, iterating or testing an undefined value fails the render.
	#[default]
	Strict,
	/// Undefined values print as empty and are falsy. Attribute access on
	/// them still fails.
	Lenient,
	/// Like `Lenient`, and attribute access on undefined values is allowed.
	Chainable,
}

impl From<UndefinedMode> for minijinja::UndefinedBehavior {
	fn from(mode: UndefinedMode) -> Self {
		match mode {
			UndefinedMode::Strict => Self::Strict,
			UndefinedMode::Lenient => Self::Lenient,
			UndefinedMode::Chainable => Self::Chainable,
		}
	}
}

/// Template engine settings shared by both render modes.
///
/// ```toml
/// [render]
/// undefined = "strict"
/// keep_trailing_newline = true
/// trim_blocks = false
/// lstrip_blocks = false
/// ```
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RenderSettings {
	pub undefined: UndefinedMode,
	/// Keep the final newline of a template instead of stripping it.
	pub keep_trailing_newline: bool,
	/// Remove the first newline after a block tag.
	pub trim_blocks: bool,
	/// Strip leading whitespace from the start of a line up to a block tag.
	pub lstrip_blocks: bool,
}

impl Default for RenderSettings {
	fn default() -> Self {
		Self {
			undefined: UndefinedMode::Strict,
			keep_trailing_newline: true,
			trim_blocks: false,
			lstrip_blocks: false,
		}
	}
}

/// Configuration loaded from an `easygen.toml` file.
///
/// ```toml
/// html = false
/// template_file = "shared/header"
///
/// [render]
/// undefined = "lenient"
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct EasygenConfig {
	/// Render in markup-escaping mode unless the command line says otherwise.
	#[serde(default)]
	pub html: bool,
	/// Default template base name, used when no `--tf` is given.
	#[serde(default)]
	pub template_file: Option<String>,
	#[serde(default)]
	pub render: RenderSettings,
}

impl EasygenConfig {
	/// Resolve the config path from known discovery candidates.
	#[must_use]
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if no config file exists.
	pub fn load(root: &Path) -> EasygenResult<Option<EasygenConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		let path_name = config_path.display().to_string();
		let content = std::fs::read_to_string(&config_path).map_err(|source| {
			EasygenError::Io {
				path: path_name.clone(),
				source,
			}
		})?;
		let config: EasygenConfig = toml::from_str(&content).map_err(|e| {
			EasygenError::ConfigParse {
				path: path_name.clone(),
				reason: e.to_string(),
			}
		})?;

		tracing::debug!(path = %path_name, "loaded config file");
		Ok(Some(config))
	}
}

/// The immutable options for a single generator run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
	/// Render with markup escaping instead of raw text substitution.
	pub html: bool,
	/// Inline template source. Takes precedence over any template file.
	pub template_str: Option<String>,
	/// Template file base name (without the `.tmpl` extension). Defaults to
	/// the data file's base name.
	pub template_file: Option<String>,
	pub render: RenderSettings,
}

impl Options {
	/// Options seeded from a config file. Command line values are layered on
	/// top by the caller.
	pub fn from_config(config: EasygenConfig) -> Self {
		Self {
			html: config.html,
			template_str: None,
			template_file: config.template_file,
			render: config.render,
		}
	}
}
