use std::fmt::Write as _;
use std::path::Path;
use std::path::PathBuf;

use miette::NamedSource;
use miette::SourceSpan;
use minijinja::AutoEscape;
use minijinja::Environment;
use minijinja::ErrorKind;
use minijinja::Output;
use minijinja::State;
use minijinja::value::ValueKind;

use crate::EasygenError;
use crate::EasygenResult;
use crate::GenericValue;
use crate::Helpers;
use crate::RenderSettings;
use crate::escape;

/// Name given to a template compiled from an inline string.
pub const INLINE_TEMPLATE_NAME: &str = "inline";

/// Where template source text comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
	/// A template given directly as a string.
	Inline(String),
	/// One or more template files, parsed together as a named set. Each file
	/// is registered under its file name and the first one is rendered.
	Files(Vec<PathBuf>),
}

/// The output escaping discipline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RenderMode {
	/// Plain textual substitution without any escaping.
	#[default]
	Raw,
	/// Substituted values are escaped for markup output.
	Markup,
}

impl RenderMode {
	pub fn from_html(html: bool) -> Self {
		if html { Self::Markup } else { Self::Raw }
	}
}

/// A parsed set of templates with its helpers registered, ready to render.
#[derive(Debug)]
pub struct TemplateSet {
	env: Environment<'static>,
	primary: String,
}

impl TemplateSet {
	fn render_named(&self, name: &str, data: &GenericValue) -> EasygenResult<String> {
		let template = self.env.get_template(name).map_err(|e| render_error(name, &e))?;
		let context = minijinja::Value::from_serialize(data);
		let output = template.render(context).map_err(|e| render_error(name, &e))?;

		tracing::debug!(template = name, bytes = output.len(), "rendered template");
		Ok(output)
	}
}

/// A compiled template tagged with the mode it was compiled for.
#[derive(Debug)]
pub enum CompiledTemplate {
	Raw(TemplateSet),
	Markup(TemplateSet),
}

impl CompiledTemplate {
	/// Name of the primary template.
	pub fn name(&self) -> &str {
		&self.set().primary
	}

	pub fn mode(&self) -> RenderMode {
		match self {
			Self::Raw(_) => RenderMode::Raw,
			Self::Markup(_) => RenderMode::Markup,
		}
	}

	/// Render the primary template against `data`. Output is buffered and
	/// only returned once the whole template has rendered.
	pub fn render(&self, data: &GenericValue) -> EasygenResult<String> {
		let set = self.set();
		set.render_named(&set.primary, data)
	}

	/// Render the template called `name` from the set against `data`.
	pub fn render_named(&self, name: &str, data: &GenericValue) -> EasygenResult<String> {
		self.set().render_named(name, data)
	}

	fn set(&self) -> &TemplateSet {
		match self {
			Self::Raw(set) | Self::Markup(set) => set,
		}
	}
}

/// Parse `source` into a [`CompiledTemplate`] for the given mode.
///
/// Every entry in `helpers` is registered both as a filter
/// (`{{ name | cls2uc }}`) and as a function (`{{ cls2uc(name) }}`) along
/// with the built-in `minus1` helper. Both modes get the same helpers.
///
/// In markup mode, HTML templates are escaped by context: each output is
/// escaped for the element text, attribute value, URL, script or style it is
/// written into.
pub fn compile(
	source: &TemplateSource,
	mode: RenderMode,
	helpers: &Helpers,
	settings: RenderSettings,
) -> EasygenResult<CompiledTemplate> {
	let mut env = Environment::new();
	env.set_keep_trailing_newline(settings.keep_trailing_newline);
	env.set_trim_blocks(settings.trim_blocks);
	env.set_lstrip_blocks(settings.lstrip_blocks);
	env.set_undefined_behavior(settings.undefined.into());
	env.set_formatter(format_value);

	match mode {
		RenderMode::Raw => env.set_auto_escape_callback(|_| AutoEscape::None),
		RenderMode::Markup => env.set_auto_escape_callback(markup_auto_escape),
	}

	register_helpers(&mut env, helpers);
	escape::register_escapers(&mut env);

	let primary = match source {
		TemplateSource::Inline(text) => {
			add_template(&mut env, INLINE_TEMPLATE_NAME, text.clone(), mode)?;
			INLINE_TEMPLATE_NAME.to_string()
		}
		TemplateSource::Files(paths) => add_template_files(&mut env, paths, mode)?,
	};

	tracing::debug!(?mode, template = %primary, "compiled template");

	let set = TemplateSet { env, primary };
	Ok(match mode {
		RenderMode::Raw => CompiledTemplate::Raw(set),
		RenderMode::Markup => CompiledTemplate::Markup(set),
	})
}

/// Escape for HTML unless the template name implies another output format.
fn markup_auto_escape(name: &str) -> AutoEscape {
	match minijinja::default_auto_escape_callback(name) {
		AutoEscape::None => AutoEscape::Html,
		other => other,
	}
}

/// Booleans print as `true` and `false`. Everything else goes through the
/// environment's auto-escaping.
fn format_value(
	out: &mut Output<'_>,
	state: &State<'_, '_>,
	value: &minijinja::Value,
) -> Result<(), minijinja::Error> {
	if value.kind() == ValueKind::Bool {
		return out
			.write_str(if value.is_true() { "true" } else { "false" })
			.map_err(|_| minijinja::Error::new(ErrorKind::WriteFailure, "cannot write output"));
	}

	minijinja::escape_formatter(out, state, value)
}

fn register_helpers(env: &mut Environment<'static>, helpers: &Helpers) {
	for (name, helper) in helpers {
		let filter = helper.clone();
		env.add_filter(name.clone(), move |value: &str| filter(value));
		let function = helper.clone();
		env.add_function(name.clone(), move |value: &str| function(value));
	}

	env.add_filter("minus1", minus1);
	env.add_function("minus1", minus1);
}

fn minus1(value: i64) -> i64 {
	value.saturating_sub(1)
}

fn add_template_files(
	env: &mut Environment<'static>,
	paths: &[PathBuf],
	mode: RenderMode,
) -> EasygenResult<String> {
	let Some(first) = paths.first() else {
		return Err(EasygenError::Compile {
			name: String::new(),
			line: None,
			reason: "no template files were given".to_string(),
			src: NamedSource::new("", String::new()),
			span: None,
		});
	};

	for path in paths {
		let name = template_name(path);
		if env.get_template(&name).is_ok() {
			return Err(EasygenError::Compile {
				name: name.clone(),
				line: None,
				reason: format!(
					"`{}` has the same file name as another template in the set",
					path.display()
				),
				src: NamedSource::new(name, String::new()),
				span: None,
			});
		}

		let text = std::fs::read_to_string(path).map_err(|e| {
			EasygenError::Compile {
				name: name.clone(),
				line: None,
				reason: format!("cannot read `{}`: {e}", path.display()),
				src: NamedSource::new(name.clone(), String::new()),
				span: None,
			}
		})?;
		add_template(env, &name, text, mode)?;
	}

	Ok(template_name(first))
}

fn add_template(
	env: &mut Environment<'static>,
	name: &str,
	text: String,
	mode: RenderMode,
) -> EasygenResult<()> {
	// The template as written is parsed first so errors point into its source.
	env.add_template_owned(name.to_string(), text.clone())
		.map_err(|e| compile_error(name, &text, &e))?;

	if mode == RenderMode::Markup && matches!(markup_auto_escape(name), AutoEscape::Html) {
		let contextual = escape::contextualize(&text);
		if contextual != text {
			env.add_template_owned(name.to_string(), contextual)
				.map_err(|e| compile_error(name, &text, &e))?;
		}
	}

	Ok(())
}

fn compile_error(name: &str, text: &str, error: &minijinja::Error) -> EasygenError {
	EasygenError::Compile {
		name: name.to_string(),
		line: error.line(),
		reason: error_reason(error),
		src: NamedSource::new(name, text.to_string()),
		span: error.range().map(SourceSpan::from),
	}
}

/// Templates in a file set are addressed by their file name.
fn template_name(path: &Path) -> String {
	path.file_name().map_or_else(
		|| path.display().to_string(),
		|name| name.to_string_lossy().into_owned(),
	)
}

fn render_error(name: &str, error: &minijinja::Error) -> EasygenError {
	EasygenError::Render {
		name: name.to_string(),
		reason: error_reason(error),
	}
}

/// The error message followed by the messages of any wrapped causes.
fn error_reason(error: &minijinja::Error) -> String {
	let mut reason = error.to_string();
	let mut source = std::error::Error::source(error);
	while let Some(cause) = source {
		reason.push_str(": ");
		reason.push_str(&cause.to_string());
		source = cause.source();
	}
	reason
}
