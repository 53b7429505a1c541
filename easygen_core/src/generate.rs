use std::path::PathBuf;

use crate::EasygenResult;
use crate::Options;
use crate::RenderMode;
use crate::TemplateSource;
use crate::case_helpers;
use crate::compile;
use crate::data;

/// Extension appended to the base name to locate the data file.
pub const DATA_EXTENSION: &str = "yaml";

/// Extension appended to the template base name to locate the template file.
pub const TEMPLATE_EXTENSION: &str = "tmpl";

/// Path of the data file for `base_name`.
pub fn data_path(base_name: &str) -> PathBuf {
	PathBuf::from(format!("{base_name}.{DATA_EXTENSION}"))
}

/// Path of the template file: the configured template base name, falling
/// back to `base_name`.
pub fn template_path(options: &Options, base_name: &str) -> PathBuf {
	let template_base = options.template_file.as_deref().unwrap_or(base_name);
	PathBuf::from(format!("{template_base}.{TEMPLATE_EXTENSION}"))
}

/// The template to compile. An inline template string wins over the file.
pub fn template_source(options: &Options, base_name: &str) -> TemplateSource {
	match &options.template_str {
		Some(text) => TemplateSource::Inline(text.clone()),
		None => TemplateSource::Files(vec![template_path(options, base_name)]),
	}
}

/// Render the template for `base_name` against `<base_name>.yaml`.
///
/// Returns the complete output, or the first error from loading, compiling
/// or rendering.
pub fn generate(options: &Options, base_name: &str) -> EasygenResult<String> {
	let data_file = data_path(base_name);
	let source = template_source(options, base_name);
	tracing::info!(data = %data_file.display(), template = ?source, "generating");

	let data = data::load(&data_file)?;
	let template = compile(
		&source,
		RenderMode::from_html(options.html),
		&case_helpers(),
		options.render,
	)?;

	template.render(&data)
}
