use miette::Diagnostic;
use miette::NamedSource;
use miette::SourceSpan;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum EasygenError {
	#[error("failed to read `{path}`: {source}")]
	#[diagnostic(code(easygen::io_error))]
	Io {
		path: String,
		source: std::io::Error,
	},

	#[error("failed to parse data file `{path}`: {reason}")]
	#[diagnostic(
		code(easygen::parse),
		help("the data file must be a YAML document with a mapping at its root")
	)]
	Parse {
		path: String,
		/// 1-indexed line of the error, when the parser reports one.
		line: Option<usize>,
		/// 1-indexed column of the error, when the parser reports one.
		column: Option<usize>,
		reason: String,
		#[source_code]
		src: NamedSource<String>,
		#[label("here")]
		span: Option<SourceSpan>,
	},

	#[error("failed to compile template `{name}`: {reason}")]
	#[diagnostic(code(easygen::compile))]
	Compile {
		name: String,
		line: Option<usize>,
		reason: String,
		#[source_code]
		src: NamedSource<String>,
		#[label("here")]
		span: Option<SourceSpan>,
	},

	#[error("failed to render template `{name}`: {reason}")]
	#[diagnostic(
		code(easygen::render),
		help("every field used by the template must exist in the data file, or be guarded with `is defined`")
	)]
	Render { name: String, reason: String },

	#[error("failed to parse config file `{path}`: {reason}")]
	#[diagnostic(
		code(easygen::config_parse),
		help("check that the config is valid TOML with optional `html`, `template_file` and [render] keys")
	)]
	ConfigParse { path: String, reason: String },
}

pub type EasygenResult<T> = Result<T, EasygenError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
