use clap::Parser;
use easygen_core::EasygenConfig;
use easygen_core::Options;

/// Program name used to prefix fatal error messages.
pub const PROGRAM_NAME: &str = "easygen";

#[derive(Parser)]
#[command(
	name = PROGRAM_NAME,
	author,
	version,
	about = "Easy to use universal code/text generator.",
	long_about = "easygen renders a template against a YAML data file and prints the \
	              result.\n\nGiven NAME, the data is read from NAME.yaml and the template \
	              from NAME.tmpl. Templates can call the case helpers cls2lc, cls2uc, \
	              cls2ss, ck2lc, ck2uc, ck2ls, ck2ss, clc2ss and cuc2ss.\n\nExample:\n  \
	              easygen --ts '{{ name | ck2uc }}' api",
	after_help = "NAME: The name for the .yaml data and .tmpl template file. Only the name \
	              part, without extension. Can include the path as well."
)]
pub struct EasygenCli {
	/// Treat the template as HTML: substituted values are escaped for markup.
	/// `--html=false` turns it off when the config file enables it.
	#[arg(
		long,
		value_name = "BOOL",
		num_args = 0..=1,
		require_equals = true,
		default_missing_value = "true"
	)]
	pub html: Option<bool>,

	/// Template string, used instead of the template file.
	#[arg(long = "ts", value_name = "TEMPLATE")]
	pub template_str: Option<String>,

	/// Template file name without the `.tmpl` extension (default: same as
	/// NAME).
	#[arg(long = "tf", value_name = "TEMPLATE_NAME")]
	pub template_file: Option<String>,

	/// Enable verbose (debug) logging on stderr.
	#[arg(long, short, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, default_value_t = false)]
	pub no_color: bool,

	/// The name for the .yaml data and .tmpl template file.
	#[arg(value_name = "NAME")]
	pub name: String,
}

impl EasygenCli {
	/// Build the run options: config file values first, then command line
	/// flags on top.
	pub fn options(&self, config: Option<EasygenConfig>) -> Options {
		let mut options = config.map(Options::from_config).unwrap_or_default();
		if let Some(html) = self.html {
			options.html = html;
		}
		if self.template_str.is_some() {
			options.template_str.clone_from(&self.template_str);
		}
		if self.template_file.is_some() {
			options.template_file.clone_from(&self.template_file);
		}
		options
	}
}
