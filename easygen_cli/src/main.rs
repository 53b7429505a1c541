use std::io::Write;
use std::process;

use clap::Parser;
use easygen_core::EasygenConfig;
use easygen_core::EasygenError;
use easygen_core::generate;
use easygen_cli::EasygenCli;
use easygen_cli::PROGRAM_NAME;
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
}

fn main() {
	let args = EasygenCli::parse();

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	init_tracing(args.verbose, use_color);

	// Install miette's fancy handler for rich error diagnostics.
	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	if let Err(e) = run(&args) {
		let report: miette::Report = e.into();
		eprintln!(
			"{} {report:?}",
			colored!(format!("[{PROGRAM_NAME}] fatal error:"), red)
		);
		process::exit(1);
	}
}

/// Logs go to stderr so they never mix with generated output. `--verbose`
/// wins over `RUST_LOG`.
fn init_tracing(verbose: bool, use_color: bool) {
	let filter = if verbose {
		EnvFilter::new("debug")
	} else {
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
	};

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(use_color)
		.without_time()
		.with_target(false)
		.init();
}

fn run(args: &EasygenCli) -> Result<(), EasygenError> {
	let cwd = std::env::current_dir().map_err(|source| {
		EasygenError::Io {
			path: ".".to_string(),
			source,
		}
	})?;
	let config = EasygenConfig::load(&cwd)?;
	let options = args.options(config);
	tracing::debug!(?options, "resolved options");

	let output = generate(&options, &args.name)?;

	let mut stdout = std::io::stdout().lock();
	stdout
		.write_all(output.as_bytes())
		.and_then(|()| stdout.flush())
		.map_err(|source| {
			EasygenError::Io {
				path: "<stdout>".to_string(),
				source,
			}
		})
}
