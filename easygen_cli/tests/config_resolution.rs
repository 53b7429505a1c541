mod common;

use clap::Parser;
use easygen_cli::EasygenCli;
use easygen_core::AnyEmptyResult;
use easygen_core::EasygenConfig;
use easygen_core::UndefinedMode;
use rstest::rstest;

#[test]
fn config_html_enables_markup_mode() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("easygen.toml"), "html = true\n")?;
	std::fs::write(tmp.path().join("page.yaml"), "body: <b>\n")?;
	std::fs::write(tmp.path().join("page.tmpl"), "{{ body }}")?;

	common::easygen_cmd(tmp.path())
		.arg("page")
		.assert()
		.success()
		.stdout("&lt;b&gt;");

	Ok(())
}

#[test]
fn html_false_flag_overrides_config() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("easygen.toml"), "html = true\n")?;
	std::fs::write(tmp.path().join("page.yaml"), "body: <b>\n")?;
	std::fs::write(tmp.path().join("page.tmpl"), "{{ body }}")?;

	common::easygen_cmd(tmp.path())
		.arg("--html=false")
		.arg("page")
		.assert()
		.success()
		.stdout("<b>");

	Ok(())
}

#[test]
fn dot_config_lenient_mode_renders_missing_fields_empty() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::create_dir_all(tmp.path().join(".config"))?;
	std::fs::write(
		tmp.path().join(".config/easygen.toml"),
		"[render]\nundefined = \"lenient\"\n",
	)?;
	std::fs::write(tmp.path().join("hello.yaml"), "name: World\n")?;
	std::fs::write(tmp.path().join("hello.tmpl"), "Hello, {{ nobody }}!")?;

	common::easygen_cmd(tmp.path())
		.arg("hello")
		.assert()
		.success()
		.stdout("Hello, !");

	Ok(())
}

#[test]
fn malformed_config_is_fatal() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join(".easygen.toml"), "html = \"maybe\"\n")?;
	std::fs::write(tmp.path().join("hello.yaml"), "name: World\n")?;
	std::fs::write(tmp.path().join("hello.tmpl"), "Hello, {{ name }}!")?;

	common::easygen_cmd(tmp.path())
		.arg("hello")
		.assert()
		.code(1)
		.stdout("")
		.stderr(predicates::str::contains("failed to parse config file"));

	Ok(())
}

#[test]
fn command_line_overrides_config() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(
		tmp.path().join("easygen.toml"),
		"template_file = \"from_config\"\n\n[render]\nundefined = \"chainable\"\n",
	)?;
	let config = EasygenConfig::load(tmp.path())?;

	let cli = EasygenCli::try_parse_from(["easygen", "--tf", "from_flag", "--html", "api"])?;
	let options = cli.options(config);

	assert!(options.html);
	assert_eq!(options.template_file.as_deref(), Some("from_flag"));
	assert_eq!(options.template_str, None);
	assert_eq!(options.render.undefined, UndefinedMode::Chainable);

	Ok(())
}

#[rstest]
#[case::defaults(&["easygen", "api"], false, None, None)]
#[case::html(&["easygen", "--html", "api"], true, None, None)]
#[case::html_true(&["easygen", "--html=true", "api"], true, None, None)]
#[case::html_false(&["easygen", "--html=false", "api"], false, None, None)]
#[case::inline(&["easygen", "--ts", "{{ x }}", "api"], false, Some("{{ x }}"), None)]
#[case::template_file(&["easygen", "--tf", "shared/go", "api"], false, None, Some("shared/go"))]
fn flags_map_to_options(
	#[case] argv: &[&str],
	#[case] html: bool,
	#[case] template_str: Option<&str>,
	#[case] template_file: Option<&str>,
) -> AnyEmptyResult {
	let cli = EasygenCli::try_parse_from(argv)?;
	let options = cli.options(None);

	assert_eq!(cli.name, "api");
	assert_eq!(options.html, html);
	assert_eq!(options.template_str.as_deref(), template_str);
	assert_eq!(options.template_file.as_deref(), template_file);

	Ok(())
}
