mod common;

use easygen_core::AnyEmptyResult;
use predicates::prelude::PredicateBooleanExt;

#[test]
fn renders_hello_world() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("hello.yaml"), "name: World\n")?;
	std::fs::write(tmp.path().join("hello.tmpl"), "Hello, {{ name }}!")?;

	common::easygen_cmd(tmp.path())
		.arg("hello")
		.assert()
		.success()
		.stdout("Hello, World!");

	Ok(())
}

#[test]
fn renders_case_helpers_from_nested_path() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::create_dir_all(tmp.path().join("api"))?;
	std::fs::write(
		tmp.path().join("api/service.yaml"),
		"# service definition\nname: user-profile\nfields:\n  - first_name\n  - last_name\n",
	)?;
	std::fs::write(
		tmp.path().join("api/service.tmpl"),
		"type {{ name | ck2uc }} struct {\n{% for f in fields %}\t{{ f | cls2uc }} string\n{% \
		 endfor %}}\n",
	)?;

	common::easygen_cmd(tmp.path())
		.arg("api/service")
		.assert()
		.success()
		.stdout("type UserProfile struct {\n\tFirstName string\n\tLastName string\n}\n");

	Ok(())
}

#[test]
fn inline_template_overrides_file() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("const.yaml"), "name: max-retries\n")?;

	common::easygen_cmd(tmp.path())
		.arg("--ts")
		.arg("const {{ ck2ss(name) }} = 3")
		.arg("const")
		.assert()
		.success()
		.stdout("const MAX_RETRIES = 3");

	Ok(())
}

#[test]
fn template_file_flag_overrides_base_name() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("data.yaml"), "name: fooBar\n")?;
	std::fs::write(tmp.path().join("other.tmpl"), "{{ name | clc2ss }}")?;

	common::easygen_cmd(tmp.path())
		.arg("--tf")
		.arg("other")
		.arg("data")
		.assert()
		.success()
		.stdout("FOO_BAR");

	Ok(())
}

#[test]
fn html_flag_escapes_values() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("page.yaml"), "body: <script>\n")?;
	std::fs::write(tmp.path().join("page.tmpl"), "<p>{{ body }}</p>")?;

	common::easygen_cmd(tmp.path())
		.arg("page")
		.assert()
		.success()
		.stdout("<p><script></p>");

	common::easygen_cmd(tmp.path())
		.arg("--html")
		.arg("page")
		.assert()
		.success()
		.stdout(predicates::str::contains("&lt;script&gt;"))
		.stdout(predicates::str::contains("<script>").not());

	Ok(())
}

#[test]
fn missing_data_file_is_fatal() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::easygen_cmd(tmp.path())
		.arg("nonexistent")
		.assert()
		.code(1)
		.stdout("")
		.stderr(predicates::str::contains("[easygen] fatal error:"))
		.stderr(predicates::str::contains("nonexistent.yaml"));

	Ok(())
}

#[test]
fn missing_field_is_fatal_and_prints_nothing() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("hello.yaml"), "name: World\n")?;
	std::fs::write(tmp.path().join("hello.tmpl"), "Hello, {{ nobody }}!")?;

	common::easygen_cmd(tmp.path())
		.arg("hello")
		.assert()
		.code(1)
		.stdout("")
		.stderr(predicates::str::contains("failed to render template"));

	Ok(())
}

#[test]
fn invalid_yaml_is_fatal() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("bad.yaml"), "name: World\nbad: value: here\n")?;
	std::fs::write(tmp.path().join("bad.tmpl"), "{{ name }}")?;

	common::easygen_cmd(tmp.path())
		.arg("bad")
		.assert()
		.code(1)
		.stdout("")
		.stderr(predicates::str::contains("failed to parse data file"));

	Ok(())
}

#[test]
fn template_syntax_error_is_fatal() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("t.yaml"), "name: World\n")?;
	std::fs::write(tmp.path().join("t.tmpl"), "{% for x in %}")?;

	common::easygen_cmd(tmp.path())
		.arg("t")
		.assert()
		.code(1)
		.stdout("")
		.stderr(predicates::str::contains("failed to compile template"));

	Ok(())
}

#[test]
fn verbose_logs_to_stderr_only() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("hello.yaml"), "name: World\n")?;
	std::fs::write(tmp.path().join("hello.tmpl"), "Hello, {{ name }}!")?;

	common::easygen_cmd(tmp.path())
		.arg("--verbose")
		.arg("hello")
		.assert()
		.success()
		.stdout("Hello, World!")
		.stderr(predicates::str::contains("generating"));

	Ok(())
}

#[test]
fn help_prints_usage() {
	let tmp = std::env::temp_dir();

	common::easygen_cmd(&tmp)
		.arg("--help")
		.assert()
		.success()
		.stdout(predicates::str::contains("Usage:"))
		.stdout(predicates::str::contains("--tf"));
}

#[test]
fn missing_name_is_usage_error() {
	let tmp = std::env::temp_dir();

	common::easygen_cmd(&tmp)
		.assert()
		.failure()
		.stdout("")
		.stderr(predicates::str::contains("Usage:"));
}
