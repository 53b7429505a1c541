use std::path::Path;

use assert_cmd::Command;
use insta_cmd::get_cargo_bin;

pub fn easygen_cmd(cwd: &Path) -> Command {
	let mut cmd = Command::new(get_cargo_bin("easygen"));
	cmd.env("NO_COLOR", "1");
	cmd.env_remove("RUST_LOG");
	cmd.current_dir(cwd);
	cmd
}
