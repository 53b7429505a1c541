use std::path::Path;

use tempfile::TempDir;

use crate::AnyResult;
use crate::GenericValue;
use crate::data;

/// Create a temporary directory holding the given `(relative path, content)`
/// files.
pub(crate) fn workspace(files: &[(&str, &str)]) -> AnyResult<TempDir> {
	let tmp = tempfile::tempdir()?;
	for (name, content) in files {
		let path = tmp.path().join(name);
		if let Some(parent) = path.parent() {
			std::fs::create_dir_all(parent)?;
		}
		std::fs::write(path, content)?;
	}
	Ok(tmp)
}

/// Path of `name` inside `dir` as a base name string accepted by `generate`.
pub(crate) fn base_name(dir: &Path, name: &str) -> String {
	dir.join(name).display().to_string()
}

pub(crate) fn yaml(content: &str) -> GenericValue {
	data::parse(content, "fixture.yaml").unwrap_or_else(|e| panic!("invalid fixture: {e}"))
}

pub(crate) const SERVICE_YAML: &str = r"# service description
name: user-profile
package: account_service
fields:
  - first_name
  - last_name
  - email_address
options:
  retries: 3
  verbose: true
";
