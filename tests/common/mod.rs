//! Shared test utilities for integration and E2E tests.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_relayer_fixture();
//!     fixture.command_with_config().args(["-a", "x=1"]).assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use serde_yaml::Value as YamlValue;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::documents;
    #[allow(unused_imports)]
    pub use super::yaml;
    pub use super::TestFixture;
}

/// Documents shared by the tests.
#[allow(dead_code)]
pub mod documents {
    /// The main fixture: nested maps, lists of scalars and of maps, dotted keys.
    pub const RELAYER_TEST: &str = include_str!("../testdata/relayer_test.yml");

    /// Secondary document for deep-merge tests.
    pub const RELAYER_AUX: &str = include_str!("../testdata/relayer_aux_test.yml");

    /// Invalid YAML for error testing.
    pub const INVALID_YAML: &str = "invalid: [unclosed";
}

/// File name the fixture document is written under.
pub const CONFIG_NAME: &str = "relayer_test.yml";

/// Temporary directory holding a configuration document to edit.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Write `content` as the configuration document.
    pub fn with_config(self, content: &str) -> Self {
        self.with_file(CONFIG_NAME, content)
    }

    /// Write the shared fixture document as the configuration document.
    pub fn with_relayer_fixture(self) -> Self {
        self.with_config(documents::RELAYER_TEST)
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Get the path to the config file.
    pub fn config_path(&self) -> PathBuf {
        self.temp_dir.path().join(CONFIG_NAME)
    }

    /// Create a child path in the temp directory.
    #[allow(dead_code)]
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// Parse a file of the fixture directory.
    #[allow(dead_code)]
    pub fn read_yaml(&self, path: &str) -> YamlValue {
        let content =
            std::fs::read_to_string(self.path().join(path)).expect("Failed to read file");
        serde_yaml::from_str(&content).expect("File should be valid YAML")
    }

    /// Parse the configuration document.
    #[allow(dead_code)]
    pub fn config(&self) -> YamlValue {
        self.read_yaml(CONFIG_NAME)
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl TestFixture {
    /// Create a command configured to run in this fixture's directory.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("relayer");
        cmd.current_dir(self.path());
        cmd.env_remove("RELAYER_CONFIG");
        cmd
    }

    /// Create an `apply` command targeting the configuration document.
    #[allow(dead_code)]
    pub fn command_with_config(&self) -> assert_cmd::Command {
        let mut cmd = self.command();
        cmd.arg("apply").arg("--config").arg(self.config_path());
        cmd
    }
}

/// Parse YAML text, panicking on invalid input.
#[allow(dead_code)]
pub fn yaml(text: &str) -> YamlValue {
    serde_yaml::from_str(text).expect("test YAML should parse")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_creates_temp_dir() {
        let fixture = TestFixture::new();
        assert!(fixture.path().exists());
    }

    #[test]
    fn test_fixture_with_config() {
        let fixture = TestFixture::new().with_config("test: config");
        assert!(fixture.config_path().exists());
        assert_eq!(fixture.config(), yaml("test: config"));
    }

    #[test]
    fn test_documents_are_valid_yaml() {
        for document in [documents::RELAYER_TEST, documents::RELAYER_AUX] {
            serde_yaml::from_str::<YamlValue>(document).expect("Document should be valid YAML");
        }
    }

    #[test]
    fn test_invalid_yaml_is_actually_invalid() {
        let result = serde_yaml::from_str::<YamlValue>(documents::INVALID_YAML);
        assert!(result.is_err(), "INVALID_YAML should not parse");
    }
}
