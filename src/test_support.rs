//! Fake project layouts with shell-script stand-ins for `activate`, `pip`, and `yt-dlp`.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const VENV_DIR: &str = "venvFiles";
pub const FAKE_VERSION: &str = "2025.01.15";

/// pip that upgrades on the first call and reports "already satisfied" afterwards.
pub const PIP_UPGRADES_ONCE: &str = r#"#!/bin/sh
[ -n "$VIRTUAL_ENV" ] || { echo "no active environment" >&2; exit 9; }
[ "$1 $2 $3" = "install --upgrade yt-dlp" ] || { echo "unexpected args: $*" >&2; exit 8; }
if [ -f "$VIRTUAL_ENV/.installed" ]; then
  echo "Requirement already satisfied: yt-dlp in $VIRTUAL_ENV/lib/python3.12/site-packages (2025.01.15)"
else
  echo "Collecting yt-dlp"
  echo "Installing collected packages: yt-dlp"
  echo "  Attempting uninstall: yt-dlp"
  echo "    Found existing installation: yt-dlp 2024.12.23"
  echo "Successfully installed yt-dlp-2025.1.15"
  touch "$VIRTUAL_ENV/.installed"
fi
"#;

pub const PIP_NETWORK_FAILURE: &str = r#"#!/bin/sh
echo "ERROR: Could not find a version that satisfies the requirement yt-dlp" >&2
exit 1
"#;

/// Records each invocation so tests can tell whether the version step ran.
pub const TOOL_PRINTS_VERSION: &str = r#"#!/bin/sh
[ "$1" = "--version" ] || exit 7
touch "$VIRTUAL_ENV/.version-ran"
echo 2025.01.15
"#;

pub const ACTIVATE_SCRIPT: &str = r#"# This file must be used with "source bin/activate"
deactivate () {
    unset VIRTUAL_ENV
}
VIRTUAL_ENV="/placeholder/venvFiles"
export VIRTUAL_ENV
"#;

pub const PYVENV_CFG: &str = "home = /usr/bin\ninclude-system-site-packages = false\nversion = 3.12.3\n";

pub struct FakeProject {
    pub dir: TempDir,
}

impl FakeProject {
    /// A project with a complete environment: activate script, pyvenv.cfg, pip, and yt-dlp.
    pub fn new() -> Self {
        let project = Self::without_venv();
        fs::create_dir_all(project.bin_dir()).unwrap();
        fs::write(project.bin_dir().join("activate"), ACTIVATE_SCRIPT).unwrap();
        fs::write(project.venv_path().join("pyvenv.cfg"), PYVENV_CFG).unwrap();
        project.write_executable("pip", PIP_UPGRADES_ONCE);
        project.write_executable("yt-dlp", TOOL_PRINTS_VERSION);
        project
    }

    pub fn without_venv() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn venv_path(&self) -> PathBuf {
        self.dir.path().join(VENV_DIR)
    }

    pub fn bin_dir(&self) -> PathBuf {
        self.venv_path().join("bin")
    }

    pub fn write_executable(&self, name: &str, body: &str) {
        let path = self.bin_dir().join(name);
        fs::write(&path, body).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    pub fn version_ran(&self) -> bool {
        self.venv_path().join(".version-ran").exists()
    }
}
