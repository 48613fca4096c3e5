//! Shared harness for driving the `augment-cleaner` binary.
//!
//! Every case runs inside a throwaway sandbox: `HOME` points at a fake
//! profile, the working directory is a separate `work` dir, and stdin is a
//! pipe fed with scripted answers. Combined output is kept under the cargo
//! target tmpdir so a failing assertion can point at it.

#![allow(dead_code)]

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use tempfile::TempDir;
use walkdir::WalkDir;

pub struct CliResult {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
    pub log_path: PathBuf,
}

pub struct Sandbox {
    tmp: TempDir,
    pub home: PathBuf,
    pub work: PathBuf,
}

impl Sandbox {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("create sandbox");
        let home = tmp.path().join("home");
        let work = tmp.path().join("work");
        fs::create_dir_all(&home).expect("create home");
        fs::create_dir_all(&work).expect("create work");
        Self { tmp, home, work }
    }

    pub fn root(&self) -> &Path {
        self.tmp.path()
    }

    /// `<home>/.config/Code`
    pub fn editor_data(&self) -> PathBuf {
        self.home.join(".config").join("Code")
    }

    pub fn extension_dir(&self) -> PathBuf {
        self.home
            .join(".vscode")
            .join("extensions")
            .join("augment.vscode-augment-0.521.0")
    }

    pub fn settings(&self) -> PathBuf {
        self.editor_data().join("User").join("settings.json")
    }

    /// Create `path` (and parents) with `contents`.
    pub fn write(&self, path: &Path, contents: &str) {
        fs::create_dir_all(path.parent().expect("file has a parent")).expect("create parent");
        fs::write(path, contents).expect("write fixture");
    }

    /// Installed extension with a handful of nested files.
    pub fn install_extension(&self) {
        let dir = self.extension_dir();
        self.write(&dir.join("package.json"), "{}");
        self.write(&dir.join("out").join("extension.js"), "module.exports = {}");
        self.write(&dir.join("media").join("icon.svg"), "<svg/>");
    }

    /// Every path under the sandbox with file contents, for before/after
    /// comparisons.
    pub fn snapshot(&self) -> Vec<(PathBuf, Option<Vec<u8>>)> {
        WalkDir::new(self.root())
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .map(|entry| {
                let entry = entry.expect("walk sandbox");
                let bytes = (!entry.file_type().is_dir())
                    .then(|| fs::read(entry.path()).expect("read sandbox file"));
                (entry.into_path(), bytes)
            })
            .collect()
    }
}

/// Run the binary in a fresh, empty sandbox with no stdin input.
pub fn run_cli_case(case: &str, args: &[&str]) -> CliResult {
    let sandbox = Sandbox::new();
    run_cli_in(case, &sandbox, args, "")
}

/// Run the binary inside `sandbox`, feeding `stdin` to its prompts.
pub fn run_cli_in(case: &str, sandbox: &Sandbox, args: &[&str], stdin: &str) -> CliResult {
    let mut child = Command::new(env!("CARGO_BIN_EXE_augment-cleaner"))
        .args(args)
        .arg("--no-pause")
        .current_dir(&sandbox.work)
        .env("HOME", &sandbox.home)
        .env("USER", "tester")
        .env("XDG_CONFIG_HOME", sandbox.root().join("xdg"))
        .env_remove("AUGMENT_CLEANER_CONFIG")
        .env("NO_COLOR", "1")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn augment-cleaner");

    {
        let mut pipe = child.stdin.take().expect("stdin is piped");
        pipe.write_all(stdin.as_bytes()).expect("feed stdin");
    }
    let output = child.wait_with_output().expect("wait for augment-cleaner");

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    let log_dir = Path::new(env!("CARGO_TARGET_TMPDIR")).join("cli-cases");
    fs::create_dir_all(&log_dir).expect("create case log dir");
    let log_path = log_dir.join(format!("{case}.log"));
    let log = format!(
        "args: {args:?}\nstatus: {}\n--- stdout ---\n{stdout}\n--- stderr ---\n{stderr}\n",
        output.status
    );
    fs::write(&log_path, log).expect("write case log");

    CliResult {
        status: output.status,
        stdout,
        stderr,
        log_path,
    }
}
