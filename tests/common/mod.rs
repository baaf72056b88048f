#![allow(dead_code)]
use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Child, Stdio};
use tempfile::TempDir;

pub const CATALOG: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/catalog.toml");

pub struct TestEnv {
    _tmp: TempDir,
    pub root: PathBuf,
    pub config: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let root = tmp.path().to_path_buf();
        let config = root.join("config.toml");
        fs::write(
            &config,
            format!(
                "[paths]\nresults = \"{}\"\nlog = \"{}\"\n\n[catalog]\nfile = \"{}\"\n",
                root.join("results").display(),
                root.join("log/logger.log").display(),
                CATALOG
            ),
        )
        .expect("write config");
        Self {
            _tmp: tmp,
            root,
            config,
        }
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("eodms-cli").expect("binary built");
        cmd.current_dir(&self.root)
            .env_remove("EODMS_PASSWORD")
            .arg("--config")
            .arg(&self.config);
        cmd
    }

    /// Starts the binary with piped stdio and leaves it running.
    pub fn spawn(&self, args: &[&str]) -> Child {
        std::process::Command::new(assert_cmd::cargo::cargo_bin("eodms-cli"))
            .current_dir(&self.root)
            .env_remove("EODMS_PASSWORD")
            .arg("--config")
            .arg(&self.config)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("start binary")
    }

    pub fn results(&self) -> Vec<PathBuf> {
        match fs::read_dir(self.root.join("results")) {
            Ok(entries) => entries.map(|e| e.expect("dir entry").path()).collect(),
            Err(_) => vec![],
        }
    }

    pub fn log(&self) -> String {
        fs::read_to_string(self.root.join("log/logger.log")).unwrap_or_default()
    }

    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.root.join(name);
        fs::write(&path, content).expect("write fixture");
        path
    }
}

/// Splits a rendered command line the way a shell would: on whitespace
/// outside double quotes, with the double quotes removed.
pub fn shell_words(line: &str) -> Vec<String> {
    let mut words = vec![];
    let mut current = String::new();
    let mut quoted = false;
    let mut in_word = false;
    for c in line.chars() {
        match c {
            '"' => {
                quoted = !quoted;
                in_word = true;
            }
            c if c.is_whitespace() && !quoted => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            c => {
                current.push(c);
                in_word = true;
            }
        }
    }
    if in_word {
        words.push(current);
    }
    words
}

pub fn path_str(path: &Path) -> &str {
    path.to_str().expect("utf8 path")
}
