//! Shared test infrastructure for integration tests.

use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

pub const SIMPLE_CSV: &str = "Value,Semantics,Reference\n\
0-19,Unassigned,\n\
20,false,[RFC8949]\n\
21,true,[RFC8949]\n";

pub const TAGS_CSV: &str = "Tag,Data Item,Semantics,Reference,Template\n\
0,UTF-8 string,Standard date/time string; see Section 3.4.1,[RFC8949],\n\
2,byte string,Positive bignum,[RFC8949],\n";

/// Relative to the workspace root, as written into the config.
pub const HEADER_REL: &str = "include/cbor.h";
pub const CACHE_REL: &str = "cache";

/// A scratch directory the binary runs in, with its own config and cache.
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp dir"),
        }
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    /// Run `ianagen` with the workspace as its working directory.
    pub fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_ianagen"))
            .args(args)
            .current_dir(self.dir.path())
            .env_remove("RUST_LOG")
            .output()
            .expect("run ianagen")
    }

    /// `ianagen init` followed by pointing the header and cache into the workspace.
    #[allow(dead_code)]
    pub fn init_config(&self, preset: &str) {
        let output = self.run(&["init", "--preset", preset]);
        assert!(output.status.success(), "init failed: {}", stderr(&output));

        let config_path = self.path("ianagen.json");
        let text = fs::read_to_string(&config_path).expect("read config");
        let mut config: serde_json::Value = serde_json::from_str(&text).expect("parse config");
        config["header_path"] = serde_json::json!(HEADER_REL);
        config["cache_dir"] = serde_json::json!(CACHE_REL);
        let text = serde_json::to_string_pretty(&config).expect("serialize config");
        fs::write(&config_path, text).expect("write config");
    }

    #[allow(dead_code)]
    pub fn seed_cache(&self, simple: &str, tags: &str) {
        let cache = self.path(CACHE_REL);
        fs::create_dir_all(&cache).expect("create cache dir");
        fs::write(cache.join("simple.csv"), simple).expect("write simple.csv");
        fs::write(cache.join("tags.csv"), tags).expect("write tags.csv");
    }

    #[allow(dead_code)]
    pub fn header(&self) -> String {
        fs::read_to_string(self.path(HEADER_REL)).expect("read header")
    }
}

#[allow(dead_code)]
pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
