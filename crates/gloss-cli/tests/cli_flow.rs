use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

const PAGE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<html xmlns="http://www.w3.org/1999/xhtml">
  <head><title>Fox Facts</title></head>
  <body>
    <h1>Foxes</h1>
    <p>The quick <b>brown</b> fox jumps over the lazy dog.</p>
    <p>Foxes are small omnivores.</p>
  </body>
</html>
"#;

const URL: &str = "https://example.com/foxes";

fn bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_gloss"))
}

/// Isolated HOME/XDG dirs, a store path and a document file.
struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        std::fs::create_dir_all(dir.path().join("config")).expect("config dir");
        std::fs::create_dir_all(dir.path().join("data")).expect("data dir");
        std::fs::write(dir.path().join("page.xhtml"), PAGE).expect("write page");
        Self { dir }
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    fn store(&self) -> PathBuf {
        self.root().join("store").join("gloss.db")
    }

    fn page(&self) -> String {
        self.root().join("page.xhtml").to_string_lossy().to_string()
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(bin());
        cmd.env("HOME", self.root())
            .env("XDG_CONFIG_HOME", self.root().join("config"))
            .env("XDG_DATA_HOME", self.root().join("data"))
            .env("NO_COLOR", "1")
            .env_remove("GLOSS_PASSPHRASE")
            .env_remove("GLOSS_STORE")
            .env_remove("GLOSS_CONFIG")
            .env_remove("GLOSS_LOG");
        cmd
    }

    /// Run with `--store` pointing into the sandbox.
    fn run(&self, args: &[&str], passphrase: Option<&str>) -> Output {
        let mut cmd = self.command();
        cmd.arg("--store").arg(self.store());
        match passphrase {
            Some(value) => {
                cmd.env("GLOSS_PASSPHRASE", value);
            }
            None => {
                cmd.arg("--no-passphrase");
            }
        }
        cmd.args(args).output().expect("run gloss")
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "command failed: status={:?}\nstdout={}\nstderr={}",
        output.status.code(),
        stdout(output),
        String::from_utf8_lossy(&output.stderr)
    );
}

fn json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

#[test]
fn test_record_round_trip_in_plaintext_mode() {
    let sandbox = Sandbox::new();

    let put = sandbox.run(&["record", "put", "settings", r#"{"theme":"dark"}"#], None);
    assert_success(&put);
    assert!(stdout(&put).contains("mode=plaintext"));

    let get = sandbox.run(&["record", "get", "settings"], None);
    assert_success(&get);
    assert_eq!(json(&get)["theme"], "dark");

    let list = sandbox.run(&["record", "list", "--json"], None);
    assert_success(&list);
    assert_eq!(json(&list), serde_json::json!(["settings"]));

    assert_success(&sandbox.run(&["record", "delete", "settings"], None));
    let gone = sandbox.run(&["record", "get", "settings"], None);
    assert_eq!(gone.status.code(), Some(3));
}

#[test]
fn test_missing_record_exits_not_found_with_hint() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&["record", "get", "nothing"], None);
    assert_eq!(output.status.code(), Some(3));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error=Record 'nothing' not found"));
    assert!(stderr.contains("hint="));
}

#[test]
fn test_invalid_json_value_rejected() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&["record", "put", "settings", "{not json"], None);
    assert_eq!(output.status.code(), Some(4));
}

#[test]
fn test_encrypted_record_needs_matching_passphrase() {
    let sandbox = Sandbox::new();

    let put = sandbox.run(
        &["record", "put", "secret", r#"{"pin":1234}"#],
        Some("correct horse battery"),
    );
    assert_success(&put);
    assert!(stdout(&put).contains("mode=encrypted"));

    let raw = std::fs::read(sandbox.store()).expect("read store");
    assert!(!String::from_utf8_lossy(&raw).contains("1234"));

    let get = sandbox.run(&["record", "get", "secret"], Some("correct horse battery"));
    assert_success(&get);
    assert_eq!(json(&get)["pin"], 1234);

    let locked = sandbox.run(&["record", "get", "secret"], None);
    assert_eq!(locked.status.code(), Some(6));

    let wrong = sandbox.run(&["record", "get", "secret"], Some("wrong passphrase"));
    assert_eq!(wrong.status.code(), Some(5));
}

#[test]
fn test_anchor_encode_then_decode() {
    let sandbox = Sandbox::new();
    let page = sandbox.page();

    let encode = sandbox.run(
        &["anchor", "encode", "--file", &page, "--quote", "brown fox"],
        None,
    );
    assert_success(&encode);
    let anchor = stdout(&encode).trim().to_string();
    let parsed: serde_json::Value = serde_json::from_str(&anchor).expect("anchor JSON");
    assert_eq!(parsed["path"][0]["tag"], "html");
    assert_eq!(parsed["path"][1]["tag"], "body");

    let decode = sandbox.run(
        &["anchor", "decode", "--file", &page, "--anchor", &anchor],
        None,
    );
    assert_success(&decode);
    assert_eq!(stdout(&decode).trim_end(), "brown fox");
}

#[test]
fn test_anchor_against_shorter_document_is_unresolvable() {
    let sandbox = Sandbox::new();
    let page = sandbox.page();
    let encode = sandbox.run(
        &["anchor", "encode", "--file", &page, "--quote", "omnivores"],
        None,
    );
    assert_success(&encode);
    let anchor = stdout(&encode).trim().to_string();

    let short = sandbox.root().join("short.xhtml");
    std::fs::write(&short, "<html><body><p>Foxes.</p></body></html>").expect("write");
    let decode = sandbox.run(
        &[
            "anchor",
            "decode",
            "--file",
            &short.to_string_lossy(),
            "--anchor",
            &anchor,
        ],
        None,
    );
    assert_eq!(decode.status.code(), Some(3));
}

#[test]
fn test_missing_quote_exits_not_found() {
    let sandbox = Sandbox::new();
    let page = sandbox.page();
    let output = sandbox.run(
        &["anchor", "encode", "--file", &page, "--quote", "wolves"],
        None,
    );
    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn test_annotate_flow() {
    let sandbox = Sandbox::new();
    let page = sandbox.page();

    assert_success(&sandbox.run(
        &["annotate", "highlight", URL, "--file", &page, "--quote", "lazy dog"],
        None,
    ));
    assert_success(&sandbox.run(
        &[
            "annotate", "note", URL, "--file", &page, "--text", "Read later", "-t",
            "Animals, reading",
        ],
        None,
    ));
    let point = sandbox.run(
        &[
            "annotate", "note", URL, "--file", &page, "--text", "Check this", "--x", "10",
            "--y", "20",
        ],
        None,
    );
    assert_success(&point);

    let show = sandbox.run(&["annotate", "show", URL, "--file", &page, "--json"], None);
    assert_success(&show);
    let shown = json(&show);
    assert_eq!(shown["title"], "Fox Facts");
    assert_eq!(shown["locked"], false);
    assert_eq!(shown["highlights"][0]["text"], "lazy dog");
    assert_eq!(shown["page_note"]["text"], "Read later");
    assert_eq!(shown["page_note"]["tags"], serde_json::json!(["animals", "reading"]));
    assert_eq!(shown["notes"][0]["position"]["x"], 10.0);

    let pages = sandbox.run(&["annotate", "pages", "--json"], None);
    assert_success(&pages);
    let listed = json(&pages);
    assert_eq!(listed[0]["url"], URL);
    assert_eq!(listed[0]["title"], "Fox Facts");

    let note_id = shown["notes"][0]["id"].as_str().expect("note id").to_string();
    assert_success(&sandbox.run(
        &["annotate", "remove-note", URL, "--file", &page, "--id", &note_id],
        None,
    ));
    let again = sandbox.run(
        &["annotate", "remove-note", URL, "--file", &page, "--id", &note_id],
        None,
    );
    assert_eq!(again.status.code(), Some(3));

    assert_success(&sandbox.run(&["annotate", "clear", URL, "--file", &page], None));
    let cleared = json(&sandbox.run(&["annotate", "show", URL, "--file", &page, "--json"], None));
    assert_eq!(cleared["highlights"], serde_json::json!([]));
    assert_eq!(cleared["notes"], serde_json::json!([]));
    assert_eq!(cleared["page_note"]["text"], "Read later");
}

#[test]
fn test_encrypted_page_shows_locked_without_passphrase() {
    let sandbox = Sandbox::new();
    let page = sandbox.page();
    let passphrase = Some("correct horse battery");

    assert_success(&sandbox.run(
        &["annotate", "highlight", URL, "--file", &page, "--quote", "quick"],
        passphrase,
    ));

    let show = sandbox.run(&["annotate", "show", URL, "--file", &page, "--json"], None);
    assert_success(&show);
    let shown = json(&show);
    assert_eq!(shown["locked"], true);
    assert_eq!(shown["highlights"], serde_json::json!([]));

    let write = sandbox.run(
        &["annotate", "highlight", URL, "--file", &page, "--quote", "brown"],
        None,
    );
    assert_eq!(write.status.code(), Some(6));
}

#[test]
fn test_store_path_from_config_file() {
    let sandbox = Sandbox::new();
    let store = sandbox.root().join("configured.db");
    let config_dir = sandbox.root().join("config").join("gloss");
    std::fs::create_dir_all(&config_dir).expect("config dir");
    std::fs::write(
        config_dir.join("config.toml"),
        format!(
            "[store]\npath = \"{}\"\n\n[anchor]\npolicy = \"common_ancestor\"\n",
            store.to_string_lossy()
        ),
    )
    .expect("write config");

    let output = sandbox
        .command()
        .args(["--no-passphrase", "record", "put", "k", "1"])
        .output()
        .expect("run gloss");
    assert_success(&output);
    assert!(store.exists());

    let encode = sandbox
        .command()
        .args([
            "anchor",
            "encode",
            "--file",
            &sandbox.page(),
            "--quote",
            "omnivores",
        ])
        .output()
        .expect("run gloss");
    assert_success(&encode);
    let anchor = json(&encode);
    assert_eq!(anchor["path"].as_array().map(Vec::len), Some(3));
    assert_eq!(anchor["path"][2], serde_json::json!({"tag": "p", "ordinal": 2}));
    assert_eq!(anchor["start"], 16);
}
