use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use tempfile::TempDir;

const SERVER: &str = "\
<System>
\t<Name>Plants</Name>
\t<EditionVersion>2024</EditionVersion>
\t<Items>
\t\t<Item>
\t\t\t<ID>T</ID>
\t\t\t<Name>Trees</Name>
\t\t\t<Description/>
\t\t\t<Children>
\t\t\t\t<Item>
\t\t\t\t\t<ID>T.1</ID>
\t\t\t\t\t<Name>Acer</Name>
\t\t\t\t\t<Description/>
\t\t\t\t\t<Children/>
\t\t\t\t</Item>
\t\t\t</Children>
\t\t</Item>
\t</Items>
</System>
";

const PROJECT: &str = "\
systems:
  - name: Plants
    version: \"2024\"
    items:
      - id: T
        name: Trees
        children:
          - id: T.1
            name: Maple
          - id: T.2
            name: Oak
";

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        fs::write(dir.path().join("plants.xml"), SERVER).expect("write server");
        fs::write(dir.path().join("project.yaml"), PROJECT).expect("write project");
        Self { dir }
    }

    fn server(&self) -> PathBuf {
        self.dir.path().join("plants.xml")
    }

    fn project(&self) -> PathBuf {
        self.dir.path().join("project.yaml")
    }

    fn server_text(&self) -> String {
        fs::read_to_string(self.server()).expect("read server")
    }
}

/// `classync <args> --file <server> --identity <identity>`
fn classync(ws: &Workspace, identity: &str, args: &[&str]) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("classync"));
    cmd.env("RUST_LOG", "off")
        .env("NO_COLOR", "1")
        .args(args)
        .arg("--file")
        .arg(ws.server())
        .args(["--identity", identity]);
    cmd
}

fn with_project<'a>(cmd: &'a mut Command, project: &Path) -> &'a mut Command {
    cmd.arg("--project").arg(project)
}

// ---------------------------------------------------------------------------
// 1. Read-only commands
// ---------------------------------------------------------------------------

#[test]
fn tree_prints_server_items() {
    let ws = Workspace::new();
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("classync"));
    cmd.args(["tree", "--file"])
        .arg(ws.server())
        .assert()
        .success()
        .stdout(contains("Plants").and(contains("T.1")).and(contains("Acer")));
}

#[test]
fn tree_on_missing_file_fails() {
    let ws = Workspace::new();
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("classync"));
    cmd.args(["tree", "--file"])
        .arg(ws.dir.path().join("absent.xml"))
        .assert()
        .failure()
        .stderr(contains("does not exist"));
}

#[test]
fn diff_table_lists_conflicts() {
    let ws = Workspace::new();
    let mut cmd = classync(&ws, "WS\\a", &["diff"]);
    with_project(&mut cmd, &ws.project())
        .assert()
        .success()
        .stdout(
            contains("id_collision")
                .and(contains("only_in_project"))
                .and(contains("3 items, 2 need attention")),
        );
}

#[test]
fn diff_json_respects_all_flag() {
    let ws = Workspace::new();

    let mut cmd = classync(&ws, "WS\\a", &["diff", "--json"]);
    let output = with_project(&mut cmd, &ws.project()).output().expect("run");
    assert!(output.status.success());
    let entries: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(entries.as_array().map(Vec::len), Some(2));
    assert_eq!(entries[0]["id"], "T.1");
    assert_eq!(entries[0]["status"], "id_collision");

    let mut cmd = classync(&ws, "WS\\a", &["diff", "--json", "--all"]);
    let output = with_project(&mut cmd, &ws.project()).output().expect("run");
    let entries: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(entries.as_array().map(Vec::len), Some(3));
}

#[test]
fn diff_with_missing_project_catalog_fails() {
    let ws = Workspace::new();
    let mut cmd = classync(&ws, "WS\\a", &["diff"]);
    with_project(&mut cmd, &ws.dir.path().join("absent.yaml"))
        .assert()
        .failure()
        .stderr(contains("failed to load project catalog"));
}

// ---------------------------------------------------------------------------
// 2. Writer commands
// ---------------------------------------------------------------------------

#[test]
fn rename_dry_run_prints_diff_only() {
    let ws = Workspace::new();
    classync(&ws, "WS\\a", &["rename", "T.1", "Maple", "--dry-run"])
        .assert()
        .success()
        .stdout(
            contains("-\t\t\t\t\t<Name>Acer</Name>")
                .and(contains("+\t\t\t\t\t<Name>Maple</Name>")),
        );
    assert_eq!(ws.server_text(), SERVER);
}

#[test]
fn rename_writes_in_place() {
    let ws = Workspace::new();
    classync(&ws, "WS\\a", &["rename", "T.1", "Maple"])
        .assert()
        .success();
    assert_eq!(
        ws.server_text(),
        SERVER.replace("<Name>Acer</Name>", "<Name>Maple</Name>")
    );
}

#[test]
fn rename_unknown_id_fails() {
    let ws = Workspace::new();
    classync(&ws, "WS\\a", &["rename", "Q", "Quince"])
        .assert()
        .failure()
        .stderr(contains("not found: item 'Q'"));
}

#[test]
fn insert_child_lands_under_parent() {
    let ws = Workspace::new();
    classync(
        &ws,
        "WS\\a",
        &["insert", "--id", "T.2", "--name", "Oak", "--parent", "T"],
    )
    .assert()
    .success();

    assert!(ws
        .server_text()
        .contains("\t\t\t\t<Item>\n\t\t\t\t\t<ID>T.2</ID>\n\t\t\t\t\t<Name>Oak</Name>\n"));

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("classync"));
    cmd.args(["tree", "--file"])
        .arg(ws.server())
        .assert()
        .success()
        .stdout(contains("T.2").and(contains("Oak")));
}

#[test]
fn require_lock_blocks_unlocked_writes() {
    let ws = Workspace::new();
    classync(&ws, "WS\\a", &["rename", "T.1", "Maple", "--require-lock"])
        .assert()
        .failure()
        .stderr(contains("is not locked by"));
    assert_eq!(ws.server_text(), SERVER);

    classync(&ws, "WS\\a", &["lock", "acquire"]).assert().success();
    classync(&ws, "WS\\a", &["rename", "T.1", "Maple", "--require-lock"])
        .assert()
        .success();
}

// ---------------------------------------------------------------------------
// 3. Lock protocol
// ---------------------------------------------------------------------------

#[test]
fn lock_round_trip_between_two_identities() {
    let ws = Workspace::new();
    let lock = |identity: &str, action: &str| classync(&ws, identity, &["lock", action]).assert();

    lock("WS-1\\anna", "acquire").success();
    lock("WS-2\\ben", "acquire")
        .failure()
        .stderr(contains("already locked by WS-1\\anna"));
    lock("WS-2\\ben", "release")
        .success()
        .stdout(contains("nothing released"));
    lock("WS-2\\ben", "status")
        .success()
        .stdout(contains("locked by WS-1\\anna"));
    lock("WS-1\\anna", "release").success();
    lock("WS-1\\anna", "status")
        .success()
        .stdout(contains("unlocked"));
}

#[test]
fn lock_status_json_and_break() {
    let ws = Workspace::new();
    classync(&ws, "WS-1\\anna", &["lock", "acquire"])
        .assert()
        .success();

    let output = classync(&ws, "WS-2\\ben", &["lock", "status", "--json"])
        .output()
        .expect("run");
    let info: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(info["locked"], true);
    assert_eq!(info["holder"], "WS-1\\anna");

    classync(&ws, "WS-2\\ben", &["lock", "break"])
        .assert()
        .success()
        .stdout(contains("broke lock held by WS-1\\anna"));
    assert!(!ws.dir.path().join("plants.xml.lock").exists());
}

// ---------------------------------------------------------------------------
// 4. Resolutions
// ---------------------------------------------------------------------------

#[test]
fn resolve_export_leaves_only_the_collision() {
    let ws = Workspace::new();
    let mut cmd = classync(&ws, "WS\\a", &["resolve", "T.2", "--use", "export"]);
    with_project(&mut cmd, &ws.project()).assert().success();
    assert!(ws.server_text().contains("<ID>T.2</ID>"));

    let mut cmd = classync(&ws, "WS\\a", &["diff"]);
    with_project(&mut cmd, &ws.project())
        .assert()
        .success()
        .stdout(contains("only_in_project").not().and(contains("id_collision")));
}

#[test]
fn resolve_server_name_saves_project_catalog() {
    let ws = Workspace::new();
    let mut cmd = classync(&ws, "WS\\a", &["resolve", "T.1", "--use", "server-name"]);
    with_project(&mut cmd, &ws.project())
        .assert()
        .success()
        .stdout(contains("updated"));

    let saved = fs::read_to_string(ws.project()).expect("read project");
    assert!(saved.contains("name: Acer"), "got: {saved}");
    assert_eq!(ws.server_text(), SERVER);
}

#[test]
fn resolve_with_wrong_resolution_fails() {
    let ws = Workspace::new();
    let mut cmd = classync(&ws, "WS\\a", &["resolve", "T.2", "--use", "server-id"]);
    with_project(&mut cmd, &ws.project())
        .assert()
        .failure()
        .stderr(contains("cannot apply use-server-id to a only_in_project entry"));
}
