use tempfile::TempDir;

mod common;

fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("json on stdout")
}

fn list(data_dir: &TempDir, kind: &str) -> serde_json::Value {
    let output = common::base_cmd(data_dir)
        .arg("list")
        .arg(kind)
        .output()
        .expect("run list");
    stdout_json(&output)
}

fn seed(data_dir: &TempDir) {
    let output = common::base_cmd(data_dir)
        .arg("seed")
        .output()
        .expect("run seed");
    assert!(output.status.success());
}

#[test]
fn e2e_seed_then_list() {
    let data_dir = TempDir::new().expect("temp dir");
    seed(&data_dir);

    let projects = list(&data_dir, "projects");
    let projects = projects.as_array().expect("array");
    assert_eq!(projects.len(), 3);
    assert_eq!(projects[0]["display_order"], 0);
    assert!(projects[0]["skills"].is_array());

    let blogs = list(&data_dir, "blogs");
    assert_eq!(blogs.as_array().expect("array").len(), 0);
}

#[test]
fn e2e_move_needs_login() {
    let data_dir = TempDir::new().expect("temp dir");
    seed(&data_dir);

    let before = list(&data_dir, "experiences");
    let first = before[0]["id"].as_i64().expect("id");
    let last = before[2]["id"].as_i64().expect("id");
    let move_cmd = || {
        let mut cmd = common::base_cmd(&data_dir);
        cmd.arg("move")
            .arg("experiences")
            .arg(first.to_string())
            .arg("--onto")
            .arg(last.to_string());
        cmd
    };

    let output = move_cmd().output().expect("run move");
    assert!(!output.status.success());

    let output = common::base_cmd(&data_dir)
        .env("FOLIO_LOGIN_PASS", "wrong")
        .arg("login")
        .output()
        .expect("run login");
    assert!(!output.status.success());

    let output = common::base_cmd(&data_dir)
        .env("FOLIO_LOGIN_PASS", common::ADMIN_PASS)
        .arg("login")
        .output()
        .expect("run login");
    assert!(output.status.success());

    let output = move_cmd().output().expect("run move");
    assert!(output.status.success());

    let after = list(&data_dir, "experiences");
    assert_eq!(after[1]["id"], first);
    assert_eq!(after[2]["id"], last);
}
