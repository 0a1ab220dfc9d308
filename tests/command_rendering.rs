#![cfg(unix)]

use docnav::build::Site;
use std::{fs, path::Path};

const SIDEBARS: &str = r#"{"Docs": ["intro", {"type": "category", "label": "Guides", "items": ["guides/setup"]}]}"#;

fn write_site(root: &Path, outputs: &str) {
    let config = format!("[site]\ntitle = \"Commands\"\n\n{outputs}");

    fs::write(root.join("docnav.toml"), config).expect("failed to write config");
    fs::write(root.join("sidebars.json"), SIDEBARS).expect("failed to write sidebars");
    fs::create_dir_all(root.join("docs/guides")).expect("failed to create docs");
    fs::write(root.join("docs/intro.md"), "---\ntitle: Introduction\n---\n")
        .expect("failed to write document");
    fs::write(root.join("docs/guides/setup.md"), "").expect("failed to write document");
}

#[test]
fn it_pipes_the_render_context_to_commands() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let root = dir.path();
    write_site(
        root,
        "[output.capture]\ncommand = \"sh -c 'cat > captured.json'\"\n",
    );

    let site = Site::load(root).expect("failed to load site");
    site.build().expect("failed to build site");

    // The command ran from the site root, so its output landed there.
    let captured = fs::read_to_string(root.join("captured.json")).expect("payload missing");
    let payload: serde_json::Value =
        serde_json::from_str(&captured).expect("payload was not json");

    let mut keys: Vec<_> = payload
        .as_object()
        .expect("payload was not an object")
        .keys()
        .map(String::as_str)
        .collect();
    keys.sort_unstable();

    assert_eq!(
        keys,
        ["config", "destination", "navigation", "root", "sidebars"]
    );
    assert_eq!(payload["config"]["site"]["title"], "Commands");
    assert_eq!(payload["sidebars"]["Docs"][0], "intro");
    assert_eq!(payload["navigation"]["Docs"][0]["label"], "Introduction");
    assert_eq!(
        payload["navigation"]["Docs"][1]["items"][0]["path"],
        "guides/setup.md"
    );
}

#[test]
fn it_fails_the_build_when_a_command_fails() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let root = dir.path();
    write_site(
        root,
        "[output.broken]\ncommand = \"false\"\n\n[output.json]\n",
    );

    let site = Site::load(root).expect("failed to load site");
    let error = site.build().expect_err("build should fail");
    let message = format!("{error:#}");

    assert!(message.contains("The broken renderer failed"), "{message}");
    assert!(
        !root.join("build").join("navigation.json").exists(),
        "renderers after a failed one should not run"
    );
}

#[test]
fn it_reports_commands_that_cannot_start() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let root = dir.path();
    write_site(
        root,
        "[output.missing]\ncommand = \"./no-such-renderer --flag\"\n",
    );

    let site = Site::load(root).expect("failed to load site");
    let error = site.build().expect_err("build should fail");

    assert!(format!("{error:#}").contains("Failed to run `./no-such-renderer --flag`"));
}
