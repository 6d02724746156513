//! Stream files on disk: layering, validation and baseline round trip

use pretty_assertions::assert_eq;
use std::fs;
use tempfile::TempDir;

use cmg::domain::entities::component::{Component, ComponentSource, GitTarget, SvnLocation};
use cmg::domain::entities::config_snapshot::ConfigSnapshot;
use cmg::domain::value_objects::scm_type::ScmType;
use cmg::infrastructure::filesystem::{find_container_root, load_baseline_config, StreamStore};
use cmg::CmgError;

const BASE: &str = "\
[DEFAULT]
pushurl = git@example.com:mirror.git

[lib]
type = git
url = git@example.com:lib.git
branch = main

[ext]
type = Subversion
branch_url = http://svn.example.com/ext/trunk

[docs]
type = DIR
url = /share/docs
";

fn container() -> TempDir {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    fs::write(temp_dir.path().join("_stream"), BASE).unwrap();
    temp_dir
}

#[tokio::test]
async fn test_layers_base_local_then_remote() {
    let temp_dir = container();
    fs::write(
        temp_dir.path().join("_stream_feature"),
        "[lib]\nbranch = feature\n[ext]\nrevision = 100\n",
    )
    .unwrap();
    fs::write(
        temp_dir.path().join("_stream_origin_feature"),
        "[lib]\nbranch = integration\n[tools]\ntype = fl\nurl = tools/run.sh\n",
    )
    .unwrap();

    let snapshot = StreamStore::new(temp_dir.path())
        .load_stream("feature", "origin/feature")
        .await
        .unwrap();

    assert_eq!(snapshot.get("lib", "branch"), Some("integration"));
    assert_eq!(snapshot.get("ext", "revision"), Some("100"));
    assert_eq!(snapshot.get("docs", "url"), Some("/share/docs"));
    assert_eq!(
        snapshot.section_names().collect::<Vec<_>>(),
        vec!["lib", "ext", "docs", "tools"]
    );
    // DEFAULT applies to every section
    assert_eq!(snapshot.get("docs", "pushurl"), Some("git@example.com:mirror.git"));
}

#[tokio::test]
async fn test_missing_overrides_are_skipped() {
    let temp_dir = container();
    let store = StreamStore::new(temp_dir.path());
    let layered = store.load_stream("master", "origin/master").await.unwrap();
    let base = ConfigSnapshot::parse(BASE, "_stream").unwrap();
    assert_eq!(layered, base);
}

#[tokio::test]
async fn test_broken_override_is_fatal() {
    let temp_dir = container();
    fs::write(temp_dir.path().join("_stream_feature"), "[lib]\nbranch main\n").unwrap();

    let error = StreamStore::new(temp_dir.path())
        .load_stream("feature", "")
        .await
        .unwrap_err();
    assert!(matches!(error, CmgError::ConfigParseError { .. }));
    assert!(error.to_string().contains("_stream_feature"));
    assert_eq!(error.exit_code(), 2);
}

#[test]
fn test_components_from_stream() {
    let snapshot = ConfigSnapshot::parse(BASE, "_stream").unwrap();
    let components = Component::all_from(&snapshot).unwrap();

    assert_eq!(components.len(), 3);
    assert_eq!(components[0].kind, ScmType::Git);
    assert_eq!(
        components[0].source,
        ComponentSource::Git {
            url: "git@example.com:lib.git".into(),
            pushurl: Some("git@example.com:mirror.git".into()),
            target: GitTarget::Branch("main".into()),
        }
    );
    assert_eq!(components[1].kind, ScmType::Svn);
    assert_eq!(
        components[1].source,
        ComponentSource::Subversion(SvnLocation::Branch {
            url: "http://svn.example.com/ext/trunk".into(),
            revision: None,
        })
    );
    assert_eq!(components[2].kind, ScmType::Dir);
}

#[test]
fn test_invalid_component_fails_whatever_its_position() {
    for text in [
        "[bad]\ntype = git\nbranch = main\n[good]\ntype = dir\nurl = /x\n",
        "[good]\ntype = dir\nurl = /x\n[bad]\ntype = git\nbranch = main\n",
    ] {
        let snapshot = ConfigSnapshot::parse(text, "_stream").unwrap();
        match Component::all_from(&snapshot).unwrap_err() {
            CmgError::ConfigError { section, key, .. } => {
                assert_eq!(section, "bad");
                assert_eq!(key.as_deref(), Some("url"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }
}

#[test]
fn test_unknown_type_is_a_config_error() {
    let snapshot = ConfigSnapshot::parse("[x]\ntype = cvs\n", "_stream").unwrap();
    let error = Component::all_from(&snapshot).unwrap_err();
    assert!(error.is_config_error());
}

#[test]
fn test_baseline_annotation_round_trip() {
    let mut snapshot = ConfigSnapshot::parse(BASE, "_stream").unwrap();
    snapshot.set("lib", "tag", "v1.0");
    snapshot.remove_option("lib", "branch");
    snapshot.set("ext", "revision", "1234");

    let annotation = snapshot.to_string();
    let reread = load_baseline_config("v1.0", &annotation).unwrap();
    assert_eq!(reread, snapshot);
    for component in Component::all_from(&reread).unwrap() {
        assert_eq!(component, Component::from_snapshot(&snapshot, &component.name).unwrap());
    }
}

#[test]
fn test_container_root_from_component_directory() {
    let temp_dir = container();
    let nested = temp_dir.path().join("lib").join("src");
    fs::create_dir_all(&nested).unwrap();
    assert_eq!(find_container_root(&nested).unwrap(), temp_dir.path());
}
