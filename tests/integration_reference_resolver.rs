//! Reference resolution against an in-memory repository

mod common;

use common::fake_scm::FakeGit;
use common::test_fixtures::ScriptedDecider;

use cmg::application::services::decision::PolicyDecider;
use cmg::application::services::reference_resolver::{ReferenceResolver, Strictness};
use cmg::domain::value_objects::reference_point::{PointCategory, ResolvedPoint};
use cmg::CmgError;

fn repository() -> FakeGit {
    FakeGit::on_branch("/c", "feature")
        .with_branch("master", Some("origin/master"))
        .with_branch("scratch", None)
        .with_remote_branch("origin/master")
        .with_remote_branch("origin/release")
        .with_tag("v1.0")
}

#[tokio::test]
async fn test_empty_point_is_current_branch() {
    let git = repository();
    let decider = PolicyDecider::aborting();
    let resolution = ReferenceResolver::new(&git, &decider, Strictness::Strict)
        .resolve("")
        .await
        .unwrap();

    assert_eq!(resolution.category, PointCategory::CurrentBranch);
    assert_eq!(resolution.point, ResolvedPoint::branch("feature", "origin/feature"));
}

#[tokio::test]
async fn test_existing_local_branch() {
    let git = repository();
    let decider = PolicyDecider::aborting();
    let resolution = ReferenceResolver::new(&git, &decider, Strictness::Strict)
        .resolve("master")
        .await
        .unwrap();

    assert_eq!(resolution.category, PointCategory::LocalBranch);
    assert_eq!(resolution.point, ResolvedPoint::branch("master", "origin/master"));
    assert!(git.calls().is_empty());
}

#[tokio::test]
async fn test_remote_only_branch_creates_local() {
    let git = repository();
    let decider = PolicyDecider::aborting();
    let resolution = ReferenceResolver::new(&git, &decider, Strictness::Strict)
        .resolve("release")
        .await
        .unwrap();

    assert_eq!(resolution.category, PointCategory::CreatedLocalBranch);
    assert_eq!(resolution.point, ResolvedPoint::branch("release", "origin/release"));
    assert_eq!(git.calls(), vec!["branch release origin/release".to_string()]);
}

#[tokio::test]
async fn test_remote_tracking_name_maps_to_tracking_local() {
    let git = repository();
    let decider = PolicyDecider::aborting();
    let resolution = ReferenceResolver::new(&git, &decider, Strictness::Strict)
        .resolve("origin/master")
        .await
        .unwrap();

    assert_eq!(resolution.category, PointCategory::RemoteTrackingBranch);
    assert_eq!(resolution.point, ResolvedPoint::branch("master", "origin/master"));
}

#[tokio::test]
async fn test_remote_tracking_name_without_local_creates_one() {
    let git = repository();
    let decider = PolicyDecider::aborting();
    let resolution = ReferenceResolver::new(&git, &decider, Strictness::Strict)
        .resolve("origin/release")
        .await
        .unwrap();

    assert_eq!(resolution.category, PointCategory::RemoteTrackingBranch);
    assert_eq!(resolution.point, ResolvedPoint::branch("release", "origin/release"));
    assert!(git.branch_names().contains(&"release".to_string()));
}

#[tokio::test]
async fn test_several_tracking_locals() {
    let git = repository().with_branch("master-copy", Some("origin/master"));

    // strict without an answer fails
    let decider = PolicyDecider::aborting();
    let error = ReferenceResolver::new(&git, &decider, Strictness::Strict)
        .resolve("origin/master")
        .await
        .unwrap_err();
    assert!(matches!(error, CmgError::ResolutionError { .. }));

    // strict asks the operator
    let scripted = ScriptedDecider {
        local_branch: Some("master-copy".into()),
        ..ScriptedDecider::default()
    };
    let resolution = ReferenceResolver::new(&git, &scripted, Strictness::Strict)
        .resolve("origin/master")
        .await
        .unwrap();
    assert_eq!(resolution.point.local(), Some("master-copy"));
    assert_eq!(scripted.asked(), vec!["select origin/master".to_string()]);

    // lenient picks the first and warns
    let resolution = ReferenceResolver::new(&git, &decider, Strictness::Lenient)
        .resolve("origin/master")
        .await
        .unwrap();
    assert_eq!(resolution.point.local(), Some("master"));
    assert_eq!(resolution.warnings.len(), 1);
    assert!(resolution.warnings[0].contains("master-copy"));
}

#[tokio::test]
async fn test_tag() {
    let git = repository();
    let decider = PolicyDecider::aborting();
    let resolution = ReferenceResolver::new(&git, &decider, Strictness::Strict)
        .resolve("v1.0")
        .await
        .unwrap();

    assert_eq!(resolution.category, PointCategory::Tag);
    assert_eq!(resolution.point, ResolvedPoint::Tag("v1.0".into()));
}

#[tokio::test]
async fn test_unknown_point() {
    let git = repository();
    let decider = PolicyDecider::aborting();

    let error = ReferenceResolver::new(&git, &decider, Strictness::Strict)
        .resolve("nowhere")
        .await
        .unwrap_err();
    assert_eq!(error.exit_code(), 2);

    let resolution = ReferenceResolver::new(&git, &decider, Strictness::Lenient)
        .resolve("nowhere")
        .await
        .unwrap();
    assert_eq!(resolution.category, PointCategory::Unresolved);
    assert_eq!(resolution.warnings.len(), 1);
}

#[tokio::test]
async fn test_untracked_local_branch() {
    let git = repository();
    let decider = PolicyDecider::aborting();

    assert!(ReferenceResolver::new(&git, &decider, Strictness::Strict)
        .resolve("scratch")
        .await
        .is_err());

    let resolution = ReferenceResolver::new(&git, &decider, Strictness::Lenient)
        .resolve("scratch")
        .await
        .unwrap();
    assert_eq!(resolution.point.local(), Some("scratch"));
    assert_eq!(resolution.point.remote(), None);
    assert_eq!(resolution.warnings.len(), 1);
}

#[tokio::test]
async fn test_tag_rule_only_when_resolving_tags() {
    let git = repository();
    let decider = PolicyDecider::aborting();
    let resolver = ReferenceResolver::new(&git, &decider, Strictness::Strict);

    assert!(resolver.resolve_branch("v1.0").await.is_err());
    assert!(resolver.resolve_tag("master").await.is_err());
    assert_eq!(
        resolver.resolve_tag("v1.0").await.unwrap().category,
        PointCategory::Tag
    );
}

#[tokio::test]
async fn test_resolution_is_deterministic() {
    let decider = PolicyDecider::aborting();
    for point in ["", "master", "origin/master", "v1.0"] {
        let first = repository();
        let second = repository();
        let a = ReferenceResolver::new(&first, &decider, Strictness::Strict)
            .resolve(point)
            .await
            .unwrap();
        let b = ReferenceResolver::new(&second, &decider, Strictness::Strict)
            .resolve(point)
            .await
            .unwrap();
        assert_eq!(a, b, "point '{}'", point);
    }
}
