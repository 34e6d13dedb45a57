//! Pruning engine and clean service behavior when removals fail

use deployclean::{
    clean::{CleanService, CleanServiceImpl, CleanTargets},
    config::AppConfigBuilder,
    prune::{PruneError, PruneOptions, Pruner},
    registry::JsonRegistry,
    reporter::Severity,
};
use pretty_assertions::assert_eq;
use test_common::{
    PSR_LOG, RecordingFileSystem, RecordingReporter, RemovalCall, TWIG, VendorTree,
    assert_failed_run, collect_events, get_summary,
};

fn wanted(package_dir: &std::path::Path, patterns: &[&str]) -> Vec<String> {
    patterns
        .iter()
        .map(|p| format!("{}/{p}", package_dir.display()))
        .collect()
}

#[test]
fn test_children_are_removed_before_their_directory() {
    let tree = VendorTree::new().package(TWIG, &["doc/a.rst", "doc/b.rst", "src/Environment.php"]);
    let vendor_dir = tree.vendor_dir().canonicalize().unwrap();
    let package_dir = vendor_dir.join(TWIG);
    let fs = RecordingFileSystem::new();
    let pruner = Pruner::new(fs.clone(), RecordingReporter::new(), &vendor_dir, PruneOptions::default()).unwrap();

    pruner.prune(&wanted(&package_dir, &["src"]), &package_dir).unwrap();

    assert_eq!(
        fs.removals(),
        vec![
            RemovalCall::File(package_dir.join("doc/a.rst")),
            RemovalCall::File(package_dir.join("doc/b.rst")),
            RemovalCall::Dir(package_dir.join("doc")),
        ]
    );
}

#[test]
fn test_failed_removal_is_reported_and_the_walk_continues() {
    let tree = VendorTree::new().package(TWIG, &["a.txt", "b.txt", "c.txt", "keep.txt"]);
    let vendor_dir = tree.vendor_dir().canonicalize().unwrap();
    let package_dir = vendor_dir.join(TWIG);
    let fs = RecordingFileSystem::new();
    fs.fail_on(package_dir.join("b.txt"));
    let reporter = RecordingReporter::new();
    let pruner = Pruner::new(fs.clone(), reporter.clone(), &vendor_dir, PruneOptions::default()).unwrap();

    let err = pruner
        .prune(&wanted(&package_dir, &["keep.txt"]), &package_dir)
        .unwrap_err();

    let PruneError::Incomplete(report) = err else {
        panic!("expected an incomplete run");
    };
    assert_eq!(report.removed().len(), 2);
    assert_eq!(report.failures().len(), 1);
    assert!(package_dir.join("b.txt").exists());
    assert!(!package_dir.join("c.txt").exists());

    let warnings = reporter.messages(Severity::Warning);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("b.txt"), "{warnings:?}");
    assert!(reporter.messages(Severity::Error).is_empty());
}

#[cfg(unix)]
#[test]
fn test_permission_denied_is_recoverable() {
    use std::{fs, os::unix::fs::PermissionsExt};

    // Root ignores directory permissions
    if nix::unistd::Uid::effective().is_root() {
        return;
    }

    let tree = VendorTree::new().package(TWIG, &["locked/inner.txt", "loose.txt", "keep.txt"]);
    let vendor_dir = tree.vendor_dir().canonicalize().unwrap();
    let package_dir = vendor_dir.join(TWIG);
    let locked = package_dir.join("locked");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).unwrap();

    let pruner = Pruner::new(
        deployclean::fs::real::RealFileSystem,
        RecordingReporter::new(),
        &vendor_dir,
        PruneOptions::default(),
    )
    .unwrap();
    let result = pruner.prune(&wanted(&package_dir, &["keep.txt"]), &package_dir);

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    let Err(PruneError::Incomplete(report)) = result else {
        panic!("expected an incomplete run");
    };
    assert!(!report.failures().is_empty());
    assert!(locked.join("inner.txt").exists());
    assert!(!package_dir.join("loose.txt").exists());
    assert!(package_dir.join("keep.txt").exists());
}

#[tokio::test]
async fn test_incomplete_package_is_not_deregistered() {
    let tree = VendorTree::new()
        .package(TWIG, &["src/Environment.php", "a.txt", "b.txt"])
        .package(PSR_LOG, &["src/LoggerInterface.php", "README.md"]);
    let vendor_dir = tree.vendor_dir().canonicalize().unwrap();
    let fs = RecordingFileSystem::new();
    fs.fail_on(vendor_dir.join(TWIG).join("a.txt"));

    let config = AppConfigBuilder::default()
        .vendor_dir(&vendor_dir)
        .rule(TWIG, &["src"])
        .rule(PSR_LOG, &["src"])
        .build();
    let registry = JsonRegistry::load(fs.clone(), tree.registry_file(), &vendor_dir).unwrap();
    let service = CleanServiceImpl::new(fs, registry, config);

    let events = collect_events(service.clean(CleanTargets::All).await).await;

    assert_failed_run(&events);
    let summary = get_summary(&events).unwrap();
    assert_eq!(summary.failed(), &[TWIG]);
    assert_eq!(summary.cleaned(), &[PSR_LOG]);
    // b.txt from the failed package plus README.md
    assert_eq!(summary.removed(), 2);
    assert_eq!(tree.registered(), vec![TWIG.to_string()]);
}
