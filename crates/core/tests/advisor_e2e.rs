//! End-to-end tests for the advisory run against real git repositories.
//!
//! Fixtures are built with `git2` in temporary directories:
//! - an "upstream" repository standing in for the other project
//! - a "local" clone with one diverging commit of its own
//!
//! The advisor then runs the real `git` binary through [`GitCli`], with the
//! remote URL pointed at the upstream path. No network I/O.
//!
//! Tests skip gracefully if `git` is not installed.

use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::Utc;
use git2::{Oid, Repository, Signature, Time};
use tempfile::TempDir;

use cherryscout_core::conflict::{CompatibilityOracle, MergeStrategy};
use cherryscout_core::git::{ChangeSetInspector, RemoteRegistry};
use cherryscout_core::models::{Project, VerdictMethod};
use cherryscout_core::report::CollectingSink;
use cherryscout_core::{Advisor, AdvisorOptions, GitCli};

// ===========================================================================
// Helpers
// ===========================================================================

fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Whether the installed git has `merge-tree --write-tree --merge-base`.
fn git_supports_write_tree() -> bool {
    let Ok(out) = Command::new("git").arg("--version").output() else {
        return false;
    };
    // "git version 2.43.0" (possibly with a vendor suffix)
    let text = String::from_utf8_lossy(&out.stdout);
    let mut parts = text
        .split_whitespace()
        .nth(2)
        .unwrap_or_default()
        .split('.')
        .map(|p| p.parse::<u32>().unwrap_or(0));
    let major = parts.next().unwrap_or(0);
    let minor = parts.next().unwrap_or(0);
    (major, minor) >= (2, 40)
}

const BASE_CONTENT: &str = "line1\nline2\nline3\n";

/// Write a flat tree holding `files`.
fn write_tree(repo: &Repository, files: &[(&str, &str)]) -> Oid {
    let mut builder = repo.treebuilder(None).unwrap();
    for (name, content) in files {
        let blob = repo.blob(content.as_bytes()).unwrap();
        builder.insert(name, blob, 0o100644).unwrap();
    }
    builder.write().unwrap()
}

/// Commit `tree` with identical author and committer times `days_ago`.
fn commit(
    repo: &Repository,
    update_ref: &str,
    parents: &[Oid],
    tree: Oid,
    author: &str,
    message: &str,
    days_ago: i64,
) -> Oid {
    let when = Time::new(Utc::now().timestamp() - days_ago * 86_400, 0);
    let sig = Signature::new(author, &format!("{}@example.com", author.replace(['[', ']'], "")), &when)
        .unwrap();
    let tree = repo.find_tree(tree).unwrap();
    let parents: Vec<git2::Commit<'_>> = parents
        .iter()
        .map(|oid| repo.find_commit(*oid).unwrap())
        .collect();
    let parent_refs: Vec<&git2::Commit<'_>> = parents.iter().collect();
    repo.commit(Some(update_ref), &sig, &sig, message, &tree, &parent_refs)
        .unwrap()
}

struct Fixture {
    _dir: TempDir,
    upstream_path: String,
    local: Repository,
    base: Oid,
    bot: Oid,
    clean: Oid,
    conflict: Oid,
}

/// Upstream: base (30 days ago) <- bot <- clean <- conflict.
/// Local: clone of base, plus a commit changing the line the conflict
/// commit also changes.
fn build_fixture() -> Fixture {
    let dir = TempDir::new().unwrap();
    let upstream_dir = dir.path().join("upstream");
    let local_dir = dir.path().join("local");

    let upstream = Repository::init(&upstream_dir).unwrap();
    let tree = write_tree(&upstream, &[("conflict.txt", BASE_CONTENT)]);
    let base = commit(&upstream, "refs/heads/main", &[], tree, "Maintainer", "Initial import", 30);
    upstream.set_head("refs/heads/main").unwrap();

    let local = Repository::clone(upstream_dir.to_str().unwrap(), &local_dir).unwrap();
    let tree = write_tree(&local, &[("conflict.txt", "line1\nlocal change\nline3\n")]);
    commit(&local, "HEAD", &[base], tree, "Local Dev", "Local tweak", 5);

    let tree = write_tree(
        &upstream,
        &[("conflict.txt", BASE_CONTENT), ("deps.json", "{}\n")],
    );
    let bot = commit(
        &upstream,
        "refs/heads/main",
        &[base],
        tree,
        "renovate[bot]",
        "chore(deps): pin dependencies",
        3,
    );
    let tree = write_tree(
        &upstream,
        &[
            ("conflict.txt", BASE_CONTENT),
            ("deps.json", "{}\n"),
            ("feature.txt", "feature\n"),
        ],
    );
    let clean = commit(&upstream, "refs/heads/main", &[bot], tree, "Alice", "Add feature (#101)", 2);
    let tree = write_tree(
        &upstream,
        &[
            ("conflict.txt", "line1\nupstream change\nline3\n"),
            ("deps.json", "{}\n"),
            ("feature.txt", "feature\n"),
        ],
    );
    let conflict = commit(
        &upstream,
        "refs/heads/main",
        &[clean],
        tree,
        "Bob",
        "Tweak config (#102)",
        1,
    );

    Fixture {
        upstream_path: upstream_dir.to_str().unwrap().to_string(),
        _dir: dir,
        local,
        base,
        bot,
        clean,
        conflict,
    }
}

fn options_for(fixture: &Fixture) -> AdvisorOptions {
    let mut options = AdvisorOptions::for_project(Project::Aurora);
    options.remote_url = fixture.upstream_path.clone();
    options
}

fn local_path(fixture: &Fixture) -> &Path {
    fixture.local.workdir().unwrap()
}

type Snapshot = (
    Option<Oid>,
    Vec<(String, Option<Oid>)>,
    Vec<u8>,
    Vec<(PathBuf, Vec<u8>)>,
);

/// HEAD, every ref, the raw index and every working-tree file outside
/// `.git`, for side-effect comparisons.
fn repo_snapshot(repo: &Repository) -> Snapshot {
    let head = repo.head().ok().and_then(|h| h.target());
    let mut refs: Vec<(String, Option<Oid>)> = repo
        .references()
        .unwrap()
        .map(|r| {
            let r = r.unwrap();
            (r.name().unwrap_or_default().to_string(), r.target())
        })
        .collect();
    refs.sort();
    let index = std::fs::read(repo.path().join("index")).unwrap_or_default();

    let workdir = repo.workdir().unwrap();
    let mut files = Vec::new();
    collect_files(workdir, workdir, &mut files);
    files.sort();
    (head, refs, index, files)
}

fn collect_files(root: &Path, dir: &Path, files: &mut Vec<(PathBuf, Vec<u8>)>) {
    for entry in std::fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        if path.file_name().is_some_and(|name| name == ".git") {
            continue;
        }
        if path.is_dir() {
            collect_files(root, &path, files);
        } else {
            let bytes = std::fs::read(&path).unwrap();
            files.push((path.strip_prefix(root).unwrap().to_path_buf(), bytes));
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[tokio::test]
async fn test_advisor_reports_human_commits_with_verdicts() {
    if !git_available() {
        eprintln!("skipping: git not installed");
        return;
    }
    let fixture = build_fixture();
    let advisor = Advisor::new(GitCli::new(local_path(&fixture)), options_for(&fixture));
    let mut sink = CollectingSink::new();

    let summary = advisor.run(&mut sink).await.unwrap();
    assert_eq!(summary.total_commits, 3);
    assert_eq!(summary.excluded_commits, 1);
    assert_eq!(summary.reported, 2);

    let hashes: Vec<String> = sink.entries.iter().map(|e| e.commit.hash.clone()).collect();
    assert_eq!(
        hashes,
        vec![fixture.conflict.to_string(), fixture.clean.to_string()]
    );
    assert!(!hashes.contains(&fixture.bot.to_string()));
    for hash in &hashes {
        assert_eq!(hash.len(), 40);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    let conflicting = &sink.entries[0];
    let verdict = conflicting.verdict.as_ref().unwrap();
    assert_eq!(verdict.method(), VerdictMethod::Simulated);
    assert!(!verdict.applicable());
    assert!(verdict.conflicting_paths().contains("conflict.txt"));
    assert_eq!(
        conflicting.pr_url.as_deref(),
        Some("https://github.com/ublue-os/bluefin/pull/102")
    );

    let clean = &sink.entries[1];
    let verdict = clean.verdict.as_ref().unwrap();
    assert!(verdict.applicable(), "unexpected verdict: {verdict:?}");
    assert_eq!(clean.changes.len(), 1);
    assert_eq!(clean.changes[0].path, "feature.txt");

    let context = sink.context.unwrap();
    assert_eq!(context.reference, "bluefin/main");
    assert!(context.remote.fetched);
}

#[tokio::test]
async fn test_ensure_remote_twice_yields_one_remote() {
    if !git_available() {
        eprintln!("skipping: git not installed");
        return;
    }
    let fixture = build_fixture();
    let cli = GitCli::new(local_path(&fixture));
    let registry = RemoteRegistry::new(&cli);

    assert!(registry
        .ensure_remote("bluefin", &fixture.upstream_path)
        .await
        .unwrap());
    assert!(!registry
        .ensure_remote("bluefin", &fixture.upstream_path)
        .await
        .unwrap());

    let reopened = Repository::open(local_path(&fixture)).unwrap();
    let remotes = reopened.remotes().unwrap();
    let matching = remotes.iter().flatten().filter(|r| *r == "bluefin").count();
    assert_eq!(matching, 1);
}

async fn assert_oracle_is_side_effect_free(strategy: MergeStrategy) {
    let fixture = build_fixture();
    let cli = GitCli::new(local_path(&fixture));
    RemoteRegistry::new(&cli)
        .establish("bluefin", &fixture.upstream_path)
        .await
        .unwrap();

    let before = repo_snapshot(&fixture.local);
    assert!(before
        .3
        .iter()
        .any(|(path, bytes)| path == Path::new("conflict.txt") && bytes == BASE_CONTENT.as_bytes()));

    let oracle = CompatibilityOracle::new(&cli, strategy);
    let hash = fixture.conflict.to_string();
    let first = oracle.evaluate(&hash, "HEAD").await;
    let second = oracle.evaluate(&hash, "HEAD").await;
    let after = repo_snapshot(&fixture.local);

    assert_eq!(first, second);
    assert_eq!(first.method(), VerdictMethod::Simulated, "{strategy}: {first:?}");
    assert!(!first.applicable());
    assert!(first.conflicting_paths().contains("conflict.txt"));
    assert_eq!(before, after, "{strategy} touched the repository");
}

#[tokio::test]
async fn test_oracle_is_side_effect_free_and_idempotent() {
    if !git_available() {
        eprintln!("skipping: git not installed");
        return;
    }
    assert_oracle_is_side_effect_free(MergeStrategy::MarkerScan).await;
}

#[tokio::test]
async fn test_write_tree_oracle_is_side_effect_free_and_idempotent() {
    if !git_available() || !git_supports_write_tree() {
        eprintln!("skipping: git 2.40+ not installed");
        return;
    }
    assert_oracle_is_side_effect_free(MergeStrategy::WriteTree).await;
}

#[tokio::test]
async fn test_root_commit_has_no_changes_and_unknown_verdict() {
    if !git_available() {
        eprintln!("skipping: git not installed");
        return;
    }
    let fixture = build_fixture();
    let cli = GitCli::new(local_path(&fixture));
    let base = fixture.base.to_string();

    let changes = ChangeSetInspector::new(&cli).inspect(&base).await;
    assert!(changes.files.is_empty());
    assert!(changes.diagnostic.is_some());

    let verdict = CompatibilityOracle::new(&cli, MergeStrategy::MarkerScan)
        .evaluate(&base, "HEAD")
        .await;
    assert_eq!(verdict.method(), VerdictMethod::Unknown);
    assert!(!verdict.applicable());
}
