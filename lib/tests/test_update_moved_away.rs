// Copyright 2020 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Black-box scenarios S1-S6 from the design's testable-properties list:
//! a directory `a/` has been locally moved to `b/`, an incoming update
//! lands on `a/`, and the coordinator must replay it onto `b/`.

use std::fs;

use assert_matches::assert_matches;
use tempfile::TempDir;

use tcmerge_lib::cancel::NeverCancelled;
use tcmerge_lib::checksum::Checksum;
use tcmerge_lib::conflict::{
    self, ConflictSkeleton, ConflictVersion, IncomingChange, LocalChange, OperationKind,
    VersionNodeKind,
};
use tcmerge_lib::coordinator::update_moved_away_conflict_victim;
use tcmerge_lib::db::queries::{self, upsert_node};
use tcmerge_lib::db::{NodeKind, NodeRow, WCRoot};
use tcmerge_lib::error::CoreError;
use tcmerge_lib::notify::{ContentState, NotifyAction, Notification};
use tcmerge_lib::pristine::PristineStore;
use tcmerge_lib::repo_path::RelPath;
use tcmerge_lib::work_queue;

const WC_ID: i64 = 1;

struct Fixture {
    _wc_dir: TempDir,
    _pristine_dir: TempDir,
    wc_root: WCRoot,
    pristine: PristineStore,
}

fn row(
    relpath: &str,
    parent: &str,
    op_depth: i64,
    kind: NodeKind,
    checksum: Option<&Checksum>,
    rev: i64,
    repos_relpath: &str,
    moved_to: Option<&str>,
) -> NodeRow {
    NodeRow {
        wc_id: WC_ID,
        relpath: RelPath::from(relpath),
        op_depth,
        parent_relpath: Some(RelPath::from(parent)),
        kind,
        revision: Some(rev),
        repos_relpath: Some(repos_relpath.to_owned()),
        repos_root_url: Some("file:///repo".to_owned()),
        repos_uuid: Some("uuid-1".to_owned()),
        checksum: checksum.cloned(),
        moved_to: moved_to.map(RelPath::from),
    }
}

/// Builds the fixture common to S1-S4 and S6: directory `a/` (containing
/// file `f`, rev 5, checksum `x`) locally moved to `b/`, then the
/// repository updated so `a/f`'s BASE row now holds rev 6 / checksum `y`.
/// The destination `b/f` working file on disk is seeded with `x`'s bytes
/// unless `dst_working_contents` overrides it.
fn clean_move_fixture(dst_working_contents: &[u8]) -> (Fixture, Checksum, Checksum) {
    let wc_dir = TempDir::new().unwrap();
    let pristine_dir = TempDir::new().unwrap();
    let pristine = PristineStore::open(pristine_dir.path()).unwrap();
    let mut wc_root = WCRoot::open(wc_dir.path(), WC_ID).unwrap();

    let x = pristine.write(b"hello v1\n").unwrap();
    let y = pristine.write(b"hello v2\n").unwrap();

    wc_root
        .with_transaction(|tx| {
            // BASE: post-update source subtree.
            upsert_node(
                tx,
                &row("a", "", 0, NodeKind::Directory, None, 6, "a", Some("b")),
            )?;
            upsert_node(
                tx,
                &row("a/f", "a", 0, NodeKind::File, Some(&y), 6, "a/f", Some("b/f")),
            )?;
            // Tombstone layer recording the deletion/move of the source,
            // refreshed to the post-update values (the layer replacer
            // copies these onto the destination).
            upsert_node(
                tx,
                &row("a", "", 1, NodeKind::Directory, None, 6, "a", None),
            )?;
            upsert_node(
                tx,
                &row("a/f", "a", 1, NodeKind::File, Some(&y), 6, "a/f", None),
            )?;
            // Destination's own layer, still mirroring the pre-update source.
            upsert_node(
                tx,
                &row("b", "", 1, NodeKind::Directory, None, 5, "a", None),
            )?;
            upsert_node(
                tx,
                &row("b/f", "b", 1, NodeKind::File, Some(&x), 5, "a/f", None),
            )?;

            let skel = ConflictSkeleton {
                operation: OperationKind::Update,
                local_change: LocalChange::MovedAway,
                incoming_change: IncomingChange::Edit,
                tree_conflicted: true,
                old_version: ConflictVersion {
                    repos_root_url: "file:///repo".to_owned(),
                    repos_uuid: "uuid-1".to_owned(),
                    path_in_repos: "a".to_owned(),
                    peg_rev: 5,
                    node_kind: VersionNodeKind::Directory,
                },
                new_version: None,
                original_version: None,
            };
            conflict::write_conflict(tx, WC_ID, &RelPath::from("a"), &skel)
        })
        .unwrap();

    fs::create_dir_all(wc_dir.path().join("b")).unwrap();
    fs::write(wc_dir.path().join("b/f"), dst_working_contents).unwrap();

    (
        Fixture {
            _wc_dir: wc_dir,
            _pristine_dir: pristine_dir,
            wc_root,
            pristine,
        },
        x,
        y,
    )
}

#[test]
fn s1_clean_propagation() {
    let (mut fx, _x, y) = clean_move_fixture(b"hello v1\n");
    let mut notifications: Vec<Notification> = Vec::new();

    let work_items = update_moved_away_conflict_victim(
        &mut fx.wc_root,
        &fx.pristine,
        &RelPath::from("a"),
        &mut notifications,
        &NeverCancelled,
        7,
    )
    .unwrap();

    let update_notif = notifications
        .iter()
        .find(|n| n.action == NotifyAction::UpdateUpdate)
        .unwrap();
    assert_eq!(update_notif.content_state, Some(ContentState::Changed));
    assert_eq!(update_notif.old_revision, Some(5));
    assert_eq!(update_notif.revision, Some(6));

    assert!(notifications
        .iter()
        .any(|n| n.action == NotifyAction::UpdateCompleted && n.revision == Some(6)));

    work_queue::run_work_items(fx.wc_root.abspath(), &fx.pristine, &work_items).unwrap();
    assert_eq!(
        fs::read(fx.wc_root.abspath().join("b/f")).unwrap(),
        b"hello v2\n"
    );

    // Layer replace: b/f's op-depth-1 row now mirrors the post-update source.
    let dst = queries::depth_get_info(fx.wc_root.connection(), WC_ID, &RelPath::from("b/f"), 1)
        .unwrap();
    assert_eq!(dst.checksum, Some(y));
    assert_eq!(dst.revision, Some(6));
}

#[test]
fn s2_local_edits_preserved_alongside_incoming_change() {
    // Local addition of a trailing line, disjoint from the incoming
    // word-level change, merges cleanly without conflict.
    let (mut fx, _x, _y) = clean_move_fixture(b"hello v1\nextra\n");
    let mut notifications: Vec<Notification> = Vec::new();

    let work_items = update_moved_away_conflict_victim(
        &mut fx.wc_root,
        &fx.pristine,
        &RelPath::from("a"),
        &mut notifications,
        &NeverCancelled,
        7,
    )
    .unwrap();

    let update_notif = notifications
        .iter()
        .find(|n| n.action == NotifyAction::UpdateUpdate)
        .unwrap();
    assert_eq!(update_notif.content_state, Some(ContentState::Merged));

    work_queue::run_work_items(fx.wc_root.abspath(), &fx.pristine, &work_items).unwrap();
    assert_eq!(
        fs::read(fx.wc_root.abspath().join("b/f")).unwrap(),
        b"hello v2\nextra\n"
    );

    assert!(conflict::read_conflict(fx.wc_root.connection(), WC_ID, &RelPath::from("b/f"))
        .unwrap()
        .is_none());
}

#[test]
fn s3_colliding_edits_conflict() {
    let wc_dir = TempDir::new().unwrap();
    let pristine_dir = TempDir::new().unwrap();
    let pristine = PristineStore::open(pristine_dir.path()).unwrap();
    let mut wc_root = WCRoot::open(wc_dir.path(), WC_ID).unwrap();

    let base = pristine.write(b"base\n").unwrap();
    let incoming = pristine.write(b"left\n").unwrap();

    wc_root
        .with_transaction(|tx| {
            upsert_node(tx, &row("a", "", 0, NodeKind::Directory, None, 6, "a", Some("b")))?;
            upsert_node(
                tx,
                &row("a/f", "a", 0, NodeKind::File, Some(&incoming), 6, "a/f", Some("b/f")),
            )?;
            upsert_node(tx, &row("a", "", 1, NodeKind::Directory, None, 6, "a", None))?;
            upsert_node(
                tx,
                &row("a/f", "a", 1, NodeKind::File, Some(&incoming), 6, "a/f", None),
            )?;
            upsert_node(tx, &row("b", "", 1, NodeKind::Directory, None, 5, "a", None))?;
            upsert_node(tx, &row("b/f", "b", 1, NodeKind::File, Some(&base), 5, "a/f", None))?;

            conflict::write_conflict(
                tx,
                WC_ID,
                &RelPath::from("a"),
                &ConflictSkeleton {
                    operation: OperationKind::Update,
                    local_change: LocalChange::MovedAway,
                    incoming_change: IncomingChange::Edit,
                    tree_conflicted: true,
                    old_version: ConflictVersion {
                        repos_root_url: "file:///repo".to_owned(),
                        repos_uuid: "uuid-1".to_owned(),
                        path_in_repos: "a".to_owned(),
                        peg_rev: 5,
                        node_kind: VersionNodeKind::Directory,
                    },
                    new_version: None,
                    original_version: None,
                },
            )
        })
        .unwrap();

    fs::create_dir_all(wc_dir.path().join("b")).unwrap();
    fs::write(wc_dir.path().join("b/f"), b"right\n").unwrap();

    let mut notifications: Vec<Notification> = Vec::new();
    let work_items = update_moved_away_conflict_victim(
        &mut wc_root,
        &pristine,
        &RelPath::from("a"),
        &mut notifications,
        &NeverCancelled,
        7,
    )
    .unwrap();

    let update_notif = notifications
        .iter()
        .find(|n| n.action == NotifyAction::UpdateUpdate)
        .unwrap();
    assert_eq!(update_notif.content_state, Some(ContentState::Conflicted));

    assert!(work_items
        .iter()
        .any(|item| matches!(item, tcmerge_lib::work_queue::WorkItem::WriteConflictMarkers { .. })));

    let skel = conflict::read_conflict(wc_root.connection(), WC_ID, &RelPath::from("b/f"))
        .unwrap()
        .expect("conflict recorded on b/f");
    assert_eq!(skel.operation, OperationKind::Update);
    let original = skel.original_version.unwrap();
    assert_eq!(original.path_in_repos, "a/f");
    assert_eq!(original.node_kind, VersionNodeKind::File);
}

#[test]
fn s4_shadowed_destination_raises_new_conflict_without_touching_file() {
    let (mut fx, _x, _y) = clean_move_fixture(b"hello v1\n");

    // A further local change shadows b/f above its own op-depth.
    fx.wc_root
        .with_transaction(|tx| {
            upsert_node(
                tx,
                &row("b/f", "b", 2, NodeKind::File, None, 5, "a/f", None),
            )
        })
        .unwrap();

    let mut notifications: Vec<Notification> = Vec::new();
    let work_items = update_moved_away_conflict_victim(
        &mut fx.wc_root,
        &fx.pristine,
        &RelPath::from("a"),
        &mut notifications,
        &NeverCancelled,
        7,
    )
    .unwrap();

    // No content work item was queued for the shadowed file.
    assert!(!work_items.iter().any(|item| matches!(
        item,
        tcmerge_lib::work_queue::WorkItem::InstallFile { dst, .. }
            if dst == &RelPath::from("b/f")
    )));

    let skel = conflict::read_conflict(fx.wc_root.connection(), WC_ID, &RelPath::from("b/f"))
        .unwrap()
        .expect("shadowing recorded as a new tree conflict");
    assert!(skel.tree_conflicted);

    // The working file itself was left untouched.
    assert_eq!(
        fs::read(fx.wc_root.abspath().join("b/f")).unwrap(),
        b"hello v1\n"
    );

    // The shadowing row above the destination's own layer survives the
    // layer replace.
    let shadow =
        queries::depth_get_info(fx.wc_root.connection(), WC_ID, &RelPath::from("b/f"), 2);
    assert!(shadow.is_ok());
}

#[test]
fn s5_unsupported_operation_fails_without_mutating_state() {
    let (mut fx, _x, _y) = clean_move_fixture(b"hello v1\n");

    fx.wc_root
        .with_transaction(|tx| {
            conflict::write_conflict(
                tx,
                WC_ID,
                &RelPath::from("a"),
                &ConflictSkeleton {
                    operation: OperationKind::Merge,
                    local_change: LocalChange::MovedAway,
                    incoming_change: IncomingChange::Edit,
                    tree_conflicted: true,
                    old_version: ConflictVersion {
                        repos_root_url: "file:///repo".to_owned(),
                        repos_uuid: "uuid-1".to_owned(),
                        path_in_repos: "a".to_owned(),
                        peg_rev: 5,
                        node_kind: VersionNodeKind::Directory,
                    },
                    new_version: None,
                    original_version: None,
                },
            )
        })
        .unwrap();

    let mut notifications: Vec<Notification> = Vec::new();
    let result = update_moved_away_conflict_victim(
        &mut fx.wc_root,
        &fx.pristine,
        &RelPath::from("a"),
        &mut notifications,
        &NeverCancelled,
        7,
    );

    assert_matches!(result, Err(CoreError::UnsupportedOperation(_)));

    // Rolled back: the destination's op-depth layer still mirrors the
    // pre-update source, untouched.
    let dst = queries::depth_get_info(fx.wc_root.connection(), WC_ID, &RelPath::from("b/f"), 1)
        .unwrap();
    assert_eq!(dst.revision, Some(5));
}

#[test]
fn s6_directory_walk_visits_only_the_moved_child_that_changed() {
    let wc_dir = TempDir::new().unwrap();
    let pristine_dir = TempDir::new().unwrap();
    let pristine = PristineStore::open(pristine_dir.path()).unwrap();
    let mut wc_root = WCRoot::open(wc_dir.path(), WC_ID).unwrap();

    let x = pristine.write(b"hello v1\n").unwrap();
    let y = pristine.write(b"hello v2\n").unwrap();
    let z = pristine.write(b"unchanged\n").unwrap();

    wc_root
        .with_transaction(|tx| {
            upsert_node(tx, &row("a", "", 0, NodeKind::Directory, None, 6, "a", Some("b")))?;
            upsert_node(
                tx,
                &row("a/f", "a", 0, NodeKind::File, Some(&y), 6, "a/f", Some("b/f")),
            )?;
            upsert_node(
                tx,
                &row("a/g", "a", 0, NodeKind::File, Some(&z), 6, "a/g", Some("b/g")),
            )?;
            upsert_node(tx, &row("a", "", 1, NodeKind::Directory, None, 6, "a", None))?;
            upsert_node(
                tx,
                &row("a/f", "a", 1, NodeKind::File, Some(&y), 6, "a/f", None),
            )?;
            upsert_node(
                tx,
                &row("a/g", "a", 1, NodeKind::File, Some(&z), 6, "a/g", None),
            )?;
            upsert_node(tx, &row("b", "", 1, NodeKind::Directory, None, 5, "a", None))?;
            upsert_node(tx, &row("b/f", "b", 1, NodeKind::File, Some(&x), 5, "a/f", None))?;
            upsert_node(tx, &row("b/g", "b", 1, NodeKind::File, Some(&z), 5, "a/g", None))?;

            conflict::write_conflict(
                tx,
                WC_ID,
                &RelPath::from("a"),
                &ConflictSkeleton {
                    operation: OperationKind::Update,
                    local_change: LocalChange::MovedAway,
                    incoming_change: IncomingChange::Edit,
                    tree_conflicted: true,
                    old_version: ConflictVersion {
                        repos_root_url: "file:///repo".to_owned(),
                        repos_uuid: "uuid-1".to_owned(),
                        path_in_repos: "a".to_owned(),
                        peg_rev: 5,
                        node_kind: VersionNodeKind::Directory,
                    },
                    new_version: None,
                    original_version: None,
                },
            )
        })
        .unwrap();

    fs::create_dir_all(wc_dir.path().join("b")).unwrap();
    fs::write(wc_dir.path().join("b/f"), b"hello v1\n").unwrap();
    fs::write(wc_dir.path().join("b/g"), b"unchanged\n").unwrap();

    let mut notifications: Vec<Notification> = Vec::new();
    let work_items = update_moved_away_conflict_victim(
        &mut wc_root,
        &pristine,
        &RelPath::from("a"),
        &mut notifications,
        &NeverCancelled,
        7,
    )
    .unwrap();

    let update_notifs: Vec<_> = notifications
        .iter()
        .filter(|n| n.action == NotifyAction::UpdateUpdate)
        .collect();
    assert_eq!(update_notifs.len(), 1, "only the changed child is reported");
    assert_eq!(update_notifs[0].path, RelPath::from("b/f"));

    assert_eq!(
        work_items
            .iter()
            .filter(|item| matches!(item, tcmerge_lib::work_queue::WorkItem::InstallFile { .. }))
            .count(),
        1
    );

    let complete_notif = notifications
        .iter()
        .find(|n| n.action == NotifyAction::UpdateCompleted)
        .unwrap();
    assert_eq!(complete_notif.kind, None);
}

#[test]
fn victim_without_move_destination_fails() {
    let wc_dir = TempDir::new().unwrap();
    let pristine_dir = TempDir::new().unwrap();
    let pristine = PristineStore::open(pristine_dir.path()).unwrap();
    let mut wc_root = WCRoot::open(wc_dir.path(), WC_ID).unwrap();

    wc_root
        .with_transaction(|tx| {
            upsert_node(tx, &row("a", "", 0, NodeKind::Directory, None, 6, "a", None))?;
            conflict::write_conflict(
                tx,
                WC_ID,
                &RelPath::from("a"),
                &ConflictSkeleton {
                    operation: OperationKind::Update,
                    local_change: LocalChange::Edited,
                    incoming_change: IncomingChange::Edit,
                    tree_conflicted: true,
                    old_version: ConflictVersion {
                        repos_root_url: "file:///repo".to_owned(),
                        repos_uuid: "uuid-1".to_owned(),
                        path_in_repos: "a".to_owned(),
                        peg_rev: 5,
                        node_kind: VersionNodeKind::Directory,
                    },
                    new_version: None,
                    original_version: None,
                },
            )
        })
        .unwrap();

    let mut notifications: Vec<Notification> = Vec::new();
    let result = update_moved_away_conflict_victim(
        &mut wc_root,
        &pristine,
        &RelPath::from("a"),
        &mut notifications,
        &NeverCancelled,
        7,
    );
    assert_matches!(result, Err(CoreError::NotMovedAway(_)));
}

#[test]
fn victim_not_in_conflict_fails() {
    let wc_dir = TempDir::new().unwrap();
    let pristine_dir = TempDir::new().unwrap();
    let pristine = PristineStore::open(pristine_dir.path()).unwrap();
    let mut wc_root = WCRoot::open(wc_dir.path(), WC_ID).unwrap();

    wc_root
        .with_transaction(|tx| {
            upsert_node(tx, &row("a", "", 0, NodeKind::Directory, None, 6, "a", Some("b")))
        })
        .unwrap();

    let mut notifications: Vec<Notification> = Vec::new();
    let result = update_moved_away_conflict_victim(
        &mut wc_root,
        &pristine,
        &RelPath::from("a"),
        &mut notifications,
        &NeverCancelled,
        7,
    );
    assert_matches!(result, Err(CoreError::NotInConflict(_)));
}
