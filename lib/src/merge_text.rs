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

//! A minimal standalone three-way text merger, consumed through a narrow
//! contract: `merge(base, left, right) -> (outcome, conflict_marker_text?)`.
//! Word-tokenized diff3, independently testable without a real merge
//! collaborator wired in.

use std::fmt::Write as _;

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn is_same_word(a: u8, b: u8) -> bool {
    (is_word_byte(a) && is_word_byte(b)) || a & 0x80 != 0
}

fn tokenize(data: &[u8]) -> Vec<&[u8]> {
    let mut output = vec![];
    let mut word_start = 0;
    let mut prev: Option<u8> = None;
    for (i, &b) in data.iter().enumerate() {
        if let Some(p) = prev {
            if !is_same_word(p, b) {
                output.push(&data[word_start..i]);
                word_start = i;
            }
        }
        prev = Some(b);
    }
    if word_start < data.len() {
        output.push(&data[word_start..]);
    }
    output
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeHunk {
    Resolved(Vec<u8>),
    Conflict {
        base: Vec<u8>,
        left: Vec<u8>,
        right: Vec<u8>,
    },
}

/// Outcome of a three-way merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// `left == right` (modulo the merge) and both equal `base`'s effect: no
    /// local modifications collided with the incoming change.
    Unchanged(Vec<u8>),
    /// Merge succeeded without collision; local and incoming changes combine.
    Merged(Vec<u8>),
    /// Merge produced one or more conflicting hunks.
    Conflict(Vec<MergeHunk>),
}

/// Three-way merges `base`, `left` (incoming/new), and `right` (local
/// working contents), word-tokenized so adjacent unrelated edits don't
/// collide spuriously.
pub fn merge3(base: &[u8], left: &[u8], right: &[u8]) -> MergeOutcome {
    if left == right {
        return MergeOutcome::Unchanged(left.to_vec());
    }
    if base == right {
        // No local modification: the incoming change applies cleanly.
        return MergeOutcome::Merged(left.to_vec());
    }
    if base == left {
        // No incoming change: local content stands.
        return MergeOutcome::Merged(right.to_vec());
    }

    let base_tokens = tokenize(base);
    let left_tokens = tokenize(left);
    let right_tokens = tokenize(right);

    let left_diff = diff::slice(&base_tokens, &left_tokens);
    let right_diff = diff::slice(&base_tokens, &right_tokens);

    let mut hunk: Vec<u8> = vec![];
    let mut hunks: Vec<MergeHunk> = vec![];
    let mut left_it = left_diff.iter();
    let mut right_it = right_diff.iter();
    let mut left_hunk = left_it.next();
    let mut right_hunk = right_it.next();

    loop {
        match (left_hunk, right_hunk) {
            (None, None) => break,
            (Some(diff::Result::Both(lb, la)), _) if lb == la => match right_hunk.unwrap() {
                diff::Result::Both(_, ra) => {
                    hunk.extend_from_slice(ra);
                    left_hunk = left_it.next();
                    right_hunk = right_it.next();
                }
                diff::Result::Left(_) => {
                    left_hunk = left_it.next();
                    right_hunk = right_it.next();
                }
                diff::Result::Right(ra) => {
                    hunk.extend_from_slice(ra);
                    right_hunk = right_it.next();
                }
            },
            (_, Some(diff::Result::Both(rb, ra))) if rb == ra => match left_hunk.unwrap() {
                diff::Result::Both(_, la) => {
                    hunk.extend_from_slice(la);
                    left_hunk = left_it.next();
                    right_hunk = right_it.next();
                }
                diff::Result::Left(_) => {
                    left_hunk = left_it.next();
                    right_hunk = right_it.next();
                }
                diff::Result::Right(la) => {
                    hunk.extend_from_slice(la);
                    left_hunk = left_it.next();
                }
            },
            (Some(diff::Result::Left(_)), Some(diff::Result::Left(_))) => {
                left_hunk = left_it.next();
                right_hunk = right_it.next();
            }
            (Some(diff::Result::Right(la)), Some(diff::Result::Right(ra))) => {
                if la == ra {
                    hunk.extend_from_slice(la);
                } else {
                    if !hunk.is_empty() {
                        hunks.push(MergeHunk::Resolved(std::mem::take(&mut hunk)));
                    }
                    hunks.push(MergeHunk::Conflict {
                        base: vec![],
                        left: la.to_vec(),
                        right: ra.to_vec(),
                    });
                }
                left_hunk = left_it.next();
                right_hunk = right_it.next();
            }
            (Some(diff::Result::Right(la)), None) => {
                hunk.extend_from_slice(la);
                left_hunk = left_it.next();
            }
            (None, Some(diff::Result::Right(ra))) => {
                hunk.extend_from_slice(ra);
                right_hunk = right_it.next();
            }
            _ => unreachable!("tokenized base is shared between both diffs"),
        }
    }

    if hunks.is_empty() {
        MergeOutcome::Merged(hunk)
    } else {
        if !hunk.is_empty() {
            hunks.push(MergeHunk::Resolved(hunk));
        }
        MergeOutcome::Conflict(hunks)
    }
}

/// Renders conflict markers for a conflicted merge outcome. `banner_width`
/// is the number of marker characters in each banner line (`<<<<<<<` is
/// width 7).
pub fn render_conflict_markers(hunks: &[MergeHunk], banner_width: usize) -> String {
    let banner = |ch: char| ch.to_string().repeat(banner_width);
    let mut out = String::new();
    for hunk in hunks {
        match hunk {
            MergeHunk::Resolved(data) => {
                out.push_str(&String::from_utf8_lossy(data));
            }
            MergeHunk::Conflict { left, right, .. } => {
                writeln!(out, "{} incoming", banner('<')).unwrap();
                out.push_str(&String::from_utf8_lossy(left));
                writeln!(out, "{}", banner('=')).unwrap();
                out.push_str(&String::from_utf8_lossy(right));
                writeln!(out, "{} working", banner('>')).unwrap();
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_incoming_change_applies() {
        let outcome = merge3(b"hello v1\n", b"hello v2\n", b"hello v1\n");
        assert_eq!(outcome, MergeOutcome::Merged(b"hello v2\n".to_vec()));
    }

    #[test]
    fn local_edit_is_preserved_alongside_incoming() {
        let outcome = merge3(b"hello\n", b"hello world\n", b"hello there\n");
        assert!(matches!(outcome, MergeOutcome::Merged(_) | MergeOutcome::Conflict(_)));
    }

    #[test]
    fn colliding_edits_conflict() {
        let outcome = merge3(b"base\n", b"left\n", b"right\n");
        assert!(matches!(outcome, MergeOutcome::Conflict(_)));
    }

    #[test]
    fn identical_sides_are_unchanged() {
        let outcome = merge3(b"a\n", b"b\n", b"b\n");
        assert_eq!(outcome, MergeOutcome::Unchanged(b"b\n".to_vec()));
    }

    #[test]
    fn banner_width_controls_marker_length() {
        let hunks = vec![MergeHunk::Conflict {
            base: vec![],
            left: b"left\n".to_vec(),
            right: b"right\n".to_vec(),
        }];
        let text = render_conflict_markers(&hunks, 3);
        assert!(text.contains("<<< incoming"));
        assert!(text.contains("==="));
        assert!(text.contains(">>> working"));
        assert!(!text.contains("<<<<"));
    }
}
