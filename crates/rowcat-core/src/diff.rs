#![forbid(unsafe_code)]

//! Composition diff engine: minimal update scripts for single-section swaps.
//!
//! Exactly one section changes per update; every other section is
//! byte-for-byte identical, only shifted by the changed section's size
//! delta. That closed form is what keeps this cheap: positions before the
//! section map as `new == old`, positions after it as
//! `new == old - old_section_len + new_section_len`, and neither side is
//! ever searched. The real work is a longest-common-subsequence diff over
//! the changed section's *local* range only, O(old·new) in the section
//! sizes after common prefix/suffix trimming, never in the flattened sizes.
//!
//! # Script semantics
//! Applying the emitted operations to the old flattened sequence *in
//! emission order* reproduces the new flattened sequence exactly;
//! [`apply_script`] is the reference applier the property tests check
//! against. `Change` carries the *old* item as payload so consumers can
//! partially re-bind instead of rebuilding. `Move` is part of the renderer
//! vocabulary but this engine never emits it; matched items keep their
//! relative order.
//!
//! Diffing is a total function: empty-old, empty-new, and full replacement
//! are ordinary inputs, not edge cases.

use crate::item::ItemModel;
use crate::seekable::Seekable;

/// One range operation against the flattened sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListOp<M> {
    Insert {
        position: usize,
        count: usize,
    },
    Remove {
        position: usize,
        count: usize,
    },
    /// The item at `position` kept its identity but changed content;
    /// `payload` is the old item.
    Change {
        position: usize,
        count: usize,
        payload: M,
    },
    Move {
        from: usize,
        to: usize,
    },
}

/// Sink for a renderer's visible-range bookkeeping.
pub trait UpdateSink<M> {
    fn on_inserted(&mut self, position: usize, count: usize);
    fn on_removed(&mut self, position: usize, count: usize);
    fn on_changed(&mut self, position: usize, count: usize, payload: &M);
    fn on_moved(&mut self, from: usize, to: usize);
}

/// Forward a script to an [`UpdateSink`], preserving order.
pub fn dispatch_script<M>(script: &[ListOp<M>], sink: &mut dyn UpdateSink<M>) {
    for op in script {
        match op {
            ListOp::Insert { position, count } => sink.on_inserted(*position, *count),
            ListOp::Remove { position, count } => sink.on_removed(*position, *count),
            ListOp::Change {
                position,
                count,
                payload,
            } => sink.on_changed(*position, *count, payload),
            ListOp::Move { from, to } => sink.on_moved(*from, *to),
        }
    }
}

/// Diff one changed section against the flattened sequence.
///
/// `offset` is the flat position of the section's first item; `old_total`
/// and `new_total` are the flattened sizes before and after. Items outside
/// `[offset, offset + old.len())` are the other sections and must be
/// unchanged apart from the shift; that invariant is the caller's to uphold
/// (the registry does).
pub fn diff_section<M: ItemModel>(
    offset: usize,
    old: &dyn Seekable<M>,
    new: &dyn Seekable<M>,
    old_total: usize,
    new_total: usize,
) -> Vec<ListOp<M>> {
    let old_len = old.len();
    let new_len = new.len();
    debug_assert!(old_total >= old_len && new_total >= new_len);
    debug_assert_eq!(
        old_total - old_len,
        new_total - new_len,
        "sections other than the changed one must keep their sizes"
    );

    let _span = tracing::trace_span!("diff", offset, old = old_len, new = new_len).entered();

    // Fully equal leading and trailing runs need no ops and no DP cells.
    let mut prefix = 0;
    while prefix < old_len && prefix < new_len {
        let a = old.get(prefix);
        let b = new.get(prefix);
        if a.same_item(&b) && a.same_content(&b) {
            prefix += 1;
        } else {
            break;
        }
    }
    let mut suffix = 0;
    while suffix < old_len - prefix && suffix < new_len - prefix {
        let a = old.get(old_len - 1 - suffix);
        let b = new.get(new_len - 1 - suffix);
        if a.same_item(&b) && a.same_content(&b) {
            suffix += 1;
        } else {
            break;
        }
    }

    let old_lo = prefix;
    let old_hi = old_len - suffix;
    let new_lo = prefix;
    let new_hi = new_len - suffix;

    let matches = lcs_matches(old, new, old_lo, old_hi, new_lo, new_hi);

    // Emit from the end toward the start so earlier (higher-position) ops
    // never disturb the positions of later (lower-position) ones.
    let mut script = Vec::new();
    let mut old_end = old_hi;
    let mut new_end = new_hi;
    for &(old_index, new_index) in &matches {
        push_gap(
            &mut script,
            offset + old_index + 1,
            old_end - (old_index + 1),
            new_end - (new_index + 1),
        );
        let before = old.get(old_index);
        if !before.same_content(&new.get(new_index)) {
            script.push(ListOp::Change {
                position: offset + old_index,
                count: 1,
                payload: before,
            });
        }
        old_end = old_index;
        new_end = new_index;
    }
    push_gap(
        &mut script,
        offset + old_lo,
        old_end - old_lo,
        new_end - new_lo,
    );
    script
}

/// Identity-matched pairs within the trimmed window, in *descending* local
/// index order, via the classic LCS dynamic program.
fn lcs_matches<M: ItemModel>(
    old: &dyn Seekable<M>,
    new: &dyn Seekable<M>,
    old_lo: usize,
    old_hi: usize,
    new_lo: usize,
    new_hi: usize,
) -> Vec<(usize, usize)> {
    let rows = old_hi - old_lo;
    let cols = new_hi - new_lo;
    if rows == 0 || cols == 0 {
        return Vec::new();
    }

    let stride = cols + 1;
    let mut table = vec![0u32; (rows + 1) * stride];
    for i in 1..=rows {
        let a = old.get(old_lo + i - 1);
        for j in 1..=cols {
            let b = new.get(new_lo + j - 1);
            table[i * stride + j] = if a.same_item(&b) {
                table[(i - 1) * stride + (j - 1)] + 1
            } else {
                table[(i - 1) * stride + j].max(table[i * stride + (j - 1)])
            };
        }
    }

    let mut matches = Vec::new();
    let mut i = rows;
    let mut j = cols;
    while i > 0 && j > 0 {
        let here = table[i * stride + j];
        let matched = old.get(old_lo + i - 1).same_item(&new.get(new_lo + j - 1))
            && here == table[(i - 1) * stride + (j - 1)] + 1;
        if matched {
            matches.push((old_lo + i - 1, new_lo + j - 1));
            i -= 1;
            j -= 1;
        } else if table[(i - 1) * stride + j] >= table[i * stride + (j - 1)] {
            i -= 1;
        } else {
            j -= 1;
        }
    }
    matches
}

fn push_gap<M>(script: &mut Vec<ListOp<M>>, position: usize, removed: usize, added: usize) {
    if removed > 0 {
        script.push(ListOp::Remove {
            position,
            count: removed,
        });
    }
    if added > 0 {
        script.push(ListOp::Insert {
            position,
            count: added,
        });
    }
}

/// Reference applier for the script semantics.
///
/// Slots touched by `Insert`/`Change` are rebound from the new flattened
/// sequence at their final positions, which is exactly what a virtualized
/// renderer does when it re-queries the adapter after applying updates.
pub fn apply_script<M: Clone>(old_flat: &[M], new_flat: &[M], script: &[ListOp<M>]) -> Vec<M> {
    enum Slot<M> {
        Kept(M),
        Rebind,
    }

    let mut shadow: Vec<Slot<M>> = old_flat.iter().cloned().map(Slot::Kept).collect();
    for op in script {
        match op {
            ListOp::Remove { position, count } => {
                shadow.drain(*position..*position + *count);
            }
            ListOp::Insert { position, count } => {
                for _ in 0..*count {
                    shadow.insert(*position, Slot::Rebind);
                }
            }
            ListOp::Change {
                position, count, ..
            } => {
                for slot in shadow.iter_mut().skip(*position).take(*count) {
                    *slot = Slot::Rebind;
                }
            }
            ListOp::Move { from, to } => {
                let slot = shadow.remove(*from);
                shadow.insert(*to, slot);
            }
        }
    }

    shadow
        .into_iter()
        .enumerate()
        .map(|(position, slot)| match slot {
            Slot::Kept(item) => item,
            Slot::Rebind => new_flat[position].clone(),
        })
        .collect()
}
