//! Matching profile blocks against a declaration's extent.

use crate::model::Lines;
use crate::profile::Block;
use crate::syntax::Span;

/// Build the line ledger for a declaration spanning `span` from the file's
/// blocks, which must be sorted by start position.
///
/// A block that starts at or after the declaration's end stops the scan; one
/// that ends at or before its start is skipped. Every other block contributes
/// its whole line range, even if it only partially overlaps. A line touched
/// by several blocks keeps the lowest count among them.
pub fn attribute(span: Span, blocks: &[Block]) -> Lines {
    let mut overlapping: Vec<&Block> = Vec::new();
    for block in blocks {
        if block.start >= span.end {
            break;
        }
        if block.end <= span.start {
            continue;
        }
        overlapping.push(block);
    }

    // Walk lines in increasing order so the ledger only ever merges into its
    // last entry, even when consecutive blocks share more than one line.
    let mut lines = Lines::new();
    let mut active: Vec<&Block> = Vec::new();
    let mut next = 0;
    let mut line = 0u32;
    loop {
        if active.is_empty() {
            let Some(block) = overlapping.get(next) else {
                break;
            };
            line = line.max(block.start.line);
        }
        while let Some(&block) = overlapping.get(next) {
            if block.start.line > line {
                break;
            }
            active.push(block);
            next += 1;
        }

        active.retain(|b| b.end.line >= line);
        for block in &active {
            lines.record_or_merge(line, block.count);
        }

        let Some(following) = line.checked_add(1) else {
            break;
        };
        line = following;
        active.retain(|b| b.end.line >= line);
    }

    lines
}
