/// Reader for Go's `-coverprofile` format.
///
/// Reference: https://go.dev/blog/cover
///
/// Format:
///   mode: set|count|atomic
///   <file>:<startLine>.<startCol>,<endLine>.<endCol> <numStatements> <count>
///
/// Each line describes a basic block and how many times it executed. Unlike
/// a per-line view, the blocks are kept intact with their columns so they can
/// be matched against declaration extents later.
use std::collections::HashMap;
use std::io::BufRead;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{GoberturaError, Result};
use crate::syntax::Position;

static BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.+):([0-9]+)\.([0-9]+),([0-9]+)\.([0-9]+) ([0-9]+) ([0-9]+)$").unwrap()
});

/// Counter mode the profile was recorded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Set,
    Count,
    Atomic,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Set => "set",
            Mode::Count => "count",
            Mode::Atomic => "atomic",
        }
    }
}

impl FromStr for Mode {
    type Err = GoberturaError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "set" => Ok(Mode::Set),
            "count" => Ok(Mode::Count),
            "atomic" => Ok(Mode::Atomic),
            _ => Err(GoberturaError::Profile(format!("unknown mode: '{}'", s))),
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One basic block from the profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    pub start: Position,
    pub end: Position,
    pub num_stmt: u32,
    pub count: u64,
}

/// All blocks recorded for one source file, sorted by start position.
#[derive(Debug, Clone)]
pub struct Profile {
    pub file_name: String,
    pub mode: Mode,
    pub blocks: Vec<Block>,
}

/// Parse a coverage profile from raw bytes.
pub fn parse(input: &[u8]) -> Result<Vec<Profile>> {
    parse_reader(&mut &*input)
}

/// Parse a single block line, returning (file_name, Block).
fn parse_block_line(line: &str) -> Option<(&str, Block)> {
    let caps = BLOCK_RE.captures(line)?;
    let num = |i: usize| caps.get(i).map(|m| m.as_str());

    let start = Position::new(num(2)?.parse().ok()?, num(3)?.parse().ok()?);
    let end = Position::new(num(4)?.parse().ok()?, num(5)?.parse().ok()?);

    Some((
        caps.get(1)?.as_str(),
        Block {
            start,
            end,
            num_stmt: num(6)?.parse().ok()?,
            count: num(7)?.parse().ok()?,
        },
    ))
}

/// Parse profile lines from a reader. Profiles come back sorted by file
/// name, each with its blocks sorted and duplicates merged.
pub fn parse_reader(reader: &mut dyn BufRead) -> Result<Vec<Profile>> {
    let mut mode: Option<Mode> = None;
    let mut files: HashMap<String, Vec<Block>> = HashMap::new();

    let mut raw_line = String::new();
    let mut line_no = 0usize;
    loop {
        raw_line.clear();
        let n = reader.read_line(&mut raw_line).map_err(|e| {
            GoberturaError::Profile(format!("line {}: {}", line_no + 1, e))
        })?;
        if n == 0 {
            break;
        }
        line_no += 1;

        let line = raw_line.trim_end_matches(['\n', '\r']);
        if line.trim().is_empty() {
            continue;
        }

        if let Some(rest) = line.strip_prefix("mode: ") {
            let this: Mode = rest.trim().parse().map_err(|_| {
                GoberturaError::Profile(format!("line {}: bad mode line: {}", line_no, line))
            })?;
            match mode {
                None => mode = Some(this),
                Some(prev) if prev == this => {}
                Some(prev) => {
                    return Err(GoberturaError::Profile(format!(
                        "line {}: inconsistent mode '{}', profile started as '{}'",
                        line_no, this, prev
                    )))
                }
            }
            continue;
        }

        if mode.is_none() {
            return Err(GoberturaError::Profile(format!(
                "line {}: bad mode line: {}",
                line_no, line
            )));
        }
        let (file, block) = parse_block_line(line).ok_or_else(|| {
            GoberturaError::Profile(format!(
                "line {}: {:?} doesn't match expected format",
                line_no, line
            ))
        })?;
        files.entry(file.to_string()).or_default().push(block);
    }

    let Some(mode) = mode else {
        return Ok(Vec::new());
    };

    let mut profiles = files
        .into_iter()
        .map(|(file_name, blocks)| {
            let blocks = merge_blocks(&file_name, mode, blocks)?;
            Ok(Profile {
                file_name,
                mode,
                blocks,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    profiles.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    Ok(profiles)
}

/// Sort blocks by start position and fold blocks that cover exactly the same
/// range. In `set` mode a merged block counts as hit if either was hit;
/// otherwise the counts add up.
fn merge_blocks(file_name: &str, mode: Mode, mut blocks: Vec<Block>) -> Result<Vec<Block>> {
    blocks.sort_by_key(|b| (b.start, b.end));

    let mut merged: Vec<Block> = Vec::with_capacity(blocks.len());
    for block in blocks {
        if let Some(last) = merged.last_mut() {
            if last.start == block.start && last.end == block.end {
                if last.num_stmt != block.num_stmt {
                    return Err(GoberturaError::Profile(format!(
                        "inconsistent NumStmt in {} at {}: changed from {} to {}",
                        file_name, block.start, last.num_stmt, block.num_stmt
                    )));
                }
                last.count = match mode {
                    Mode::Set => u64::from(last.count != 0 || block.count != 0),
                    Mode::Count | Mode::Atomic => last.count.saturating_add(block.count),
                };
                continue;
            }
        }
        merged.push(block);
    }
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_profile() {
        let input = include_bytes!("../tests/fixtures/coverprofile.txt");
        let profiles = parse(input).unwrap();

        assert_eq!(profiles.len(), 3);
        assert_eq!(profiles[0].file_name, "example.com/shapes/geom/circle.go");
        assert_eq!(profiles[1].file_name, "example.com/shapes/geom/square.go");
        assert_eq!(profiles[2].file_name, "example.com/shapes/main.go");
        assert!(profiles.iter().all(|p| p.mode == Mode::Count));
    }

    #[test]
    fn test_blocks_sorted_by_start() {
        let input = b"mode: count\n\
            example.com/pkg/f.go:9.2,10.3 1 0\n\
            example.com/pkg/f.go:3.14,5.2 2 4\n\
            example.com/pkg/f.go:5.2,7.3 1 1\n";
        let profiles = parse(input).unwrap();
        let starts: Vec<Position> = profiles[0].blocks.iter().map(|b| b.start).collect();
        assert_eq!(
            starts,
            vec![Position::new(3, 14), Position::new(5, 2), Position::new(9, 2)]
        );
    }

    #[test]
    fn test_duplicate_blocks_sum_in_count_mode() {
        let input = b"mode: count\n\
            example.com/pkg/f.go:3.14,5.2 2 4\n\
            example.com/pkg/f.go:3.14,5.2 2 3\n";
        let profiles = parse(input).unwrap();
        assert_eq!(profiles[0].blocks.len(), 1);
        assert_eq!(profiles[0].blocks[0].count, 7);
    }

    #[test]
    fn test_duplicate_blocks_or_in_set_mode() {
        let input = b"mode: set\n\
            example.com/pkg/f.go:3.14,5.2 2 0\n\
            example.com/pkg/f.go:3.14,5.2 2 1\n\
            example.com/pkg/f.go:6.1,7.2 1 0\n\
            example.com/pkg/f.go:6.1,7.2 1 0\n";
        let profiles = parse(input).unwrap();
        let counts: Vec<u64> = profiles[0].blocks.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![1, 0]);
    }

    #[test]
    fn test_inconsistent_num_stmt_fails() {
        let input = b"mode: count\n\
            example.com/pkg/f.go:3.14,5.2 2 4\n\
            example.com/pkg/f.go:3.14,5.2 3 4\n";
        let err = parse(input).unwrap_err();
        assert!(err.to_string().contains("inconsistent NumStmt"), "{}", err);
    }

    #[test]
    fn test_missing_mode_line_fails() {
        let input = b"example.com/pkg/f.go:1.1,5.10 2 3\n";
        let err = parse(input).unwrap_err();
        assert!(err.to_string().contains("bad mode line"), "{}", err);
    }

    #[test]
    fn test_malformed_block_line_fails() {
        let input = b"mode: set\nexample.com/pkg/f.go:1.1 2 3\n";
        let err = parse(input).unwrap_err();
        assert!(err.to_string().contains("line 2"), "{}", err);
    }

    #[test]
    fn test_concatenated_profiles_share_mode() {
        let input = b"mode: atomic\n\
            example.com/pkg/a.go:1.1,2.2 1 1\n\
            mode: atomic\n\
            example.com/pkg/b.go:1.1,2.2 1 0\n";
        let profiles = parse(input).unwrap();
        assert_eq!(profiles.len(), 2);

        let mixed = b"mode: atomic\nmode: set\n";
        assert!(parse(mixed).is_err());
    }

    #[test]
    fn test_empty_profile() {
        assert!(parse(b"").unwrap().is_empty());
        assert!(parse(b"mode: set\n").unwrap().is_empty());
    }

    #[test]
    fn test_parse_block_line() {
        let (file, block) =
            parse_block_line("github.com/user/repo/file.go:10.1,20.5 3 1").unwrap();
        assert_eq!(file, "github.com/user/repo/file.go");
        assert_eq!(block.start, Position::new(10, 1));
        assert_eq!(block.end, Position::new(20, 5));
        assert_eq!(block.num_stmt, 3);
        assert_eq!(block.count, 1);
    }
}
