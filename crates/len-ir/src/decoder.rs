//! Decoding of source text into program slots.
//!
//! Only the length of each line matters. Decoding never fails: any text
//! yields a program, the empty program for empty text.

use crate::program::{InstructionSet, Program};
use serde::Serialize;
use tracing::debug;

/// Result of decoding one source text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Decoded {
    pub program: Program,
    pub instruction_set: InstructionSet,
}

/// Decode source text into its program and the set of slot values in use.
///
/// A line ends at `\r\n`, `\r` or `\n`. A leading byte order mark is not
/// part of the first line. Length is counted in `char`s.
pub fn decode(source: &str) -> Decoded {
    let source = source.strip_prefix(BYTE_ORDER_MARK).unwrap_or(source);
    let mut slots = Vec::new();
    let mut instruction_set = InstructionSet::new();

    for line in split_lines(source) {
        let length = line_length(line);
        slots.push(length);
        instruction_set.insert(length);
    }

    debug!(
        slots = slots.len(),
        distinct = instruction_set.len(),
        "Decoded program"
    );

    Decoded {
        program: Program::from_slots(slots),
        instruction_set,
    }
}

/// Decode raw file contents, replacing invalid UTF-8 sequences
pub fn decode_bytes(bytes: &[u8]) -> Decoded {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    decode(&String::from_utf8_lossy(bytes))
}

const BYTE_ORDER_MARK: char = '\u{FEFF}';

/// Split on `\r\n`, `\r` and `\n`. A final terminator does not start
/// another line.
fn split_lines(source: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut rest = source;

    while !rest.is_empty() {
        let end = rest
            .find(|c: char| c == '\r' || c == '\n')
            .unwrap_or(rest.len());
        lines.push(&rest[..end]);
        rest = &rest[end..];
        rest = match rest.strip_prefix("\r\n") {
            Some(after) => after,
            // Both terminators are one byte wide
            None if !rest.is_empty() => &rest[1..],
            None => rest,
        };
    }

    lines
}

fn line_length(line: &str) -> i32 {
    i32::try_from(line.chars().count()).unwrap_or(i32::MAX)
}
