//! Re-indenting JSON without reinterpreting it.

use serde::de::IgnoredAny;
use std::iter::Peekable;

const INDENT: &[u8] = b"  ";

/// Re-indent a JSON document with two spaces per level.
///
/// Only whitespace outside strings changes: number text, escapes, key order
/// and duplicate keys come out exactly as received. `None` for invalid JSON.
pub fn indent(src: &[u8]) -> Option<Vec<u8>> {
    serde_json::from_slice::<IgnoredAny>(src).ok()?;

    let mut out = Vec::with_capacity(src.len() * 2);
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    let mut bytes = src.iter().copied().peekable();

    while let Some(b) = bytes.next() {
        if in_string {
            out.push(b);
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }

        match b {
            b' ' | b'\t' | b'\n' | b'\r' => {}
            b'"' => {
                in_string = true;
                out.push(b);
            }
            b'{' | b'[' => {
                out.push(b);
                skip_whitespace(&mut bytes);
                // Empty containers stay on one line.
                if matches!(bytes.peek(), Some(b'}' | b']')) {
                    out.extend(bytes.next());
                } else {
                    depth += 1;
                    newline(&mut out, depth);
                }
            }
            b'}' | b']' => {
                depth = depth.saturating_sub(1);
                newline(&mut out, depth);
                out.push(b);
            }
            b',' => {
                out.push(b);
                newline(&mut out, depth);
            }
            b':' => out.extend_from_slice(b": "),
            _ => out.push(b),
        }
    }

    Some(out)
}

fn skip_whitespace<I: Iterator<Item = u8>>(bytes: &mut Peekable<I>) {
    while matches!(bytes.peek(), Some(b' ' | b'\t' | b'\n' | b'\r')) {
        bytes.next();
    }
}

fn newline(out: &mut Vec<u8>, depth: usize) {
    out.push(b'\n');
    for _ in 0..depth {
        out.extend_from_slice(INDENT);
    }
}
