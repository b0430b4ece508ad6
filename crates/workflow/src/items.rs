// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Splitting the item list of a `for` statement.

/// Split a `for … in <items>` string on whitespace, keeping `{{…}}`
/// spans intact as single items even when they contain spaces.
///
/// A `{{…}}` span always forms its own item: literal text glued to a
/// brace span is cut off into a separate item. An unterminated `{{`
/// swallows the rest of the string.
pub(crate) fn split_for_items(data: &str) -> Vec<String> {
    let mut result = Vec::new();
    let mut pos = 0;

    loop {
        let rest = &data[pos..];
        let space = whitespace_run(rest);
        let script = rest.find("{{");

        match (space, script) {
            (None, None) => break,
            (Some((start, end)), _) if start == 0 => {
                pos += end;
            }
            (Some((start, end)), script) if script.map_or(true, |s| start < s) => {
                result.push(rest[..start].to_string());
                pos += end;
            }
            (_, Some(script_start)) => {
                if script_start > 0 {
                    result.push(rest[..script_start].to_string());
                    pos += script_start;
                }
                let rest = &data[pos..];
                match rest.find("}}") {
                    Some(end) => {
                        result.push(rest[..end + 2].to_string());
                        pos += end + 2;
                    }
                    None => {
                        result.push(rest.to_string());
                        pos = data.len();
                        break;
                    }
                }
            }
            _ => break,
        }
    }

    if pos != data.len() {
        result.push(data[pos..].to_string());
    }
    result
}

/// Byte range of the first whitespace run, if any.
fn whitespace_run(data: &str) -> Option<(usize, usize)> {
    let start = data.find(|ch: char| ch.is_whitespace())?;
    let end = data[start..]
        .find(|ch: char| !ch.is_whitespace())
        .map_or(data.len(), |len| start + len);
    Some((start, end))
}

#[cfg(test)]
#[path = "items_tests.rs"]
mod tests;
