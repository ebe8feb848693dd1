//! Wavefront OBJ line parser.
//!
//! Turns OBJ text into a stream of [`Record`]s; the geometry core consumes
//! those records and never sees the text format. Only the subset the renderer
//! cares about is understood (`o`, `v`, `vn`, `f`); comments and everything
//! else (`vt`, `s`, `mtllib`, ...) are skipped.

use std::fs;
use std::path::Path;

use crate::error::{Result, TraceError};

/// One `v//n` (or `v/t/n`) tuple of a face record. Indices are raw OBJ
/// indices: 1-based, negative means relative to the end of the list declared
/// so far. Texture indices are carried but never used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceIndex {
    pub vertex: i64,
    pub texture: Option<i64>,
    pub normal: i64,
}

/// A parsed OBJ statement, in file order.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Name(String),
    Vertex(f64, f64, f64),
    Normal(f64, f64, f64),
    Face(Vec<FaceIndex>),
}

pub fn load_path<P: AsRef<Path>>(path: P) -> Result<Vec<Record>> {
    let text = fs::read_to_string(path)?;
    parse_str(&text)
}

pub fn parse_str(input: &str) -> Result<Vec<Record>> {
    let mut records = Vec::new();
    for (idx, raw) in input.lines().enumerate() {
        let line = idx + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let mut tokens = trimmed.split_whitespace();
        // First token decides the record kind; split_whitespace guarantees
        // at least one token after the empty check above.
        let keyword = tokens.next().unwrap_or_default();
        match keyword {
            "o" => {
                // A bare `o` line is legal; the name is simply empty, which
                // is what an unnamed mesh exports as.
                let name = tokens.next().unwrap_or_default();
                records.push(Record::Name(name.to_string()));
            }
            "v" => {
                let (x, y, z) = parse_triplet(&mut tokens, line)?;
                records.push(Record::Vertex(x, y, z));
            }
            "vn" => {
                let (x, y, z) = parse_triplet(&mut tokens, line)?;
                records.push(Record::Normal(x, y, z));
            }
            "f" => {
                let mut indices = Vec::new();
                for tok in tokens {
                    indices.push(parse_face_index(tok, line)?);
                }
                records.push(Record::Face(indices));
            }
            _ => {
                log::trace!("line {line}: skipping '{keyword}' record");
            }
        }
    }
    Ok(records)
}

fn parse_err(line: usize, msg: impl Into<String>) -> TraceError {
    TraceError::Parse {
        line,
        msg: msg.into(),
    }
}

fn parse_triplet<'a, I>(tokens: &mut I, line: usize) -> Result<(f64, f64, f64)>
where
    I: Iterator<Item = &'a str>,
{
    let mut next = || -> Result<f64> {
        let tok = tokens
            .next()
            .ok_or_else(|| parse_err(line, "expected three coordinates"))?;
        tok.parse()
            .map_err(|_| parse_err(line, format!("bad coordinate '{tok}'")))
    };
    Ok((next()?, next()?, next()?))
}

/// Parses one `v`, `v/t`, `v//n` or `v/t/n` face tuple. The renderer needs a
/// normal per face, so a tuple without one is rejected here rather than
/// surfacing later as a meaningless zero normal.
fn parse_face_index(tok: &str, line: usize) -> Result<FaceIndex> {
    let mut parts = tok.split('/');
    let vertex = parts
        .next()
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| parse_err(line, format!("bad face tuple '{tok}'")))?;
    let texture = match parts.next() {
        None | Some("") => None,
        Some(s) => Some(
            s.parse()
                .map_err(|_| parse_err(line, format!("bad texture index in '{tok}'")))?,
        ),
    };
    let normal = parts
        .next()
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| parse_err(line, format!("face tuple '{tok}' has no normal index")))?;
    Ok(FaceIndex {
        vertex,
        texture,
        normal,
    })
}
