//! Parser for per-function textual CFG files.
//!
//! The upstream build collaborator compiles each source revision to IR and
//! emits one graph description per function (`{target}/{commit}/{fn}.cfg`).
//! Node statements carry a record label `ssa-id | instruction-lines |
//! [successor hints]` with `\l` line breaks; edge statements may name the
//! outgoing branch with a `:<branchlabel>` suffix on the source identity.
//! This module turns one such file into a [`Cfg`] with levels assigned.

use crate::graph::{Cfg, Vertex};
use crate::result::{Error, Result};
use std::fs;
use std::path::Path;

/// Reads and parses one CFG file.
pub fn load_cfg(path: &Path) -> Result<Cfg> {
    let text = fs::read_to_string(path).map_err(|source| Error::FileRead {
        path: path.display().to_string(),
        source,
    })?;
    parse_cfg(&text)
}

/// Parses a CFG description into a graph with levels assigned.
///
/// Fails with a format error when a node identity carries more than one
/// `:` separator, when the graph has no vertices, or when it does not have
/// exactly one in-degree-zero entry vertex.
pub fn parse_cfg(text: &str) -> Result<Cfg> {
    let mut cfg = Cfg::new();
    let mut edges: Vec<(usize, String)> = Vec::new();

    for (line_no, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty()
            || line.starts_with("digraph")
            || line.starts_with("//")
            || line == "}"
        {
            continue;
        }

        // Edge statements are deferred until every node is known; the
        // emitter does not guarantee declaration order.
        if line.contains("->") {
            edges.push((line_no, line.to_string()));
            continue;
        }

        if line.contains("label=") {
            parse_node(&mut cfg, line_no, line)?;
            continue;
        }

        tracing::debug!("skipping unrecognized cfg statement at line {line_no}: {line}");
    }

    if cfg.vertex_count() == 0 {
        return Err(Error::EmptyGraph);
    }

    for (line_no, line) in edges {
        parse_edge(&mut cfg, line_no, &line)?;
    }

    cfg.assign_levels()?;
    Ok(cfg)
}

/// Parses one node statement: `NodeXXX [... label="{...}"];`.
fn parse_node(cfg: &mut Cfg, line_no: usize, line: &str) -> Result<()> {
    let name = line
        .split(['[', ' ', '\t'])
        .next()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| parse_error(line_no, "missing node identity", line))?;
    if name.contains(':') {
        return Err(Error::MalformedNodeId(name.to_string()));
    }

    let label = extract_label(line)
        .ok_or_else(|| parse_error(line_no, "missing label attribute", line))?;
    let label = preprocess_label(&label);

    let mut fields = label.splitn(3, '|');
    let ssa_field = fields
        .next()
        .ok_or_else(|| parse_error(line_no, "empty record label", line))?;
    let ssa_id: i64 = ssa_field
        .trim()
        .trim_matches(|c| c == ':' || c == '%')
        .parse()
        .map_err(|_| parse_error(line_no, "invalid ssa id", ssa_field.trim()))?;

    let instructions = fields
        .next()
        .map(collect_instructions)
        .unwrap_or_default();
    // The optional third field holds successor hints; edges come from the
    // explicit edge statements, so the hints are not consulted.

    cfg.add_vertex(Vertex::new(name, ssa_id, instructions))?;
    Ok(())
}

/// Extracts the quoted label attribute value.
fn extract_label(line: &str) -> Option<String> {
    let start = line.find("label=\"")? + "label=\"".len();
    let end = line[start..].rfind('"')? + start;
    Some(line[start..end].to_string())
}

/// Unescapes record-label syntax: `\l` line breaks become newlines and the
/// record braces and quotes are dropped.
fn preprocess_label(label: &str) -> String {
    label
        .replace("\\l...", "")
        .replace("\\l", "\n")
        .replace(['{', '}', '"'], "")
}

/// Splits the instruction field into instruction lines, re-joining bracketed
/// multi-line continuations.
///
/// A line ending in `[` opens a continuation that accumulates until a line
/// ending in `]` that does not contain the token `phi`; phi instructions
/// legitimately close operand brackets mid-list and must stay inside the
/// accumulator.
fn collect_instructions(field: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut acc = String::new();
    let mut inside = false;

    for line in field.lines() {
        if line.ends_with('[') {
            inside = true;
            acc.clear();
        } else if line.ends_with(']') && !line.contains("phi") {
            inside = false;
            acc.push_str(line);
            let joined = acc.trim().to_string();
            if !joined.is_empty() {
                out.push(joined);
            }
            acc.clear();
            continue;
        }

        if inside {
            acc.push_str(line);
            acc.push('\n');
        } else {
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                out.push(trimmed.to_string());
            }
        }
    }
    out
}

/// Parses one edge statement: `NodeA[:branchlabel] -> NodeB;`.
fn parse_edge(cfg: &mut Cfg, line_no: usize, line: &str) -> Result<()> {
    let stmt = line.trim_end_matches(';');
    let (src_raw, dst_raw) = stmt
        .split_once("->")
        .ok_or_else(|| parse_error(line_no, "malformed edge statement", line))?;
    let src_raw = src_raw.trim();
    let dst_raw = dst_raw
        .trim()
        .split([' ', '['])
        .next()
        .unwrap_or_default();

    let mut src_parts = src_raw.split(':');
    let src = src_parts
        .next()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| parse_error(line_no, "missing edge source", line))?;
    let label = src_parts.next().map(str::to_string);
    if src_parts.next().is_some() {
        return Err(Error::MalformedNodeId(src_raw.to_string()));
    }
    if dst_raw.contains(':') {
        return Err(Error::MalformedNodeId(dst_raw.to_string()));
    }
    if dst_raw.is_empty() {
        return Err(parse_error(line_no, "missing edge destination", line));
    }

    cfg.add_edge(src, dst_raw, label)
}

fn parse_error(line: usize, msg: &str, raw: &str) -> Error {
    Error::ParseError {
        line,
        msg: msg.to_string(),
        raw: raw.to_string(),
    }
}
