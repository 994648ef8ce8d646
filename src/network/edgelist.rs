//! Edge list import and export.
//!
//! One edge per line: two node labels separated by a comma and/or
//! whitespace. Blank lines and lines starting with `#` are skipped; columns
//! after the second (weights, timestamps) are ignored.

use std::collections::{HashMap, HashSet};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use super::Network;
use crate::task::{Interrupt, TaskContext, TaskResult};
use crate::Error;

/// Read an edge list from disk. Progress is measured in bytes.
pub fn read_edge_list(path: &Path, ctx: &mut TaskContext) -> TaskResult<Network> {
    let file = File::open(path)?;
    let len = file.metadata().map(|m| m.len()).unwrap_or(0);
    ctx.set_predicted(len as f64);
    parse_edge_list(BufReader::new(file), ctx)
}

/// Parse an edge list from any buffered reader.
pub fn parse_edge_list<R: BufRead>(reader: R, ctx: &mut TaskContext) -> TaskResult<Network> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut labels: Vec<String> = Vec::new();
    let mut edges: Vec<(usize, usize)> = Vec::new();

    for (line_no, line) in reader.lines().enumerate() {
        ctx.checkpoint()?;
        let line = line?;
        ctx.advance(line.len() as u64 + 1);

        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let mut tokens = trimmed
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty());
        let (Some(a), Some(b)) = (tokens.next(), tokens.next()) else {
            return Err(Error::EdgeListParse {
                line: line_no + 1,
                reason: format!("expected two node labels, found {trimmed:?}"),
            }
            .into());
        };

        let mut node = |label: &str| -> usize {
            *index.entry(label.to_string()).or_insert_with(|| {
                labels.push(label.to_string());
                labels.len() - 1
            })
        };
        let a = node(a);
        let b = node(b);
        edges.push((a, b));
    }

    let mut network = Network::with_labels(labels);
    let mut seen = HashSet::with_capacity(edges.len());
    for (a, b) in edges {
        network.insert_edge(a, b, &mut seen);
    }
    Ok(network)
}

/// Write the network as `label,label` lines.
///
/// Output goes to a sibling temporary file that is renamed into place once
/// every edge is written, so a cancelled or failed export never leaves a
/// truncated file at `path`. Returns the number of edges written.
pub fn write_edge_list(network: &Network, path: &Path, ctx: &mut TaskContext) -> TaskResult<usize> {
    let tmp = temp_path(path);
    let result = write_to(network, &tmp, ctx);
    match result {
        Ok(edges) => {
            fs::rename(&tmp, path)?;
            Ok(edges)
        }
        Err(interrupt) => {
            let _ = fs::remove_file(&tmp);
            Err(interrupt)
        }
    }
}

fn write_to(network: &Network, path: &Path, ctx: &mut TaskContext) -> TaskResult<usize> {
    ctx.set_predicted(network.edge_count() as f64);
    let mut out = BufWriter::new(File::create(path)?);
    let mut written = 0;
    for (a, b) in network.edges() {
        ctx.checkpoint()?;
        let (Some(la), Some(lb)) = (network.label(a), network.label(b)) else {
            return Err(Interrupt::Failed(Error::Computation(format!(
                "edge ({a}, {b}) refers to a missing node"
            ))));
        };
        writeln!(out, "{la},{lb}")?;
        written += 1;
        ctx.advance(1);
    }
    out.flush()?;
    Ok(written)
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".partial");
    path.with_file_name(name)
}
