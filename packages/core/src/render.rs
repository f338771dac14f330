//! Human-readable text rendering of graphs and validation results.
//!
//! The output is stable plain text for terminals and logs. It is not an
//! interchange format; only the JSON document is.

use crate::graph::Graph;
use crate::validation::{ValidationMode, ValidationResult};

/// Render a validation outcome.
///
/// ```text
/// dag: invalid
///   Cycle detected: not a DAG
///   offending edges: e1, e2, e3
/// ```
pub fn render_validation(mode: ValidationMode, result: &ValidationResult) -> String {
    let status = if result.valid { "valid" } else { "invalid" };
    let mut out = format!("{}: {}\n  {}\n", mode, status, result.reason);
    if !result.offending_edge_ids.is_empty() {
        let ids: Vec<&str> = result.offending_edge_ids.iter().map(String::as_str).collect();
        out.push_str(&format!("  offending edges: {}\n", ids.join(", ")));
    }
    out
}

/// Render a [`Graph`] as a node table followed by its edges.
///
/// ```text
/// Graph  3 nodes, 2 edges
/// ───────────────────────
///
/// NODES (3)
///   load        "Load CSV"        (0, 0)
///   clean       "Clean rows"      (0, 86)
///
/// EDGES (2)
///   e1  load → clean
///   e2  clean → ghost  (dangling)
/// ```
pub fn render_graph(graph: &Graph<'_>) -> String {
    let nodes = graph.nodes();
    let edges = graph.edges();
    let header = format!(
        "Graph  {} node{}, {} edge{}",
        nodes.len(),
        plural(nodes.len()),
        edges.len(),
        plural(edges.len())
    );
    let rule = "─".repeat(header.chars().count());
    let mut out = format!("{}\n{}\n", header, rule);

    if !nodes.is_empty() {
        let id_width = nodes.iter().map(|n| n.id.chars().count()).max().unwrap_or(0);
        out.push('\n');
        out.push_str(&format!("NODES ({})\n", nodes.len()));
        for n in nodes {
            let label = format!("\"{}\"", truncate(&n.label, 40));
            out.push_str(&format!(
                "  {:<id_width$}  {:<42}  ({}, {})\n",
                n.id,
                label,
                n.position.x,
                n.position.y,
            ));
        }
    }

    if !edges.is_empty() {
        out.push('\n');
        out.push_str(&format!("EDGES ({})\n", edges.len()));
        for e in edges {
            out.push_str(&format!("  {}  {} → {}", e.id, e.source, e.target));
            if let Some(label) = &e.label {
                out.push_str(&format!("  \"{}\"", truncate(label, 40)));
            }
            if graph.index_of(&e.source).is_none() || graph.index_of(&e.target).is_none() {
                out.push_str("  (dangling)");
            }
            out.push('\n');
        }
    }

    out
}

// --- helpers -----------------------------------------------------------------

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

fn truncate(s: &str, max: usize) -> String {
    let s = s.trim();
    if s.chars().count() <= max {
        return s.to_string();
    }
    let cut: String = s.chars().take(max.saturating_sub(1)).collect();
    format!("{}…", cut)
}

// --- tests -------------------------------------------------------------------
