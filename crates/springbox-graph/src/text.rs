//! Line-oriented text format.
//!
//! One record per line. A record is a comma separated list of key/value pairs, optionally wrapped
//! in `{ }`. Keys and values are either bare words or quoted with `'`/`"` (backslash escapes the
//! next character inside quotes); `:` and `=` both separate a key from its value:
//!
//! ```text
//! {'type':'node', 'id':'D25', 'x':7, 'y':6, 'width':159, 'height':106}
//! type=node, id=m1, x=171, y=9, width=139, height=92
//! {'type':'edge', 'source':'D25', 'target':'m1'}
//! ```
//!
//! Blank lines and lines starting with `#` are skipped; unknown keys are ignored. Edge records
//! are applied after every node record of the text, so an edge may precede its endpoints.
//!
//! Loading is all-or-nothing: the first malformed line aborts the load with
//! [`Error::Parse`] and the target graph is left as it was.

use crate::error::{Error, Result};
use crate::graph::{Graph, GraphNode};
use std::fmt::Write as _;
use std::iter::Peekable;
use std::str::Chars;

impl Graph {
    /// Parses `text` into a new graph.
    pub fn from_text(text: &str) -> Result<Self> {
        let mut graph = Graph::new();
        let mut edges: Vec<(usize, &str, String, String)> = Vec::new();

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let parse_err = |message: String| Error::Parse {
                line: line_no,
                text: line.to_string(),
                message,
            };

            let fields = parse_record(line).map_err(parse_err)?;
            let record = Record { fields: &fields };
            match record.required("type").map_err(parse_err)? {
                "node" => {
                    let node = GraphNode::new(
                        record.required("id").map_err(parse_err)?,
                        record.number("x").map_err(parse_err)?,
                        record.number("y").map_err(parse_err)?,
                        record.number("width").map_err(parse_err)?,
                        record.number("height").map_err(parse_err)?,
                    )
                    .map_err(|e| parse_err(e.to_string()))?;
                    graph
                        .add_node(node)
                        .map_err(|e| parse_err(e.to_string()))?;
                }
                "edge" => {
                    let source = record.required("source").map_err(parse_err)?.to_string();
                    let target = record.required("target").map_err(parse_err)?.to_string();
                    edges.push((line_no, line, source, target));
                }
                other => return Err(parse_err(format!("unknown record type `{other}`"))),
            }
        }

        for (line_no, line, source, target) in edges {
            graph
                .add_edge(&source, &target)
                .map_err(|e| Error::Parse {
                    line: line_no,
                    text: line.to_string(),
                    message: e.to_string(),
                })?;
        }

        tracing::debug!(
            nodes = graph.len(),
            edges = graph.edge_count(),
            "loaded graph from text"
        );
        Ok(graph)
    }

    /// Replaces the contents of this graph with the graph described by `text`.
    ///
    /// On error the graph is unchanged.
    pub fn load_from_text(&mut self, text: &str) -> Result<()> {
        *self = Graph::from_text(text)?;
        Ok(())
    }

    /// Serializes nodes (insertion order) followed by edges (insertion order).
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for n in self.nodes() {
            let _ = writeln!(
                out,
                "{{'type':'node', 'id':{}, 'x':{}, 'y':{}, 'width':{}, 'height':{}}}",
                quote(n.id()),
                n.left,
                n.top,
                n.width(),
                n.height()
            );
        }
        for e in self.edges() {
            let _ = writeln!(
                out,
                "{{'type':'edge', 'source':{}, 'target':{}}}",
                quote(&e.source),
                quote(&e.target)
            );
        }
        out
    }
}

struct Record<'a> {
    fields: &'a [(String, String)],
}

impl<'a> Record<'a> {
    fn get(&self, key: &str) -> Option<&'a str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn required(&self, key: &str) -> std::result::Result<&'a str, String> {
        self.get(key)
            .ok_or_else(|| format!("missing required key `{key}`"))
    }

    fn number(&self, key: &str) -> std::result::Result<f64, String> {
        let raw = self.required(key)?;
        match raw.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v),
            _ => Err(format!("`{key}` is not a finite number: `{raw}`")),
        }
    }
}

fn parse_record(line: &str) -> std::result::Result<Vec<(String, String)>, String> {
    let body = match line.strip_prefix('{') {
        Some(rest) => rest
            .strip_suffix('}')
            .ok_or_else(|| "record opened with `{` but not closed with `}`".to_string())?,
        None => line,
    };

    let mut fields = Vec::new();
    let mut chars = body.chars().peekable();
    loop {
        skip_whitespace(&mut chars);
        if chars.peek().is_none() {
            break;
        }
        let key = read_token(&mut chars, &[':', '='])?;
        skip_whitespace(&mut chars);
        match chars.next() {
            Some(':') | Some('=') => {}
            _ => return Err(format!("expected `:` or `=` after key `{key}`")),
        }
        skip_whitespace(&mut chars);
        let value = read_token(&mut chars, &[','])?;
        fields.push((key, value));
        skip_whitespace(&mut chars);
        match chars.next() {
            None | Some(',') => {}
            Some(c) => return Err(format!("unexpected `{c}` after value")),
        }
    }
    Ok(fields)
}

fn skip_whitespace(chars: &mut Peekable<Chars<'_>>) {
    while chars.next_if(|c| c.is_whitespace()).is_some() {}
}

fn read_token(
    chars: &mut Peekable<Chars<'_>>,
    stops: &[char],
) -> std::result::Result<String, String> {
    let mut out = String::new();
    if let Some(quote) = chars.next_if(|c| *c == '\'' || *c == '"') {
        loop {
            match chars.next() {
                None => return Err("unterminated quoted string".to_string()),
                Some('\\') => match chars.next() {
                    Some('n') => out.push('\n'),
                    Some('r') => out.push('\r'),
                    Some(c) => out.push(c),
                    None => return Err("dangling escape at end of line".to_string()),
                },
                Some(c) if c == quote => return Ok(out),
                Some(c) => out.push(c),
            }
        }
    }

    while let Some(c) = chars.next_if(|c| !stops.contains(c)) {
        out.push(c);
    }
    let trimmed = out.trim();
    if trimmed.is_empty() {
        return Err("expected a key or value".to_string());
    }
    Ok(trimmed.to_string())
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for ch in s.chars() {
        match ch {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\'' | '\\' => {
                out.push('\\');
                out.push(ch);
            }
            _ => out.push(ch),
        }
    }
    out.push('\'');
    out
}
