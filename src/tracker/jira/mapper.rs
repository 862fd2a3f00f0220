use serde_json::{json, Value};

use crate::tracker::types::Ticket;

/// ADF node types that end a line when rendered as plain text.
const BLOCK_NODES: &[&str] = &[
    "paragraph",
    "heading",
    "listItem",
    "codeBlock",
    "blockquote",
    "rule",
    "panel",
    "blockCard",
];

/// Separator between cells of one table row.
const CELL_SEPARATOR: &str = " | ";

/// Map a `GET /rest/api/3/issue/{id}` response onto our ticket type.
///
/// Missing fields become empty strings.
pub fn map_ticket(ticket_id: &str, issue: &Value) -> Ticket {
    let fields = &issue["fields"];
    Ticket {
        id: ticket_id.to_string(),
        summary: fields["summary"].as_str().unwrap_or("").to_string(),
        description: description_text(&fields["description"]),
    }
}

/// Render a description field as plain text.
///
/// Plain strings pass through, Atlassian Document Format trees are flattened,
/// and anything else falls back to its JSON text.
pub fn description_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Object(_) if value["type"] == "doc" => {
            let mut out = String::new();
            render_node(value, &mut out);
            out.trim_end().to_string()
        }
        other => other.to_string(),
    }
}

fn render_node(node: &Value, out: &mut String) {
    match node["type"].as_str().unwrap_or("") {
        "text" => out.push_str(node["text"].as_str().unwrap_or("")),
        "hardBreak" => out.push('\n'),
        "mention" | "emoji" | "status" => out.push_str(&attr(node, "text")),
        "inlineCard" => out.push_str(&attr(node, "url")),
        "date" => out.push_str(&attr(node, "timestamp")),
        "tableRow" => {
            let cells: Vec<String> = children(node)
                .iter()
                .map(|cell| {
                    let mut text = String::new();
                    render_node(cell, &mut text);
                    text.trim().replace('\n', " ")
                })
                .collect();
            if !out.is_empty() && !out.ends_with('\n') {
                out.push('\n');
            }
            out.push_str(&cells.join(CELL_SEPARATOR));
            out.push('\n');
        }
        kind => {
            if kind == "blockCard" {
                out.push_str(&attr(node, "url"));
            }
            for child in children(node) {
                render_node(child, out);
            }
            if BLOCK_NODES.contains(&kind) && !out.is_empty() && !out.ends_with('\n') {
                out.push('\n');
            }
        }
    }
}

fn children(node: &Value) -> &[Value] {
    node["content"].as_array().map(Vec::as_slice).unwrap_or(&[])
}

/// String or numeric attribute rendered as text; anything else is empty.
fn attr(node: &Value, key: &str) -> String {
    match &node["attrs"][key] {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

/// Build the comment payload: one paragraph holding the text verbatim.
pub fn comment_body(text: &str) -> Value {
    json!({
        "body": {
            "version": 1,
            "type": "doc",
            "content": [
                {
                    "type": "paragraph",
                    "content": [
                        { "type": "text", "text": text }
                    ]
                }
            ]
        }
    })
}
