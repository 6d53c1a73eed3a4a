//! Reconciles the view tree into plain terminal text.

use vedrid_core::view::{Element, MAP_ELEMENT_ID, Node};

pub fn to_text(node: &Node) -> String {
    let mut lines = Vec::new();
    block(node, &mut lines);
    lines.join("\n")
}

fn block(node: &Node, lines: &mut Vec<String>) {
    let e = match node {
        Node::Text(t) => {
            lines.push(t.clone());
            return;
        }
        Node::Element(e) => e,
    };

    match e.tag {
        "h1" | "h2" => {
            let text = inline(e);
            let rule = if e.tag == "h1" { "=" } else { "-" };
            let underline = rule.repeat(text.chars().count());
            lines.push(text);
            lines.push(underline);
        }
        "p" => lines.push(inline(e)),
        "table" => table(e, lines),
        "li" => {
            let mut item = Vec::new();
            e.children.iter().for_each(|c| block(c, &mut item));
            lines.extend(item.into_iter().map(|line| format!("  {line}")));
        }
        "button" => lines.push(format!("[{}]", inline(e))),
        "form" => lines.push(form(e)),
        // Drawn by the map widget, not by the output area.
        "div" if e.get_attr("id") == Some(MAP_ELEMENT_ID) => {}
        _ => e.children.iter().for_each(|c| block(c, lines)),
    }
}

fn inline(e: &Element) -> String {
    Node::Element(e.clone()).text_content()
}

fn form(e: &Element) -> String {
    let placeholder = e
        .children
        .iter()
        .find_map(|c| match c {
            Node::Element(input) if input.tag == "input" => input.get_attr("placeholder"),
            _ => None,
        })
        .unwrap_or("");

    let submit = e
        .children
        .iter()
        .filter(|c| matches!(c, Node::Element(b) if b.tag == "button"))
        .map(Node::text_content)
        .next()
        .unwrap_or_default();

    format!("{placeholder}: ________ [{submit}]")
}

fn table(e: &Element, lines: &mut Vec<String>) {
    let rows: Vec<Vec<String>> = e
        .children
        .iter()
        .filter_map(|c| match c {
            Node::Element(tr) if tr.tag == "tr" => {
                Some(tr.children.iter().map(Node::text_content).collect())
            }
            _ => None,
        })
        .collect();

    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    let widths: Vec<usize> = (0..columns)
        .map(|col| {
            rows.iter()
                .filter_map(|r| r.get(col))
                .map(|cell| cell.chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    for (idx, row) in rows.iter().enumerate() {
        let line = row
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{cell:>width$}"))
            .collect::<Vec<_>>()
            .join("  ");
        lines.push(line.trim_end().to_string());

        if idx == 0 {
            let total = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
            lines.push("-".repeat(total));
        }
    }
}
