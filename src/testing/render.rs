//! Plain-text rendering of resolutions for snapshot-style assertions.

use crate::resolver::{RenderInstruction, Resolution};

/// Render a resolution as an indented text tree.
///
/// Each component becomes one line (`id <type> data...`), children indented
/// two spaces under their slot name. Error placeholders render their message.
/// Stable output: slots sort by name, data by key, so assertions do not
/// depend on map iteration order.
pub fn tree_to_string(resolution: &Resolution) -> String {
    let mut out = String::new();
    for root in &resolution.roots {
        write_node(resolution, root, 0, &mut out);
    }
    // The final line has no trailing newline.
    while out.ends_with('\n') {
        out.pop();
    }
    out
}

fn write_node(resolution: &Resolution, id: &str, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    let Some(instruction) = resolution.instruction(id) else {
        out.push_str(&format!("{indent}{id} <missing>\n"));
        return;
    };

    out.push_str(&format!(
        "{indent}{id} <{}>{}\n",
        instruction.component_type,
        describe(instruction)
    ));
    for slot in instruction.slots.slot_names() {
        out.push_str(&format!("{indent}  [{slot}]\n"));
        for child in instruction.slots.children(slot) {
            write_node(resolution, child, depth + 2, out);
        }
    }
}

fn describe(instruction: &RenderInstruction) -> String {
    if let Some(error) = &instruction.error {
        return format!(" error={error:?}");
    }
    let mut parts: Vec<String> = instruction
        .data
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect();
    parts.sort();
    if parts.is_empty() {
        String::new()
    } else {
        format!(" {}", parts.join(" "))
    }
}

// ===========================================================================
// Tests
// ===========================================================================
