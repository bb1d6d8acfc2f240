//! ASCII tree rendering for containment hierarchies.

use super::expanded::TreeSnapshot;

/// Render a tree snapshot as ASCII art, one object per line.
///
/// Example output:
/// ```text
/// HQ [Building]
/// ├── Room 101 [Room]
/// │   └── rack-01 [Rack]
/// └── Room 102 [Room]
/// ```
pub fn render_tree(root: &TreeSnapshot) -> String {
    let mut output = String::new();
    render_node(&mut output, root, "", true, true);
    output
}

fn render_node(output: &mut String, node: &TreeSnapshot, prefix: &str, is_last: bool, is_root: bool) {
    if !is_root {
        let branch = if is_last { "└── " } else { "├── " };
        output.push_str(prefix);
        output.push_str(branch);
    }
    output.push_str(&label(node));
    output.push('\n');

    let child_prefix = if is_root {
        String::new()
    } else {
        let continuation = if is_last { "    " } else { "│   " };
        format!("{}{}", prefix, continuation)
    };

    for (i, child) in node.children.iter().enumerate() {
        let child_is_last = i == node.children.len() - 1;
        render_node(output, child, &child_prefix, child_is_last, false);
    }
}

fn label(node: &TreeSnapshot) -> String {
    if node.object.is_placeholder() {
        node.object.name.clone()
    } else {
        format!("{} [{}]", node.object.name, node.object.class_name)
    }
}
