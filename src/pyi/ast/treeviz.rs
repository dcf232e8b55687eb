//! Treeviz formatter for a parsed module

use super::node::{AstNode, Definition, Module};

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let mut truncated = s.chars().take(max_chars).collect::<String>();
        truncated.push_str("...");
        truncated
    } else {
        s.to_string()
    }
}

/// One line of the tree: node type, label and children
struct Entry<'a> {
    node_type: &'static str,
    label: String,
    children: &'a [Definition],
}

impl<'a> Entry<'a> {
    fn leaf(node: &impl AstNode) -> Self {
        Self {
            node_type: node.node_type(),
            label: node.display_label(),
            children: &[],
        }
    }

    fn definition(definition: &'a Definition) -> Self {
        let children = match definition {
            Definition::Class(class) => class.members.as_slice(),
            _ => &[],
        };
        Self {
            node_type: definition.node_type(),
            label: definition.display_label(),
            children,
        }
    }
}

pub fn to_treeviz_str(module: &Module) -> String {
    let mut entries: Vec<Entry> = Vec::new();
    entries.extend(module.imports.iter().map(Entry::leaf));
    entries.extend(module.type_vars.iter().map(Entry::leaf));
    entries.extend(module.aliases.iter().map(Entry::leaf));
    entries.extend(module.definitions.iter().map(Entry::definition));

    let mut result = String::from("Module\n");
    append_entries(&mut result, &entries, "");
    result
}

fn append_entries(result: &mut String, entries: &[Entry], prefix: &str) {
    for (i, entry) in entries.iter().enumerate() {
        let is_last = i == entries.len() - 1;
        let connector = if is_last { "└─" } else { "├─" };
        result.push_str(&format!(
            "{}{} {}: {}\n",
            prefix,
            connector,
            entry.node_type,
            truncate(&entry.label, 60)
        ));

        if !entry.children.is_empty() {
            let new_prefix = format!("{}{}", prefix, if is_last { "  " } else { "│ " });
            let children: Vec<Entry> = entry.children.iter().map(Entry::definition).collect();
            append_entries(result, &children, &new_prefix);
        }
    }
}
