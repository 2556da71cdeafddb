//! `pipq deps` command implementation.
//!
//! Resolves a package's dependency tree to the requested depth and renders
//! it with box-drawing indentation. Nodes past the recursion depth stay
//! unpopulated and are shown with their constraints only.

use pipq_core::error::PipqResult;
use pipq_core::{Constraint, ConstraintOp, Requirement};
use pipq_resolver::DependencyNode;

use super::CommandContext;

/// Execute the `pipq deps` command
pub async fn execute(
    package: String,
    release: Option<String>,
    depth: u32,
    extras: Vec<String>,
    allow_prereleases: bool,
    ctx: &CommandContext,
) -> PipqResult<()> {
    let constraints = match release {
        Some(release) => vec![Constraint {
            op: ConstraintOp::Equal,
            version: release,
            wildcard: false,
        }],
        None => Vec::new(),
    };
    let requirement = Requirement {
        name: package,
        extras,
        activation_extras: Default::default(),
        constraints,
        markers: Vec::new(),
    };

    let mut root = DependencyNode::from_requirement(requirement);
    root.populate(depth, &ctx.fetcher, &ctx.env, allow_prereleases)
        .await?;

    render(&root, "", true, true, ctx);

    let unresolved = count_unresolved(&root);
    if unresolved > 0 {
        ctx.output.line("");
        ctx.output.warn(&format!(
            "{} dependencies could not be resolved to a concrete version",
            unresolved
        ));
    }
    Ok(())
}

fn node_label(node: &DependencyNode) -> String {
    let mut label = node.name.clone();
    if !node.extras.is_empty() {
        label.push_str(&format!("[{}]", node.extras.join(",")));
    }
    if !node.is_populated() {
        let constraints: Vec<String> = node.constraints.iter().map(Constraint::to_string).collect();
        if !constraints.is_empty() {
            label.push_str(&format!(" {}", constraints.join(",")));
        }
        return label;
    }
    match node.version().expect("populated node has a readable version") {
        Some(version) => label.push_str(&format!(" {}", version)),
        None => label.push_str(" (unresolved)"),
    }
    label
}

fn render(node: &DependencyNode, prefix: &str, is_last: bool, is_root: bool, ctx: &CommandContext) {
    if is_root {
        ctx.output.heading(&node_label(node));
    } else {
        let connector = if is_last { "└── " } else { "├── " };
        ctx.output
            .line(&format!("{}{}{}", prefix, connector, node_label(node)));
    }

    if !node.is_populated() {
        return;
    }
    let children = node
        .dependencies()
        .expect("populated node has readable dependencies");
    for (i, child) in children.iter().enumerate() {
        let last = i + 1 == children.len();
        let child_prefix = if is_root {
            String::new()
        } else if is_last {
            format!("{}    ", prefix)
        } else {
            format!("{}│   ", prefix)
        };
        render(child, &child_prefix, last, false, ctx);
    }
}

fn count_unresolved(node: &DependencyNode) -> usize {
    if !node.is_populated() {
        return 0;
    }
    let own = match node.version().expect("populated node has a readable version") {
        Some(_) => 0,
        None => 1,
    };
    let children = node
        .dependencies()
        .expect("populated node has readable dependencies");
    own + children.iter().map(count_unresolved).sum::<usize>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_for_unpopulated_node_shows_constraints() {
        let node = DependencyNode::parse("requests[security]>=2.0,<3.0").unwrap();
        assert_eq!(node_label(&node), "requests[security] >=2.0,<3.0");
    }

    #[test]
    fn test_label_for_bare_unpopulated_node() {
        let node = DependencyNode::parse("idna").unwrap();
        assert_eq!(node_label(&node), "idna");
    }

    #[test]
    fn test_count_unresolved_on_unpopulated_root() {
        let node = DependencyNode::parse("idna").unwrap();
        assert_eq!(count_unresolved(&node), 0);
    }
}
