//! Text-tree view of the reference graph.

use std::collections::HashSet;

use termtree::Tree;
use tracing::instrument;

use crate::domain::arena::ScaleGraph;
use crate::domain::entities::{Hand, Pan, ScaleId, Side};
use crate::domain::error::DomainResult;

/// Renders one tree per root scale (a scale no other scale references).
///
/// Scales only reachable through a cycle get their own tree; a reference
/// back into the current path is printed as a leaf marked `(cycle)`.
#[instrument(level = "debug", skip(graph))]
pub fn to_trees(graph: &ScaleGraph) -> DomainResult<Vec<Tree<String>>> {
    let mut visited = HashSet::new();
    let mut trees = Vec::new();

    let roots = graph.roots();
    let rest: Vec<ScaleId> = graph.order().to_vec();
    for id in roots.into_iter().chain(rest) {
        if visited.contains(&id) {
            continue;
        }
        let scale = graph.scale(id)?;
        let mut path = HashSet::new();
        trees.push(build_tree(
            graph,
            id,
            scale_label(&scale.name, scale.pan),
            &mut path,
            &mut visited,
        )?);
    }
    Ok(trees)
}

fn scale_label(name: &str, pan: Pan) -> String {
    format!("{} [mass {}]", name, pan.mass)
}

fn side_label(hand: Hand) -> &'static str {
    match hand {
        Hand::Left => "left",
        Hand::Right => "right",
    }
}

fn build_tree(
    graph: &ScaleGraph,
    id: ScaleId,
    label: String,
    path: &mut HashSet<ScaleId>,
    visited: &mut HashSet<ScaleId>,
) -> DomainResult<Tree<String>> {
    let mut tree = Tree::new(label);
    visited.insert(id);
    path.insert(id);

    let scale = graph.scale(id)?;
    for hand in [Hand::Left, Hand::Right] {
        let resolved = graph.resolve(id, hand)?;
        match scale.side(hand) {
            Side::Pan(pan) => {
                tree.push(Tree::new(format!(
                    "{}: {} (+{})",
                    side_label(hand),
                    pan.mass,
                    pan.balance_mass
                )));
            }
            Side::Reference(target) => {
                let child = graph.scale(*target)?;
                let label = format!(
                    "{}: {} (+{})",
                    side_label(hand),
                    scale_label(&child.name, child.pan),
                    resolved.balance_mass
                );
                let subtree = if path.contains(target) {
                    Tree::new(format!("{} (cycle)", label))
                } else {
                    build_tree(graph, *target, label, path, visited)?
                };
                tree.push(subtree);
            }
        }
    }

    path.remove(&id);
    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::balancer::{Balancer, Traversal};
    use crate::domain::builder::parse_scales;

    #[test]
    fn given_nested_scales_when_rendering_then_one_tree_per_root() {
        let mut graph = parse_scales("A,2,B\nB,1,3\nZ,1,1\n").unwrap().graph;
        Balancer::default().balance(&mut graph).unwrap();

        let trees = to_trees(&graph).unwrap();
        assert_eq!(trees.len(), 2);

        let rendered = trees[0].to_string();
        assert!(rendered.starts_with("A [mass 15]"));
        assert!(rendered.contains("left: 2 (+5)"));
        assert!(rendered.contains("right: B [mass 7] (+0)"));
        assert!(rendered.contains("left: 1 (+2)"));
        assert!(trees[1].to_string().starts_with("Z [mass 3]"));
    }

    #[test]
    fn given_cycle_when_rendering_then_marks_back_reference() {
        let mut graph = parse_scales("A,B,1\nB,A,1\n").unwrap().graph;
        Balancer::new(Traversal::Reverse).balance(&mut graph).unwrap();

        let trees = to_trees(&graph).unwrap();
        assert_eq!(trees.len(), 1);
        assert!(trees[0].to_string().contains("(cycle)"));
    }
}
