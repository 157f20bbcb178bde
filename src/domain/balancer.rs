//! Balancer: computes counterweights and propagates scale masses upward.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

use crate::domain::arena::ScaleGraph;
use crate::domain::entities::{Hand, Mass, ScaleId};
use crate::domain::error::{DomainError, DomainResult};

/// Order in which scales are balanced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Traversal {
    /// Referenced scales first, cycles are an error
    #[default]
    Dependency,
    /// Reverse of first-mention order, no cycle detection
    Reverse,
}

impl fmt::Display for Traversal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Traversal::Dependency => write!(f, "dependency"),
            Traversal::Reverse => write!(f, "reverse"),
        }
    }
}

impl FromStr for Traversal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dependency" => Ok(Traversal::Dependency),
            "reverse" => Ok(Traversal::Reverse),
            other => Err(format!(
                "unknown traversal '{}', expected 'dependency' or 'reverse'",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Active,
    Done,
}

/// Balances every scale of a graph in place.
#[derive(Debug, Clone, Copy, Default)]
pub struct Balancer {
    traversal: Traversal,
}

impl Balancer {
    pub fn new(traversal: Traversal) -> Self {
        Self { traversal }
    }

    /// Balances all scales; returns the order in which they were processed.
    #[instrument(level = "debug", skip(self, graph), fields(traversal = %self.traversal))]
    pub fn balance(&self, graph: &mut ScaleGraph) -> DomainResult<Vec<ScaleId>> {
        let order = self.order(graph)?;
        for &id in &order {
            balance_scale(graph, id)?;
        }
        debug!("balanced {} scales", order.len());
        Ok(order)
    }

    /// Processing order without touching any mass.
    pub fn order(&self, graph: &ScaleGraph) -> DomainResult<Vec<ScaleId>> {
        match self.traversal {
            Traversal::Reverse => Ok(graph.order().iter().rev().copied().collect()),
            Traversal::Dependency => dependency_order(graph),
        }
    }
}

/// Post-order walk over references, started from scales in reverse
/// first-mention order.
///
/// When reverse first-mention order already puts every referenced scale
/// before its referencers, the result is exactly that order.
fn dependency_order(graph: &ScaleGraph) -> DomainResult<Vec<ScaleId>> {
    let mut marks: HashMap<ScaleId, Mark> = HashMap::with_capacity(graph.len());
    let mut ordered = Vec::with_capacity(graph.len());

    for &start in graph.order().iter().rev() {
        if marks.contains_key(&start) {
            continue;
        }
        let mut stack = vec![(start, false)];
        while let Some((id, expanded)) = stack.pop() {
            if expanded {
                marks.insert(id, Mark::Done);
                ordered.push(id);
                continue;
            }
            match marks.get(&id) {
                Some(Mark::Done) => continue,
                Some(Mark::Active) => {
                    return Err(DomainError::CycleDetected(graph.scale(id)?.name.clone()))
                }
                None => {}
            }

            let scale = graph.scale(id)?;
            marks.insert(id, Mark::Active);
            stack.push((id, true));

            let children: Vec<ScaleId> = scale.references().collect();
            for &child in children.iter().rev() {
                let referenced = graph.get(child).ok_or_else(|| DomainError::DanglingReference {
                    owner: scale.name.clone(),
                })?;
                match marks.get(&child) {
                    Some(Mark::Active) => {
                        return Err(DomainError::CycleDetected(referenced.name.clone()))
                    }
                    Some(Mark::Done) => {}
                    None => stack.push((child, false)),
                }
            }
        }
    }

    Ok(ordered)
}

/// Balances one scale against the current state of its sides.
///
/// The lighter side's pan receives the difference as its balance mass, then
/// both sides including counterweights are added onto the scale's own mass.
#[instrument(level = "trace", skip(graph))]
pub fn balance_scale(graph: &mut ScaleGraph, id: ScaleId) -> DomainResult<()> {
    let left = graph.resolve(id, Hand::Left)?;
    let right = graph.resolve(id, Hand::Right)?;

    if left.mass > right.mass {
        let delta = left.mass - right.mass;
        graph.with_resolved_mut(id, Hand::Right, |pan| pan.balance_mass = delta)?;
    } else if right.mass > left.mass {
        let delta = right.mass - left.mass;
        graph.with_resolved_mut(id, Hand::Left, |pan| pan.balance_mass = delta)?;
    }

    // both sides may resolve to the same pan, so read back after writing
    let left = graph.resolve(id, Hand::Left)?;
    let right = graph.resolve(id, Hand::Right)?;
    let scale = graph.scale_mut(id)?;
    let total = [left.mass, right.mass, left.balance_mass, right.balance_mass]
        .into_iter()
        .try_fold(scale.pan.mass, Mass::checked_add)
        .ok_or_else(|| DomainError::MassOverflow(scale.name.clone()))?;
    scale.pan.mass = total;
    trace!("{}: total mass {}", scale.name, total);
    Ok(())
}
