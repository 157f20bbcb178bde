//! Balance records for reporting.

use crate::domain::arena::ScaleGraph;
use crate::domain::entities::{BalanceRecord, Hand};
use crate::domain::error::DomainResult;

/// One record per scale, in first-mention order.
///
/// Each value is the balance mass of the pan the side resolves to; for a
/// reference side that is the counterweight placed on the referenced scale.
pub fn report_changes(graph: &ScaleGraph) -> DomainResult<Vec<BalanceRecord>> {
    graph
        .order()
        .iter()
        .map(|&id| {
            let left = graph.resolve(id, Hand::Left)?;
            let right = graph.resolve(id, Hand::Right)?;
            Ok(BalanceRecord {
                name: graph.scale(id)?.name.clone(),
                left_balance: left.balance_mass,
                right_balance: right.balance_mass,
            })
        })
        .collect()
}
