//! Balance service
//!
//! Pulls lines from a [`LineSource`], builds and balances the scale graph, and
//! pushes one record per scale into a [`RecordSink`].

use std::sync::Arc;

use termtree::Tree;
use tracing::{debug, info, instrument};

use crate::application::{ApplicationResult, IoResultExt};
use crate::config::Settings;
use crate::domain::{
    hierarchy, report_changes, Balancer, BalanceRecord, LineOutcome, RejectedLine, ScaleBuilder,
    ScaleGraph,
};
use crate::infrastructure::traits::{LineSource, RecordSink};

/// A balanced graph together with the input diagnostics.
#[derive(Debug)]
pub struct Computation {
    pub graph: ScaleGraph,
    pub rejected: Vec<RejectedLine>,
    /// Physical lines read, including skipped and rejected ones
    pub lines_read: usize,
}

/// Outcome of a complete balance run.
#[derive(Debug, Clone)]
pub struct BalanceSummary {
    pub records: Vec<BalanceRecord>,
    pub rejected: Vec<RejectedLine>,
    pub lines_read: usize,
}

/// Called once per rejected input line, as soon as the line is read.
pub type RejectHandler = Arc<dyn Fn(&RejectedLine) + Send + Sync>;

/// Service running the builder and balancer over external line and record streams.
pub struct BalanceService {
    settings: Arc<Settings>,
    on_reject: Option<RejectHandler>,
}

impl BalanceService {
    pub fn new(settings: Arc<Settings>) -> Self {
        Self {
            settings,
            on_reject: None,
        }
    }

    /// Report rejected lines while reading, before balancing can fail.
    pub fn with_reject_handler(mut self, handler: RejectHandler) -> Self {
        self.on_reject = Some(handler);
        self
    }

    fn builder(&self) -> ScaleBuilder {
        ScaleBuilder::new(self.settings.balance.self_mass)
            .with_comment_prefix(self.settings.input.comment_prefix.clone())
    }

    /// Read all lines, build the graph and balance it.
    #[instrument(level = "debug", skip_all)]
    pub fn compute(&self, source: &mut dyn LineSource) -> ApplicationResult<Computation> {
        let mut builder = self.builder();
        while let Some(line) = source
            .next_line()
            .with_context(format!("read input line {}", builder.lines_read()))?
        {
            if let LineOutcome::Rejected(rejected) = builder.push_line(&line)? {
                if let Some(handler) = &self.on_reject {
                    handler(&rejected);
                }
            }
        }
        let lines_read = builder.lines_read();
        let output = builder.finish();

        let mut graph = output.graph;
        Balancer::new(self.settings.balance.traversal).balance(&mut graph)?;
        info!(
            "balanced {} scales from {} lines ({} rejected)",
            graph.len(),
            lines_read,
            output.rejected.len()
        );

        Ok(Computation {
            graph,
            rejected: output.rejected,
            lines_read,
        })
    }

    /// Full run: compute, then write every record in first-mention order.
    #[instrument(level = "debug", skip_all)]
    pub fn run(
        &self,
        source: &mut dyn LineSource,
        sink: &mut dyn RecordSink,
    ) -> ApplicationResult<BalanceSummary> {
        let computation = self.compute(source)?;
        let records = report_changes(&computation.graph)?;
        for record in &records {
            sink.write_record(record)
                .with_context(format!("write record for scale {}", record.name))?;
        }
        sink.flush().with_context("flush output")?;
        debug!("wrote {} records", records.len());

        Ok(BalanceSummary {
            records,
            rejected: computation.rejected,
            lines_read: computation.lines_read,
        })
    }

    /// Hierarchy view of the balanced graph.
    pub fn trees(
        &self,
        source: &mut dyn LineSource,
    ) -> ApplicationResult<(Vec<Tree<String>>, Vec<RejectedLine>)> {
        let computation = self.compute(source)?;
        let trees = hierarchy::to_trees(&computation.graph)?;
        Ok((trees, computation.rejected))
    }
}
