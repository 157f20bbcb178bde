//! Domain layer: scale graph, builder and balancer
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod balancer;
pub mod builder;
pub mod entities;
pub mod error;
pub mod hierarchy;
pub mod report;

pub use arena::ScaleGraph;
pub use balancer::{balance_scale, Balancer, Traversal};
pub use builder::{
    classify_token, parse_line, parse_scales, BuildOutput, LineOutcome, RejectReason,
    RejectedLine, ScaleBuilder, Token, DEFAULT_COMMENT_PREFIX,
};
pub use entities::*;
pub use error::{DomainError, DomainResult};
pub use report::report_changes;
