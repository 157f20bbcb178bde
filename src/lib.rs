//! scalebal: counterbalancing weights for networks of nested scales.
//!
//! Input is a table of `name,left,right` lines. A side is either a weight or
//! the name of another scale, whose balanced total mass it carries.
//!
//! ```
//! use scalebal::domain::{parse_scales, report_changes, Balancer};
//!
//! let mut graph = parse_scales("A,2,B\nB,1,3\n").unwrap().graph;
//! Balancer::default().balance(&mut graph).unwrap();
//! let lines: Vec<String> = report_changes(&graph)
//!     .unwrap()
//!     .iter()
//!     .map(ToString::to_string)
//!     .collect();
//! assert_eq!(lines, vec!["A,5,0", "B,2,0"]);
//! ```

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
