//! Application services

pub mod balance;

pub use balance::{BalanceService, BalanceSummary, Computation, RejectHandler};
