//! SAT layer: one-hot model encoding, satisfiability search, and the
//! checker and oracle built on top of them.

pub mod checker;
pub mod encoding;
pub mod oracle;
pub mod search;

pub use checker::HardConstraintChecker;
pub use oracle::SatOracle;
