pub mod checker;
pub mod combination;
pub mod combinator;
pub mod group;
pub mod model;
pub mod oracle;
pub mod report;
pub mod result;
pub mod sat;
pub mod tuple_list;

pub use combination::{Combination, NO_VALUE};
pub use model::{ModelError, TestModel};
pub use result::{TestResult, TestResults};
pub use tuple_list::{ConstraintId, TupleList};
