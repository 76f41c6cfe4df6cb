pub use binary_vector::BinaryVector;
pub use error::OError;
pub use individual::{DataValue, Individual, IndividualExport, Population};
pub use objective::{Objective, ObjectiveDirection};
pub use problem::{builtin_problems, Evaluator, Problem, ProblemExport};

mod binary_vector;
mod error;
mod individual;
mod objective;
mod problem;
#[cfg(test)]
pub(crate) mod test_utils;
pub mod utils;
