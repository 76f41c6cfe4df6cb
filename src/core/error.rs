use thiserror::Error;

#[derive(Error, Debug)]
/// Errors raised by the library.
pub enum OError {
    #[error("The following error occurred: {0}")]
    Generic(String),
    #[error("Invalid configuration: {0}")]
    Configuration(String),
    #[error("You must provide at least one objective to properly define a problem")]
    NoObjective,
    #[error("The {0} type named '{1}' already exist")]
    DuplicatedName(String, String),
    #[error("The {0} index {1} does not exist")]
    NonExistingIndex(String, usize),
    #[error("The data named {0} is not set on the individual")]
    WrongDataName(String),
    #[error("The data type is not {0}")]
    WrongDataType(String),
    #[error("An error occurred in the comparison operator '{0}': {1}")]
    ComparisonOperator(String, String),
    #[error("An error occurred in the selector operator '{0}': {1}")]
    SelectorOperator(String, String),
    #[error("An error occurred in the crossover operator '{0}': {1}")]
    CrossoverOperator(String, String),
    #[error("An error occurred in the mutation operator '{0}': {1}")]
    MutationOperator(String, String),
    #[error("An error occurred in the survival operator '{0}': {1}")]
    SurvivalOperator(String, String),
    #[error("The hyper-plane through the extreme points is degenerate: {0}")]
    DegenerateHyperplane(String),
    #[error("An error occurred when evaluating a solution: {0}")]
    Evaluation(String),
    #[error("An error occurred when initialising {0}: {1}")]
    AlgorithmInit(String, String),
    #[error("An error occurred when running {0}: {1}")]
    AlgorithmRun(String, String),
    #[error("An error occurred when exporting the algorithm data: {0}")]
    AlgorithmExport(String),
    #[error("NaN detected when adding {0} '{1}'. This may be an error in the user-defined evaluation function")]
    NaN(String, String),
    #[error("The {0} '{1}' is {2}. This may be an error in the user-defined evaluation function")]
    NonFinite(String, String, f64),
}

impl OError {
    /// Whether the error was caused by a failing or invalid evaluation of a single solution.
    /// These errors are recovered by the algorithms by regenerating the offending individual.
    ///
    /// return: `bool`
    pub fn is_evaluation_failure(&self) -> bool {
        matches!(
            self,
            OError::Evaluation(_) | OError::NaN(_, _) | OError::NonFinite(_, _, _)
        )
    }
}
