pub use algorithm::{
    Algorithm, AlgorithmExport, AlgorithmSerialisedExport, Elapsed, RunState, TerminationReason,
};
pub use cancellation::{CancellationSignal, CancellationToken, NeverCancelled};
pub use nsga3::{
    NSGA3Arg, Nsga3NumberOfIndividuals, MIN_DISTANCE, NORMALISED_OBJECTIVE_KEY, NSGA3, REF_POINT,
    REF_POINT_INDEX,
};
pub use results_sink::{HistorySink, JsonFileSink, LogSink, ResultsSink};
pub use stopping_condition::{MaxGeneration, StoppingCondition};

mod algorithm;
mod cancellation;
mod nsga3;
mod results_sink;
mod stopping_condition;
