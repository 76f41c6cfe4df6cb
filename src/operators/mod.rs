pub use comparison::{BinaryComparisonOperator, ParetoDominance, PreferredSolution};
pub use crossover::{
    Crossover, CrossoverChildren, CrossoverOperatorOptions, SinglePointCrossover,
    UniformCrossover,
};
pub use mutation::{BitFlipMutation, BitFlipMutationArgs, Mutation};
pub use selector::{RandomSelector, Selector};

mod comparison;
mod crossover;
mod mutation;
mod selector;
