//! NSGA-III (Deb & Jain, 2014) for many-objective problems whose solutions are fixed-length
//! vectors of bits.
//!
//! - [`core`]: the problem definition, the binary genome, individuals and populations.
//! - [`operators`]: parent selection, crossover and bit-flip mutation.
//! - [`utils`]: reference points, non-dominated sorting and vector helpers.
//! - [`algorithms`]: the [`algorithms::NSGA3`] algorithm with its run loop, stopping condition,
//!   cancellation signal and results sinks.
pub mod algorithms;
pub mod core;
pub mod operators;
pub mod utils;
