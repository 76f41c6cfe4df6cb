use serde::{Deserialize, Serialize};

/// Trait to define a condition that causes an algorithm to terminate.
pub trait StoppingCondition<T: PartialOrd> {
    /// The target value of the stopping condition.
    fn target(&self) -> T;

    /// Whether the stopping condition is met.
    fn is_met(&self, current: T) -> bool {
        self.target() <= current
    }

    /// A name describing the stopping condition.
    fn name() -> String;
}

/// Number of generations after which a genetic algorithm terminates.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct MaxGeneration(pub usize);

impl StoppingCondition<usize> for MaxGeneration {
    fn target(&self) -> usize {
        self.0
    }

    fn name() -> String {
        "maximum number of generations".to_string()
    }
}

#[cfg(test)]
mod test {
    use crate::algorithms::{MaxGeneration, StoppingCondition};

    #[test]
    fn test_max_generation() {
        let condition = MaxGeneration(10);
        assert!(!condition.is_met(0));
        assert!(!condition.is_met(9));
        assert!(condition.is_met(10));
        assert!(condition.is_met(11));
    }
}
