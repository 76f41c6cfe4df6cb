pub use fast_non_dominated_sort::{
    fast_non_dominated_sort, non_dominated_front, NonDominatedSortResults, RANK,
};
pub use reference_points::{DasDarren1998, NumberOfPartitions, TwoLayerPartitions};
pub use vectors::{all_close, argmin, argmin_by, vector_max, vector_min};

mod fast_non_dominated_sort;
mod reference_points;
mod vectors;
