use binsga3::core::OError;
use binsga3::utils::{DasDarren1998, NumberOfPartitions, TwoLayerPartitions};

/// Generate the reference points for an 8-objective problem using the two-layer approach of
/// Deb & Jain (2014). With one layer of 3 gaps only points on the boundary of the simplex would
/// be created; the inner layer with 2 gaps adds points in the middle of the hyper-plane.
fn main() -> Result<(), OError> {
    let number_of_objectives = 8;
    let number_of_partitions = NumberOfPartitions::TwoLayers(TwoLayerPartitions {
        boundary_layer: 3,
        inner_layer: 2,
        scaling: None,
    });

    let m = DasDarren1998::new(number_of_objectives, &number_of_partitions)?;
    // 120 points in the boundary layer and 36 in the inner layer
    println!("Total points = {:?}", m.number_of_points());

    let weights = m.get_weights();
    for point in weights.iter().take(5) {
        println!("{:?} (sum = {})", point, point.iter().sum::<f64>());
    }

    let suggested = NumberOfPartitions::suggested(number_of_objectives);
    println!("Suggested partitions for {number_of_objectives} objectives: {:?}", suggested);
    assert_eq!(suggested, number_of_partitions);

    Ok(())
}
