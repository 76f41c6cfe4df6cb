use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::Serialize;

use crate::core::OError;

/// The destination of the intermediate results of an algorithm. After the initial population is
/// evaluated (generation `0`) and after each generation, the algorithm reports the objective
/// values of the first non-dominated front of its population. Values have the sign set on the
/// problem objectives.
pub trait ResultsSink {
    /// Receive the best objectives at a generation.
    ///
    /// # Arguments
    ///
    /// * `generation`: The generation number.
    /// * `best_objectives`: The objective vectors of the non-dominated individuals.
    ///
    /// returns: `Result<(), OError>`
    fn report(&mut self, generation: usize, best_objectives: &[Vec<f64>]) -> Result<(), OError>;
}

/// Log the number of non-dominated individuals at each generation.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl ResultsSink for LogSink {
    fn report(&mut self, generation: usize, best_objectives: &[Vec<f64>]) -> Result<(), OError> {
        info!(
            "Generation #{generation} - {} non-dominated individuals",
            best_objectives.len()
        );
        debug!("Non-dominated objectives {:?}", best_objectives);
        Ok(())
    }
}

/// Keep all the reports in memory.
#[derive(Debug, Default, Clone)]
pub struct HistorySink {
    history: Vec<(usize, Vec<Vec<f64>>)>,
}

impl HistorySink {
    /// Create an empty history.
    ///
    /// returns: `HistorySink`
    pub fn new() -> Self {
        Self::default()
    }

    /// The generation numbers and objectives in the order they were reported.
    ///
    /// returns: `&[(usize, Vec<Vec<f64>>)]`
    pub fn history(&self) -> &[(usize, Vec<Vec<f64>>)] {
        &self.history
    }

    /// The last report, if any.
    ///
    /// returns: `Option<&(usize, Vec<Vec<f64>>)>`
    pub fn last(&self) -> Option<&(usize, Vec<Vec<f64>>)> {
        self.history.last()
    }
}

impl ResultsSink for HistorySink {
    fn report(&mut self, generation: usize, best_objectives: &[Vec<f64>]) -> Result<(), OError> {
        self.history.push((generation, best_objectives.to_vec()));
        Ok(())
    }
}

/// The content of a file written by [`JsonFileSink`].
#[derive(Serialize, Debug)]
struct GenerationReport<'a> {
    generation: usize,
    exported_on: DateTime<Utc>,
    best_objectives: &'a [Vec<f64>],
}

/// Save the reports to JSON files named `<prefix>_gen<generation>.json`, each time the generation
/// counter increases by `generation_step`.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    /// Write a file each time the generation counter increases by this step.
    generation_step: usize,
    /// The folder where the files are saved.
    destination: PathBuf,
    /// The file name prefix.
    prefix: String,
}

impl JsonFileSink {
    /// Initialise the sink. This returns an error if the destination folder does not exist or the
    /// step is `0`.
    ///
    /// # Arguments
    ///
    /// * `generation_step`: Export the data each time the generation counter increases by this
    ///    step.
    /// * `destination`: The folder where to save the JSON files.
    /// * `prefix`: The file name prefix.
    ///
    /// returns: `Result<JsonFileSink, OError>`
    pub fn new(generation_step: usize, destination: &str, prefix: &str) -> Result<Self, OError> {
        if generation_step == 0 {
            return Err(OError::Configuration(
                "The generation step of the JSON sink must be at least 1".to_string(),
            ));
        }
        let destination = PathBuf::from(destination);
        if !destination.exists() {
            return Err(OError::Generic(format!(
                "The destination folder '{:?}' does not exist",
                destination
            )));
        }
        Ok(Self {
            generation_step,
            destination,
            prefix: prefix.to_string(),
        })
    }

    /// The path of the file written at `generation`.
    ///
    /// # Arguments
    ///
    /// * `generation`: The generation number.
    ///
    /// returns: `PathBuf`
    pub fn file_path(&self, generation: usize) -> PathBuf {
        self.destination
            .join(format!("{}_gen{}.json", self.prefix, generation))
    }
}

impl ResultsSink for JsonFileSink {
    fn report(&mut self, generation: usize, best_objectives: &[Vec<f64>]) -> Result<(), OError> {
        if generation % self.generation_step != 0 {
            return Ok(());
        }
        let report = GenerationReport {
            generation,
            exported_on: Utc::now(),
            best_objectives,
        };
        let data = serde_json::to_string_pretty(&report).map_err(|e| {
            OError::AlgorithmExport(format!(
                "The following error occurred while converting the report: {e}"
            ))
        })?;

        let file = self.file_path(generation);
        info!("Saving JSON file {:?}", file);
        fs::write(file, data).map_err(|e| {
            OError::AlgorithmExport(format!(
                "The following error occurred while exporting the JSON file: {e}",
            ))
        })
    }
}

impl<F: FnMut(usize, &[Vec<f64>])> ResultsSink for F {
    fn report(&mut self, generation: usize, best_objectives: &[Vec<f64>]) -> Result<(), OError> {
        self(generation, best_objectives);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use std::env;
    use std::fs;

    use crate::algorithms::{HistorySink, JsonFileSink, ResultsSink};

    #[test]
    fn test_history_sink() {
        let mut sink = HistorySink::new();
        sink.report(0, &[vec![1.0, 2.0]]).unwrap();
        sink.report(1, &[vec![0.5, 2.0], vec![1.0, 1.0]]).unwrap();
        assert_eq!(sink.history().len(), 2);
        assert_eq!(sink.last().unwrap().0, 1);
        assert_eq!(sink.last().unwrap().1.len(), 2);
    }

    #[test]
    fn test_closure_sink() {
        let mut generations = Vec::new();
        {
            let mut sink = |generation: usize, _: &[Vec<f64>]| generations.push(generation);
            sink.report(0, &[]).unwrap();
            sink.report(3, &[]).unwrap();
        }
        assert_eq!(generations, vec![0, 3]);
    }

    #[test]
    /// Files are only written at multiples of the generation step.
    fn test_json_sink() {
        let destination = env::temp_dir();
        let prefix = format!("binsga3_sink_{}", std::process::id());
        let mut sink =
            JsonFileSink::new(2, destination.to_str().unwrap(), prefix.as_str()).unwrap();

        sink.report(1, &[vec![1.0, 2.0]]).unwrap();
        assert!(!sink.file_path(1).exists());

        sink.report(2, &[vec![1.0, 2.0]]).unwrap();
        let file = sink.file_path(2);
        let content: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&file).unwrap()).unwrap();
        assert_eq!(content["generation"], 2);
        assert_eq!(content["best_objectives"][0][1], 2.0);
        assert!(content["exported_on"].is_string());
        fs::remove_file(file).unwrap();
    }

    #[test]
    fn test_json_sink_errors() {
        assert!(JsonFileSink::new(0, ".", "x").is_err());
        assert!(JsonFileSink::new(1, "/a/folder/that/does/not/exist", "x").is_err());
    }
}
