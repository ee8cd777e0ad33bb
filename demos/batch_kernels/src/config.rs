use std::path::Path;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use imgbatch::imgproc::parallel::{ExecutionContext, ExecutionMode, ExecutionStrategy};

/// How the batch is executed, as given on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeArg {
    Local,
    Serial,
    Partitioned,
}

impl FromStr for ModeArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local" => Ok(ModeArg::Local),
            "serial" => Ok(ModeArg::Serial),
            "partitioned" => Ok(ModeArg::Partitioned),
            _ => Err(format!(
                "unknown mode {s:?}, expected local, serial or partitioned"
            )),
        }
    }
}

impl ModeArg {
    pub fn context(self, workers: usize) -> ExecutionContext {
        let mode = match self {
            ModeArg::Local => ExecutionMode::Local(ExecutionStrategy::ParallelRows),
            ModeArg::Serial => ExecutionMode::Local(ExecutionStrategy::Serial),
            ModeArg::Partitioned => ExecutionMode::Partitioned {
                partitions: workers,
            },
        };
        ExecutionContext::new(mode)
    }
}

/// Kernel parameters collected from an optional JSON file and command line overrides.
#[derive(Debug, Default)]
pub struct ParamsBuilder {
    values: Map<String, Value>,
}

impl ParamsBuilder {
    /// Start from the parameters of a JSON file, or from nothing.
    pub fn from_file(path: Option<&Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let file = std::fs::File::open(path)?;
        let values = serde_json::from_reader(std::io::BufReader::new(file))?;
        log::debug!("loaded kernel parameters from {}", path.display());
        Ok(Self { values })
    }

    /// Override a parameter when it was given on the command line.
    pub fn set<T: Into<Value>>(mut self, name: &str, value: Option<T>) -> Self {
        if let Some(value) = value {
            self.values.insert(name.to_string(), value.into());
        }
        self
    }

    /// Build the typed parameter set; missing parameters are reported by name.
    pub fn build<P: DeserializeOwned>(self) -> Result<P, serde_json::Error> {
        serde_json::from_value(Value::Object(self.values))
    }
}
