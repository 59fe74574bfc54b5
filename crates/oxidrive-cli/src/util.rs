use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

use anyhow::Context;
use oxidrive_engine::SimulationConfig;
use tracing_subscriber::EnvFilter;

/// Destination of a JSON document: a file when a path is given, stdout otherwise.
pub struct Output {
    writer: Box<dyn Write>,
    name: String,
}

impl Output {
    pub fn save_json<T>(value: &T, output_path: Option<&Path>) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        Output::create(output_path)?.write_json(value)
    }

    pub fn create(output_path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = output_path else {
            return Ok(Output {
                writer: Box::new(io::stdout().lock()),
                name: "stdout".to_owned(),
            });
        };
        let file = File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Ok(Output {
            writer: Box::new(BufWriter::new(file)),
            name: path.display().to_string(),
        })
    }

    pub fn write_json<T>(&mut self, value: &T) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        serde_json::to_writer_pretty(&mut self.writer, value)
            .with_context(|| format!("Failed to write JSON to {}", self.name))?;
        writeln!(self.writer)
            .and_then(|()| self.writer.flush())
            .with_context(|| format!("Failed to finish writing {}", self.name))?;
        Ok(())
    }
}

pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {} file: {}", file_kind, path.display()))?;

    let reader = io::BufReader::new(file);
    let value = serde_json::from_reader(reader).with_context(|| {
        format!(
            "Failed to parse {} JSON file: {}",
            file_kind,
            path.display()
        )
    })?;

    Ok(value)
}

/// Reads a simulation config override, or returns the defaults when no path is given.
///
/// Fields missing from the file keep their default values.
pub fn read_config_file(path: Option<&Path>) -> anyhow::Result<SimulationConfig> {
    match path {
        Some(path) => read_json_file("simulation config", path),
        None => Ok(SimulationConfig::default()),
    }
}

/// Installs the stderr log subscriber for headless commands.
///
/// The filter comes from `RUST_LOG` and defaults to `info`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}
