//! JSONL writer for simulation results.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::metrics::GameRecord;

pub struct OutputWriter {
    writer: BufWriter<File>,
    path: PathBuf,
}

impl OutputWriter {
    pub fn new(output_dir: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let dir = Path::new(output_dir);
        std::fs::create_dir_all(dir)?;

        let timestamp = time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Iso8601::DEFAULT)
            .unwrap_or_else(|_| "unknown".to_string())
            .replace(':', "-");

        let path = dir.join(format!("simulation_{timestamp}.jsonl"));
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)?;

        Ok(Self {
            writer: BufWriter::new(file),
            path,
        })
    }

    pub fn write_game(&mut self, record: &GameRecord) -> Result<(), Box<dyn std::error::Error>> {
        let json = serde_json::to_string(record)?;
        writeln!(self.writer, "{json}")?;
        Ok(())
    }

    pub fn finish(mut self) -> Result<PathBuf, Box<dyn std::error::Error>> {
        self.writer.flush()?;
        Ok(self.path)
    }
}
