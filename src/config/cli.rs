use crate::utils::error::Result;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

/// Where the `list` action writes its links: `-` means stdout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Stdout,
    File(PathBuf),
}

impl OutputTarget {
    pub fn from_arg(arg: &str) -> Self {
        if arg.is_empty() || arg == "-" {
            OutputTarget::Stdout
        } else {
            OutputTarget::File(PathBuf::from(arg))
        }
    }

    pub fn open(&self) -> Result<Box<dyn Write>> {
        Ok(match self {
            OutputTarget::Stdout => Box::new(io::stdout().lock()),
            OutputTarget::File(path) => Box::new(BufWriter::new(File::create(path)?)),
        })
    }

    /// Writes each line followed by a newline, truncating an existing file.
    pub fn write_lines(&self, lines: &[String]) -> Result<()> {
        let mut writer = self.open()?;
        for line in lines {
            writeln!(writer, "{}", line)?;
        }
        writer.flush()?;
        Ok(())
    }
}
