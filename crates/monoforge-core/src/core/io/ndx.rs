use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use thiserror::Error;

const INDICES_PER_LINE: usize = 15;

/// A named set of atoms. Indices are 0-based positions in output order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexGroup {
    pub name: String,
    pub indices: Vec<usize>,
}

/// Ordered collection of index groups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexGroups {
    groups: Vec<IndexGroup>,
}

impl IndexGroups {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, indices: Vec<usize>) {
        self.groups.push(IndexGroup {
            name: name.into(),
            indices,
        });
    }

    pub fn get(&self, name: &str) -> Option<&IndexGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &IndexGroup> {
        self.groups.iter()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum NdxError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },
}

/// GROMACS index file (`.ndx`). On disk indices are 1-based.
pub struct NdxFile;

impl NdxFile {
    pub fn write_to(groups: &IndexGroups, writer: &mut impl Write) -> io::Result<()> {
        for group in groups.iter() {
            writeln!(writer, "[ {} ]", group.name)?;
            for chunk in group.indices.chunks(INDICES_PER_LINE) {
                let line: Vec<String> = chunk.iter().map(|i| format!("{:>4}", i + 1)).collect();
                writeln!(writer, "{}", line.join(" "))?;
            }
            writeln!(writer)?;
        }
        Ok(())
    }

    pub fn write_to_path<P: AsRef<Path>>(groups: &IndexGroups, path: P) -> io::Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_to(groups, &mut writer)?;
        writer.flush()
    }

    pub fn read_from(reader: &mut impl BufRead) -> Result<IndexGroups, NdxError> {
        let mut groups = IndexGroups::new();
        for (line_num, line) in reader.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with(';') {
                continue;
            }
            if let Some(header) = trimmed.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
                groups.push(header.trim(), Vec::new());
                continue;
            }
            let group = groups.groups.last_mut().ok_or_else(|| NdxError::Parse {
                line: line_num + 1,
                message: "indices before the first group header".to_string(),
            })?;
            for token in trimmed.split_whitespace() {
                let index: usize = token.parse().map_err(|_| NdxError::Parse {
                    line: line_num + 1,
                    message: format!("invalid index '{}'", token),
                })?;
                if index == 0 {
                    return Err(NdxError::Parse {
                        line: line_num + 1,
                        message: "indices are 1-based".to_string(),
                    });
                }
                group.indices.push(index - 1);
            }
        }
        Ok(groups)
    }

    pub fn read_from_path<P: AsRef<Path>>(path: P) -> Result<IndexGroups, NdxError> {
        let file = File::open(path)?;
        Self::read_from(&mut BufReader::new(file))
    }
}
