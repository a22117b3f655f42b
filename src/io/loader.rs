use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::info;

use super::disk::DISK_SIZE;
use super::{Disk, Program};
use crate::error::LoadError;

/// Replaces everything on disk with the script at `path`.
pub fn load_program(disk: &mut Disk, path: &Path) -> Result<Program, LoadError> {
    disk.clear();
    append_program(disk, path)
}

/// Stores the script at `path` after the programs already on disk.
pub fn append_program(disk: &mut Disk, path: &Path) -> Result<Program, LoadError> {
    let lines = read_lines(path)?;

    let program = disk.write_program(lines).ok_or_else(|| LoadError::OutOfSpace {
        path: path.to_path_buf(),
        capacity: DISK_SIZE,
    })?;

    info!(
        "Loaded {} lines from {} at index {} ({} lines free)",
        program.length,
        path.display(),
        program.start_index,
        disk.get_remaining_space()
    );

    Ok(program)
}

fn read_lines(path: &Path) -> Result<Vec<String>, LoadError> {
    let io_error = |source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(io_error)?;
    let reader = BufReader::new(file);

    let mut lines = Vec::new();
    for line in reader.lines() {
        let mut line = line.map_err(io_error)?;
        if line.ends_with('\r') {
            line.pop();
        }
        lines.push(line);
    }

    Ok(lines)
}
