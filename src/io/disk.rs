use super::Program;

pub const DISK_SIZE: usize = 1000;
pub const MAX_LINE_LENGTH: usize = 100;

/// Contiguous store of program lines shared by every loaded script.
#[derive(Debug, Default)]
pub struct Disk {
    lines: Vec<String>,
}

impl Disk {
    pub fn new() -> Disk {
        Disk { lines: Vec::new() }
    }

    /// Returns the instruction `program_counter` lines into the program at `start_index`.
    pub fn fetch(&self, start_index: usize, program_counter: usize) -> Option<&str> {
        self.lines
            .get(start_index.checked_add(program_counter)?)
            .map(String::as_str)
    }

    /// Appends a program after the lines already stored. Nothing is written
    /// if the whole program does not fit.
    pub fn write_program<I>(&mut self, lines: I) -> Option<Program>
    where
        I: IntoIterator<Item = String>,
    {
        let start_index = self.lines.len();

        for mut line in lines {
            if self.lines.len() == DISK_SIZE {
                self.lines.truncate(start_index);
                return None;
            }

            if let Some((cut, _)) = line.char_indices().nth(MAX_LINE_LENGTH) {
                line.truncate(cut);
            }
            self.lines.push(line);
        }

        Some(Program {
            start_index,
            length: self.lines.len() - start_index,
        })
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn get_line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn get_remaining_space(&self) -> usize {
        DISK_SIZE - self.lines.len()
    }
}
