use std::collections::HashMap;

use crate::error::ExecError;

pub const MEMORY_SIZE: usize = 1000;

/// Key-value variable store used by running scripts.
#[derive(Debug, Default)]
pub struct Memory {
    variables: HashMap<String, String>,
}

impl Memory {
    pub fn new() -> Memory {
        Memory {
            variables: HashMap::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(String::as_str)
    }

    /// Assigns `value` to `name`, overwriting any previous value. New names are
    /// rejected once the store holds `MEMORY_SIZE` variables.
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), ExecError> {
        if let Some(existing) = self.variables.get_mut(name) {
            *existing = value.to_string();
            return Ok(());
        }

        if self.get_remaining_memory() == 0 {
            return Err(ExecError::VariableStoreFull);
        }

        self.variables.insert(name.to_string(), value.to_string());
        Ok(())
    }

    pub fn get_remaining_memory(&self) -> usize {
        MEMORY_SIZE - self.variables.len()
    }
}
