use std::io::Write;
use std::sync::Mutex;

use log::warn;

use crate::error::ExecError;
use crate::kernel::Memory;

/// Executes one line of script text on behalf of a running process.
///
/// Shared by every worker in multi-worker mode, so implementations guard
/// their own state.
pub trait Interpreter: Send + Sync {
    fn execute(&self, instruction: &str) -> Result<(), ExecError>;
}

/// Small interpreter understanding `set`, `print` and `echo`.
pub struct ScriptInterpreter<W> {
    memory: Mutex<Memory>,
    output: Mutex<W>,
}

impl<W: Write + Send> ScriptInterpreter<W> {
    pub fn new(output: W) -> ScriptInterpreter<W> {
        ScriptInterpreter {
            memory: Mutex::new(Memory::new()),
            output: Mutex::new(output),
        }
    }

    pub fn get_variable(&self, name: &str) -> Option<String> {
        let memory = self.memory.lock().expect("Memory mutex poisoned");
        memory.get(name).map(str::to_string)
    }

    pub fn into_output(self) -> W {
        self.output.into_inner().expect("Output mutex poisoned")
    }

    fn set(&self, args: &[&str]) -> Result<(), ExecError> {
        let [name, value @ ..] = args else {
            return Err(ExecError::BadArguments("set".to_string()));
        };
        if value.is_empty() {
            return Err(ExecError::BadArguments("set".to_string()));
        }

        let mut memory = self.memory.lock().expect("Memory mutex poisoned");
        memory.set(name, &value.join(" "))
    }

    fn print(&self, args: &[&str]) -> Result<(), ExecError> {
        let [name] = args else {
            return Err(ExecError::BadArguments("print".to_string()));
        };

        let value = self
            .get_variable(name)
            .ok_or_else(|| ExecError::VariableNotFound(name.to_string()))?;
        self.write_line(&value);
        Ok(())
    }

    fn echo(&self, args: &[&str]) -> Result<(), ExecError> {
        let [token] = args else {
            return Err(ExecError::BadArguments("echo".to_string()));
        };

        match token.strip_prefix('$') {
            Some(name) => {
                let value = self.get_variable(name).unwrap_or_default();
                self.write_line(&value);
            }
            None => self.write_line(token),
        }
        Ok(())
    }

    fn write_line(&self, line: &str) {
        let mut output = self.output.lock().expect("Output mutex poisoned");
        if let Err(err) = writeln!(output, "{line}") {
            warn!("Failed to write script output: {err}");
        }
    }
}

impl<W: Write + Send> Interpreter for ScriptInterpreter<W> {
    fn execute(&self, instruction: &str) -> Result<(), ExecError> {
        let tokens: Vec<&str> = instruction.split_whitespace().collect();

        match tokens.as_slice() {
            [] => Ok(()),
            ["set", args @ ..] => self.set(args),
            ["print", args @ ..] => self.print(args),
            ["echo", args @ ..] => self.echo(args),
            [command, ..] => Err(ExecError::UnknownCommand(command.to_string())),
        }
    }
}
