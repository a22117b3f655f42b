pub mod disk;
pub mod interpreter;
pub mod loader;
pub mod program;

pub use disk::Disk;
pub use interpreter::{Interpreter, ScriptInterpreter};
pub use program::Program;
