use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use script_scheduler::config::SimulatorConfig;
use script_scheduler::io::ScriptInterpreter;
use script_scheduler::kernel::Driver;

fn main() -> anyhow::Result<()> {
    let config = SimulatorConfig::parse();

    env_logger::Builder::new()
        .filter_level(config.log_level())
        .parse_default_env()
        .init();

    let interpreter = Arc::new(ScriptInterpreter::new(std::io::stdout()));
    let mut driver = Driver::new(config, interpreter);

    let report = driver.start().context("Failed to run the scheduler")?;
    println!("{report}");

    Ok(())
}
