//! CLI integration test modules

mod binary;
mod toml_config;

use std::process::{Command, Output};

/// Run the binary with logging silenced unless the test asks otherwise
pub fn run_subpool(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_subpool"))
        .args(args)
        .env("NO_COLOR", "1")
        .output()
        .expect("Should be able to execute subpool binary")
}
