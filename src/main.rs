//! Binary entrypoint for the FitBot server.

use std::process::ExitCode;

use fitbot_agent::start_fitbot;

/// Load configuration from the environment and serve the API.
fn main() -> ExitCode {
    start_fitbot::run()
}
