use std::process::ExitCode;
use std::time::Duration;

use grantdesk_core::backend::MockBackend;
use grantdesk_core::cli::output::{self, OutputPreferences};
use grantdesk_core::cli::{run_cli, AppContext};
use grantdesk_core::config::ConfigManager;
use grantdesk_core::errors::GrantError;

fn main() -> ExitCode {
    grantdesk_core::init();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output::print_error(err);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), GrantError> {
    let config_manager = ConfigManager::new()?;
    let config = config_manager.load()?;

    output::set_preferences(OutputPreferences {
        quiet_mode: config.quiet_mode,
        plain_output: config.plain_output,
    });

    let backend = MockBackend::with_sample_data()
        .with_latency(Duration::from_millis(config.mock_latency_ms));

    let mut context = AppContext {
        backend,
        config,
        config_manager,
    };
    run_cli(&mut context)
}
