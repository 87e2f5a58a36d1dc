//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `hbnb_core` wiring.
//! - Keep output deterministic apart from generated ids and timestamps.

use hbnb_core::{in_memory_service, init_from_config, CoreConfig};
use std::process::ExitCode;

fn main() -> ExitCode {
    let config = match CoreConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("hbnb_cli config error: {err}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(err) = init_from_config(&config) {
        eprintln!("hbnb_cli logging error: {err}");
        return ExitCode::FAILURE;
    }

    println!("hbnb_core version={}", hbnb_core::core_version());
    println!("hbnb_core profile={}", config.profile.as_str());

    let service = in_memory_service(&config);
    if let Err(err) = service.create_user("John", "Doe", "john.doe@example.com", "password123") {
        eprintln!("hbnb_cli demo user rejected: {}", err.messages().join("; "));
        return ExitCode::FAILURE;
    }
    log::info!("event=cli_smoke module=cli status=ok");

    match serde_json::to_string_pretty(&service.list_users()) {
        Ok(rendered) => {
            println!("{rendered}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("hbnb_cli serialization error: {err}");
            ExitCode::FAILURE
        }
    }
}
