use desk_core::observability::init_tracing;
use dotenvy::dotenv;
use pdf_desk::config::get_configuration;
use pdf_desk::handlers::{self, Command, USAGE};
use pdf_desk::startup::build_state;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();

    let command = match Command::parse(std::env::args().skip(1)) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("{}\n\n{}", e, USAGE);
            return ExitCode::from(2);
        }
    };

    let configuration = match get_configuration() {
        Ok(configuration) => configuration,
        Err(e) => {
            eprintln!("Failed to read configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_tracing(
        "pdf-desk",
        &configuration.telemetry.log_level,
        configuration.telemetry.otlp_endpoint.as_deref(),
    ) {
        eprintln!("Failed to initialize tracing: {}", e);
    }

    let state = match build_state(&configuration) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build client state");
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match handlers::run(command, &state, &configuration).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
