use autoapprove_mcp::app;
use autoapprove_mcp::commands::Cli;
use std::process::ExitCode;

fn main() -> ExitCode {
    // No tokio runtime here: `--daemon` may fork before the session starts one
    let cli = Cli::parse_args();
    match app::run(cli) {
        Ok(outcome) => ExitCode::from(outcome.exit_code()),
        Err(err) => {
            eprintln!("{:#}", err);
            ExitCode::from(1)
        }
    }
}
