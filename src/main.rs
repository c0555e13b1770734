use std::process::ExitCode;

fn main() -> ExitCode {
    ado_history::cli::run()
}
