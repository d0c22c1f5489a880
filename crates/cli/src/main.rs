use std::process::ExitCode;

fn main() -> ExitCode {
    bluelight_cli::run()
}
