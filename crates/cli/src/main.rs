use std::process::ExitCode;

fn main() -> ExitCode {
    twinbot_cli::run()
}
