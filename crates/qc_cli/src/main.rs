use std::process::ExitCode;

fn main() -> ExitCode {
    qc_cli::run()
}
