use std::process::ExitCode;

fn main() -> ExitCode {
    codexplain::cli::run()
}
