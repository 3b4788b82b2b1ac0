use std::process::ExitCode;

fn main() -> ExitCode {
    portfolio_term::lib_main()
}
