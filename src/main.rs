use std::process::ExitCode;

fn main() -> ExitCode {
    let code = demand_forecast::app::run(std::env::args(), std::io::stdin().lock(), std::io::stdout().lock());
    ExitCode::from(code)
}
