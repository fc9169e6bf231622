use std::process::ExitCode;

fn main() -> ExitCode {
    match physevol::app::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("physevol: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}
