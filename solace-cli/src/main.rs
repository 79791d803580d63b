//! Entry point for the `solace` command-line interface.
#![forbid(unsafe_code)]

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    if let Err(err) = solace_cli::run() {
        report(&err);
        std::process::exit(1);
    }
}

#[expect(
    clippy::print_stderr,
    reason = "the binary reports fatal errors on standard error"
)]
fn report(err: &solace_cli::CliError) {
    eprintln!("solace: {err}");
}
