use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use rvcc::{cli::Cli, CompileError, Diagnostics};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let program = std::env::args().next().unwrap_or_else(|| "rvcc".into());
    let cli = Cli::parse();

    let src = match cli.source(&program) {
        Ok(src) => src,
        Err(e) => return fail(&Diagnostics::new(""), &e),
    };
    let diag = Diagnostics::new(src);

    match run(&cli, src) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => fail(&diag, &e),
    }
}

fn run(cli: &Cli, src: &str) -> Result<(), CompileError> {
    let out = cli.render(src)?;
    match &cli.output {
        Some(path) => std::fs::write(path, out)?,
        None => std::io::stdout().lock().write_all(out.as_bytes())?,
    }
    Ok(())
}

fn fail(diag: &Diagnostics, err: &CompileError) -> ExitCode {
    tracing::debug!(?err, "compilation failed");
    diag.report(err, &mut std::io::stderr().lock()).ok();
    ExitCode::FAILURE
}
