use clap::Parser;
use setpm::cli::FindRootCli;
use setpm::commands::execute_find_root;
use std::io::Write;

fn main() {
    if let Err(error) = run() {
        #[allow(clippy::print_stderr)]
        {
            eprintln!("{error:?}");
        }
        std::process::exit(1);
    }
}

fn run() -> miette::Result<()> {
    let cli = FindRootCli::parse();
    setpm::tracing::init_tracing(cli.log.tracing_config())?;

    let _span = setpm::command_span!("find-root-package-json").entered();

    let start = match cli.path {
        Some(path) => path,
        None => std::env::current_dir()
            .map_err(|e| miette::miette!("Failed to read the working directory: {e}"))?,
    };
    let manifest = execute_find_root(&start)?;

    writeln!(std::io::stdout().lock(), "{}", manifest.display())
        .map_err(|e| miette::miette!("Failed to write output: {e}"))?;
    Ok(())
}
