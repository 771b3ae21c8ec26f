use clap::Parser;
use setpm::cli::SetpmCli;
use setpm::commands::{SetOptions, execute_set};
use setpm::resolver::ManagerResolver;
use std::io::{IsTerminal, Write};

#[tokio::main]
async fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        #[allow(clippy::print_stderr)]
        {
            eprintln!("setpm panicked: {panic_info}");
            eprintln!("Internal error occurred. Run with RUST_LOG=debug for more information.");
        }
    }));

    if let Err(error) = run().await {
        #[allow(clippy::print_stderr)]
        {
            eprintln!("{error:?}");
        }
        std::process::exit(1);
    }
}

async fn run() -> miette::Result<()> {
    let cli = SetpmCli::parse();
    setpm::tracing::init_tracing(cli.log.tracing_config())?;

    let _span = setpm::command_span!("setpm", dry_run = cli.dry_run).entered();

    let start = match cli.cd {
        Some(dir) => dir,
        None => std::env::current_dir()
            .map_err(|e| miette::miette!("Failed to read the working directory: {e}"))?,
    };
    let interactive = std::io::stdout().is_terminal();

    let resolver = ManagerResolver::new(&cli.registry.resolver_config())?.interactive(interactive);
    let options = SetOptions {
        specifier: cli.specifier,
        start,
        dry_run: cli.dry_run,
    };
    let outcome = execute_set(&options, &resolver).await?;

    let mut stdout = std::io::stdout().lock();
    let printed = if !outcome.written {
        writeln!(stdout, "{}", outcome.resolved)
    } else if interactive {
        writeln!(stdout, "Set packageManager to {}", outcome.resolved)
    } else {
        Ok(())
    };
    printed.map_err(|e| miette::miette!("Failed to write output: {e}"))?;

    Ok(())
}
