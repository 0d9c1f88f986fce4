use clap::Parser;
use filevault::cli::{Cli, Commands};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Diagnostics go to stderr; `RUST_LOG` overrides the default `warn` level.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .with(filter)
        .init();
}

fn main() {
    init_logging();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Add { ref file } => filevault::cli::commands::add::execute(&cli, file),
        Commands::Export { ref id, ref output } => {
            filevault::cli::commands::export::execute(&cli, id, output)
        }
        Commands::Remove { ref id, force } => {
            filevault::cli::commands::remove::execute(&cli, id, force)
        }
        Commands::List => filevault::cli::commands::list::execute(&cli),
        Commands::Show { ref id } => filevault::cli::commands::show::execute(&cli, id),
        #[cfg(feature = "audit-log")]
        Commands::Audit {
            last,
            ref since,
            ref entry,
            ref op,
            failed,
        } => filevault::cli::commands::audit_cmd::execute(
            &cli,
            &filevault::cli::commands::audit_cmd::AuditArgs {
                last,
                since: since.as_deref(),
                entry: entry.as_deref(),
                op: op.as_deref(),
                failed,
            },
        ),
    };

    if let Err(e) = result {
        filevault::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}
