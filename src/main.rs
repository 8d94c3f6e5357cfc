use color_eyre::Result;
use confab::cli::{self, CliCommand, VERSION};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing() {
    // stdout carries the conversation, so logs go to stderr
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "confab=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let command = match cli::parse_args(std::env::args()) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("confab: {}\n\n{}", e, cli::USAGE);
            std::process::exit(2);
        }
    };

    // Handle --version before any initialization
    if command == CliCommand::Version {
        println!("confab {}", VERSION);
        return Ok(());
    }

    color_eyre::install()?;
    init_tracing();

    cli::run(command).await
}
