//! Command-line front end.
//!
//! ```ignore
//! use confab::cli::{parse_args, run, CliCommand};
//!
//! match parse_args(std::env::args())? {
//!     CliCommand::Version => println!("confab {}", confab::cli::VERSION),
//!     command => run(command).await?,
//! }
//! ```

pub mod args;
pub mod repl;

pub use args::{parse_args, ArgsError, CliCommand, CliOptions, USAGE};

use color_eyre::Result;

use crate::client::ChatClient;
use crate::config::ClientConfig;

/// The crate version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Execute a parsed command against the environment's configuration.
pub async fn run(command: CliCommand) -> Result<()> {
    match command {
        CliCommand::Version => {
            println!("confab {}", VERSION);
            Ok(())
        }
        CliCommand::List(options) => {
            let config = options.apply(ClientConfig::from_env()?);
            let client = ChatClient::from_config(config)?;
            repl::list(&client).await
        }
        CliCommand::Chat(options) => {
            let config = options.apply(ClientConfig::from_env()?);
            repl::run(config, options.conversation).await
        }
    }
}
