//! Command-line argument parsing.

use thiserror::Error;

use crate::config::ClientConfig;

/// Parsed command to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    /// Print the version and exit
    Version,
    /// Print the conversation list and exit
    List(CliOptions),
    /// Interactive chat (default)
    Chat(CliOptions),
}

/// Flags that override the environment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliOptions {
    pub url: Option<String>,
    pub no_stream: bool,
    /// Conversation to resume on start
    pub conversation: Option<i64>,
}

impl CliOptions {
    /// Layer these flags over a config loaded from the environment.
    pub fn apply(&self, mut config: ClientConfig) -> ClientConfig {
        if let Some(url) = &self.url {
            config = config.with_base_url(url.clone());
        }
        if self.no_stream {
            config = config.with_streaming(false);
        }
        config
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ArgsError {
    #[error("{0} requires a value")]
    MissingValue(&'static str),
    #[error("invalid conversation id '{0}'")]
    InvalidConversationId(String),
    #[error("unknown argument '{0}' (try --help)")]
    Unknown(String),
}

pub const USAGE: &str = "\
Usage: confab [OPTIONS]

Options:
  --url <URL>            API root (default: $CONFAB_API_URL or http://localhost:8000/api)
  --no-stream            Use the non-streaming endpoint
  --conversation <ID>    Resume a conversation
  --list                 Print conversations and exit
  -V, --version          Print version";

/// Parse command-line arguments. The first item is the program name.
///
/// # Examples
///
/// ```
/// use confab::cli::args::{parse_args, CliCommand};
///
/// let args = vec!["confab".to_string(), "--version".to_string()];
/// assert_eq!(parse_args(args.into_iter()), Ok(CliCommand::Version));
/// ```
pub fn parse_args<I>(args: I) -> Result<CliCommand, ArgsError>
where
    I: Iterator<Item = String>,
{
    let mut options = CliOptions::default();
    let mut list = false;
    let mut args = args.skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--version" | "-V" => return Ok(CliCommand::Version),
            "--list" => list = true,
            "--no-stream" => options.no_stream = true,
            "--url" => {
                options.url = Some(args.next().ok_or(ArgsError::MissingValue("--url"))?);
            }
            "--conversation" => {
                let value = args
                    .next()
                    .ok_or(ArgsError::MissingValue("--conversation"))?;
                let id = value
                    .parse::<i64>()
                    .ok()
                    .filter(|id| *id > 0)
                    .ok_or(ArgsError::InvalidConversationId(value))?;
                options.conversation = Some(id);
            }
            _ => return Err(ArgsError::Unknown(arg)),
        }
    }

    if list {
        Ok(CliCommand::List(options))
    } else {
        Ok(CliCommand::Chat(options))
    }
}
