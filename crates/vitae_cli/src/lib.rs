pub mod error;

use std::{
    io::{self, Write as _},
    process::ExitCode,
};

use clap::{ArgAction, Parser};
use futures::StreamExt as _;
use tokio::io::{AsyncBufReadExt as _, BufReader};
use tracing::{debug, error};
use vitae_chat::{Applied, Chat};
use vitae_conversation::TurnStatus;
use vitae_llm::{Delta, Local, Remote, Source, remote};
use vitae_profile::Profile;

use crate::error::{Error, Result};

/// Chat with a conversational resume from the terminal.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Base URL of a completion endpoint.
    ///
    /// When omitted, replies come from the built-in local source, which
    /// serves canned answers without a network call.
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Model identifier sent to the completion endpoint.
    #[arg(long, default_value = remote::DEFAULT_MODEL)]
    model: String,

    /// Sampling temperature sent to the completion endpoint.
    #[arg(long, default_value_t = remote::DEFAULT_TEMPERATURE)]
    temperature: f64,

    /// Environment variable holding the completion endpoint API key.
    ///
    /// Only consulted when --base-url is set.
    #[arg(long, value_name = "VAR", default_value = "VITAE_API_KEY")]
    api_key_env: String,

    /// First name shown on the banner.
    #[arg(long, default_value = "")]
    first_name: String,

    /// Last name shown on the banner.
    #[arg(long, default_value = "")]
    last_name: String,

    /// Tagline shown as the opening prompt.
    #[arg(long)]
    tagline: Option<String>,

    /// Increase verbosity of logging.
    ///
    /// Can be specified multiple times to increase verbosity.
    ///
    /// Defaults to printing "error" messages. For each increase in verbosity,
    /// the log level is set to "warn", "info", "debug", and "trace"
    /// respectively.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Suppress all log output, including errors.
    #[arg(short, long)]
    quiet: bool,
}

pub async fn run() -> ExitCode {
    let cli = Cli::parse();
    configure_logging(cli.verbose, cli.quiet);

    match run_inner(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "Exiting with failure.");
            ExitCode::FAILURE
        }
    }
}

async fn run_inner(cli: Cli) -> Result<()> {
    let profile = build_profile(&cli);
    let source = build_source(&cli, &profile)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    banner(&mut out, &profile)?;

    let mut chat = Chat::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    prompt(&mut out)?;
    while let Some(line) = lines.next_line().await? {
        run_turn(&mut chat, source.as_ref(), &line, &mut out).await?;
        prompt(&mut out)?;
    }

    writeln!(out)?;
    Ok(())
}

fn build_profile(cli: &Cli) -> Profile {
    let mut profile = Profile::new(&cli.first_name, &cli.last_name, "");
    if let Some(tagline) = &cli.tagline {
        profile = profile.with_tagline(tagline);
    }

    profile
}

fn build_source(cli: &Cli, profile: &Profile) -> Result<Box<dyn Source>> {
    let Some(base_url) = &cli.base_url else {
        debug!("No endpoint configured; using the local source.");
        return Ok(Box::new(Local::default()));
    };

    let api_key = std::env::var(&cli.api_key_env)
        .map_err(|_| Error::MissingApiKey(cli.api_key_env.clone()))?;

    let mut remote = Remote::new(api_key, base_url.clone())
        .with_model(&cli.model)
        .with_temperature(cli.temperature);

    if let Some(prompt) = system_prompt(profile) {
        remote = remote.with_system_prompt(prompt);
    }

    Ok(Box::new(remote))
}

/// Build a system prompt speaking as the profile's owner.
///
/// Returns `None` when no name is configured, leaving the source's generic
/// default in place.
fn system_prompt(profile: &Profile) -> Option<String> {
    let name = profile.display_name();
    if name.is_empty() {
        return None;
    }

    let mut prompt = format!(
        "You are {name}, answering questions about your own experience, \
         projects, and values in the first person."
    );
    if let Some(tagline) = &profile.tagline {
        prompt.push_str(&format!(" Your tagline: {tagline}."));
    }

    Some(prompt)
}

fn banner(out: &mut impl io::Write, profile: &Profile) -> io::Result<()> {
    let name = profile.display_name();
    if !name.is_empty() {
        writeln!(out, "{name}")?;
    }

    writeln!(out, "{}", profile.opening_prompt())?;
    writeln!(out)?;
    for question in profile.suggested_questions() {
        writeln!(out, "  * {question}")?;
    }

    writeln!(out)
}

fn prompt(out: &mut impl io::Write) -> io::Result<()> {
    write!(out, "> ")?;
    out.flush()
}

/// Drive one full turn: submit the line, stream the reply to `out`.
///
/// Ctrl-C cancels the in-flight response and keeps whatever arrived; errors
/// are scoped to the turn and never abort the session.
async fn run_turn(
    chat: &mut Chat,
    source: &dyn Source,
    line: &str,
    out: &mut impl io::Write,
) -> Result<()> {
    let pending = match chat.submit(line) {
        Ok(pending) => pending,
        Err(vitae_chat::Error::EmptyMessage) => return Ok(()),
        Err(err) => return Err(err.into()),
    };

    let stream = source
        .deltas(pending.history, &pending.message, pending.cancel.clone())
        .await;

    match stream {
        Ok(mut stream) => loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    chat.cancel();
                    break;
                }
                item = stream.next() => match item {
                    Some(Ok(delta)) => {
                        write!(out, "{}", delta.fragment)?;
                        out.flush()?;

                        if chat.apply(pending.source, &delta)? != Applied::Appended {
                            break;
                        }
                    }
                    Some(Err(err)) => {
                        chat.fail(pending.source, &err)?;
                        break;
                    }
                    None => {
                        chat.apply(pending.source, &Delta::end())?;
                        break;
                    }
                }
            }
        },
        Err(err) => {
            chat.fail(pending.source, &err)?;
        }
    }

    match chat.conversation().turns().last() {
        Some(turn) if turn.status() == TurnStatus::Failed => {
            writeln!(out, "\n{}", turn.text())?;
        }
        Some(turn) if turn.status() == TurnStatus::Cancelled => {
            writeln!(out, "\n(cancelled)")?;
        }
        _ => writeln!(out)?,
    }

    Ok(())
}

fn configure_logging(verbose: u8, quiet: bool) {
    use tracing::level_filters::LevelFilter;
    use tracing_subscriber::fmt;

    let mut level = match verbose {
        0 => LevelFilter::ERROR,
        1 => LevelFilter::WARN,
        2 => LevelFilter::INFO,
        3 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    if quiet {
        level = LevelFilter::OFF;
    }

    let mut filter = vec!["off".to_owned()];
    for krate in ["chat", "cli", "conversation", "llm", "profile"] {
        filter.push(format!("vitae_{krate}={level}"));
    }

    let format = fmt::format().with_target(false).compact();

    if level < LevelFilter::DEBUG {
        tracing_subscriber::fmt()
            .event_format(format)
            .without_time()
            .with_ansi(true)
            .with_target(false)
            .with_writer(std::io::stderr)
            .with_env_filter(filter.join(","))
            .init();
    } else {
        tracing_subscriber::fmt()
            .event_format(format)
            .with_ansi(true)
            .with_target(false)
            .with_writer(std::io::stderr)
            .with_env_filter(filter.join(","))
            .init();
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_profile_from_args() {
        let cli = Cli::parse_from([
            "vitae",
            "--first-name",
            "Tom",
            "--last-name",
            "Zhang",
            "--tagline",
            "Engineer",
        ]);

        let profile = build_profile(&cli);
        assert_eq!(profile.display_name(), "Tom Zhang");
        assert_eq!(profile.opening_prompt(), "Engineer");
    }

    #[test]
    fn test_local_source_without_endpoint() {
        let cli = Cli::parse_from(["vitae"]);
        assert!(cli.base_url.is_none());
        assert!(build_source(&cli, &build_profile(&cli)).is_ok());
    }

    #[test]
    fn test_system_prompt_speaks_as_profile() {
        let cli = Cli::parse_from([
            "vitae",
            "--first-name",
            "Tom",
            "--last-name",
            "Zhang",
            "--tagline",
            "Full-Stack Software Engineer",
        ]);

        let prompt = system_prompt(&build_profile(&cli)).unwrap();
        assert_eq!(
            prompt,
            "You are Tom Zhang, answering questions about your own experience, \
             projects, and values in the first person. Your tagline: Full-Stack \
             Software Engineer."
        );

        // Without a name there is nothing to speak as; the source keeps its
        // generic default.
        let cli = Cli::parse_from(["vitae"]);
        assert_eq!(system_prompt(&build_profile(&cli)), None);
    }
}
