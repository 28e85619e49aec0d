//! trackid: identify users by their public proofs, and track them.

mod config;
mod shutdown;
mod terminal_ui;

use anyhow::{bail, Context};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use trackid_assertion::{parse, Assertion};
use trackid_directory::{HttpDirectory, IdentityDirectory};
use trackid_identify::{
    IdentifyBehavior, IdentifyEngine, IdentifyOutcome, IdentifyRequest, RunContext,
    SecretKeySource, StaticKeySource,
};
use trackid_proofs::ProofCheckerRegistry;
use trackid_rpc::{RpcMetrics, RpcServer, RpcState};
use trackid_types::{Clock, Identity, SystemClock, Username};
use trackid_utils::{format_duration, init_logging, LogFormat};

use crate::config::DaemonConfig;
use crate::shutdown::ShutdownController;
use crate::terminal_ui::TerminalUi;

#[derive(Parser)]
#[command(name = "trackid", about = "Identify and track users by their public proofs")]
struct Cli {
    /// Path to a TOML configuration file. File settings are the base;
    /// flags and env vars override them.
    #[arg(long, env = "TRACKID_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Base URL of the identity directory.
    #[arg(long, env = "TRACKID_DIRECTORY_URL", global = true)]
    directory_url: Option<String>,

    /// Hex-encoded signing key file.
    #[arg(long, env = "TRACKID_KEY_FILE", global = true)]
    key_file: Option<PathBuf>,

    /// Your own username.
    #[arg(long, env = "TRACKID_ME", global = true)]
    me: Option<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "TRACKID_LOG_LEVEL", global = true)]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "TRACKID_LOG_FORMAT", global = true)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Identify whoever an assertion denotes.
    Identify {
        assertion: String,

        /// Calling context, e.g. CLI, GUI, CHAT_GUI_STRICT.
        #[arg(long, default_value = "CLI")]
        behavior: IdentifyBehavior,

        /// Print the outcome as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Identify a user and sign a tracking statement for them.
    Track {
        user: String,

        /// Extra assertion the user must also satisfy, e.g. "twitter:bob".
        #[arg(long = "assert")]
        assertion: Option<String>,

        /// Sign without asking for confirmation.
        #[arg(long)]
        yes: bool,
    },
    /// Run the RPC server until SIGINT or SIGTERM.
    Serve {
        #[arg(long, env = "TRACKID_RPC_PORT")]
        port: Option<u16>,
    },
}

impl Cli {
    fn load_config(&self) -> anyhow::Result<DaemonConfig> {
        let mut config = match &self.config {
            Some(path) => DaemonConfig::from_toml_file(path)?,
            None => DaemonConfig::default(),
        };
        if let Some(url) = &self.directory_url {
            config.directory_url = url.clone();
        }
        if let Some(key_file) = &self.key_file {
            config.key_file = Some(key_file.clone());
        }
        if let Some(me) = &self.me {
            config.me = Some(me.clone());
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        if let Some(format) = self.log_format {
            config.log_format = format;
        }
        if let Command::Serve { port: Some(port) } = self.command {
            config.rpc_port = port;
        }
        Ok(config)
    }
}

/// Everything a command needs, built from the config.
struct App {
    config: DaemonConfig,
    engine: Arc<IdentifyEngine>,
    me: Option<Identity>,
    keys: Option<Arc<dyn SecretKeySource>>,
}

impl App {
    async fn build(config: DaemonConfig) -> anyhow::Result<Self> {
        let directory: Arc<dyn IdentityDirectory> = Arc::new(
            HttpDirectory::with_timeout(&config.directory_url, config.checkers.http_timeout())
                .context("invalid directory url")?,
        );
        let registry = ProofCheckerRegistry::with_defaults(&config.checkers)
            .context("failed to build proof checkers")?;
        let engine = Arc::new(IdentifyEngine::new(
            Arc::clone(&directory),
            Arc::new(registry),
            Arc::new(SystemClock) as Arc<dyn Clock>,
            config.engine.clone(),
        ));

        let me = match &config.me {
            Some(name) => Some(load_me(directory.as_ref(), name).await?),
            None => None,
        };
        let keys = match &config.key_file {
            Some(path) => {
                let source = StaticKeySource::from_file(path)
                    .with_context(|| format!("failed to load key from {}", path.display()))?;
                Some(Arc::new(source) as Arc<dyn SecretKeySource>)
            }
            None => None,
        };

        Ok(Self {
            config,
            engine,
            me,
            keys,
        })
    }

    fn context<'a>(&'a self, ui: &'a TerminalUi, shutdown: &ShutdownController) -> RunContext<'a> {
        let mut ctx = RunContext::new(ui).with_cancel(shutdown.cancel_token());
        if let Some(me) = &self.me {
            ctx = ctx.with_me(me);
        }
        if let Some(keys) = &self.keys {
            ctx = ctx.with_keys(keys.as_ref());
        }
        ctx
    }
}

async fn load_me(directory: &dyn IdentityDirectory, name: &str) -> anyhow::Result<Identity> {
    let username = Username::parse(name).with_context(|| format!("invalid username {name:?}"))?;
    let Some(uid) = directory.lookup_username(&username).await? else {
        bail!("user {name} not found in the directory");
    };
    Ok(directory.load_identity(&uid).await?)
}

fn print_outcome(outcome: &IdentifyOutcome, elapsed: Duration) {
    println!("{} ({})", outcome.target.username, outcome.target.id);
    for proof in &outcome.proofs {
        println!("  {:<32} {:<24} {}", proof.key.to_string(), proof.verdict.label(), proof.remote);
    }
    for term in &outcome.unmet_assertions {
        println!("  unmet: {term}");
    }
    println!("status: {} ({})", outcome.status, format_duration(elapsed));
}

/// `<user>` AND-ed with the optional extra assertion, as canonical text.
fn track_assertion(user: &str, extra: Option<&str>) -> anyhow::Result<String> {
    let base = Assertion::username(user)?;
    let combined = match extra {
        Some(extra) => base.and(&parse(extra)?),
        None => base,
    };
    Ok(combined.render())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.load_config()?;
    init_logging(config.log_format, &config.log_level);

    let shutdown = Arc::new(ShutdownController::new());
    tokio::spawn({
        let shutdown = Arc::clone(&shutdown);
        async move { shutdown.wait_for_signal().await }
    });
    let app = App::build(config).await?;

    match cli.command {
        Command::Identify {
            assertion,
            behavior,
            json,
        } => {
            let ui = if json { TerminalUi::new(false).quiet() } else { TerminalUi::new(false) };
            let request = IdentifyRequest::new(assertion, behavior);
            let started = Instant::now();
            let outcome = app.engine.run(request, &app.context(&ui, &shutdown)).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                print_outcome(&outcome, started.elapsed());
            }
        }

        Command::Track {
            user,
            assertion,
            yes,
        } => {
            if app.me.is_none() || app.keys.is_none() {
                bail!("tracking needs --me and --key-file");
            }
            let ui = TerminalUi::new(yes);
            let request = IdentifyRequest::new(
                track_assertion(&user, assertion.as_deref())?,
                IdentifyBehavior::Cli,
            )
            .with_track(true);
            let started = Instant::now();
            let outcome = app.engine.run(request, &app.context(&ui, &shutdown)).await?;
            print_outcome(&outcome, started.elapsed());
            match &outcome.statement {
                Some(statement) => {
                    println!("{}", statement.to_json_pretty());
                    for tracked in &statement.body.track_set {
                        println!("  {} {:?} {}", tracked.key, tracked.state, tracked.remote);
                    }
                }
                None => bail!("{user} was not tracked (final state {})", outcome.final_state),
            }
        }

        Command::Serve { .. } => {
            let mut state = RpcState::new(Arc::clone(&app.engine), Arc::new(RpcMetrics::new()))
                .with_cancel(shutdown.cancel_token());
            if let Some(me) = app.me.clone() {
                state = state.with_me(me);
            }
            if let Some(keys) = app.keys.clone() {
                state = state.with_keys(keys);
            }
            let server = RpcServer::new(app.config.rpc_port, Arc::new(state));
            tracing::info!(
                directory = %app.config.directory_url,
                port = app.config.rpc_port,
                "starting trackid server"
            );
            server.start(shutdown.signalled()).await?;
            tracing::info!("trackid server exited cleanly");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_assertion_ands_terms() {
        assert_eq!(track_assertion("Bob", None).unwrap(), "bob");
        assert_eq!(
            track_assertion("bob", Some("twitter:b,github:b")).unwrap(),
            "bob+twitter:b,bob+github:b"
        );
        assert!(track_assertion("twitter:bob", None).is_err());
    }

    #[test]
    fn flags_override_file_config() {
        let cli = Cli::parse_from([
            "trackid",
            "--me",
            "alice",
            "--log-format",
            "json",
            "serve",
            "--port",
            "9000",
        ]);
        let config = cli.load_config().unwrap();
        assert_eq!(config.me.as_deref(), Some("alice"));
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.rpc_port, 9000);
    }

    #[test]
    fn behavior_flag_parses_wire_names() {
        let cli = Cli::parse_from(["trackid", "identify", "bob", "--behavior", "chat-gui-strict"]);
        assert!(matches!(
            cli.command,
            Command::Identify { behavior: IdentifyBehavior::ChatGuiStrict, .. }
        ));
    }
}
