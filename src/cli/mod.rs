//! Command-line interface for tracestack.

use crate::application::Application;
use crate::core::config::ConfigBuilder;
use crate::core::{Config, Result, TraceStackError};
use crate::ids::{GlobalIdGenerator, InstanceRegistry};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Trace stack reconstruction and distributed identifiers
#[derive(Parser, Debug)]
#[command(name = "tracestack")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path (default: ~/.config/tracestack/config.yaml)
    #[arg(short, long, env = "TRACESTACK_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, env = "TRACESTACK_DEBUG", global = true)]
    pub debug: bool,

    /// Validate configuration and exit
    #[arg(long)]
    pub check_config: bool,

    /// What to run (default: serve)
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Serve the trace stack read API
    Serve {
        /// Port for the read API
        #[arg(long, env = "TRACESTACK_PORT")]
        port: Option<u16>,

        /// JSON fixture of segments to preload
        #[arg(long)]
        fixture: Option<PathBuf>,
    },

    /// Print the reconstructed stack of one trace as JSON
    Stack {
        /// JSON fixture of segments to read from
        #[arg(long)]
        fixture: Option<PathBuf>,

        /// Global trace id to reconstruct
        global_trace_id: String,
    },

    /// Print freshly generated identifiers
    GenerateId {
        /// Application instance id owning the identifiers
        #[arg(long, env = "TRACESTACK_INSTANCE_ID")]
        instance_id: Option<u32>,

        /// Number of identifiers to print
        #[arg(long, default_value_t = 1)]
        count: usize,
    },
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Load configuration with proper precedence:
    /// 1. CLI arguments (highest priority)
    /// 2. Config file
    /// 3. Defaults (lowest priority)
    ///
    /// Returns the file the configuration came from, if any.
    pub async fn load_config(&self) -> Result<(Config, Option<PathBuf>)> {
        let mut builder = ConfigBuilder::new();

        let config_path = match &self.config {
            Some(path) => Some(path.clone()),
            None => dirs::config_dir()
                .map(|d| d.join("tracestack").join("config.yaml"))
                .filter(|path| path.exists()),
        };

        if let Some(path) = &config_path {
            builder = builder.from_file(path).await?;
        }

        Ok((self.apply_overrides(builder).build()?, config_path))
    }

    fn apply_overrides(&self, mut builder: ConfigBuilder) -> ConfigBuilder {
        match &self.command {
            Some(Command::Serve { port, fixture }) => {
                if let Some(port) = port {
                    builder = builder.port(*port);
                }
                if let Some(fixture) = fixture {
                    builder = builder.fixture(fixture.clone());
                }
            },
            Some(Command::Stack {
                fixture: Some(fixture),
                ..
            }) => {
                builder = builder.fixture(fixture.clone());
            },
            Some(Command::GenerateId {
                instance_id: Some(id),
                ..
            }) => {
                builder = builder.instance_id(*id);
            },
            _ => {},
        }
        builder.debug(self.debug)
    }

    /// Initialize logging based on configuration.
    pub fn init_logging(&self, config: &Config) -> Result<()> {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

        let level = if self.debug {
            "debug".to_string()
        } else {
            std::env::var("TRACESTACK_LOG_LEVEL")
                .unwrap_or_else(|_| config.logging.level.as_str().to_string())
        };

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

        let fmt_layer = if config.logging.structured {
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true)
                .compact()
        } else {
            tracing_subscriber::fmt::layer().with_target(false).compact()
        };

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .try_init()
            .map_err(|e| TraceStackError::config(format!("Failed to initialize logging: {}", e)))?;

        Ok(())
    }
}

/// Execute the parsed command line.
pub async fn execute(cli: Cli) -> Result<()> {
    let (config, loaded_from) = cli.load_config().await?;
    cli.init_logging(&config)?;

    if let Some(path) = &loaded_from {
        tracing::info!("Loaded configuration from: {:?}", path);
    }

    if cli.check_config {
        config.validate()?;
        println!("Configuration is valid!");
        println!("  Listen address: {}:{}", config.server.bind_address, config.server.port);
        println!("  Max stack depth: {}", config.stack.max_depth);
        match &config.storage.fixture {
            Some(path) => println!("  Fixture: {}", path.display()),
            None => println!("  Fixture: none"),
        }
        return Ok(());
    }

    let command = cli.command.clone().unwrap_or(Command::Serve {
        port: None,
        fixture: None,
    });

    match command {
        Command::Serve { .. } => {
            let app = Application::bootstrap(config).await?;
            app.run().await
        },
        Command::Stack {
            global_trace_id, ..
        } => {
            if config.storage.fixture.is_none() {
                return Err(TraceStackError::config(
                    "no fixture configured: pass --fixture or set storage.fixture",
                ));
            }
            let app = Application::bootstrap(config).await?;
            let spans = app.stack().load(&global_trace_id).await;
            println!("{}", serde_json::to_string_pretty(&spans)?);
            Ok(())
        },
        Command::GenerateId { count, .. } => {
            let generator = GlobalIdGenerator::new(InstanceRegistry::from_config(&config.agent));
            for _ in 0..count {
                println!("{}", generator.generate()?);
            }
            Ok(())
        },
    }
}
