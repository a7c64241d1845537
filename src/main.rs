use clap::{Parser, Subcommand};
use iips_protocol_core::config::{ConfigStore, IipsConfig, JsonFileConfigStore};
use iips_protocol_core::mission::plan::JsonPlanEmitter;
use iips_protocol_core::{init_logger, log_info, IipsError, Reactor};

#[derive(Parser)]
#[command(name = "iips-ground-link")]
#[command(about = "IIPS ground-link protocol core: run the reactor or inspect configuration")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, default_value = "iips.json")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bind the UDP endpoint and run the reactor loop until interrupted.
    Run {
        /// Directory mission `.plan` files are written into.
        #[arg(long, default_value = "./missions")]
        plan_dir: String,
    },
    /// Print the effective configuration (writing defaults back if missing).
    ShowConfig,
}

#[tokio::main]
async fn main() -> Result<(), IipsError> {
    init_logger();

    let cli = Cli::parse();
    let store = JsonFileConfigStore::new(&cli.config);

    match cli.command {
        Commands::ShowConfig => {
            let config: IipsConfig = store.load()?;
            log_info(&format!("{config:#?}"));
        }
        Commands::Run { plan_dir } => {
            let config = store.load()?;
            let mut reactor = Reactor::new(&config, Box::new(JsonPlanEmitter::new(plan_dir))).await;
            log_info(&format!(
                "reactor bound on port {} targeting {}:{}",
                config.local_port, config.peer_ip, config.peer_port
            ));
            loop {
                reactor.poll_once().await?;
            }
        }
    }

    Ok(())
}
