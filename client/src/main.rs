use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueHint};
use escrow_client::config::{load_config, save_config, ClientConfig, DEFAULT_CONFIG_PATH};
use escrow_client::receipt::TxReceipt;
use escrow_client::EscrowClient;
use escrow_core::render::render_listing;
use escrow_core::{DealSide, KeyPair, PublicKey};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Init { outfile } => {
            save_config(outfile, &ClientConfig::default())?;
            tracing::info!("Wrote default config to {:?}", outfile);
        }
        Commands::Identity { seed } => {
            let keys = seed.keys()?;
            println!("{}", keys.identity());
        }
        Commands::Create {
            seed,
            delta,
            acceptor,
            offered,
            requested,
        } => {
            let keys = seed.keys()?;
            let acceptor = match acceptor {
                Some(id) => id
                    .parse::<PublicKey>()
                    .with_context(|| format!("parsing acceptor identity {id:?}"))?,
                None => PublicKey::ZERO,
            };
            let offered = DealSide::parse(offered).context("parsing offered side")?;
            let requested = DealSide::parse(requested).context("parsing requested side")?;

            let client = EscrowClient::from_config(&resolve_config(&cli)?);
            let receipt = client
                .create_deal(&keys, *delta, acceptor, offered, requested)
                .await?;
            print_receipt(&receipt, cli.json)?;
        }
        Commands::Deals { seed, owner } => {
            let owner = match owner {
                Some(id) => id
                    .parse::<PublicKey>()
                    .with_context(|| format!("parsing owner identity {id:?}"))?,
                None => seed.keys()?.public_key(),
            };
            let client = EscrowClient::from_config(&resolve_config(&cli)?);
            let listing = client.deals(&owner).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&listing)?);
            } else {
                print!("{}", render_listing(&listing));
            }
        }
        Commands::Accept(args) => {
            let keys = args.seed.keys()?;
            let client = EscrowClient::from_config(&resolve_config(&cli)?);
            let receipt = client.accept_deal(&keys, args.index).await?;
            print_receipt(&receipt, cli.json)?;
        }
        Commands::Cancel(args) => {
            let keys = args.seed.keys()?;
            let client = EscrowClient::from_config(&resolve_config(&cli)?);
            let receipt = client.cancel_deal(&keys, args.index).await?;
            print_receipt(&receipt, cli.json)?;
        }
        Commands::Open(args) => {
            let keys = args.seed.keys()?;
            let client = EscrowClient::from_config(&resolve_config(&cli)?);
            let receipt = client.open_deal(&keys, args.index).await?;
            print_receipt(&receipt, cli.json)?;
        }
    }

    Ok(())
}

/// Config file, or defaults when none exists, with flag overrides applied.
fn resolve_config(cli: &Cli) -> anyhow::Result<ClientConfig> {
    let mut config: ClientConfig = match &cli.config {
        Some(path) => load_config(path)?,
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => load_config(DEFAULT_CONFIG_PATH)?,
        None => ClientConfig::default(),
    };
    if let Some(host) = &cli.node_ip {
        config.node.host = host.clone();
    }
    if let Some(port) = cli.node_port {
        config.node.port = port;
    }
    config.validate()?;
    Ok(config)
}

fn print_receipt(receipt: &TxReceipt, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(receipt)?);
    } else {
        println!("{receipt}");
    }
    Ok(())
}

#[derive(Parser)]
#[command(name = "escrow-cli")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON config; `./escrow_config.json` is used when present
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,

    #[arg(long, global = true)]
    node_ip: Option<String>,

    #[arg(long, global = true)]
    node_port: Option<u16>,

    /// Print receipts and listings as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SeedArg {
    /// 55 lowercase letters
    #[arg(short, long, env = "ESCROW_SEED", hide_env_values = true)]
    seed: Option<String>,
}

impl SeedArg {
    fn keys(&self) -> anyhow::Result<KeyPair> {
        let seed = self
            .seed
            .as_deref()
            .context("a seed is required: pass --seed or set ESCROW_SEED")?;
        Ok(KeyPair::from_seed(seed)?)
    }
}

#[derive(Args)]
struct DealIndexArgs {
    #[command(flatten)]
    seed: SeedArg,

    #[arg(short, long, allow_negative_numbers = true)]
    index: i64,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a config file with default settings
    Init {
        #[arg(short, long,
            default_value = DEFAULT_CONFIG_PATH,
            value_hint = ValueHint::FilePath)]
        outfile: PathBuf,
    },
    /// Print the identity derived from a seed
    Identity {
        #[command(flatten)]
        seed: SeedArg,
    },
    /// Propose a deal
    Create {
        #[command(flatten)]
        seed: SeedArg,

        #[arg(short, long, allow_negative_numbers = true)]
        delta: i64,

        /// Only this identity may accept; anyone may when omitted
        #[arg(short, long)]
        acceptor: Option<String>,

        /// `QU[:NAME,ISSUER,AMOUNT ...]`, e.g. `100:GOLD,ISSUERID,5`
        #[arg(short, long)]
        offered: String,

        #[arg(short, long)]
        requested: String,
    },
    /// List deals owned by, proposed to, and opened to an identity
    Deals {
        #[command(flatten)]
        seed: SeedArg,

        /// Identity to list for instead of the seed's own
        #[arg(long)]
        owner: Option<String>,
    },
    /// Accept a deal proposed to you or opened to everyone
    Accept(DealIndexArgs),
    /// Cancel one of your deals
    Cancel(DealIndexArgs),
    /// Open one of your deals to any acceptor
    Open(DealIndexArgs),
}
