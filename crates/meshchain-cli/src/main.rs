use clap::{Parser, Subcommand};
use meshchain_node::NodeConfig;
use meshchain_storage::StorageEngine;
use meshchain_wallet::Wallet;

#[derive(Parser)]
#[command(name = "meshchain", about = "MeshChain wallet and node management")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Wallet keystore operations
    Wallet {
        #[command(subcommand)]
        action: WalletCommand,
    },
    /// Node and storage operations
    Node {
        #[command(subcommand)]
        action: NodeCommand,
    },
}

#[derive(Subcommand)]
enum WalletCommand {
    /// Create a new PIN-secured wallet
    Create {
        #[arg(long)]
        path: String,
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        pin: String,
    },
    /// Unlock a wallet and print its address
    Unlock {
        #[arg(long)]
        path: String,
        #[arg(long)]
        id: String,
        #[arg(long)]
        pin: String,
    },
    /// Sign a hex-encoded message with an unlocked wallet
    Sign {
        #[arg(long)]
        path: String,
        #[arg(long)]
        id: String,
        #[arg(long)]
        pin: String,
        #[arg(long)]
        message: String,
    },
}

#[derive(Subcommand)]
enum NodeCommand {
    /// Write a fresh node configuration file
    Init {
        #[arg(long)]
        config: String,
        #[arg(long)]
        name: String,
    },
    /// Verify on-disk chain integrity
    VerifyChain {
        #[arg(long)]
        storage: String,
    },
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Wallet { action } => run_wallet(action)?,
        Command::Node { action } => run_node(action)?,
    }
    Ok(())
}

fn run_wallet(action: WalletCommand) -> anyhow::Result<()> {
    match action {
        WalletCommand::Create { path, id, name, pin } => {
            let wallet = Wallet::create(path, &id, &name, &pin, now())?;
            println!("wallet created: {}", id);
            println!("address: {}", wallet.public_key().to_hex());
        }
        WalletCommand::Unlock { path, id, pin } => {
            let mut wallet = Wallet::load(path, &id)?;
            wallet.unlock(&pin, now())?;
            println!("address: {}", wallet.public_key().to_hex());
        }
        WalletCommand::Sign { path, id, pin, message } => {
            let mut wallet = Wallet::load(path, &id)?;
            wallet.unlock(&pin, now())?;
            let bytes = hex::decode(&message)?;
            let signature = wallet.sign(&bytes)?;
            println!("signature: {}", hex::encode(signature.to_bytes()));
        }
    }
    Ok(())
}

fn run_node(action: NodeCommand) -> anyhow::Result<()> {
    match action {
        NodeCommand::Init { config, name } => {
            let node_config = NodeConfig::new(meshchain_core::NodeId::from_bytes([0u8; 8]), name);
            node_config.save_to_file(&config)?;
            println!("wrote node configuration to {config}");
        }
        NodeCommand::VerifyChain { storage } => {
            let engine = StorageEngine::open(&storage, 256)?;
            let report = engine.verify_chain_integrity()?;
            println!(
                "blocks_checked={} blocks_corrupted={} transactions_checked={} transactions_orphaned={} is_valid={}",
                report.blocks_checked,
                report.blocks_corrupted,
                report.transactions_checked,
                report.transactions_orphaned,
                report.is_valid,
            );
        }
    }
    Ok(())
}
