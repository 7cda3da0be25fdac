//! mintchain-cli — command-line interface to a single node's chain store,
//! UTXO index, and wallet file. Every subcommand reads `NODE_ID` from the
//! environment to pick which `blockchain_<id>.db` / `wallet_<id>.dat` pair
//! to operate on, so several nodes can share one machine.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use mintchain_core::address;
use mintchain_store::chain::ChainStore;
use mintchain_store::tx_builder::new_utxo_transaction;
use mintchain_store::utxo::UtxoIndex;
use mintchain_wallet::WalletStore;

#[derive(Parser)]
#[command(name = "mintchain-cli")]
#[command(version, about = "mintchain node control plane")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the blockchain, mining the genesis block's reward to ADDRESS.
    CreateBlockchain {
        #[arg(long)]
        address: String,
    },
    /// Generate a new key pair and store it in this node's wallet file.
    CreateWallet,
    /// List every address held in this node's wallet file.
    ListAddresses,
    /// Print the balance of ADDRESS, as seen by the UTXO index.
    GetBalance {
        #[arg(long)]
        address: String,
    },
    /// Send AMOUNT from SENDER to RECEIVER, optionally mining it immediately.
    Send {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(long)]
        amount: u64,
        /// Mine the transaction into a block on this node right away.
        #[arg(long)]
        mine: bool,
    },
    /// Print every block from the tip back to genesis.
    PrintChain,
    /// Rebuild the UTXO index from the chain store.
    Reindex,
    /// Report this node's current tip. With `--miner`, also validates the
    /// address that would receive block rewards were mining wired up.
    StartNode {
        #[arg(long)]
        miner: Option<String>,
    },
}

fn node_id() -> Result<String> {
    std::env::var("NODE_ID").context("NODE_ID environment variable is not set")
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let node_id = node_id()?;

    match cli.command {
        Commands::CreateBlockchain { address } => create_blockchain(&node_id, &address),
        Commands::CreateWallet => create_wallet(&node_id),
        Commands::ListAddresses => list_addresses(&node_id),
        Commands::GetBalance { address } => get_balance(&node_id, &address),
        Commands::Send { from, to, amount, mine } => send(&node_id, &from, &to, amount, mine),
        Commands::PrintChain => print_chain(&node_id),
        Commands::Reindex => reindex(&node_id),
        Commands::StartNode { miner } => start_node(&node_id, miner.as_deref()),
    }
}

fn create_blockchain(node_id: &str, addr: &str) -> Result<()> {
    if !address::validate_address(addr) {
        bail!("invalid address: {addr}");
    }

    let chain = ChainStore::create_blockchain(node_id, addr).context("failed to create blockchain")?;
    let utxo = UtxoIndex::new(&chain);
    utxo.reindex(&chain).context("failed to build initial utxo index")?;

    println!("Done!");
    Ok(())
}

fn create_wallet(node_id: &str) -> Result<()> {
    let mut wallets = WalletStore::open(node_id).context("failed to open wallet file")?;
    let address = wallets.create_wallet();
    wallets.save(node_id).context("failed to save wallet file")?;

    println!("Your new address: {address}");
    Ok(())
}

fn list_addresses(node_id: &str) -> Result<()> {
    let wallets = WalletStore::open(node_id).context("failed to open wallet file")?;
    for address in wallets.addresses() {
        println!("{address}");
    }
    Ok(())
}

fn get_balance(node_id: &str, addr: &str) -> Result<()> {
    if !address::validate_address(addr) {
        bail!("invalid address: {addr}");
    }
    let (_version, pubkey_hash) = address::decode(addr)?;

    let chain = ChainStore::open(node_id).context("failed to open blockchain")?;
    let utxo = UtxoIndex::new(&chain);
    let balance: u64 = utxo.find_utxo(&pubkey_hash)?.iter().map(|out| out.value).sum();

    println!("Balance of {addr}: {balance}");
    Ok(())
}

fn send(node_id: &str, from: &str, to: &str, amount: u64, mine: bool) -> Result<()> {
    if !address::validate_address(from) {
        bail!("invalid sender address: {from}");
    }
    if !address::validate_address(to) {
        bail!("invalid recipient address: {to}");
    }
    if amount == 0 {
        bail!("amount must be greater than zero");
    }

    let chain = ChainStore::open(node_id).context("failed to open blockchain")?;
    let utxo = UtxoIndex::new(&chain);
    let wallets = WalletStore::open(node_id).context("failed to open wallet file")?;
    let wallet = wallets.get_wallet(from).context("sender wallet not found")?;

    let (_version, from_pkh) = address::decode(from)?;
    let tx = new_utxo_transaction(wallet.private_key(), &from_pkh, to, amount, &utxo, &chain)
        .context("failed to build transaction")?;

    if mine {
        let coinbase = mintchain_core::tx::Transaction::new_coinbase(from_pkh, Vec::new())?;
        let block = chain.mine_block(vec![coinbase, tx]).context("failed to mine block")?;
        utxo.update(&block)?;
    } else {
        println!("transaction built but not broadcast: no peer network in this node");
    }

    println!("success!");
    Ok(())
}

fn print_chain(node_id: &str) -> Result<()> {
    let chain = ChainStore::open(node_id).context("failed to open blockchain")?;
    let mut iter = chain.iterator();
    while let Some(block) = iter.next_block()? {
        let valid = mintchain_consensus::pow::validate(&block)?;
        println!("Prev hash  : {}", block.prev_block_hash);
        println!("Hash       : {}", block.hash);
        println!("Nonce      : {}", block.nonce);
        println!("PoW        : {valid}");
        println!("Height     : {}", block.height);
        println!("-------------------------------------------------------");
    }
    Ok(())
}

fn reindex(node_id: &str) -> Result<()> {
    let chain = ChainStore::open(node_id).context("failed to open blockchain")?;
    let utxo = UtxoIndex::new(&chain);
    utxo.reindex(&chain)?;
    let count = utxo.count_transactions()?;
    println!("Done! There are {count} transactions in the UTXO set");
    Ok(())
}

fn start_node(node_id: &str, miner: Option<&str>) -> Result<()> {
    if let Some(addr) = miner {
        if !address::validate_address(addr) {
            bail!("wrong miner address");
        }
        println!("Mining enabled. Rewards would be sent to: {addr}");
    }

    let chain = ChainStore::open(node_id).context("failed to open blockchain")?;
    println!("Node {node_id} at height {}", chain.get_best_height()?);
    println!("No peer network in this build; exiting after reporting tip.");
    Ok(())
}
