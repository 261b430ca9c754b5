//! cnote-cli — Command-line front end for CryptoNote wallets and addresses.
//!
//! Creates and restores wallets, inspects addresses, builds integrated
//! addresses, previews denominations and signs messages. Nothing touches the
//! network or disk; results go to stdout.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use cnote_core::config::Config;
use cnote_core::types::{PaymentId, SecretKey, Signature};
use cnote_wallet::{CryptoNote, Seed, Wallet};
use tracing::debug;

/// CryptoNote wallet and address tool.
#[derive(Parser)]
#[command(name = "cnote-cli")]
#[command(version, about = "CryptoNote wallets, addresses and signatures.")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalArgs {
    /// Numeric address prefix (default: 3914525, "TRTL").
    #[arg(long, global = true)]
    prefix: Option<u64>,

    /// Hash rounds applied to new seed entropy.
    #[arg(long, global = true)]
    iterations: Option<u32>,

    /// Largest amount a single output may carry.
    #[arg(long, global = true)]
    max_output: Option<u64>,

    /// Print results as JSON.
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new random wallet.
    New(NewArgs),
    /// Restore a wallet from its mnemonic phrase or hex seed.
    Restore(RestoreArgs),
    /// Build a wallet from existing private keys.
    FromKeys(FromKeysArgs),
    /// Derive a sub-wallet from a base private spend key.
    Subwallet(SubwalletArgs),
    /// Decode and verify an address.
    Decode(AddressArg),
    /// Detect the prefix of an address from any network.
    Prefix(AddressArg),
    /// Embed a payment id into an address.
    Integrate(IntegrateArgs),
    /// Show the outputs an amount would be split into.
    Outputs(OutputsArgs),
    /// Sign a message with a wallet's spend key.
    Sign(SignArgs),
    /// Verify a message signature.
    Verify(VerifyArgs),
}

#[derive(Args)]
struct NewArgs {
    /// Extra hex entropy mixed into the seed.
    #[arg(long)]
    entropy: Option<String>,
}

#[derive(Args)]
struct RestoreArgs {
    /// Mnemonic phrase (quoted) or hex seed.
    seed: String,
}

#[derive(Args)]
struct FromKeysArgs {
    /// Private spend key (hex).
    #[arg(long)]
    spend: String,

    /// Private view key (hex).
    #[arg(long)]
    view: String,
}

#[derive(Args)]
struct SubwalletArgs {
    /// Base private spend key (hex).
    #[arg(long)]
    spend: String,

    /// Sub-wallet index; 0 is the base wallet.
    #[arg(long)]
    index: u64,
}

#[derive(Args)]
struct AddressArg {
    address: String,
}

#[derive(Args)]
struct IntegrateArgs {
    address: String,

    /// Payment id (64 hex characters).
    payment_id: String,
}

#[derive(Args)]
struct OutputsArgs {
    address: String,

    /// Amount in atomic units.
    amount: u64,
}

#[derive(Args)]
struct SignArgs {
    message: String,

    /// Signing wallet's address.
    #[arg(long)]
    address: String,

    /// Private spend key (hex).
    #[arg(long)]
    spend: String,
}

#[derive(Args)]
struct VerifyArgs {
    message: String,

    #[arg(long)]
    address: String,

    /// Signature (128 hex characters).
    #[arg(long)]
    signature: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let engine = CryptoNote::new(build_config(&cli.global));
    let json = cli.global.json;
    debug!(config = ?engine.config(), "cli: engine ready");

    match cli.command {
        Commands::New(args) => wallet_new(&engine, args, json),
        Commands::Restore(args) => wallet_restore(&engine, args, json),
        Commands::FromKeys(args) => wallet_from_keys(&engine, args, json),
        Commands::Subwallet(args) => wallet_subwallet(&engine, args, json),
        Commands::Decode(args) => address_decode(&engine, args, json),
        Commands::Prefix(args) => address_prefix(&engine, args, json),
        Commands::Integrate(args) => address_integrate(&engine, args),
        Commands::Outputs(args) => outputs_preview(&engine, args, json),
        Commands::Sign(args) => message_sign(&engine, args),
        Commands::Verify(args) => message_verify(&engine, args),
    }
}

fn build_config(args: &GlobalArgs) -> Config {
    let mut config = Config::default();
    if let Some(prefix) = args.prefix {
        config = config.with_address_prefix(prefix);
    }
    if let Some(iterations) = args.iterations {
        config = config.with_kdf_iterations(iterations);
    }
    config.with_maximum_output_amount(args.max_output)
}

fn parse_secret(hex_key: &str, what: &str) -> Result<SecretKey> {
    hex_key
        .trim()
        .parse()
        .with_context(|| format!("Invalid {what}"))
}

/// Accept either a mnemonic phrase or a hex seed.
fn parse_seed_input(engine: &CryptoNote, input: &str) -> Result<Wallet> {
    let trimmed = input.trim();
    if trimmed.split_whitespace().count() > 1 {
        return engine
            .create_address_from_mnemonic(trimmed, None, None)
            .context("Invalid mnemonic phrase");
    }
    let bytes = hex::decode(trimmed).context("Seed is neither a mnemonic nor hex")?;
    if bytes.is_empty() {
        bail!("Seed is empty");
    }
    engine
        .create_address_from_seed(&Seed::from_bytes(&bytes), None, None)
        .context("Failed to derive wallet from seed")
}

fn print_wallet(wallet: &Wallet, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(wallet)?);
        return Ok(());
    }
    println!("Address:            {}", wallet.address);
    println!("Public spend key:   {}", wallet.spend.public_key);
    println!("Private spend key:  {}", wallet.spend.secret_key.to_hex());
    println!("Public view key:    {}", wallet.view.public_key);
    println!("Private view key:   {}", wallet.view.secret_key.to_hex());
    if wallet.sub_wallet_index > 0 {
        println!("Sub-wallet index:   {}", wallet.sub_wallet_index);
    }
    match &wallet.mnemonic {
        Some(phrase) => println!("\nMnemonic:\n  {phrase}"),
        None => println!("\nMnemonic:           (not available: view key is not derived from spend key)"),
    }
    Ok(())
}

fn wallet_new(engine: &CryptoNote, args: NewArgs, json: bool) -> Result<()> {
    let entropy = args
        .entropy
        .as_deref()
        .map(hex::decode)
        .transpose()
        .context("Entropy must be hex")?;
    let wallet = engine
        .create_new_address(entropy.as_deref(), None, None)
        .context("Failed to create wallet")?;
    if !json {
        println!("=== WALLET CREATED ===");
        println!("Store the mnemonic safely. Anyone with it can spend your funds.\n");
    }
    print_wallet(&wallet, json)
}

fn wallet_restore(engine: &CryptoNote, args: RestoreArgs, json: bool) -> Result<()> {
    let wallet = parse_seed_input(engine, &args.seed)?;
    print_wallet(&wallet, json)
}

fn wallet_from_keys(engine: &CryptoNote, args: FromKeysArgs, json: bool) -> Result<()> {
    let spend = parse_secret(&args.spend, "private spend key")?;
    let view = parse_secret(&args.view, "private view key")?;
    let wallet = engine
        .create_address_from_keys(&spend, &view, None)
        .context("Failed to build wallet from keys")?;
    print_wallet(&wallet, json)
}

fn wallet_subwallet(engine: &CryptoNote, args: SubwalletArgs, json: bool) -> Result<()> {
    let spend = parse_secret(&args.spend, "base private spend key")?;
    let wallet = engine
        .create_sub_wallet_from_private_spend_key(&spend, args.index, None, None)
        .context("Failed to derive sub-wallet")?;
    print_wallet(&wallet, json)
}

fn address_decode(engine: &CryptoNote, args: AddressArg, json: bool) -> Result<()> {
    let decoded = engine
        .decode_address(args.address.trim(), None)
        .context("Failed to decode address")?;
    if json {
        println!("{}", serde_json::to_string_pretty(&decoded)?);
        return Ok(());
    }
    println!("Prefix:             {}", decoded.prefix);
    println!("Public spend key:   {}", decoded.public_spend_key);
    println!("Public view key:    {}", decoded.public_view_key);
    if let Some(pid) = &decoded.payment_id {
        println!("Payment id:         {pid}");
    }
    Ok(())
}

fn address_prefix(engine: &CryptoNote, args: AddressArg, json: bool) -> Result<()> {
    let prefix = engine
        .decode_address_prefix(args.address.trim())
        .context("Failed to detect address prefix")?;
    if json {
        println!("{}", serde_json::to_string_pretty(&prefix)?);
        return Ok(());
    }
    println!("Base58:             {}", prefix.base58);
    println!("Decimal:            {}", prefix.decimal);
    println!("Hexadecimal:        {}", prefix.hexadecimal);
    Ok(())
}

fn address_integrate(engine: &CryptoNote, args: IntegrateArgs) -> Result<()> {
    let payment_id: PaymentId = args.payment_id.trim().parse().context("Invalid payment id")?;
    let integrated = engine
        .create_integrated_address(args.address.trim(), &payment_id, None)
        .context("Failed to create integrated address")?;
    println!("{integrated}");
    Ok(())
}

fn outputs_preview(engine: &CryptoNote, args: OutputsArgs, json: bool) -> Result<()> {
    let outputs = engine
        .create_transaction_outputs(args.address.trim(), args.amount, None)
        .context("Failed to split amount")?;
    let amounts: Vec<u64> = outputs.iter().map(|o| o.amount).collect();
    if json {
        println!("{}", serde_json::to_string_pretty(&amounts)?);
        return Ok(());
    }
    let places = engine.config().coin_unit_places as usize;
    let unit = engine.config().atomic_units_per_coin();
    for amount in &amounts {
        println!("{:>20}.{:0places$}", amount / unit, amount % unit);
    }
    println!("{} outputs", amounts.len());
    Ok(())
}

fn message_sign(engine: &CryptoNote, args: SignArgs) -> Result<()> {
    let spend = parse_secret(&args.spend, "private spend key")?;
    let signature = engine
        .sign_message(&args.message, args.address.trim(), &spend, None)
        .context("Failed to sign message")?;
    println!("{signature}");
    Ok(())
}

fn message_verify(engine: &CryptoNote, args: VerifyArgs) -> Result<()> {
    let signature: Signature = args.signature.trim().parse().context("Invalid signature")?;
    let valid = engine
        .verify_message_signature(&args.message, args.address.trim(), &signature, None)
        .context("Failed to verify message")?;
    if !valid {
        bail!("Signature is NOT valid for this address");
    }
    println!("Signature is valid");
    Ok(())
}
