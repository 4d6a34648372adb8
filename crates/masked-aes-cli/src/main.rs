//! Command-line harness for `masked-aes`.

#![forbid(unsafe_code)]

mod logger;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use aes_core::{decrypt_block, encrypt_block, expand_key, Aes128Key, Block};
use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use masked_aes::{
    decrypt, encrypt, CountingRng, MaskedBlock, MaskedRoundKeys, Masking, MaskingConfig,
    DEFAULT_SHARES,
};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use tracing::{info, metadata::LevelFilter};

const DEMO_KEY: &str = "0f1571c947d9e8590cb7add6af7f6798";
const DEMO_PLAINTEXT: &str = "0123456789abcdeffedcba9876543210";
const DEMO_CIPHERTEXT: &str = "ff0b844a0853bf7c6934ab4364148fb9";

/// Masked AES-128 CLI.
#[derive(Parser)]
#[command(name = "maes", version, author, about = "AES-128 over Boolean-masked shares")]
struct Cli {
    /// Number of shares per masked byte.
    #[arg(long, global = true, default_value_t = DEFAULT_SHARES)]
    shares: usize,
    /// Optional RNG seed for reproducible masking randomness.
    #[arg(long, global = true)]
    seed: Option<u64>,
    #[command(subcommand)]
    command: Commands,
}

/// Where the round keys come from.
#[derive(Args)]
#[group(required = true, multiple = false)]
struct KeySource {
    /// AES-128 key as 32 hex characters; expanded and masked on the fly.
    #[arg(long, value_name = "HEX")]
    key_hex: Option<String>,
    /// Masked round-key bundle written by `share-keys`.
    #[arg(long, value_name = "FILE")]
    keys: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt one block under masking and print the unshared ciphertext.
    Encrypt {
        #[command(flatten)]
        source: KeySource,
        /// Plaintext block as 32 hex characters.
        #[arg(long, value_name = "HEX")]
        plaintext_hex: String,
    },
    /// Decrypt one block under masking and print the unshared plaintext.
    Decrypt {
        #[command(flatten)]
        source: KeySource,
        /// Ciphertext block as 32 hex characters.
        #[arg(long, value_name = "HEX")]
        ciphertext_hex: String,
    },
    /// Expand a key, mask the round keys and write the bundle.
    ShareKeys {
        /// AES-128 key as 32 hex characters.
        #[arg(long, value_name = "HEX")]
        key_hex: String,
        /// Output path for the serialized bundle.
        #[arg(long, value_name = "FILE")]
        out: PathBuf,
    },
    /// Compare masked encryption and decryption with the reference cipher on random inputs.
    Check {
        /// Number of random samples to test.
        #[arg(long, default_value_t = 4)]
        samples: usize,
    },
    /// Run the fixed test vector through a masked round trip and report costs.
    Demo,
}

type CliMasking = Masking<CountingRng<ChaCha20Rng>>;

fn main() -> Result<()> {
    logger::init(LevelFilter::INFO);
    let cli = Cli::parse();
    let rng = CountingRng::new(seeded_rng(cli.seed));
    match cli.command {
        Commands::Encrypt {
            source,
            plaintext_hex,
        } => cmd_crypt(rng, cli.shares, &source, &plaintext_hex, Direction::Encrypt),
        Commands::Decrypt {
            source,
            ciphertext_hex,
        } => cmd_crypt(rng, cli.shares, &source, &ciphertext_hex, Direction::Decrypt),
        Commands::ShareKeys { key_hex, out } => cmd_share_keys(rng, cli.shares, &key_hex, &out),
        Commands::Check { samples } => cmd_check(rng, cli.shares, samples),
        Commands::Demo => cmd_demo(rng, cli.shares),
    }
}

#[derive(Clone, Copy, Debug)]
enum Direction {
    Encrypt,
    Decrypt,
}

fn masking(rng: CountingRng<ChaCha20Rng>, shares: usize) -> Result<CliMasking> {
    Masking::with_config(rng, MaskingConfig { shares }).context("configure masking")
}

fn cmd_crypt(
    rng: CountingRng<ChaCha20Rng>,
    shares: usize,
    source: &KeySource,
    block_hex: &str,
    direction: Direction,
) -> Result<()> {
    let block = parse_block_hex(block_hex)?;
    let (mut m, keys) = match (&source.key_hex, &source.keys) {
        (Some(key_hex), _) => {
            let mut m = masking(rng, shares)?;
            let round_keys = expand_key(&parse_key_hex(key_hex)?);
            let keys = MaskedRoundKeys::share(&mut m, &round_keys);
            (m, keys)
        }
        (None, Some(path)) => {
            let keys = load_keys(path)?;
            if keys.shares() != shares {
                info!(
                    bundle = keys.shares(),
                    requested = shares,
                    "using the share count of the key bundle"
                );
            }
            (masking(rng, keys.shares())?, keys)
        }
        (None, None) => bail!("either --key-hex or --keys is required"),
    };

    let input = MaskedBlock::share(&mut m, &block);
    m.rng_mut().reset();
    let start = Instant::now();
    let output = match direction {
        Direction::Encrypt => encrypt(&mut m, keys, input),
        Direction::Decrypt => decrypt(&mut m, keys, input),
    }
    .with_context(|| format!("{direction:?} block"))?;
    report(direction, &m, start.elapsed());

    println!("{}", hex::encode(output.unshare()));
    Ok(())
}

fn cmd_share_keys(
    rng: CountingRng<ChaCha20Rng>,
    shares: usize,
    key_hex: &str,
    out: &Path,
) -> Result<()> {
    let mut m = masking(rng, shares)?;
    let round_keys = expand_key(&parse_key_hex(key_hex)?);
    let bytes = MaskedRoundKeys::share(&mut m, &round_keys)
        .to_bytes()
        .context("serialize round keys")?;
    fs::write(out, &bytes).with_context(|| format!("write {}", out.display()))?;
    info!(shares, bytes = bytes.len(), path = %out.display(), "wrote masked round keys");
    Ok(())
}

fn cmd_check(rng: CountingRng<ChaCha20Rng>, shares: usize, samples: usize) -> Result<()> {
    let mut m = masking(rng, shares)?;
    for sample in 0..samples {
        let mut key = [0u8; 16];
        let mut block = [0u8; 16];
        m.rng_mut().fill_bytes(&mut key);
        m.rng_mut().fill_bytes(&mut block);
        let round_keys = expand_key(&Aes128Key::from(key));
        let expected = encrypt_block(&block, &round_keys);

        let (enc_keys, dec_keys) = MaskedRoundKeys::share(&mut m, &round_keys).split(&mut m);
        let pt = MaskedBlock::share(&mut m, &block);
        let ct = encrypt(&mut m, enc_keys, pt).context("encrypt sample")?;
        let actual = ct.unshare();
        if actual != expected {
            bail!(
                "sample {sample}: masked ciphertext {} differs from reference {}",
                hex::encode(actual),
                hex::encode(expected)
            );
        }
        let back = decrypt(&mut m, dec_keys, ct).context("decrypt sample")?;
        if back.unshare() != block {
            bail!("sample {sample}: masked round trip failed");
        }
        if decrypt_block(&expected, &round_keys) != block {
            bail!("sample {sample}: reference round trip failed");
        }
    }
    info!(samples, shares, "masked AES matches the reference cipher");
    Ok(())
}

fn cmd_demo(rng: CountingRng<ChaCha20Rng>, shares: usize) -> Result<()> {
    let mut m = masking(rng, shares)?;
    let round_keys = expand_key(&parse_key_hex(DEMO_KEY)?);
    let plaintext = parse_block_hex(DEMO_PLAINTEXT)?;
    let (enc_keys, dec_keys) = MaskedRoundKeys::share(&mut m, &round_keys).split(&mut m);

    let pt = MaskedBlock::share(&mut m, &plaintext);
    m.rng_mut().reset();
    let start = Instant::now();
    let ct = encrypt(&mut m, enc_keys, pt).context("encrypt demo block")?;
    report(Direction::Encrypt, &m, start.elapsed());
    let ciphertext_hex = hex::encode(ct.unshare());

    m.rng_mut().reset();
    let start = Instant::now();
    let back = decrypt(&mut m, dec_keys, ct).context("decrypt demo block")?;
    report(Direction::Decrypt, &m, start.elapsed());
    let decrypted_hex = hex::encode(back.unshare());

    println!("shares: {shares}");
    println!("key: {DEMO_KEY}");
    println!("plaintext: {DEMO_PLAINTEXT}");
    println!("ciphertext: {ciphertext_hex}");
    println!("decrypted: {decrypted_hex}");
    if ciphertext_hex != DEMO_CIPHERTEXT {
        bail!("ciphertext does not match the reference {DEMO_CIPHERTEXT}");
    }
    if decrypted_hex != DEMO_PLAINTEXT {
        bail!("demo roundtrip failed");
    }
    Ok(())
}

fn report(direction: Direction, m: &CliMasking, elapsed: Duration) {
    info!(
        ?direction,
        shares = m.shares(),
        random_bytes = m.rng().drawn(),
        elapsed_ms = elapsed.as_secs_f64() * 1e3,
        "masked block done"
    );
}

fn parse_key_hex(hex_str: &str) -> Result<Aes128Key> {
    let bytes = hex::decode(hex_str.trim()).context("decode key hex")?;
    let key: [u8; 16] = bytes
        .try_into()
        .map_err(|_| anyhow::anyhow!("AES-128 key must be 16 bytes (32 hex characters)"))?;
    Ok(Aes128Key::from(key))
}

fn parse_block_hex(hex_str: &str) -> Result<Block> {
    let bytes = hex::decode(hex_str.trim()).context("decode block hex")?;
    bytes
        .try_into()
        .map_err(|_| anyhow::anyhow!("block must be 16 bytes (32 hex characters)"))
}

fn load_keys(path: &Path) -> Result<MaskedRoundKeys> {
    let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    MaskedRoundKeys::from_bytes(&bytes).context("deserialize masked round keys")
}

fn seeded_rng(seed: Option<u64>) -> ChaCha20Rng {
    match seed {
        Some(value) => ChaCha20Rng::seed_from_u64(value),
        None => {
            let mut seed_bytes = [0u8; 32];
            rand::rngs::OsRng.fill_bytes(&mut seed_bytes);
            ChaCha20Rng::from_seed(seed_bytes)
        }
    }
}
