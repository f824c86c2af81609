use crate::{arg_parser::Args, error::Error, transaction::ConfirmOptions};
use solana_clap_utils::input_validators::normalize_to_url_if_moniker;
use solana_cli_config::{Config, CONFIG_FILE};
use solana_program::{native_token::LAMPORTS_PER_SOL, pubkey::Pubkey};
use solana_sdk::commitment_config::CommitmentConfig;
use std::{path::Path, str::FromStr, time::Duration};
use token_lock::{validation_utils::parse_address, TokenLock};

pub const DEFAULT_JSON_RPC_URL: &str = "https://rpc.devnet.soo.network/rpc";
pub const DEFAULT_PROGRAM_ID: &str = "GFGyUDBPeKyhveN6NMb2LUF3L4x88dyr3HtWoJ18FiED";
pub const DEFAULT_OWNER: &str = "HV11ZN4HA7QJvuifjSoJ5nMXz7Di3ZrzuwCUoLwPNMsn";
const DEFAULT_COMMITMENT: &str = "confirmed";
const CONFIRM_ATTEMPTS: usize = 60;
const CONFIRM_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Settings injected at startup
#[derive(Clone, Debug)]
pub struct TokenLockConfig {
    pub json_rpc_url: String,
    pub keypair_path: String,
    pub commitment: CommitmentConfig,
    pub program_id: Pubkey,
    pub owner: Pubkey,
    pub denomination: u64,
    pub confirm_attempts: usize,
    pub confirm_poll_interval: Duration,
}

/// Loads the Solana CLI config.
/// A missing file is an error only when its path was passed explicitly.
pub fn load_cli_config(config_file: Option<&str>) -> Result<Option<Config>, Error> {
    match config_file {
        Some(path) if Path::new(path).exists() => Ok(Some(Config::load(path)?)),
        Some(path) => Err(Error::Config(format!("config file not found: {}", path))),
        None => match CONFIG_FILE.as_ref() {
            Some(path) if Path::new(path).exists() => Ok(Some(Config::load(path)?)),
            _ => Ok(None),
        },
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

impl TokenLockConfig {
    /// Command-line values win over the CLI config, which wins over the defaults
    pub fn resolve(args: &Args, cli_config: Option<&Config>) -> Result<Self, Error> {
        let json_rpc_url = args
            .json_rpc_url
            .clone()
            .or_else(|| cli_config.and_then(|config| non_empty(&config.json_rpc_url)))
            .map(normalize_to_url_if_moniker)
            .unwrap_or_else(|| DEFAULT_JSON_RPC_URL.to_string());

        let keypair_path = args
            .keypair_path
            .clone()
            .or_else(|| cli_config.and_then(|config| non_empty(&config.keypair_path)))
            .unwrap_or_else(|| Config::default().keypair_path);

        let commitment = args
            .commitment
            .clone()
            .or_else(|| cli_config.and_then(|config| non_empty(&config.commitment)))
            .unwrap_or_else(|| DEFAULT_COMMITMENT.to_string());
        let commitment = CommitmentConfig::from_str(&commitment)
            .map_err(|err| Error::Config(format!("{}: {}", commitment, err)))?;

        let program_id = match args.program_id {
            Some(program_id) => program_id,
            None => parse_address(DEFAULT_PROGRAM_ID)?,
        };
        let owner = match args.owner {
            Some(owner) => owner,
            None => parse_address(DEFAULT_OWNER)?,
        };

        Ok(Self {
            json_rpc_url,
            keypair_path,
            commitment,
            program_id,
            owner,
            denomination: LAMPORTS_PER_SOL,
            confirm_attempts: CONFIRM_ATTEMPTS,
            confirm_poll_interval: CONFIRM_POLL_INTERVAL,
        })
    }

    pub fn token_lock(&self) -> Result<TokenLock, Error> {
        Ok(TokenLock::new(self.program_id).with_denomination(self.denomination)?)
    }

    pub fn confirm_options(&self) -> ConfirmOptions {
        ConfirmOptions {
            commitment: self.commitment,
            attempts: self.confirm_attempts,
            poll_interval: self.confirm_poll_interval,
        }
    }

    /// Client-side check only; the program enforces ownership itself
    pub fn is_owner(&self, signer: &Pubkey) -> bool {
        *signer == self.owner
    }
}
