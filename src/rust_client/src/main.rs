use log::*;
use solana_client::rpc_client::RpcClient;
use solana_sdk::signature::{read_keypair_file, Keypair, Signer};
use std::{env, error::Error};

use arg_parser::{parse_args, Command};
use config::{load_cli_config, TokenLockConfig};

mod arg_parser;
mod commands;
mod config;
mod error;
mod transaction;

fn load_keypair(config: &TokenLockConfig) -> Result<Keypair, Box<dyn Error>> {
    read_keypair_file(&config.keypair_path)
        .map_err(|err| format!("failed to read keypair {}: {}", config.keypair_path, err).into())
}

fn main() -> Result<(), Box<dyn Error>> {
    solana_logger::setup_with_default("info");

    let args = parse_args(env::args_os());
    let cli_config = load_cli_config(args.config_file.as_deref())?;
    let config = TokenLockConfig::resolve(&args, cli_config.as_ref())?;

    debug!("Using {} with program {}", config.json_rpc_url, config.program_id);
    let rpc_client = RpcClient::new_with_commitment(config.json_rpc_url.clone(), config.commitment);

    let outcome = match &args.command {
        Command::Balance { address } => {
            let address = match address {
                Some(address) => *address,
                None => load_keypair(&config)?.pubkey(),
            };
            commands::process_balance(&rpc_client, &config, &address)?
        }
        Command::Submit(command) => {
            let signer = load_keypair(&config)?;
            info!("Signer: {}", signer.pubkey());
            commands::process_command(&rpc_client, &config, &signer, command, args.dry_run)?
        }
    };

    println!("{}", outcome);
    Ok(())
}
