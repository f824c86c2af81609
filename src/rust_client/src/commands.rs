use crate::{
    arg_parser::LockCommand,
    config::TokenLockConfig,
    error::Error,
    transaction::{check_balance, send_instruction, Client},
};
use log::*;
use serde::Serialize;
use solana_program::{instruction::Instruction, pubkey::Pubkey};
use solana_sdk::signature::{Signature, Signer};
use std::fmt;

#[derive(Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayAccountMeta {
    pub pubkey: String,
    pub is_signer: bool,
    pub is_writable: bool,
}

/// JSON form of an instruction for `--dry-run`
#[derive(Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayInstruction {
    pub program_id: String,
    pub accounts: Vec<DisplayAccountMeta>,
    pub data: String,
}

impl From<&Instruction> for DisplayInstruction {
    fn from(instruction: &Instruction) -> Self {
        Self {
            program_id: instruction.program_id.to_string(),
            accounts: instruction
                .accounts
                .iter()
                .map(|meta| DisplayAccountMeta {
                    pubkey: meta.pubkey.to_string(),
                    is_signer: meta.is_signer,
                    is_writable: meta.is_writable,
                })
                .collect(),
            data: instruction
                .data
                .iter()
                .map(|byte| format!("{:02x}", byte))
                .collect(),
        }
    }
}

#[derive(Debug)]
pub enum Outcome {
    DryRun(String),
    Submitted { signature: Signature, balance: f64 },
    Balance { address: Pubkey, balance: f64 },
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Outcome::DryRun(json) => write!(f, "{}", json),
            Outcome::Submitted { signature, balance } => {
                writeln!(f, "Signature: {}", signature)?;
                write!(f, "Balance: {:.4} SOL", balance)
            }
            Outcome::Balance { address, balance } => {
                write!(f, "{}: {:.4} SOL", address, balance)
            }
        }
    }
}

fn assert_owner(config: &TokenLockConfig, signer: &Pubkey) -> Result<(), Error> {
    if config.is_owner(signer) {
        Ok(())
    } else {
        warn!("{} is not the configured owner {}", signer, config.owner);
        Err(Error::NotOwner {
            signer: *signer,
            owner: config.owner,
        })
    }
}

/// Builds the instruction for a state-changing command.
/// Owner commands are refused early when the signer is not the configured owner.
pub fn build_instruction(
    config: &TokenLockConfig,
    signer: &Pubkey,
    command: &LockCommand,
) -> Result<Instruction, Error> {
    let token_lock = config.token_lock()?;

    let instruction = match command {
        LockCommand::Lock { amount } => token_lock.lock(*amount, signer)?,
        LockCommand::Unlock => token_lock.unlock(signer)?,
        LockCommand::SetDuration { seconds } => {
            assert_owner(config, signer)?;
            token_lock.modify_duration(*seconds, signer)?
        }
        LockCommand::ForceUnlock { target } => {
            assert_owner(config, signer)?;
            token_lock.force_unlock(target, signer)?
        }
    };

    debug!("Instruction data: {:?}", instruction.data);
    Ok(instruction)
}

pub fn process_command<C: Client, S: Signer>(
    client: &C,
    config: &TokenLockConfig,
    signer: &S,
    command: &LockCommand,
    dry_run: bool,
) -> Result<Outcome, Error> {
    let signer_pubkey = signer.pubkey();
    let instruction = build_instruction(config, &signer_pubkey, command)?;

    if dry_run {
        let json = serde_json::to_string_pretty(&DisplayInstruction::from(&instruction))?;
        return Ok(Outcome::DryRun(json));
    }

    let signature = send_instruction(client, signer, instruction, &config.confirm_options())?;
    let balance = check_balance(client, &signer_pubkey, config.denomination)?;

    Ok(Outcome::Submitted { signature, balance })
}

pub fn process_balance<C: Client>(
    client: &C,
    config: &TokenLockConfig,
    address: &Pubkey,
) -> Result<Outcome, Error> {
    let balance = check_balance(client, address, config.denomination)?;
    Ok(Outcome::Balance {
        address: *address,
        balance,
    })
}
