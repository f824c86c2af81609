//! Named constructors for every TokenLock operation

use solana_program::{instruction::Instruction, native_token::LAMPORTS_PER_SOL, pubkey::Pubkey};

use crate::{error::TokenLockError, instruction, validation_utils::*};

/// Builds TokenLock instructions for a single deployment of the program.
///
/// Owner-only operations are not gated here. Which account must sign is
/// described by the account list, and authorization is left to the program.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TokenLock {
    program_id: Pubkey,
    denomination: u64,
}

impl TokenLock {
    /// Instructions for the program at `program_id`, with amounts given in SOL
    pub fn new(program_id: Pubkey) -> Self {
        Self {
            program_id,
            denomination: LAMPORTS_PER_SOL,
        }
    }

    /// Overrides the number of smallest units in one display unit, which must
    /// not be zero
    pub fn with_denomination(mut self, denomination: u64) -> Result<Self, TokenLockError> {
        if denomination == 0 {
            return Err(TokenLockError::InvalidArgument(
                "denomination must be at least 1".to_string(),
            ));
        }
        self.denomination = denomination;
        Ok(self)
    }

    /// The program the instructions are addressed to
    pub fn program_id(&self) -> &Pubkey {
        &self.program_id
    }

    /// The number of smallest units in one display unit
    pub fn denomination(&self) -> u64 {
        self.denomination
    }

    /// Lock `amount` display units from `user`
    pub fn lock(&self, amount: f64, user: &Pubkey) -> Result<Instruction, TokenLockError> {
        let amount = display_to_base_units(amount, self.denomination)?;
        instruction::lock_tokens(&self.program_id, user, amount)
    }

    /// Unlock the funds held for `user`
    pub fn unlock(&self, user: &Pubkey) -> Result<Instruction, TokenLockError> {
        instruction::unlock_tokens(&self.program_id, user)
    }

    /// Set a new lock duration, signed by `owner`
    pub fn modify_duration(
        &self,
        new_duration_seconds: i64,
        owner: &Pubkey,
    ) -> Result<Instruction, TokenLockError> {
        let new_duration = assert_duration(new_duration_seconds)?;
        instruction::modify_lock_duration(&self.program_id, owner, new_duration)
    }

    /// Release the lock held for `target`, signed by `owner`
    pub fn force_unlock(&self, target: &str, owner: &Pubkey) -> Result<Instruction, TokenLockError> {
        let target = parse_address(target)?;
        instruction::force_unlock(&self.program_id, &target, owner)
    }
}
