//! The definitions for TokenLock instructions and their wire encoding

use std::{
    convert::TryFrom,
    io::{self, Error, ErrorKind, Write},
};

use borsh::{BorshDeserialize, BorshSerialize};
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use solana_program::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    system_program,
};

use crate::{
    error::TokenLockError,
    pack_utils::{pack_option, unpack_option, unpack_u8},
};

/// The length of the discriminant
pub const KIND_LEN: usize = 1;
/// The length of the tagged amount field when present
pub const AMOUNT_LEN: usize = 1 + 8;
/// The length of the tagged duration field when present
pub const NEW_DURATION_LEN: usize = 1 + 4;
/// The length of the tagged target field when present
pub const TARGET_LEN: usize = 1 + 32;
/// The largest possible encoded instruction
pub const MAX_INSTRUCTION_DATA_LEN: usize = KIND_LEN + AMOUNT_LEN + NEW_DURATION_LEN + TARGET_LEN;

/// The operation selected by the leading byte of the instruction data.
/// The numeric values are part of the wire format.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, FromPrimitive, Hash, PartialEq)]
pub enum OperationKind {
    /// Lock lamports from the user account
    LockTokens = 0,
    /// Release the user's locked lamports
    UnlockTokens = 1,
    /// Change the lock duration (owner only)
    ModifyLockDuration = 2,
    /// Release a target's locked lamports early (owner only)
    ForceUnlock = 3,
}

/// Wire-level instruction data.
///
/// Every optional field is written as a presence flag followed by its
/// little-endian value when present, in the order `amount`, `new_duration`,
/// `target`. Any combination of fields can be represented.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InstructionData {
    /// The operation discriminant
    pub kind: OperationKind,
    /// The number of lamports to lock
    pub amount: Option<u64>,
    /// The new lock duration in seconds
    pub new_duration: Option<u32>,
    /// The account whose lock is released
    pub target: Option<Pubkey>,
}

impl InstructionData {
    /// Instruction data with only the discriminant set
    pub fn new(kind: OperationKind) -> Self {
        Self {
            kind,
            amount: None,
            new_duration: None,
            target: None,
        }
    }

    /// The number of bytes this value occupies once encoded
    pub fn packed_len(&self) -> usize {
        fn tagged_len<T>(opt: &Option<T>, len: usize) -> usize {
            if opt.is_some() {
                len
            } else {
                1
            }
        }

        KIND_LEN
            + tagged_len(&self.amount, AMOUNT_LEN)
            + tagged_len(&self.new_duration, NEW_DURATION_LEN)
            + tagged_len(&self.target, TARGET_LEN)
    }

    fn check_required_fields(&self) -> Result<(), TokenLockError> {
        let missing = match self.kind {
            OperationKind::LockTokens if self.amount.is_none() => Some("amount"),
            OperationKind::ModifyLockDuration if self.new_duration.is_none() => {
                Some("new_duration")
            }
            OperationKind::ForceUnlock if self.target.is_none() => Some("target"),
            _ => None,
        };

        match missing {
            Some(field) => Err(TokenLockError::invalid_argument(format!(
                "{:?} requires {}",
                self.kind, field
            ))),
            None => Ok(()),
        }
    }
}

impl BorshSerialize for InstructionData {
    fn serialize<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&[self.kind as u8])?;
        pack_option(&self.amount, writer, |amount| amount.to_le_bytes())?;
        pack_option(&self.new_duration, writer, |duration| duration.to_le_bytes())?;
        pack_option(&self.target, writer, |target| target.to_bytes())
    }
}

impl BorshDeserialize for InstructionData {
    fn deserialize(buf: &mut &[u8]) -> io::Result<Self> {
        let tag = unpack_u8(buf)?;
        let kind = OperationKind::from_u8(tag).ok_or_else(|| {
            Error::new(
                ErrorKind::InvalidData,
                format!("unknown instruction discriminant {}", tag),
            )
        })?;

        Ok(Self {
            kind,
            amount: unpack_option(buf, u64::from_le_bytes)?,
            new_duration: unpack_option(buf, u32::from_le_bytes)?,
            target: unpack_option(buf, Pubkey::new_from_array)?,
        })
    }
}

/// Serializes instruction data, failing without output if the field the
/// discriminant requires is absent
pub fn encode(data: &InstructionData) -> Result<Vec<u8>, TokenLockError> {
    data.check_required_fields()?;

    let mut buf = Vec::with_capacity(data.packed_len());
    data.serialize(&mut buf)
        .map_err(|err| TokenLockError::SerializationFailure(err.to_string()))?;

    if buf.len() != data.packed_len() {
        return Err(TokenLockError::SerializationFailure(format!(
            "encoded {} bytes, expected {}",
            buf.len(),
            data.packed_len()
        )));
    }

    Ok(buf)
}

/// Parses instruction data, rejecting unknown discriminants, bad presence
/// flags, truncated values and trailing bytes
pub fn decode(input: &[u8]) -> Result<InstructionData, TokenLockError> {
    InstructionData::try_from_slice(input).map_err(|err| {
        TokenLockError::invalid_argument(format!("malformed instruction data: {}", err))
    })
}

/// A TokenLock instruction
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TokenLockInstruction {
    /// Lock lamports belonging to the user
    ///
    /// # Account references
    ///   0. `[SIGNER, WRITE]` User account
    ///   1. `[]` System program account
    LockTokens {
        /// The number of lamports to lock
        amount: u64,
    },

    /// Unlock the user's lamports once the lock duration has passed
    ///
    /// # Account references
    ///   0. `[SIGNER, WRITE]` User account
    ///   1. `[]` System program account
    UnlockTokens,

    /// Change the lock duration applied by the program.
    /// Only the program owner is expected to sign this; the program enforces it.
    ///
    /// # Account references
    ///   0. `[SIGNER]` Owner account
    ModifyLockDuration {
        /// The new lock duration in seconds
        new_duration: u32,
    },

    /// Release the target's locked lamports regardless of the deadline.
    /// Only the program owner is expected to sign this; the program enforces it.
    ///
    /// # Account references
    ///   0. `[WRITE]` Target account
    ///   1. `[SIGNER]` Owner account
    ForceUnlock {
        /// The account whose lock is released
        target: Pubkey,
    },
}

impl TokenLockInstruction {
    /// The discriminant of this instruction
    pub fn kind(&self) -> OperationKind {
        match self {
            TokenLockInstruction::LockTokens { .. } => OperationKind::LockTokens,
            TokenLockInstruction::UnlockTokens => OperationKind::UnlockTokens,
            TokenLockInstruction::ModifyLockDuration { .. } => OperationKind::ModifyLockDuration,
            TokenLockInstruction::ForceUnlock { .. } => OperationKind::ForceUnlock,
        }
    }

    /// Packs the instruction into its wire format
    pub fn pack(&self) -> Result<Vec<u8>, TokenLockError> {
        encode(&InstructionData::from(self))
    }

    /// Unpacks a byte buffer into a TokenLockInstruction
    pub fn unpack(input: &[u8]) -> Result<Self, TokenLockError> {
        Self::try_from(decode(input)?)
    }
}

impl From<&TokenLockInstruction> for InstructionData {
    fn from(instruction: &TokenLockInstruction) -> Self {
        let mut data = InstructionData::new(instruction.kind());
        match *instruction {
            TokenLockInstruction::LockTokens { amount } => data.amount = Some(amount),
            TokenLockInstruction::UnlockTokens => {}
            TokenLockInstruction::ModifyLockDuration { new_duration } => {
                data.new_duration = Some(new_duration)
            }
            TokenLockInstruction::ForceUnlock { target } => data.target = Some(target),
        }
        data
    }
}

impl TryFrom<InstructionData> for TokenLockInstruction {
    type Error = TokenLockError;

    fn try_from(data: InstructionData) -> Result<Self, Self::Error> {
        data.check_required_fields()?;

        let InstructionData {
            kind,
            amount,
            new_duration,
            target,
        } = data;

        let (instruction, extra) = match (kind, amount, new_duration, target) {
            (OperationKind::LockTokens, Some(amount), new_duration, target) => (
                TokenLockInstruction::LockTokens { amount },
                new_duration.is_some() || target.is_some(),
            ),
            (OperationKind::UnlockTokens, amount, new_duration, target) => (
                TokenLockInstruction::UnlockTokens,
                amount.is_some() || new_duration.is_some() || target.is_some(),
            ),
            (OperationKind::ModifyLockDuration, amount, Some(new_duration), target) => (
                TokenLockInstruction::ModifyLockDuration { new_duration },
                amount.is_some() || target.is_some(),
            ),
            (OperationKind::ForceUnlock, amount, new_duration, Some(target)) => (
                TokenLockInstruction::ForceUnlock { target },
                amount.is_some() || new_duration.is_some(),
            ),
            _ => {
                return Err(TokenLockError::SerializationFailure(format!(
                    "required field check passed but {:?} is incomplete",
                    kind
                )))
            }
        };

        if extra {
            return Err(TokenLockError::invalid_argument(format!(
                "{:?} carries fields that do not belong to it",
                kind
            )));
        }

        Ok(instruction)
    }
}

/// Accounts for LockTokens
pub fn lock_tokens_accounts(user: &Pubkey) -> Vec<AccountMeta> {
    vec![
        AccountMeta::new(*user, true),
        AccountMeta::new_readonly(system_program::id(), false),
    ]
}

/// Accounts for UnlockTokens
pub fn unlock_tokens_accounts(user: &Pubkey) -> Vec<AccountMeta> {
    vec![
        AccountMeta::new(*user, true),
        AccountMeta::new_readonly(system_program::id(), false),
    ]
}

/// Accounts for ModifyLockDuration
pub fn modify_lock_duration_accounts(owner: &Pubkey) -> Vec<AccountMeta> {
    vec![AccountMeta::new_readonly(*owner, true)]
}

/// Accounts for ForceUnlock
pub fn force_unlock_accounts(target: &Pubkey, owner: &Pubkey) -> Vec<AccountMeta> {
    vec![
        AccountMeta::new(*target, false),
        AccountMeta::new_readonly(*owner, true),
    ]
}

fn build_instruction(
    program_id: &Pubkey,
    instruction: &TokenLockInstruction,
    accounts: Vec<AccountMeta>,
) -> Result<Instruction, TokenLockError> {
    Ok(Instruction {
        program_id: *program_id,
        accounts,
        data: instruction.pack()?,
    })
}

/// Creates a `LockTokens` instruction
pub fn lock_tokens(
    program_id: &Pubkey,
    user: &Pubkey,
    amount: u64,
) -> Result<Instruction, TokenLockError> {
    build_instruction(
        program_id,
        &TokenLockInstruction::LockTokens { amount },
        lock_tokens_accounts(user),
    )
}

/// Creates an `UnlockTokens` instruction
pub fn unlock_tokens(program_id: &Pubkey, user: &Pubkey) -> Result<Instruction, TokenLockError> {
    build_instruction(
        program_id,
        &TokenLockInstruction::UnlockTokens,
        unlock_tokens_accounts(user),
    )
}

/// Creates a `ModifyLockDuration` instruction
pub fn modify_lock_duration(
    program_id: &Pubkey,
    owner: &Pubkey,
    new_duration: u32,
) -> Result<Instruction, TokenLockError> {
    build_instruction(
        program_id,
        &TokenLockInstruction::ModifyLockDuration { new_duration },
        modify_lock_duration_accounts(owner),
    )
}

/// Creates a `ForceUnlock` instruction
pub fn force_unlock(
    program_id: &Pubkey,
    target: &Pubkey,
    owner: &Pubkey,
) -> Result<Instruction, TokenLockError> {
    build_instruction(
        program_id,
        &TokenLockInstruction::ForceUnlock { target: *target },
        force_unlock_accounts(target, owner),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discriminants_are_stable() {
        assert_eq!(OperationKind::LockTokens as u8, 0);
        assert_eq!(OperationKind::UnlockTokens as u8, 1);
        assert_eq!(OperationKind::ModifyLockDuration as u8, 2);
        assert_eq!(OperationKind::ForceUnlock as u8, 3);
        assert_eq!(OperationKind::from_u8(4), None);
    }

    #[test]
    fn test_encode_unlock() {
        let data = encode(&InstructionData::new(OperationKind::UnlockTokens)).unwrap();
        assert_eq!(data, vec![1, 0, 0, 0]);
    }

    #[test]
    fn test_encode_modify_lock_duration() {
        let instruction = TokenLockInstruction::ModifyLockDuration {
            new_duration: 86_400,
        };
        let data = instruction.pack().unwrap();
        assert_eq!(data, vec![2, 0, 1, 0x80, 0x51, 0x01, 0x00, 0]);
        assert_eq!(data.len(), InstructionData::from(&instruction).packed_len());
    }

    #[test]
    fn test_encode_force_unlock() {
        let target = Pubkey::new_from_array([7; 32]);
        let data = TokenLockInstruction::ForceUnlock { target }.pack().unwrap();
        assert_eq!(data.len(), 1 + 1 + 1 + TARGET_LEN);
        assert_eq!(&data[..4], &[3, 0, 0, 1]);
        assert_eq!(&data[4..], &[7; 32]);
    }

    #[test]
    fn test_encode_all_fields_present() {
        let data = InstructionData {
            kind: OperationKind::LockTokens,
            amount: Some(1),
            new_duration: Some(2),
            target: Some(Pubkey::new_from_array([3; 32])),
        };
        let bytes = encode(&data).unwrap();
        assert_eq!(bytes.len(), MAX_INSTRUCTION_DATA_LEN);
        assert_eq!(decode(&bytes).unwrap(), data);
    }

    #[test]
    fn test_encode_missing_required_field() {
        for kind in [
            OperationKind::LockTokens,
            OperationKind::ModifyLockDuration,
            OperationKind::ForceUnlock,
        ] {
            let err = encode(&InstructionData::new(kind)).unwrap_err();
            assert!(matches!(err, TokenLockError::InvalidArgument(_)), "{:?}", kind);
        }
    }

    #[test]
    fn test_decode_rejects_unknown_discriminant() {
        let err = decode(&[4, 0, 0, 0]).unwrap_err();
        assert!(matches!(err, TokenLockError::InvalidArgument(_)));
    }

    #[test]
    fn test_decode_rejects_trailing_bytes() {
        let err = decode(&[1, 0, 0, 0, 0]).unwrap_err();
        assert!(matches!(err, TokenLockError::InvalidArgument(_)));
    }

    #[test]
    fn test_decode_rejects_truncated_amount() {
        let err = decode(&[0, 1, 0, 0, 0]).unwrap_err();
        assert!(matches!(err, TokenLockError::InvalidArgument(_)));
    }

    #[test]
    fn test_unpack_rejects_foreign_fields() {
        let mut data = InstructionData::new(OperationKind::UnlockTokens);
        data.new_duration = Some(10);
        let bytes = encode(&data).unwrap();

        assert_eq!(decode(&bytes).unwrap(), data);
        assert!(matches!(
            TokenLockInstruction::unpack(&bytes),
            Err(TokenLockError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_unpack_rejects_missing_field() {
        // LockTokens with the amount flag cleared
        let err = TokenLockInstruction::unpack(&[0, 0, 0, 0]).unwrap_err();
        assert!(matches!(err, TokenLockError::InvalidArgument(_)));
    }

    #[test]
    fn test_force_unlock_account_order() {
        let program_id = Pubkey::new_unique();
        let target = Pubkey::new_unique();
        let owner = Pubkey::new_unique();

        let ix = force_unlock(&program_id, &target, &owner).unwrap();
        assert_eq!(ix.program_id, program_id);
        assert_eq!(
            ix.accounts,
            vec![
                AccountMeta::new(target, false),
                AccountMeta::new_readonly(owner, true),
            ]
        );
    }

    #[test]
    fn test_lock_and_unlock_accounts() {
        let user = Pubkey::new_unique();
        let expected = vec![
            AccountMeta::new(user, true),
            AccountMeta::new_readonly(system_program::id(), false),
        ];
        assert_eq!(lock_tokens_accounts(&user), expected);
        assert_eq!(unlock_tokens_accounts(&user), expected);
        assert_eq!(
            modify_lock_duration_accounts(&user),
            vec![AccountMeta::new_readonly(user, true)]
        );
    }
}
