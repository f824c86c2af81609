use crate::error::Error;
use log::*;
use solana_client::rpc_client::RpcClient;
use solana_program::{hash::Hash, instruction::Instruction, pubkey::Pubkey};
use solana_sdk::{
    commitment_config::CommitmentConfig,
    signature::{Signature, Signer},
    transaction::{self, Transaction},
};
use std::{thread::sleep, time::Duration};

/// The ledger operations the client depends on
pub trait Client {
    fn latest_blockhash(&self) -> Result<Hash, Error>;
    fn submit_transaction(&self, transaction: &Transaction) -> Result<Signature, Error>;
    /// `None` while the transaction has not reached `commitment`
    fn get_signature_status(
        &self,
        signature: &Signature,
        commitment: CommitmentConfig,
    ) -> Result<Option<transaction::Result<()>>, Error>;
    fn get_balance(&self, pubkey: &Pubkey) -> Result<u64, Error>;
}

impl Client for RpcClient {
    fn latest_blockhash(&self) -> Result<Hash, Error> {
        self.get_latest_blockhash()
            .map_err(|e| Error::Transport(e.to_string()))
    }

    fn submit_transaction(&self, transaction: &Transaction) -> Result<Signature, Error> {
        self.send_transaction(transaction)
            .map_err(|e| Error::Transport(e.to_string()))
    }

    fn get_signature_status(
        &self,
        signature: &Signature,
        commitment: CommitmentConfig,
    ) -> Result<Option<transaction::Result<()>>, Error> {
        self.get_signature_status_with_commitment(signature, commitment)
            .map_err(|e| Error::Transport(e.to_string()))
    }

    fn get_balance(&self, pubkey: &Pubkey) -> Result<u64, Error> {
        RpcClient::get_balance(self, pubkey).map_err(|e| Error::Transport(e.to_string()))
    }
}

/// How long to wait for a submitted transaction to land
#[derive(Clone, Copy, Debug)]
pub struct ConfirmOptions {
    pub commitment: CommitmentConfig,
    pub attempts: usize,
    pub poll_interval: Duration,
}

/// Balance of `pubkey` in display units
pub fn check_balance<C: Client>(
    client: &C,
    pubkey: &Pubkey,
    denomination: u64,
) -> Result<f64, Error> {
    Ok(client.get_balance(pubkey)? as f64 / denomination as f64)
}

/// Wraps `instruction` in a transaction paid for by `signer`, submits it and
/// waits for confirmation
pub fn send_instruction<C: Client, S: Signer>(
    client: &C,
    signer: &S,
    instruction: Instruction,
    options: &ConfirmOptions,
) -> Result<Signature, Error> {
    let payer = signer.pubkey();
    let mut transaction = Transaction::new_with_payer(&[instruction], Some(&payer));

    let blockhash = client.latest_blockhash()?;
    transaction.try_sign(&[signer], blockhash)?;

    let signature = client.submit_transaction(&transaction)?;
    info!("Transaction sent: {}", signature);

    for attempt in 0..options.attempts {
        match client.get_signature_status(&signature, options.commitment)? {
            Some(Ok(())) => {
                info!("Transaction {} confirmed", signature);
                return Ok(signature);
            }
            Some(Err(err)) => {
                error!("Transaction {} failed: {}", signature, err);
                return Err(Error::TransactionFailed(signature, err));
            }
            None => {}
        }
        debug!(
            "Transaction {} not yet confirmed ({}/{})",
            signature,
            attempt + 1,
            options.attempts
        );
        sleep(options.poll_interval);
    }

    Err(Error::Unconfirmed(signature))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use solana_sdk::{
        instruction::InstructionError, signature::Keypair, transaction::TransactionError,
    };
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Records submitted transactions and lands each after a fixed number of polls,
    /// with `failure` as its status if set
    #[derive(Default)]
    pub struct MockClient {
        pub balances: HashMap<Pubkey, u64>,
        pub polls_until_confirmed: usize,
        pub failure: Option<TransactionError>,
        pub fail_submit: bool,
        pub submitted: RefCell<Vec<Transaction>>,
        pub polls: RefCell<usize>,
    }

    impl Client for MockClient {
        fn latest_blockhash(&self) -> Result<Hash, Error> {
            Ok(Hash::new_unique())
        }

        fn submit_transaction(&self, transaction: &Transaction) -> Result<Signature, Error> {
            if self.fail_submit {
                return Err(Error::Transport("connection refused".to_string()));
            }
            self.submitted.borrow_mut().push(transaction.clone());
            Ok(transaction.signatures[0])
        }

        fn get_signature_status(
            &self,
            _signature: &Signature,
            _commitment: CommitmentConfig,
        ) -> Result<Option<transaction::Result<()>>, Error> {
            let mut polls = self.polls.borrow_mut();
            *polls += 1;
            if *polls <= self.polls_until_confirmed {
                return Ok(None);
            }
            Ok(Some(self.failure.clone().map_or(Ok(()), Err)))
        }

        fn get_balance(&self, pubkey: &Pubkey) -> Result<u64, Error> {
            Ok(self.balances.get(pubkey).copied().unwrap_or_default())
        }
    }

    pub fn confirm_options(attempts: usize) -> ConfirmOptions {
        ConfirmOptions {
            commitment: CommitmentConfig::confirmed(),
            attempts,
            poll_interval: Duration::from_millis(1),
        }
    }

    fn noop_instruction(payer: &Pubkey) -> Instruction {
        token_lock::instruction::unlock_tokens(&Pubkey::new_unique(), payer).unwrap()
    }

    #[test]
    fn test_send_instruction_signs_and_confirms() {
        let client = MockClient {
            polls_until_confirmed: 2,
            ..MockClient::default()
        };
        let signer = Keypair::new();

        let signature = send_instruction(
            &client,
            &signer,
            noop_instruction(&signer.pubkey()),
            &confirm_options(5),
        )
        .unwrap();

        let submitted = client.submitted.borrow();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].signatures[0], signature);
        assert_eq!(submitted[0].message.account_keys[0], signer.pubkey());
        assert!(submitted[0].verify().is_ok());
        assert_eq!(*client.polls.borrow(), 3);
    }

    #[test]
    fn test_send_instruction_gives_up() {
        let client = MockClient {
            polls_until_confirmed: 10,
            ..MockClient::default()
        };
        let signer = Keypair::new();

        let err = send_instruction(
            &client,
            &signer,
            noop_instruction(&signer.pubkey()),
            &confirm_options(3),
        )
        .unwrap_err();

        assert!(matches!(err, Error::Unconfirmed(_)));
        assert_eq!(*client.polls.borrow(), 3);
    }

    #[test]
    fn test_send_instruction_reports_failed_transaction() {
        let failure = TransactionError::InstructionError(0, InstructionError::Custom(6));
        let client = MockClient {
            failure: Some(failure.clone()),
            ..MockClient::default()
        };
        let signer = Keypair::new();

        let err = send_instruction(
            &client,
            &signer,
            noop_instruction(&signer.pubkey()),
            &confirm_options(5),
        )
        .unwrap_err();

        match err {
            Error::TransactionFailed(signature, err) => {
                assert_eq!(signature, client.submitted.borrow()[0].signatures[0]);
                assert_eq!(err, failure);
            }
            other => panic!("unexpected error {:?}", other),
        }
        assert_eq!(*client.polls.borrow(), 1);
    }

    #[test]
    fn test_send_instruction_surfaces_transport_error() {
        let client = MockClient {
            fail_submit: true,
            ..MockClient::default()
        };
        let signer = Keypair::new();

        let err = send_instruction(
            &client,
            &signer,
            noop_instruction(&signer.pubkey()),
            &confirm_options(3),
        )
        .unwrap_err();

        assert!(matches!(err, Error::Transport(_)));
        assert_eq!(*client.polls.borrow(), 0);
    }

    #[test]
    fn test_check_balance() {
        let pubkey = Pubkey::new_unique();
        let mut client = MockClient::default();
        client.balances.insert(pubkey, 2_500_000_000);

        assert_eq!(check_balance(&client, &pubkey, 1_000_000_000).unwrap(), 2.5);
        assert_eq!(
            check_balance(&client, &Pubkey::new_unique(), 1_000_000_000).unwrap(),
            0.0
        );
    }
}
