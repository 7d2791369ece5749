//! Batched position actions.
//!
//! Batches arrive as (code, parameter blob) pairs. Every pair is decoded into a
//! typed [`Action`] before anything executes, so an unknown code or a bad blob
//! rejects the whole batch up front.
//!
//! Blob layout: a sequence of 32-byte big-endian words. Amounts take one word,
//! account ids one word each (must fit in a u64).

use crate::types::{AccountId, Amount};
use primitive_types::U256;
use serde::{Deserialize, Serialize};

const WORD: usize = 32;

pub const ACTION_ADD_COLLATERAL: u8 = 1;
pub const ACTION_REMOVE_COLLATERAL: u8 = 2;
pub const ACTION_BORROW: u8 = 3;
pub const ACTION_REPAY: u8 = 4;
pub const ACTION_LIQUIDATE: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    AddCollateral { amount: Amount },
    RemoveCollateral { amount: Amount },
    Borrow { amount: Amount },
    Repay { amount: Amount },
    Liquidate { owner: AccountId, recipient: AccountId },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error("Unknown action code {0}")]
    UnknownAction(u8),

    #[error("Malformed parameters for action {code}: expected {expected} bytes, found {found}")]
    MalformedParams { code: u8, expected: usize, found: usize },

    #[error("Account id out of range in parameters for action {code}")]
    InvalidAccount { code: u8 },

    #[error("Batch has {actions} action codes but {params} parameter blobs")]
    MismatchedBatch { actions: usize, params: usize },
}

impl Action {
    pub fn code(&self) -> u8 {
        match self {
            Action::AddCollateral { .. } => ACTION_ADD_COLLATERAL,
            Action::RemoveCollateral { .. } => ACTION_REMOVE_COLLATERAL,
            Action::Borrow { .. } => ACTION_BORROW,
            Action::Repay { .. } => ACTION_REPAY,
            Action::Liquidate { .. } => ACTION_LIQUIDATE,
        }
    }

    /// Whether the ledger must be accrued before this action runs.
    /// Adding collateral never reads debt, everything else does.
    pub fn requires_accrual(&self) -> bool {
        !matches!(self, Action::AddCollateral { .. })
    }

    pub fn decode(code: u8, params: &[u8]) -> Result<Self, ActionError> {
        let words = match code {
            ACTION_ADD_COLLATERAL | ACTION_REMOVE_COLLATERAL | ACTION_BORROW | ACTION_REPAY => 1,
            ACTION_LIQUIDATE => 2,
            other => return Err(ActionError::UnknownAction(other)),
        };
        if params.len() != words * WORD {
            return Err(ActionError::MalformedParams {
                code,
                expected: words * WORD,
                found: params.len(),
            });
        }

        let word = |i: usize| U256::from_big_endian(&params[i * WORD..(i + 1) * WORD]);
        let account = |i: usize| -> Result<AccountId, ActionError> {
            let raw = word(i);
            if raw > U256::from(u64::MAX) {
                return Err(ActionError::InvalidAccount { code });
            }
            Ok(AccountId(raw.low_u64()))
        };

        Ok(match code {
            ACTION_ADD_COLLATERAL => Action::AddCollateral { amount: word(0) },
            ACTION_REMOVE_COLLATERAL => Action::RemoveCollateral { amount: word(0) },
            ACTION_BORROW => Action::Borrow { amount: word(0) },
            ACTION_REPAY => Action::Repay { amount: word(0) },
            _ => Action::Liquidate {
                owner: account(0)?,
                recipient: account(1)?,
            },
        })
    }

    pub fn encode(&self) -> (u8, Vec<u8>) {
        let words: Vec<U256> = match *self {
            Action::AddCollateral { amount }
            | Action::RemoveCollateral { amount }
            | Action::Borrow { amount }
            | Action::Repay { amount } => vec![amount],
            Action::Liquidate { owner, recipient } => {
                vec![U256::from(owner.0), U256::from(recipient.0)]
            }
        };

        let mut blob = vec![0u8; words.len() * WORD];
        for (i, w) in words.iter().enumerate() {
            w.to_big_endian(&mut blob[i * WORD..(i + 1) * WORD]);
        }
        (self.code(), blob)
    }
}

/// Decodes a whole batch. Fails on the first bad entry.
pub fn decode_batch(codes: &[u8], params: &[Vec<u8>]) -> Result<Vec<Action>, ActionError> {
    if codes.len() != params.len() {
        return Err(ActionError::MismatchedBatch {
            actions: codes.len(),
            params: params.len(),
        });
    }
    codes
        .iter()
        .zip(params)
        .map(|(code, blob)| Action::decode(*code, blob))
        .collect()
}

/// Inverse of [`decode_batch`], for building batches.
pub fn encode_batch(actions: &[Action]) -> (Vec<u8>, Vec<Vec<u8>>) {
    actions.iter().map(Action::encode).unzip()
}
