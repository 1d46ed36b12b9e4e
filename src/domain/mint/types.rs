//! Records handed in by the chain-facing collaborator

use alloy_primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};

/// The fields of a transaction the resolver reads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub hash: B256,
    pub from: Address,
    #[serde(default)]
    pub to: Option<Address>,
    pub input: Bytes,
}

impl TransactionRecord {
    /// Shallow copy carrying `input` in place of the original calldata
    pub fn with_input(&self, input: Bytes) -> Self {
        Self {
            input,
            ..self.clone()
        }
    }
}

/// A gateway `LogMint` event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintEvent {
    /// Contract the gateway minted to
    #[serde(rename = "_to")]
    pub to: Address,
    #[serde(rename = "transactionHash")]
    pub transaction_hash: B256,
}

/// A mint event together with the transaction that emitted it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservedMint {
    pub event: MintEvent,
    pub transaction: TransactionRecord,
}

/// Beneficiary and amount extracted from a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolvedMint {
    pub beneficiary: Address,
    /// Token base units
    pub amount: U256,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observed_mint_from_json() {
        let json = r#"{
            "event": {
                "_to": "0x545b5f104ce8da0f37e63e5a977043291f790e04",
                "transactionHash": "0x697063909e68c0f9230f6015aed0332de2bbf660ca44c19d19e7fd9888f4cf66"
            },
            "transaction": {
                "hash": "0x697063909e68c0f9230f6015aed0332de2bbf660ca44c19d19e7fd9888f4cf66",
                "from": "0xABCDabcdABCDabcdABCDabcdABCDabcdABCDabcd",
                "to": "0xe4b679400F0f267212D5D812B95f58C83243EE71",
                "input": "0x77f61403"
            }
        }"#;

        let observed: ObservedMint = serde_json::from_str(json).unwrap();

        assert_eq!(observed.event.transaction_hash, observed.transaction.hash);
        assert_eq!(observed.transaction.input.as_ref(), &[0x77, 0xf6, 0x14, 0x03]);
        assert!(observed.transaction.to.is_some());
    }

    #[test]
    fn test_with_input_keeps_sender_and_hash() {
        let tx = TransactionRecord {
            hash: B256::repeat_byte(1),
            from: Address::repeat_byte(2),
            to: None,
            input: Bytes::from(vec![1, 2, 3, 4]),
        };

        let inner = tx.with_input(Bytes::from(vec![5, 6, 7, 8]));

        assert_eq!(inner.hash, tx.hash);
        assert_eq!(inner.from, tx.from);
        assert_eq!(inner.input.as_ref(), &[5, 6, 7, 8]);
    }
}
