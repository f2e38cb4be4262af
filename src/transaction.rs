//! Synthetic transaction/block harness the contract script executes against.
//!
//! Blockchain persistence itself is an external collaborator; this module
//! only builds the in-memory shapes the `Blockchain` trait passes around
//! and the logic for wiring a transaction's outputs to the right script
//! hash once the contract has actually been loaded.

/// Placeholder script hash used for a transaction output whose real
/// destination is "the contract currently being debugged", which isn't
/// known until `Reset` loads it.
pub const CURRENT_HASH_PLACEHOLDER: [u8; 20] = [0xFF; 20];

/// One output of a synthetic transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    pub asset_id: Vec<u8>,
    /// Fixed-point amount (NEO's 8-decimal convention).
    pub amount: i128,
    pub script_hash: [u8; 20],
}

/// A synthetic transaction with two outputs, as built by `set_transaction`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub outputs: Vec<Output>,
}

/// A synthetic block containing zero or more transactions.
#[derive(Debug, Clone, Default)]
pub struct Block {
    pub timestamp: u32,
    pub transactions: Vec<Transaction>,
}

/// Blockchain/block/transaction persistence collaborator.
pub trait Blockchain {
    /// The most recently confirmed block, if any.
    fn current_block(&self) -> Option<&Block>;
    /// Produces a new, unconfirmed block.
    fn generate_block(&mut self) -> Block;
    /// Confirms `block`, making it the new `current_block`.
    fn confirm_block(&mut self, block: Block);
}

/// An in-memory blockchain sufficient for debugging sessions and tests.
#[derive(Debug, Default)]
pub struct InMemoryBlockchain {
    blocks: Vec<Block>,
}

impl Blockchain for InMemoryBlockchain {
    fn current_block(&self) -> Option<&Block> {
        self.blocks.last()
    }

    fn generate_block(&mut self) -> Block {
        Block {
            timestamp: self.blocks.len() as u32,
            transactions: Vec::new(),
        }
    }

    fn confirm_block(&mut self, block: Block) {
        self.blocks.push(block);
    }
}

/// Builds the synthetic transaction for `set_transaction`, confirming a
/// freshly generated block that carries it.
///
/// The second output's amount follows the source's own placeholder
/// formula `(amount * 10) * 10^8 - amount`, preserved verbatim: it models
/// a virtual balance that should eventually come from the blockchain
/// collaborator rather than being synthesized here, and it can go
/// negative when `amount` exceeds that synthesized total. Neither
/// behavior is corrected here.
pub fn set_transaction(
    blockchain: &mut dyn Blockchain,
    asset_id: Vec<u8>,
    amount: i128,
    destination: [u8; 20],
    source: [u8; 20],
) -> Transaction {
    let total_amount = (amount * 10) * 100_000_000;
    let tx = Transaction {
        outputs: vec![
            Output {
                asset_id: asset_id.clone(),
                amount,
                script_hash: destination,
            },
            Output {
                asset_id,
                amount: total_amount - amount,
                script_hash: source,
            },
        ],
    };

    let mut block = blockchain.generate_block();
    block.transactions.push(tx.clone());
    blockchain.confirm_block(block);
    tx
}

/// Rewrites any output in `tx` whose script hash is still the
/// [`CURRENT_HASH_PLACEHOLDER`] to the contract's real script hash, called
/// once the contract script has been loaded during `Reset`.
pub fn rewrite_current_hash(tx: &mut Transaction, contract_script_hash: [u8; 20]) {
    for output in &mut tx.outputs {
        if output.script_hash == CURRENT_HASH_PLACEHOLDER {
            output.script_hash = contract_script_hash;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_two_outputs_with_placeholder_formula() {
        let mut chain = InMemoryBlockchain::default();
        let tx = set_transaction(&mut chain, vec![1, 2, 3], 7, [1u8; 20], [0u8; 20]);
        assert_eq!(tx.outputs[0].amount, 7);
        assert_eq!(tx.outputs[1].amount, 7 * 10 * 100_000_000 - 7);
        assert!(chain.current_block().is_some());
    }

    #[test]
    fn rewrite_current_hash_only_touches_placeholder_outputs() {
        let mut tx = Transaction {
            outputs: vec![
                Output {
                    asset_id: vec![],
                    amount: 1,
                    script_hash: CURRENT_HASH_PLACEHOLDER,
                },
                Output {
                    asset_id: vec![],
                    amount: 2,
                    script_hash: [9u8; 20],
                },
            ],
        };
        rewrite_current_hash(&mut tx, [5u8; 20]);
        assert_eq!(tx.outputs[0].script_hash, [5u8; 20]);
        assert_eq!(tx.outputs[1].script_hash, [9u8; 20]);
    }
}
