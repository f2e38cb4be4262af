//! Injected collaborators.
//!
//! Per the design notes: the source implementation reached for process-wide
//! singletons (`Runtime.invokerKeys`, `Storage.lastStorageLength`) to answer
//! "who is calling?" and "how big was the last stored value?". Those are
//! modeled here as small traits the emulator is constructed with, rather
//! than global state, so a host application can supply real blockchain-
//! backed implementations while tests use the in-memory ones below.

use std::collections::HashMap;
use std::sync::Arc;

/// Answers "who is invoking this script?" Used to derive the synthetic
/// transaction's source address and to back `Neo.Runtime.CheckWitness`.
pub trait InvokerContext {
    /// The 20-byte script hash of the current invoker, or a 20-zero-byte
    /// default when no invoker has been configured.
    fn current_invoker_script_hash(&self) -> [u8; 20];
}

/// Default invoker: the 20-zero-byte placeholder address.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultInvokerContext;

impl InvokerContext for DefaultInvokerContext {
    fn current_invoker_script_hash(&self) -> [u8; 20] {
        [0u8; 20]
    }
}

impl<T: InvokerContext + ?Sized> InvokerContext for Arc<T> {
    fn current_invoker_script_hash(&self) -> [u8; 20] {
        (**self).current_invoker_script_hash()
    }
}

/// Tracks contract storage writes and the size of the most recent payload,
/// which the gas model needs to scale `Storage.Put` pricing.
pub trait StorageMeter {
    /// Records a write and updates `last_storage_payload_bytes`.
    fn put(&mut self, key: &[u8], value: &[u8]);

    /// Reads a previously stored value, if any.
    fn get(&self, key: &[u8]) -> Option<Vec<u8>>;

    /// The byte length of the value in the most recent `put`, used by the
    /// gas model's `Storage.Put` payload-size multiplier.
    fn last_storage_payload_bytes(&self) -> u64;
}

/// An in-memory storage meter sufficient for debugging sessions and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStorageMeter {
    entries: HashMap<Vec<u8>, Vec<u8>>,
    last_payload_bytes: u64,
}

impl StorageMeter for InMemoryStorageMeter {
    fn put(&mut self, key: &[u8], value: &[u8]) {
        self.last_payload_bytes = value.len() as u64;
        self.entries.insert(key.to_vec(), value.to_vec());
    }

    fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.entries.get(key).cloned()
    }

    fn last_storage_payload_bytes(&self) -> u64 {
        self.last_payload_bytes
    }
}
