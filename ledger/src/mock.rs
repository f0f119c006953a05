//! In-memory mock ledger and wallet.
//!
//! A deterministic stand-in for a real chain: request ids and tx hashes
//! derive from keccak over `(user, nonce)`, mining is instantaneous, and
//! rate-limit faults can be injected per block range. Used by the demo CLI
//! and by tests that need to observe query ordering and counts.

use crate::client::LedgerClient;
use crate::error::LedgerError;
use crate::event::{CompletedEvent, RequestedEvent};
use crate::wallet::{Receipt, Wallet};
use sha3::{Digest, Keccak256};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use verity_attestation::Attestation;
use verity_types::{Address, ChainId, DataType, RequestId, Timestamp, TxHash};

/// A rate-limit fault covering a block range.
struct Fault {
    from_block: u64,
    to_block: u64,
    /// How many more queries fail before the fault clears; `None` = always.
    remaining: Option<u32>,
}

struct MockChain {
    height: u64,
    clock: u64,
    nonce: u64,
    requested: Vec<RequestedEvent>,
    completed: Vec<CompletedEvent>,
    /// Mined transactions: hash → block number.
    receipts: HashMap<TxHash, u64>,
    faults: Vec<Fault>,
    /// Every ranged log query issued, in order.
    log_queries: Vec<(u64, u64)>,
}

impl MockChain {
    fn next_ids(&mut self, user: &Address) -> (TxHash, RequestId) {
        self.nonce += 1;
        let tx = TxHash::new(derive32(b"tx", user, self.nonce));
        let id = RequestId::new(derive32(b"req", user, self.nonce));
        (tx, id)
    }

    fn mine(&mut self) -> (u64, Timestamp) {
        self.height += 1;
        self.clock += 1;
        (self.height, Timestamp::new(self.clock))
    }

    /// Record the query and fail it if a fault covers the range.
    fn check_range(&mut self, from_block: u64, to_block: u64) -> Result<(), LedgerError> {
        self.log_queries.push((from_block, to_block));
        for fault in &mut self.faults {
            let overlaps = from_block <= fault.to_block && to_block >= fault.from_block;
            if !overlaps {
                continue;
            }
            match &mut fault.remaining {
                None => return Err(LedgerError::RateLimited),
                Some(0) => {}
                Some(n) => {
                    *n -= 1;
                    return Err(LedgerError::RateLimited);
                }
            }
        }
        Ok(())
    }
}

fn derive32(tag: &[u8], user: &Address, nonce: u64) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(tag);
    hasher.update(user.as_bytes());
    hasher.update(nonce.to_be_bytes());
    hasher.finalize().into()
}

/// An in-memory ledger with instantaneous mining.
pub struct MockLedger {
    inner: Mutex<MockChain>,
}

impl MockLedger {
    /// A chain whose tip is at `height`.
    pub fn new(height: u64) -> Self {
        Self {
            inner: Mutex::new(MockChain {
                height,
                clock: 1_700_000_000,
                nonce: 0,
                requested: Vec::new(),
                completed: Vec::new(),
                receipts: HashMap::new(),
                faults: Vec::new(),
                log_queries: Vec::new(),
            }),
        }
    }

    /// Advance the tip without emitting events.
    pub fn advance(&self, blocks: u64) {
        self.inner.lock().unwrap().height += blocks;
    }

    /// Make every log query overlapping `[from_block, to_block]` fail with
    /// a rate limit; `failures` bounds how many queries fail (`None` =
    /// every query, forever).
    pub fn inject_rate_limit(&self, from_block: u64, to_block: u64, failures: Option<u32>) {
        self.inner.lock().unwrap().faults.push(Fault {
            from_block,
            to_block,
            remaining: failures,
        });
    }

    /// Ranged log queries issued so far, in call order.
    pub fn log_queries(&self) -> Vec<(u64, u64)> {
        self.inner.lock().unwrap().log_queries.clone()
    }

    pub fn log_query_count(&self) -> usize {
        self.inner.lock().unwrap().log_queries.len()
    }

    /// Mine a request transaction: emits the request event in a fresh block
    /// and returns its provenance.
    pub fn mine_request(&self, user: Address, data_type: DataType) -> (TxHash, RequestId) {
        let mut chain = self.inner.lock().unwrap();
        let (tx_hash, request_id) = chain.next_ids(&user);
        let (block_number, timestamp) = chain.mine();
        chain.requested.push(RequestedEvent {
            user,
            request_id,
            data_type: data_type.as_str().to_string(),
            timestamp,
            tx_hash,
            block_number,
        });
        chain.receipts.insert(tx_hash, block_number);
        (tx_hash, request_id)
    }

    /// Mine a completion transaction. Rejected when no request event with
    /// this id exists, matching the contract's request-before-completion
    /// guarantee.
    pub fn mine_completion(
        &self,
        user: Address,
        request_id: RequestId,
        success: bool,
    ) -> Result<TxHash, LedgerError> {
        let mut chain = self.inner.lock().unwrap();
        if !chain.requested.iter().any(|ev| ev.request_id == request_id) {
            return Err(LedgerError::Rejected(format!(
                "unknown request id {request_id}"
            )));
        }
        let (tx_hash, _) = chain.next_ids(&user);
        let (block_number, timestamp) = chain.mine();
        chain.completed.push(CompletedEvent {
            user,
            request_id,
            success,
            timestamp,
            tx_hash,
            block_number,
        });
        chain.receipts.insert(tx_hash, block_number);
        Ok(tx_hash)
    }

    /// Block a mined transaction landed in, if mined.
    pub fn receipt_block(&self, tx_hash: TxHash) -> Option<u64> {
        self.inner.lock().unwrap().receipts.get(&tx_hash).copied()
    }
}

impl LedgerClient for MockLedger {
    async fn chain_height(&self) -> Result<u64, LedgerError> {
        Ok(self.inner.lock().unwrap().height)
    }

    async fn requested_events(
        &self,
        user: Address,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<RequestedEvent>, LedgerError> {
        let mut chain = self.inner.lock().unwrap();
        chain.check_range(from_block, to_block)?;
        Ok(chain
            .requested
            .iter()
            .filter(|ev| {
                ev.user == user && ev.block_number >= from_block && ev.block_number <= to_block
            })
            .cloned()
            .collect())
    }

    async fn completed_events(
        &self,
        user: Address,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<CompletedEvent>, LedgerError> {
        let mut chain = self.inner.lock().unwrap();
        chain.check_range(from_block, to_block)?;
        Ok(chain
            .completed
            .iter()
            .filter(|ev| {
                ev.user == user && ev.block_number >= from_block && ev.block_number <= to_block
            })
            .cloned()
            .collect())
    }

    async fn request_event_by_tx(
        &self,
        tx_hash: TxHash,
    ) -> Result<Option<RequestedEvent>, LedgerError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .requested
            .iter()
            .find(|ev| ev.tx_hash == tx_hash)
            .cloned())
    }
}

/// A wallet driving a [`MockLedger`], with programmable misbehavior.
pub struct MockWallet {
    ledger: Arc<MockLedger>,
    address: Option<Address>,
    chain: ChainId,
    switchable: bool,
    completion_success: bool,
    stall_confirmations: bool,
    fail_next_submit: Mutex<Option<String>>,
}

impl MockWallet {
    /// A connected wallet already on the local chain.
    pub fn new(ledger: Arc<MockLedger>, address: Address) -> Self {
        Self {
            ledger,
            address: Some(address),
            chain: ChainId::LOCAL,
            switchable: true,
            completion_success: true,
            stall_confirmations: false,
            fail_next_submit: Mutex::new(None),
        }
    }

    /// A wallet with no connected account.
    pub fn disconnected(ledger: Arc<MockLedger>) -> Self {
        let mut wallet = Self::new(ledger, Address::ZERO);
        wallet.address = None;
        wallet
    }

    /// Start on a different chain.
    pub fn on_chain(mut self, chain: ChainId) -> Self {
        self.chain = chain;
        self
    }

    /// Make chain switches fail.
    pub fn deny_switch(mut self) -> Self {
        self.switchable = false;
        self
    }

    /// Control the success flag of mined completion events.
    pub fn with_completion_success(mut self, success: bool) -> Self {
        self.completion_success = success;
        self
    }

    /// Make confirmations hang until the caller's timeout expires.
    pub fn stall_confirmations(mut self) -> Self {
        self.stall_confirmations = true;
        self
    }

    /// Make the next submission fail with the given wallet error.
    pub fn fail_next_submit(&self, message: &str) {
        *self.fail_next_submit.lock().unwrap() = Some(message.to_string());
    }

    fn take_submit_fault(&self) -> Option<String> {
        self.fail_next_submit.lock().unwrap().take()
    }

    fn connected(&self) -> Result<Address, LedgerError> {
        self.address
            .ok_or_else(|| LedgerError::Rejected("no connected account".into()))
    }
}

impl Wallet for MockWallet {
    fn address(&self) -> Option<Address> {
        self.address
    }

    fn chain_id(&self) -> ChainId {
        self.chain
    }

    async fn switch_chain(&mut self, chain: ChainId) -> Result<(), LedgerError> {
        if !self.switchable {
            return Err(LedgerError::SwitchFailed(chain));
        }
        self.chain = chain;
        Ok(())
    }

    async fn submit_request(
        &self,
        data_type: DataType,
        _attestation: &Attestation,
        _fee_wei: u128,
    ) -> Result<TxHash, LedgerError> {
        if let Some(message) = self.take_submit_fault() {
            return Err(LedgerError::Rejected(message));
        }
        let user = self.connected()?;
        let (tx_hash, _) = self.ledger.mine_request(user, data_type);
        Ok(tx_hash)
    }

    async fn submit_completion(&self, request_id: RequestId) -> Result<TxHash, LedgerError> {
        if let Some(message) = self.take_submit_fault() {
            return Err(LedgerError::Rejected(message));
        }
        let user = self.connected()?;
        self.ledger
            .mine_completion(user, request_id, self.completion_success)
    }

    async fn wait_for_confirmation(
        &self,
        tx_hash: TxHash,
        timeout: Duration,
    ) -> Result<Receipt, LedgerError> {
        if self.stall_confirmations {
            tokio::time::sleep(timeout).await;
            return Err(LedgerError::ConfirmationTimeout(tx_hash));
        }
        match self.ledger.receipt_block(tx_hash) {
            Some(block_number) => Ok(Receipt {
                tx_hash,
                block_number,
            }),
            None => {
                tokio::time::sleep(timeout).await;
                Err(LedgerError::ConfirmationTimeout(tx_hash))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> Address {
        Address::new([0x42; 20])
    }

    #[tokio::test]
    async fn mined_request_is_queryable() {
        let ledger = MockLedger::new(100);
        let (tx_hash, request_id) = ledger.mine_request(user(), DataType::Identity);

        assert_eq!(ledger.chain_height().await.unwrap(), 101);
        let events = ledger.requested_events(user(), 0, 200).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].request_id, request_id);
        assert_eq!(events[0].tx_hash, tx_hash);

        let by_tx = ledger.request_event_by_tx(tx_hash).await.unwrap().unwrap();
        assert_eq!(by_tx.request_id, request_id);
    }

    #[tokio::test]
    async fn events_are_scoped_to_user_and_range() {
        let ledger = MockLedger::new(0);
        ledger.mine_request(user(), DataType::Identity); // block 1
        ledger.mine_request(Address::new([0x99; 20]), DataType::Income); // block 2

        let events = ledger.requested_events(user(), 0, 10).await.unwrap();
        assert_eq!(events.len(), 1);

        let out_of_range = ledger.requested_events(user(), 2, 10).await.unwrap();
        assert!(out_of_range.is_empty());
    }

    #[tokio::test]
    async fn completion_without_request_is_rejected() {
        let ledger = MockLedger::new(0);
        let err = ledger
            .mine_completion(user(), RequestId::new([9; 32]), true)
            .unwrap_err();
        assert!(matches!(err, LedgerError::Rejected(_)));
    }

    #[tokio::test]
    async fn bounded_fault_clears_after_n_failures() {
        let ledger = MockLedger::new(1000);
        ledger.inject_rate_limit(0, 499, Some(2));

        for _ in 0..2 {
            let err = ledger.requested_events(user(), 0, 499).await.unwrap_err();
            assert!(matches!(err, LedgerError::RateLimited));
        }
        assert!(ledger.requested_events(user(), 0, 499).await.is_ok());
        assert_eq!(ledger.log_query_count(), 3);
    }

    #[tokio::test]
    async fn request_ids_are_unique_per_submission() {
        let ledger = MockLedger::new(0);
        let (_, first) = ledger.mine_request(user(), DataType::Identity);
        let (_, second) = ledger.mine_request(user(), DataType::Identity);
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn disconnected_wallet_cannot_submit() {
        let ledger = Arc::new(MockLedger::new(0));
        let wallet = MockWallet::disconnected(ledger);
        let att = verity_attestation::mock_attestation(
            user(),
            DataType::Identity,
            Timestamp::new(1_700_000_000),
        );
        let err = wallet
            .submit_request(DataType::Identity, &att, 0)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Rejected(_)));
    }
}
