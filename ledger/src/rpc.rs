//! JSON-RPC implementation of the read-side ledger client.
//!
//! Speaks the standard EVM node surface: `eth_blockNumber`, `eth_getLogs`
//! filtered by contract address + event topic + indexed user, and
//! `eth_getTransactionReceipt` for post-confirmation event extraction.
//! HTTP 429 and node-side limit errors map to [`LedgerError::RateLimited`]
//! so scan loops can back off.

use crate::client::LedgerClient;
use crate::error::LedgerError;
use crate::event::{
    event_topic, CompletedEvent, RequestedEvent, COMPLETED_SIGNATURE, REQUESTED_SIGNATURE,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;
use verity_types::{Address, RequestId, Timestamp, TxHash};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// JSON-RPC error code some nodes return when a request quota is exceeded.
const RPC_LIMIT_EXCEEDED: i64 = -32005;

/// A [`LedgerClient`] over an EVM JSON-RPC endpoint.
pub struct RpcLedger {
    url: String,
    client: reqwest::Client,
    contract: Address,
    next_id: AtomicU64,
}

impl RpcLedger {
    /// Create a client for the verification contract at `contract`, served
    /// by the node at `url`.
    pub fn new(url: &str, contract: Address) -> Self {
        Self {
            url: url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            contract,
            next_id: AtomicU64::new(1),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<T, LedgerError> {
        // `result` stays a raw value until the error field is checked, so a
        // legitimate `"result": null` (e.g. an unmined receipt) is
        // distinguishable from a missing one.
        #[derive(Deserialize)]
        struct Envelope {
            #[serde(default)]
            result: serde_json::Value,
            error: Option<ErrorBody>,
        }

        #[derive(Deserialize)]
        struct ErrorBody {
            code: i64,
            message: String,
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        let resp = self
            .client
            .post(&self.url)
            .timeout(REQUEST_TIMEOUT)
            .json(&body)
            .send()
            .await
            .map_err(|e| LedgerError::Transport(e.to_string()))?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LedgerError::RateLimited);
        }
        if !resp.status().is_success() {
            return Err(LedgerError::Transport(format!(
                "HTTP {} from {}",
                resp.status(),
                self.url
            )));
        }

        let envelope: Envelope = resp
            .json()
            .await
            .map_err(|e| LedgerError::Decode(e.to_string()))?;

        if let Some(err) = envelope.error {
            if err.code == RPC_LIMIT_EXCEEDED
                || err.message.to_ascii_lowercase().contains("rate limit")
            {
                return Err(LedgerError::RateLimited);
            }
            return Err(LedgerError::Rpc(format!("{} (code {})", err.message, err.code)));
        }

        serde_json::from_value(envelope.result)
            .map_err(|e| LedgerError::Decode(format!("{method}: {e}")))
    }

    async fn get_logs(
        &self,
        topic0: [u8; 32],
        user: Address,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<RawLog>, LedgerError> {
        let params = json!([{
            "address": self.contract.to_string(),
            "fromBlock": to_quantity(from_block),
            "toBlock": to_quantity(to_block),
            "topics": [encode_topic(&topic0), address_topic(&user)],
        }]);
        let logs: Vec<RawLog> = self.call("eth_getLogs", params).await?;
        debug!(from_block, to_block, count = logs.len(), "eth_getLogs");
        Ok(logs)
    }
}

impl LedgerClient for RpcLedger {
    async fn chain_height(&self) -> Result<u64, LedgerError> {
        let height: String = self.call("eth_blockNumber", json!([])).await?;
        parse_quantity(&height)
    }

    async fn requested_events(
        &self,
        user: Address,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<RequestedEvent>, LedgerError> {
        let topic0 = event_topic(REQUESTED_SIGNATURE);
        self.get_logs(topic0, user, from_block, to_block)
            .await?
            .iter()
            .map(decode_requested)
            .collect()
    }

    async fn completed_events(
        &self,
        user: Address,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<CompletedEvent>, LedgerError> {
        let topic0 = event_topic(COMPLETED_SIGNATURE);
        self.get_logs(topic0, user, from_block, to_block)
            .await?
            .iter()
            .map(decode_completed)
            .collect()
    }

    async fn request_event_by_tx(
        &self,
        tx_hash: TxHash,
    ) -> Result<Option<RequestedEvent>, LedgerError> {
        #[derive(Deserialize)]
        struct RawReceipt {
            logs: Vec<RawLog>,
        }

        let receipt: Option<RawReceipt> = self
            .call("eth_getTransactionReceipt", json!([tx_hash.to_string()]))
            .await?;

        let Some(receipt) = receipt else {
            return Ok(None);
        };

        let topic0 = encode_topic(&event_topic(REQUESTED_SIGNATURE));
        receipt
            .logs
            .iter()
            .find(|log| log.topics.first().is_some_and(|t| *t == topic0))
            .map(decode_requested)
            .transpose()
    }
}

/// An entry of an `eth_getLogs` / receipt `logs` array.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLog {
    topics: Vec<String>,
    data: String,
    block_number: String,
    transaction_hash: String,
}

// ── ABI decoding ───────────────────────────────────────────────────────

const WORD: usize = 32;

fn decode_requested(log: &RawLog) -> Result<RequestedEvent, LedgerError> {
    let (user, request_id) = decode_indexed(log)?;
    let data = decode_bytes(&log.data)?;

    // Non-indexed layout: [offset to string, uint256 timestamp] then the
    // string's length + bytes at the offset.
    let offset = word_usize(&word(&data, 0)?)?;
    let timestamp = word_u64(&word(&data, 1)?)?;
    let len = word_usize(&read_word_at(&data, offset)?)?;
    let start = offset + WORD;
    let bytes = data
        .get(start..start + len)
        .ok_or_else(|| LedgerError::Decode("string out of bounds".into()))?;
    let data_type = String::from_utf8(bytes.to_vec())
        .map_err(|e| LedgerError::Decode(format!("data type not utf-8: {e}")))?;

    Ok(RequestedEvent {
        user,
        request_id,
        data_type,
        timestamp: Timestamp::new(timestamp),
        tx_hash: parse_hash(&log.transaction_hash)?,
        block_number: parse_quantity(&log.block_number)?,
    })
}

fn decode_completed(log: &RawLog) -> Result<CompletedEvent, LedgerError> {
    let (user, request_id) = decode_indexed(log)?;
    let data = decode_bytes(&log.data)?;

    // Non-indexed layout: [bool success, uint256 timestamp].
    let success = word(&data, 0)?.iter().any(|&b| b != 0);
    let timestamp = word_u64(&word(&data, 1)?)?;

    Ok(CompletedEvent {
        user,
        request_id,
        success,
        timestamp: Timestamp::new(timestamp),
        tx_hash: parse_hash(&log.transaction_hash)?,
        block_number: parse_quantity(&log.block_number)?,
    })
}

/// Both events index the same pair: topic 1 = user, topic 2 = request id.
fn decode_indexed(log: &RawLog) -> Result<(Address, RequestId), LedgerError> {
    if log.topics.len() < 3 {
        return Err(LedgerError::Decode(format!(
            "expected 3 topics, got {}",
            log.topics.len()
        )));
    }
    let user = topic_address(&log.topics[1])?;
    let request_id = RequestId::new(topic_word(&log.topics[2])?);
    Ok((user, request_id))
}

fn decode_bytes(s: &str) -> Result<Vec<u8>, LedgerError> {
    hex::decode(s.strip_prefix("0x").unwrap_or(s))
        .map_err(|e| LedgerError::Decode(format!("invalid hex: {e}")))
}

fn word(data: &[u8], index: usize) -> Result<[u8; WORD], LedgerError> {
    read_word_at(data, index * WORD)
}

fn read_word_at(data: &[u8], offset: usize) -> Result<[u8; WORD], LedgerError> {
    let slice = data
        .get(offset..offset + WORD)
        .ok_or_else(|| LedgerError::Decode(format!("word at byte {offset} out of bounds")))?;
    let mut out = [0u8; WORD];
    out.copy_from_slice(slice);
    Ok(out)
}

/// A uint256 word that must fit in u64 (heights, timestamps, offsets).
fn word_u64(word: &[u8; WORD]) -> Result<u64, LedgerError> {
    if word[..WORD - 8].iter().any(|&b| b != 0) {
        return Err(LedgerError::Decode("uint256 exceeds u64".into()));
    }
    let mut tail = [0u8; 8];
    tail.copy_from_slice(&word[WORD - 8..]);
    Ok(u64::from_be_bytes(tail))
}

fn word_usize(word: &[u8; WORD]) -> Result<usize, LedgerError> {
    Ok(word_u64(word)? as usize)
}

fn topic_word(topic: &str) -> Result<[u8; WORD], LedgerError> {
    let bytes = decode_bytes(topic)?;
    bytes
        .try_into()
        .map_err(|_| LedgerError::Decode("topic is not 32 bytes".into()))
}

fn topic_address(topic: &str) -> Result<Address, LedgerError> {
    let word = topic_word(topic)?;
    let mut raw = [0u8; 20];
    raw.copy_from_slice(&word[12..]);
    Ok(Address::new(raw))
}

/// Left-pad an address to a 32-byte topic.
fn address_topic(addr: &Address) -> String {
    format!("0x{}{}", "0".repeat(24), hex::encode(addr.as_bytes()))
}

fn encode_topic(topic: &[u8; WORD]) -> String {
    format!("0x{}", hex::encode(topic))
}

fn to_quantity(n: u64) -> String {
    format!("0x{n:x}")
}

fn parse_quantity(s: &str) -> Result<u64, LedgerError> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    u64::from_str_radix(digits, 16)
        .map_err(|e| LedgerError::Decode(format!("bad quantity {s}: {e}")))
}

fn parse_hash(s: &str) -> Result<TxHash, LedgerError> {
    s.parse()
        .map_err(|e| LedgerError::Decode(format!("bad tx hash: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pad_word(bytes: &[u8]) -> Vec<u8> {
        let mut out = vec![0u8; WORD - bytes.len()];
        out.extend_from_slice(bytes);
        out
    }

    fn sample_log(topics: Vec<String>, data: Vec<u8>) -> RawLog {
        RawLog {
            topics,
            data: format!("0x{}", hex::encode(data)),
            block_number: "0x3e9".into(),
            transaction_hash: format!("0x{}", "ab".repeat(32)),
        }
    }

    fn indexed_topics() -> Vec<String> {
        vec![
            encode_topic(&event_topic(REQUESTED_SIGNATURE)),
            address_topic(&Address::new([0x11; 20])),
            format!("0x{}", "22".repeat(32)),
        ]
    }

    #[test]
    fn quantities_roundtrip() {
        assert_eq!(parse_quantity("0x3e9").unwrap(), 1001);
        assert_eq!(to_quantity(1001), "0x3e9");
        assert!(parse_quantity("0xzz").is_err());
    }

    #[test]
    fn address_topic_is_left_padded() {
        let topic = address_topic(&Address::new([0x11; 20]));
        assert_eq!(topic.len(), 2 + 64);
        assert!(topic.starts_with(&format!("0x{}", "0".repeat(24))));
        assert_eq!(topic_address(&topic).unwrap(), Address::new([0x11; 20]));
    }

    #[test]
    fn decodes_requested_event_data() {
        // ABI: offset 0x40, timestamp, string length, string bytes (padded).
        let mut data = Vec::new();
        data.extend(pad_word(&[0x40]));
        data.extend(pad_word(&1_700_000_000u64.to_be_bytes()));
        data.extend(pad_word(&[8]));
        let mut s = b"identity".to_vec();
        s.resize(WORD, 0);
        data.extend(s);

        let ev = decode_requested(&sample_log(indexed_topics(), data)).unwrap();
        assert_eq!(ev.user, Address::new([0x11; 20]));
        assert_eq!(ev.request_id, RequestId::new([0x22; 32]));
        assert_eq!(ev.data_type, "identity");
        assert_eq!(ev.timestamp, Timestamp::new(1_700_000_000));
        assert_eq!(ev.block_number, 1001);
    }

    #[test]
    fn decodes_completed_event_data() {
        let mut data = Vec::new();
        data.extend(pad_word(&[1]));
        data.extend(pad_word(&1_700_000_123u64.to_be_bytes()));

        let ev = decode_completed(&sample_log(indexed_topics(), data)).unwrap();
        assert!(ev.success);
        assert_eq!(ev.timestamp, Timestamp::new(1_700_000_123));
    }

    #[test]
    fn truncated_data_is_a_decode_error() {
        let ev = decode_requested(&sample_log(indexed_topics(), vec![0u8; 16]));
        assert!(matches!(ev, Err(LedgerError::Decode(_))));
    }

    #[test]
    fn missing_topics_is_a_decode_error() {
        let log = sample_log(vec!["0xabc".into()], vec![0u8; 64]);
        assert!(decode_completed(&log).is_err());
    }

    #[test]
    fn oversized_uint_is_rejected() {
        let word = [0xff; WORD];
        assert!(word_u64(&word).is_err());
    }
}
