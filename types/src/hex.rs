//! Minimal hex helpers so this crate does not pull in the `hex` dependency.

pub(crate) fn encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

pub(crate) fn decode(s: &str) -> Result<Vec<u8>, String> {
    if !s.is_ascii() {
        return Err("non-ascii hex string".into());
    }
    if s.len() % 2 != 0 {
        return Err("odd-length hex string".into());
    }
    (0..s.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&s[i..i + 2], 16).map_err(|e| format!("invalid hex: {e}"))
        })
        .collect()
}
