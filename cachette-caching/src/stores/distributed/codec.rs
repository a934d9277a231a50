//! Payload framing with optional compression
//!
//! Every stored value starts with a one byte header telling readers whether
//! the rest is raw or zstd-compressed, so drivers with different `compress`
//! settings can share a pool.

const RAW: u8 = 0;
const ZSTD: u8 = 1;

/// Payloads smaller than this are never compressed
pub const COMPRESSION_THRESHOLD: usize = 2000;

const ZSTD_LEVEL: i32 = 3;

/// Frame a payload for the wire
pub fn encode(payload: &[u8], compress: bool) -> Result<Vec<u8>, String> {
    if compress && payload.len() >= COMPRESSION_THRESHOLD {
        let compressed = zstd::stream::encode_all(payload, ZSTD_LEVEL)
            .map_err(|e| format!("compression failed: {}", e))?;

        if compressed.len() < payload.len() {
            let mut frame = Vec::with_capacity(compressed.len() + 1);
            frame.push(ZSTD);
            frame.extend_from_slice(&compressed);
            return Ok(frame);
        }
    }

    let mut frame = Vec::with_capacity(payload.len() + 1);
    frame.push(RAW);
    frame.extend_from_slice(payload);
    Ok(frame)
}

/// Recover the payload from a stored frame
pub fn decode(frame: &[u8]) -> Result<Vec<u8>, String> {
    match frame.split_first() {
        Some((&RAW, body)) => Ok(body.to_vec()),
        Some((&ZSTD, body)) => {
            zstd::stream::decode_all(body).map_err(|e| format!("decompression failed: {}", e))
        }
        Some((header, _)) => Err(format!("unknown payload header {:#04x}", header)),
        None => Err("empty payload frame".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_payloads_stay_raw() {
        let frame = encode(b"hello", true).unwrap();
        assert_eq!(frame, b"\x00hello");
        assert_eq!(decode(&frame).unwrap(), b"hello");
    }

    #[test]
    fn test_large_payloads_compress_when_enabled() {
        let payload = "<div class=\"row\"></div>".repeat(500).into_bytes();

        let compressed = encode(&payload, true).unwrap();
        assert_eq!(compressed[0], ZSTD);
        assert!(compressed.len() < payload.len());
        assert_eq!(decode(&compressed).unwrap(), payload);

        let raw = encode(&payload, false).unwrap();
        assert_eq!(raw[0], RAW);
        assert_eq!(raw.len(), payload.len() + 1);
    }

    #[test]
    fn test_empty_payload() {
        let frame = encode(b"", true).unwrap();
        assert_eq!(decode(&frame).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_corrupt_frames() {
        assert!(decode(b"").is_err());
        assert!(decode(b"\x07abc").is_err());
        assert!(decode(b"\x01not zstd").is_err());
    }
}
