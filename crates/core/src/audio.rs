use base64::Engine;
use std::time::Duration;

use crate::protocol::CodecError;

/// Sample rate of narrowband phone audio.
pub const MULAW_SAMPLE_RATE: u64 = 8000;

/// Decodes a base64 media payload into raw μ-law bytes.
pub fn decode_payload(base64_fragment: &str) -> Result<Vec<u8>, CodecError> {
    Ok(base64::engine::general_purpose::STANDARD.decode(base64_fragment)?)
}

/// Encodes raw μ-law bytes as a base64 payload.
pub fn encode_payload(mulaw: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(mulaw)
}

/// Playback length of a μ-law buffer (one byte per sample).
pub fn mulaw_duration(byte_len: usize) -> Duration {
    Duration::from_micros(byte_len as u64 * 1_000_000 / MULAW_SAMPLE_RATE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_payload() {
        // 0xFF is μ-law silence.
        let decoded = decode_payload("//8=").unwrap();
        assert_eq!(decoded, vec![0xFF, 0xFF]);

        assert!(decode_payload("").unwrap().is_empty());
        assert!(matches!(
            decode_payload("not*base64!"),
            Err(CodecError::Base64(_))
        ));
    }

    #[test]
    fn test_encode_payload() {
        assert_eq!(encode_payload(&[0xFF, 0xFF]), "//8=");
        assert_eq!(encode_payload(&[]), "");
    }

    #[test]
    fn test_mulaw_duration() {
        // A standard 20 ms telephony frame is 160 bytes.
        assert_eq!(mulaw_duration(160), Duration::from_millis(20));
        assert_eq!(mulaw_duration(8000), Duration::from_secs(1));
        assert_eq!(mulaw_duration(0), Duration::ZERO);
    }
}
