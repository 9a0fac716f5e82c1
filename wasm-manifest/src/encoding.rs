//! Standard padded base64 (RFC 4648) used to inline module bytes.
//!
//! Only encoding lives here; decoding is the consuming runtime's job.

use base64::{Engine, engine::general_purpose::STANDARD};

/// Returns the encoded length of `len` input bytes: `ceil(len / 3) * 4`.
#[must_use]
pub const fn encoded_len(len: usize) -> usize {
    len.div_ceil(3) * 4
}

/// Encodes `data` as standard padded base64 with no line wrapping.
#[must_use]
pub fn encode(data: &[u8]) -> String {
    STANDARD.encode(data)
}
