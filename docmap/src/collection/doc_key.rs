use crate::errors::{DocmapError, DocmapResult, ErrorKind};
use once_cell::sync::Lazy;
use rand::RngCore;
use std::fmt::{Debug, Display};
use std::sync::atomic::{AtomicU32, Ordering};

const KEY_BYTES: usize = 12;
const KEY_HEX_LEN: usize = KEY_BYTES * 2;

// Per-process random component, fixed for the lifetime of the process so
// keys generated here never collide with keys from another process.
static PROCESS_BYTES: Lazy<[u8; 5]> = Lazy::new(|| {
    let mut bytes = [0u8; 5];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes
});

static COUNTER: Lazy<AtomicU32> = Lazy::new(|| AtomicU32::new(rand::thread_rng().next_u32()));

/// A store-native unique identifier for documents.
///
/// A `DocKey` is a 12-byte value composed of a 4-byte seconds timestamp, a
/// 5-byte per-process random component, and a 3-byte monotonic counter. It
/// renders as 24 lowercase hex characters, which is also the accepted parse
/// format.
///
/// # Coercion
///
/// User-supplied identities are only coerced into a `DocKey` when the text
/// form parses *and* re-renders to the identical string. A 24-char string
/// with uppercase hex digits, for example, is kept as a plain string rather
/// than silently normalized.
///
/// # Examples
///
/// ```rust,ignore
/// use docmap::collection::DocKey;
///
/// // Auto-generate a key
/// let key = DocKey::new();
///
/// // Parse an existing key
/// let key = DocKey::parse("4f2d8e1a9c3b7a6f5e4d3c2b")?;
/// assert_eq!(key.to_hex(), "4f2d8e1a9c3b7a6f5e4d3c2b");
/// ```
#[derive(PartialEq, Eq, Ord, PartialOrd, Hash, Clone, Copy, serde::Deserialize, serde::Serialize)]
pub struct DocKey {
    bytes: [u8; KEY_BYTES],
}

impl DocKey {
    /// Generates a new unique `DocKey`.
    pub fn new() -> Self {
        let mut bytes = [0u8; KEY_BYTES];
        let seconds = chrono::Utc::now().timestamp() as u32;
        bytes[0..4].copy_from_slice(&seconds.to_be_bytes());
        bytes[4..9].copy_from_slice(&*PROCESS_BYTES);

        let count = COUNTER.fetch_add(1, Ordering::Relaxed);
        bytes[9..12].copy_from_slice(&count.to_be_bytes()[1..4]);

        DocKey { bytes }
    }

    /// Parses a `DocKey` from its 24-character lowercase hex form.
    ///
    /// # Errors
    ///
    /// Returns an error when the input has the wrong length or contains a
    /// character outside `[0-9a-f]`.
    pub fn parse(text: &str) -> DocmapResult<DocKey> {
        if text.len() != KEY_HEX_LEN {
            log::error!("Invalid key length {} for '{}'", text.len(), text);
            return Err(DocmapError::new(
                &format!("Key must be {} hex characters, got {}", KEY_HEX_LEN, text.len()),
                ErrorKind::InvalidId,
            ));
        }

        let mut bytes = [0u8; KEY_BYTES];
        for (i, chunk) in text.as_bytes().chunks(2).enumerate() {
            let high = hex_digit(chunk[0])?;
            let low = hex_digit(chunk[1])?;
            bytes[i] = (high << 4) | low;
        }
        Ok(DocKey { bytes })
    }

    /// Renders this key as 24 lowercase hex characters.
    pub fn to_hex(&self) -> String {
        let mut hex = String::with_capacity(KEY_HEX_LEN);
        for byte in &self.bytes {
            hex.push(char::from_digit((byte >> 4) as u32, 16).unwrap_or('0'));
            hex.push(char::from_digit((byte & 0x0f) as u32, 16).unwrap_or('0'));
        }
        hex
    }

    /// Returns the raw bytes of this key.
    pub fn bytes(&self) -> &[u8; KEY_BYTES] {
        &self.bytes
    }
}

fn hex_digit(byte: u8) -> DocmapResult<u8> {
    match byte {
        b'0'..=b'9' => Ok(byte - b'0'),
        b'a'..=b'f' => Ok(byte - b'a' + 10),
        _ => {
            log::error!("Invalid hex digit '{}' in key", byte as char);
            Err(DocmapError::new(
                &format!("Invalid hex digit '{}' in key", byte as char),
                ErrorKind::InvalidId,
            ))
        }
    }
}

impl Default for DocKey {
    fn default() -> Self {
        DocKey::new()
    }
}

impl Debug for DocKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.to_hex())
    }
}

impl Display for DocKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}
