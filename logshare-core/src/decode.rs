use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use tracing::debug;

/// Decode log file bytes into text.
///
/// A BOM wins; otherwise valid UTF-8 is taken as is and anything else is
/// read as Windows-1252, which maps every byte.
pub fn decode_log_bytes(data: &[u8]) -> String {
    if let Some((encoding, bom_len)) = Encoding::for_bom(data) {
        debug!("Decoding log with {} BOM", encoding.name());
        let (text, _) = encoding.decode_without_bom_handling(&data[bom_len..]);
        return text.into_owned();
    }

    if let Some(text) = UTF_8.decode_without_bom_handling_and_without_replacement(data) {
        return text.into_owned();
    }

    debug!("Log is not valid UTF-8, falling back to {}", WINDOWS_1252.name());
    let (text, _) = WINDOWS_1252.decode_without_bom_handling(data);
    text.into_owned()
}
