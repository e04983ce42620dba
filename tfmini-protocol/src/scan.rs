//! Magic-prefix scanner
//!
//! Both frame kinds the sensor sends are found the same way: read one byte
//! at a time until the magic prefix has been seen in full. Any byte that
//! breaks a partial match throws the progress away and the scan starts over
//! with the next byte. There is no sliding window, so a false start costs
//! its bytes from the budget just like noise does.

/// Default number of prefix bytes examined before giving up
pub const DEFAULT_MAX_SEARCH_ATTEMPTS: u16 = 50;

/// Why a scan ended without a match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SyncError<E> {
    /// Budget spent without seeing the full prefix
    Exhausted,
    /// The byte source failed
    Source(E),
}

/// Scan a byte source for `magic`
///
/// Reads at most `max_attempts` bytes from `next_byte` (a budget of 0 is
/// treated as 1). Returns `Ok(n)` with the number of bytes consumed once the
/// last prefix byte has been read; the caller then reads the frame body
/// straight from the same source.
pub fn scan_prefix<E, F>(magic: &[u8], max_attempts: u16, mut next_byte: F) -> Result<u16, SyncError<E>>
where
    F: FnMut() -> Result<u8, E>,
{
    if magic.is_empty() {
        return Ok(0);
    }

    let budget = max_attempts.max(1);
    let mut matched = 0;

    for consumed in 1..=budget {
        let byte = next_byte().map_err(SyncError::Source)?;

        if byte == magic[matched] {
            matched += 1;
            if matched == magic.len() {
                return Ok(consumed);
            }
        } else {
            // The offending byte is dropped, not retried as a first byte
            matched = 0;
        }
    }

    Err(SyncError::Exhausted)
}
