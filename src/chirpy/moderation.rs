//! Chirp body validation and profanity masking.

use crate::error::{ChirpyError, Result};

pub const MAX_CHIRP_LENGTH: usize = 140;

const DENYLIST: [&str; 3] = ["kerfuffle", "sharbert", "fornax"];
const MASK: &str = "****";

/// Rejects bodies over [`MAX_CHIRP_LENGTH`] characters, then masks denylisted words.
///
/// Length is measured on the raw body, before masking.
pub fn validate_and_clean(body: &str) -> Result<String> {
    let len = body.chars().count();
    if len > MAX_CHIRP_LENGTH {
        return Err(ChirpyError::TooLong {
            len,
            max: MAX_CHIRP_LENGTH,
        });
    }
    Ok(clean(body))
}

/// Replaces whole words matching the denylist, ignoring case.
///
/// Words are separated by single spaces only, so `"fornax!"` or
/// `"kerfufflement"` pass through untouched.
pub fn clean(body: &str) -> String {
    body.split(' ')
        .map(|word| if is_denied(word) { MASK } else { word })
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_denied(word: &str) -> bool {
    let lowered = word.to_lowercase();
    DENYLIST.iter().any(|bad| *bad == lowered)
}
