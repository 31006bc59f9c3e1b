//! Room code generation.
//!
//! Room codes are 6-character strings using Crockford's Base32 alphabet,
//! chosen to avoid look-alike characters when read aloud.

use rand::Rng;

const CROCKFORD: &[u8] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ"; // no I, L, O, U

/// Generate a room code for a new game.
pub fn generate_room_code() -> String {
    let mut rng = rand::rng();
    (0..6)
        .map(|_| CROCKFORD[rng.random_range(0..CROCKFORD.len())] as char)
        .collect()
}
