//! Random password generation

use rand::{rngs::OsRng, seq::SliceRandom};
use zeroize::Zeroizing;

const ALPHANUMERIC: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";
const UPPER: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWER: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const DIGITS: &[u8] = b"0123456789";

pub const RANDOM_PASSWORD_LEN: usize = 32;

/// Generate a 32 character password for accounts created on someone's
/// behalf.
///
/// 29 alphanumeric characters followed by one uppercase letter, one
/// lowercase letter and one digit, all drawn from the OS CSPRNG. The buffer
/// is wiped when the caller drops it.
pub fn random_password() -> Zeroizing<String> {
    let mut rng = OsRng;
    let mut password = Zeroizing::new(String::with_capacity(RANDOM_PASSWORD_LEN));

    for (count, dictionary) in [(29, ALPHANUMERIC), (1, UPPER), (1, LOWER), (1, DIGITS)] {
        for _ in 0..count {
            if let Some(byte) = dictionary.choose(&mut rng) {
                password.push(char::from(*byte));
            }
        }
    }

    password
}
