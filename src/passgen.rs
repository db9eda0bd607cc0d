//! Password generator for beta testers. Unrelated to the endpoints.

use anyhow::{bail, Result};
use rand::seq::SliceRandom;
use rand::{CryptoRng, Rng, RngCore};

const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const DIGITS: &[u8] = b"0123456789";
const SYMBOLS: &[u8] = b"!@#$%^&*()-_=+[]{};:,.?";

const CLASSES: [&[u8]; 4] = [UPPERCASE, LOWERCASE, DIGITS, SYMBOLS];

pub const MIN_LENGTH: usize = CLASSES.len();

/// A password of `length` characters with at least one of each character class.
pub fn generate_password<R: RngCore + CryptoRng>(rng: &mut R, length: usize) -> Result<String> {
    if length < MIN_LENGTH {
        bail!(
            "Password length must be at least {}, got {}",
            MIN_LENGTH,
            length
        );
    }

    let mut chars: Vec<u8> = CLASSES.iter().map(|class| pick(rng, class)).collect();
    let all: Vec<u8> = CLASSES.concat();
    while chars.len() < length {
        chars.push(pick(rng, &all));
    }
    chars.shuffle(rng);

    Ok(chars.into_iter().map(char::from).collect())
}

pub fn generate_passwords<R: RngCore + CryptoRng>(
    rng: &mut R,
    count: usize,
    length: usize,
) -> Result<Vec<String>> {
    (0..count).map(|_| generate_password(rng, length)).collect()
}

fn pick<R: RngCore>(rng: &mut R, set: &[u8]) -> u8 {
    set[rng.gen_range(0..set.len())]
}
