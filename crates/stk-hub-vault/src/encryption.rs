// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! AES-256-GCM sealing of secret values.
//!
//! The sealed form is self-describing: the 12-byte nonce is prepended to the
//! ciphertext (which carries the 16-byte tag) and the whole is base64 encoded.

use aes_gcm::{
	aead::{Aead, KeyInit, OsRng},
	Aes256Gcm, Key, Nonce,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::RngCore;
use zeroize::Zeroizing;

use crate::error::{Result, VaultError};

/// Size of encryption keys in bytes (256 bits for AES-256).
pub const KEY_SIZE: usize = 32;

/// Size of AES-GCM nonce in bytes.
pub const NONCE_SIZE: usize = 12;

/// Size of the GCM authentication tag in bytes.
pub const TAG_SIZE: usize = 16;

/// Generate a random encryption key.
pub fn generate_key() -> Zeroizing<[u8; KEY_SIZE]> {
	let mut key = Zeroizing::new([0u8; KEY_SIZE]);
	OsRng.fill_bytes(key.as_mut());
	key
}

/// Generate a random nonce.
///
/// The same (key, nonce) pair must never be reused; every seal draws a fresh one.
pub fn generate_nonce() -> [u8; NONCE_SIZE] {
	let mut nonce = [0u8; NONCE_SIZE];
	OsRng.fill_bytes(&mut nonce);
	nonce
}

/// Copy raw key material into a fixed-size key, rejecting any other length.
pub fn key_from_slice(raw: &[u8]) -> Result<Zeroizing<[u8; KEY_SIZE]>> {
	if raw.len() != KEY_SIZE {
		return Err(VaultError::InvalidKey {
			expected: KEY_SIZE,
			actual: raw.len(),
		});
	}
	let mut key = Zeroizing::new([0u8; KEY_SIZE]);
	key.copy_from_slice(raw);
	Ok(key)
}

/// Encrypt `plaintext` and return `base64(nonce ‖ ciphertext)`.
pub fn seal(key: &[u8; KEY_SIZE], plaintext: &[u8]) -> Result<String> {
	let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));

	let nonce_bytes = generate_nonce();
	let nonce = Nonce::from_slice(&nonce_bytes);

	let ciphertext = cipher
		.encrypt(nonce, plaintext)
		.map_err(|e| VaultError::Encryption(format!("secret encryption failed: {e}")))?;

	let mut sealed = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
	sealed.extend_from_slice(&nonce_bytes);
	sealed.extend_from_slice(&ciphertext);
	Ok(STANDARD.encode(sealed))
}

/// Reverse of [`seal`]. Any malformed or unauthenticated input is a
/// [`VaultError::Decryption`].
pub fn open(key: &[u8; KEY_SIZE], sealed: &str) -> Result<Zeroizing<Vec<u8>>> {
	let raw = STANDARD
		.decode(sealed.trim())
		.map_err(|e| VaultError::Decryption(format!("invalid base64: {e}")))?;

	if raw.len() < NONCE_SIZE + TAG_SIZE {
		return Err(VaultError::Decryption(format!(
			"ciphertext too short: {} bytes",
			raw.len()
		)));
	}

	let (nonce_bytes, ciphertext) = raw.split_at(NONCE_SIZE);
	let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));

	let plaintext = cipher
		.decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
		.map_err(|e| VaultError::Decryption(format!("secret decryption failed: {e}")))?;

	Ok(Zeroizing::new(plaintext))
}
