// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Secret vault for the Santokit hub.
//!
//! Values are encrypted with AES-256-GCM under a single service-wide master
//! key and stored as `base64(nonce ‖ ciphertext ‖ tag)`. Plaintext only leaves
//! this crate wrapped in [`SecretString`] or re-encrypted under a caller key.

pub mod encryption;
pub mod error;
pub mod service;
pub mod store;

pub use encryption::{KEY_SIZE, NONCE_SIZE};
pub use error::{Result, VaultError};
pub use service::VaultService;
pub use stk_common_secret::SecretString;
pub use store::{MemorySecretStore, SecretRecord, SecretStore};
