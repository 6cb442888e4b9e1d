/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains exports for the hardboot emulator crypto library.

--*/

mod aes256gcm;
mod ed25519;
mod provider;

pub use aes256gcm::Aes256Gcm;
pub use ed25519::Ed25519;
pub use provider::EmuCrypto;

pub const AES_256_KEY_SIZE: usize = 32;
