/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains exports for the hardboot hardware abstraction layer.

--*/

#![cfg_attr(not(any(test, feature = "std")), no_std)]

mod crypto;
mod otp;
mod platform;
pub mod printer;
mod puf;
mod sensor;
pub mod trng;
pub mod wait;

pub use crypto::{
    CryptoProvider, PubKey, Sha256Digest, Signature, AEAD_NONCE_SIZE, AEAD_TAG_SIZE, DIGEST_SIZE,
    PUB_KEY_SIZE, SIGNATURE_SIZE, SYMMETRIC_KEY_SIZE,
};
pub use hardboot_error::{BootError, BootResult, ErrorKind};
pub use otp::{OtpRegion, OtpStorage};
pub use platform::{DebugAuth, HaltControl, IsolationBoundary};
pub use printer::{HexBytes, HexWord};
pub use puf::{Puf, PUF_KEY_SIZE};
pub use sensor::{SensorDriver, SensorSample, SensorThresholds, ThresholdCrossing};
pub use trng::Trng;
