// Licensed under the Apache-2.0 license

mod helpers;

mod test_attestation;
mod test_boot_flow;
mod test_fault_injection;
mod test_image_validation;
mod test_rollback;
mod test_tamper;
