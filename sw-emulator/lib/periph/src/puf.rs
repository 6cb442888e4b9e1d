/*++

Licensed under the Apache-2.0 license.

File Name:

    puf.rs

Abstract:

    File contains the emulated physically unclonable function.

--*/

use hardboot_drivers::{BootError, BootResult, Puf, PUF_KEY_SIZE};

pub struct EmuPuf {
    root: [u8; PUF_KEY_SIZE],
    enrolled: bool,

    /// Polls before a reconstruction reports done
    latency: u32,
    polls: u32,
    stalled: bool,

    enrollments: u32,
    reconstructions: u32,
}

impl EmuPuf {
    /// Unenrolled PUF whose device secret is `root`.
    pub fn new(root: [u8; PUF_KEY_SIZE]) -> Self {
        Self {
            root,
            enrolled: false,
            latency: 3,
            polls: 0,
            stalled: false,
            enrollments: 0,
            reconstructions: 0,
        }
    }

    /// PUF with helper data already provisioned.
    pub fn enrolled(root: [u8; PUF_KEY_SIZE]) -> Self {
        Self {
            enrolled: true,
            ..Self::new(root)
        }
    }

    /// Reconstruction never completes.
    pub fn set_stalled(&mut self, stalled: bool) {
        self.stalled = stalled;
    }

    pub fn enrollments(&self) -> u32 {
        self.enrollments
    }

    pub fn reconstructions(&self) -> u32 {
        self.reconstructions
    }
}

impl Puf for EmuPuf {
    fn is_enrolled(&mut self) -> bool {
        self.enrolled
    }

    fn enroll(&mut self) -> BootResult<()> {
        self.enrolled = true;
        self.enrollments += 1;
        Ok(())
    }

    fn start_reconstruction(&mut self) -> BootResult<()> {
        if !self.enrolled {
            return Err(BootError::DRIVER_PUF_NOT_ENROLLED);
        }
        self.polls = 0;
        Ok(())
    }

    fn reconstruction_done(&mut self) -> bool {
        self.polls += 1;
        !self.stalled && self.polls > self.latency
    }

    fn read_root_key(&mut self, out: &mut [u8; PUF_KEY_SIZE]) -> BootResult<()> {
        if !self.enrolled {
            return Err(BootError::DRIVER_PUF_NOT_ENROLLED);
        }
        *out = self.root;
        self.reconstructions += 1;
        Ok(())
    }
}
