/*++

Licensed under the Apache-2.0 license.

File Name:

    sequencer.rs

Abstract:

    File contains the boot state machine. Every transition is gated by one
    component; any failure moves straight to the absorbing Failure state.

--*/

use super::{BootFailure, BootOutcome, BootParams};
use crate::attestation::{
    AttestationLedger, AttestationReport, Diagnostics, MeasurementStage, ReportInputs,
};
use crate::context::{BootContext, BootState, TokenSlot};
use crate::key_vault::{KeyId, KeyVault};
use crate::rollback::RollbackGuard;
use crate::rom_env::BootEnv;
use crate::tamper::{TamperEvents, TamperLatch, TamperMonitor, TamperState};
use crate::token_verifier::{TokenState, TokenVerifier};
use crate::verifier::ImageVerifier;
use hardboot_cfi_lib::{cfi_check_eq, cfi_launder, cfi_redundant, JitterSource};
use hardboot_drivers::{
    cprintln, trng, BootError, BootResult, CryptoProvider, DebugAuth, ErrorKind, HaltControl,
    HexWord, IsolationBoundary,
};

/// Transitions from Init to Success.
const BOOT_TRANSITIONS: u32 = 7;

/// Boot Sequencer
pub struct BootSequencer<'a> {
    ctx: BootContext<'a>,
    jitter: JitterSource<'a>,
    monitor: TamperMonitor<'a>,
    vault: KeyVault<'a>,
    rollback: RollbackGuard<'a>,
    ledger: AttestationLedger<'a>,
    verifier: ImageVerifier<'a>,
    crypto: &'a dyn CryptoProvider,
    isolation: &'a dyn IsolationBoundary,
    debug: &'a dyn DebugAuth,
    halt: &'a mut dyn HaltControl,
    params: BootParams<'a>,
    gate: BootState,
}

impl<'a> BootSequencer<'a> {
    pub fn new(env: BootEnv<'a>, params: BootParams<'a>, latch: &'a TamperLatch) -> Self {
        let config = params.config;
        Self {
            ctx: BootContext::new(latch, params.boot_count),
            jitter: JitterSource::new(env.trng, config.jitter),
            monitor: TamperMonitor::new(env.sensors, latch, config.tamper),
            vault: KeyVault::new(env.puf, env.crypto),
            rollback: RollbackGuard::new(env.otp, config.rollback_region),
            ledger: AttestationLedger::new(env.crypto),
            verifier: ImageVerifier::new(env.crypto, &config),
            crypto: env.crypto,
            isolation: env.isolation,
            debug: env.debug,
            halt: env.halt,
            params,
            gate: BootState::Init,
        }
    }

    /// Run the boot attempt to a terminal state.
    pub fn run(&mut self) -> BootOutcome {
        if self.ctx.state() != BootState::Init {
            return BootOutcome::Failure(self.fail(BootError::CFI_ILLEGAL_TRANSITION));
        }
        match self.run_stages() {
            Ok(report) => BootOutcome::Success(report),
            Err(err) => BootOutcome::Failure(self.fail(err)),
        }
    }

    #[cfg(any(test, feature = "fault-inject"))]
    pub fn state(&self) -> BootState {
        self.ctx.state()
    }

    #[cfg(any(test, feature = "fault-inject"))]
    pub fn context(&self) -> &BootContext<'a> {
        &self.ctx
    }

    #[cfg(any(test, feature = "fault-inject"))]
    pub fn key_vault(&self) -> &KeyVault<'a> {
        &self.vault
    }

    #[cfg(any(test, feature = "fault-inject"))]
    pub fn tamper_monitor(&self) -> &TamperMonitor<'a> {
        &self.monitor
    }

    #[cfg(any(test, feature = "fault-inject"))]
    pub fn ledger(&self) -> &AttestationLedger<'a> {
        &self.ledger
    }

    #[cfg(any(test, feature = "fault-inject"))]
    pub fn jitter(&self) -> &JitterSource<'a> {
        &self.jitter
    }

    fn run_stages(&mut self) -> BootResult<AttestationReport> {
        self.init()?;
        self.root_of_trust()?;
        self.tamper_check()?;
        self.verify_tokens()?;
        self.verify_signature()?;
        self.verify_rollback()?;
        let report = self.generate_attestation()?;
        self.finish()?;
        Ok(report)
    }

    /// Record the gate being evaluated and drain the tamper latch.
    fn enter(&mut self, gate: BootState) -> BootResult<()> {
        self.gate = gate;
        self.checkpoint()
    }

    /// Fail if the tamper interrupt raised anything since the last
    /// checkpoint.
    fn checkpoint(&mut self) -> BootResult<()> {
        let pending = self.monitor.pending();
        if pending.is_empty() {
            return Ok(());
        }
        cprintln!("[boot] tamper pending {}", HexWord(pending.bits()));
        Err(pending
            .to_error()
            .unwrap_or(BootError::TAMPER_VOLTAGE_GLITCH))
    }

    fn init(&mut self) -> BootResult<()> {
        self.gate = BootState::Init;
        cprintln!("[boot] start, boot count {}", self.ctx.boot_count());

        let seed = trng::next_u32(self.jitter.trng())?;
        self.ctx.set_jitter_seed(seed);
        self.jitter.jitter_default();

        self.monitor.start()?;
        self.checkpoint()?;
        self.ctx.deposit(TokenSlot::Init);
        self.ledger
            .record(MeasurementStage::Bootloader, self.params.bootloader_identity)
    }

    fn root_of_trust(&mut self) -> BootResult<()> {
        self.enter(BootState::RootOfTrustChecked)?;

        let isolation = self.isolation;
        let rom_base = self.params.config.rom_base;
        let vault_base = self.params.config.vault_mmio_base;
        let rounds = self.params.config.redundant_rounds;
        if !cfi_redundant(rounds, &mut self.jitter, || {
            isolation.is_trusted(rom_base) & isolation.is_trusted(vault_base)
        }) {
            cprintln!("[boot] isolation boundary untrusted");
            return Err(BootError::BOOT_ROOT_OF_TRUST_UNTRUSTED);
        }
        self.ctx.deposit(TokenSlot::Isolation);
        self.ledger
            .record(MeasurementStage::RootOfTrust, self.params.rot_identity)?;

        self.vault.enroll()?;
        self.vault.load_slot(&mut self.jitter, KeyId::Attestation)?;
        let attestation_pub_key = self
            .crypto
            .public_key(self.vault.slot_key(KeyId::Attestation)?)?;
        self.ledger
            .record(MeasurementStage::SecureVault, &attestation_pub_key)?;
        self.ctx.deposit(TokenSlot::Vault);

        self.ctx.advance(BootState::RootOfTrustChecked)
    }

    fn tamper_check(&mut self) -> BootResult<()> {
        self.enter(BootState::TamperChecked)?;

        self.monitor.check()?;
        let pending = self.monitor.pending();
        if let Some(err) = pending.to_error() {
            return Err(err);
        }
        cfi_check_eq(pending.bits(), 0, &mut self.jitter)?;
        self.ctx.deposit(TokenSlot::Tamper);

        self.ctx.advance(BootState::TamperChecked)
    }

    fn verify_tokens(&mut self) -> BootResult<()> {
        self.enter(BootState::TokensVerified)?;

        let state = TokenVerifier::verify(&self.ctx, &mut self.jitter);
        if cfi_launder(state) != TokenState::AllValid {
            return Err(BootError::CFI_TOKEN_INVALID);
        }
        cfi_check_eq(state as u32, TokenState::AllValid as u32, &mut self.jitter)
            .map_err(|_| BootError::CFI_TOKEN_INVALID)?;

        self.ctx.advance(BootState::TokensVerified)
    }

    fn verify_signature(&mut self) -> BootResult<()> {
        self.enter(BootState::SignatureVerified)?;

        let digest = self.verifier.verify(
            &self.params.firmware,
            &self.params.vendor_pub_key,
            &mut self.jitter,
        )?;
        self.ledger
            .record_digest(MeasurementStage::Firmware, &digest)?;

        self.ctx.advance(BootState::SignatureVerified)
    }

    fn verify_rollback(&mut self) -> BootResult<()> {
        self.enter(BootState::RollbackVerified)?;

        let version = self.params.firmware.header.version;
        self.rollback.check(version, &mut self.jitter)?;

        self.ctx.advance(BootState::RollbackVerified)
    }

    fn generate_attestation(&mut self) -> BootResult<AttestationReport> {
        self.enter(BootState::AttestationGenerated)?;

        let diagnostics = if self.debug.is_debug_unlocked() {
            Some(Diagnostics {
                jitter_calls: self.jitter.calls(),
                jitter_fallbacks: self.jitter.fallbacks(),
                jitter_units: u32::try_from(self.jitter.total_units()).unwrap_or(u32::MAX),
                puf_reconstructions: self.vault.reconstruction_count(),
                event_count: self.ledger.events().len() as u32,
            })
        } else {
            None
        };
        let inputs = ReportInputs {
            boot_count: self.ctx.boot_count(),
            firmware_version: self.params.firmware.header.version,
            tamper_events: self.ctx.tamper_events().bits(),
            nonce: self.params.nonce,
            diagnostics,
        };
        let key = self.vault.slot_key(KeyId::Attestation)?;
        let report = self.ledger.generate(key, &inputs)?;

        self.ctx.advance(BootState::AttestationGenerated)?;
        Ok(report)
    }

    fn finish(&mut self) -> BootResult<()> {
        self.enter(BootState::Success)?;
        self.ctx.steps().check_eq(BOOT_TRANSITIONS - 1)?;
        self.ctx.advance(BootState::Success)?;
        self.ctx.steps().check_eq(BOOT_TRANSITIONS)?;
        self.vault.erase_all_keys();
        cprintln!("[boot] success");
        Ok(())
    }

    /// Enter Failure: log the event, query the monitor one last time, run
    /// the tamper response and halt.
    fn fail(&mut self, err: BootError) -> BootFailure {
        let stage = self.gate;
        let kind = err.kind();
        self.ctx.fail();
        cprintln!(
            "[boot] failure at {} error {}",
            HexWord(stage.into()),
            HexWord(err.into())
        );

        if self.ledger.log_event(stage, err.into()).is_err() {
            cprintln!("[boot] event log full");
        }

        if self.monitor.state() == TamperState::Armed && self.monitor.check().is_err() {
            cprintln!("[boot] final tamper query failed");
        }

        let mut events = self.monitor.pending();
        if kind == ErrorKind::GlitchDetected {
            events |= TamperEvents::GLITCH;
        }

        self.vault.erase_all_keys();
        self.vault.lock();
        self.monitor.respond(events, &mut self.vault, &mut *self.halt);
        self.monitor.halt_once(&mut *self.halt);

        BootFailure {
            stage,
            error: err,
            kind,
            tamper_events: events,
        }
    }
}
