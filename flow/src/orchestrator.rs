//! The verification flow orchestrator.

use crate::config::FlowConfig;
use crate::error::FlowError;
use crate::state::{FlowEvent, FlowState, FlowStatus};
use tokio::time::sleep;
use tracing::{debug, info, warn};
use verity_attestation::{
    validate, AttestationError, AttestationProvider, AttestationService,
};
use verity_ledger::{LedgerClient, LedgerError, Wallet};
use verity_types::{DataType, RequestId, Timestamp};

/// Drives the request → complete transaction pair and tracks progress.
///
/// One instance models one verification at a time. All collaborators are
/// injected at construction; call [`initialize`](Self::initialize) before
/// the first flow and [`shutdown`](Self::shutdown) when done with the
/// instance.
pub struct VerificationFlow<W, L, P> {
    wallet: W,
    ledger: L,
    attestations: AttestationService<P>,
    config: FlowConfig,
    state: FlowState,
    pending_events: Vec<FlowEvent>,
}

impl<W, L, P> VerificationFlow<W, L, P>
where
    W: Wallet,
    L: LedgerClient,
    P: AttestationProvider,
{
    pub fn new(wallet: W, ledger: L, provider: P, config: FlowConfig) -> Self {
        Self {
            wallet,
            ledger,
            attestations: AttestationService::new(provider),
            config,
            state: FlowState::default(),
            pending_events: Vec::new(),
        }
    }

    /// Initialize the attestation provider.
    pub async fn initialize(&mut self) -> Result<(), AttestationError> {
        self.attestations.initialize().await
    }

    /// Shut down the attestation provider.
    pub async fn shutdown(&mut self) -> Result<(), AttestationError> {
        self.attestations.shutdown().await
    }

    /// Current progress snapshot.
    pub fn state(&self) -> &FlowState {
        &self.state
    }

    /// Drain notifications accumulated since the last call.
    pub fn take_events(&mut self) -> Vec<FlowEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Unconditionally return to `Idle`, clearing all ephemeral state.
    ///
    /// The only way out of `Completed`/`Failed`, and the only cancellation
    /// primitive: it stops this instance from acting further, but cannot
    /// un-send an already-broadcast transaction.
    pub fn reset(&mut self) {
        debug!(status = %self.state.status, "flow reset");
        self.state = FlowState::default();
        self.pending_events.clear();
    }

    /// Phase one: submit a verification request, wait for it to confirm,
    /// extract the ledger-assigned request id, then automatically run
    /// phase two after the settle delay.
    ///
    /// Preconditions (connected wallet, matching chain) fail fast without
    /// touching flow state. Returns the request id on full success.
    pub async fn request_verification(
        &mut self,
        data_type: DataType,
    ) -> Result<RequestId, FlowError> {
        if self.state.status != FlowStatus::Idle {
            return Err(FlowError::AlreadyInFlight(self.state.status));
        }
        let user = self.wallet.address().ok_or(FlowError::NotConnected)?;
        self.ensure_network().await?;

        self.transition(FlowStatus::Requesting, 10, "Preparing verification request...");

        let obtained = self.attestations.obtain(data_type, user).await;
        self.state.attestation_source = Some(obtained.source);
        self.advance(30, "Generating attestation data...");

        let report = validate(&obtained.attestation, Timestamp::now());
        for warning in &report.warnings {
            warn!(%data_type, %warning, "attestation warning");
            self.pending_events.push(FlowEvent::Warning(warning.clone()));
        }
        if !report.is_valid() {
            return Err(self.fail(FlowError::AttestationInvalid(report.errors)));
        }

        self.advance(50, "Submitting to ledger...");
        let tx_hash = match self
            .wallet
            .submit_request(data_type, &obtained.attestation, self.config.fee_wei)
            .await
        {
            Ok(tx_hash) => tx_hash,
            Err(e) => return Err(self.fail(e.into())),
        };
        self.pending_events.push(FlowEvent::RequestSubmitted(tx_hash));
        info!(%user, %data_type, %tx_hash, "verification request submitted");

        self.advance(70, "Waiting for transaction confirmation...");
        let receipt = match self
            .wallet
            .wait_for_confirmation(tx_hash, self.config.confirmation_timeout())
            .await
        {
            Ok(receipt) => receipt,
            Err(e) => return Err(self.fail(e.into())),
        };

        // The id is taken from the event the ledger emitted for this exact
        // transaction; if the event is missing, fail rather than guess.
        let request_id = match self.ledger.request_event_by_tx(receipt.tx_hash).await {
            Ok(Some(event)) => event.request_id,
            Ok(None) => return Err(self.fail(FlowError::EventExtraction(tx_hash))),
            Err(e) => return Err(self.fail(e.into())),
        };
        self.state.request_id = Some(request_id);
        self.pending_events
            .push(FlowEvent::RequestConfirmed(request_id));
        info!(%request_id, block = receipt.block_number, "request confirmed");

        // Give the endpoint's log index a moment to catch up, then chain
        // straight into phase two without a second user action.
        sleep(self.config.settle_delay()).await;
        self.complete_verification(request_id).await?;
        Ok(request_id)
    }

    /// Phase two: submit the completion transaction for an assigned id and
    /// wait for it to confirm.
    ///
    /// Runs automatically after [`request_verification`]; callable directly
    /// from `Idle` to finish a request left pending by an earlier session.
    ///
    /// [`request_verification`]: Self::request_verification
    pub async fn complete_verification(&mut self, request_id: RequestId) -> Result<(), FlowError> {
        let mid_flight = match self.state.status {
            FlowStatus::Idle => false,
            FlowStatus::Requesting => true,
            status => return Err(FlowError::AlreadyInFlight(status)),
        };
        if let Err(e) = self.ensure_network().await {
            // From Idle this is a pure precondition; mid-flight it sinks
            // the whole flow.
            return Err(if mid_flight { self.fail(e) } else { e });
        }

        self.state.request_id = Some(request_id);
        self.transition(FlowStatus::Verifying, 80, "Completing verification...");

        let tx_hash = match self.wallet.submit_completion(request_id).await {
            Ok(tx_hash) => tx_hash,
            Err(e) => return Err(self.fail(e.into())),
        };
        self.advance(90, "Finalizing verification...");

        if let Err(e) = self
            .wallet
            .wait_for_confirmation(tx_hash, self.config.confirmation_timeout())
            .await
        {
            return Err(self.fail(e.into()));
        }

        self.transition(FlowStatus::Completed, 100, "Verification completed successfully!");
        self.pending_events.push(FlowEvent::Completed(request_id));
        self.pending_events.push(FlowEvent::HistoryRefreshNeeded);
        info!(%request_id, "verification completed");
        Ok(())
    }

    /// Ensure the wallet is on the configured chain, switching if needed.
    async fn ensure_network(&mut self) -> Result<(), FlowError> {
        let expected = self.config.chain;
        let actual = self.wallet.chain_id();
        if actual == expected {
            return Ok(());
        }
        info!(%actual, %expected, "switching wallet chain");
        match self.wallet.switch_chain(expected).await {
            Ok(()) if self.wallet.chain_id() == expected => Ok(()),
            Ok(()) => Err(FlowError::WrongNetwork {
                expected,
                actual: self.wallet.chain_id(),
            }),
            Err(LedgerError::SwitchFailed(_)) => Err(FlowError::WrongNetwork { expected, actual }),
            Err(e) => Err(e.into()),
        }
    }

    fn transition(&mut self, status: FlowStatus, progress: u8, step: &str) {
        self.state.status = status;
        self.advance(progress, step);
    }

    fn advance(&mut self, progress: u8, step: &str) {
        self.state.progress = progress;
        self.state.current_step = step.to_string();
        debug!(status = %self.state.status, progress, step, "flow step");
    }

    /// Record a terminal failure, keeping `request_id` for diagnostics.
    fn fail(&mut self, error: FlowError) -> FlowError {
        warn!(%error, "verification flow failed");
        self.state.status = FlowStatus::Failed;
        self.state.error = Some(error.to_string());
        self.state.current_step = "Verification failed".to_string();
        error
    }
}
