//! Finality service: the single serialization point of the two-layer
//! protocol.
//!
//! Generic over its three collaborators so the dashboard wiring, the tests
//! and the runtime can each supply their own ledger sink, threat feed and
//! validator registry.

use crate::domain::{
    BlockVotes, FinalityOutcome, SignatureRecord, ThreatLevel, ThreatWeights, VerificationStatus,
};
use crate::error::{FinalityError, FinalityResult};
use crate::ports::inbound::{FinalityApi, SubmissionReceipt, VoteSubmission};
use crate::ports::outbound::{
    AppendRequest, LedgerGateway, ThreatSignalSource, ValidatorSetProvider,
};
use async_trait::async_trait;
use ledger_sigverify::{signing_message, SignatureVerifier};
use ledger_types::{hex_prefix, validate_pow, CandidateBlock, FinalizedRecord, Hash};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

/// Finality configuration.
#[derive(Clone, Debug, Default)]
pub struct FinalityConfig {
    /// Weights for the threat-factor computation.
    pub threat_weights: ThreatWeights,
}

/// Internal state shared across service handles.
struct FinalityState {
    /// Votes accumulated per mined block.
    votes: HashMap<Hash, BlockVotes>,
    /// Finalized block hashes and their sequence indices.
    finalized: HashMap<Hash, u64>,
    /// Blocks with a finality evaluation currently running.
    in_flight: HashSet<Hash>,
}

impl FinalityState {
    fn new() -> Self {
        Self {
            votes: HashMap::new(),
            finalized: HashMap::new(),
            in_flight: HashSet::new(),
        }
    }
}

/// Releases the per-block evaluation slot on every exit path.
struct InFlightGuard {
    state: Arc<RwLock<FinalityState>>,
    block_hash: Hash,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.state.write().in_flight.remove(&self.block_hash);
    }
}

/// Two-layer finality checker with an adaptive quorum threshold.
///
/// Layer 1 (proof-of-work) is always re-derived from the block contents at
/// evaluation time; the miner's recorded hash is evidence, never authority.
/// Layer 2 counts deduplicated valid votes against
/// `ceil(validators × threat factor)`.
pub struct FinalityService<L, T, V>
where
    L: LedgerGateway,
    T: ThreatSignalSource,
    V: ValidatorSetProvider,
{
    config: FinalityConfig,
    state: Arc<RwLock<FinalityState>>,
    ledger: Arc<L>,
    threat_source: Arc<T>,
    validator_provider: Arc<V>,
    verifier: SignatureVerifier,
}

impl<L, T, V> Clone for FinalityService<L, T, V>
where
    L: LedgerGateway,
    T: ThreatSignalSource,
    V: ValidatorSetProvider,
{
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            state: Arc::clone(&self.state),
            ledger: Arc::clone(&self.ledger),
            threat_source: Arc::clone(&self.threat_source),
            validator_provider: Arc::clone(&self.validator_provider),
            verifier: self.verifier,
        }
    }
}

impl<L, T, V> FinalityService<L, T, V>
where
    L: LedgerGateway,
    T: ThreatSignalSource,
    V: ValidatorSetProvider,
{
    /// Creates a new finality service.
    pub fn new(
        config: FinalityConfig,
        ledger: Arc<L>,
        threat_source: Arc<T>,
        validator_provider: Arc<V>,
    ) -> Self {
        Self {
            config,
            state: Arc::new(RwLock::new(FinalityState::new())),
            ledger,
            threat_source,
            validator_provider,
            verifier: SignatureVerifier::new(),
        }
    }

    /// Distinct valid signers recorded for a block.
    pub fn valid_signature_count(&self, block_hash: &Hash) -> usize {
        self.state
            .read()
            .votes
            .get(block_hash)
            .map_or(0, BlockVotes::valid_signer_count)
    }

    /// Claims the evaluation slot for a block, or reports why it cannot run.
    fn begin_evaluation(&self, block_hash: Hash) -> FinalityResult<InFlightGuard> {
        let mut state = self.state.write();
        if state.finalized.contains_key(&block_hash) {
            return Err(FinalityError::AlreadyFinalized {
                block: hex_prefix(&block_hash),
            });
        }
        if !state.in_flight.insert(block_hash) {
            return Err(FinalityError::EvaluationInFlight {
                block: hex_prefix(&block_hash),
            });
        }
        Ok(InFlightGuard {
            state: Arc::clone(&self.state),
            block_hash,
        })
    }

    fn mined_hash(block: &CandidateBlock) -> FinalityResult<Hash> {
        block
            .hash
            .ok_or(FinalityError::UnminedBlock { index: block.index })
    }
}

#[async_trait]
impl<L, T, V> FinalityApi for FinalityService<L, T, V>
where
    L: LedgerGateway,
    T: ThreatSignalSource,
    V: ValidatorSetProvider,
{
    async fn submit_signature(
        &self,
        block: &CandidateBlock,
        submission: VoteSubmission,
    ) -> FinalityResult<SubmissionReceipt> {
        let block_hash = Self::mined_hash(block)?;

        if self.is_finalized(&block_hash) {
            return Err(FinalityError::AlreadyFinalized {
                block: hex_prefix(&block_hash),
            });
        }

        let validators = self.validator_provider.active_validators().await?;
        if !validators.contains(&submission.signer_id) {
            return Err(FinalityError::UnknownValidator {
                signer: hex_prefix(&submission.signer_id),
            });
        }

        // Verification is pure and runs outside any lock; only the
        // seen-signer bookkeeping below is serialized.
        let message = signing_message(&block_hash, block.index, block.created_at);
        let verdict = self
            .verifier
            .verify(&message, &submission.public_key, &submission.signature);

        let mut record = SignatureRecord {
            signer_id: submission.signer_id,
            public_key: submission.public_key,
            signature: submission.signature,
            signed_at: submission.signed_at,
            status: VerificationStatus::Unverified,
        };

        if let Err(source) = verdict {
            record.status = VerificationStatus::Invalid;
            let mut state = self.state.write();
            state
                .votes
                .entry(block_hash)
                .or_insert_with(|| BlockVotes::new(block_hash))
                .record_invalid(record);
            tracing::debug!(
                block = %hex_prefix(&block_hash),
                signer = %hex_prefix(&submission.signer_id),
                "rejected invalid quorum vote"
            );
            return Err(FinalityError::InvalidSignature {
                signer: hex_prefix(&submission.signer_id),
                source,
            });
        }

        record.status = VerificationStatus::Valid;
        let mut state = self.state.write();
        let votes = state
            .votes
            .entry(block_hash)
            .or_insert_with(|| BlockVotes::new(block_hash));
        let counted = votes.record_valid(record);
        let valid_count = votes.valid_signer_count();
        drop(state);

        tracing::debug!(
            block = %hex_prefix(&block_hash),
            signer = %hex_prefix(&submission.signer_id),
            counted,
            valid_count,
            "recorded quorum vote"
        );

        Ok(SubmissionReceipt {
            block_hash,
            duplicate: !counted,
            valid_count,
        })
    }

    #[tracing::instrument(skip(self, block), fields(index = block.index))]
    async fn finalize(&self, block: &CandidateBlock) -> FinalityResult<FinalityOutcome> {
        let block_hash = Self::mined_hash(block)?;
        let started = Instant::now();
        let _guard = self.begin_evaluation(block_hash)?;

        // Layer 1: re-derive the proof from the block contents. The miner
        // and this checker may sit in different trust domains, so the
        // recorded hash is never taken at its word.
        if !validate_pow(block) {
            let achieved = self.valid_signature_count(&block_hash);
            let outcome = FinalityOutcome::rejected_layer1(
                block_hash,
                achieved,
                started.elapsed().as_millis() as u64,
            );
            tracing::info!(block = %hex_prefix(&block_hash), "rejected: pow-invalid");
            return Ok(outcome);
        }

        // Layer 2: adaptive quorum.
        let threat = self.current_threat().await;
        let validators = self.validator_provider.active_validators().await?;
        if validators.is_empty() {
            return Err(FinalityError::ValidatorSetUnavailable {
                reason: "active validator set is empty".to_string(),
            });
        }
        let quorum_required = threat.quorum_required(validators.len());
        let quorum_achieved = self.valid_signature_count(&block_hash);

        if quorum_achieved < quorum_required {
            let outcome = FinalityOutcome::rejected_layer2(
                block_hash,
                quorum_achieved,
                quorum_required,
                threat.factor,
                started.elapsed().as_millis() as u64,
            );
            tracing::info!(
                block = %hex_prefix(&block_hash),
                quorum_achieved,
                quorum_required,
                threat_factor = threat.factor,
                "rejected: quorum insufficient"
            );
            return Ok(outcome);
        }

        // Both layers hold; the append must succeed before anything is
        // considered final. On failure the error propagates, the in-flight
        // guard releases, and nothing is recorded, so the attempt is safe to
        // retry.
        let record = FinalizedRecord::from_block(block)
            .map_err(|_| FinalityError::UnminedBlock { index: block.index })?;
        self.ledger.append(AppendRequest::new(record)).await?;

        let mut state = self.state.write();
        state.finalized.insert(block_hash, block.index);
        state.votes.remove(&block_hash);
        drop(state);

        let elapsed_ms = started.elapsed().as_millis() as u64;
        tracing::info!(
            block = %hex_prefix(&block_hash),
            quorum_achieved,
            quorum_required,
            threat_factor = threat.factor,
            elapsed_ms,
            "block finalized"
        );
        Ok(FinalityOutcome::finalized(
            block_hash,
            quorum_achieved,
            quorum_required,
            threat.factor,
            elapsed_ms,
        ))
    }

    async fn current_threat(&self) -> ThreatLevel {
        match self.threat_source.alert_counts().await {
            Ok(counts) => ThreatLevel::from_counts(counts, &self.config.threat_weights),
            Err(err) => {
                tracing::warn!(%err, "threat signal unavailable, degrading to minimum factor");
                ThreatLevel::minimum()
            }
        }
    }

    fn is_finalized(&self, block_hash: &Hash) -> bool {
        self.state.read().finalized.contains_key(block_hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AlertCounts, FinalityVerdict, ValidatorSet};
    use ed25519_dalek::{Signer, SigningKey};
    use ledger_forge::{ForgeConfig, ProofOfWorkMiner};
    use ledger_types::{SignerId, Transaction};
    use rand::rngs::OsRng;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicBool, Ordering};

    // =========================================================================
    // MOCK COLLABORATORS
    // =========================================================================

    #[derive(Default)]
    struct MockLedger {
        appended: RwLock<Vec<AppendRequest>>,
        fail: AtomicBool,
    }

    #[async_trait]
    impl LedgerGateway for MockLedger {
        async fn append(&self, request: AppendRequest) -> FinalityResult<()> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(FinalityError::LedgerAppend {
                    reason: "sink offline".to_string(),
                });
            }
            self.appended.write().push(request);
            Ok(())
        }
    }

    /// Gated ledger for exercising the in-flight guard: append blocks until
    /// released.
    struct SlowLedger {
        gate: tokio::sync::Notify,
        inner: MockLedger,
    }

    #[async_trait]
    impl LedgerGateway for SlowLedger {
        async fn append(&self, request: AppendRequest) -> FinalityResult<()> {
            self.gate.notified().await;
            self.inner.append(request).await
        }
    }

    struct FixedThreat(Option<AlertCounts>);

    #[async_trait]
    impl ThreatSignalSource for FixedThreat {
        async fn alert_counts(&self) -> FinalityResult<AlertCounts> {
            self.0.ok_or(FinalityError::ThreatSignalUnavailable {
                reason: "feed offline".to_string(),
            })
        }
    }

    struct FixedValidators(ValidatorSet);

    #[async_trait]
    impl ValidatorSetProvider for FixedValidators {
        async fn active_validators(&self) -> FinalityResult<ValidatorSet> {
            Ok(self.0.clone())
        }
    }

    // =========================================================================
    // TEST FIXTURES
    // =========================================================================

    struct Validator {
        id: SignerId,
        key: SigningKey,
    }

    impl Validator {
        fn new(id_byte: u8) -> Self {
            Self {
                id: [id_byte; 32],
                key: SigningKey::generate(&mut OsRng),
            }
        }

        fn vote(&self, block: &CandidateBlock) -> VoteSubmission {
            let message = signing_message(
                &block.hash.expect("block must be mined"),
                block.index,
                block.created_at,
            );
            VoteSubmission {
                signer_id: self.id,
                public_key: self.key.verifying_key().to_bytes(),
                signature: self.key.sign(&message).to_bytes(),
                signed_at: 5_000,
            }
        }
    }

    fn mined_block() -> CandidateBlock {
        let txs = vec![Transaction::new(b"role-grant".to_vec(), 25, 10, None, 1_000)];
        let mut block = CandidateBlock::new(1, [0xAB; 32], txs, BTreeMap::new(), 1, 2_000);
        ProofOfWorkMiner::new(ForgeConfig::for_testing()).mine(&mut block);
        block
    }

    type TestService = FinalityService<MockLedger, FixedThreat, FixedValidators>;

    fn quiet_service(validators: &[Validator]) -> (TestService, Arc<MockLedger>) {
        service_with_threat(validators, Some(AlertCounts::default()))
    }

    fn service_with_threat(
        validators: &[Validator],
        counts: Option<AlertCounts>,
    ) -> (TestService, Arc<MockLedger>) {
        let ledger = Arc::new(MockLedger::default());
        let set = ValidatorSet::new(validators.iter().map(|v| v.id).collect());
        let service = FinalityService::new(
            FinalityConfig::default(),
            Arc::clone(&ledger),
            Arc::new(FixedThreat(counts)),
            Arc::new(FixedValidators(set)),
        );
        (service, ledger)
    }

    // =========================================================================
    // END-TO-END SCENARIOS
    // =========================================================================

    #[tokio::test]
    async fn test_finalizes_with_quorum_and_valid_pow() {
        // 3 validators at factor 0.51 → required = ceil(1.53) = 2.
        let validators: Vec<_> = (1..=3).map(Validator::new).collect();
        let (service, ledger) = quiet_service(&validators);
        let block = mined_block();

        service
            .submit_signature(&block, validators[0].vote(&block))
            .await
            .unwrap();
        service
            .submit_signature(&block, validators[1].vote(&block))
            .await
            .unwrap();

        let outcome = service.finalize(&block).await.unwrap();
        assert!(outcome.is_finalized());
        assert_eq!(outcome.quorum_achieved, 2);
        assert_eq!(outcome.quorum_required, Some(2));
        assert_eq!(outcome.threat_factor, Some(0.51));
        assert!(service.is_finalized(&block.hash.unwrap()));

        let appended = ledger.appended.read();
        assert_eq!(appended.len(), 1);
        assert_eq!(appended[0].record.hash, block.hash.unwrap());
        assert_eq!(appended[0].record.transaction_count, 1);
    }

    #[tokio::test]
    async fn test_rejects_short_quorum_citing_counts() {
        let validators: Vec<_> = (1..=3).map(Validator::new).collect();
        let (service, ledger) = quiet_service(&validators);
        let block = mined_block();

        service
            .submit_signature(&block, validators[0].vote(&block))
            .await
            .unwrap();

        let outcome = service.finalize(&block).await.unwrap();
        assert_eq!(outcome.verdict, FinalityVerdict::RejectedLayer2);
        assert!(outcome.reason.as_deref().unwrap().contains("1/2"));
        assert!(ledger.appended.read().is_empty());
        assert!(!service.is_finalized(&block.hash.unwrap()));
    }

    #[tokio::test]
    async fn test_rejects_mutated_payload_regardless_of_quorum() {
        let validators: Vec<_> = (1..=3).map(Validator::new).collect();
        let (service, ledger) = quiet_service(&validators);
        let mut block = mined_block();

        service
            .submit_signature(&block, validators[0].vote(&block))
            .await
            .unwrap();
        service
            .submit_signature(&block, validators[1].vote(&block))
            .await
            .unwrap();

        // Tamper after mining: quorum is intact, Layer 1 is not.
        block.transactions[0].payload = b"role-grant-admin".to_vec();

        let outcome = service.finalize(&block).await.unwrap();
        assert_eq!(outcome.verdict, FinalityVerdict::RejectedLayer1);
        assert_eq!(outcome.reason.as_deref(), Some("pow-invalid"));
        assert!(ledger.appended.read().is_empty());
    }

    // =========================================================================
    // VOTE SUBMISSION
    // =========================================================================

    #[tokio::test]
    async fn test_duplicate_signer_counts_once() {
        let validators: Vec<_> = (1..=3).map(Validator::new).collect();
        let (service, _) = quiet_service(&validators);
        let block = mined_block();

        let first = service
            .submit_signature(&block, validators[0].vote(&block))
            .await
            .unwrap();
        assert!(!first.duplicate);
        assert_eq!(first.valid_count, 1);

        let second = service
            .submit_signature(&block, validators[0].vote(&block))
            .await
            .unwrap();
        assert!(second.duplicate);
        assert_eq!(second.valid_count, 1);
    }

    #[tokio::test]
    async fn test_invalid_signature_does_not_poison_block() {
        let validators: Vec<_> = (1..=3).map(Validator::new).collect();
        let (service, _) = quiet_service(&validators);
        let block = mined_block();

        let mut bad_vote = validators[0].vote(&block);
        bad_vote.signature = [0u8; 64];
        let result = service.submit_signature(&block, bad_vote).await;
        assert!(matches!(result, Err(FinalityError::InvalidSignature { .. })));
        assert_eq!(service.valid_signature_count(&block.hash.unwrap()), 0);

        // Other signers (and the same signer with a correct vote) still land.
        service
            .submit_signature(&block, validators[0].vote(&block))
            .await
            .unwrap();
        service
            .submit_signature(&block, validators[1].vote(&block))
            .await
            .unwrap();
        assert_eq!(service.valid_signature_count(&block.hash.unwrap()), 2);
    }

    #[tokio::test]
    async fn test_unknown_validator_rejected() {
        let validators: Vec<_> = (1..=3).map(Validator::new).collect();
        let (service, _) = quiet_service(&validators);
        let block = mined_block();

        let outsider = Validator::new(0x99);
        let result = service.submit_signature(&block, outsider.vote(&block)).await;
        assert!(matches!(result, Err(FinalityError::UnknownValidator { .. })));
    }

    #[tokio::test]
    async fn test_unmined_block_has_nothing_to_sign() {
        let validators: Vec<_> = (1..=3).map(Validator::new).collect();
        let (service, _) = quiet_service(&validators);
        let unmined = CandidateBlock::new(1, [0xAB; 32], vec![], BTreeMap::new(), 1, 2_000);

        let result = service.finalize(&unmined).await;
        assert!(matches!(result, Err(FinalityError::UnminedBlock { index: 1 })));
    }

    // =========================================================================
    // ADAPTIVE THRESHOLD
    // =========================================================================

    #[tokio::test]
    async fn test_elevated_threat_raises_quorum_bar() {
        // Saturated alerts → factor 0.90 → required = ceil(2.7) = 3.
        let validators: Vec<_> = (1..=3).map(Validator::new).collect();
        let (service, _) = service_with_threat(
            &validators,
            Some(AlertCounts {
                critical_alerts: 10,
                high_alerts: 0,
                unblocked_attacks: 0,
            }),
        );
        let block = mined_block();

        service
            .submit_signature(&block, validators[0].vote(&block))
            .await
            .unwrap();
        service
            .submit_signature(&block, validators[1].vote(&block))
            .await
            .unwrap();

        let outcome = service.finalize(&block).await.unwrap();
        assert_eq!(outcome.verdict, FinalityVerdict::RejectedLayer2);
        assert_eq!(outcome.quorum_required, Some(3));
    }

    #[tokio::test]
    async fn test_threat_outage_degrades_to_minimum() {
        let validators: Vec<_> = (1..=3).map(Validator::new).collect();
        let (service, _) = service_with_threat(&validators, None);

        let threat = service.current_threat().await;
        assert_eq!(threat.factor, crate::domain::FACTOR_MIN);

        // Consensus stays available at the conservative floor.
        let block = mined_block();
        service
            .submit_signature(&block, validators[0].vote(&block))
            .await
            .unwrap();
        service
            .submit_signature(&block, validators[1].vote(&block))
            .await
            .unwrap();
        assert!(service.finalize(&block).await.unwrap().is_finalized());
    }

    #[tokio::test]
    async fn test_empty_validator_set_cannot_anchor_quorum() {
        let (service, _) = quiet_service(&[]);
        let block = mined_block();

        let result = service.finalize(&block).await;
        assert!(matches!(
            result,
            Err(FinalityError::ValidatorSetUnavailable { .. })
        ));
    }

    // =========================================================================
    // IDEMPOTENCE AND RETRY SAFETY
    // =========================================================================

    #[tokio::test]
    async fn test_refinalizing_reports_already_finalized() {
        let validators: Vec<_> = (1..=3).map(Validator::new).collect();
        let (service, ledger) = quiet_service(&validators);
        let block = mined_block();

        service
            .submit_signature(&block, validators[0].vote(&block))
            .await
            .unwrap();
        service
            .submit_signature(&block, validators[1].vote(&block))
            .await
            .unwrap();
        service.finalize(&block).await.unwrap();

        let again = service.finalize(&block).await;
        assert!(matches!(again, Err(FinalityError::AlreadyFinalized { .. })));
        // No double append.
        assert_eq!(ledger.appended.read().len(), 1);
    }

    #[tokio::test]
    async fn test_ledger_failure_is_fatal_but_retryable() {
        let validators: Vec<_> = (1..=3).map(Validator::new).collect();
        let (service, ledger) = quiet_service(&validators);
        let block = mined_block();

        service
            .submit_signature(&block, validators[0].vote(&block))
            .await
            .unwrap();
        service
            .submit_signature(&block, validators[1].vote(&block))
            .await
            .unwrap();

        ledger.fail.store(true, Ordering::SeqCst);
        let result = service.finalize(&block).await;
        assert!(matches!(result, Err(FinalityError::LedgerAppend { .. })));
        assert!(!service.is_finalized(&block.hash.unwrap()));

        // The sink recovers; the same attempt now completes.
        ledger.fail.store(false, Ordering::SeqCst);
        let outcome = service.finalize(&block).await.unwrap();
        assert!(outcome.is_finalized());
        assert_eq!(ledger.appended.read().len(), 1);
    }

    #[tokio::test]
    async fn test_at_most_one_evaluation_in_flight_per_block() {
        let validator = Validator::new(1);
        let slow_ledger = Arc::new(SlowLedger {
            gate: tokio::sync::Notify::new(),
            inner: MockLedger::default(),
        });
        let service = FinalityService::new(
            FinalityConfig::default(),
            Arc::clone(&slow_ledger),
            Arc::new(FixedThreat(Some(AlertCounts::default()))),
            Arc::new(FixedValidators(ValidatorSet::new(vec![validator.id]))),
        );
        let block = mined_block();

        // One validator at factor 0.51 → required 1.
        service
            .submit_signature(&block, validator.vote(&block))
            .await
            .unwrap();

        let racing = {
            let service = service.clone();
            let block = block.clone();
            tokio::spawn(async move { service.finalize(&block).await })
        };
        // Let the first evaluation reach the gated append.
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        let second = service.finalize(&block).await;
        assert!(matches!(
            second,
            Err(FinalityError::EvaluationInFlight { .. })
        ));

        slow_ledger.gate.notify_one();
        let outcome = racing.await.unwrap().unwrap();
        assert!(outcome.is_finalized());
        assert_eq!(slow_ledger.inner.appended.read().len(), 1);
    }
}
