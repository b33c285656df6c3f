use std::fmt;
use std::sync::Arc;

use rp_crypto::{ContentHasher, IdentifierDeriver, NonceSource, OsNonceSource, SecretKey};
use rp_gate::RequestValidator;
use rp_ledger::{Broadcaster, CommitResult, DerivedRequest, EncodedTransaction, TransactionBuilder};
use rp_store::{Delivery, RequestStore, RetainedRequest};
use rp_types::{Request, RequestId};

use crate::error::{PipelineError, PipelineResult};
use crate::locks::ReferenceLocks;

/// How a `create` call concluded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CreateStatus {
    /// The reference ID was already known; nothing was derived or sent.
    /// `delivery` is where its transaction stands: a pending one can be
    /// resent with [`RequestPipeline::resume_broadcast`].
    Duplicate { delivery: Option<Delivery> },
    /// The transaction is committed by the ledger.
    Committed { tx_hash: String, height: u64 },
}

/// Successful result of [`RequestPipeline::create`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateOutcome {
    pub request_id: RequestId,
    pub status: CreateStatus,
}

impl CreateOutcome {
    pub fn is_duplicate(&self) -> bool {
        matches!(self.status, CreateStatus::Duplicate { .. })
    }

    /// Whether the ledger has committed this request's transaction.
    pub fn is_committed(&self) -> bool {
        matches!(
            self.status,
            CreateStatus::Committed { .. }
                | CreateStatus::Duplicate {
                    delivery: Some(Delivery::Committed { .. })
                }
        )
    }

    /// The transaction still waiting for a ledger verdict, if any.
    pub fn pending_tx(&self) -> Option<&str> {
        match &self.status {
            CreateStatus::Duplicate {
                delivery: Some(Delivery::Pending { tx }),
            } => Some(tx),
            _ => None,
        }
    }
}

/// Work prepared under the reference lock, sent after it is released.
struct Prepared {
    request_id: RequestId,
    tx: EncodedTransaction,
}

/// The request-issuance pipeline.
///
/// Owns no global state: the store, validator and broadcaster are injected,
/// so independent pipelines (and tests) never share data by accident.
pub struct RequestPipeline {
    secret: SecretKey,
    hasher: ContentHasher,
    deriver: IdentifierDeriver,
    nonces: Arc<dyn NonceSource>,
    builder: TransactionBuilder,
    store: Arc<dyn RequestStore>,
    validator: Arc<dyn RequestValidator>,
    broadcaster: Arc<dyn Broadcaster>,
    locks: ReferenceLocks,
    /// Keyed by request ID; one broadcast of a transaction at a time.
    sending: ReferenceLocks,
}

impl RequestPipeline {
    pub fn new(
        secret: SecretKey,
        store: Arc<dyn RequestStore>,
        validator: Arc<dyn RequestValidator>,
        broadcaster: Arc<dyn Broadcaster>,
    ) -> Self {
        let nonces: Arc<dyn NonceSource> = Arc::new(OsNonceSource);
        Self {
            secret,
            hasher: ContentHasher::new(),
            deriver: IdentifierDeriver::REQUEST_ID,
            builder: TransactionBuilder::new(Arc::clone(&nonces)),
            nonces,
            store,
            validator,
            broadcaster,
            locks: ReferenceLocks::default(),
            sending: ReferenceLocks::default(),
        }
    }

    /// Replace the nonce source used for both derivation and envelopes.
    pub fn with_nonce_source(mut self, nonces: Arc<dyn NonceSource>) -> Self {
        self.builder = TransactionBuilder::new(Arc::clone(&nonces));
        self.nonces = nonces;
        self
    }

    pub fn store(&self) -> &Arc<dyn RequestStore> {
        &self.store
    }

    /// Validate, deduplicate, derive, encode and broadcast one request.
    pub async fn create(
        &self,
        namespace: &str,
        identifier: &str,
        request: Request,
    ) -> PipelineResult<CreateOutcome> {
        self.validator.validate_params(namespace, identifier)?;
        self.validator.validate_payload(&request)?;

        let prepared = {
            let _guard = self.locks.acquire(&request.reference_id).await;
            match self.prepare(&request)? {
                Ok(prepared) => prepared,
                Err(request_id) => {
                    let delivery = self.store.delivery(&request_id);
                    tracing::debug!(
                        reference_id = %request.reference_id,
                        %request_id,
                        pending = delivery.as_ref().is_some_and(Delivery::is_pending),
                        "duplicate reference, returning recorded request"
                    );
                    if let Some(Delivery::Rejected { code, reason }) = delivery {
                        return Err(PipelineError::Rejected {
                            request_id,
                            code,
                            reason,
                        });
                    }
                    return Ok(CreateOutcome {
                        request_id,
                        status: CreateStatus::Duplicate { delivery },
                    });
                }
            }
        };

        tracing::info!(
            reference_id = %request.reference_id,
            request_id = %prepared.request_id,
            data_requests = request.data_request_list.len(),
            "request derived, broadcasting"
        );
        self.send(prepared.request_id, prepared.tx).await
    }

    /// Resend a transaction whose earlier broadcast hit a transport failure.
    pub async fn retry_broadcast(
        &self,
        request_id: RequestId,
        tx: EncodedTransaction,
    ) -> PipelineResult<CreateOutcome> {
        tracing::debug!(%request_id, "retrying broadcast");
        self.send(request_id, tx).await
    }

    /// Resend the pending transaction of an earlier request.
    ///
    /// A request the ledger already settled is answered from the store
    /// without touching the network.
    pub async fn resume_broadcast(&self, request_id: RequestId) -> PipelineResult<CreateOutcome> {
        match self.store.delivery(&request_id) {
            Some(Delivery::Pending { tx }) => {
                tracing::debug!(%request_id, "resuming pending broadcast");
                self.send(request_id, EncodedTransaction::from_encoded(tx)).await
            }
            Some(settled) => conclude(request_id, settled),
            None => Err(PipelineError::UnknownRequest(request_id)),
        }
    }

    /// A retained request body.
    pub fn get(&self, request_id: &RequestId) -> PipelineResult<Option<RetainedRequest>> {
        Ok(self.store.get(request_id)?)
    }

    /// Steps run under the reference lock. `Err(id)` in the inner result
    /// means the reference ID is already taken by `id`.
    fn prepare(&self, request: &Request) -> PipelineResult<Result<Prepared, RequestId>> {
        if let Some(existing) = self.store.lookup(&request.reference_id) {
            return Ok(Err(existing));
        }

        let nonce = self.nonces.next_nonce();
        let request_id = self.deriver.derive(&self.secret, &nonce, request)?;
        let derived = DerivedRequest::from_request(request_id, request, &self.hasher)?;
        let tx = self.builder.build(&derived)?;

        let recorded = self.store.record(&request.reference_id, request_id)?;
        if recorded != request_id {
            // Another pipeline sharing this store got there first.
            return Ok(Err(recorded));
        }
        self.store.begin_delivery(request_id, tx.as_str())?;
        if request.has_data_requests() {
            self.store.retain(request_id, request)?;
        }

        Ok(Ok(Prepared { request_id, tx }))
    }

    /// Broadcast and settle the delivery. Sends of one request ID are
    /// serialized, and a delivery settled meanwhile is not sent again.
    async fn send(&self, request_id: RequestId, tx: EncodedTransaction) -> PipelineResult<CreateOutcome> {
        let _guard = self.sending.acquire(&request_id.to_hex()).await;
        if let Some(settled) = self.store.delivery(&request_id).filter(Delivery::is_settled) {
            return conclude(request_id, settled);
        }

        let verdict = match self.broadcaster.broadcast(&tx).await {
            CommitResult::Committed { tx_hash, height } => Delivery::Committed { tx_hash, height },
            CommitResult::Rejected { code, reason } => Delivery::Rejected { code, reason },
            CommitResult::TransportFailure { cause } => {
                return Err(PipelineError::Transport {
                    request_id,
                    cause,
                    tx,
                });
            }
        };
        let held = match self.store.settle_delivery(request_id, verdict.clone()) {
            Ok(held) => held,
            Err(e) => {
                tracing::warn!(%request_id, error = %e, "failed to record ledger verdict");
                verdict
            }
        };
        conclude(request_id, held)
    }
}

fn conclude(request_id: RequestId, delivery: Delivery) -> PipelineResult<CreateOutcome> {
    match delivery {
        Delivery::Committed { tx_hash, height } => Ok(CreateOutcome {
            request_id,
            status: CreateStatus::Committed { tx_hash, height },
        }),
        Delivery::Rejected { code, reason } => Err(PipelineError::Rejected {
            request_id,
            code,
            reason,
        }),
        pending @ Delivery::Pending { .. } => Ok(CreateOutcome {
            request_id,
            status: CreateStatus::Duplicate {
                delivery: Some(pending),
            },
        }),
    }
}

impl fmt::Debug for RequestPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestPipeline")
            .field("deriver", &self.deriver)
            .finish_non_exhaustive()
    }
}
