//! Prometheus metrics for the claim API.
//!
//! [`ApiMetrics`] owns a dedicated [`Registry`] that `GET /metrics` encodes
//! into the text exposition format.

use std::time::Duration;

use dareboard_types::{ClaimStatus, VerificationRecord};
use dareboard_verification::VerificationError;
use prometheus::{
    register_histogram_with_registry, register_int_counter_with_registry, Encoder, Histogram,
    HistogramOpts, IntCounter, Opts, Registry, TextEncoder,
};

pub struct ApiMetrics {
    pub registry: Registry,

    // ── Claims ──────────────────────────────────────────────────────────
    pub claims_submitted: IntCounter,
    pub claims_invalid: IntCounter,
    pub claims_verified: IntCounter,
    pub claims_rejected: IntCounter,
    pub claims_pending: IntCounter,
    pub claims_duplicate: IntCounter,
    pub chain_unavailable: IntCounter,
    pub conflicts: IntCounter,

    // ── Moderation ──────────────────────────────────────────────────────
    pub reviews: IntCounter,

    /// Wall time of a claim submission, fact fetch included, in seconds.
    pub claim_latency_seconds: Histogram,
}

fn counter(registry: &Registry, name: &str, help: &str) -> Result<IntCounter, prometheus::Error> {
    register_int_counter_with_registry!(Opts::new(name, help), registry)
}

impl ApiMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let claims_submitted = counter(
            &registry,
            "dareboard_claims_submitted_total",
            "Claims accepted for verification",
        )?;
        let claims_invalid = counter(
            &registry,
            "dareboard_claims_invalid_total",
            "Claims refused before verification for a malformed body or field",
        )?;
        let claims_verified = counter(&registry, "dareboard_claims_verified_total", "Claims committed as Verified")?;
        let claims_rejected = counter(&registry, "dareboard_claims_rejected_total", "Claims committed as Rejected")?;
        let claims_pending = counter(
            &registry,
            "dareboard_claims_pending_total",
            "Claims committed as PendingReview",
        )?;
        let claims_duplicate = counter(
            &registry,
            "dareboard_claims_duplicate_total",
            "Claims refused because the subject was already terminal",
        )?;
        let chain_unavailable = counter(
            &registry,
            "dareboard_chain_unavailable_total",
            "Claims that failed because the fact source was unreachable",
        )?;
        let conflicts = counter(&registry, "dareboard_conflicts_total", "Writes that lost a concurrent race")?;
        let reviews = counter(&registry, "dareboard_reviews_total", "Admin reviews committed")?;

        let claim_latency_seconds = register_histogram_with_registry!(
            HistogramOpts::new(
                "dareboard_claim_latency_seconds",
                "Time to decide a claim, including the fact fetch"
            )
            .buckets(vec![0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
            registry
        )?;

        Ok(Self {
            registry,
            claims_submitted,
            claims_invalid,
            claims_verified,
            claims_rejected,
            claims_pending,
            claims_duplicate,
            chain_unavailable,
            conflicts,
            reviews,
            claim_latency_seconds,
        })
    }

    /// Count one claim submission and its result.
    pub fn observe_claim(
        &self,
        result: &Result<VerificationRecord, VerificationError>,
        elapsed: Duration,
    ) {
        self.claims_submitted.inc();
        self.claim_latency_seconds.observe(elapsed.as_secs_f64());
        match result {
            Ok(record) => match record.status {
                ClaimStatus::Verified => self.claims_verified.inc(),
                ClaimStatus::Rejected => self.claims_rejected.inc(),
                ClaimStatus::PendingReview => self.claims_pending.inc(),
            },
            Err(VerificationError::DuplicateClaim(_)) => self.claims_duplicate.inc(),
            Err(VerificationError::ChainUnavailable(_)) => self.chain_unavailable.inc(),
            Err(VerificationError::Conflict(_)) => self.conflicts.inc(),
            Err(_) => {}
        }
    }

    pub fn observe_review(&self, result: &Result<VerificationRecord, VerificationError>) {
        match result {
            Ok(_) => self.reviews.inc(),
            Err(VerificationError::Conflict(_)) => self.conflicts.inc(),
            Err(_) => {}
        }
    }

    /// Encode every registered metric in the Prometheus text format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buf)?;
        String::from_utf8(buf).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
