//! Request and response bodies, and the handlers that translate between
//! them and the verification engine.
//!
//! Request bodies carry plain strings. Each one is parsed into typed values
//! here, at the boundary, so the engine never sees an unvalidated address.

use std::time::Instant;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use dareboard_types::{
    Address, AdminId, Claim, ClaimedOutcome, Clock, DecidedBy, Decision, ModerationAction,
    Subject, SubjectId, SubjectKind, Timestamp, VerificationRecord,
};
use dareboard_verification::Standing;
use serde::{Deserialize, Serialize};

use crate::error::RpcError;
use crate::server::AppState;

// ── Outcomes ─────────────────────────────────────────────────────────────

/// Wire form of a claimed outcome, tagged by `kind`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutcomeBody {
    Winner { address: String },
    SlotHolder { address: String },
    Points { holder: String, amount: u64 },
}

impl OutcomeBody {
    pub fn parse(self) -> Result<ClaimedOutcome, RpcError> {
        Ok(match self {
            Self::Winner { address } => ClaimedOutcome::Winner(Address::validate(&address)?),
            Self::SlotHolder { address } => ClaimedOutcome::SlotHolder(Address::validate(&address)?),
            Self::Points { holder, amount } => ClaimedOutcome::Points {
                holder: Address::validate(&holder)?,
                amount,
            },
        })
    }
}

impl From<&ClaimedOutcome> for OutcomeBody {
    fn from(outcome: &ClaimedOutcome) -> Self {
        match outcome {
            ClaimedOutcome::Winner(a) => Self::Winner { address: a.to_checksum() },
            ClaimedOutcome::SlotHolder(a) => Self::SlotHolder { address: a.to_checksum() },
            ClaimedOutcome::Points { holder, amount } => Self::Points {
                holder: holder.to_checksum(),
                amount: *amount,
            },
        }
    }
}

// ── Claims ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SubmitClaimRequest {
    pub claimant: String,
    pub subject: String,
    pub outcome: OutcomeBody,
}

impl SubmitClaimRequest {
    /// Validate every field and build a typed claim stamped at `now`.
    pub fn into_claim(self, now: Timestamp) -> Result<Claim, RpcError> {
        Ok(Claim {
            claimant: Address::validate(&self.claimant)?,
            subject: SubjectId::parse(self.subject)?,
            outcome: self.outcome.parse()?,
            submitted_at: now,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct RecordResponse {
    pub subject: String,
    pub claimant: String,
    pub outcome: OutcomeBody,
    pub status: &'static str,
    pub winner: Option<String>,
    /// `"system"` or `"admin"`.
    pub decided_by: &'static str,
    pub admin: Option<String>,
    pub decided_at: u64,
}

impl From<&VerificationRecord> for RecordResponse {
    fn from(r: &VerificationRecord) -> Self {
        let (decided_by, admin) = decided_by(&r.decided_by);
        Self {
            subject: r.subject.to_string(),
            claimant: r.claimant.to_checksum(),
            outcome: OutcomeBody::from(&r.outcome),
            status: r.status.as_str(),
            winner: r.winner.map(|w| w.to_checksum()),
            decided_by,
            admin,
            decided_at: r.decided_at.as_secs(),
        }
    }
}

fn decided_by(by: &DecidedBy) -> (&'static str, Option<String>) {
    match by {
        DecidedBy::System => ("system", None),
        DecidedBy::Admin(id) => ("admin", Some(id.to_string())),
    }
}

pub async fn submit_claim(
    State(state): State<AppState>,
    body: Result<Json<SubmitClaimRequest>, JsonRejection>,
) -> Result<Json<RecordResponse>, RpcError> {
    let parsed = body
        .map_err(RpcError::from)
        .and_then(|Json(req)| req.into_claim(state.clock.now()));
    let claim = match parsed {
        Ok(claim) => claim,
        Err(err) => {
            if let Some(metrics) = &state.metrics {
                metrics.claims_invalid.inc();
            }
            return Err(err);
        }
    };

    let started = Instant::now();
    let result = state.engine.submit_claim(claim).await;
    if let Some(metrics) = &state.metrics {
        metrics.observe_claim(&result, started.elapsed());
    }
    Ok(Json(RecordResponse::from(&result?)))
}

pub async fn get_record(
    State(state): State<AppState>,
    Path(subject): Path<String>,
) -> Result<Json<RecordResponse>, RpcError> {
    let subject = SubjectId::parse(subject)?;
    let record = state.engine.record(&subject)?;
    Ok(Json(RecordResponse::from(&record)))
}

// ── Subjects ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RegisterSubjectRequest {
    pub id: String,
    pub kind: String,
}

#[derive(Debug, Serialize)]
pub struct SubjectResponse {
    pub id: String,
    pub kind: &'static str,
    pub registered_at: u64,
}

impl From<&Subject> for SubjectResponse {
    fn from(s: &Subject) -> Self {
        Self {
            id: s.id.to_string(),
            kind: s.kind.as_str(),
            registered_at: s.registered_at.as_secs(),
        }
    }
}

pub async fn register_subject(
    State(state): State<AppState>,
    body: Result<Json<RegisterSubjectRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SubjectResponse>), RpcError> {
    let Json(req) = body?;
    let id = SubjectId::parse(req.id)?;
    let kind: SubjectKind = req.kind.parse()?;
    let subject = state.engine.register_subject(id, kind)?;
    Ok((StatusCode::CREATED, Json(SubjectResponse::from(&subject))))
}

// ── Moderation ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub subject: String,
    pub decision: String,
    pub admin: String,
}

fn parse_decision(raw: &str) -> Result<Decision, RpcError> {
    match raw {
        "approve" => Ok(Decision::Approve),
        "deny" => Ok(Decision::Deny),
        other => Err(RpcError::InvalidRequest(format!(
            "decision must be \"approve\" or \"deny\", got {other:?}"
        ))),
    }
}

pub async fn review(
    State(state): State<AppState>,
    body: Result<Json<ReviewRequest>, JsonRejection>,
) -> Result<Json<RecordResponse>, RpcError> {
    let Json(req) = body?;
    let subject = SubjectId::parse(req.subject)?;
    let decision = parse_decision(&req.decision)?;
    let admin = AdminId::parse(req.admin)?;

    let result = state.gate.review(&subject, decision, admin).await;
    if let Some(metrics) = &state.metrics {
        metrics.observe_review(&result);
    }
    Ok(Json(RecordResponse::from(&result?)))
}

#[derive(Debug, Serialize)]
pub struct ActionResponse {
    pub sequence: u64,
    pub decision: &'static str,
    pub admin: String,
    pub prior_status: &'static str,
    pub prior_decided_by: &'static str,
    pub resulting_status: &'static str,
    pub decided_at: u64,
}

impl From<&ModerationAction> for ActionResponse {
    fn from(a: &ModerationAction) -> Self {
        Self {
            sequence: a.sequence,
            decision: match a.decision {
                Decision::Approve => "approve",
                Decision::Deny => "deny",
            },
            admin: a.admin.to_string(),
            prior_status: a.prior_status.as_str(),
            prior_decided_by: decided_by(&a.prior_decided_by).0,
            resulting_status: a.resulting_status.as_str(),
            decided_at: a.decided_at.as_secs(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub subject: String,
    pub actions: Vec<ActionResponse>,
}

pub async fn review_history(
    State(state): State<AppState>,
    Path(subject): Path<String>,
) -> Result<Json<HistoryResponse>, RpcError> {
    let subject = SubjectId::parse(subject)?;
    let actions = state.gate.history(&subject)?;
    Ok(Json(HistoryResponse {
        subject: subject.to_string(),
        actions: actions.iter().map(ActionResponse::from).collect(),
    }))
}

// ── Leaderboard ──────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct LeaderboardResponse {
    pub standings: Vec<Standing>,
}

pub async fn leaderboard(
    State(state): State<AppState>,
) -> Result<Json<LeaderboardResponse>, RpcError> {
    Ok(Json(LeaderboardResponse {
        standings: state.engine.leaderboard()?,
    }))
}

// ── Operations ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn metrics(State(state): State<AppState>) -> Result<impl IntoResponse, RpcError> {
    let Some(metrics) = &state.metrics else {
        return Err(RpcError::Disabled("metrics"));
    };
    let text = metrics.encode()?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        text,
    ))
}
