/// Input records consumed by the analysis core.
///
/// Two record streams feed a run: transfers ([`EdgeRecord`]) and per-account
/// risk attributes ([`RiskRecord`]). Collaborators that load data from an
/// untyped source deserialize into [`RawEdgeRecord`] / [`RawRiskRecord`],
/// whose fields are all optional, and convert with `into_record` so that a
/// missing field surfaces as [`RecordError::MalformedRecord`] carrying the
/// record's position instead of an opaque deserializer message.
///
/// # Risk-score policy
///
/// Scores are documented to lie in `[0.0, 1.0]`. [`RiskPolicy::Reject`]
/// (the default) fails the run with [`RecordError::InvalidRiskScore`];
/// [`RiskPolicy::Clamp`] pulls the score into range and logs a warning.
/// Non-finite scores are rejected under both policies.
///
/// # Weights
///
/// Transfer weights are passed through untouched. Negative and non-finite
/// amounts are accepted and summed as-is; range checks on amounts are the
/// caller's responsibility.
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A single directed transfer between two accounts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    /// Sending account.
    pub from: String,
    /// Receiving account.
    pub to: String,
    /// Transfer amount.
    pub weight: f64,
    /// Transaction identifier, if the source carries one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl EdgeRecord {
    /// Creates an unlabelled transfer record.
    pub fn new(from: impl Into<String>, to: impl Into<String>, weight: f64) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            weight,
            label: None,
        }
    }

    /// Attaches a transaction identifier.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Checks that both endpoints are present.
    ///
    /// `index` is the record's position in its input stream and is echoed in
    /// the error.
    ///
    /// # Errors
    ///
    /// [`RecordError::MalformedRecord`] if `from` or `to` is empty.
    pub fn validate(&self, index: usize) -> Result<(), RecordError> {
        if self.from.is_empty() {
            return Err(RecordError::malformed(RecordKind::Edge, index, "from"));
        }
        if self.to.is_empty() {
            return Err(RecordError::malformed(RecordKind::Edge, index, "to"));
        }
        Ok(())
    }
}

/// A risk score attached to one account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskRecord {
    /// Account identifier.
    pub id: String,
    /// Risk score, nominally in `[0.0, 1.0]`.
    pub risk: f64,
}

impl RiskRecord {
    /// Creates a risk record.
    pub fn new(id: impl Into<String>, risk: f64) -> Self {
        Self {
            id: id.into(),
            risk,
        }
    }

    /// Checks the identifier and applies `policy` to the score.
    ///
    /// Returns the record unchanged when the score is in range, or the
    /// clamped record under [`RiskPolicy::Clamp`].
    ///
    /// # Errors
    ///
    /// - [`RecordError::MalformedRecord`] if `id` is empty.
    /// - [`RecordError::InvalidRiskScore`] if the score is non-finite, or out
    ///   of range under [`RiskPolicy::Reject`].
    pub fn validate(self, index: usize, policy: RiskPolicy) -> Result<Self, RecordError> {
        if self.id.is_empty() {
            return Err(RecordError::malformed(RecordKind::Risk, index, "id"));
        }
        policy.apply(index, self)
    }
}

// ---------------------------------------------------------------------------
// Raw (loosely typed) records
// ---------------------------------------------------------------------------

/// Transfer record as read from an untyped source. Every field is optional.
///
/// Accepts `from`/`source`, `to`/`target`, `weight`/`amount` and
/// `label`/`transaction_id` spellings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawEdgeRecord {
    #[serde(default, alias = "source")]
    pub from: Option<String>,
    #[serde(default, alias = "target")]
    pub to: Option<String>,
    #[serde(default, alias = "amount")]
    pub weight: Option<f64>,
    #[serde(default, alias = "transaction_id")]
    pub label: Option<String>,
}

impl RawEdgeRecord {
    /// Converts into a checked [`EdgeRecord`].
    ///
    /// # Errors
    ///
    /// [`RecordError::MalformedRecord`] naming the first missing field.
    pub fn into_record(self, index: usize) -> Result<EdgeRecord, RecordError> {
        let from = self
            .from
            .ok_or_else(|| RecordError::malformed(RecordKind::Edge, index, "from"))?;
        let to = self
            .to
            .ok_or_else(|| RecordError::malformed(RecordKind::Edge, index, "to"))?;
        let weight = self
            .weight
            .ok_or_else(|| RecordError::malformed(RecordKind::Edge, index, "weight"))?;
        let record = EdgeRecord {
            from,
            to,
            weight,
            label: self.label,
        };
        record.validate(index)?;
        Ok(record)
    }
}

/// Risk record as read from an untyped source.
///
/// Accepts `id`/`account_id` and `risk`/`risk_score` spellings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawRiskRecord {
    #[serde(default, alias = "account_id")]
    pub id: Option<String>,
    #[serde(default, alias = "risk_score")]
    pub risk: Option<f64>,
}

impl RawRiskRecord {
    /// Converts into a checked [`RiskRecord`], applying `policy`.
    ///
    /// # Errors
    ///
    /// As [`RiskRecord::validate`], plus [`RecordError::MalformedRecord`]
    /// when a field is absent.
    pub fn into_record(self, index: usize, policy: RiskPolicy) -> Result<RiskRecord, RecordError> {
        let id = self
            .id
            .ok_or_else(|| RecordError::malformed(RecordKind::Risk, index, "id"))?;
        let risk = self
            .risk
            .ok_or_else(|| RecordError::malformed(RecordKind::Risk, index, "risk"))?;
        RiskRecord { id, risk }.validate(index, policy)
    }
}

/// Converts a stream of raw transfer records, failing on the first bad one.
///
/// # Errors
///
/// The first [`RecordError`] encountered; no partial result is returned.
pub fn convert_edges<I>(raw: I) -> Result<Vec<EdgeRecord>, RecordError>
where
    I: IntoIterator<Item = RawEdgeRecord>,
{
    raw.into_iter()
        .enumerate()
        .map(|(index, r)| r.into_record(index))
        .collect()
}

/// Converts a stream of raw risk records, failing on the first bad one.
///
/// # Errors
///
/// The first [`RecordError`] encountered; no partial result is returned.
pub fn convert_risks<I>(raw: I, policy: RiskPolicy) -> Result<Vec<RiskRecord>, RecordError>
where
    I: IntoIterator<Item = RawRiskRecord>,
{
    raw.into_iter()
        .enumerate()
        .map(|(index, r)| r.into_record(index, policy))
        .collect()
}

// ---------------------------------------------------------------------------
// RiskPolicy
// ---------------------------------------------------------------------------

/// What to do with a finite risk score outside `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskPolicy {
    /// Fail with [`RecordError::InvalidRiskScore`].
    #[default]
    Reject,
    /// Clamp into range and log a warning.
    Clamp,
}

impl RiskPolicy {
    /// Applies the policy to the record at zero-based position `index`.
    ///
    /// # Errors
    ///
    /// [`RecordError::InvalidRiskScore`] for non-finite scores, and for
    /// out-of-range scores under [`RiskPolicy::Reject`].
    pub fn apply(self, index: usize, mut record: RiskRecord) -> Result<RiskRecord, RecordError> {
        if !record.risk.is_finite() {
            return Err(RecordError::InvalidRiskScore {
                index,
                id: record.id,
                value: record.risk,
            });
        }
        if (0.0..=1.0).contains(&record.risk) {
            return Ok(record);
        }
        match self {
            RiskPolicy::Reject => Err(RecordError::InvalidRiskScore {
                index,
                id: record.id,
                value: record.risk,
            }),
            RiskPolicy::Clamp => {
                let clamped = record.risk.clamp(0.0, 1.0);
                warn!(
                    account = %record.id,
                    original = record.risk,
                    clamped,
                    "risk score out of range, clamping"
                );
                record.risk = clamped;
                Ok(record)
            }
        }
    }
}

impl fmt::Display for RiskPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskPolicy::Reject => f.write_str("reject"),
            RiskPolicy::Clamp => f.write_str("clamp"),
        }
    }
}

// ---------------------------------------------------------------------------
// RecordError
// ---------------------------------------------------------------------------

/// Which input stream a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// A transfer record.
    Edge,
    /// An account risk record.
    Risk,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Edge => f.write_str("transfer"),
            RecordKind::Risk => f.write_str("account"),
        }
    }
}

/// Errors raised while checking input records.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordError {
    /// A required field is absent or empty.
    MalformedRecord {
        /// Stream the record belongs to.
        kind: RecordKind,
        /// Zero-based position in that stream.
        index: usize,
        /// Name of the offending field.
        field: &'static str,
    },
    /// A risk score is non-finite or outside `[0.0, 1.0]`.
    InvalidRiskScore {
        /// Zero-based position in the risk stream.
        index: usize,
        /// Account the score belongs to.
        id: String,
        /// The rejected value.
        value: f64,
    },
}

impl RecordError {
    fn malformed(kind: RecordKind, index: usize, field: &'static str) -> Self {
        RecordError::MalformedRecord { kind, index, field }
    }
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordError::MalformedRecord { kind, index, field } => {
                write!(f, "{kind} record #{index} is missing required field {field:?}")
            }
            RecordError::InvalidRiskScore { index, id, value } => {
                write!(
                    f,
                    "account record #{index} ({id:?}) has risk score {value}, expected a value in [0, 1]"
                )
            }
        }
    }
}

impl std::error::Error for RecordError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
