use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Display;
use std::str::FromStr;

use crate::error::{AppError, AppResult};

/// Classifies why a recommendation exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "recommendation_type", rename_all = "snake_case")]
pub enum RecommendationType {
    CrossSell,
    UpSell,
    Accessory,
    Trending,
}

impl RecommendationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationType::CrossSell => "cross_sell",
            RecommendationType::UpSell => "up_sell",
            RecommendationType::Accessory => "accessory",
            RecommendationType::Trending => "trending",
        }
    }
}

impl FromStr for RecommendationType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cross_sell" => Ok(RecommendationType::CrossSell),
            "up_sell" => Ok(RecommendationType::UpSell),
            "accessory" => Ok(RecommendationType::Accessory),
            "trending" => Ok(RecommendationType::Trending),
            _ => Err(()),
        }
    }
}

impl Display for RecommendationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Moderation/lifecycle label controlling whether a recommendation is surfaced.
///
/// `Deleted` is a settable status; the delete operation itself is a hard
/// delete and never transitions a record into it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "recommendation_status", rename_all = "snake_case")]
pub enum RecommendationStatus {
    Active,
    Inactive,
    #[default]
    Draft,
    Deleted,
}

impl RecommendationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationStatus::Active => "active",
            RecommendationStatus::Inactive => "inactive",
            RecommendationStatus::Draft => "draft",
            RecommendationStatus::Deleted => "deleted",
        }
    }
}

impl FromStr for RecommendationStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(RecommendationStatus::Active),
            "inactive" => Ok(RecommendationStatus::Inactive),
            "draft" => Ok(RecommendationStatus::Draft),
            "deleted" => Ok(RecommendationStatus::Deleted),
            _ => Err(()),
        }
    }
}

impl Display for RecommendationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A stored recommendation linking a base product to a recommended product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Recommendation {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    pub base_product_id: i64,
    pub recommended_product_id: i64,
    pub recommendation_type: RecommendationType,
    #[serde(default)]
    pub status: RecommendationStatus,
    #[serde(default)]
    pub likes: i64,
    #[serde(default)]
    pub rationale: Option<String>,
    #[serde(default)]
    pub weighted_score: Option<f64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Recommendation {
    /// Adds one approval signal. No upper bound.
    pub fn increment_likes(&mut self) {
        self.likes += 1;
    }

    /// Removes one approval signal, clamped so the counter never goes
    /// negative. Decrementing at zero is a no-op.
    pub fn decrement_likes(&mut self) {
        self.likes = (self.likes - 1).max(0);
    }

    /// Takes the recommendation out of rotation.
    pub fn cancel(&mut self) {
        self.status = RecommendationStatus::Inactive;
    }

    /// Produces the plain field/value mapping used for transport.
    pub fn to_representation(&self) -> Value {
        // Serialize on a fully-owned struct cannot fail
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Inverse of [`to_representation`]. Unknown fields are ignored and
    /// missing optional fields take their defaults (status draft, likes 0).
    ///
    /// [`to_representation`]: Recommendation::to_representation
    pub fn from_representation(value: Value) -> AppResult<Self> {
        serde_json::from_value(value)
            .map_err(|e| AppError::Validation(format!("invalid recommendation: {e}")))
    }
}

/// Candidate fields for creating or fully replacing a recommendation.
///
/// Built from an untrusted request mapping via [`NewRecommendation::from_value`];
/// nothing past that boundary sees raw client input.
#[derive(Debug, Clone)]
pub struct NewRecommendation {
    pub name: Option<String>,
    pub base_product_id: i64,
    pub recommended_product_id: i64,
    pub recommendation_type: RecommendationType,
    pub status: RecommendationStatus,
    pub likes: i64,
    pub rationale: Option<String>,
    pub weighted_score: Option<f64>,
}

impl NewRecommendation {
    /// Extracts candidate fields from a JSON mapping, rejecting anything
    /// malformed with a validation error naming the offending field.
    /// Unrecognized fields are ignored.
    pub fn from_value(value: &Value) -> AppResult<Self> {
        let body = value
            .as_object()
            .ok_or_else(|| AppError::Validation("request body must be a JSON object".into()))?;

        let recommendation_type = required_str(body, "recommendation_type")?;
        let recommendation_type = recommendation_type.parse().map_err(|_| {
            AppError::Validation(format!(
                "recommendation_type must be one of cross_sell, up_sell, accessory, trending \
                 (got \"{recommendation_type}\")"
            ))
        })?;

        let status = match optional_str(body, "status")? {
            Some(raw) => raw.parse().map_err(|_| {
                AppError::Validation(format!(
                    "status must be one of active, inactive, draft, deleted (got \"{raw}\")"
                ))
            })?,
            None => RecommendationStatus::default(),
        };

        Ok(Self {
            name: optional_str(body, "name")?,
            base_product_id: required_i64(body, "base_product_id")?,
            recommended_product_id: required_i64(body, "recommended_product_id")?,
            recommendation_type,
            status,
            likes: optional_i64(body, "likes")?.unwrap_or(0),
            rationale: optional_str(body, "rationale")?,
            weighted_score: optional_f64(body, "weighted_score")?,
        })
    }

    /// Checks the semantic constraints the shape check cannot express.
    pub fn validate(&self) -> AppResult<()> {
        if self.base_product_id <= 0 {
            return Err(AppError::Validation(
                "base_product_id must be a positive integer".into(),
            ));
        }
        if self.recommended_product_id <= 0 {
            return Err(AppError::Validation(
                "recommended_product_id must be a positive integer".into(),
            ));
        }
        if self.recommended_product_id == self.base_product_id {
            return Err(AppError::Validation(
                "recommended_product_id must differ from base_product_id".into(),
            ));
        }
        if self.likes < 0 {
            return Err(AppError::Validation("likes must not be negative".into()));
        }
        Ok(())
    }
}

fn required_i64(body: &serde_json::Map<String, Value>, field: &str) -> AppResult<i64> {
    body.get(field)
        .ok_or_else(|| AppError::Validation(format!("missing required field: {field}")))?
        .as_i64()
        .ok_or_else(|| AppError::Validation(format!("{field} must be an integer")))
}

fn optional_i64(body: &serde_json::Map<String, Value>, field: &str) -> AppResult<Option<i64>> {
    match body.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_i64()
            .map(Some)
            .ok_or_else(|| AppError::Validation(format!("{field} must be an integer"))),
    }
}

fn optional_f64(body: &serde_json::Map<String, Value>, field: &str) -> AppResult<Option<f64>> {
    match body.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_f64()
            .map(Some)
            .ok_or_else(|| AppError::Validation(format!("{field} must be a number"))),
    }
}

fn required_str<'a>(body: &'a serde_json::Map<String, Value>, field: &str) -> AppResult<&'a str> {
    body.get(field)
        .ok_or_else(|| AppError::Validation(format!("missing required field: {field}")))?
        .as_str()
        .ok_or_else(|| AppError::Validation(format!("{field} must be a string")))
}

fn optional_str(
    body: &serde_json::Map<String, Value>,
    field: &str,
) -> AppResult<Option<String>> {
    match body.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_str()
            .map(|s| Some(s.to_string()))
            .ok_or_else(|| AppError::Validation(format!("{field} must be a string"))),
    }
}

/// Exact-match criteria for listing recommendations. All supplied criteria
/// combine with logical AND; absent criteria impose no constraint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecommendationFilter {
    pub base_product_id: Option<i64>,
    pub recommendation_type: Option<RecommendationType>,
    pub status: Option<RecommendationStatus>,
}

impl RecommendationFilter {
    pub fn matches(&self, rec: &Recommendation) -> bool {
        self.base_product_id
            .map_or(true, |id| rec.base_product_id == id)
            && self
                .recommendation_type
                .map_or(true, |t| rec.recommendation_type == t)
            && self.status.map_or(true, |s| rec.status == s)
    }

    pub fn is_unconstrained(&self) -> bool {
        *self == Self::default()
    }
}
