//! OCOP certification DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use farmlink::{OcopDraft, OcopStatus};

use super::ProductSummaryResponse;
use crate::application::OcopView;

#[derive(Debug, Deserialize, ToSchema)]
pub struct OcopRequest {
    /// 3 to 5
    pub star: i32,
    pub certificate_number: String,
    pub issued_year: i32,
    /// Authority that issued the certificate
    pub issuer: String,
    /// Certificate scans, at least one
    #[serde(default)]
    pub images: Vec<String>,
}

impl From<OcopRequest> for OcopDraft {
    fn from(r: OcopRequest) -> Self {
        Self {
            star: r.star,
            certificate_number: r.certificate_number,
            issued_year: r.issued_year,
            issuer: r.issuer,
            images: r.images,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct OcopRejectRequest {
    pub reason: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OcopListParams {
    /// PENDING_VERIFY, VERIFIED or REJECTED
    #[param(value_type = Option<String>)]
    pub status: Option<OcopStatus>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OcopResponse {
    pub product_id: Uuid,
    pub star: i32,
    pub certificate_number: String,
    pub issued_year: i32,
    pub issuer: String,
    pub images: Vec<String>,
    #[schema(value_type = String, example = "PENDING_VERIFY")]
    pub status: OcopStatus,
    pub verified_by: Option<Uuid>,
    pub verified_at: Option<DateTime<Utc>>,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub product: Option<ProductSummaryResponse>,
}

impl From<OcopView> for OcopResponse {
    fn from(v: OcopView) -> Self {
        let o = v.ocop;
        Self {
            product_id: o.product_id,
            star: o.star,
            certificate_number: o.certificate_number,
            issued_year: o.issued_year,
            issuer: o.issuer,
            images: o.images,
            status: o.status,
            verified_by: o.verified_by,
            verified_at: o.verified_at,
            reason: o.reason,
            created_at: o.created_at,
            updated_at: o.updated_at,
            product: v.product.map(Into::into),
        }
    }
}
