//! API Routes
//!
//! HTTP endpoint definitions.

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Amount, Beneficiary, DynamicRate, Guardian, PaymentError};
use crate::error::AppError;
use crate::handlers::{PaymentCommand, PaymentHandler};
use crate::store::{BeneficiaryStore, GuardianStore, LedgerStatus, LedgerStore};

use super::response::BaseResponse;

/// Shared application state
#[derive(Debug, Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub rate: DynamicRate,
}

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub guardian_id: Uuid,
    pub beneficiary_id: Uuid,
    pub amount: Decimal,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuardianResponse {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub balance: Decimal,
}

impl From<Guardian> for GuardianResponse {
    fn from(g: Guardian) -> Self {
        Self {
            id: g.id,
            first_name: g.first_name,
            last_name: g.last_name,
            balance: g.balance.value(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BeneficiaryResponse {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub balance: Decimal,
}

impl From<Beneficiary> for BeneficiaryResponse {
    fn from(b: Beneficiary) -> Self {
        Self {
            id: b.id,
            first_name: b.first_name,
            last_name: b.last_name,
            balance: b.balance.value(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntryResponse {
    pub id: i64,
    pub guardian_id: Uuid,
    pub beneficiary_id: Uuid,
    pub amount: Decimal,
    pub recorded_at: DateTime<Utc>,
    pub status: LedgerStatus,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RateBody {
    pub rate: Decimal,
}

// =========================================================================
// API Router
// =========================================================================

/// Create the API router
pub fn create_router() -> Router<AppState> {
    Router::new()
        // Transfers
        .route("/payments", post(make_payment))
        .route("/payments/ledger", get(get_ledger))
        // Read-only account retrieval
        .route("/guardians", get(list_guardians))
        .route("/guardians/:guardian_id", get(get_guardian))
        .route("/beneficiaries", get(list_beneficiaries))
        .route("/beneficiaries/:beneficiary_id", get(get_beneficiary))
        // Rate administration
        .route("/config/rate", get(get_rate).put(update_rate))
}

// =========================================================================
// Payments
// =========================================================================

/// The messages and payloads existing clients depend on. Entity naming
/// predates the guardian/beneficiary vocabulary and is kept verbatim for
/// wire compatibility.
pub fn payment_error_response(err: PaymentError) -> BaseResponse {
    match err {
        PaymentError::AccountNotFound => {
            BaseResponse::failure("student or parent not found", Value::Null)
        }
        PaymentError::LinkageMissing => {
            BaseResponse::failure("Parent is not linked to this student", Value::Null)
        }
        PaymentError::InsufficientBalance { required } => {
            BaseResponse::failure("Insufficient balance", required)
        }
        PaymentError::InsufficientGroupBalance { guardians } => BaseResponse::failure(
            "One or more parents do not have sufficient amount",
            guardians,
        ),
        PaymentError::Internal(detail) => BaseResponse::failure("error", detail),
    }
}

async fn make_payment(
    State(state): State<AppState>,
    Json(request): Json<PaymentRequest>,
) -> BaseResponse {
    let amount = match Amount::new(request.amount) {
        Ok(amount) => amount,
        Err(e) => return BaseResponse::failure("error", e.to_string()),
    };

    let handler = PaymentHandler::new(state.pool, state.rate);
    let command = PaymentCommand::new(request.guardian_id, request.beneficiary_id, amount);

    match handler.execute(command).await {
        Ok(receipt) => BaseResponse::success("Payment processed", receipt),
        Err(err) => payment_error_response(err),
    }
}

async fn get_ledger(State(state): State<AppState>) -> Result<BaseResponse, AppError> {
    let records = LedgerStore::new(state.pool).list().await?;

    let entries: Vec<LedgerEntryResponse> = records
        .into_iter()
        .map(|r| LedgerEntryResponse {
            id: r.id,
            guardian_id: r.guardian_id,
            beneficiary_id: r.beneficiary_id,
            amount: r.amount,
            recorded_at: r.recorded_at,
            status: r.status,
        })
        .collect();

    Ok(BaseResponse::success("success", entries))
}

// =========================================================================
// Guardians / Beneficiaries (read-only)
// =========================================================================

async fn list_guardians(State(state): State<AppState>) -> Result<BaseResponse, AppError> {
    let guardians = GuardianStore::new(state.pool).list().await?;
    let body: Vec<GuardianResponse> = guardians.into_iter().map(Into::into).collect();
    Ok(BaseResponse::success("success", body))
}

async fn get_guardian(
    State(state): State<AppState>,
    Path(guardian_id): Path<Uuid>,
) -> Result<BaseResponse, AppError> {
    let guardian = GuardianStore::new(state.pool)
        .find_by_id(guardian_id)
        .await?
        .ok_or_else(|| AppError::NotFound(guardian_id.to_string()))?;

    Ok(BaseResponse::success(
        "success",
        GuardianResponse::from(guardian),
    ))
}

async fn list_beneficiaries(State(state): State<AppState>) -> Result<BaseResponse, AppError> {
    let beneficiaries = BeneficiaryStore::new(state.pool).list().await?;
    let body: Vec<BeneficiaryResponse> = beneficiaries.into_iter().map(Into::into).collect();
    Ok(BaseResponse::success("success", body))
}

async fn get_beneficiary(
    State(state): State<AppState>,
    Path(beneficiary_id): Path<Uuid>,
) -> Result<BaseResponse, AppError> {
    let beneficiary = BeneficiaryStore::new(state.pool)
        .find_by_id(beneficiary_id)
        .await?
        .ok_or_else(|| AppError::NotFound(beneficiary_id.to_string()))?;

    Ok(BaseResponse::success(
        "success",
        BeneficiaryResponse::from(beneficiary),
    ))
}

// =========================================================================
// Rate administration
// =========================================================================

async fn get_rate(State(state): State<AppState>) -> BaseResponse {
    BaseResponse::success(
        "success",
        RateBody {
            rate: state.rate.current(),
        },
    )
}

async fn update_rate(
    State(state): State<AppState>,
    Json(body): Json<RateBody>,
) -> Result<BaseResponse, AppError> {
    if body.rate < Decimal::ZERO {
        return Err(AppError::InvalidRequest(
            "rate must not be negative".to_string(),
        ));
    }

    state.rate.set(body.rate);
    tracing::info!(rate = %body.rate, "Dynamic rate updated");

    Ok(BaseResponse::success("success", RateBody { rate: body.rate }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_payment_error_messages_match_contract() {
        let resp = payment_error_response(PaymentError::AccountNotFound);
        assert_eq!(resp.status, 400);
        assert_eq!(resp.message, "student or parent not found");
        assert_eq!(resp.data, Value::Null);

        let resp = payment_error_response(PaymentError::LinkageMissing);
        assert_eq!(resp.message, "Parent is not linked to this student");
        assert_eq!(resp.data, Value::Null);

        let resp = payment_error_response(PaymentError::InsufficientBalance {
            required: dec!(2100.00),
        });
        assert_eq!(resp.message, "Insufficient balance");
        assert_eq!(resp.data, serde_json::to_value(dec!(2100.00)).unwrap());

        let guardian = Uuid::new_v4();
        let resp = payment_error_response(PaymentError::InsufficientGroupBalance {
            guardians: vec![guardian],
        });
        assert_eq!(
            resp.message,
            "One or more parents do not have sufficient amount"
        );
        assert_eq!(resp.data, serde_json::to_value(vec![guardian]).unwrap());

        let resp = payment_error_response(PaymentError::Internal("boom".to_string()));
        assert_eq!(resp.message, "error");
        assert_eq!(resp.data, serde_json::json!("boom"));
    }

    #[test]
    fn test_payment_request_camel_case() {
        let json = serde_json::json!({
            "guardianId": "6f3b1b0a-3f6e-4c22-9f84-0a4b6a5a9f10",
            "beneficiaryId": "9a0f2c5d-1d8e-4a77-b1c3-7e6d5f4a3b21",
            "amount": "100.00"
        });

        let request: PaymentRequest = serde_json::from_value(json).unwrap();
        assert_eq!(request.amount, dec!(100.00));
    }
}
