//! Billing API handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use tracing::info;

use super::dto::{
    CreateClaimRequest, CreateInvoiceRequest, InsuranceClaimDto, InvoiceDto, ListInvoicesParams,
    PaymentDto, RecordPaymentRequest, UpdateClaimStatusRequest, UpdateInvoiceRequest,
    UpdatePaymentStatusRequest,
};
use crate::domain::invoice::{BillingSummary, NewInsuranceClaim};
use crate::domain::DomainError;
use crate::interfaces::http::common::{
    ApiError, ApiResponse, ListResponse, PaginatedResponse, RepoState, ValidatedJson,
};
use crate::interfaces::http::middleware::AuthenticatedUser;
use crate::interfaces::http::modules::auth::MessageResponse;
use crate::shared::PageRequest;

async fn ensure_patient(state: &RepoState, patient_id: &str) -> Result<(), ApiError> {
    if state.repos.patients().find_by_id(patient_id).await?.is_none() {
        return Err(DomainError::not_found("Patient", "id", patient_id).into());
    }
    Ok(())
}

#[utoipa::path(
    get,
    path = "/api/invoices",
    tag = "Billing",
    security(("bearer_auth" = [])),
    params(ListInvoicesParams),
    responses(
        (status = 200, description = "Invoices, newest first", body = PaginatedResponse<InvoiceDto>)
    )
)]
pub async fn list_invoices(
    State(state): State<RepoState>,
    Query(params): Query<ListInvoicesParams>,
) -> Result<Json<PaginatedResponse<InvoiceDto>>, ApiError> {
    let page = PageRequest::new(params.limit, params.offset);
    let result = state.repos.invoices().list(params.status, page).await?;
    Ok(Json(PaginatedResponse::from_result(result)))
}

#[utoipa::path(
    get,
    path = "/api/invoices/patient/{patient_id}",
    tag = "Billing",
    security(("bearer_auth" = [])),
    params(("patient_id" = String, Path, description = "Patient ID")),
    responses(
        (status = 200, description = "The patient's invoices, newest first", body = ListResponse<InvoiceDto>),
        (status = 404, description = "Patient not found")
    )
)]
pub async fn list_patient_invoices(
    State(state): State<RepoState>,
    Path(patient_id): Path<String>,
) -> Result<Json<ListResponse<InvoiceDto>>, ApiError> {
    ensure_patient(&state, &patient_id).await?;
    let invoices = state.repos.invoices().list_for_patient(&patient_id).await?;
    Ok(Json(ListResponse::new(invoices)))
}

#[utoipa::path(
    get,
    path = "/api/invoices/{id}",
    tag = "Billing",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Invoice ID")),
    responses(
        (status = 200, description = "Invoice details", body = ApiResponse<InvoiceDto>),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_invoice(
    State(state): State<RepoState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<InvoiceDto>>, ApiError> {
    let invoice = state
        .repos
        .invoices()
        .find_by_id(&id)
        .await?
        .ok_or_else(|| DomainError::not_found("Invoice", "id", &id))?;
    Ok(Json(ApiResponse::success(invoice.into())))
}

#[utoipa::path(
    post,
    path = "/api/invoices",
    tag = "Billing",
    security(("bearer_auth" = [])),
    request_body = CreateInvoiceRequest,
    responses(
        (status = 201, description = "Invoice issued", body = ApiResponse<InvoiceDto>),
        (status = 400, description = "Validation failure"),
        (status = 403, description = "Admin or frontdesk role required"),
        (status = 404, description = "Patient not found")
    )
)]
pub async fn create_invoice(
    State(state): State<RepoState>,
    caller: AuthenticatedUser,
    ValidatedJson(request): ValidatedJson<CreateInvoiceRequest>,
) -> Result<(StatusCode, Json<ApiResponse<InvoiceDto>>), ApiError> {
    let new_invoice = request.into_new_invoice(&caller.user_id, Utc::now());
    ensure_patient(&state, &new_invoice.patient_id).await?;

    let invoice = state.repos.invoices().create(new_invoice).await?;
    info!(
        invoice_id = %invoice.id,
        invoice_number = %invoice.invoice_number,
        patient_id = %invoice.patient_id,
        total = invoice.total_amount,
        by = %caller.username,
        "Invoice issued"
    );
    Ok((StatusCode::CREATED, Json(ApiResponse::success(invoice.into()))))
}

#[utoipa::path(
    put,
    path = "/api/invoices/{id}",
    tag = "Billing",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Invoice ID")),
    request_body = UpdateInvoiceRequest,
    responses(
        (status = 200, description = "Invoice updated", body = ApiResponse<InvoiceDto>),
        (status = 400, description = "Validation failure, cancelled invoice or repricing after payment"),
        (status = 403, description = "Admin or frontdesk role required"),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_invoice(
    State(state): State<RepoState>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateInvoiceRequest>,
) -> Result<Json<ApiResponse<InvoiceDto>>, ApiError> {
    let changes = request.into_changes().map_err(ApiError::bad_request)?;
    let invoice = state
        .repos
        .invoices()
        .update(&id, changes)
        .await?
        .ok_or_else(|| DomainError::not_found("Invoice", "id", &id))?;
    Ok(Json(ApiResponse::success(invoice.into())))
}

#[utoipa::path(
    post,
    path = "/api/invoices/{id}/cancel",
    tag = "Billing",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Invoice ID")),
    responses(
        (status = 200, description = "Invoice cancelled", body = ApiResponse<InvoiceDto>),
        (status = 400, description = "Already cancelled or partly paid"),
        (status = 403, description = "Admin or frontdesk role required"),
        (status = 404, description = "Not found")
    )
)]
pub async fn cancel_invoice(
    State(state): State<RepoState>,
    caller: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<InvoiceDto>>, ApiError> {
    let invoice = state
        .repos
        .invoices()
        .cancel(&id)
        .await?
        .ok_or_else(|| DomainError::not_found("Invoice", "id", &id))?;
    info!(invoice_id = %id, by = %caller.username, "Invoice cancelled");
    Ok(Json(ApiResponse::success(invoice.into())))
}

#[utoipa::path(
    delete,
    path = "/api/invoices/{id}",
    tag = "Billing",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Invoice ID")),
    responses(
        (status = 200, description = "Invoice deleted", body = ApiResponse<MessageResponse>),
        (status = 400, description = "Invoice has payments or claims"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_invoice(
    State(state): State<RepoState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.repos.invoices().delete(&id).await?;
    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Invoice deleted successfully",
    ))))
}

#[utoipa::path(
    post,
    path = "/api/payments",
    tag = "Billing",
    security(("bearer_auth" = [])),
    request_body = RecordPaymentRequest,
    responses(
        (status = 201, description = "Payment recorded", body = ApiResponse<PaymentDto>),
        (status = 400, description = "Validation failure or amount above the outstanding balance"),
        (status = 403, description = "Admin or frontdesk role required"),
        (status = 404, description = "Patient or invoice not found")
    )
)]
pub async fn record_payment(
    State(state): State<RepoState>,
    caller: AuthenticatedUser,
    ValidatedJson(request): ValidatedJson<RecordPaymentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PaymentDto>>), ApiError> {
    let new_payment = request
        .into_new_payment(&caller.user_id, Utc::now())
        .map_err(ApiError::bad_request)?;
    ensure_patient(&state, &new_payment.patient_id).await?;

    let payment = state.repos.payments().record(new_payment).await?;
    info!(
        payment_id = %payment.id,
        reference = %payment.payment_reference,
        invoice_id = ?payment.invoice_id,
        amount = payment.amount,
        method = payment.method.as_str(),
        by = %caller.username,
        "Payment recorded"
    );
    Ok((StatusCode::CREATED, Json(ApiResponse::success(payment.into()))))
}

#[utoipa::path(
    get,
    path = "/api/payments/{id}",
    tag = "Billing",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Payment ID")),
    responses(
        (status = 200, description = "Payment details", body = ApiResponse<PaymentDto>),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_payment(
    State(state): State<RepoState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<PaymentDto>>, ApiError> {
    let payment = state
        .repos
        .payments()
        .find_by_id(&id)
        .await?
        .ok_or_else(|| DomainError::not_found("Payment", "id", &id))?;
    Ok(Json(ApiResponse::success(payment.into())))
}

#[utoipa::path(
    get,
    path = "/api/payments/patient/{patient_id}",
    tag = "Billing",
    security(("bearer_auth" = [])),
    params(("patient_id" = String, Path, description = "Patient ID")),
    responses(
        (status = 200, description = "The patient's payments, newest first", body = ListResponse<PaymentDto>),
        (status = 404, description = "Patient not found")
    )
)]
pub async fn list_patient_payments(
    State(state): State<RepoState>,
    Path(patient_id): Path<String>,
) -> Result<Json<ListResponse<PaymentDto>>, ApiError> {
    ensure_patient(&state, &patient_id).await?;
    let payments = state.repos.payments().list_for_patient(&patient_id).await?;
    Ok(Json(ListResponse::new(payments)))
}

#[utoipa::path(
    put,
    path = "/api/payments/{id}/status",
    tag = "Billing",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Payment ID")),
    request_body = UpdatePaymentStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<PaymentDto>),
        (status = 400, description = "Transition not allowed"),
        (status = 403, description = "Admin or frontdesk role required"),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_payment_status(
    State(state): State<RepoState>,
    caller: AuthenticatedUser,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdatePaymentStatusRequest>,
) -> Result<Json<ApiResponse<PaymentDto>>, ApiError> {
    let payment = state
        .repos
        .payments()
        .update_status(&id, request.status)
        .await?
        .ok_or_else(|| DomainError::not_found("Payment", "id", &id))?;
    info!(
        payment_id = %id,
        status = payment.status.as_str(),
        by = %caller.username,
        "Payment status changed"
    );
    Ok(Json(ApiResponse::success(payment.into())))
}

#[utoipa::path(
    post,
    path = "/api/insurance-claims",
    tag = "Billing",
    security(("bearer_auth" = [])),
    request_body = CreateClaimRequest,
    responses(
        (status = 201, description = "Claim submitted", body = ApiResponse<InsuranceClaimDto>),
        (status = 400, description = "Validation failure"),
        (status = 403, description = "Admin or frontdesk role required"),
        (status = 404, description = "Patient, invoice or insurance provider not found")
    )
)]
pub async fn create_claim(
    State(state): State<RepoState>,
    caller: AuthenticatedUser,
    ValidatedJson(request): ValidatedJson<CreateClaimRequest>,
) -> Result<(StatusCode, Json<ApiResponse<InsuranceClaimDto>>), ApiError> {
    let new_claim: NewInsuranceClaim = request.into();
    ensure_patient(&state, &new_claim.patient_id).await?;
    let provider_id = new_claim.insurance_provider_id.clone();
    if state
        .repos
        .insurance_providers()
        .find_by_id(&provider_id)
        .await?
        .is_none()
    {
        return Err(DomainError::not_found("Insurance provider", "id", provider_id).into());
    }

    let claim = state.repos.insurance_claims().create(new_claim).await?;
    info!(
        claim_id = %claim.id,
        claim_number = %claim.claim_number,
        patient_id = %claim.patient_id,
        amount = claim.claim_amount,
        by = %caller.username,
        "Insurance claim submitted"
    );
    Ok((StatusCode::CREATED, Json(ApiResponse::success(claim.into()))))
}

#[utoipa::path(
    get,
    path = "/api/insurance-claims/{id}",
    tag = "Billing",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Claim ID")),
    responses(
        (status = 200, description = "Claim details", body = ApiResponse<InsuranceClaimDto>),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_claim(
    State(state): State<RepoState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<InsuranceClaimDto>>, ApiError> {
    let claim = state
        .repos
        .insurance_claims()
        .find_by_id(&id)
        .await?
        .ok_or_else(|| DomainError::not_found("Insurance claim", "id", &id))?;
    Ok(Json(ApiResponse::success(claim.into())))
}

#[utoipa::path(
    get,
    path = "/api/insurance-claims/patient/{patient_id}",
    tag = "Billing",
    security(("bearer_auth" = [])),
    params(("patient_id" = String, Path, description = "Patient ID")),
    responses(
        (status = 200, description = "The patient's claims, newest first", body = ListResponse<InsuranceClaimDto>),
        (status = 404, description = "Patient not found")
    )
)]
pub async fn list_patient_claims(
    State(state): State<RepoState>,
    Path(patient_id): Path<String>,
) -> Result<Json<ListResponse<InsuranceClaimDto>>, ApiError> {
    ensure_patient(&state, &patient_id).await?;
    let claims = state
        .repos
        .insurance_claims()
        .list_for_patient(&patient_id)
        .await?;
    Ok(Json(ListResponse::new(claims)))
}

#[utoipa::path(
    put,
    path = "/api/insurance-claims/{id}/status",
    tag = "Billing",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Claim ID")),
    request_body = UpdateClaimStatusRequest,
    responses(
        (status = 200, description = "Claim decided", body = ApiResponse<InsuranceClaimDto>),
        (status = 400, description = "Transition not allowed or approved amount above the claim"),
        (status = 403, description = "Admin or frontdesk role required"),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_claim_status(
    State(state): State<RepoState>,
    caller: AuthenticatedUser,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateClaimStatusRequest>,
) -> Result<Json<ApiResponse<InsuranceClaimDto>>, ApiError> {
    let claim = state
        .repos
        .insurance_claims()
        .decide(&id, request.into())
        .await?
        .ok_or_else(|| DomainError::not_found("Insurance claim", "id", &id))?;
    info!(
        claim_id = %id,
        status = claim.status.as_str(),
        approved = ?claim.approved_amount,
        by = %caller.username,
        "Insurance claim status changed"
    );
    Ok(Json(ApiResponse::success(claim.into())))
}

#[utoipa::path(
    get,
    path = "/api/patients/{id}/billing-summary",
    tag = "Billing",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Patient ID")),
    responses(
        (status = 200, description = "Billed, paid and outstanding totals", body = ApiResponse<BillingSummary>),
        (status = 404, description = "Patient not found")
    )
)]
pub async fn get_billing_summary(
    State(state): State<RepoState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<BillingSummary>>, ApiError> {
    ensure_patient(&state, &id).await?;

    let invoices = state.repos.invoices().list_for_patient(&id).await?;
    let claims = state.repos.insurance_claims().list_for_patient(&id).await?;
    let admissions = state.repos.admissions().list_for_patient(&id).await?;

    let summary = BillingSummary::compute(&id, &invoices, &claims, &admissions, Utc::now());
    Ok(Json(ApiResponse::success(summary)))
}
