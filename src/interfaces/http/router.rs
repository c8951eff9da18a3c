//! API Router with Swagger UI

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::FromRef,
    middleware,
    routing::{get, patch, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::application::AuthService;
use crate::domain::{RepositoryProvider, UserRepositoryInterface, UserRole};
use crate::infrastructure::crypto::jwt::JwtConfig;
use crate::infrastructure::database::repositories::user_repository::UserRepository;
use crate::infrastructure::database::repositories::SeaOrmRepositoryProvider;
use crate::interfaces::http::common::RepoState;
use crate::interfaces::http::middleware::{auth_middleware, require_roles, AuthState};
use crate::interfaces::http::modules::{
    admissions, appointments, auth, billing, health, insurance, medications, metrics, patients,
    prescriptions, request_id, settings, users,
};

static ADMIN: &[UserRole] = &[UserRole::Admin];
static WARD_STAFF: &[UserRole] = &[
    UserRole::Admin,
    UserRole::Doctor,
    UserRole::Nurse,
    UserRole::Frontdesk,
];
static PRESCRIBERS: &[UserRole] = &[UserRole::Admin, UserRole::Doctor];
static DISPENSERS: &[UserRole] = &[UserRole::Admin, UserRole::Doctor, UserRole::Pharmacy];
static BILLING: &[UserRole] = &[UserRole::Admin, UserRole::Frontdesk];
static PHARMACY_STOCK: &[UserRole] = &[UserRole::Admin, UserRole::Pharmacy];

/// Everything the HTTP layer needs, built once at startup.
///
/// Handlers keep their own narrow `State<T>` and axum projects it out of
/// this struct via `FromRef`.
#[derive(Clone)]
pub struct ApiState {
    pub auth_service: Arc<AuthService>,
    pub repos: Arc<dyn RepositoryProvider>,
    pub jwt_config: JwtConfig,
    pub db: DatabaseConnection,
    pub started_at: Arc<Instant>,
}

impl ApiState {
    pub fn new(db: DatabaseConnection, jwt_config: JwtConfig, bcrypt_cost: u32) -> Self {
        let users: Arc<dyn UserRepositoryInterface> =
            Arc::new(UserRepository::new(db.clone()));
        Self {
            auth_service: Arc::new(AuthService::new(users, jwt_config.clone(), bcrypt_cost)),
            repos: Arc::new(SeaOrmRepositoryProvider::new(db.clone())),
            jwt_config,
            db,
            started_at: Arc::new(Instant::now()),
        }
    }
}

impl FromRef<ApiState> for AuthState {
    fn from_ref(s: &ApiState) -> Self {
        AuthState {
            jwt_config: s.jwt_config.clone(),
        }
    }
}

impl FromRef<ApiState> for auth::AuthHandlerState {
    fn from_ref(s: &ApiState) -> Self {
        auth::AuthHandlerState {
            service: Arc::clone(&s.auth_service),
        }
    }
}

impl FromRef<ApiState> for RepoState {
    fn from_ref(s: &ApiState) -> Self {
        RepoState {
            repos: Arc::clone(&s.repos),
        }
    }
}

impl FromRef<ApiState> for health::HealthState {
    fn from_ref(s: &ApiState) -> Self {
        health::HealthState {
            db: s.db.clone(),
            started_at: Arc::clone(&s.started_at),
        }
    }
}

/// Security scheme modifier for OpenAPI
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT Bearer token"))
                        .build(),
                ),
            );
            components.add_security_scheme(
                "x_auth_token",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("x-auth-token"))),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health::health_check,
        // Auth
        auth::register,
        auth::login,
        auth::get_profile,
        auth::change_password,
        // Users
        users::list_users,
        users::get_user,
        users::create_user,
        users::update_user,
        users::activate_user,
        users::deactivate_user,
        users::delete_user,
        // Patients
        patients::list_patients,
        patients::search_patients,
        patients::get_patient,
        patients::get_patient_by_mrn,
        patients::create_patient,
        patients::update_patient,
        patients::delete_patient,
        // Appointments
        appointments::list_appointments,
        appointments::get_appointment,
        appointments::list_patient_appointments,
        appointments::list_doctor_appointments,
        appointments::create_appointment,
        appointments::update_appointment,
        appointments::delete_appointment,
        // Admissions
        admissions::list_admissions,
        admissions::get_admission,
        admissions::list_patient_admissions,
        admissions::admit_patient,
        admissions::discharge_patient,
        admissions::delete_admission,
        // Prescriptions
        prescriptions::list_prescriptions,
        prescriptions::get_prescription,
        prescriptions::list_patient_prescriptions,
        prescriptions::create_prescription,
        prescriptions::update_prescription_status,
        prescriptions::delete_prescription,
        // Insurance
        insurance::list_insurance_providers,
        insurance::get_insurance_provider,
        insurance::create_insurance_provider,
        insurance::update_insurance_provider,
        insurance::delete_insurance_provider,
        // Billing
        billing::list_invoices,
        billing::list_patient_invoices,
        billing::get_invoice,
        billing::create_invoice,
        billing::update_invoice,
        billing::cancel_invoice,
        billing::delete_invoice,
        billing::record_payment,
        billing::get_payment,
        billing::list_patient_payments,
        billing::update_payment_status,
        billing::create_claim,
        billing::get_claim,
        billing::list_patient_claims,
        billing::update_claim_status,
        billing::get_billing_summary,
        // Medications
        medications::list_medications,
        medications::search_medications,
        medications::get_medication,
        medications::create_medication,
        medications::update_medication,
        medications::update_medication_stock,
        medications::delete_medication,
        // Settings
        settings::list_settings,
        settings::get_setting,
        settings::upsert_setting,
        settings::delete_setting,
    ),
    components(
        schemas(
            crate::domain::patient::Gender,
            crate::domain::patient::BloodType,
            crate::domain::appointment::AppointmentStatus,
            crate::domain::prescription::PrescriptionStatus,
            crate::domain::prescription::PrescriptionItem,
            crate::domain::invoice::InvoiceStatus,
            crate::domain::invoice::ChargeType,
            crate::domain::invoice::InvoiceItem,
            crate::domain::invoice::PaymentMethod,
            crate::domain::invoice::PaymentStatus,
            crate::domain::invoice::ClaimStatus,
            crate::domain::invoice::BillingSummary,
            UserRole,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness and database readiness"),
        (name = "Authentication", description = "Registration, login (JWT), profile, password change"),
        (name = "Users", description = "Staff account administration (admin only)"),
        (name = "Patients", description = "Patient registration and demographics"),
        (name = "Appointments", description = "Appointment scheduling"),
        (name = "Admissions", description = "Ward admissions, discharge and bed charges"),
        (name = "Prescriptions", description = "Prescriptions and dispensing status"),
        (name = "Insurance", description = "Insurance provider directory"),
        (name = "Billing", description = "Invoices, payments, insurance claims and patient balances"),
        (name = "Medications", description = "Pharmacy catalog and stock levels"),
        (name = "Settings", description = "Key/value system settings"),
    ),
    info(
        title = "Hospital Management Service API",
        version = "1.0.0",
        description = "REST API for patient, appointment, admission, pharmacy and billing workflows",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

fn auth_routes(auth_state: AuthState) -> Router<ApiState> {
    let public = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    let protected = Router::new()
        .route("/profile", get(auth::get_profile))
        .route("/change-password", post(auth::change_password))
        .route_layer(middleware::from_fn_with_state(auth_state, auth_middleware));

    public.merge(protected)
}

fn user_routes() -> Router<ApiState> {
    Router::new()
        .route("/", get(users::list_users).post(users::create_user))
        .route(
            "/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route("/{id}/activate", post(users::activate_user))
        .route("/{id}/deactivate", post(users::deactivate_user))
        .route_layer(middleware::from_fn_with_state(ADMIN, require_roles))
}

fn patient_routes() -> Router<ApiState> {
    Router::new()
        .route(
            "/",
            get(patients::list_patients).post(patients::create_patient),
        )
        .route("/search", get(patients::search_patients))
        .route("/mrn/{mrn}", get(patients::get_patient_by_mrn))
        .route(
            "/{id}",
            get(patients::get_patient)
                .put(patients::update_patient)
                .delete(patients::delete_patient),
        )
        .route("/{id}/billing-summary", get(billing::get_billing_summary))
}

fn appointment_routes() -> Router<ApiState> {
    Router::new()
        .route(
            "/",
            get(appointments::list_appointments).post(appointments::create_appointment),
        )
        .route(
            "/patient/{patient_id}",
            get(appointments::list_patient_appointments),
        )
        .route(
            "/doctor/{doctor_id}",
            get(appointments::list_doctor_appointments),
        )
        .route(
            "/{id}",
            get(appointments::get_appointment)
                .put(appointments::update_appointment)
                .delete(appointments::delete_appointment),
        )
}

fn admission_routes() -> Router<ApiState> {
    Router::new()
        .route(
            "/",
            get(admissions::list_admissions).post(admissions::admit_patient),
        )
        .route(
            "/patient/{patient_id}",
            get(admissions::list_patient_admissions),
        )
        .route(
            "/{id}",
            get(admissions::get_admission).delete(admissions::delete_admission),
        )
        .route("/{id}/discharge", post(admissions::discharge_patient))
        .route_layer(middleware::from_fn_with_state(WARD_STAFF, require_roles))
}

fn prescription_routes() -> Router<ApiState> {
    let reads = Router::new()
        .route("/", get(prescriptions::list_prescriptions))
        .route(
            "/patient/{patient_id}",
            get(prescriptions::list_patient_prescriptions),
        )
        .route("/{id}", get(prescriptions::get_prescription));

    let writes = Router::new()
        .route("/", post(prescriptions::create_prescription))
        .route(
            "/{id}",
            axum::routing::delete(prescriptions::delete_prescription),
        )
        .route_layer(middleware::from_fn_with_state(PRESCRIBERS, require_roles));

    let status = Router::new()
        .route(
            "/{id}/status",
            patch(prescriptions::update_prescription_status),
        )
        .route_layer(middleware::from_fn_with_state(DISPENSERS, require_roles));

    reads.merge(writes).merge(status)
}

fn insurance_routes() -> Router<ApiState> {
    let reads = Router::new()
        .route("/", get(insurance::list_insurance_providers))
        .route("/{id}", get(insurance::get_insurance_provider));

    let writes = Router::new()
        .route("/", post(insurance::create_insurance_provider))
        .route(
            "/{id}",
            axum::routing::put(insurance::update_insurance_provider)
                .delete(insurance::delete_insurance_provider),
        )
        .route_layer(middleware::from_fn_with_state(ADMIN, require_roles));

    reads.merge(writes)
}

fn invoice_routes() -> Router<ApiState> {
    let reads = Router::new()
        .route("/", get(billing::list_invoices))
        .route("/patient/{patient_id}", get(billing::list_patient_invoices))
        .route("/{id}", get(billing::get_invoice));

    let writes = Router::new()
        .route("/", post(billing::create_invoice))
        .route("/{id}", axum::routing::put(billing::update_invoice))
        .route("/{id}/cancel", post(billing::cancel_invoice))
        .route_layer(middleware::from_fn_with_state(BILLING, require_roles));

    let removal = Router::new()
        .route("/{id}", axum::routing::delete(billing::delete_invoice))
        .route_layer(middleware::from_fn_with_state(ADMIN, require_roles));

    reads.merge(writes).merge(removal)
}

fn payment_routes() -> Router<ApiState> {
    let reads = Router::new()
        .route("/patient/{patient_id}", get(billing::list_patient_payments))
        .route("/{id}", get(billing::get_payment));

    let writes = Router::new()
        .route("/", post(billing::record_payment))
        .route("/{id}/status", axum::routing::put(billing::update_payment_status))
        .route_layer(middleware::from_fn_with_state(BILLING, require_roles));

    reads.merge(writes)
}

fn claim_routes() -> Router<ApiState> {
    let reads = Router::new()
        .route("/patient/{patient_id}", get(billing::list_patient_claims))
        .route("/{id}", get(billing::get_claim));

    let writes = Router::new()
        .route("/", post(billing::create_claim))
        .route("/{id}/status", axum::routing::put(billing::update_claim_status))
        .route_layer(middleware::from_fn_with_state(BILLING, require_roles));

    reads.merge(writes)
}

fn medication_routes() -> Router<ApiState> {
    let reads = Router::new()
        .route("/", get(medications::list_medications))
        .route("/search", get(medications::search_medications))
        .route("/{id}", get(medications::get_medication));

    let writes = Router::new()
        .route("/", post(medications::create_medication))
        .route(
            "/{id}",
            axum::routing::put(medications::update_medication)
                .delete(medications::delete_medication),
        )
        .route("/{id}/stock", patch(medications::update_medication_stock))
        .route_layer(middleware::from_fn_with_state(PHARMACY_STOCK, require_roles));

    reads.merge(writes)
}

fn setting_routes() -> Router<ApiState> {
    let reads = Router::new()
        .route("/", get(settings::list_settings))
        .route("/{key}", get(settings::get_setting));

    let writes = Router::new()
        .route(
            "/{key}",
            axum::routing::put(settings::upsert_setting).delete(settings::delete_setting),
        )
        .route_layer(middleware::from_fn_with_state(ADMIN, require_roles));

    reads.merge(writes)
}

/// Create the API router with all routes.
///
/// `metrics` mounts `GET /metrics` when a Prometheus recorder is installed.
pub fn create_api_router(state: ApiState, metrics: Option<PrometheusHandle>) -> Router {
    let auth_state = AuthState::from_ref(&state);

    let protected = Router::new()
        .nest("/users", user_routes())
        .nest("/patients", patient_routes())
        .nest("/appointments", appointment_routes())
        .nest("/admissions", admission_routes())
        .nest("/prescriptions", prescription_routes())
        .nest("/insurance", insurance_routes())
        .nest("/invoices", invoice_routes())
        .nest("/payments", payment_routes())
        .nest("/insurance-claims", claim_routes())
        .nest("/medications", medication_routes())
        .nest("/settings", setting_routes())
        .route_layer(middleware::from_fn_with_state(
            auth_state.clone(),
            auth_middleware,
        ));

    let api = Router::new()
        .nest("/auth", auth_routes(auth_state))
        .merge(protected);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut router = Router::new()
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .route("/health", get(health::health_check))
        .nest("/api", api)
        .with_state(state);

    if let Some(handle) = metrics {
        router = router.merge(
            Router::new()
                .route("/metrics", get(metrics::prometheus_metrics))
                .with_state(metrics::MetricsState { handle }),
        );
    }

    router
        .layer(middleware::from_fn(metrics::http_metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id::request_id_middleware))
        .layer(cors)
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::application::NewAccount;
    use crate::infrastructure::crypto::jwt::{create_token, verify_token};
    use crate::infrastructure::database::test_database;

    fn jwt() -> JwtConfig {
        JwtConfig {
            secret: "router-test-secret".into(),
            expiration_hours: 1,
            issuer: "hmis-test".into(),
        }
    }

    async fn app() -> (Router, ApiState) {
        let state = ApiState::new(test_database().await, jwt(), 4);
        (create_api_router(state.clone(), None), state)
    }

    fn token_for(user_id: &str, role: UserRole) -> String {
        create_token(user_id, role.as_str(), role, &jwt()).unwrap()
    }

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn login(username: &str, password: &str) -> Option<Value> {
        Some(json!({"username": username, "password": password}))
    }

    #[tokio::test]
    async fn alice_registers_logs_in_and_rotates_her_password() {
        let (app, _) = app().await;

        let (status, body) = send(
            &app,
            "POST",
            "/api/auth/register",
            None,
            Some(json!({
                "username": "alice",
                "email": "alice@hospital.test",
                "password": "first-Passw0rd",
                "first_name": "Alice",
                "last_name": "Nightingale",
                "role": "nurse"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["user"]["role"], "nurse");
        assert!(body["data"]["user"].get("password_hash").is_none());
        let token = body["data"]["token"].as_str().unwrap();
        assert_eq!(verify_token(token, &jwt()).unwrap().role, UserRole::Nurse);

        let (status, body) = send(
            &app,
            "POST",
            "/api/auth/register",
            None,
            Some(json!({
                "username": "alice",
                "email": "other@hospital.test",
                "password": "whatever-1",
                "first_name": "A",
                "last_name": "B",
                "role": "nurse"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Username already exists");

        let (status, _) = send(&app, "POST", "/api/auth/login", None, login("alice", "nope")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) =
            send(&app, "POST", "/api/auth/login", None, login("alice", "first-Passw0rd")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(!body["data"]["user"]["last_login"].is_null());
        let token = body["data"]["token"].as_str().unwrap().to_string();

        let (status, body) = send(&app, "GET", "/api/auth/profile", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["username"], "alice");

        let (status, _) = send(
            &app,
            "POST",
            "/api/auth/change-password",
            Some(&token),
            Some(json!({"current_password": "first-Passw0rd", "new_password": "second-Passw0rd"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) =
            send(&app, "POST", "/api/auth/login", None, login("alice", "first-Passw0rd")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) =
            send(&app, "POST", "/api/auth/login", None, login("alice", "second-Passw0rd")).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn login_with_missing_fields_is_a_bad_request() {
        let (app, _) = app().await;
        let (status, body) =
            send(&app, "POST", "/api/auth/login", None, Some(json!({"username": "alice"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn protected_routes_require_a_token_and_the_right_role() {
        let (app, _) = app().await;

        let (status, body) = send(&app, "GET", "/api/patients", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "No token, authorization denied");

        let nurse = token_for("u-nurse", UserRole::Nurse);
        let (status, _) = send(&app, "GET", "/api/patients", Some(&nurse), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(&app, "GET", "/api/users", Some(&nurse), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let admin = token_for("u-admin", UserRole::Admin);
        let (status, body) = send(&app, "GET", "/api/users", Some(&admin), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 0);

        let pharmacist = token_for("u-pharm", UserRole::Pharmacy);
        let (status, _) = send(&app, "GET", "/api/admissions", Some(&pharmacist), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn patient_admission_and_discharge() {
        let (app, _) = app().await;
        let frontdesk = token_for("u-front", UserRole::Frontdesk);
        let patient = json!({
            "mrn": "MRN-100",
            "first_name": "John",
            "last_name": "Doe",
            "date_of_birth": "1970-06-15",
            "gender": "male",
            "blood_type": "O+"
        });

        let (status, body) =
            send(&app, "POST", "/api/patients", Some(&frontdesk), Some(patient.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        let patient_id = body["data"]["id"].as_str().unwrap().to_string();

        let (status, body) =
            send(&app, "POST", "/api/patients", Some(&frontdesk), Some(patient)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Patient with this mrn already exists");

        let (status, body) =
            send(&app, "GET", "/api/patients/mrn/MRN-100", Some(&frontdesk), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["id"], patient_id.as_str());

        let (status, body) =
            send(&app, "GET", "/api/patients/search?q=doe", Some(&frontdesk), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 1);

        let admit = json!({
            "patient_id": patient_id,
            "ward": "General",
            "bed": "G-7",
            "daily_bed_rate": 12000
        });
        let (status, body) =
            send(&app, "POST", "/api/admissions", Some(&frontdesk), Some(admit.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["is_active"], true);
        assert_eq!(body["data"]["bed_charge"], 12000);
        let admission_id = body["data"]["id"].as_str().unwrap().to_string();

        let (status, _) =
            send(&app, "POST", "/api/admissions", Some(&frontdesk), Some(admit)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let discharge = format!("/api/admissions/{}/discharge", admission_id);
        let (status, body) = send(&app, "POST", &discharge, Some(&frontdesk), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["is_active"], false);

        let (status, body) = send(&app, "POST", &discharge, Some(&frontdesk), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Patient is already discharged");

        let (status, _) = send(
            &app,
            "GET",
            "/api/admissions/missing-id",
            Some(&frontdesk),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn prescriptions_are_issued_by_doctors_and_dispensed_by_pharmacy() {
        let (app, state) = app().await;
        let doctor = state
            .auth_service
            .create_user(NewAccount {
                username: "drhouse".into(),
                email: "house@hospital.test".into(),
                password: "vicodin-123".into(),
                first_name: "Gregory".into(),
                last_name: "House".into(),
                role: "doctor".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        let doctor_token = token_for(&doctor.id, UserRole::Doctor);
        let nurse = token_for("u-nurse", UserRole::Nurse);
        let pharmacist = token_for("u-pharm", UserRole::Pharmacy);

        let (_, body) = send(
            &app,
            "POST",
            "/api/patients",
            Some(&nurse),
            Some(json!({
                "mrn": "MRN-200",
                "first_name": "Jane",
                "last_name": "Roe",
                "date_of_birth": "1988-01-20",
                "gender": "female"
            })),
        )
        .await;
        let patient_id = body["data"]["id"].as_str().unwrap().to_string();

        let order = json!({
            "patient_id": patient_id,
            "items": [{
                "medication": "Amoxicillin",
                "dosage": "500mg",
                "frequency": "3x daily",
                "duration": "7 days",
                "quantity": 21
            }]
        });

        let (status, _) =
            send(&app, "POST", "/api/prescriptions", Some(&nurse), Some(order.clone())).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = send(
            &app,
            "POST",
            "/api/prescriptions",
            Some(&doctor_token),
            Some(json!({"patient_id": patient_id, "items": []})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "At least one item is required");

        let (status, body) =
            send(&app, "POST", "/api/prescriptions", Some(&doctor_token), Some(order)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["status"], "pending");
        assert_eq!(body["data"]["doctor_id"], doctor.id.as_str());
        let status_uri = format!("/api/prescriptions/{}/status", body["data"]["id"].as_str().unwrap());

        let (status, body) = send(
            &app,
            "PATCH",
            &status_uri,
            Some(&pharmacist),
            Some(json!({"status": "dispensed"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "dispensed");

        let (status, _) = send(
            &app,
            "PATCH",
            &status_uri,
            Some(&pharmacist),
            Some(json!({"status": "pending"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(&app, "GET", "/api/prescriptions", Some(&nurse), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 1);
    }

    #[tokio::test]
    async fn frontdesk_bills_a_patient_and_settles_the_invoice() {
        let (app, _) = app().await;
        let frontdesk = token_for("u-desk", UserRole::Frontdesk);
        let nurse = token_for("u-nurse", UserRole::Nurse);

        let (_, body) = send(
            &app,
            "POST",
            "/api/patients",
            Some(&frontdesk),
            Some(json!({
                "mrn": "MRN-300",
                "first_name": "Amina",
                "last_name": "Otieno",
                "date_of_birth": "1979-11-02",
                "gender": "female"
            })),
        )
        .await;
        let patient_id = body["data"]["id"].as_str().unwrap().to_string();

        let invoice = json!({
            "patient_id": patient_id,
            "items": [{
                "item_type": "consultation",
                "description": "Specialist consultation",
                "quantity": 2,
                "unit_price": 1500
            }]
        });

        let (status, _) =
            send(&app, "POST", "/api/invoices", Some(&nurse), Some(invoice.clone())).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = send(
            &app,
            "POST",
            "/api/invoices",
            Some(&frontdesk),
            Some(json!({
                "patient_id": "no-such-patient",
                "items": invoice["items"].clone()
            })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) =
            send(&app, "POST", "/api/invoices", Some(&frontdesk), Some(invoice)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["subtotal"], 3000);
        assert_eq!(body["data"]["tax_amount"], 480);
        assert_eq!(body["data"]["total_amount"], 3480);
        assert_eq!(body["data"]["status"], "unpaid");
        assert!(body["data"]["invoice_number"]
            .as_str()
            .unwrap()
            .starts_with("INV-"));
        let invoice_id = body["data"]["id"].as_str().unwrap().to_string();
        let invoice_uri = format!("/api/invoices/{}", invoice_id);

        let payment = |amount: i64| {
            Some(json!({
                "patient_id": patient_id,
                "invoice_id": invoice_id,
                "amount": amount,
                "method": "mpesa",
                "transaction_id": "QK7TX91"
            }))
        };

        let (status, _) = send(&app, "POST", "/api/payments", Some(&frontdesk), payment(1000)).await;
        assert_eq!(status, StatusCode::CREATED);
        let (_, body) = send(&app, "GET", &invoice_uri, Some(&nurse), None).await;
        assert_eq!(body["data"]["status"], "partial");
        assert_eq!(body["data"]["outstanding_amount"], 2480);

        let (status, body) =
            send(&app, "POST", "/api/payments", Some(&frontdesk), payment(5000)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"],
            "Payment exceeds the outstanding balance of 2480"
        );

        let (status, _) = send(&app, "POST", "/api/payments", Some(&frontdesk), payment(2480)).await;
        assert_eq!(status, StatusCode::CREATED);
        let (_, body) = send(&app, "GET", &invoice_uri, Some(&nurse), None).await;
        assert_eq!(body["data"]["status"], "paid");

        let (status, _) = send(
            &app,
            "POST",
            &format!("{}/cancel", invoice_uri),
            Some(&frontdesk),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, "DELETE", &invoice_uri, Some(&frontdesk), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = send(
            &app,
            "GET",
            &format!("/api/patients/{}/billing-summary", patient_id),
            Some(&nurse),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["total_billed"], 3480);
        assert_eq!(body["data"]["total_paid"], 3480);
        assert_eq!(body["data"]["total_outstanding"], 0);
        assert_eq!(body["data"]["paid_invoices"], 1);

        let (_, body) = send(
            &app,
            "GET",
            &format!("/api/payments/patient/{}", patient_id),
            Some(&nurse),
            None,
        )
        .await;
        assert_eq!(body["data"].as_array().unwrap().len(), 2);

        let (status, _) = send(
            &app,
            "DELETE",
            &format!("/api/patients/{}", patient_id),
            Some(&frontdesk),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn pharmacy_keeps_the_medication_catalog_stocked() {
        let (app, _) = app().await;
        let pharmacist = token_for("u-pharm", UserRole::Pharmacy);
        let nurse = token_for("u-nurse", UserRole::Nurse);

        let amoxicillin = json!({
            "name": "Amoxicillin",
            "form": "Capsule",
            "strength": "500mg",
            "stock_quantity": 12,
            "unit_price": 1200
        });

        let (status, _) = send(
            &app,
            "POST",
            "/api/medications",
            Some(&nurse),
            Some(amoxicillin.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = send(
            &app,
            "POST",
            "/api/medications",
            Some(&pharmacist),
            Some(amoxicillin.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["low_stock"], false);
        let stock_uri = format!("/api/medications/{}/stock", body["data"]["id"].as_str().unwrap());

        let (status, body) = send(
            &app,
            "POST",
            "/api/medications",
            Some(&pharmacist),
            Some(amoxicillin),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Medication with this name already exists");

        let (status, body) = send(
            &app,
            "PATCH",
            &stock_uri,
            Some(&pharmacist),
            Some(json!({"adjustment": -20})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Insufficient stock: 12 available");

        let (status, body) = send(
            &app,
            "PATCH",
            &stock_uri,
            Some(&pharmacist),
            Some(json!({"adjustment": -5})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["stock_quantity"], 7);
        assert_eq!(body["data"]["low_stock"], true);

        let (status, _) = send(
            &app,
            "PATCH",
            &stock_uri,
            Some(&pharmacist),
            Some(json!({"adjustment": 5, "stock_quantity": 40})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) =
            send(&app, "GET", "/api/medications?low_stock=true", Some(&nurse), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 1);

        let (status, _) = send(&app, "GET", "/api/medications/search", Some(&nurse), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn settings_are_read_by_all_and_written_by_admins() {
        let (app, _) = app().await;
        let admin = token_for("u-admin", UserRole::Admin);
        let lab = token_for("u-lab", UserRole::Lab);
        let value = Some(json!({"value": "St. Elsewhere", "description": "Display name"}));

        let (status, _) =
            send(&app, "PUT", "/api/settings/hospital.name", Some(&lab), value.clone()).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) =
            send(&app, "PUT", "/api/settings/hospital.name", Some(&admin), value).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) =
            send(&app, "GET", "/api/settings/hospital.name", Some(&lab), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["value"], "St. Elsewhere");
    }

    #[tokio::test]
    async fn public_endpoints_need_no_token() {
        let (app, _) = app().await;

        let (status, body) = send(&app, "GET", "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");

        let (status, body) = send(&app, "GET", "/api-doc/openapi.json", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"].get("/api/patients/{id}").is_some());
    }
}
