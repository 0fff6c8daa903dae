use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use chrono::{Duration, TimeZone, Utc};
use clap::{Args, Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

use firmflow::config::AppConfig;
use firmflow::error::AppError;
use firmflow::telemetry;
use firmflow::workflows::assignment::{
    assignment_router, AssignmentConfig, AssignmentOutcome, AssignmentService, AssignmentState,
    CaFirm, CaId, CandidateSnapshot, ClientId, FirmId, FirmMembership, IndependentWorkPolicy,
    MemberRole, MemoryAssignmentStore, MemoryNotifier, ProfessionalProfile, RequestId,
    RequestStatus, ServiceHistory, ServiceRequest, ServiceType, UserId, VerificationStatus,
};
use firmflow::workflows::independent::{
    independent_work_router, ConflictConfig, ConflictSnapshot, EngagementSummary,
    IndependentWorkService, IndependentWorkSubmission, MemoryIndependentStore,
};

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "Firmflow",
    about = "Run the hybrid assignment and independent-work service, or demo its decision engines",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Run a canned scenario against the decision engines
    Demo {
        #[command(subcommand)]
        command: DemoCommand,
    },
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Subcommand, Debug)]
enum DemoCommand {
    /// Rank a canned firm roster and auto-assign a request
    Assignment(AssignmentDemoArgs),
    /// Run the conflict-check battery for a canned independent-work request
    Conflict,
}

#[derive(Args, Debug, Default)]
struct AssignmentDemoArgs {
    /// Place the demo request outside business hours to exercise the
    /// after-hours eligibility rule
    #[arg(long)]
    after_hours: bool,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Demo {
            command: DemoCommand::Assignment(args),
        } => run_assignment_demo(args),
        Command::Demo {
            command: DemoCommand::Conflict,
        } => run_conflict_demo(),
    }
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    let assignment_store = Arc::new(MemoryAssignmentStore::default());
    let independent_store = Arc::new(MemoryIndependentStore::default());
    let notifier = Arc::new(MemoryNotifier::default());
    let assignment_service = Arc::new(AssignmentService::new(
        assignment_store,
        notifier.clone(),
        AssignmentConfig::default(),
    ));
    let independent_service = Arc::new(IndependentWorkService::new(
        independent_store,
        notifier,
        ConflictConfig::default(),
    ));

    let app = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state)
        .merge(assignment_router(assignment_service))
        .merge(independent_work_router(independent_service))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "hybrid assignment service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

fn demo_error(err: impl std::fmt::Display) -> AppError {
    AppError::Io(std::io::Error::new(
        std::io::ErrorKind::Other,
        err.to_string(),
    ))
}

fn demo_firm(id: &str) -> CaFirm {
    CaFirm {
        id: FirmId(id.to_string()),
        name: "Meridian & Associates".to_string(),
        auto_assignment_enabled: true,
        allow_independent_work: true,
        independent_work_policy: IndependentWorkPolicy::LimitedWithApproval,
        default_commission_percent: 10.0,
        min_commission_percent: 5.0,
        max_commission_percent: 30.0,
        client_cooldown_days: 90,
        restrict_current_clients: true,
        restrict_past_clients: true,
        restrict_industry_overlap: false,
        auto_approve_non_conflict: false,
        max_independent_hours_week: 20,
    }
}

fn demo_candidate(
    firm: &FirmId,
    ca: &str,
    name: &str,
    verification: VerificationStatus,
    specializations: Vec<ServiceType>,
    booked_slots: u16,
    active_assignments: u16,
    history: ServiceHistory,
) -> CandidateSnapshot {
    CandidateSnapshot {
        profile: ProfessionalProfile {
            ca_id: CaId(ca.to_string()),
            display_name: name.to_string(),
            verification,
            specializations,
        },
        membership: FirmMembership {
            firm_id: firm.clone(),
            ca_id: CaId(ca.to_string()),
            role: MemberRole::Senior,
            is_active: true,
            can_work_independently: true,
            commission_percent: 10.0,
        },
        booked_slots,
        total_slots: 40,
        active_assignments,
        history,
    }
}

fn run_assignment_demo(args: AssignmentDemoArgs) -> Result<(), AppError> {
    let store = Arc::new(MemoryAssignmentStore::default());
    let notifier = Arc::new(MemoryNotifier::default());
    let service = Arc::new(AssignmentService::new(
        store.clone(),
        notifier.clone(),
        AssignmentConfig::default(),
    ));

    let firm = demo_firm("firm-demo");
    let firm_id = firm.id.clone();
    store.insert_firm(firm);

    // 2025-03-10 is a Monday; --after-hours shifts the request to 21:00.
    let hour = if args.after_hours { 21 } else { 11 };
    let requested_at = Utc
        .with_ymd_and_hms(2025, 3, 10, hour, 0, 0)
        .single()
        .ok_or_else(|| demo_error("invalid demo timestamp"))?;

    let request_id = RequestId("req-1001".to_string());
    store.insert_request(ServiceRequest {
        id: request_id.clone(),
        client_id: ClientId("client-77".to_string()),
        firm_id: Some(firm_id.clone()),
        ca_id: None,
        service_type: ServiceType::TaxFiling,
        status: RequestStatus::Pending,
        assignment_state: AssignmentState::Unassigned,
        assignment_method: None,
        assigned_by: None,
        auto_assignment_score: None,
        requested_at,
        description: "Annual tax filing for a retail partnership".to_string(),
    });

    store.insert_candidate(
        firm_id.clone(),
        demo_candidate(
            &firm_id,
            "ca-asha",
            "Asha Krishnan",
            VerificationStatus::Verified,
            vec![ServiceType::TaxFiling, ServiceType::GstCompliance],
            4,
            0,
            ServiceHistory {
                completed_same_type: 12,
                average_rating: 4.6,
                served_client_before: false,
            },
        ),
    );
    store.insert_candidate(
        firm_id.clone(),
        demo_candidate(
            &firm_id,
            "ca-rohan",
            "Rohan Mehta",
            VerificationStatus::Verified,
            vec![ServiceType::Audit, ServiceType::TaxFiling],
            28,
            4,
            ServiceHistory {
                completed_same_type: 2,
                average_rating: 4.0,
                served_client_before: true,
            },
        ),
    );
    store.insert_candidate(
        firm_id.clone(),
        demo_candidate(
            &firm_id,
            "ca-meera",
            "Meera Pillai",
            VerificationStatus::Pending,
            vec![ServiceType::TaxFiling],
            0,
            0,
            ServiceHistory::none(),
        ),
    );

    let recommendations = service
        .recommendations(&request_id, 5)
        .map_err(demo_error)?;

    println!("Ranked candidates for {}:", request_id.0);
    for candidate in &recommendations.candidates {
        println!("  {:<10} score {:>3}", candidate.ca_id.0, candidate.score);
        for factor in &candidate.factors {
            println!("             - {}", factor.summary());
        }
    }
    for (ca, cause) in &recommendations.excluded {
        println!("  {:<10} excluded: {}", ca.0, cause.summary());
    }

    match service.auto_assign(&request_id).map_err(demo_error)? {
        AssignmentOutcome::Auto {
            winner,
            alternatives,
            ..
        } => {
            println!(
                "\nAuto-assigned to {} with score {} ({} alternatives retained)",
                winner.ca_id.0,
                winner.score,
                alternatives.len()
            );
        }
        AssignmentOutcome::ManualRequired { reasons } => {
            println!("\nDeferred to manual assignment:");
            for reason in &reasons {
                println!("  - {}", reason.summary());
            }
        }
    }

    println!("\nNotifications dispatched: {}", notifier.notices().len());
    Ok(())
}

fn run_conflict_demo() -> Result<(), AppError> {
    let store = Arc::new(MemoryIndependentStore::default());
    let notifier = Arc::new(MemoryNotifier::default());
    let service = Arc::new(IndependentWorkService::new(
        store.clone(),
        notifier,
        ConflictConfig::default(),
    ));

    let firm = demo_firm("firm-demo");
    let firm_id = firm.id.clone();
    store.insert_firm(firm);

    let ca_id = CaId("ca-asha".to_string());
    let client_id = ClientId("client-41".to_string());
    store.insert_membership(FirmMembership {
        firm_id: firm_id.clone(),
        ca_id: ca_id.clone(),
        role: MemberRole::Senior,
        is_active: true,
        can_work_independently: true,
        commission_percent: 10.0,
    });
    store.insert_role(
        firm_id.clone(),
        UserId("admin-1".to_string()),
        MemberRole::Admin,
    );

    let now = Utc
        .with_ymd_and_hms(2025, 3, 10, 11, 0, 0)
        .single()
        .ok_or_else(|| demo_error("invalid demo timestamp"))?;
    store.insert_snapshot(
        firm_id.clone(),
        ca_id.clone(),
        client_id.clone(),
        ConflictSnapshot {
            last_completed_engagement: Some(now - Duration::days(40)),
            firm_active_assignments: 3,
            approved_independent_work: 2,
            engagements: vec![EngagementSummary {
                completed_at: now - Duration::days(40),
                description: "Quarterly GST reconciliation and filing".to_string(),
            }],
            ..ConflictSnapshot::default()
        },
    );

    let outcome = service
        .submit(
            IndependentWorkSubmission {
                ca_id,
                firm_id,
                client_id,
                service_type: ServiceType::GstCompliance,
                description: "Monthly GST filing support".to_string(),
                estimated_hours: 10,
                estimated_revenue: 45_000.0,
            },
            now,
        )
        .map_err(demo_error)?;

    println!(
        "Request {} -> {} (conflict level {})",
        outcome.request.id.0,
        outcome.request.status.label(),
        outcome.report.level.label()
    );
    println!(
        "Recommendation: {} at {:.0}% commission",
        outcome.report.recommendation.label(),
        outcome.report.suggested_commission_percent
    );
    for finding in &outcome.report.findings {
        println!("  [{}] {}", finding.severity.label(), finding.summary());
    }

    Ok(())
}
