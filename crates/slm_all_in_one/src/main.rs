mod config;

use common::auth::{JwtAuthTokenProvider, JwtConfig, NumericSignInCodeProvider, SignInCodeConfig};
use common::domain::{RandomBarcodeCodeGenerator, SystemClock, ThreadRngRandomCheckProvider};
use common::email::LogEmailSender;
use common::http::{CorsConfig, HttpLoggingConfig, HttpServerConfig};
use common::postgres::{
    PostgresBarcodeEventRepository, PostgresBarcodeRepository, PostgresCjsmDirectoryRepository,
    PostgresClient, PostgresConfig, PostgresRecipientRepository, PostgresSignInCodeRepository,
};
use common::telemetry::{init_telemetry, shutdown_telemetry, TelemetryConfig, TelemetryProviders};
use config::ServiceConfig;
use goose::MigrationRunner;
use slm_api::{
    BarcodeCheckConfig, BarcodeCheckService, BarcodeService, ReportScheduler, ReportService,
    SignInService, SlmApi, SlmApiState,
};
use slm_runner::Runner;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() {
    let config = match ServiceConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let telemetry_providers: Option<TelemetryProviders> = match init_telemetry(&TelemetryConfig {
        service_name: config.otel_service_name.clone(),
        otel_endpoint: config.otel_endpoint.clone(),
        otel_enabled: config.otel_enabled,
        log_level: config.log_level.clone(),
    }) {
        Ok(providers) => providers,
        Err(e) => {
            eprintln!("Failed to initialize telemetry: {}", e);
            std::process::exit(1);
        }
    };

    info!(
        otel_enabled = config.otel_enabled,
        http_port = config.http_port,
        "Starting slm-all-in-one service"
    );
    debug!(
        barcode_expiry_days = config.barcode_expiry_days,
        random_check_percentage = config.random_check_percentage,
        "barcode check policy"
    );

    let repos = match initialize_postgres(&config).await {
        Ok(repos) => repos,
        Err(e) => {
            error!("Failed to initialize PostgreSQL: {:#}", e);
            std::process::exit(1);
        }
    };

    let clock = Arc::new(SystemClock);
    let email_sender = Arc::new(LogEmailSender::new(config.email_log_body));
    let token_provider = Arc::new(JwtAuthTokenProvider::new(JwtConfig::new(
        config.jwt_secret.clone(),
        config.jwt_expiration_minutes,
    )));

    let barcode_service = Arc::new(BarcodeService::new(
        repos.barcode.clone(),
        repos.event.clone(),
        repos.recipient.clone(),
        Arc::new(RandomBarcodeCodeGenerator::new()),
        clock.clone(),
    ));
    let barcode_check_service = Arc::new(BarcodeCheckService::new(
        repos.barcode.clone(),
        repos.event.clone(),
        repos.directory.clone(),
        Arc::new(ThreadRngRandomCheckProvider),
        clock.clone(),
        BarcodeCheckConfig {
            barcode_expiry_days: config.barcode_expiry_days,
            random_check_percentage: config.random_check_percentage,
        },
    ));
    let sign_in_service = Arc::new(SignInService::new(
        repos.directory.clone(),
        repos.sign_in_code.clone(),
        Arc::new(NumericSignInCodeProvider::new()),
        token_provider.clone(),
        email_sender.clone(),
        clock.clone(),
        SignInCodeConfig {
            expiry_minutes: config.sign_in_code_expiry_minutes,
            max_attempts: config.sign_in_code_max_attempts,
        },
    ));

    let http_config = HttpServerConfig {
        host: config.http_host.clone(),
        port: config.http_port,
        logging_config: HttpLoggingConfig::new(config.ignored_paths()),
        cors_config: if config.http_cors_allowed_origins.trim().is_empty() {
            None
        } else {
            Some(CorsConfig::from_comma_separated(
                &config.http_cors_allowed_origins,
            ))
        },
    };

    let slm_api = SlmApi::new(
        SlmApiState {
            barcode_service,
            barcode_check_service,
            sign_in_service,
            auth_token_provider: token_provider,
        },
        http_config,
    );

    let mut runner = Runner::new().with_app_process("slm_api", slm_api.into_runner_process());

    let report_service = Arc::new(ReportService::new(
        repos.event.clone(),
        email_sender,
        config.report_recipients(),
    ));
    if report_service.has_recipients() {
        let scheduler = ReportScheduler::new(report_service, clock, config.report_hour_utc);
        runner = runner.with_app_process("report_scheduler", move |token| scheduler.run(token));
    } else {
        info!("no report recipients configured, daily report disabled");
    }

    runner = runner
        .with_closer(move || async move {
            info!("Running cleanup tasks...");
            shutdown_telemetry(telemetry_providers);
            info!("Cleanup complete");
            Ok(())
        })
        .with_closer_timeout(Duration::from_secs(10));

    if let Err(e) = runner.run().await {
        eprintln!("slm-all-in-one stopped with error: {:#}", e);
        std::process::exit(1);
    }
}

struct PostgresRepositories {
    barcode: Arc<PostgresBarcodeRepository>,
    event: Arc<PostgresBarcodeEventRepository>,
    recipient: Arc<PostgresRecipientRepository>,
    directory: Arc<PostgresCjsmDirectoryRepository>,
    sign_in_code: Arc<PostgresSignInCodeRepository>,
}

async fn initialize_postgres(config: &ServiceConfig) -> anyhow::Result<PostgresRepositories> {
    let postgres_config = PostgresConfig {
        host: config.postgres_host.clone(),
        port: config.postgres_port,
        database: config.postgres_database.clone(),
        username: config.postgres_username.clone(),
        password: config.postgres_password.clone(),
        max_pool_size: config.postgres_max_pool_size,
    };

    info!("Running PostgreSQL migrations...");
    MigrationRunner::new(
        config.postgres_goose_binary_path.clone(),
        config.postgres_migrations_dir.clone(),
        "postgres".to_string(),
        postgres_config.dsn(),
    )
    .run_migrations()
    .await?;

    let client = PostgresClient::new(&postgres_config)?;
    client.ping().await?;

    Ok(PostgresRepositories {
        barcode: Arc::new(PostgresBarcodeRepository::new(client.clone())),
        event: Arc::new(PostgresBarcodeEventRepository::new(client.clone())),
        recipient: Arc::new(PostgresRecipientRepository::new(client.clone())),
        directory: Arc::new(PostgresCjsmDirectoryRepository::new(client.clone())),
        sign_in_code: Arc::new(PostgresSignInCodeRepository::new(client)),
    })
}
