//! rbkctl CLI
//!
//! One subcommand per resource module. Each invocation resolves
//! credentials, runs exactly one module against the cluster, prints the
//! `{changed, response}` result document as JSON on stdout, and exits 0
//! on success (including no-op) or non-zero with an error message.

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use rbkctl::cdm::auth::{ConnectionContext, Credentials};
use rbkctl::cdm::client::CdmClient;
use rbkctl::config::ProviderConfig;
use rbkctl::modules::{
    self, archival_target::ArchivalTargetParams, assign_sla::AssignSlaParams,
    cluster_info::ClusterInfoParams, cluster_settings::DnsServersParams,
    cluster_settings::NtpServersParams, cluster_settings::TimezoneParams,
    fileset::FilesetParams, job_status::JobStatusParams, live_mount::LiveMountParams,
    live_mount::LiveUnmountParams, managed_volume::ManagedVolumeParams,
    on_demand_snapshot::OnDemandSnapshotParams, physical_host::PhysicalHostParams,
    ModuleOutcome,
};
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Version injected at compile time via RBKCTL_VERSION env var (set by CI/CD),
/// or "dev" for local builds.
pub const VERSION: &str = match option_env!("RBKCTL_VERSION") {
    Some(v) => v,
    None => "dev",
};

/// Declarative configuration for Rubrik CDM clusters
#[derive(Parser, Debug)]
#[command(name = "rbkctl", version = VERSION, about, long_about = None)]
struct Args {
    #[command(flatten)]
    connection: ConnectionArgs,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug)]
struct ConnectionArgs {
    /// DNS hostname or IP address of the Rubrik cluster
    #[arg(long, global = true)]
    node_ip: Option<String>,

    /// Username used to authenticate the connection
    #[arg(long, global = true)]
    username: Option<String>,

    /// Password used to authenticate the connection
    #[arg(long, global = true)]
    password: Option<String>,

    /// API token used instead of a username/password pair
    #[arg(long, global = true)]
    api_token: Option<String>,

    /// Path to a provider config file; defaults to the user config dir
    #[arg(long, global = true)]
    provider: Option<PathBuf>,

    /// Accept invalid TLS certificates (compatibility mode for clusters
    /// still running self-signed certificates)
    #[arg(long, global = true)]
    insecure: bool,

    /// Per-request timeout in seconds
    #[arg(long, global = true, default_value_t = 15)]
    timeout: u64,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Register or delete a physical host
    PhysicalHost(PhysicalHostParams),
    /// Create or converge a fileset template
    Fileset(FilesetParams),
    /// Assign an SLA domain to a vSphere VM
    AssignSla(AssignSlaParams),
    /// Take an on-demand snapshot of a vSphere VM
    OnDemandSnapshot(OnDemandSnapshotParams),
    /// Live mount a vSphere VM snapshot
    LiveMount(LiveMountParams),
    /// Unmount a live-mounted clone
    LiveUnmount(LiveUnmountParams),
    /// Begin or end a managed volume snapshot window
    ManagedVolume(ManagedVolumeParams),
    /// Add an AWS S3 archival location
    ArchivalTarget(ArchivalTargetParams),
    /// Configure the cluster DNS nameservers
    ConfigureDns(DnsServersParams),
    /// Configure the cluster NTP servers
    ConfigureNtp(NtpServersParams),
    /// Configure the cluster timezone
    ConfigureTimezone(TimezoneParams),
    /// Gather read-only cluster facts
    ClusterInfo(ClusterInfoParams),
    /// Check or poll an asynchronous job by its job-status URL
    JobStatus(JobStatusParams),
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

/// Logs go to a file so stdout stays a clean JSON result channel.
fn setup_logging(level: LogLevel) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return None;
    };

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .expect("Failed to open log file");

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("rbkctl started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Some(guard)
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("rbkctl").join("rbkctl.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".rbkctl").join("rbkctl.log");
    }
    PathBuf::from("rbkctl.log")
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level);

    let outcome = run(&args).await?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);

    Ok(())
}

async fn run(args: &Args) -> Result<ModuleOutcome> {
    let explicit = Credentials {
        node_ip: args.connection.node_ip.clone(),
        username: args.connection.username.clone(),
        password: args.connection.password.clone(),
        api_token: args.connection.api_token.clone(),
    };

    let provider = match &args.connection.provider {
        Some(path) => ProviderConfig::load_from(path)?,
        None => ProviderConfig::load(),
    };

    let context = ConnectionContext::resolve(explicit, provider.credentials())?
        .with_insecure_tls(args.connection.insecure)
        .with_timeout(Duration::from_secs(args.connection.timeout));
    let client = CdmClient::new(context)?;

    let outcome = match &args.command {
        Command::PhysicalHost(params) => modules::physical_host::run(&client, params).await?,
        Command::Fileset(params) => modules::fileset::run(&client, params).await?,
        Command::AssignSla(params) => modules::assign_sla::run(&client, params).await?,
        Command::OnDemandSnapshot(params) => {
            modules::on_demand_snapshot::run(&client, params).await?
        }
        Command::LiveMount(params) => modules::live_mount::run_mount(&client, params).await?,
        Command::LiveUnmount(params) => modules::live_mount::run_unmount(&client, params).await?,
        Command::ManagedVolume(params) => modules::managed_volume::run(&client, params).await?,
        Command::ArchivalTarget(params) => modules::archival_target::run(&client, params).await?,
        Command::ConfigureDns(params) => modules::cluster_settings::run_dns(&client, params).await?,
        Command::ConfigureNtp(params) => modules::cluster_settings::run_ntp(&client, params).await?,
        Command::ConfigureTimezone(params) => {
            modules::cluster_settings::run_timezone(&client, params).await?
        }
        Command::ClusterInfo(params) => modules::cluster_info::run(&client, params).await?,
        Command::JobStatus(params) => modules::job_status::run(&client, params).await?,
    };

    Ok(outcome)
}
