use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use api_client::{ApiClient, ClientConfig};
use clap::{Parser, Subcommand};
use domain::{
    parse_prescription_id,
    pharmacies::PharmacyId,
    prescriptions::{
        LifecycleManager, NotificationQuery, PendingCountQuery, Role, Services, WorkspaceStore,
    },
    records::{MedicalRecordService, NewMedicalRecord},
    DispatchCoordinator,
};
use serde::Serialize;
use serde_json::json;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "workstation=info,domain=info,api_client=info";

#[derive(Debug, Parser)]
#[command(name = "workstation", version, about = "Prescription dispatch and dispensing workstation")]
struct Cli {
    /// Acting role: doctor or pharmacist
    #[arg(long, env = "RX_ROLE", global = true)]
    role: Option<Role>,

    /// Overrides RX_API_BASE_URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Overrides RX_API_TOKEN
    #[arg(long, global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List visible prescriptions
    List,
    /// Show one prescription with its medicines
    Show { id: String },
    /// Move a prescription to its next status (pharmacist)
    Advance { id: String },
    /// Search pharmacies by keyword
    Pharmacies {
        #[arg(default_value = "")]
        keyword: String,
        /// Overrides RX_PHARMACY_SEARCH_SIZE
        #[arg(long)]
        size: Option<usize>,
    },
    /// Send a CREATED prescription to a pharmacy (doctor)
    Dispatch {
        prescription: String,
        /// Pharmacy id; with --keyword it must be one of the results
        #[arg(long)]
        pharmacy: Option<PharmacyId>,
        /// Search first and dispatch to the first result
        #[arg(long)]
        keyword: Option<String>,
    },
    /// List medical records
    Records,
    /// Create a medical record from a JSON file
    CreateRecord {
        #[arg(long)]
        file: PathBuf,
    },
}

impl Cli {
    fn role(&self) -> anyhow::Result<Role> {
        self.role
            .context("--role (or RX_ROLE) is required for this command")
    }

    fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::from_env();
        if let Some(base_url) = &self.base_url {
            config = config.with_base_url(base_url);
        }
        if let Some(token) = &self.token {
            config = config.with_token(token);
        }
        if let Commands::Pharmacies {
            size: Some(size), ..
        } = &self.command
        {
            config = config.with_search_size(*size);
        }
        config
    }
}

struct Workstation {
    client: Arc<ApiClient>,
    manager: Arc<LifecycleManager>,
    coordinator: DispatchCoordinator,
}

impl Workstation {
    fn new(config: &ClientConfig) -> anyhow::Result<Self> {
        let client = Arc::new(config.build_api_client()?);
        let store = WorkspaceStore::new();

        let manager = LifecycleManager::new(Services::new(client.clone()), store.clone())
            .with_query(PendingCountQuery::new(store, |count| {
                tracing::info!("{} prescriptions awaiting dispensing", count);
            }))
            .with_query(NotificationQuery::new(|event| {
                tracing::info!(
                    "{} v{} for prescription {}",
                    event.event_type,
                    event.event_version,
                    event.id
                );
            }));
        let manager = Arc::new(manager);

        let coordinator = DispatchCoordinator::new(manager.clone(), client.clone())
            .with_search_size(config.search_size);

        Ok(Self {
            client,
            manager,
            coordinator,
        })
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.client_config();
    tracing::debug!("Using API at {}", config.base_url);
    let workstation = Workstation::new(&config)?;

    match &cli.command {
        Commands::List => {
            workstation.manager.list_prescriptions().await?;
            let snapshot = workstation.manager.snapshot();
            print(&json!({
                "prescriptions": snapshot.prescriptions,
                "selectedId": snapshot.selected_id,
                "pendingCount": snapshot.pending_count(),
            }))
        }
        Commands::Show { id } => {
            let id = parse_prescription_id(id)?;
            workstation.manager.select(Some(id));
            let detail = workstation.manager.get_detail(id).await?;
            print(&detail)
        }
        Commands::Advance { id } => {
            let id = parse_prescription_id(id)?;
            let status = workstation.manager.advance(id, cli.role()?).await?;
            print(&json!({ "prescriptionId": id, "status": status }))
        }
        Commands::Pharmacies { keyword, .. } => {
            let pharmacies = workstation.coordinator.search_pharmacies(keyword).await?;
            print(&pharmacies)
        }
        Commands::Dispatch {
            prescription,
            pharmacy,
            keyword,
        } => {
            let role = cli.role()?;
            let prescription_id = parse_prescription_id(prescription)?;
            let coordinator = &workstation.coordinator;

            let receipt = match keyword {
                Some(keyword) => {
                    coordinator.search_pharmacies(keyword).await?;
                    if let Some(pharmacy_id) = pharmacy {
                        coordinator.select_pharmacy(*pharmacy_id)?;
                    }
                    coordinator.select_prescription(Some(prescription_id));
                    coordinator.dispatch_selected(role).await?
                }
                None => {
                    coordinator
                        .dispatch(Some(prescription_id), *pharmacy, role)
                        .await?
                }
            };
            print(&receipt)
        }
        Commands::Records => {
            let records = workstation.client.list_records().await?;
            print(&records)
        }
        Commands::CreateRecord { file } => {
            let raw = std::fs::read_to_string(file)
                .with_context(|| format!("reading {}", file.display()))?;
            let record: NewMedicalRecord = serde_json::from_str(&raw)
                .with_context(|| format!("parsing {}", file.display()))?;
            let created = workstation.client.create_record(&record).await?;
            tracing::info!("Created medical record {}", created.record_id);
            print(&created)
        }
    }
}

fn print<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
