// ==========================================================
//  scanbox - WiFi, LAN and diagnostics client
// ==========================================================

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use time::OffsetDateTime;

use scanbox::export::LogShare;
use scanbox::table;
use scanbox::view::devices::DevicesController;
use scanbox::view::history::{HistoryController, HistorySource};
use scanbox::view::network::{NetworkController, NetworkSection};
use scanbox::view::scan::{ScanController, ScanFilter};
use scanbox::{
    ApiClient, AppConfig, ExportFormat, Exporter, FileStore, LocalStore, NmcliScanner,
    PermissionStatus, ScanBoxError,
};

#[derive(Parser)]
#[command(name = "scanbox", version, about = "WiFi, LAN and diagnostics client for the ScanBox backend")]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan nearby WiFi networks
    Wifi {
        #[arg(long, value_enum, default_value_t = ScanFilter::All)]
        filter: ScanFilter,
        #[arg(long, value_enum)]
        export: Option<ExportFormat>,
    },
    /// Scan, then join a network by BSSID
    Connect {
        bssid: String,
        #[arg(long)]
        password: Option<String>,
    },
    /// Toggle a network in the favorites
    Favorite { bssid: String },
    /// Ask the backend for a LAN device scan
    Devices {
        #[arg(long, value_enum)]
        export: Option<ExportFormat>,
    },
    /// Mark a device as trusted (or not) and optionally rename it
    Trust {
        mac: String,
        #[arg(long)]
        untrusted: bool,
        #[arg(long)]
        name: Option<String>,
    },
    /// Send a Wake-on-LAN packet through the backend
    Wol { mac: String },
    /// Services, open ports and active connections of the backend host
    Network {
        #[arg(value_enum)]
        section: Option<NetworkSection>,
    },
    Speedtest,
    Ping { target: String },
    /// Scan history, local unless --server
    History {
        #[arg(long)]
        server: bool,
        #[arg(long)]
        expand: Option<String>,
    },
    /// Raw network summary from the backend
    Info,
}

fn init_tracing(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                let app_name = env!("CARGO_PKG_NAME").replace('-', "_");
                format!("{app_name}={level}").into()
            }),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), ScanBoxError> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;
    init_tracing(&config.logger.level);

    let api = ApiClient::new(config.api.base_url.clone());
    let local = LocalStore::new(Arc::new(FileStore::new(config.storage.dir.clone())));
    let exporter = Exporter::new(config.export.dir.clone(), Arc::new(LogShare));

    match cli.command {
        Commands::Wifi { filter, export } => {
            let controller = ScanController::new(Arc::new(NmcliScanner::new()), api, local, exporter);
            if controller.init().await? == PermissionStatus::Denied {
                let state = controller.state().await;
                return Err(ScanBoxError::PermissionDenied(state.error.unwrap_or_default()));
            }
            controller.scan().await?;
            controller.set_filter(filter).await;

            let state = controller.state().await;
            println!("{}", table::networks_table(&state.filtered(), &state.favorites));
            println!("{} networks ({} shown)", state.networks.len(), state.filtered().len());

            if let Some(format) = export {
                let path = controller.export(format).await?;
                println!("Exported to {}", path.display());
            }
        }
        Commands::Connect { bssid, password } => {
            let controller = ScanController::new(Arc::new(NmcliScanner::new()), api, local, exporter);
            controller.scan().await?;
            controller.connect(&bssid, password.as_deref()).await?;
            println!("Connected to {bssid}");
        }
        Commands::Favorite { bssid } => {
            if local.toggle_favorite(&bssid).await {
                println!("{bssid} added to favorites");
            } else {
                println!("{bssid} removed from favorites");
            }
        }
        Commands::Devices { export } => {
            let controller = DevicesController::new(api, exporter);
            controller.scan().await?;

            let state = controller.state().await;
            println!("{}", table::devices_table(&controller.rows().await));
            if let Some(result) = &state.result {
                println!(
                    "{} devices on {} ({} new), server {}",
                    result.devices.len(),
                    result.subnet,
                    result.new_devices,
                    result.server_ip
                );
            }

            if let Some(format) = export {
                let path = controller.export(format).await?;
                println!("Exported to {}", path.display());
            }
        }
        Commands::Trust { mac, untrusted, name } => {
            let controller = DevicesController::new(api, exporter);
            let known = controller.set_trust(&mac, !untrusted, name.as_deref()).await?;
            println!(
                "{} is now {}{}",
                known.mac,
                if known.trusted { "trusted" } else { "untrusted" },
                known
                    .custom_name
                    .as_deref()
                    .map(|n| format!(" as \"{n}\""))
                    .unwrap_or_default()
            );
        }
        Commands::Wol { mac } => {
            let controller = DevicesController::new(api, exporter);
            println!("{}", controller.wake(&mac).await?);
        }
        Commands::Network { section } => {
            let controller = NetworkController::new(api);
            controller.load().await?;
            let state = controller.state().await;

            let show = |s: NetworkSection| section.is_none() || section == Some(s);
            if let (true, Some(services)) = (show(NetworkSection::Services), &state.services) {
                println!("{}", table::services_table(services));
            }
            if let (true, Some(ports)) = (show(NetworkSection::Ports), &state.ports) {
                println!("{}", table::ports_table(ports));
                println!("{} open ports", ports.count);
            }
            if let (true, Some(connections)) = (show(NetworkSection::Connections), &state.connections) {
                println!("{}", table::connections_table(connections));
                println!("{} connections", connections.total);
            }
        }
        Commands::Speedtest => {
            let controller = NetworkController::new(api);
            if let Some(r) = controller.speed_test().await? {
                println!("Download: {:.2} {}", r.download, r.unit);
                println!("Upload:   {:.2} {}", r.upload, r.unit);
                if let Some(latency) = r.latency {
                    println!("Latency:  {latency:.1} ms");
                }
            }
        }
        Commands::Ping { target } => {
            let controller = NetworkController::new(api);
            if let Some(r) = controller.ping(&target).await? {
                for p in &r.pings {
                    println!("seq={} ttl={} time={:.1} ms", p.seq, p.ttl, p.time);
                }
                println!(
                    "{}: {}/{} received, {:.0}% loss",
                    r.target, r.received, r.transmitted, r.loss
                );
                if let (Some(min), Some(avg), Some(max)) = (r.min, r.avg, r.max) {
                    println!("min/avg/max = {min:.1}/{avg:.1}/{max:.1} ms");
                }
            }
        }
        Commands::History { server, expand } => {
            let controller = HistoryController::new(api, local, config.api.history_limit);
            let source = if server { HistorySource::Server } else { HistorySource::Local };
            controller.set_source(source).await?;
            if let Some(id) = expand.as_deref() {
                controller.toggle_expanded(id).await;
            }

            let state = controller.state().await;
            if let Some(error) = &state.error {
                eprintln!("{error}");
            }
            println!(
                "{}",
                table::history_table(
                    &controller.summaries().await,
                    state.expanded.as_deref(),
                    OffsetDateTime::now_utc()
                )
            );
        }
        Commands::Info => {
            let controller = NetworkController::new(api);
            let info = controller.load_info().await?;
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
    }

    Ok(())
}
