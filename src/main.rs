use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::collections::HashMap;
use std::time::Duration;
use vmc_rs::constants::DEFAULT_PORT;
use vmc_rs::{
    load_devices, try_init_logger, DerivedMetrics, DeviceManager, DeviceRecord, FanSpeed,
    PollConfig, VmcDevice,
};

#[derive(Parser)]
#[command(name = "vmc-cli")]
#[command(about = "CLI tool for networked ventilation units")]
struct Cli {
    /// Device address
    #[arg(long, global = true, default_value = "127.0.0.1")]
    host: String,
    #[arg(short, long, global = true, default_value_t = DEFAULT_PORT)]
    port: u16,
    /// Per-exchange timeout in seconds
    #[arg(short, long, global = true, default_value_t = 3)]
    timeout: u64,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Status,
    Sensors,
    Name,
    /// Show the configured Wi-Fi network (SSID only)
    Network,
    /// Read status and sensors and print derived metrics as JSON
    Metrics {
        #[arg(long, default_value_t = 60.0)]
        room_volume: f64,
    },
    SetSpeed {
        /// 0 off, 1-4 manual, 5 night, 6 hyperventilation, 7 free cooling
        speed: u8,
    },
    PanelLed {
        #[arg(action = clap::ArgAction::Set)]
        on: bool,
    },
    SensorsEnabled {
        #[arg(action = clap::ArgAction::Set)]
        enabled: bool,
    },
    Lights {
        level: u8,
    },
    LightsTimer {
        seconds: u32,
    },
    Rename {
        name: String,
    },
    Wifi {
        ssid: String,
        password: String,
    },
    /// Poll devices and print each new snapshot as a JSON line
    Watch {
        /// JSON device list; defaults to the global host/port
        #[arg(long)]
        devices: Option<std::path::PathBuf>,
        #[arg(long, default_value_t = 60.0)]
        room_volume: f64,
        /// Normal refresh interval in seconds
        #[arg(long)]
        interval: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    try_init_logger("info")?;

    let cli = Cli::parse();
    let timeout = Duration::from_secs(cli.timeout);
    let device = VmcDevice::connect(&cli.host, cli.port).timeout(timeout);

    match cli.command {
        Commands::Status => {
            let status = device.read_status().await?;
            println!("{}", serde_json::to_string_pretty(&status)?);
            log::info!("Fan: {}", status.fan_speed);
        }
        Commands::Sensors => {
            let sensors = device.read_sensors().await?;
            println!("{}", serde_json::to_string_pretty(&sensors)?);
        }
        Commands::Name => println!("{}", device.read_name().await?),
        Commands::Network => println!("{}", device.read_network().await?.ssid),
        Commands::Metrics { room_volume } => {
            let status = device.read_status().await?;
            let sensors = device.read_sensors().await.ok();
            let metrics = DerivedMetrics::compute(Some(&status), sensors.as_ref(), room_volume);
            println!("{}", serde_json::to_string_pretty(&metrics)?);
        }
        Commands::SetSpeed { speed } => device.set_fan_speed(FanSpeed(speed)).await?,
        Commands::PanelLed { on } => device.set_panel_led(on).await?,
        Commands::SensorsEnabled { enabled } => device.set_sensors_enabled(enabled).await?,
        Commands::Lights { level } => device.set_lights_level(level).await?,
        Commands::LightsTimer { seconds } => device.set_lights_timer(seconds).await?,
        Commands::Rename { name } => device.rename(&name).await?,
        Commands::Wifi { ssid, password } => device.set_wifi(&ssid, &password).await?,
        Commands::Watch {
            devices,
            room_volume,
            interval,
        } => {
            let records = match devices {
                Some(path) => load_devices(&path)
                    .with_context(|| format!("loading {}", path.display()))?,
                None => vec![DeviceRecord::new(cli.host.clone(), cli.host.clone(), room_volume)
                    .with_port(cli.port)],
            };
            let mut config = PollConfig {
                exchange_timeout: timeout,
                ..PollConfig::default()
            };
            if let Some(secs) = interval {
                config.normal_interval = Duration::from_secs(secs);
            }
            watch(records, config).await?;
        }
    }

    Ok(())
}

async fn watch(records: Vec<DeviceRecord>, config: PollConfig) -> anyhow::Result<()> {
    if records.is_empty() {
        bail!("no devices to watch");
    }
    let volumes: HashMap<String, f64> = records
        .iter()
        .map(|r| (r.address(), r.room_volume_m3))
        .collect();

    let mut manager = DeviceManager::new(config)?;
    for record in records {
        manager.add_device(record)?;
    }

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    for address in manager.addresses() {
        let Some(receivers) = manager.subscribe(&address) else {
            continue;
        };
        let mut snapshots = receivers.snapshot;
        let tx = tx.clone();
        tokio::spawn(async move {
            while snapshots.changed().await.is_ok() {
                let snapshot = snapshots.borrow_and_update().clone();
                if let Some(snapshot) = snapshot {
                    if tx.send((address.clone(), snapshot)).is_err() {
                        break;
                    }
                }
            }
        });
    }
    drop(tx);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            next = rx.recv() => {
                let Some((address, snapshot)) = next else { break };
                let volume = volumes.get(&address).copied().unwrap_or_default();
                let line = serde_json::json!({
                    "device": address,
                    "snapshot": snapshot,
                    "metrics": DerivedMetrics::from_snapshot(&snapshot, volume),
                });
                println!("{line}");
            }
        }
    }

    manager.shutdown_all().await;
    Ok(())
}
