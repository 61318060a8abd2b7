use clap::{Parser, Subcommand};
use tracing::{error, info};

use telem_sim::model::SyntheticVehicle;
use telem_sim::stream::{run, StopFlag, StreamConfig};
use telem_sim::transport::{BrokerConfig, BrokerPublisher, FramedSerialWriter};
use telem_sim::TSResult;

/// Stand-in for the vehicle's embedded telemetry unit.
#[derive(Parser)]
#[command(name = "telem-sim", version, about)]
struct Cli {
    #[command(subcommand)]
    transport: TransportArg,
}

#[derive(Subcommand)]
enum TransportArg {
    /// Publish packets to the MQTT broker (TLS, QoS 1).
    Broker,
    /// Stream framed packets to a serial device.
    Serial {
        /// Device path, e.g. /dev/ttyUSB0.
        device: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let stop = StopFlag::new();
    let ctrlc_stop = stop.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("ctrl-c received, stopping after the current tick");
            ctrlc_stop.stop();
        }
    });

    if let Err(e) = stream_packets(cli.transport, &stop).await {
        error!(error = %e, "fatal startup error");
        std::process::exit(1);
    }
}

async fn stream_packets(transport: TransportArg, stop: &StopFlag) -> TSResult<()> {
    let mut vehicle = SyntheticVehicle::new();
    match transport {
        TransportArg::Broker => {
            let mut sink = BrokerPublisher::connect(BrokerConfig::default())?;
            run(&mut vehicle, &mut sink, &StreamConfig::broker(), stop).await;
        }
        TransportArg::Serial { device } => {
            let mut sink = FramedSerialWriter::open(&device)?;
            run(&mut vehicle, &mut sink, &StreamConfig::serial(), stop).await;
        }
    }
    Ok(())
}
