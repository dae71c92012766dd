use std::io::Write;

use anyhow::Result;
use chrono::Utc;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use ais_decoder::config::AppConfig;
use ais_decoder::mqtt::MqttClientBuilder;
use ais_decoder::pipeline::DecodePipeline;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = AppConfig::load()?;
    let pipeline = DecodePipeline::new(config.decoder.clone());

    let mut client = MqttClientBuilder::new(&config.mqtt)?
        .connect(&config.mqtt.topics)
        .await?;
    info!(
        "Listening for AIS feed payloads on {}:{}",
        config.mqtt.host, config.mqtt.port
    );

    let stdout = std::io::stdout();
    loop {
        tokio::select! {
            message = client.recv() => {
                let Some(message) = message else {
                    error!("Feed channel closed, shutting down");
                    break;
                };
                match pipeline.decode_payload(&message.payload, Utc::now()) {
                    Ok(record) => {
                        let mut out = stdout.lock();
                        serde_json::to_writer(&mut out, &record)?;
                        writeln!(out)?;
                    }
                    // Checksum and truncation failures point at reception
                    // problems; everything else is routine feed noise.
                    Err(e) if e.is_signal_problem() => {
                        warn!(topic = %message.topic, "Dropped sentence: {}", e);
                    }
                    Err(e) => {
                        debug!(topic = %message.topic, "Dropped sentence: {}", e);
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    Ok(())
}
