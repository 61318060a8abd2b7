//! MQTT emitter: one fixed topic, QoS 1, non-retained, TLS only.
use std::time::Duration;

use rumqttc::{
    AsyncClient, Event, EventLoop, Incoming, MqttOptions, QoS, TlsConfiguration, Transport,
};
use tokio::task::JoinHandle;
use tracing::{info, trace, warn};

use crate::transport::TransportSink;
use crate::{Error, TSResult};

/// Capacity of the client's outgoing request queue.
const REQUEST_QUEUE: usize = 16;

/// Pause between reconnect attempts after the event loop reports a
/// connection failure.
const RECONNECT_PAUSE: Duration = Duration::from_secs(1);

/// Fixed deployment configuration for the broker channel.
///
/// Host, topic and client identity are deployment constants; only the
/// credentials vary and may stay empty when the broker allows anonymous
/// sessions.
#[derive(Debug, Clone)]
pub struct BrokerConfig {
    pub host: String,
    pub port: u16,
    pub topic: String,
    pub client_id: String,
    pub username: String,
    pub password: String,
    /// CA bundle validating the broker's identity during the TLS handshake.
    pub ca_path: String,
    pub keep_alive: Duration,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            host: "44dbd06832c54083bd5d0cacdb217aff.s1.eu.hivemq.cloud".into(),
            port: 8883,
            topic: "/logging".into(),
            client_id: "mangue-baja-sim".into(),
            username: String::new(),
            password: String::new(),
            // Debian/Ubuntu/Arch bundle path; Fedora ships
            // /etc/pki/tls/certs/ca-bundle.crt instead.
            ca_path: "/etc/ssl/certs/ca-certificates.crt".into(),
            keep_alive: Duration::from_secs(60),
        }
    }
}

/// Publishes encoded packets to the broker over a persistent encrypted
/// connection maintained by a background worker task.
pub struct BrokerPublisher {
    client: AsyncClient,
    topic: String,
    worker: JoinHandle<()>,
}

impl BrokerPublisher {
    /// Configure TLS and credentials and start connecting.
    ///
    /// The handshake completes asynchronously on the worker task; packets
    /// published before it finishes sit in the client's request queue. An
    /// unreadable trust anchor is fatal. Must be called inside a tokio
    /// runtime.
    pub fn connect(config: BrokerConfig) -> TSResult<Self> {
        let ca = std::fs::read(&config.ca_path).map_err(|source| Error::TrustAnchor {
            path: config.ca_path.clone(),
            source,
        })?;

        let mut options = MqttOptions::new(config.client_id.clone(), config.host.clone(), config.port);
        options.set_keep_alive(config.keep_alive);
        options.set_transport(Transport::Tls(TlsConfiguration::Simple {
            ca,
            alpn: None,
            client_auth: None,
        }));
        if !config.username.is_empty() {
            options.set_credentials(config.username.clone(), config.password.clone());
        }

        let (client, event_loop) = AsyncClient::new(options, REQUEST_QUEUE);
        let worker = tokio::spawn(drive_connection(event_loop));
        info!(host = %config.host, port = config.port, "connecting to broker");
        Ok(Self {
            client,
            topic: config.topic,
            worker,
        })
    }
}

/// Background network worker.
///
/// Handshake, keepalive and reconnection all live inside the client's event
/// loop; this task keeps it polled and surfaces its events to the operator.
/// Nothing in the streaming loop depends on these log events.
async fn drive_connection(mut event_loop: EventLoop) {
    loop {
        match event_loop.poll().await {
            Ok(Event::Incoming(Incoming::ConnAck(ack))) => {
                info!(code = ?ack.code, "connected to broker");
            }
            Ok(Event::Incoming(Incoming::Disconnect)) => {
                warn!("broker closed the session");
            }
            Ok(event) => trace!(?event, "broker event"),
            Err(e) => {
                warn!(error = %e, "broker connection lost, reconnecting");
                tokio::time::sleep(RECONNECT_PAUSE).await;
            }
        }
    }
}

impl TransportSink for BrokerPublisher {
    fn name(&self) -> &'static str {
        "broker"
    }

    /// Queue one publish at QoS 1 (at least once), non-retained.
    async fn send(&mut self, payload: &[u8]) -> TSResult<()> {
        self.client
            .publish(self.topic.clone(), QoS::AtLeastOnce, false, payload)
            .await?;
        Ok(())
    }
}

impl Drop for BrokerPublisher {
    fn drop(&mut self) {
        self.worker.abort();
    }
}
