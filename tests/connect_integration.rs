//! Integration tests for connection strategy selection.
//!
//! These tests drive the public API end to end with an in-memory transport
//! that records every attempt.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use quay::prelude::*;
use quay::{DIRECT_PORT, POOLER_PORT, Transport};

/// Records attempts; fails every attempt on the listed ports with a dial error.
struct RecordingTransport {
    refuse: Vec<u16>,
    configs: Mutex<Vec<ClientConfig>>,
}

impl RecordingTransport {
    fn refusing(refuse: &[u16]) -> Self {
        Self {
            refuse: refuse.to_vec(),
            configs: Mutex::new(Vec::new()),
        }
    }

    fn configs(&self) -> Vec<ClientConfig> {
        self.configs.lock().unwrap().clone()
    }

    fn attempts(&self) -> Vec<(String, u16, bool)> {
        self.configs()
            .into_iter()
            .map(|c| (c.host, c.port, c.simple_protocol))
            .collect()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    type Connection = u16;

    async fn connect(&self, config: &ClientConfig) -> PgResult<u16> {
        self.configs.lock().unwrap().push(config.clone());
        if self.refuse.contains(&config.port) {
            Err(PgError::dial(config.address(), "connection refused"))
        } else {
            Ok(config.port)
        }
    }
}

#[derive(Default)]
struct Notices(Mutex<Vec<String>>);

impl Notify for Notices {
    fn notice(&self, message: &str) {
        self.0.lock().unwrap().push(message.to_string());
    }
}

fn connector(refuse: &[u16]) -> (Connector<RecordingTransport>, Arc<Notices>) {
    let notices = Arc::new(Notices::default());
    let ctx = ConnectContext::builder()
        .local_port(54322)
        .local_password("postgres")
        .notifier(notices.clone())
        .build()
        .unwrap();
    (
        Connector::with_transport(Arc::new(ctx), RecordingTransport::refusing(refuse)),
        notices,
    )
}

/// Test that a bare localhost descriptor picks up the local defaults
#[tokio::test]
async fn test_local_defaults_reach_transport() {
    let (connector, _) = connector(&[]);

    let port = connector
        .connect_local(ConnectionDescriptor::new("localhost"), &[])
        .await
        .unwrap();
    assert_eq!(port, 54322);

    let configs = connector.transport().configs();
    assert_eq!(configs.len(), 1);
    let config = &configs[0];
    assert_eq!(config.host, "localhost");
    assert_eq!(config.port, 54322);
    assert_eq!(config.user, "postgres");
    assert_eq!(config.password.as_deref(), Some("postgres"));
    assert_eq!(config.database, "postgres");
    assert_eq!(config.connect_timeout, Some(Duration::from_secs(2)));
}

/// Test that the round trip through a connection string preserves reserved characters
#[test]
fn test_round_trip_reserved_characters() {
    let descriptor = ConnectionDescriptor::new("db.example.com")
        .port(POOLER_PORT)
        .user("a b")
        .password("p@ss/word")
        .database("my db");

    let parsed = ConnectionDescriptor::from_url(&descriptor.to_url()).unwrap();
    assert_eq!(parsed.user, "a b");
    assert_eq!(parsed.password, "p@ss/word");
    assert_eq!(parsed.database, "my db");
    assert_eq!(parsed.connect_timeout, Duration::from_secs(10));
}

/// Test the dispatcher's local path
#[tokio::test]
async fn test_dispatch_to_local() {
    let (connector, notices) = connector(&[]);

    let port = connector
        .connect(ConnectionDescriptor::new("localhost"), &[])
        .await
        .unwrap();

    assert_eq!(port, 54322);
    assert_eq!(
        connector.transport().attempts(),
        vec![("localhost".to_string(), 54322, false)]
    );
    assert_eq!(
        *notices.0.lock().unwrap(),
        vec!["Connecting to local database...".to_string()]
    );
}

/// Test the dispatcher's remote path including the pooler fallback
#[tokio::test]
async fn test_dispatch_to_remote_with_fallback() {
    let host = "db.abcdefghijklmnopqrst.supabase.co";
    let (connector, notices) = connector(&[POOLER_PORT]);

    let port = connector
        .connect(
            ConnectionDescriptor::new(host)
                .port(POOLER_PORT)
                .password("secret"),
            &[],
        )
        .await
        .unwrap();

    assert_eq!(port, DIRECT_PORT);
    assert_eq!(
        connector.transport().attempts(),
        vec![
            (host.to_string(), POOLER_PORT, true),
            (host.to_string(), DIRECT_PORT, true),
        ]
    );
    assert_eq!(
        *notices.0.lock().unwrap(),
        vec![
            "Connecting to remote database...".to_string(),
            format!("Retrying... {} {}", host, DIRECT_PORT),
        ]
    );
}

/// Test that an unmanaged host is never retried
#[tokio::test]
async fn test_dispatch_to_remote_without_fallback() {
    let (connector, _) = connector(&[POOLER_PORT]);

    let err = connector
        .connect(ConnectionDescriptor::new("db.example.com").port(POOLER_PORT), &[])
        .await
        .unwrap_err();

    assert!(err.is_dial_error());
    assert_eq!(connector.transport().attempts().len(), 1);
}
