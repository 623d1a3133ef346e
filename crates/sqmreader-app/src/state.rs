//! Application state and user actions
//!
//! Every action that touches the serial port runs as one blocking task and
//! is awaited before the next action starts, so requests never overlap.

use sqmreader_core::prelude::*;
use std::sync::Arc;
use tokio::sync::Mutex;

pub struct AppState {
    manager: Arc<Mutex<ConnectionManager>>,
    display: Mutex<ReadingDisplay>,
    ports: Mutex<Vec<String>>,
    selected: Mutex<Option<String>>,
}

impl AppState {
    pub fn new(config: ConnectionConfig) -> Self {
        Self::with_manager(ConnectionManager::new(config))
    }

    /// Wrap an existing manager, e.g. one with a transport already attached
    pub fn with_manager(manager: ConnectionManager) -> Self {
        let display = ReadingDisplay {
            status: match manager.port_name() {
                Some(port) => format!("Connected to {}", port),
                None => ReadingDisplay::default().status,
            },
            ..ReadingDisplay::default()
        };
        Self {
            manager: Arc::new(Mutex::new(manager)),
            display: Mutex::new(display),
            ports: Mutex::new(Vec::new()),
            selected: Mutex::new(None),
        }
    }

    /// Re-enumerate ports and select the first one, if any
    pub async fn refresh_ports(&self) -> Vec<String> {
        let ports = tokio::task::spawn_blocking(ConnectionManager::list_ports)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("port enumeration task failed: {}", e);
                Vec::new()
            });
        self.set_ports(ports.clone()).await;
        ports
    }

    /// Replace the known port list; selection moves to the first entry
    pub async fn set_ports(&self, ports: Vec<String>) {
        *self.selected.lock().await = ports.first().cloned();
        *self.ports.lock().await = ports;
    }

    pub async fn ports(&self) -> Vec<String> {
        self.ports.lock().await.clone()
    }

    pub async fn selected(&self) -> Option<String> {
        self.selected.lock().await.clone()
    }

    /// Select a port by 1-based index into the last listing, or by name
    pub async fn select(&self, choice: &str) -> Result<String, String> {
        let choice = choice.trim();
        let ports = self.ports.lock().await;
        let port = match choice.parse::<usize>() {
            Ok(n) if n >= 1 && n <= ports.len() => ports[n - 1].clone(),
            Ok(n) => return Err(format!("No port #{} (have {})", n, ports.len())),
            Err(_) if choice.is_empty() => return Err("No port given".to_string()),
            Err(_) => choice.to_string(),
        };
        drop(ports);
        *self.selected.lock().await = Some(port.clone());
        Ok(port)
    }

    /// Connect to `port`, or to the selected port when `None`
    pub async fn connect(&self, port: Option<String>) -> Notice {
        let port = match port {
            Some(p) => p,
            None => self.selected().await.unwrap_or_default(),
        };
        let manager = Arc::clone(&self.manager);
        let target = port.clone();
        let result = tokio::task::spawn_blocking(move || manager.blocking_lock().connect(&target))
            .await
            .unwrap_or_else(|e| Err(ProtocolError::ConnectionFailed {
                port: port.clone(),
                reason: e.to_string(),
            }));

        if let Err(e) = &result {
            tracing::error!("{}", e);
        }
        self.display.lock().await.apply_connect(port.trim(), &result)
    }

    /// Request one reading and update the display fields
    pub async fn read(&self) -> Notice {
        let manager = Arc::clone(&self.manager);
        let result = tokio::task::spawn_blocking(move || manager.blocking_lock().request_reading())
            .await
            .unwrap_or_else(|e| Err(ProtocolError::Communication(e.to_string())));
        self.display.lock().await.apply_reading(&result)
    }

    pub async fn disconnect(&self) -> Notice {
        self.manager.lock().await.disconnect();
        self.display.lock().await.apply_disconnect()
    }

    pub async fn is_connected(&self) -> bool {
        self.manager.lock().await.is_connected()
    }

    /// Current display fields
    pub async fn display(&self) -> ReadingDisplay {
        self.display.lock().await.clone()
    }
}
