//! Server lifecycle management.

use anyhow::{Result, anyhow};
use std::net::{IpAddr, SocketAddr};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use tiny_http::Server;

use crate::log;

/// Maximum number of port binding attempts.
const MAX_PORT_RETRIES: u16 = 10;

static SHUTDOWN: AtomicBool = AtomicBool::new(false);
static SERVER: OnceLock<Arc<Server>> = OnceLock::new();

/// Bind to the specified interface and port, with automatic port retry.
pub fn bind_with_retry(interface: IpAddr, base_port: u16) -> Result<(Server, SocketAddr)> {
    let mut last_error = None;

    for offset in 0..MAX_PORT_RETRIES {
        let Some(port) = base_port.checked_add(offset) else {
            break;
        };
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                return Ok((server, addr));
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(anyhow!(
        "Failed to bind {} after {} attempts from port {}: {}",
        interface,
        MAX_PORT_RETRIES,
        base_port,
        last_error.map_or_else(|| "no port available".to_string(), |e| e.to_string())
    ))
}

/// Setup the global Ctrl+C handler. Call once at program start
///
/// - Before `register_server()`: exits immediately
/// - After `register_server()`: unblocks the accept loop so `serve` returns
pub fn setup_shutdown_handler() -> Result<()> {
    ctrlc::set_handler(|| {
        SHUTDOWN.store(true, Ordering::SeqCst);

        if let Some(server) = SERVER.get() {
            log!("serve"; "shutting down...");
            server.unblock();
        } else {
            std::process::exit(0);
        }
    })
    .map_err(|e| anyhow!("failed to set Ctrl+C handler: {}", e))
}

/// Register the HTTP server for graceful shutdown
pub fn register_server(server: Arc<Server>) {
    let _ = SERVER.set(server);
}

/// Check if shutdown has been requested
pub fn is_shutdown() -> bool {
    SHUTDOWN.load(Ordering::Relaxed)
}
