//! # Module Server - Transport HTTP basé sur Axum
//!
//! [`Server`] publie un device UPnP : toutes les requêtes reçues sont
//! confiées au [`RequestHandler`] fourni au démarrage. Le serveur tourne
//! dans une tâche tokio et s'arrête proprement sur [`DeviceTransport::stop`].
//!
//! Sur un runtime multi-thread, `stop` ne rend la main qu'une fois la socket
//! d'écoute fermée : le port peut être réutilisé immédiatement.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::Request;
use parking_lot::Mutex;
use pmoupnp::NetworkConfig;
use pmoupnp::handler::RequestHandler;
use pmoupnp::transport::{DeviceTransport, TransportError};
use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Délai laissé aux connexions en cours avant l'abandon de la tâche serveur.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

struct Running {
    local_addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    join_handle: JoinHandle<()>,
    runtime: Handle,
}

/// Serveur HTTP d'un device.
pub struct Server {
    name: String,
    running: Mutex<Option<Running>>,
}

impl Server {
    /// Crée un serveur arrêté.
    ///
    /// # Exemple
    ///
    /// ```rust
    /// # use pmoserver::Server;
    /// let server = Server::new("PMO-MediaServer");
    /// ```
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            running: Mutex::new(None),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Adresse effectivement écoutée, si le serveur tourne.
    ///
    /// Utile avec un port `0`, choisi par le système.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.running.lock().as_ref().map(|r| r.local_addr)
    }
}

impl Default for Server {
    fn default() -> Self {
        Self::new("PMO-MediaServer")
    }
}

impl DeviceTransport for Server {
    fn start(
        &self,
        network: &NetworkConfig,
        handler: Arc<dyn RequestHandler>,
    ) -> Result<(), TransportError> {
        let mut running = self.running.lock();
        if running.is_some() {
            return Err(TransportError::AlreadyRunning);
        }

        let runtime = Handle::try_current().map_err(|_| TransportError::NoRuntime)?;
        let addr = network.socket_addr();
        let bind_error = |source| TransportError::Bind { addr, source };

        // Bind synchrone : l'erreur d'adresse remonte directement à l'appelant.
        let std_listener = std::net::TcpListener::bind(addr).map_err(bind_error)?;
        std_listener.set_nonblocking(true).map_err(bind_error)?;
        let local_addr = std_listener.local_addr().map_err(bind_error)?;
        let listener = {
            let _guard = runtime.enter();
            tokio::net::TcpListener::from_std(std_listener).map_err(bind_error)?
        };

        let router = Router::new().fallback(move |request: Request| {
            let handler = handler.clone();
            async move { handler.handle(request).await }
        });

        let (shutdown, shutdown_rx) = oneshot::channel::<()>();
        let name = self.name.clone();
        let join_handle = runtime.spawn(async move {
            let served = axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await;
            match served {
                Ok(()) => info!(server = %name, "🛑 HTTP server stopped"),
                Err(e) => error!(server = %name, "❌ HTTP server failed: {}", e),
            }
        });

        info!(server = %self.name, "🚀 Server running at http://{}", local_addr);
        *running = Some(Running {
            local_addr,
            shutdown,
            join_handle,
            runtime,
        });
        Ok(())
    }

    fn stop(&self) -> Result<(), TransportError> {
        let Some(running) = self.running.lock().take() else {
            return Ok(());
        };
        let Running {
            local_addr,
            shutdown,
            mut join_handle,
            runtime,
        } = running;

        info!(server = %self.name, addr = %local_addr, "Stopping HTTP server");
        // Une erreur signifie que la tâche est déjà terminée.
        let _ = shutdown.send(());

        if join_handle.is_finished() {
            return Ok(());
        }
        if !can_block_on(&runtime) {
            warn!(
                server = %self.name,
                addr = %local_addr,
                "Current-thread runtime, listener will be released asynchronously"
            );
            return Ok(());
        }

        // La tâche serveur ferme la socket d'écoute avant de drainer les
        // connexions : attendre sa fin garantit que le port est libéré.
        let drained = block_on(&runtime, async {
            if tokio::time::timeout(DRAIN_TIMEOUT, &mut join_handle)
                .await
                .is_ok()
            {
                return true;
            }
            join_handle.abort();
            let _ = (&mut join_handle).await;
            false
        });
        if !drained {
            warn!(
                server = %self.name,
                "⏱️ Connections not drained after {:?}, server task aborted",
                DRAIN_TIMEOUT
            );
        }
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running.lock().is_some()
    }
}

// `block_in_place` n'existe que sur un runtime multi-thread, et seul un
// runtime multi-thread fait progresser la tâche serveur pendant qu'on bloque.
fn can_block_on(runtime: &Handle) -> bool {
    if runtime.runtime_flavor() != RuntimeFlavor::MultiThread {
        return false;
    }
    match Handle::try_current() {
        Ok(current) => current.runtime_flavor() == RuntimeFlavor::MultiThread,
        Err(_) => true,
    }
}

fn block_on<F: Future>(runtime: &Handle, future: F) -> F::Output {
    if Handle::try_current().is_ok() {
        tokio::task::block_in_place(|| runtime.block_on(future))
    } else {
        runtime.block_on(future)
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};
    use std::net::{IpAddr, Ipv4Addr};

    struct Echo;

    #[async_trait]
    impl RequestHandler for Echo {
        async fn handle(&self, request: Request) -> Response {
            (StatusCode::OK, request.uri().path().to_string()).into_response()
        }
    }

    fn loopback(port: u16) -> NetworkConfig {
        NetworkConfig::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port)
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_serves_handler_until_stopped() {
        let server = Server::new("test");
        server.start(&loopback(0), Arc::new(Echo)).unwrap();
        assert!(server.is_running());

        let addr = server.local_addr().unwrap();
        let body = reqwest::get(format!("http://{}/some/path", addr))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert_eq!(body, "/some/path");

        server.stop().unwrap();
        assert!(!server.is_running());
        assert!(server.local_addr().is_none());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_stop_releases_port() {
        let port = {
            let free = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            free.local_addr().unwrap().port()
        };
        let server = Server::new("test");

        server.start(&loopback(port), Arc::new(Echo)).unwrap();
        server.stop().unwrap();

        // Le port doit être libre dès le retour de `stop`
        let rebound = std::net::TcpListener::bind(("127.0.0.1", port));
        assert!(rebound.is_ok(), "port {} still bound after stop", port);
        drop(rebound);

        server.start(&loopback(port), Arc::new(Echo)).unwrap();
        assert_eq!(server.local_addr().map(|a| a.port()), Some(port));
        server.stop().unwrap();
    }

    #[tokio::test]
    async fn test_double_start_is_rejected() {
        let server = Server::new("test");
        server.start(&loopback(0), Arc::new(Echo)).unwrap();
        assert!(matches!(
            server.start(&loopback(0), Arc::new(Echo)),
            Err(TransportError::AlreadyRunning)
        ));
        server.stop().unwrap();
    }

    #[tokio::test]
    async fn test_bind_failure_is_reported() {
        let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = taken.local_addr().unwrap().port();

        let server = Server::new("test");
        let err = server.start(&loopback(port), Arc::new(Echo)).unwrap_err();
        assert!(matches!(err, TransportError::Bind { .. }));
        assert!(!server.is_running());
    }

    #[test]
    fn test_start_without_runtime_fails() {
        let server = Server::new("test");
        assert!(matches!(
            server.start(&loopback(0), Arc::new(Echo)),
            Err(TransportError::NoRuntime)
        ));
    }

    #[test]
    fn test_stop_when_stopped_is_noop() {
        let server = Server::default();
        assert!(server.stop().is_ok());
        assert!(!server.is_running());
    }
}
