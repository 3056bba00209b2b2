use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use socket2::{Domain, Protocol, Socket, Type};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

mod config;
mod handler;
mod http;
mod logger;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = config::Config::load()?;
    logger::init(&cfg)?;

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }

    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.socket_addr()?;

    // A missing asset root is a configuration error; fail before the ready
    // banner rather than answering every request with 404.
    let site = Arc::new(config::SiteContext::new(&cfg)?);

    let listener = create_reusable_listener(addr)?;

    logger::log_server_start(&addr, &cfg);

    let cfg = Arc::new(cfg);
    loop {
        match listener.accept().await {
            Ok((stream, peer_addr)) => {
                handle_connection(stream, peer_addr, Arc::clone(&cfg), Arc::clone(&site));
            }
            Err(e) => {
                logger::log_error(&format!("Failed to accept connection: {e}"));
            }
        }
    }
}

/// Handle a single connection in a spawned task.
///
/// Wraps the TCP stream in `TokioIo`, serves it over HTTP/1.1 with the
/// configured keep-alive and timeout settings, and hands every request to
/// the router.
fn handle_connection(
    stream: tokio::net::TcpStream,
    peer_addr: SocketAddr,
    cfg: Arc<config::Config>,
    site: Arc<config::SiteContext>,
) {
    tokio::spawn(async move {
        let io = TokioIo::new(stream);

        let timeout_duration = std::time::Duration::from_secs(std::cmp::max(
            cfg.performance.read_timeout,
            cfg.performance.write_timeout,
        ));

        let mut builder = http1::Builder::new();
        builder.keep_alive(cfg.performance.keep_alive_timeout > 0);

        let conn_cfg = Arc::clone(&cfg);
        let conn = builder.serve_connection(
            io,
            service_fn(move |req| {
                let cfg = Arc::clone(&conn_cfg);
                let site = Arc::clone(&site);
                async move { handler::handle_request(req, peer_addr, &cfg, &site).await }
            }),
        );

        match tokio::time::timeout(timeout_duration, conn).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => logger::log_connection_error(&err),
            Err(_) => {
                logger::log_warning(&format!(
                    "Connection from {peer_addr} timed out after {} seconds",
                    timeout_duration.as_secs()
                ));
            }
        }
    });
}

/// Create a `TcpListener` with `SO_REUSEADDR` and `SO_REUSEPORT` enabled,
/// so a quick process restart is not blocked by sockets in `TIME_WAIT`.
fn create_reusable_listener(addr: SocketAddr) -> std::io::Result<TcpListener> {
    let domain = if addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;

    socket.set_reuse_port(true)?;
    socket.set_reuse_address(true)?;

    // Non-blocking mode is required before handing the socket to tokio.
    socket.set_nonblocking(true)?;

    socket.bind(&addr.into())?;
    socket.listen(128)?;

    let std_listener: std::net::TcpListener = socket.into();
    TcpListener::from_std(std_listener)
}
