use keystone_dns_infrastructure::dns::DnsServer;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use tokio::net::{TcpListener, UdpSocket};
use tracing::info;

pub async fn start_dns_server(bind_addr: String, server: Arc<DnsServer>) -> anyhow::Result<()> {
    let socket_addr = SocketAddr::from_str(&bind_addr)?;

    info!(bind_address = %socket_addr, "Starting DNS server");

    let udp_socket = UdpSocket::bind(socket_addr).await?;
    info!(protocol = "UDP", "DNS server listening");

    let tcp_listener = TcpListener::bind(socket_addr).await?;
    info!(protocol = "TCP", "DNS server listening");

    info!("DNS server ready to accept queries");

    tokio::try_join!(
        Arc::clone(&server).serve_udp(udp_socket),
        server.serve_tcp(tcp_listener),
    )?;

    Ok(())
}
