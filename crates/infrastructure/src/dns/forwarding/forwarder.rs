use super::message_builder::MessageBuilder;
use crate::dns::wire::{read_with_length_prefix, send_with_length_prefix};
use async_trait::async_trait;
use hickory_proto::op::Message;
use hickory_proto::rr::Record;
use keystone_dns_domain::{DomainError, Question};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{TcpStream, UdpSocket};
use tracing::{debug, warn};

const MAX_UDP_RESPONSE_SIZE: usize = 4096;

/// Sends the original question upstream when the server lacks authority.
#[async_trait]
pub trait Forwarder: Send + Sync {
    async fn forward(&self, question: &Question) -> Vec<Record>;
}

/// Tries each configured upstream in order: UDP first, TCP retry on
/// truncation. The first non-error reply wins, answers and all. An empty
/// upstream list, or `"!"` as the first entry, disables forwarding.
pub struct ForwarderClient {
    upstreams: Vec<String>,
    exchange_timeout: Duration,
}

impl ForwarderClient {
    pub fn new(upstreams: Vec<String>, exchange_timeout: Duration) -> Self {
        Self {
            upstreams,
            exchange_timeout,
        }
    }

    async fn exchange_udp(
        &self,
        server: SocketAddr,
        request: &[u8],
    ) -> Result<Message, DomainError> {
        let bind_addr: SocketAddr = if server.is_ipv4() {
            ([0, 0, 0, 0], 0).into()
        } else {
            (std::net::Ipv6Addr::UNSPECIFIED, 0).into()
        };

        let socket = UdpSocket::bind(bind_addr)
            .await
            .map_err(|e| DomainError::IoError(format!("Failed to bind UDP socket: {}", e)))?;

        socket.connect(server).await.map_err(|e| DomainError::TransportError {
            server: server.to_string(),
            detail: e.to_string(),
        })?;

        socket.send(request).await.map_err(|e| DomainError::TransportError {
            server: server.to_string(),
            detail: e.to_string(),
        })?;

        let mut response = vec![0u8; MAX_UDP_RESPONSE_SIZE];
        let len = tokio::time::timeout(self.exchange_timeout, socket.recv(&mut response))
            .await
            .map_err(|_| DomainError::TransportTimeout {
                server: server.to_string(),
            })?
            .map_err(|e| DomainError::TransportError {
                server: server.to_string(),
                detail: e.to_string(),
            })?;

        Message::from_vec(&response[..len])
            .map_err(|e| DomainError::InvalidDnsMessage(format!("Bad upstream response: {}", e)))
    }

    async fn exchange_tcp(
        &self,
        server: SocketAddr,
        request: &[u8],
    ) -> Result<Message, DomainError> {
        let mut stream = tokio::time::timeout(self.exchange_timeout, TcpStream::connect(server))
            .await
            .map_err(|_| DomainError::TransportTimeout {
                server: server.to_string(),
            })?
            .map_err(|e| DomainError::TransportError {
                server: server.to_string(),
                detail: e.to_string(),
            })?;

        tokio::time::timeout(self.exchange_timeout, async {
            send_with_length_prefix(&mut stream, request).await?;
            read_with_length_prefix(&mut stream).await
        })
        .await
        .map_err(|_| DomainError::TransportTimeout {
            server: server.to_string(),
        })?
        .and_then(|bytes| {
            Message::from_vec(&bytes).map_err(|e| {
                DomainError::InvalidDnsMessage(format!("Bad upstream response: {}", e))
            })
        })
    }
}

#[async_trait]
impl Forwarder for ForwarderClient {
    async fn forward(&self, question: &Question) -> Vec<Record> {
        match self.upstreams.first() {
            None => return vec![],
            Some(first) if first.trim() == "!" => {
                debug!(
                    name = %question.name,
                    "Forwarding disabled by operator, answering empty"
                );
                return vec![];
            }
            Some(_) => {}
        }

        let request = match MessageBuilder::build_query(question) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(name = %question.name, error = %e, "Cannot build forward query");
                return vec![];
            }
        };

        for upstream in &self.upstreams {
            let server: SocketAddr = match upstream.trim().parse() {
                Ok(addr) => addr,
                Err(e) => {
                    warn!(upstream = %upstream, error = %e, "Skipping unparseable upstream");
                    continue;
                }
            };

            let reply = match self.exchange_udp(server, &request).await {
                Ok(reply) if reply.truncated() => {
                    debug!(server = %server, "Truncated reply, retrying over TCP");
                    self.exchange_tcp(server, &request).await
                }
                other => other,
            };

            match reply {
                Ok(message) => {
                    debug!(
                        server = %server,
                        answers = message.answers().len(),
                        "Forwarder reply"
                    );
                    return message.answers().to_vec();
                }
                Err(e) => {
                    warn!(server = %server, error = %e, "Forwarder exchange failed, trying next");
                }
            }
        }

        vec![]
    }
}
