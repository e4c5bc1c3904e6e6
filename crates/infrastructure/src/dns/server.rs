//! UDP and TCP server frontend.
//!
//! Every inbound message fans out one lookup per question; answers are
//! reassembled in question order. DNS-level failure travels as an RCODE,
//! never as a dropped reply; only malformed input and bogus
//! response-flagged messages are dropped.

use crate::dns::forwarding::RecordTypeMapper;
use crate::dns::wire::{read_with_length_prefix, send_with_length_prefix};
use futures::future::join_all;
use hickory_proto::op::{Message, MessageType, Query, ResponseCode};
use hickory_proto::rr::DNSClass;
use keystone_dns_application::ports::Resolution;
use keystone_dns_application::use_cases::HandleQuestionUseCase;
use keystone_dns_domain::{DomainError, Question};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream, UdpSocket};
use tracing::{debug, error, info, warn};

const MAX_UDP_MESSAGE_SIZE: usize = 4096;

pub struct DnsServer {
    use_case: Arc<HandleQuestionUseCase>,
    recursion_available: bool,
}

impl DnsServer {
    pub fn new(use_case: Arc<HandleQuestionUseCase>, recursion_available: bool) -> Self {
        Self {
            use_case,
            recursion_available,
        }
    }

    pub async fn serve_udp(self: Arc<Self>, socket: UdpSocket) -> Result<(), DomainError> {
        let socket = Arc::new(socket);
        let mut buf = vec![0u8; MAX_UDP_MESSAGE_SIZE];

        loop {
            let (len, peer) = socket
                .recv_from(&mut buf)
                .await
                .map_err(|e| DomainError::IoError(format!("UDP receive failed: {}", e)))?;
            let request = buf[..len].to_vec();

            let server = Arc::clone(&self);
            let socket = Arc::clone(&socket);
            tokio::spawn(async move {
                if let Some(reply) = server.handle_message(&request, peer).await {
                    if let Err(e) = socket.send_to(&reply, peer).await {
                        error!(client = %peer, error = %e, "Failed to send UDP reply");
                    }
                }
            });
        }
    }

    pub async fn serve_tcp(self: Arc<Self>, listener: TcpListener) -> Result<(), DomainError> {
        loop {
            let (stream, peer) = listener
                .accept()
                .await
                .map_err(|e| DomainError::IoError(format!("TCP accept failed: {}", e)))?;

            let server = Arc::clone(&self);
            tokio::spawn(async move {
                if let Err(e) = server.serve_tcp_connection(stream, peer).await {
                    debug!(client = %peer, error = %e, "TCP connection closed");
                }
            });
        }
    }

    async fn serve_tcp_connection(
        &self,
        mut stream: TcpStream,
        peer: SocketAddr,
    ) -> Result<(), DomainError> {
        loop {
            let request = match read_with_length_prefix(&mut stream).await {
                Ok(bytes) => bytes,
                // EOF or reset; the connection is simply done.
                Err(_) => return Ok(()),
            };

            if let Some(reply) = self.handle_message(&request, peer).await {
                send_with_length_prefix(&mut stream, &reply).await?;
            }
        }
    }

    /// Parses one inbound message and produces the wire-format reply, or
    /// `None` when the message must be silently dropped.
    pub async fn handle_message(&self, bytes: &[u8], peer: SocketAddr) -> Option<Vec<u8>> {
        let request = match Message::from_vec(bytes) {
            Ok(message) => message,
            Err(e) => {
                warn!(client = %peer, error = %e, "Dropping malformed message");
                return None;
            }
        };

        if request.message_type() == MessageType::Response {
            // Responses sent at us are bogus.
            warn!(client = %peer, id = request.id(), "Dropping query flagged as a response");
            return None;
        }

        let queries: Vec<Query> = request.queries().to_vec();
        let total = queries.len();
        for (i, query) in queries.iter().enumerate() {
            info!(
                name = %query.name(),
                record_type = ?query.query_type(),
                client = %peer,
                question = i + 1,
                of = total,
                "DNS query received"
            );
        }

        // One concurrent lookup per question; join_all keeps question order.
        let results: Vec<Resolution> =
            join_all(queries.iter().map(|query| self.answer_query(query))).await;

        let any_answers = results.iter().any(|r| !r.records.is_empty());
        let authoritative = !results.is_empty() && results.iter().all(|r| r.authoritative);

        let mut response = Message::new();
        response.set_id(request.id());
        response.set_message_type(MessageType::Response);
        response.set_op_code(request.op_code());
        response.set_authoritative(authoritative);
        response.set_recursion_desired(request.recursion_desired());
        response.set_recursion_available(self.recursion_available);
        response.set_response_code(if any_answers {
            ResponseCode::NoError
        } else {
            ResponseCode::NXDomain
        });
        for query in queries {
            response.add_query(query);
        }
        for resolution in results {
            for record in resolution.records.iter() {
                response.add_answer(record.clone());
            }
        }

        match response.to_vec() {
            Ok(reply) => Some(reply),
            Err(e) => {
                error!(client = %peer, error = %e, "Failed to serialize reply");
                None
            }
        }
    }

    async fn answer_query(&self, query: &Query) -> Resolution {
        if query.query_class() != DNSClass::IN {
            debug!(class = ?query.query_class(), "Unsupported query class");
            return Resolution::empty();
        }

        let Some(record_type) = RecordTypeMapper::from_wire(query.query_type()) else {
            debug!(record_type = ?query.query_type(), "Unsupported record type");
            return Resolution::empty();
        };

        let question = Question::new(&query.name().to_utf8(), record_type);
        self.use_case.execute(&question).await
    }
}
