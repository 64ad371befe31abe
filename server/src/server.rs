use adns_message::{respond, ZoneStore};
use bytes::Bytes;
use futures::prelude::*;

use std::net::SocketAddr;

use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::sync::Mutex;
use tokio_util::codec::BytesCodec;
use tokio_util::udp::UdpFramed;
use tracing::{debug, error, info, warn};

type Result<T> = anyhow::Result<T>;

/// RFC1035 - UDP messages are restricted to 512 bytes.
const MAX_DATAGRAM_LEN: usize = 512;

pub(crate) struct Server {
    socket: UdpSocket,
    zones: Arc<ZoneStore>,
}

impl Server {
    pub async fn bind(local_addr: SocketAddr, zones: Arc<ZoneStore>) -> Result<Self> {
        let socket = UdpSocket::bind(&local_addr).await?;
        Ok(Self { socket, zones })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    pub async fn run(self) -> Result<()> {
        info!("Listening on {}", self.local_addr()?);

        let (sink, mut stream) = UdpFramed::new(self.socket, BytesCodec::new()).split();
        let sink = Arc::new(Mutex::new(sink));

        loop {
            let (bytes, addr) = match stream.next().await {
                Some(Ok((b, a))) => (b, a),
                Some(Err(e)) => {
                    error!("Error getting next value in stream: {}", e);
                    continue;
                }
                None => {
                    warn!("No value available from stream, closing");
                    return Ok(());
                }
            };

            if bytes.len() > MAX_DATAGRAM_LEN {
                warn!(
                    "{}: dropping datagram of {} bytes, limit is {}",
                    addr,
                    bytes.len(),
                    MAX_DATAGRAM_LEN
                );
                continue;
            }

            let sink = sink.clone();
            let zones = self.zones.clone();

            tokio::spawn(async move {
                let buf = match respond(bytes.as_ref(), &zones) {
                    Ok(buf) => buf,
                    Err(e) => {
                        // No error responses, the client will time out.
                        warn!("{}: dropping query: {}", addr, e);
                        return;
                    }
                };

                debug!("Sending to: {}, length: {}", addr, buf.len());
                if let Err(e) = sink.lock().await.send((Bytes::from(buf), addr)).await {
                    error!("Error sending buffer to client: {}", e);
                }
            });
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use adns_message::{Header, Question, Record, Type, Zone};
    use std::time::Duration;
    use tokio::time::timeout;

    fn query(id: u16, name: &str) -> Vec<u8> {
        let header = Header {
            id,
            rd: true,
            qd_count: 1,
            ..Default::default()
        };
        let mut buf = Vec::new();
        header.to_bytes(&mut buf);
        Question::new(name.parse().unwrap(), Type::A)
            .to_bytes(&mut buf)
            .unwrap();
        buf
    }

    async fn start() -> SocketAddr {
        let zones = ZoneStore::new(vec![Zone::new("example.com.")
            .with(Type::A, Record::new(300, "93.184.216.34"))
            .with(Type::A, Record::new(300, "93.184.216.35"))]);
        let server = Server::bind("127.0.0.1:0".parse().unwrap(), Arc::new(zones))
            .await
            .unwrap();
        let addr = server.local_addr().unwrap();
        tokio::spawn(server.run());
        addr
    }

    #[tokio::test]
    async fn test_answers_query() {
        let addr = start().await;
        let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        client.connect(addr).await.unwrap();

        let query = query(4242, "example.com");
        client.send(&query).await.unwrap();

        let mut buf = vec![0u8; 1024];
        let len = timeout(Duration::from_secs(5), client.recv(&mut buf))
            .await
            .unwrap()
            .unwrap();
        let buf = &buf[..len];

        let header = Header::from_bytes(buf).unwrap();
        assert_eq!(header.id, 4242);
        assert!(header.qr);
        assert!(header.aa);
        assert_eq!(header.an_count, 2);
        assert_eq!(&buf[12..query.len()], &query[12..]);
        assert_eq!(len, query.len() + 2 * 16);
        assert_eq!(&buf[len - 4..], &[93, 184, 216, 35]);
    }

    #[tokio::test]
    async fn test_drops_unknown_zone() {
        let addr = start().await;
        let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        client.connect(addr).await.unwrap();

        client.send(&query(1, "example.org")).await.unwrap();
        client.send(&[0u8; 8]).await.unwrap();
        client.send(&query(2, "example.com")).await.unwrap();

        // Only the last query gets an answer.
        let mut buf = vec![0u8; 1024];
        let len = timeout(Duration::from_secs(5), client.recv(&mut buf))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(Header::from_bytes(&buf[..len]).unwrap().id, 2);
    }

    #[tokio::test]
    async fn test_drops_oversized_datagram() {
        let addr = start().await;
        let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        client.connect(addr).await.unwrap();

        // Answerable if it were accepted: trailing bytes are never read.
        let mut oversized = query(1, "example.com");
        oversized.resize(MAX_DATAGRAM_LEN + 1, 0);
        client.send(&oversized).await.unwrap();
        client.send(&query(3, "example.com")).await.unwrap();

        let mut buf = vec![0u8; 1024];
        let len = timeout(Duration::from_secs(5), client.recv(&mut buf))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(Header::from_bytes(&buf[..len]).unwrap().id, 3);

        // Nothing else follows.
        assert!(
            timeout(Duration::from_millis(250), client.recv(&mut buf))
                .await
                .is_err()
        );
    }
}
