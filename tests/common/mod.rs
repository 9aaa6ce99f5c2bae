//! Shared utilities for integration tests.

use std::future::Future;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use oai_xslt_adapter::config::AdapterConfig;
use oai_xslt_adapter::{HttpServer, Shutdown};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

/// A valid upstream ListRecords document.
#[allow(dead_code)]
pub const LIST_RECORDS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<OAI-PMH xmlns="http://www.openarchives.org/OAI/2.0/">
  <responseDate>2024-05-02T10:00:00Z</responseDate>
  <request verb="ListRecords" metadataPrefix="mods">http://dspace/server/oai/request</request>
  <ListRecords>
    <record><header><identifier>oai:gupea:2077/1</identifier></header></record>
    <record><header><identifier>oai:gupea:2077/2</identifier></header></record>
  </ListRecords>
</OAI-PMH>"#;

/// Stylesheet that summarises the records so the output is easy to assert.
#[allow(dead_code)]
pub const SUMMARY_XSL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<xsl:stylesheet version="1.0"
    xmlns:xsl="http://www.w3.org/1999/XSL/Transform"
    xmlns:oai="http://www.openarchives.org/OAI/2.0/">
  <xsl:template match="/">
    <libris records="{count(//oai:record)}">
      <xsl:for-each select="//oai:identifier">
        <id><xsl:value-of select="."/></id>
      </xsl:for-each>
    </libris>
  </xsl:template>
</xsl:stylesheet>"#;

/// Start a programmable mock backend on an ephemeral port.
///
/// Every request's target (path + query) is sent on the returned channel.
pub async fn start_programmable_backend<F, Fut>(
    f: F,
) -> (SocketAddr, mpsc::UnboundedReceiver<String>)
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, Vec<u8>)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    let tx = tx.clone();
                    tokio::spawn(async move {
                        let target = read_request_target(&mut socket).await;
                        let _ = tx.send(target);

                        let (status, body) = f().await;
                        let head = format!(
                            "HTTP/1.1 {} {}\r\nContent-Type: text/xml\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                            status,
                            reason_phrase(status),
                            body.len()
                        );
                        let _ = socket.write_all(head.as_bytes()).await;
                        let _ = socket.write_all(&body).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, rx)
}

/// Backend that always answers with the same status and body.
#[allow(dead_code)]
pub async fn start_fixed_backend(
    status: u16,
    body: &'static [u8],
) -> (SocketAddr, mpsc::UnboundedReceiver<String>) {
    start_programmable_backend(move || async move { (status, body.to_vec()) }).await
}

/// An address nothing is listening on.
#[allow(dead_code)]
pub fn unused_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

/// Start the adapter against `backend`, resolving stylesheets in `xsl_dir`.
///
/// Returns the adapter address and the shutdown handle keeping it alive.
pub async fn start_adapter(backend: SocketAddr, xsl_dir: &Path) -> (SocketAddr, Shutdown) {
    let mut config = AdapterConfig::default();
    config.upstream.host = backend.ip().to_string();
    config.upstream.port = backend.port();
    config.stylesheets.root_dir = xsl_dir.to_string_lossy().into_owned();
    config.stylesheets.default_file = "default.xsl".into();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config).unwrap();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

#[allow(dead_code)]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

async fn read_request_target(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }

    String::from_utf8_lossy(&buf)
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or_default()
        .to_string()
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}
