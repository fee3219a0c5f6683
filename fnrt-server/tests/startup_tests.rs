//! Server lifecycle tests driven by real handler processes

use fnrt_config::RuntimeConfig;
use fnrt_server::Server;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

fn config(port: u16) -> RuntimeConfig {
    let mut config = RuntimeConfig::default();
    config.server.bind_address = "127.0.0.1".to_string();
    config.server.port = port;
    config.auth.public = true;
    config
}

fn free_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

#[tokio::test]
async fn test_server_stops_when_handler_exits() {
    let mut config = config(0);
    config.handler.is_binary = true;
    config.handler.path = "/bin/false".to_string();

    let result = tokio::time::timeout(Duration::from_secs(15), Server::new(config).start())
        .await
        .expect("server kept running after its handler exited");

    let error = result.unwrap_err();
    assert!(error.to_string().contains("Forked function has terminated"));
}

#[tokio::test]
async fn test_stalled_client_does_not_hold_shutdown() {
    let dir = tempfile::tempdir().unwrap();
    let bridge = dir.path().join("bridge.sh");
    std::fs::write(&bridge, "sleep 1\nexit 1\n").unwrap();

    let port = free_port();
    let mut config = config(port);
    config.server.drain_timeout = Duration::from_millis(200);
    config.handler.runtime_binary = "/bin/sh".to_string();
    config.handler.runtime_bridge = bridge.to_string_lossy().into_owned();

    let server = tokio::spawn(Server::new(config).start());

    let mut stream = loop {
        match TcpStream::connect(("127.0.0.1", port)).await {
            Ok(stream) => break stream,
            Err(_) => tokio::time::sleep(Duration::from_millis(20)).await,
        }
    };
    // Announce a body that never fully arrives
    stream
        .write_all(b"POST / HTTP/1.1\r\nHost: localhost\r\nContent-Length: 100\r\n\r\npartial")
        .await
        .unwrap();

    let result = tokio::time::timeout(Duration::from_secs(15), server)
        .await
        .expect("open connection kept the server alive")
        .unwrap();

    assert!(result.is_err());
    drop(stream);
}
