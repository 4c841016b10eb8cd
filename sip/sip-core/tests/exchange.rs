use sipcheck_core::exchange::{self, Classification};
use sipcheck_core::{
    Code, Error, Identifiers, Method, RequestConfig, RequestConfigBuilder, Status, TransportKind,
};
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpListener, UdpSocket};
use tokio::task::JoinHandle;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn config(transport: TransportKind, server: SocketAddr) -> RequestConfigBuilder {
    let mut builder = RequestConfig::builder(server.ip().to_string(), transport);

    builder
        .server_port(server.port())
        .local_ip(server.ip())
        .timeout(Duration::from_secs(2));

    builder
}

fn code(code: u16) -> Code {
    Code::try_from(code).unwrap()
}

async fn read_request<S: AsyncRead + Unpin>(stream: &mut S) -> String {
    let mut request = Vec::new();
    let mut chunk = [0u8; 1024];

    while !request.ends_with(b"\r\n\r\n") {
        let n = stream.read(&mut chunk).await.unwrap();

        if n == 0 {
            break;
        }

        request.extend_from_slice(&chunk[..n]);
    }

    String::from_utf8(request).unwrap()
}

async fn answer<S>(mut stream: S, response: &'static [u8], keep_open: bool) -> String
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let request = read_request(&mut stream).await;

    stream.write_all(response).await.unwrap();
    stream.flush().await.unwrap();

    if keep_open {
        tokio::time::sleep(Duration::from_secs(30)).await;
    }

    request
}

/// Accepts one connection, answers the request with `response`
async fn tcp_server(response: &'static [u8], keep_open: bool) -> (SocketAddr, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();

        answer(stream, response, keep_open).await
    });

    (addr, handle)
}

/// Answers the first datagram with `response`
async fn udp_server(response: &'static [u8]) -> (SocketAddr, JoinHandle<String>) {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let addr = socket.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let mut buffer = vec![0u8; 65535];
        let (len, remote) = socket.recv_from(&mut buffer).await.unwrap();

        socket.send_to(response, remote).await.unwrap();

        String::from_utf8(buffer[..len].to_vec()).unwrap()
    });

    (addr, handle)
}

#[tokio::test]
async fn udp_options_without_expectation() {
    init_logging();

    let (addr, server) = udp_server(
        b"SIP/2.0 404 Not Found\r\nVia: SIP/2.0/UDP 127.0.0.1;rport\r\nContent-Length: 0\r\n\r\n",
    )
    .await;

    let config = config(TransportKind::Udp, addr).build().unwrap();
    let result = exchange::run(&config).await.unwrap();

    assert_eq!(result.status(), Status::Ok);
    assert_eq!(result.received(), &[code(404)]);
    assert_eq!(result.records().len(), 1);
    assert_eq!(result.verdict().message, "Received a 404");
    assert!(result.raw().is_none());
    assert_eq!(result.peer(), addr);
    assert_eq!(result.local().ip(), addr.ip());
    assert_ne!(result.local().port(), 0);

    let request = server.await.unwrap();
    assert!(request.starts_with(&format!("OPTIONS sip:127.0.0.1:{} SIP/2.0\r\n", addr.port())));
    assert!(request.contains("Via: SIP/2.0/UDP 127.0.0.1;rport;branch=z9hG4bK"));
}

#[tokio::test]
async fn tcp_request_is_rendered_from_identifiers() {
    let (addr, server) = tcp_server(b"SIP/2.0 200 OK\r\n\r\n", false).await;

    let config = config(TransportKind::Tcp, addr)
        .request_uri("sip:ping@example.com")
        .from_uri("sip:monitor@example.com")
        .build()
        .unwrap();

    let ids = Identifiers {
        branch: "z9hG4bKabcdefgh".into(),
        tag: "tagtagta".into(),
        call_id: "callidcall".into(),
        cseq: 998,
    };

    exchange::run_with(&config, ids).await.unwrap();

    assert_eq!(
        server.await.unwrap(),
        "OPTIONS sip:ping@example.com SIP/2.0\r\n\
         Via: SIP/2.0/TCP 127.0.0.1;rport;branch=z9hG4bKabcdefgh\r\n\
         Max-Forwards: 5\r\n\
         To: <sip:ping@example.com>\r\n\
         From: <sip:monitor@example.com>;tag=tagtagta\r\n\
         Call-ID: callidcall@127.0.0.1\r\n\
         CSeq: 998 OPTIONS\r\n\
         Content-Length: 0\r\n\
         \r\n"
    );
}

#[tokio::test]
async fn tcp_invite_with_provisional_responses() {
    let (addr, server) = tcp_server(
        b"SIP/2.0 100 Trying\r\nCSeq: 1 INVITE\r\n\r\n\
          SIP/2.0 180 Ringing\r\nCSeq: 1 INVITE\r\n\r\n\
          SIP/2.0 200 OK\r\nCSeq: 1 INVITE\r\n\r\n",
        true,
    )
    .await;

    let config = config(TransportKind::Tcp, addr)
        .method(Method::Invite)
        .expected("100,180,200".parse().unwrap())
        .debug(true)
        .build()
        .unwrap();

    let result = exchange::run(&config).await.unwrap();

    assert_eq!(result.status(), Status::Ok);
    assert_eq!(result.records().len(), 3);
    assert_eq!(result.received(), &[code(100), code(180), code(200)]);
    assert_eq!(
        result.verdict().message,
        "Received a 100, Received a 180, Received a 200"
    );

    let raw = result.raw().unwrap();
    assert!(raw.request.to_string().starts_with("INVITE "));
    assert_eq!(raw.response.len(), 9);
    assert_eq!(raw.response[3], "SIP/2.0 180 Ringing");

    server.abort();
}

#[tokio::test]
async fn wildcard_then_mismatch() {
    let (addr, server) = tcp_server(
        b"SIP/2.0 100 Trying\r\n\r\nSIP/2.0 486 Busy Here\r\n\r\n",
        true,
    )
    .await;

    let config = config(TransportKind::Tcp, addr)
        .method(Method::Invite)
        .expected(",200".parse().unwrap())
        .build()
        .unwrap();

    let result = exchange::run(&config).await.unwrap();

    assert_eq!(result.status(), Status::Warning);
    assert_eq!(
        result.classifications(),
        &[
            Classification::Ok {
                expected: None,
                received: Some(code(100))
            },
            Classification::Warning {
                expected: code(200),
                received: code(486)
            }
        ]
    );

    server.abort();
}

#[tokio::test]
async fn unexpected_status_code_is_a_warning() {
    let (addr, _server) = udp_server(b"SIP/2.0 403 Forbidden\r\n\r\n").await;

    let config = config(TransportKind::Udp, addr)
        .expected("200".parse().unwrap())
        .build()
        .unwrap();

    let verdict = exchange::run(&config).await.unwrap().verdict();

    assert_eq!(verdict.status, Status::Warning);
    assert!(verdict.message.contains("Received a 403 but 200 was required"));
    assert!(verdict.to_string().starts_with("SIP WARNING - "));
}

#[tokio::test]
async fn stops_reading_after_expected_responses() {
    let (addr, server) = tcp_server(
        b"SIP/2.0 100 Trying\r\n\r\nSIP/2.0 200 OK\r\n\r\n",
        true,
    )
    .await;

    let config = config(TransportKind::Tcp, addr).build().unwrap();

    let started = Instant::now();
    let result = exchange::run(&config).await.unwrap();

    assert!(started.elapsed() < Duration::from_secs(1));
    assert_eq!(result.records().len(), 1);
    assert_eq!(result.received(), &[code(100)]);

    server.abort();
}

#[tokio::test]
async fn silent_server_times_out() {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let addr = socket.local_addr().unwrap();

    let config = config(TransportKind::Udp, addr).build().unwrap();

    let started = Instant::now();
    let error = exchange::run(&config).await.unwrap_err();
    let elapsed = started.elapsed();

    assert!(
        matches!(error, Error::ResponseTimeout { transport: TransportKind::Udp, .. }),
        "{error:?}"
    );
    assert!(elapsed >= Duration::from_millis(1900), "{elapsed:?}");
    assert!(elapsed < Duration::from_secs(4), "{elapsed:?}");

    drop(socket);
}

#[tokio::test]
async fn garbage_is_a_wrong_response() {
    let (addr, _server) = tcp_server(b"GARBAGE\r\n\r\n", true).await;

    let config = config(TransportKind::Tcp, addr).build().unwrap();
    let error = exchange::run(&config).await.unwrap_err();

    match error {
        Error::WrongResponse { transport, line } => {
            assert_eq!(transport, TransportKind::Tcp);
            assert_eq!(line, "GARBAGE");
        }
        error => panic!("unexpected error {error:?}"),
    }
}

#[tokio::test]
async fn garbage_before_close_is_a_wrong_response() {
    let (addr, _server) = tcp_server(b"HTTP/1.1 400 Bad Request\r\n", false).await;

    let config = config(TransportKind::Tcp, addr).build().unwrap();
    let error = exchange::run(&config).await.unwrap_err();

    assert!(matches!(error, Error::WrongResponse { .. }), "{error:?}");
}

#[tokio::test]
async fn connection_closed_early() {
    let (addr, _server) = tcp_server(b"SIP/2.0 100 Trying\r\n\r\n", false).await;

    let config = config(TransportKind::Tcp, addr)
        .expected("100,200".parse().unwrap())
        .build()
        .unwrap();

    let error = exchange::run(&config).await.unwrap_err();

    match error {
        Error::Transport { transport, source } => {
            assert_eq!(transport, TransportKind::Tcp);
            assert_eq!(source.kind(), std::io::ErrorKind::UnexpectedEof);
        }
        error => panic!("unexpected error {error:?}"),
    }
}

#[tokio::test]
async fn connection_refused() {
    // bind and drop to get a port nobody listens on
    let addr = TcpListener::bind("127.0.0.1:0")
        .await
        .unwrap()
        .local_addr()
        .unwrap();

    let config = config(TransportKind::Tcp, addr).build().unwrap();
    let error = exchange::run(&config).await.unwrap_err();

    assert!(matches!(error, Error::Transport { .. }), "{error:?}");
    assert_eq!(error.transport_kind(), TransportKind::Tcp);

    let verdict = sipcheck_core::Verdict::from(&error);
    assert_eq!(verdict.status, Status::Critical);
    assert!(verdict.message.starts_with("TCP"), "{}", verdict.message);
}

#[tokio::test]
async fn unresolvable_server() {
    // longer than any resolver retry cycle, the lookup itself must fail
    let config = RequestConfig::builder("does-not-exist.invalid", TransportKind::Udp)
        .timeout(Duration::from_secs(120))
        .build()
        .unwrap();

    let error = exchange::run(&config).await.unwrap_err();

    match error {
        Error::AddressResolution {
            transport, address, ..
        } => {
            assert_eq!(transport, TransportKind::Udp);
            assert_eq!(address, "does-not-exist.invalid");
        }
        error => panic!("unexpected error {error:?}"),
    }
}

#[tokio::test]
async fn timeout_too_large_for_a_deadline() {
    let (addr, server) = tcp_server(b"SIP/2.0 200 OK\r\n\r\n", true).await;

    let config = config(TransportKind::Tcp, addr)
        .timeout(Duration::MAX)
        .build()
        .unwrap();

    let result = exchange::run(&config).await.unwrap();

    assert_eq!(result.status(), Status::Ok);
    assert_eq!(result.received(), &[code(200)]);

    server.abort();
}

#[tokio::test]
async fn wildcard_slot_without_status_line() {
    // the extra empty line completes the second response
    let (addr, server) = tcp_server(b"SIP/2.0 100 Trying\r\n\r\n\r\n", true).await;

    let config = config(TransportKind::Tcp, addr)
        .method(Method::Invite)
        .expected("100,".parse().unwrap())
        .build()
        .unwrap();

    let result = exchange::run(&config).await.unwrap();

    assert_eq!(result.records().len(), 2);
    assert_eq!(result.status(), Status::Ok);
    assert_eq!(
        result.verdict().message,
        "Received a 100, No status line received"
    );

    server.abort();
}
