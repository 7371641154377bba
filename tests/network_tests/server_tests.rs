//! Tests for the FastAGI server
//!
//! These tests verify:
//! - One session per connection, each with its own preamble
//! - End-to-end command exchange over TCP
//! - Close semantics and bind failures

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::thread;
use std::time::Duration;

use crossbeam::channel::{unbounded, Receiver};
use fastagi::network::{Handler, Server};
use fastagi::{AgiError, Config, Exchange, Session};

const WAIT: Duration = Duration::from_secs(5);

// =============================================================================
// Helper Functions
// =============================================================================

fn test_config() -> Config {
    Config::builder()
        .listen_addr("127.0.0.1:0")
        .read_timeout_ms(5000)
        .write_timeout_ms(5000)
        .build()
}

fn start_server<H: Handler>(server: Server, handler: H) -> SocketAddr {
    let addr = server.local_addr();
    thread::spawn(move || {
        let _ = server.run(handler);
    });
    addr
}

/// A fake Asterisk connection
struct Peer {
    reader: BufReader<TcpStream>,
    writer: TcpStream,
}

impl Peer {
    fn connect(addr: SocketAddr, preamble: &str) -> Self {
        let stream = TcpStream::connect(addr).unwrap();
        stream.set_read_timeout(Some(WAIT)).unwrap();
        let mut writer = stream.try_clone().unwrap();
        writer.write_all(preamble.as_bytes()).unwrap();

        Self {
            reader: BufReader::new(stream),
            writer,
        }
    }

    fn expect_command(&mut self) -> String {
        let mut line = String::new();
        self.reader.read_line(&mut line).unwrap();
        line.trim_end_matches('\n').to_string()
    }

    fn reply(&mut self, line: &str) {
        self.writer.write_all(format!("{line}\n").as_bytes()).unwrap();
    }

    fn expect_closed(&mut self) {
        let mut rest = Vec::new();
        assert_eq!(self.reader.read_to_end(&mut rest).unwrap(), 0);
    }
}

fn preamble(request: &str, channel: &str) -> String {
    format!("agi_request: {request}\nagi_channel: {channel}\n\n")
}

// =============================================================================
// Dispatch Tests
// =============================================================================

#[test]
fn test_sessions_have_independent_variables() {
    let (tx, rx) = unbounded::<HashMap<String, String>>();
    let addr = start_server(
        Server::bind(test_config()).unwrap(),
        move |session: Session| {
            tx.send(session.variables().clone()).unwrap();
        },
    );

    let _first = Peer::connect(addr, &preamble("agi://host/one", "SIP/1"));
    let first_vars = rx.recv_timeout(WAIT).unwrap();

    let _second = Peer::connect(
        addr,
        "agi_request: agi://host/two\nagi_channel: SIP/2\nagi_extension: 100\n\n",
    );
    let second_vars = rx.recv_timeout(WAIT).unwrap();

    assert_eq!(first_vars.len(), 2);
    assert_eq!(first_vars["agi_request"], "agi://host/one");
    assert_eq!(first_vars["agi_channel"], "SIP/1");

    assert_eq!(second_vars.len(), 3);
    assert_eq!(second_vars["agi_request"], "agi://host/two");
    assert_eq!(second_vars["agi_extension"], "100");
}

#[test]
fn test_end_to_end_answer() {
    let (tx, rx) = unbounded();
    let addr = start_server(
        Server::bind(test_config()).unwrap(),
        move |session: Session| {
            let response = session.command(&["ANSWER"]);
            let outcome = (
                response.is_ok(),
                response.result_text().to_string(),
                response.value().to_string(),
            );
            tx.send(outcome).unwrap();
            session.close().unwrap();
        },
    );

    let mut peer = Peer::connect(addr, &preamble("answer", "SIP/1"));
    assert_eq!(peer.expect_command(), "ANSWER");
    peer.reply("200 result=0");

    let (ok, result, value) = rx.recv_timeout(WAIT).unwrap();
    assert!(ok);
    assert_eq!(result, "0");
    assert_eq!(value, "");

    peer.expect_closed();
}

#[test]
fn test_handlers_run_concurrently() {
    let (tx, rx) = unbounded();
    let addr = start_server(
        Server::bind(test_config()).unwrap(),
        move |session: Session| {
            let value = session.get("NAME");
            tx.send(value.unwrap()).unwrap();
        },
    );

    // Both sessions are waiting for their reply at the same time
    let mut first = Peer::connect(addr, &preamble("one", "SIP/1"));
    let mut second = Peer::connect(addr, &preamble("two", "SIP/2"));
    assert_eq!(first.expect_command(), "GET VARIABLE NAME");
    assert_eq!(second.expect_command(), "GET VARIABLE NAME");

    // Answer in reverse order
    second.reply("200 result=1 (second)");
    assert_eq!(rx.recv_timeout(WAIT).unwrap(), "second");
    first.reply("200 result=1 (first)");
    assert_eq!(rx.recv_timeout(WAIT).unwrap(), "first");
}

#[test]
fn test_hangup_reaches_handler() {
    let (tx, rx) = unbounded();
    let addr = start_server(
        Server::bind(test_config()).unwrap(),
        move |session: Session| {
            tx.send(session.answer().map_err(|e| e.is_hangup())).unwrap();
        },
    );

    let mut peer = Peer::connect(addr, &preamble("hangup", "SIP/1"));
    peer.expect_command();
    peer.reply("HANGUP");

    assert_eq!(rx.recv_timeout(WAIT).unwrap(), Err(true));
}

#[test]
fn test_partial_preamble_then_disconnect() {
    let (tx, rx) = unbounded();
    let addr = start_server(
        Server::bind(test_config()).unwrap(),
        move |session: Session| {
            let vars = session.variables().clone();
            let failed = session.command(&["ANSWER"]).error().is_some();
            tx.send((vars, failed)).unwrap();
        },
    );

    {
        let mut stream = TcpStream::connect(addr).unwrap();
        stream.write_all(b"agi_request: partial\n").unwrap();
    }

    let (vars, failed) = rx.recv_timeout(WAIT).unwrap();
    assert_eq!(vars.len(), 1);
    assert_eq!(vars["agi_request"], "partial");
    assert!(failed);
}

#[test]
fn test_panicking_handler_does_not_stop_server() {
    let (tx, rx) = unbounded();
    let addr = start_server(
        Server::bind(test_config()).unwrap(),
        move |session: Session| {
            if session.variable("agi_request") == Some("panic") {
                panic!("handler failure");
            }
            tx.send(()).unwrap();
        },
    );

    let _bad = Peer::connect(addr, &preamble("panic", "SIP/1"));
    let _good = Peer::connect(addr, &preamble("fine", "SIP/2"));

    assert!(rx.recv_timeout(WAIT).is_ok());
}

// =============================================================================
// Lifecycle Tests
// =============================================================================

#[test]
fn test_close_is_idempotent() {
    let (tx, rx) = unbounded();
    let addr = start_server(
        Server::bind(test_config()).unwrap(),
        move |session: Session| {
            let connected_before = session.is_connected();
            let first = session.close().is_ok();
            let second = session.close().is_ok();
            tx.send((connected_before, first, second, session.is_connected()))
                .unwrap();
        },
    );

    let mut peer = Peer::connect(addr, &preamble("close", "SIP/1"));

    assert_eq!(rx.recv_timeout(WAIT).unwrap(), (true, true, true, false));
    peer.expect_closed();
}

#[test]
fn test_server_sessions_share_transcript() {
    let (exchanges_tx, exchanges_rx) = unbounded::<Exchange>();
    let (done_tx, done_rx) = unbounded();
    let server = Server::bind(test_config()).unwrap().transcript(exchanges_tx);
    let addr = start_server(server, move |session: Session| {
        done_tx.send(session.hangup().is_ok()).unwrap();
    });

    let mut peer = Peer::connect(addr, &preamble("transcript", "SIP/1"));
    assert_eq!(peer.expect_command(), "HANGUP");
    peer.reply("200 result=1");
    assert!(done_rx.recv_timeout(WAIT).unwrap());

    let exchange = exchanges_rx.recv_timeout(WAIT).unwrap();
    assert_eq!(exchange.command, "HANGUP");
    assert_eq!(exchange.summary, "{Sta:200 Res:1 Str:1}");
}

#[test]
fn test_session_reports_peer_addr() {
    let (tx, rx): (_, Receiver<Option<SocketAddr>>) = unbounded();
    let addr = start_server(
        Server::bind(test_config()).unwrap(),
        move |session: Session| {
            tx.send(session.peer_addr()).unwrap();
        },
    );

    let peer = Peer::connect(addr, &preamble("peer", "SIP/1"));
    let seen = rx.recv_timeout(WAIT).unwrap();

    assert_eq!(seen, Some(peer.writer.local_addr().unwrap()));
}

// =============================================================================
// Bind Failures
// =============================================================================

#[test]
fn test_bind_conflict_is_fatal() {
    let taken = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = taken.local_addr().unwrap().to_string();

    let config = Config::builder().listen_addr(addr.as_str()).build();
    match Server::bind(config) {
        Err(AgiError::Bind { addr: failed, .. }) => assert_eq!(failed, addr),
        Err(other) => panic!("Expected bind error, got {:?}", other),
        Ok(_) => panic!("Expected bind error, got a server"),
    }
}

#[test]
fn test_bind_invalid_address() {
    let config = Config::builder().listen_addr("not an address").build();
    assert!(matches!(Server::bind(config), Err(AgiError::Bind { .. })));
}
