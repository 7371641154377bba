//! Tests for the command/response engine
//!
//! These tests verify:
//! - Successful, failed and hung-up exchanges
//! - Transport failures
//! - Serialization of concurrent commands

use std::io::{Cursor, ErrorKind};
use std::sync::Arc;
use std::thread;

use fastagi::{AgiError, Session};

use crate::common::{scripted_session, BrokenWriter, PREAMBLE};

// =============================================================================
// Successful Exchanges
// =============================================================================

#[test]
fn test_command_answer() {
    let (session, output) = scripted_session(PREAMBLE, "200 result=0\n");

    let response = session.command(&["ANSWER"]);

    assert_eq!(output.contents(), "ANSWER\n");
    assert!(response.is_ok());
    assert_eq!(response.status(), Some(200));
    assert_eq!(response.result(), Some(0));
    assert_eq!(response.result_text(), "0");
    assert_eq!(response.value(), "");
}

#[test]
fn test_command_value() {
    let (session, output) = scripted_session(PREAMBLE, "200 result=1 (1000)\n");

    let value = session
        .command(&["GET VARIABLE", "CALLERID(num)"])
        .into_value()
        .unwrap();

    assert_eq!(output.contents(), "GET VARIABLE CALLERID(num)\n");
    assert_eq!(value, "1000");
}

#[test]
fn test_commands_in_sequence() {
    let (session, output) =
        scripted_session(PREAMBLE, "200 result=0\n200 result=1 (x)\n200 result=-1\n");

    assert_eq!(session.command(&["ANSWER"]).result(), Some(0));
    assert_eq!(session.command(&["GET VARIABLE", "A"]).value(), "x");
    assert_eq!(session.command(&["HANGUP"]).result(), Some(-1));

    assert_eq!(output.lines(), vec!["ANSWER", "GET VARIABLE A", "HANGUP"]);
}

// =============================================================================
// Failed Exchanges
// =============================================================================

#[test]
fn test_command_non_200_keeps_fields() {
    let (session, _output) = scripted_session(PREAMBLE, "511 result=-1 (Dead channel)\n");

    let response = session.command(&["STREAM FILE", "x", "\"\"", "0"]);

    assert!(!response.is_ok());
    assert_eq!(response.status(), Some(511));
    assert_eq!(response.result(), Some(-1));
    assert_eq!(response.value(), "Dead channel");
    match response.error() {
        Some(AgiError::Status { status, line }) => {
            assert_eq!(*status, 511);
            assert_eq!(line, "511 result=-1 (Dead channel)");
        }
        other => panic!("Expected status error, got {:?}", other),
    }
}

#[test]
fn test_command_status_without_result_is_parse_error() {
    let (session, _output) = scripted_session(PREAMBLE, "510 Invalid or unknown command\n");

    // Not `DDD result=`, so this one is a parse failure
    let response = session.command(&["BOGUS"]);
    assert!(matches!(response.error(), Some(AgiError::Parse { .. })));
    assert!(response.reply().is_none());
}

#[test]
fn test_command_usage_block() {
    let (session, _output) = scripted_session(
        PREAMBLE,
        "520-Invalid command syntax.  Proper usage follows:\nUsage: ANSWER\n520 End of proper usage.\n",
    );

    let response = session.command(&["ANSWER", "extra"]);

    assert_eq!(response.status(), Some(520));
    assert_eq!(response.value(), "Usage: ANSWER");
    assert_eq!(response.error().and_then(AgiError::status), Some(520));
}

#[test]
fn test_command_parse_error() {
    let (session, _output) = scripted_session(PREAMBLE, "not a response\n");

    let response = session.command(&["ANSWER"]);

    assert!(response.reply().is_none());
    assert_eq!(response.status(), None);
    match response.into_reply() {
        Err(AgiError::Parse { line }) => assert_eq!(line, "not a response"),
        other => panic!("Expected parse error, got {:?}", other),
    }
}

#[test]
fn test_command_hangup() {
    let (session, _output) = scripted_session(PREAMBLE, "HANGUP\n");

    let response = session.command(&["WAIT FOR DIGIT", "5000"]);

    assert!(response.is_hangup());
    assert!(response.reply().is_none());
    assert!(response.check().unwrap_err().is_hangup());
}

#[test]
fn test_command_eof_is_transport_error() {
    let (session, _output) = scripted_session(PREAMBLE, "");

    match session.command(&["ANSWER"]).into_reply() {
        Err(AgiError::Io(e)) => assert_eq!(e.kind(), ErrorKind::UnexpectedEof),
        other => panic!("Expected transport error, got {:?}", other),
    }
}

#[test]
fn test_command_write_failure() {
    let input = Cursor::new(format!("{PREAMBLE}200 result=0\n").into_bytes());
    let session = Session::new(input, BrokenWriter).unwrap();

    let first = session.command(&["ANSWER"]);
    match first.error() {
        Some(AgiError::Io(e)) => assert_eq!(e.kind(), ErrorKind::BrokenPipe),
        other => panic!("Expected transport error, got {:?}", other),
    }

    // The lock was released: a second command runs (and fails) rather than blocking
    assert!(matches!(
        session.command(&["ANSWER"]).error(),
        Some(AgiError::Io(_))
    ));
}

// =============================================================================
// Serialization
// =============================================================================

#[test]
fn test_concurrent_commands_do_not_interleave() {
    const PER_THREAD: usize = 200;
    let responses = "200 result=0\n".repeat(PER_THREAD * 2);
    let (session, output) = scripted_session(PREAMBLE, &responses);
    let session = Arc::new(session);

    let long_a = "A".repeat(512);
    let long_b = "B".repeat(512);

    let handles: Vec<_> = [long_a.clone(), long_b.clone()]
        .into_iter()
        .map(|arg| {
            let session = Arc::clone(&session);
            thread::spawn(move || {
                for _ in 0..PER_THREAD {
                    let response = session.command(&["SET VARIABLE", "X", arg.as_str()]);
                    assert!(response.is_ok());
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let expected_a = format!("SET VARIABLE X {long_a}");
    let expected_b = format!("SET VARIABLE X {long_b}");
    let lines = output.lines();

    assert_eq!(lines.len(), PER_THREAD * 2);
    assert!(lines.iter().all(|l| *l == expected_a || *l == expected_b));
    assert_eq!(lines.iter().filter(|l| **l == expected_a).count(), PER_THREAD);
}
