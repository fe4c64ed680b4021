// tests/scenarios.rs

mod common;

use common::{engine, run_ticks};
use nrf24_batch::common::{
    CompileError, ConstantStore, EngineError, FieldSchema, PayloadCompiler, TransportError,
};
use nrf24_batch::engine::{Status, TxState};

#[test]
fn test_literal_fields_compile_little_endian() {
    let schema = FieldSchema::new(&[2, 1]).unwrap();
    let constants = ConstantStore::new();
    let compiled = PayloadCompiler::new(&schema, &constants)
        .compile("0x1234,5", None)
        .unwrap();
    assert_eq!(&compiled.payload[..schema.payload_size()], &[0x34, 0x12, 0x05]);
}

#[test]
fn test_constants_compile_from_pool() {
    let schema = FieldSchema::new(&[1, 1]).unwrap();
    let mut constants = ConstantStore::new();
    constants.append_line("FOO=7;BAR=3").unwrap();
    let compiled = PayloadCompiler::new(&schema, &constants)
        .compile("FOO,BAR", None)
        .unwrap();
    assert_eq!(&compiled.payload[..2], &[7, 3]);
}

#[test]
fn test_array_read_sends_one_request_per_element() {
    let mut engine = engine("Address: C8C8C4\nPayload struct: 1\nR: Arr[3]=i:0\n");
    for value in [4u8, 5, 6] {
        engine.interface_mut().respond(&[value]);
    }
    engine.run_read_command(0).unwrap();
    run_ticks(&mut engine, 20, 11);

    assert_eq!(engine.status(), Status::Ok);
    assert_eq!(engine.interface().sent, vec![vec![0], vec![1], vec![2]]);
    assert_eq!(engine.log().get(0), Some("Arr[3]: 4,5,6"));
}

#[test]
fn test_unresolved_constant_aborts_before_transmit() {
    let mut engine = engine("Address: C8C8C4\nPayload struct: 1,1\nR: Cmd=BAZ,1\n");
    let err = engine.run_read_command(0).unwrap_err();

    assert_eq!(
        err,
        EngineError::Compile(CompileError::ConstantNotFound("BAZ".to_string()))
    );
    assert!(engine.interface().sent.is_empty());
    assert_eq!(engine.state(), TxState::Error);
    assert_eq!(engine.failure().unwrap().message.as_str(), "No BAZ");
}

#[test]
fn test_silent_peer_fails_after_resends() {
    let mut engine = engine("Address: C8C8C4\nPayload struct: 1\nResend: 2\nR: Cmd=1\n");
    engine.interface_mut().ack = false;
    engine.run_read_command(0).unwrap();
    run_ticks(&mut engine, 10, 11);

    assert_eq!(engine.interface().sent.len(), 3);
    assert_eq!(engine.state(), TxState::Error);
    assert_eq!(
        engine.failure().unwrap().reason,
        EngineError::Transport(TransportError::NoAck)
    );
}
