//! Integration tests for session export and import

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::time::Duration;
use tls_session_cache::core::serialization::{
    deserialize_session, serialize_session, SerializationFormat, SessionRecord,
};
use tls_session_cache::core::session::{ProtocolVersion, Session, VerifyResult};
use tls_session_cache::error::SessionError;

fn full_session() -> Session {
    let mut s = Session::new(ProtocolVersion::Tls12, 0xCCA8);
    s.set_id(&[0x0A; 32]).unwrap();
    s.set_id_context(b"imap").unwrap();
    s.set_master_secret(&[0x5C; 48]).unwrap();
    s.set_peer(b"peer-cert", VerifyResult::Failed(20)).unwrap();
    s.set_time(1_650_000_000);
    s.set_timeout(Duration::from_secs(7_200));
    s.set_ticket(b"opaque-ticket", 3_600).unwrap();
    s.set_server_name(Some("mail.example.org".to_string()));
    s.set_extended_master_secret(true);
    s
}

#[test]
fn test_every_field_survives_both_formats() {
    let original = full_session();
    let expected = SessionRecord::from_session(&original);

    for format in [SerializationFormat::Bincode, SerializationFormat::Json] {
        let bytes = serialize_session(&original, format).unwrap();
        assert_eq!(bytes[0], format.format_byte());

        let restored = deserialize_session(&bytes).unwrap();
        assert_eq!(
            SessionRecord::from_session(&restored),
            expected,
            "{} lost a field",
            format.name()
        );
        assert!(restored.is_resumable());
        assert_eq!(restored.cipher().map(|c| c.name), Some("ECDHE-RSA-CHACHA20-POLY1305"));
    }
}

#[test]
fn test_not_resumable_is_not_exported() {
    let handle = full_session().into_handle();
    handle.mark_not_resumable();

    let restored = Session::from_bytes(&handle.to_bytes().unwrap()).unwrap();
    assert!(restored.is_resumable());
}

#[test]
fn test_json_is_human_readable() {
    let bytes = serialize_session(&full_session(), SerializationFormat::Json).unwrap();
    let text = std::str::from_utf8(&bytes[1..]).unwrap();
    assert!(text.contains("\"server_name\":\"mail.example.org\""));
    assert!(text.contains("\"cipher_id\":52392"));
}

#[test]
fn test_bad_input_is_rejected() {
    assert!(matches!(
        deserialize_session(&[]),
        Err(SessionError::DeserializeError(_))
    ));
    assert!(matches!(
        deserialize_session(&[0x7F, 1, 2, 3]),
        Err(SessionError::DeserializeError(_))
    ));
    assert!(matches!(
        deserialize_session(&[0x01, 0xFF]),
        Err(SessionError::DeserializeError(_))
    ));
    assert!(matches!(
        deserialize_session(b"\x02{\"not\":\"a record\"}"),
        Err(SessionError::DeserializeError(_))
    ));

    let bytes = full_session().to_bytes().unwrap();
    assert!(deserialize_session(&bytes[..bytes.len() / 2]).is_err());
}

#[test]
fn test_record_with_out_of_range_fields_is_rejected() {
    let mut record = SessionRecord::from_session(&full_session());
    record.protocol_version = 0x0200;
    assert!(record.to_session().is_err());

    let mut record = SessionRecord::from_session(&full_session());
    record.master_secret = vec![0; 64];
    assert!(record.to_session().is_err());

    let mut record = SessionRecord::from_session(&full_session());
    record.id = vec![0; 33];
    assert!(matches!(
        record.to_session(),
        Err(SessionError::InvalidLength { .. })
    ));
}

#[test]
fn test_oversized_bincode_length_prefix_is_bounded() {
    // a length prefix claiming a huge id must fail fast instead of allocating
    let mut data = vec![0x01, 1];
    data.extend_from_slice(&[0xFF; 9]);
    assert!(deserialize_session(&data).is_err());
}
