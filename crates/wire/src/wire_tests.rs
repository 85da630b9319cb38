// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire format tests: length-prefix framing and JSON encoding.

use super::*;

#[test]
fn encode_returns_json_without_length_prefix() {
    let encoded = encode(&Response::Ok).expect("encode failed");
    let json_str = std::str::from_utf8(&encoded).expect("should be valid UTF-8");
    assert!(json_str.starts_with('{'), "should be JSON object: {}", json_str);
}

#[tokio::test]
async fn read_write_message_roundtrip() {
    let original = b"hello world";

    let mut buffer = Vec::new();
    write_message(&mut buffer, original).await.expect("write failed");
    assert_eq!(buffer.len(), 4 + original.len());

    let mut cursor = std::io::Cursor::new(buffer);
    let read_back = read_message(&mut cursor).await.expect("read failed");
    assert_eq!(read_back, original);
}

#[tokio::test]
async fn write_message_adds_length_prefix() {
    let data = b"test data";

    let mut buffer = Vec::new();
    write_message(&mut buffer, data).await.expect("write failed");

    let len = u32::from_be_bytes([buffer[0], buffer[1], buffer[2], buffer[3]]) as usize;
    assert_eq!(len, data.len());
    assert_eq!(&buffer[4..], data);
}

#[tokio::test]
async fn oversized_frame_is_rejected() {
    let mut buffer = Vec::new();
    buffer.extend_from_slice(&(u32::MAX).to_be_bytes());
    let mut cursor = std::io::Cursor::new(buffer);
    assert!(matches!(
        read_message(&mut cursor).await,
        Err(ProtocolError::FrameTooLarge(_))
    ));
}

#[tokio::test]
async fn truncated_frame_reports_closed_connection() {
    let mut buffer = Vec::new();
    buffer.extend_from_slice(&8u32.to_be_bytes());
    buffer.extend_from_slice(b"abc");
    let mut cursor = std::io::Cursor::new(buffer);
    assert!(matches!(
        read_message(&mut cursor).await,
        Err(ProtocolError::ConnectionClosed)
    ));
}

#[tokio::test]
async fn request_round_trips_through_framing() {
    let request = Request::ServicesRemove { queue: "builds".into() };

    let mut buffer = Vec::new();
    let payload = encode(&request).expect("encode failed");
    write_message(&mut buffer, &payload).await.expect("write failed");

    let mut cursor = std::io::Cursor::new(buffer);
    let read_back =
        read_request(&mut cursor, Duration::from_secs(1)).await.expect("read failed");
    assert_eq!(read_back, request);
}
