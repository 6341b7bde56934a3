//! Stream builders shared by the integration tests

#![allow(dead_code)]

/// Encode one segment: marker, big-endian length, payload
pub fn segment(marker: u8, payload: &[u8]) -> Vec<u8> {
    let mut bytes = vec![0xFF, marker];
    bytes.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
    bytes.extend_from_slice(payload);
    bytes
}

/// SOI, the given segments, then EOI
pub fn jpeg(segments: &[Vec<u8>]) -> Vec<u8> {
    let mut data = vec![0xFF, 0xD8];
    for s in segments {
        data.extend_from_slice(s);
    }
    data.extend_from_slice(&[0xFF, 0xD9]);
    data
}

pub fn jfif_payload() -> Vec<u8> {
    vec![
        b'J', b'F', b'I', b'F', 0x00, 0x01, 0x01, 0x01, 0x00, 0x48, 0x00, 0x48, 0x00, 0x00,
    ]
}

pub fn sof0_payload(width: u16, height: u16) -> Vec<u8> {
    let mut payload = vec![0x08];
    payload.extend_from_slice(&height.to_be_bytes());
    payload.extend_from_slice(&width.to_be_bytes());
    payload.extend_from_slice(&[0x03, 0x01, 0x22, 0x00, 0x02, 0x11, 0x01, 0x03, 0x11, 0x01]);
    payload
}

/// A small but realistic header: JFIF, Exif-like APP1 twice, APP2, DQT,
/// padding, SOF0, DHT, DRI, COM, then scan data
pub fn realistic_jpeg() -> Vec<u8> {
    let mut data = vec![0xFF, 0xD8];
    data.extend(segment(0xE0, &jfif_payload()));
    data.extend(segment(0xE1, b"Exif\0\0MM\0*"));
    data.extend(segment(0xE1, b"http://ns.adobe.com/xap/1.0/\0<x/>"));
    data.extend(segment(0xE2, b"ICC_PROFILE\0\x01\x01"));
    data.extend(segment(0xDB, &[0x00; 65]));
    data.extend_from_slice(&[0xFF, 0xFF]);
    data.extend(segment(0xC0, &sof0_payload(640, 480)));
    data.extend(segment(0xC4, &[0x00, 0xFF, 0x00, 0x01]));
    data.extend(segment(0xDD, &[0x00, 0x10]));
    data.extend(segment(0xFE, b"made by hand"));
    data.extend(segment(0xDA, &[0x01, 0x01, 0x00, 0x00, 0x3F, 0x00]));
    data.extend_from_slice(&[0x12, 0xFF, 0x00, 0x34, 0xFF, 0xD0, 0x56]);
    data.extend_from_slice(&[0xFF, 0xD9]);
    data
}
