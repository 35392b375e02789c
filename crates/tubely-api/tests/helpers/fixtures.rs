//! Test fixtures: deterministic media-like blobs.

/// JPEG-looking bytes of exactly `len` bytes (SOI marker, filler, EOI marker).
pub fn create_test_jpeg(len: usize) -> Vec<u8> {
    assert!(len >= 4);
    let mut data = Vec::with_capacity(len);
    data.extend_from_slice(&[0xFF, 0xD8]);
    data.extend((0..len - 4).map(|i| (i % 251) as u8));
    data.extend_from_slice(&[0xFF, 0xD9]);
    data
}

/// Minimal valid 1x1 PNG bytes.
pub fn create_minimal_png() -> Vec<u8> {
    vec![
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x02, 0x00, 0x00, 0x00, 0x90,
        0x77, 0x53, 0xDE, 0x00, 0x00, 0x00, 0x0C, 0x49, 0x44, 0x41, 0x54, 0x08, 0xD7, 0x63, 0xF8,
        0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x18, 0xDD, 0x8D, 0x89, 0x00, 0x00, 0x00,
        0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
    ]
}

/// Bytes starting with an MP4 `ftyp` box.
pub fn create_test_mp4(len: usize) -> Vec<u8> {
    let header: &[u8] = &[
        0x00, 0x00, 0x00, 0x18, b'f', b't', b'y', b'p', b'i', b's', b'o', b'm', 0x00, 0x00, 0x02,
        0x00, b'i', b's', b'o', b'm', b'm', b'p', b'4', b'1',
    ];
    assert!(len >= header.len());
    let mut data = Vec::with_capacity(len);
    data.extend_from_slice(header);
    data.resize(len, 0);
    data
}
