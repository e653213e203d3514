#![allow(dead_code)]

use bytes::Bytes;
use captioneer::{MockLlmClient, Orchestrator, UploadedImage};
use std::path::PathBuf;
use std::sync::Arc;

/// Minimal 1x1 pixel transparent PNG
pub const PNG_1X1: [u8; 67] = [
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, // Signature
    0x00, 0x00, 0x00, 0x0D, // IHDR length
    0x49, 0x48, 0x44, 0x52, // IHDR chunk type
    0x00, 0x00, 0x00, 0x01, // Width: 1
    0x00, 0x00, 0x00, 0x01, // Height: 1
    0x08, // Bit depth: 8
    0x06, // Color type: Truecolor with alpha
    0x00, // Compression method
    0x00, // Filter method
    0x00, // Interlace method
    0x1F, 0x15, 0xC4, 0x89, // IHDR CRC
    0x00, 0x00, 0x00, 0x0A, // IDAT length
    0x49, 0x44, 0x41, 0x54, // IDAT chunk type
    0x78, 0x9C, 0x63, 0x00, 0x01, 0x00, 0x00, 0x05, 0x00, 0x01, // Compressed data
    0x0D, 0x0A, 0x2D, 0xB4, // IDAT CRC
    0x00, 0x00, 0x00, 0x00, // IEND length
    0x49, 0x45, 0x4E, 0x44, // IEND chunk type
    0xAE, 0x42, 0x60, 0x82, // IEND CRC
];

pub fn png_image() -> UploadedImage {
    UploadedImage::from_bytes(Bytes::from_static(&PNG_1X1), Some("pixel.png".to_string()))
        .expect("PNG fixture should be accepted")
}

/// Write `bytes` to `name` inside `dir` and return the path.
pub fn write_file(dir: &tempfile::TempDir, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, bytes).expect("write fixture");
    path
}

pub fn mock(response: &str) -> Arc<MockLlmClient> {
    Arc::new(MockLlmClient::new().with_response(response))
}

pub fn orchestrator_for(mock: &Arc<MockLlmClient>) -> Orchestrator {
    Orchestrator::new(mock.clone())
}
