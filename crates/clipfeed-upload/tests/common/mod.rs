#![allow(dead_code)]

pub mod mock_transport;

use clipfeed_core::UploadConfig;

pub const OK_BODY: &str = r#"{"secure_url":"https://res.example/demo/image/upload/v1/upload_1.jpg","public_id":"posts/upload_1","resource_type":"image"}"#;

pub fn test_config() -> UploadConfig {
    UploadConfig::new("demo", "unsigned_feed").with_credentials("key", "secret")
}

pub const MB: usize = 1024 * 1024;
