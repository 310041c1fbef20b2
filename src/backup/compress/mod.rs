pub mod tar_gz;
pub mod zip;

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use validator::Validate;

/// Default gzip/deflate level (balance of speed vs size)
static DEFAULT_COMPRESSION_LEVEL: u32 = 6;

/// Compression settings shared by the tar+gzip and zip archivers.
#[skip_serializing_none]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Validate, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompressionConfig {
    /// Compression level (0-9)
    ///
    /// - 0: Store only
    /// - 6: Default
    /// - 9: Smallest output, slowest
    #[validate(range(min = 0, max = 9))]
    pub level: Option<u32>,
}

impl CompressionConfig {
    pub fn level(&self) -> u32 {
        self.level.unwrap_or(DEFAULT_COMPRESSION_LEVEL)
    }

    pub fn gzip(&self) -> flate2::Compression {
        flate2::Compression::new(self.level())
    }

    /// Always deflate. The zip writer has no deflate level 0, so 0 is
    /// written at level 1.
    pub fn zip_options(&self) -> ::zip::write::SimpleFileOptions {
        ::zip::write::SimpleFileOptions::default()
            .compression_method(::zip::CompressionMethod::Deflated)
            .compression_level(Some(i64::from(self.level().max(1))))
    }
}
