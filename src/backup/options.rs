use crate::backup::compress::CompressionConfig;
use crate::backup::ignore::IgnorePatterns;
use crate::backup::report::Reporter;
use bon::Builder;
use getset::Getters;

/// Everything a copy, archive or extract call needs besides its paths.
///
/// Built once per invocation from [`KopyConfig`](crate::backup::backup_config::KopyConfig)
/// or directly in tests, and passed by reference into each entry point.
#[derive(Clone, Debug, Default, Builder, Getters)]
#[getset(get = "pub")]
pub struct TransferOptions {
    #[builder(default, into)]
    ignore: IgnorePatterns,
    #[builder(default)]
    reporter: Reporter,
    #[builder(default)]
    compression: CompressionConfig,
}
