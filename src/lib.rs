//! # kopy
//!
//! A file backup tool: plain copies, modified-file copies and archives.
//!
//! ## Features
//!
//! - **Directory Copy**: Recursive copy with substring ignore patterns
//! - **Modified Files**: Copy only files changed in the last N days, keeping their layout
//! - **Archiving**: Streaming tar+gzip for directories, deflate zip for files
//! - **Extraction**: Restores archives next to themselves, remapping the original root
//!
//! ## Quick Start
//!
//! ```no_run
//! use kopy::backup::backup_config::KopyConfig;
//! use kopy::backup::copy::copy_dir;
//!
//! // Load configuration from YAML file
//! let config = KopyConfig::load(Some("config.yaml".as_ref()))?;
//!
//! // Copy a directory, collecting per-entry failures
//! let (counters, non_fatal) = copy_dir("/home/u/docs", "/mnt/backup/docs", &config.transfer_options())?;
//! println!("{} folders, {} files", counters.folders, counters.files);
//! if let Some(e) = non_fatal {
//!     eprintln!("{e}");
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod backup;
