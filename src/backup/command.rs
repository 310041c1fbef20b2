//! Command line subcommands and what each one runs.

use crate::backup::backup_config::KopyConfig;
use crate::backup::compress::tar_gz::archive_directory_into;
use crate::backup::compress::zip::archive_file_into;
use crate::backup::copy::{copy_dir, copy_file};
use crate::backup::counters::TransferCounters;
use crate::backup::extract::tar_gz::extract_tar_gz;
use crate::backup::extract::zip::extract_zip;
use crate::backup::modified::copy_modified_within;
use crate::backup::result_error::error::Error;
use crate::backup::result_error::result::Result;
use crate::backup::result_error::WithMsg;
use crate::backup::validate::{validate_dir_exist, validate_dir_exist_or_created, validate_file_exist};
use clap::{Args, Subcommand};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::result;
use tracing::{info, warn};
use validator::{Validate, ValidationErrors};

#[derive(Subcommand, Clone, Debug)]
pub enum Command {
    /// Copy a directory tree
    Copydir(DirToDirArgs),
    /// Copy one file into a directory
    Copyfile(FileToDirArgs),
    /// Copy files modified in the last N days, keeping their layout
    Copymd(ModifiedArgs),
    /// Archive a directory as <name>.tar.gz
    Comdir(DirToArchiveArgs),
    /// Archive one file as <name>.zip
    Comfile(FileToDirArgs),
    /// Extract a .tar.gz next to itself
    Dcdir(ExtractArgs),
    /// Extract a .zip next to itself
    Dcfile(ExtractArgs),
}

#[derive(Args, Clone, Debug, Validate)]
pub struct DirToDirArgs {
    /// Source directory
    #[validate(custom(function = validate_dir_exist))]
    pub src: PathBuf,
    /// Destination directory
    pub dst: PathBuf,
}

#[derive(Args, Clone, Debug, Validate)]
pub struct DirToArchiveArgs {
    /// Source directory
    #[validate(custom(function = validate_dir_exist))]
    pub src: PathBuf,
    /// Directory receiving the archive, created when missing
    #[validate(custom(function = validate_dir_exist_or_created))]
    pub dst: PathBuf,
}

#[derive(Args, Clone, Debug, Validate)]
pub struct FileToDirArgs {
    /// Source file
    #[validate(custom(function = validate_file_exist))]
    pub src: PathBuf,
    /// Destination directory, created when missing
    #[validate(custom(function = validate_dir_exist_or_created))]
    pub dst: PathBuf,
}

#[derive(Args, Clone, Debug, Validate)]
pub struct ModifiedArgs {
    /// Source directory
    #[validate(custom(function = validate_dir_exist))]
    pub src: PathBuf,
    /// Destination directory
    pub dst: PathBuf,
    /// Look-back window in days (zero or negative), defaults to the
    /// configured `copy_mod_files_num_days`
    #[arg(long, allow_negative_numbers = true)]
    #[validate(range(max = 0))]
    pub days: Option<i64>,
}

#[derive(Args, Clone, Debug, Validate)]
pub struct ExtractArgs {
    /// Archive to extract
    #[validate(custom(function = validate_file_exist))]
    pub archive: PathBuf,
    /// Original root the members were archived under, e.g. /home/u/photos
    #[arg(long)]
    pub root: Option<PathBuf>,
}

impl Validate for Command {
    fn validate(&self) -> result::Result<(), ValidationErrors> {
        match self {
            Command::Copydir(args) => args.validate(),
            Command::Comdir(args) => args.validate(),
            Command::Copyfile(args) | Command::Comfile(args) => args.validate(),
            Command::Copymd(args) => args.validate(),
            Command::Dcdir(args) | Command::Dcfile(args) => args.validate(),
        }
    }
}

impl Command {
    pub fn run(&self, config: &KopyConfig) -> Result<()> {
        self.validate()
            .map_err(Error::from)
            .with_msg("Invalid command arguments")?;
        let options = config.transfer_options();

        match self {
            Command::Copydir(args) => {
                let (counters, non_fatal) = copy_dir(&args.src, &args.dst, &options)?;
                report_counters(counters, non_fatal);
            }
            Command::Copyfile(args) => {
                let dst = copy_file(&args.src, &args.dst, &options)?;
                info!("Copied {:?} to {:?}", args.src, dst);
            }
            Command::Copymd(args) => {
                let days = args
                    .days
                    .unwrap_or(config.default.copy_mod_files_num_days);
                let (counters, non_fatal) =
                    copy_modified_within(&args.src, &args.dst, days, &options)?;
                report_counters(counters, non_fatal);
            }
            Command::Comdir(args) => {
                archive_directory_into(&args.src, &args.dst, &options)?;
            }
            Command::Comfile(args) => {
                archive_file_into(&args.src, &args.dst, &options)?;
            }
            Command::Dcdir(args) => {
                let input = File::open(&args.archive).map(BufReader::new)?;
                let counters =
                    extract_tar_gz(input, &args.archive, args.root.as_deref(), &options)?;
                report_counters(counters, None);
            }
            Command::Dcfile(args) => {
                let (counters, non_fatal) =
                    extract_zip(&args.archive, args.root.as_deref(), &options)?;
                report_counters(counters, non_fatal);
            }
        }

        Ok(())
    }
}

fn report_counters(counters: TransferCounters, non_fatal: Option<Error>) {
    if let Some(non_fatal) = non_fatal {
        warn!(
            "Received {} non fatal error(s): {non_fatal}",
            non_fatal.leaf_count()
        );
    }
    println!(
        "{} folders, {} files ({} entries)",
        counters.folders,
        counters.files,
        counters.total()
    );
}
