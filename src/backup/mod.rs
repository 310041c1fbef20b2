pub mod backup_config;
pub mod command;
pub mod compress;
pub mod copy;
pub mod counters;
pub mod extract;
pub mod file_ext;
pub mod finish;
pub mod ignore;
pub mod modified;
pub mod options;
pub mod report;
pub mod result_error;
pub mod validate;
