//! コンテナに対する 4 つの動詞

mod container;
pub mod download;
pub mod freeze;
pub mod status_check;
pub mod upload;

pub use download::{DownloadConfig, DownloadUseCase};
pub use freeze::{FreezeConfig, FreezeReport, FreezeUseCase};
pub use status_check::{StatusCheckConfig, StatusCheckUseCase};
pub use upload::{UploadConfig, UploadUseCase};
