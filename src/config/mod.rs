// src/config/mod.rs
pub mod monitor;
pub mod recipients;

pub use monitor::{
    DedupConfig, MonitorConfig, NotifyConfig, ScheduleConfig, SourceConfig, SourceKind,
    StoreConfig,
};
pub use recipients::load_recipients;
