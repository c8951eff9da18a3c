//! Key/value system settings

pub mod model;
pub mod repository;

pub use model::Setting;
pub use repository::SettingRepository;
