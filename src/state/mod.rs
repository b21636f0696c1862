pub mod app_settings;
pub mod app_state;
pub mod detail_sync;
pub mod feed;
pub mod list_sync;
pub mod messages;
pub mod poller;
pub mod sync;
