//! The owner's display preferences and the onboarding step that creates them.

mod db;
mod endpoint;

pub use db::{
    UserSettings, create_user_settings_table, get_or_create_user_settings, get_user_settings,
    require_user_settings, save_user_settings,
};
pub use endpoint::{get_currencies, get_user_settings_endpoint, put_user_settings_endpoint};
