pub mod activity_log;
pub mod contacts;
pub mod database;

pub use activity_log::{ActivityEntry, CampaignActivityLog};
pub use contacts::load_contacts;
pub use database::Database;
