mod analytics;
mod health;
mod redirect;
mod url;

pub use analytics::{mapping_analytics_handler, owner_analytics_handler};
pub use health::health_handler;
pub use redirect::redirect_handler;
pub use url::{create_url_handler, delete_url_handler, list_urls_handler};
