pub mod ad_helpers;
pub mod admin_helpers;
pub mod auth_helpers;
pub mod listing_helpers;
pub mod public_helpers;
pub mod sanitization_helpers;
pub mod tracking_helpers;
