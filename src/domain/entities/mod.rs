pub mod custom_domain;
pub mod tenant;
