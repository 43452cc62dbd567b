pub mod instances;
pub mod messages;
pub mod templates;
