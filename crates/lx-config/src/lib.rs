pub mod paths;
pub mod service;
pub mod webhook;

pub use paths::ConfigPaths;
pub use service::ServiceConfig;
pub use webhook::WebhookConfig;
