pub mod configs;
pub mod defaults;
pub mod envconfig;
pub mod validate;

pub use configs::{
    AppConfig, AuthConfig, DatabaseConfig, DocsConfig, GeneralConfig, LoggingConfig, MailConfig,
    MailProviderKind, SessionStorageKind, ToastConfig,
};
pub use envconfig::EnvConfig;
