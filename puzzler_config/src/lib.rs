mod schema;

pub use schema::{Config, GenerationConfig, ProviderConfig, ProvidersConfig};
