mod settings;

pub use settings::{OtelConfig, ServerConfig, Settings, WebSocketConfig};
