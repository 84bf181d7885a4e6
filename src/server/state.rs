use std::sync::Arc;

use crate::config::Settings;
use crate::connection_manager::ConnectionManager;
use crate::identity::{IdGenerator, UuidGenerator};
use crate::room::RoomRegistry;
use crate::signaling::{LifecycleManager, MessageRouter};

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub registry: Arc<RoomRegistry>,
    pub connection_manager: Arc<ConnectionManager>,
    pub lifecycle: Arc<LifecycleManager>,
    pub router: Arc<MessageRouter>,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        Self::with_id_generator(settings, Arc::new(UuidGenerator))
    }

    pub fn with_id_generator(settings: Settings, ids: Arc<dyn IdGenerator>) -> Self {
        let registry = Arc::new(RoomRegistry::new());
        let connection_manager = Arc::new(ConnectionManager::new());
        let lifecycle = Arc::new(LifecycleManager::new(
            registry.clone(),
            connection_manager.clone(),
            ids,
        ));
        let router = Arc::new(MessageRouter::new(
            registry.clone(),
            connection_manager.clone(),
            lifecycle.clone(),
        ));

        Self {
            settings: Arc::new(settings),
            registry,
            connection_manager,
            lifecycle,
            router,
        }
    }
}
