//! État partagé entre les handlers HTTP

use std::sync::Arc;

use crate::dma::DmaSettings;
use crate::store::AssetStore;

/// État de l'application, cloné dans chaque handler
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn AssetStore>,
    pub settings: Arc<DmaSettings>,
}

impl AppState {
    pub fn new(store: Arc<dyn AssetStore>, settings: DmaSettings) -> Self {
        Self {
            store,
            settings: Arc::new(settings),
        }
    }
}
