use std::sync::Arc;

use crate::broadcast::Broadcaster;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) broadcaster: Arc<Broadcaster>,
}
