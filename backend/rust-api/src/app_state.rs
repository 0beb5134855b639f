use std::sync::Arc;

use crate::config::Config;
use crate::image_host::ImageUploader;
use crate::services::auth::AuthGate;
use crate::store::RecordStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn RecordStore>,
    pub auth: Arc<AuthGate>,
    pub uploader: ImageUploader,
}
