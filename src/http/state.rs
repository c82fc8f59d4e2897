use std::sync::Arc;

use crate::agent::ConversationalAgent;
use crate::config::Config;
use crate::session::SessionStore;
use crate::stt::SttConnector;
use crate::tts::SpeechBackend;

/// Shared application state for HTTP handlers. Sessions themselves hold no
/// state here: each accepted connection builds its own pipeline from these
/// capabilities.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn SessionStore>,
    pub agent: Arc<dyn ConversationalAgent>,
    pub speech: Arc<dyn SpeechBackend>,
    pub stt: Arc<dyn SttConnector>,
}
