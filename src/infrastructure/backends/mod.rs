pub mod gemini;
pub mod openai;

use std::sync::Arc;

use crate::domain::models::BackendBox;
use crate::domain::models::BackendName;

pub struct BackendManager {}

impl BackendManager {
    pub fn get(name: BackendName) -> BackendBox {
        match name {
            BackendName::Gemini => return Arc::new(gemini::Gemini::default()),
            BackendName::OpenAI => return Arc::new(openai::OpenAI::default()),
        }
    }
}
