use super::ProviderError;
use super::TranslationRequest;

pub struct TranslationResponse {
    pub request: TranslationRequest,
    pub result: Result<String, ProviderError>,
}

pub enum Event {
    CopyResponse(anyhow::Result<()>),
    TranslationResponse(TranslationResponse),
}
