use super::Direction;

/// A translation handed from the session to the worker. The generation ties
/// the eventual response back to the session state it was started from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TranslationRequest {
    pub generation: u64,
    pub text: String,
    pub direction: Direction,
}

pub enum Action {
    CopyTranslation(String),
    Translate(TranslationRequest),
}
