use super::Direction;

/// Everything the presentation layer needs to render the translator.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionState {
    pub source_text: String,
    pub translated_text: String,
    pub is_loading: bool,
    pub error: Option<String>,
    pub direction: Direction,
}

impl SessionState {
    pub fn new(direction: Direction) -> SessionState {
        return SessionState {
            direction,
            ..SessionState::default()
        };
    }
}
