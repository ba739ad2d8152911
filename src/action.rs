use crate::browser::BrowserEvent;
use crate::error::DeckError;
use crate::types::RepositoryRef;

#[derive(Debug, Clone)]
pub enum Action {
    Quit,
    Back,
    ScrollUp,
    ScrollDown,
    Tick,

    // Entry screen text input
    FocusInput,
    BlurInput,
    InputChar(char),
    InputPaste(String),
    InputBackspace,
    SubmitInput,

    // Navigation
    OpenRepository(RepositoryRef),

    // Issue browser
    SelectFilter(usize),
    NextFilter,
    PrevFilter,
    NextPage,
    PrevPage,
    Reload,
    /// Completion of a fetch issued by the issue view with id `view`.
    Browser {
        view: u64,
        event: BrowserEvent,
    },

    OpenInBrowser,
    YankUrl,

    Error(String),
    None,
}

impl From<DeckError> for Action {
    fn from(err: DeckError) -> Self {
        Action::Error(err.to_string())
    }
}
