pub mod author;
pub mod display;

pub use author::AuthorSession;
pub use display::{DisplaySession, FeedbackVisibility, SubmitPhase};
