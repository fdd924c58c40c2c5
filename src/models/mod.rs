pub mod answer;
pub mod criteria;
pub mod loaders;
pub mod quiz;
pub mod quiz_mode;
pub mod selection;
pub mod setup;

pub use answer::{Answer, AnswerSet};
pub use criteria::CriteriaMap;
pub use loaders::{load_quiz_seed, QuizSeed};
pub use quiz::QuizState;
pub use quiz_mode::{ParseQuizModeError, QuizMode};
pub use selection::{SavedSelection, SelectionState};
pub use setup::{
    default_answers, default_criteria, FeedbackKind, FeedbackText, SetupDocument, DEFAULT_QUIZ_TYPE,
};
