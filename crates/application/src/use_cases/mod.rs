mod handle_question;

pub use handle_question::HandleQuestionUseCase;
