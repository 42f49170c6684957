//! Database repositories.

mod activation_code;
mod note;
mod user;

pub use activation_code::ActivationCodeRepository;
pub use note::{NoteFilter, NotePage, NoteRepository, NoteStats};
pub use user::UserRepository;
