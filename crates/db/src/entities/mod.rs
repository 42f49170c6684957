//! Database entities.

pub mod activation_code;
pub mod note;
pub mod note_tag;
pub mod note_version;
pub mod user;

pub use activation_code::Entity as ActivationCode;
pub use note::Entity as Note;
pub use note_tag::Entity as NoteTag;
pub use note_version::Entity as NoteVersion;
pub use user::Entity as User;
