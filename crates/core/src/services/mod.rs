//! Business logic services.

#![allow(missing_docs)]

pub mod activation_code;
pub mod export;
pub mod listing;
pub mod note;
pub mod user;

pub use activation_code::{ActivationCodeService, CodeValidity, generate_code};
pub use export::{ExportService, ExportedFile, content_disposition};
pub use listing::{ListQuery, PAGE_SIZE, SortField, SortKey};
pub use note::{
    AutosaveInput, CreateNoteInput, NoteDetail, NoteListPage, NoteService, NoteWithTags,
    SavePlan, UpdateNoteInput, parse_tags, plan_save, should_snapshot,
};
pub use user::{ActivateInput, ProfileStats, SigninInput, Signup, SignupInput, UserService};
