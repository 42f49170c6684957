//! Account and activation tests against a migrated in-memory database.

#![allow(clippy::unwrap_used)]

use notebook_common::AppError;
use notebook_core::{
    ActivateInput, ActivationCodeService, CodeValidity, CreateNoteInput, NoteService,
    SigninInput, SignupInput, UserService,
};
use notebook_db::{
    repositories::{ActivationCodeRepository, NoteRepository, UserRepository},
    test_utils::TestDatabase,
};

struct Fixture {
    _db: TestDatabase,
    users: UserService,
    notes: NoteService,
    codes: ActivationCodeService,
}

async fn setup() -> Fixture {
    let db = TestDatabase::new().await.unwrap();
    let note_repo = NoteRepository::new(db.shared());
    let codes = ActivationCodeService::new(ActivationCodeRepository::new(db.shared()));

    Fixture {
        users: UserService::new(
            UserRepository::new(db.shared()),
            note_repo.clone(),
            codes.clone(),
        ),
        notes: NoteService::new(note_repo),
        codes,
        _db: db,
    }
}

fn signup_input(username: &str) -> SignupInput {
    SignupInput {
        username: username.to_string(),
        email: format!("{username}@example.com"),
        password: "password123".to_string(),
        password_confirm: "password123".to_string(),
    }
}

#[tokio::test]
async fn test_signup_and_signin() {
    let fx = setup().await;

    let signup = fx.users.signup(signup_input("Alice")).await.unwrap();
    assert!(!signup.user.is_active);
    assert_eq!(signup.activation_code.code.len(), 6);

    let user = fx
        .users
        .signin(SigninInput {
            username: "alice".to_string(),
            password: "password123".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(user.id, signup.user.id);

    let token = user.token.unwrap();
    let authed = fx.users.authenticate_by_token(&token).await.unwrap();
    assert_eq!(authed.id, user.id);
}

#[tokio::test]
async fn test_duplicate_username_is_conflict() {
    let fx = setup().await;

    fx.users.signup(signup_input("alice")).await.unwrap();
    let result = fx.users.signup(signup_input("ALICE")).await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn test_signout_rotates_token() {
    let fx = setup().await;

    let signup = fx.users.signup(signup_input("alice")).await.unwrap();
    let old_token = signup.user.token.clone().unwrap();

    fx.users.signout(&signup.user.id).await.unwrap();

    assert!(matches!(
        fx.users.authenticate_by_token(&old_token).await,
        Err(AppError::Unauthorized)
    ));
}

#[tokio::test]
async fn test_activation_flow() {
    let fx = setup().await;

    let signup = fx.users.signup(signup_input("alice")).await.unwrap();
    let code = signup.activation_code.code.clone();

    let first = fx
        .users
        .activate(ActivateInput {
            username: "alice".to_string(),
            code: code.clone(),
        })
        .await
        .unwrap();
    assert_eq!(first, CodeValidity::Valid);
    let token = signup.user.token.clone().unwrap();
    assert!(fx.users.authenticate_by_token(&token).await.unwrap().is_active);

    let second = fx
        .users
        .activate(ActivateInput {
            username: "alice".to_string(),
            code,
        })
        .await
        .unwrap();
    assert_eq!(second, CodeValidity::AlreadyUsed);
    assert_eq!(second.reason(), "already used");
}

#[tokio::test]
async fn test_mark_as_used_is_idempotent() {
    let fx = setup().await;

    let signup = fx.users.signup(signup_input("alice")).await.unwrap();
    let fresh = signup.activation_code;
    assert_eq!(CodeValidity::check(&fresh), CodeValidity::Valid);

    let used = fx.codes.mark_as_used(fresh).await.unwrap();
    let used_again = fx.codes.mark_as_used(used).await.unwrap();

    assert!(used_again.is_used);
    assert_eq!(CodeValidity::check(&used_again), CodeValidity::AlreadyUsed);
}

#[tokio::test]
async fn test_several_codes_can_be_valid_at_once() {
    let fx = setup().await;

    let signup = fx.users.signup(signup_input("alice")).await.unwrap();
    let second = fx.users.resend_activation(&signup.user.id).await.unwrap();

    assert!(CodeValidity::check(&signup.activation_code).is_valid());
    assert!(CodeValidity::check(&second).is_valid());
}

#[tokio::test]
async fn test_activate_unknown_code() {
    let fx = setup().await;

    fx.users.signup(signup_input("alice")).await.unwrap();
    let result = fx
        .users
        .activate(ActivateInput {
            username: "alice".to_string(),
            code: "abcdef".to_string(),
        })
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_profile_stats() {
    let fx = setup().await;

    let user = fx.users.signup(signup_input("alice")).await.unwrap().user;

    let a = fx
        .notes
        .create(
            &user.id,
            CreateNoteInput {
                title: "a".to_string(),
                is_public: true,
                is_favorite: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();
    fx.notes
        .create(
            &user.id,
            CreateNoteInput {
                title: "b".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    fx.notes.get_detail(&user.id, &a.note.id).await.unwrap();
    fx.notes.get_shared(&a.note.public_uuid).await.unwrap();

    let stats = fx.users.stats(&user.id).await.unwrap();
    assert_eq!(stats.total_notes, 2);
    assert_eq!(stats.favorite_notes, 1);
    assert_eq!(stats.public_notes, 1);
    assert_eq!(stats.total_views, 2);
}
