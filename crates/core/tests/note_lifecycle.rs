//! Note lifecycle tests against a migrated in-memory database.

#![allow(clippy::unwrap_used)]

use chrono::Utc;
use notebook_common::AppError;
use notebook_core::{
    AutosaveInput, CreateNoteInput, ListQuery, NoteService, SortKey, UpdateNoteInput,
};
use notebook_db::{
    entities::{note, user},
    repositories::{NoteRepository, UserRepository},
    test_utils::TestDatabase,
};
use sea_orm::Set;

struct Fixture {
    _db: TestDatabase,
    notes: NoteService,
    note_repo: NoteRepository,
}

async fn setup(usernames: &[&str]) -> Fixture {
    let db = TestDatabase::new().await.unwrap();
    let user_repo = UserRepository::new(db.shared());

    for name in usernames {
        user_repo
            .create(user::ActiveModel {
                id: Set((*name).to_string()),
                username: Set((*name).to_string()),
                username_lower: Set(name.to_lowercase()),
                email: Set(format!("{name}@example.com")),
                password_hash: Set("unused".to_string()),
                token: Set(Some(format!("token-{name}"))),
                is_active: Set(true),
                created_at: Set(Utc::now().into()),
            })
            .await
            .unwrap();
    }

    let note_repo = NoteRepository::new(db.shared());
    Fixture {
        notes: NoteService::new(note_repo.clone()),
        note_repo,
        _db: db,
    }
}

fn note_input(title: &str, content_md: &str) -> CreateNoteInput {
    CreateNoteInput {
        title: title.to_string(),
        content_md: content_md.to_string(),
        ..Default::default()
    }
}

fn edit_input(title: &str, content_md: &str) -> UpdateNoteInput {
    UpdateNoteInput {
        title: title.to_string(),
        content_md: content_md.to_string(),
        ..Default::default()
    }
}

fn query() -> ListQuery {
    ListQuery::default()
}

#[tokio::test]
async fn test_create_edit_view_scenario() {
    let fx = setup(&["alice"]).await;

    let created = fx
        .notes
        .create("alice", note_input("Hi", "# Hi\n\n<script>alert(1)</script>"))
        .await
        .unwrap();
    let id = created.note.id.clone();

    assert!(created.note.content_html.contains("<h1 id=\"hi\">Hi</h1>"));
    assert!(!created.note.content_html.contains("<script"));
    assert_eq!(created.note.views, 0);
    assert_eq!(fx.note_repo.count_versions(&id).await.unwrap(), 0);

    let edited = fx
        .notes
        .update("alice", &id, edit_input("Hi", "# Hi there"))
        .await
        .unwrap();
    assert!(edited.note.content_html.contains("Hi there"));

    let versions = fx.notes.versions("alice", &id).await.unwrap();
    assert_eq!(versions.len(), 1);
    assert_eq!(versions[0].content_md, "# Hi\n\n<script>alert(1)</script>");

    let first = fx.notes.get_detail("alice", &id).await.unwrap();
    assert_eq!(first.note.views, 1);
    assert_eq!(first.recent_versions.len(), 1);

    let second = fx.notes.get_detail("alice", &id).await.unwrap();
    assert_eq!(second.note.views, 2);
}

#[tokio::test]
async fn test_unchanged_content_creates_no_version() {
    let fx = setup(&["alice"]).await;

    let created = fx
        .notes
        .create("alice", note_input("Same", "body"))
        .await
        .unwrap();
    let id = created.note.id;

    fx.notes
        .update("alice", &id, edit_input("New title", "body"))
        .await
        .unwrap();

    assert_eq!(fx.note_repo.count_versions(&id).await.unwrap(), 0);
}

#[tokio::test]
async fn test_each_change_records_previous_content() {
    let fx = setup(&["alice"]).await;

    let id = fx
        .notes
        .create("alice", note_input("", "a"))
        .await
        .unwrap()
        .note
        .id;

    for content in ["b", "c", "d"] {
        fx.notes
            .update("alice", &id, edit_input("", content))
            .await
            .unwrap();
    }

    let history: Vec<String> = fx
        .notes
        .versions("alice", &id)
        .await
        .unwrap()
        .into_iter()
        .map(|v| v.content_md)
        .collect();
    assert_eq!(history.len(), 3);
    for old in ["a", "b", "c"] {
        assert!(history.iter().any(|v| v == old));
    }
    assert!(!history.iter().any(|v| v == "d"));

    let detail = fx.notes.get_detail("alice", &id).await.unwrap();
    assert!(detail.recent_versions.len() <= 5);
}

#[tokio::test]
async fn test_delete_cascades_versions_and_tags() {
    let fx = setup(&["alice"]).await;

    let id = fx
        .notes
        .create(
            "alice",
            CreateNoteInput {
                content_md: "one".to_string(),
                tags: Some("work".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .note
        .id;
    fx.notes
        .update("alice", &id, edit_input("", "two"))
        .await
        .unwrap();
    assert_eq!(fx.note_repo.count_versions(&id).await.unwrap(), 1);

    fx.notes.delete("alice", &id).await.unwrap();

    assert_eq!(fx.note_repo.count_versions(&id).await.unwrap(), 0);
    assert!(fx.note_repo.find_tags(&id).await.unwrap().is_empty());
    assert!(matches!(
        fx.notes.get_detail("alice", &id).await,
        Err(AppError::NoteNotFound(_))
    ));
}

#[tokio::test]
async fn test_notes_are_owner_scoped() {
    let fx = setup(&["alice", "bob"]).await;

    let id = fx
        .notes
        .create("alice", note_input("Private", "secret"))
        .await
        .unwrap()
        .note
        .id;

    assert!(matches!(
        fx.notes.get_detail("bob", &id).await,
        Err(AppError::NoteNotFound(_))
    ));
    assert!(matches!(
        fx.notes.update("bob", &id, edit_input("", "x")).await,
        Err(AppError::NoteNotFound(_))
    ));
    assert!(matches!(
        fx.notes.delete("bob", &id).await,
        Err(AppError::NoteNotFound(_))
    ));

    let bob_list = fx.notes.list("bob", &query()).await.unwrap();
    assert_eq!(bob_list.total_items, 0);
}

#[tokio::test]
async fn test_search_is_case_insensitive_over_title_and_content() {
    let fx = setup(&["alice"]).await;

    fx.notes.create("alice", note_input("Foo title", "x")).await.unwrap();
    fx.notes.create("alice", note_input("Other", "has FOO inside")).await.unwrap();
    fx.notes.create("alice", note_input("Nothing", "bar")).await.unwrap();

    let page = fx
        .notes
        .list(
            "alice",
            &ListQuery {
                search: Some("foo".to_string()),
                ..query()
            },
        )
        .await
        .unwrap();

    let mut titles: Vec<&str> = page.notes.iter().map(|n| n.note.title.as_str()).collect();
    titles.sort_unstable();
    assert_eq!(titles, vec!["Foo title", "Other"]);
}

#[tokio::test]
async fn test_search_treats_wildcards_literally() {
    let fx = setup(&["alice"]).await;

    fx.notes.create("alice", note_input("50% off", "")).await.unwrap();
    fx.notes.create("alice", note_input("500 off", "")).await.unwrap();

    let page = fx
        .notes
        .list(
            "alice",
            &ListQuery {
                search: Some("0%".to_string()),
                ..query()
            },
        )
        .await
        .unwrap();

    assert_eq!(page.notes.len(), 1);
    assert_eq!(page.notes[0].note.title, "50% off");
}

#[tokio::test]
async fn test_sort_by_title_and_fallback() {
    let fx = setup(&["alice"]).await;

    for title in ["charlie", "alpha", "bravo"] {
        fx.notes.create("alice", note_input(title, "")).await.unwrap();
    }

    let by_title = fx
        .notes
        .list(
            "alice",
            &ListQuery {
                sort: Some("title".to_string()),
                ..query()
            },
        )
        .await
        .unwrap();
    let titles: Vec<&str> = by_title.notes.iter().map(|n| n.note.title.as_str()).collect();
    assert_eq!(titles, vec!["alpha", "bravo", "charlie"]);

    let bogus = fx
        .notes
        .list(
            "alice",
            &ListQuery {
                sort: Some("bogus".to_string()),
                ..query()
            },
        )
        .await
        .unwrap();
    let default = fx.notes.list("alice", &query()).await.unwrap();

    assert_eq!(bogus.sort, SortKey::default());
    let bogus_ids: Vec<&str> = bogus.notes.iter().map(|n| n.note.id.as_str()).collect();
    let default_ids: Vec<&str> = default.notes.iter().map(|n| n.note.id.as_str()).collect();
    assert_eq!(bogus_ids, default_ids);
}

#[tokio::test]
async fn test_pagination_clamps() {
    let fx = setup(&["alice"]).await;

    for i in 0..13 {
        fx.notes
            .create("alice", note_input(&format!("note {i:02}"), ""))
            .await
            .unwrap();
    }

    let first = fx.notes.list("alice", &query()).await.unwrap();
    assert_eq!(first.notes.len(), 12);
    assert_eq!(first.total_pages, 2);
    assert_eq!(first.total_items, 13);

    let beyond = fx
        .notes
        .list(
            "alice",
            &ListQuery {
                page: Some("99".to_string()),
                ..query()
            },
        )
        .await
        .unwrap();
    assert_eq!(beyond.page, 2);
    assert_eq!(beyond.notes.len(), 1);

    let garbage = fx
        .notes
        .list(
            "alice",
            &ListQuery {
                page: Some("abc".to_string()),
                ..query()
            },
        )
        .await
        .unwrap();
    assert_eq!(garbage.page, 1);
}

#[tokio::test]
async fn test_empty_listing_is_page_one_of_one() {
    let fx = setup(&["alice"]).await;

    let page = fx.notes.list("alice", &query()).await.unwrap();

    assert_eq!(page.page, 1);
    assert_eq!(page.total_pages, 1);
    assert!(page.notes.is_empty());
}

#[tokio::test]
async fn test_tag_filter_and_tag_list() {
    let fx = setup(&["alice", "bob"]).await;

    let tagged = fx
        .notes
        .create(
            "alice",
            CreateNoteInput {
                title: "tagged".to_string(),
                tags: Some("work, rust".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(tagged.tags, vec!["work", "rust"]);

    fx.notes
        .create(
            "alice",
            CreateNoteInput {
                title: "other".to_string(),
                tags: Some("ideas,work".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    fx.notes
        .create(
            "bob",
            CreateNoteInput {
                tags: Some("bobs".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(
        fx.notes.tags("alice").await.unwrap(),
        vec!["ideas", "rust", "work"]
    );

    let rust = fx
        .notes
        .list(
            "alice",
            &ListQuery {
                tag: Some("rust".to_string()),
                ..query()
            },
        )
        .await
        .unwrap();
    assert_eq!(rust.notes.len(), 1);
    assert_eq!(rust.notes[0].note.title, "tagged");
    assert_eq!(rust.all_tags, vec!["ideas", "rust", "work"]);

    let work = fx
        .notes
        .list(
            "alice",
            &ListQuery {
                tag: Some("work".to_string()),
                ..query()
            },
        )
        .await
        .unwrap();
    assert_eq!(work.notes.len(), 2);
}

#[tokio::test]
async fn test_edit_tags_replace_and_clear() {
    let fx = setup(&["alice"]).await;

    let id = fx
        .notes
        .create(
            "alice",
            CreateNoteInput {
                tags: Some("a, b".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .note
        .id;

    let kept = fx
        .notes
        .update("alice", &id, edit_input("", ""))
        .await
        .unwrap();
    assert_eq!(kept.tags, vec!["a", "b"]);

    let replaced = fx
        .notes
        .update(
            "alice",
            &id,
            UpdateNoteInput {
                tags: Some("c".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(replaced.tags, vec!["c"]);

    let cleared = fx
        .notes
        .update(
            "alice",
            &id,
            UpdateNoteInput {
                tags: Some(String::new()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(cleared.tags.is_empty());
    assert!(fx.notes.tags("alice").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_favorites_filter_and_toggle() {
    let fx = setup(&["alice"]).await;

    let id = fx
        .notes
        .create("alice", note_input("fav", ""))
        .await
        .unwrap()
        .note
        .id;
    fx.notes.create("alice", note_input("plain", "")).await.unwrap();

    assert!(fx.notes.toggle_favorite("alice", &id).await.unwrap());

    let favorites = fx
        .notes
        .list(
            "alice",
            &ListQuery {
                favorites: Some("1".to_string()),
                ..query()
            },
        )
        .await
        .unwrap();
    assert_eq!(favorites.notes.len(), 1);
    assert_eq!(favorites.notes[0].note.title, "fav");

    assert!(!fx.notes.toggle_favorite("alice", &id).await.unwrap());
    assert_eq!(fx.note_repo.count_versions(&id).await.unwrap(), 0);
}

#[tokio::test]
async fn test_autosave_keeps_missing_fields() {
    let fx = setup(&["alice"]).await;

    let id = fx
        .notes
        .create("alice", note_input("Title", "draft"))
        .await
        .unwrap()
        .note
        .id;

    let saved = fx
        .notes
        .autosave(
            "alice",
            &id,
            AutosaveInput {
                title: None,
                content_md: Some("**draft 2**".to_string()),
            },
        )
        .await
        .unwrap();

    assert_eq!(saved.title, "Title");
    assert_eq!(saved.content_md, "**draft 2**");
    assert!(saved.content_html.contains("<strong>draft 2</strong>"));
    assert_eq!(fx.note_repo.count_versions(&id).await.unwrap(), 1);
}

#[tokio::test]
async fn test_share_requires_public_flag() {
    let fx = setup(&["alice"]).await;

    let created = fx
        .notes
        .create("alice", note_input("Shared", "hello"))
        .await
        .unwrap();
    let uuid = created.note.public_uuid.clone();

    assert!(matches!(
        fx.notes.get_shared(&uuid).await,
        Err(AppError::NoteNotFound(_))
    ));

    fx.notes
        .update(
            "alice",
            &created.note.id,
            UpdateNoteInput {
                title: "Shared".to_string(),
                content_md: "hello".to_string(),
                is_public: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let shared = fx.notes.get_shared(&uuid).await.unwrap();
    assert_eq!(shared.note.title, "Shared");
    assert_eq!(shared.note.views, 1);
    assert_eq!(shared.note.public_uuid, uuid);
}

#[tokio::test]
async fn test_untouched_note_keeps_created_at() {
    let fx = setup(&["alice"]).await;

    let created = fx
        .notes
        .create("alice", note_input("t", "a"))
        .await
        .unwrap()
        .note;
    let edited = fx
        .notes
        .update("alice", &created.id, edit_input("t", "b"))
        .await
        .unwrap()
        .note;

    assert_eq!(edited.created_at, created.created_at);
    assert!(edited.updated_at >= created.updated_at);
    assert_eq!(edited.public_uuid, created.public_uuid);
}

#[tokio::test]
async fn test_save_of_deleted_note_is_not_found() {
    let fx = setup(&["alice"]).await;

    let created = fx
        .notes
        .create("alice", note_input("Doomed", "A"))
        .await
        .unwrap();
    let id = created.note.id.clone();

    fx.note_repo.delete(&id).await.unwrap();

    let mut active: note::ActiveModel = created.note.into();
    active.content_md = Set("B".to_string());
    let result = fx.notes.save(active, false).await;

    match result {
        Err(AppError::NoteNotFound(missing)) => assert_eq!(missing, id),
        other => panic!("expected NoteNotFound, got {other:?}"),
    }
    assert_eq!(fx.note_repo.count_versions(&id).await.unwrap(), 0);
}
