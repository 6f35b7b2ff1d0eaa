//! Integration tests for the lead note repository.
//!
//! These run against a live PostgreSQL database (DATABASE_URL, migrated)
//! and are ignored by default.

use leadbook_core::{
    Error, NewNote, NoteKind, NoteListQuery, NoteOrderField, NoteRepository, NoteUpdate, SortDir,
};
use leadbook_db::test_fixtures::TestDatabase;

async fn setup() -> TestDatabase {
    dotenvy::dotenv().ok();
    TestDatabase::new().await
}

fn new_note(lead_id: i64, text: &str, created_by: i64) -> NewNote {
    NewNote {
        lead_id,
        text: text.to_string(),
        kind: NoteKind::General,
        date_time: None,
        created_by: Some(created_by),
    }
}

#[tokio::test]
#[ignore] // Requires database connection
async fn create_and_get_round_trip() {
    let mut test_db = setup().await;
    let user = test_db.create_admin_user("note_author").await;
    let lead = test_db.create_lead("Acme Corp", Some(user)).await;

    let created = test_db
        .db
        .notes
        .create(&new_note(lead, "Initial call went well", user))
        .await
        .expect("create failed");
    assert_eq!(created.lead_id, lead);
    assert_eq!(created.kind, NoteKind::General);
    assert!(created.checked_out.is_none());

    let fetched = test_db
        .db
        .notes
        .get(created.id)
        .await
        .expect("get failed")
        .expect("note missing");
    assert_eq!(fetched.text, "Initial call went well");
    assert_eq!(fetched.created_by, Some(user));

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires database connection
async fn list_filters_by_search_text() {
    let mut test_db = setup().await;
    let user = test_db.create_admin_user("searcher").await;
    let lead = test_db.create_lead("Search Lead", Some(user)).await;

    for text in ["budget approved", "call scheduled", "budget rejected"] {
        test_db
            .db
            .notes
            .create(&new_note(lead, text, user))
            .await
            .expect("create failed");
    }

    let mut query = NoteListQuery::for_lead(lead);
    query.search = "budget".to_string();
    let page = test_db.db.notes.list(&query).await.expect("list failed");
    assert_eq!(page.total, 2);
    assert_eq!(page.notes.len(), 2);
    assert!(page.notes.iter().all(|n| n.text.contains("budget")));

    // Wildcards in the search are literals, not patterns.
    query.search = "100%".to_string();
    let page = test_db.db.notes.list(&query).await.expect("list failed");
    assert_eq!(page.total, 0);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires database connection
async fn list_never_returns_other_leads_notes() {
    let mut test_db = setup().await;
    let user = test_db.create_admin_user("isolation").await;
    let lead_a = test_db.create_lead("Lead A", Some(user)).await;
    let lead_b = test_db.create_lead("Lead B", Some(user)).await;

    test_db
        .db
        .notes
        .create(&new_note(lead_a, "note on A", user))
        .await
        .expect("create failed");
    test_db
        .db
        .notes
        .create(&new_note(lead_b, "note on B", user))
        .await
        .expect("create failed");

    let page = test_db
        .db
        .notes
        .list(&NoteListQuery::for_lead(lead_a))
        .await
        .expect("list failed");
    assert_eq!(page.total, 1);
    assert!(page.notes.iter().all(|n| n.lead_id == lead_a));

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires database connection
async fn list_pages_and_orders() {
    let mut test_db = setup().await;
    let user = test_db.create_admin_user("pager").await;
    let lead = test_db.create_lead("Paged Lead", Some(user)).await;

    for i in 0..5 {
        test_db
            .db
            .notes
            .create(&new_note(lead, &format!("note {}", i), user))
            .await
            .expect("create failed");
    }

    let query = NoteListQuery {
        lead_id: lead,
        search: String::new(),
        order_by: NoteOrderField::Id,
        order_dir: SortDir::Asc,
        limit: 2,
        offset: 2,
    };
    let page = test_db.db.notes.list(&query).await.expect("list failed");
    assert_eq!(page.total, 5);
    assert_eq!(page.notes.len(), 2);
    assert_eq!(page.notes[0].text, "note 2");
    assert_eq!(page.notes[1].text, "note 3");

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires database connection
async fn update_changes_fields_but_not_lead() {
    let mut test_db = setup().await;
    let user = test_db.create_admin_user("editor").await;
    let lead = test_db.create_lead("Edit Lead", Some(user)).await;

    let created = test_db
        .db
        .notes
        .create(&new_note(lead, "draft", user))
        .await
        .expect("create failed");

    let updated = test_db
        .db
        .notes
        .update(
            created.id,
            &NoteUpdate {
                text: Some("final".to_string()),
                kind: Some(NoteKind::Meeting),
                date_time: None,
            },
        )
        .await
        .expect("update failed");
    assert_eq!(updated.text, "final");
    assert_eq!(updated.kind, NoteKind::Meeting);
    assert_eq!(updated.lead_id, lead);
    assert_eq!(updated.date_time, created.date_time);

    let missing = test_db
        .db
        .notes
        .update(i64::MAX, &NoteUpdate::default())
        .await;
    assert!(matches!(missing, Err(Error::NoteNotFound(_))));

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires database connection
async fn delete_removes_and_reports_missing() {
    let mut test_db = setup().await;
    let user = test_db.create_admin_user("deleter").await;
    let lead = test_db.create_lead("Delete Lead", Some(user)).await;

    let created = test_db
        .db
        .notes
        .create(&new_note(lead, "to be removed", user))
        .await
        .expect("create failed");

    test_db
        .db
        .notes
        .delete(created.id)
        .await
        .expect("delete failed");
    assert!(test_db
        .db
        .notes
        .get(created.id)
        .await
        .expect("get failed")
        .is_none());

    let second = test_db.db.notes.delete(created.id).await;
    assert!(matches!(second, Err(Error::NoteNotFound(_))));

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires database connection
async fn count_for_lead_ignores_filters() {
    let mut test_db = setup().await;
    let user = test_db.create_admin_user("counter").await;
    let lead = test_db.create_lead("Counted Lead", Some(user)).await;

    for i in 0..3 {
        test_db
            .db
            .notes
            .create(&new_note(lead, &format!("note {}", i), user))
            .await
            .expect("create failed");
    }

    let count = test_db
        .db
        .notes
        .count_for_lead(lead)
        .await
        .expect("count failed");
    assert_eq!(count, 3);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires database connection
async fn check_out_and_in_set_lock_state() {
    let mut test_db = setup().await;
    let owner = test_db.create_admin_user("lock_owner").await;
    let other = test_db.create_admin_user("lock_other").await;
    let lead = test_db.create_lead("Locked Lead", Some(owner)).await;

    let note = test_db
        .db
        .notes
        .create(&new_note(lead, "locked note", owner))
        .await
        .expect("create failed");

    test_db
        .db
        .notes
        .check_out(note.id, owner)
        .await
        .expect("check_out failed");
    let locked = test_db
        .db
        .notes
        .get(note.id)
        .await
        .expect("get failed")
        .expect("note missing");
    assert_eq!(locked.checked_out_by, Some(owner));
    assert!(locked.is_locked_for(other));
    assert!(!locked.is_locked_for(owner));

    test_db
        .db
        .notes
        .check_in(note.id)
        .await
        .expect("check_in failed");
    let released = test_db
        .db
        .notes
        .get(note.id)
        .await
        .expect("get failed")
        .expect("note missing");
    assert!(released.checked_out.is_none());
    assert!(!released.is_locked_for(other));

    test_db.cleanup().await;
}
