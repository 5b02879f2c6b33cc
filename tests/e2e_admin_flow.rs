use folio::content::{ExperienceDraft, ProjectDraft, ReadView, Skills, ViewState};
use folio::error::ContentError;
use tempfile::TempDir;

mod common;

#[tokio::test]
async fn e2e_admin_creates_and_deletes_project() {
    let dir = TempDir::new().expect("temp dir");
    let (state, console) = common::site(common::sqlite(&dir));
    let public = ReadView::public(state.projects.clone());

    assert_eq!(public.load().await, ViewState::Ready(vec![]));

    console
        .session()
        .attempt_login(common::ADMIN_USER, common::ADMIN_PASS)
        .expect("login");

    let created = console
        .projects()
        .create(ProjectDraft {
            title: "X".into(),
            description: "demo project".into(),
            image: Some("/placeholder.svg".into()),
            skills: Skills::parse("A,B"),
            ..Default::default()
        })
        .await
        .expect("create")
        .completed()
        .expect("not a duplicate submission");

    let shown = public.load().await;
    let items = shown.items().expect("ready");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].title, "X");
    assert_eq!(items[0].skills.as_slice(), ["A", "B"]);

    console
        .projects()
        .delete(created.id)
        .await
        .expect("delete");
    assert!(console.projects().items().is_empty());

    assert_eq!(public.load().await, ViewState::Ready(vec![]));
}

#[tokio::test]
async fn e2e_logged_out_admin_cannot_write() {
    let dir = TempDir::new().expect("temp dir");
    let (_state, console) = common::site(common::sqlite(&dir));

    let err = console
        .experiences()
        .delete(1)
        .await
        .expect_err("writes need a session");
    assert_eq!(err, ContentError::Unauthorized);
}

#[tokio::test]
async fn e2e_reorder_persists_across_reopen() {
    let dir = TempDir::new().expect("temp dir");
    let (_state, console) = common::site(common::sqlite(&dir));
    console
        .session()
        .attempt_login(common::ADMIN_USER, common::ADMIN_PASS)
        .expect("login");

    for (i, period) in ["2021", "2022", "2023"].into_iter().enumerate() {
        console
            .experiences()
            .create(ExperienceDraft {
                period: period.into(),
                company: "Acme".into(),
                job_title: "Engineer".into(),
                display_order: Some(i as i64),
                ..Default::default()
            })
            .await
            .expect("create");
    }
    let ids: Vec<i64> = console.experiences().items().iter().map(|e| e.id).collect();

    console
        .experiences()
        .drop_item(ids[0], ids[2])
        .await
        .expect("reorder");

    let (_state, reopened) = common::site(common::sqlite(&dir));
    let order: Vec<(i64, i64)> = reopened
        .experiences()
        .refresh()
        .await
        .expect("refresh")
        .iter()
        .map(|e| (e.id, e.display_order))
        .collect();
    assert_eq!(order, vec![(ids[1], 0), (ids[0], 1), (ids[2], 2)]);
}
