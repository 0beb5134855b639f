use std::sync::Arc;

use nuvacm_admin_core::{AdminSession, BlogFormController, ClientError, FormMode, StatusKind};
use nuvacm_api::models::{BlogDraft, BlogPost, Patch};
use nuvacm_api::store::BlogRecords;

mod common;
use common::*;

async fn seeded_post(api: &FakeCmsApi, image: Option<&str>) -> BlogPost {
    api.store
        .create_blog(BlogDraft {
            title: "Why Rust".to_string(),
            tag: None,
            date: None,
            read_time: Some("4 min".to_string()),
            excerpt: "Short take".to_string(),
            image: image.map(str::to_string),
            content: None,
        })
        .await
        .unwrap()
}

fn controller() -> (BlogFormController<FakeCmsApi>, Arc<FakeCmsApi>) {
    let api = Arc::new(FakeCmsApi::new());
    let (uploader, _host) = uploader();
    (BlogFormController::new(api.clone(), uploader), api)
}

#[tokio::test]
async fn title_and_excerpt_checked_locally() {
    let (mut ctl, api) = controller();
    ctl.form.title = "Only title".to_string();

    let err = ctl.submit().await.unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));
    assert_eq!(ctl.status().message, "Title and excerpt are required");
    assert_eq!(api.call_count(), 0);
}

#[tokio::test]
async fn create_sets_image_only_when_uploaded() {
    let (mut ctl, _api) = controller();
    ctl.form.title = "First".to_string();
    ctl.form.excerpt = "e".to_string();
    let plain = ctl.submit().await.unwrap();
    assert!(!plain.has_image());
    assert_eq!(plain.tag, "Blog");

    ctl.form.title = "Second".to_string();
    ctl.form.excerpt = "e".to_string();
    ctl.select_image(Some(png("cover.png")));
    let pictured = ctl.submit().await.unwrap();
    assert!(pictured.image.ends_with("cover.png"));
    assert_eq!(ctl.status().message, "Blog post saved successfully");
    assert_eq!(ctl.blogs().len(), 2);
}

#[tokio::test]
async fn edit_without_image_changes_leaves_image_alone() {
    let (mut ctl, api) = controller();
    let post = seeded_post(&api, Some("https://i.example/cover.png")).await;

    ctl.begin_edit(&post);
    assert_eq!(ctl.current_image(), Some("https://i.example/cover.png"));
    ctl.form.title = "Why Rust, revisited".to_string();
    let updated = ctl.submit().await.unwrap();

    assert_eq!(updated.image, "https://i.example/cover.png");
    assert_eq!(updated.title, "Why Rust, revisited");
    let patch = api.last_blog_patch.lock().unwrap().clone().unwrap();
    assert_eq!(patch.image, Patch::Unchanged);
    assert_eq!(patch.content, Patch::Unchanged);
    assert_eq!(ctl.status().message, "Blog post updated successfully");
    assert_eq!(ctl.state().mode, FormMode::Create);
}

#[tokio::test]
async fn removal_mark_clears_image() {
    let (mut ctl, api) = controller();
    let post = seeded_post(&api, Some("https://i.example/cover.png")).await;

    ctl.begin_edit(&post);
    ctl.mark_image_for_removal();
    assert!(ctl.is_image_marked_for_removal());
    let updated = ctl.submit().await.unwrap();
    assert!(!updated.has_image());
    assert!(!ctl.is_image_marked_for_removal());
}

#[tokio::test]
async fn new_image_beats_removal_mark() {
    let (mut ctl, api) = controller();
    let post = seeded_post(&api, Some("https://i.example/cover.png")).await;

    ctl.begin_edit(&post);
    ctl.mark_image_for_removal();
    ctl.select_image(Some(png("fresh.png")));
    let updated = ctl.submit().await.unwrap();
    assert!(updated.image.ends_with("fresh.png"));
}

#[tokio::test]
async fn unmark_restores_unchanged() {
    let (mut ctl, api) = controller();
    let post = seeded_post(&api, Some("https://i.example/cover.png")).await;

    ctl.begin_edit(&post);
    ctl.mark_image_for_removal();
    ctl.unmark_image_removal();
    ctl.form.read_time = "".to_string();
    let updated = ctl.submit().await.unwrap();
    assert_eq!(updated.image, "https://i.example/cover.png");
    assert_eq!(updated.read_time, None);
}

#[tokio::test]
async fn load_and_delete_report_status() {
    let (mut ctl, api) = controller();
    let post = seeded_post(&api, None).await;

    ctl.load().await.unwrap();
    assert_eq!(ctl.status().message, "Blogs loaded successfully");
    assert_eq!(ctl.blogs().len(), 1);

    ctl.delete(post.id).await.unwrap();
    assert_eq!(ctl.status().message, "Blog post deleted successfully");
    assert!(ctl.blogs().is_empty());

    assert!(ctl.delete(post.id).await.is_err());
    assert_eq!(ctl.status().kind, StatusKind::Error);
}

#[tokio::test]
async fn session_login_and_logout() {
    let api = Arc::new(FakeCmsApi::new());
    let mut session = AdminSession::new(api.clone());

    assert!(session.login("admin", "").await.is_err());
    assert_eq!(session.status().message, "Username and password are required");
    assert_eq!(api.call_count(), 0);

    assert!(session.login("admin", "wrong").await.is_err());
    assert_eq!(session.status().message, "Invalid credentials");
    assert!(!session.is_logged_in());

    session.login(" admin ", "correct-horse").await.unwrap();
    assert!(session.is_logged_in());
    assert_eq!(session.user().map(|u| u.username.as_str()), Some("admin"));

    session.logout().await;
    assert!(!session.is_logged_in());
    assert!(api.logged_out.load(std::sync::atomic::Ordering::SeqCst));
}
