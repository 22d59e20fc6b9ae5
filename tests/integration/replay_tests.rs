//! Integration tests for error-queue replay

use crate::support::{profile_page, site_url, test_config, ScriptedRenderer};
use doctor_harvest::crawler::{retry_path, ReplayReport, Replayer};
use doctor_harvest::model::{CheckpointDocument, DoctorProfile, ImageError, LinkError};
use doctor_harvest::storage::{
    checkpoint_path, ensure_district_dir, read_checkpoint, write_checkpoint, ErrorQueue,
};
use doctor_harvest::HarvestError;
use std::path::Path;
use tempfile::TempDir;

fn link_error(root: &Path, link: &str) -> LinkError {
    LinkError {
        link: link.to_string(),
        district: "dhaka".to_string(),
        file_id: root
            .join("dhaka/0-Eye-doctors")
            .to_string_lossy()
            .into_owned(),
        department_id: "eye-id".to_string(),
    }
}

fn image_error(id: &str, link: &str) -> ImageError {
    ImageError {
        image_id: id.to_string(),
        link: link.to_string(),
    }
}

#[tokio::test]
async fn test_replaying_empty_queue_is_a_no_op() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path(), &["dhaka"]);
    let renderer = ScriptedRenderer::new();
    let replayer = Replayer::new(&renderer, &config);

    let report = replayer.replay_links().await.unwrap();
    assert_eq!(report, ReplayReport::default());
    assert!(!config.output.link_errors_path.exists());

    // An existing empty queue is left exactly as it was
    std::fs::write(&config.output.link_errors_path, "{\"errors\":[]}").unwrap();
    replayer.replay_links().await.unwrap();
    assert_eq!(
        std::fs::read_to_string(&config.output.link_errors_path).unwrap(),
        "{\"errors\":[]}"
    );

    let report = replayer
        .replay_images(&config.output.image_errors_path, None)
        .await
        .unwrap();
    assert_eq!(report, ReplayReport::default());

    assert!(!config.output.checkpoint_root.exists());
    assert!(renderer.rendered().is_empty());
}

#[tokio::test]
async fn test_link_replay_repairs_checkpoint_and_requeues_failures() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path(), &["dhaka"]);
    let root = &config.output.checkpoint_root;
    let renderer = ScriptedRenderer::new();
    renderer.page(&site_url("/dr-a/"), profile_page("Dr. A"));

    let queue = &config.output.link_errors_path;
    ErrorQueue::append_entry(queue, link_error(root, &site_url("/dr-a/"))).unwrap();
    ErrorQueue::append_entry(queue, link_error(root, &site_url("/dr-x/"))).unwrap();

    let report = Replayer::new(&renderer, &config)
        .replay_links()
        .await
        .unwrap();

    assert_eq!(report.attempted, 2);
    assert_eq!(report.repaired, 1);
    assert_eq!(report.requeued, 1);

    // The department never had a checkpoint; replay creates it
    let checkpoint = checkpoint_path(&link_error(root, "").file_id);
    let doc = read_checkpoint(&checkpoint).unwrap();
    assert_eq!(doc.doctor.len(), 1);
    assert_eq!(doc.doctor[0].name, "Dr. A");
    assert_eq!(doc.doctor[0].department_id, "eye-id");

    let remaining: ErrorQueue<LinkError> = ErrorQueue::load(queue).unwrap();
    let remaining: Vec<&LinkError> = remaining.iter().collect();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].link, site_url("/dr-x/"));
}

#[tokio::test]
async fn test_link_replay_appends_to_existing_checkpoint() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path(), &["dhaka"]);
    let root = &config.output.checkpoint_root;
    let renderer = ScriptedRenderer::new();
    renderer.page(&site_url("/dr-b/"), profile_page("Dr. B"));

    let existing = DoctorProfile {
        name: "Dr. A".to_string(),
        link: site_url("/dr-a/"),
        ..DoctorProfile::default()
    };
    ensure_district_dir(root, "dhaka").unwrap();
    let checkpoint = checkpoint_path(&link_error(root, "").file_id);
    write_checkpoint(&checkpoint, &CheckpointDocument::new(vec![existing])).unwrap();

    ErrorQueue::append_entry(
        &config.output.link_errors_path,
        link_error(root, &site_url("/dr-b/")),
    )
    .unwrap();

    Replayer::new(&renderer, &config)
        .replay_links()
        .await
        .unwrap();

    let names: Vec<String> = read_checkpoint(&checkpoint)
        .unwrap()
        .doctor
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(names, vec!["Dr. A", "Dr. B"]);
}

#[tokio::test]
async fn test_link_replay_skips_links_already_in_checkpoint() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path(), &["dhaka"]);
    let root = &config.output.checkpoint_root;
    let renderer = ScriptedRenderer::new();
    renderer.page(&site_url("/dr-a/"), profile_page("Dr. A"));

    let existing = DoctorProfile {
        link: site_url("/dr-a/"),
        ..DoctorProfile::default()
    };
    ensure_district_dir(root, "dhaka").unwrap();
    let checkpoint = checkpoint_path(&link_error(root, "").file_id);
    write_checkpoint(&checkpoint, &CheckpointDocument::new(vec![existing])).unwrap();

    let queue = &config.output.link_errors_path;
    ErrorQueue::append_entry(queue, link_error(root, &site_url("/dr-a/"))).unwrap();
    ErrorQueue::append_entry(queue, link_error(root, &site_url("/dr-a/"))).unwrap();

    let report = Replayer::new(&renderer, &config)
        .replay_links()
        .await
        .unwrap();

    assert_eq!(report.skipped, 2);
    assert_eq!(report.repaired, 0);
    assert_eq!(read_checkpoint(&checkpoint).unwrap().doctor.len(), 1);
    assert!(renderer.rendered().is_empty());
    assert!(ErrorQueue::<LinkError>::load(queue).unwrap().is_empty());
}

#[tokio::test]
async fn test_link_replay_dedups_repeated_entries() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path(), &["dhaka"]);
    let root = &config.output.checkpoint_root;
    let renderer = ScriptedRenderer::new();
    renderer.page(&site_url("/dr-a/"), profile_page("Dr. A"));

    let queue = &config.output.link_errors_path;
    ErrorQueue::append_entry(queue, link_error(root, &site_url("/dr-a/"))).unwrap();
    ErrorQueue::append_entry(queue, link_error(root, &site_url("/dr-a/"))).unwrap();

    let report = Replayer::new(&renderer, &config)
        .replay_links()
        .await
        .unwrap();

    assert_eq!(report.repaired, 1);
    assert_eq!(report.skipped, 1);
    let checkpoint = checkpoint_path(&link_error(root, "").file_id);
    assert_eq!(read_checkpoint(&checkpoint).unwrap().doctor.len(), 1);
}

#[tokio::test]
async fn test_image_replay_saves_under_existing_id() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path(), &["dhaka"]);
    let renderer = ScriptedRenderer::new();
    renderer.page(&site_url("/dr-a/"), profile_page("Dr. A"));
    renderer.page(&site_url("/dr-b/"), profile_page("Dr. B"));
    renderer.break_image(&site_url("/dr-b/"));

    let read = config.output.image_errors_path.clone();
    ErrorQueue::append_entry(&read, image_error("img-a", &site_url("/dr-a/"))).unwrap();
    ErrorQueue::append_entry(&read, image_error("img-b", &site_url("/dr-b/"))).unwrap();
    ErrorQueue::append_entry(&read, image_error("img-c", &site_url("/dr-gone/"))).unwrap();

    let report = Replayer::new(&renderer, &config)
        .replay_images(&read, None)
        .await
        .unwrap();

    assert_eq!(report.attempted, 3);
    assert_eq!(report.repaired, 1);
    assert_eq!(report.requeued, 2);
    assert!(config.output.images_dir.join("img-a.png").exists());

    // The input is drained and the failures moved to the retry queue
    assert!(ErrorQueue::<ImageError>::load(&read).unwrap().is_empty());
    let retry: ErrorQueue<ImageError> = ErrorQueue::load(&retry_path(&read)).unwrap();
    let ids: Vec<&str> = retry.iter().map(|e| e.image_id.as_str()).collect();
    assert_eq!(ids, vec!["img-b", "img-c"]);
}

#[tokio::test]
async fn test_image_replay_to_explicit_write_queue() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path(), &["dhaka"]);
    let renderer = ScriptedRenderer::new();

    let read = dir.path().join("in.json");
    let write = dir.path().join("out.json");
    ErrorQueue::append_entry(&read, image_error("img-x", &site_url("/dr-x/"))).unwrap();

    Replayer::new(&renderer, &config)
        .replay_images(&read, Some(&write))
        .await
        .unwrap();

    assert_eq!(ErrorQueue::<ImageError>::load(&write).unwrap().len(), 1);
    assert!(!retry_path(&read).exists());
}

#[tokio::test]
async fn test_image_replay_rejects_same_read_and_write() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path(), &["dhaka"]);
    let renderer = ScriptedRenderer::new();
    let read = config.output.image_errors_path.clone();

    let result = Replayer::new(&renderer, &config)
        .replay_images(&read, Some(&read))
        .await;

    assert!(matches!(result, Err(HarvestError::InvalidArgument(_))));
}

#[tokio::test]
async fn test_image_replay_rejects_differently_spelled_same_queue() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path(), &["dhaka"]);
    let renderer = ScriptedRenderer::new();
    let read = config.output.image_errors_path.clone();
    ErrorQueue::append_entry(&read, image_error("img-a", &site_url("/dr-a/"))).unwrap();

    let write = dir.path().join("./images/../imageError.json");
    let result = Replayer::new(&renderer, &config)
        .replay_images(&read, Some(&write))
        .await;

    assert!(matches!(result, Err(HarvestError::InvalidArgument(_))));
    assert!(renderer.rendered().is_empty());
    assert_eq!(ErrorQueue::<ImageError>::load(&read).unwrap().len(), 1);
}
