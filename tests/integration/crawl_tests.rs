//! Integration tests for discovery and crawling
//!
//! These tests drive the orchestrator through the scripted renderer and check
//! what lands on disk: the catalog, checkpoints, and both error queues.

use crate::support::{
    department_page, district_page, profile_page, site_url, test_config, ScriptedRenderer,
};
use doctor_harvest::crawler::{known_links, FailedDepartment, Orchestrator};
use doctor_harvest::model::{
    DepartmentCatalog, DepartmentEntry, DoctorProfile, ImageError, LinkError,
};
use doctor_harvest::storage::{load_catalog, read_checkpoint, ErrorQueue};
use std::collections::HashSet;
use std::time::Duration;
use tempfile::TempDir;

fn department(name: &str, path: &str) -> DepartmentEntry {
    DepartmentEntry {
        id: format!("{}-id", name.to_lowercase()),
        name: name.to_string(),
        link: site_url(path),
    }
}

fn single_department_catalog(district: &str, dept: DepartmentEntry) -> DepartmentCatalog {
    let mut catalog = DepartmentCatalog::new();
    catalog.insert(district, vec![dept]);
    catalog
}

#[tokio::test]
async fn test_discover_departments_saves_catalog() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path(), &["dhaka", "sylhet"]);
    let renderer = ScriptedRenderer::new();
    renderer.page(
        &site_url("/doctors-dhaka/"),
        district_page(&[
            ("/cardiology-dhaka/", "Cardiology"),
            ("eye-dhaka/", "Eye"),
        ]),
    );
    renderer.page(
        &site_url("/doctors-sylhet/"),
        district_page(&[("/dental-sylhet/", "Dental")]),
    );

    let catalog = Orchestrator::new(&renderer, &config)
        .discover_departments()
        .await
        .unwrap();

    let dhaka = catalog.get("dhaka").unwrap();
    assert_eq!(dhaka.len(), 2);
    assert_eq!(dhaka[0].name, "Cardiology");
    assert_eq!(dhaka[0].link, site_url("/cardiology-dhaka/"));
    // relative hrefs resolve against the listing page
    assert_eq!(dhaka[1].link, site_url("/doctors-dhaka/eye-dhaka/"));
    assert!(!dhaka[0].id.is_empty());
    assert_ne!(dhaka[0].id, dhaka[1].id);

    assert_eq!(load_catalog(&config.output.catalog_path).unwrap(), catalog);
}

#[tokio::test]
async fn test_discovery_failure_writes_no_catalog() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path(), &["dhaka", "sylhet"]);
    let renderer = ScriptedRenderer::new();
    renderer.page(
        &site_url("/doctors-dhaka/"),
        district_page(&[("/cardiology-dhaka/", "Cardiology")]),
    );

    let result = Orchestrator::new(&renderer, &config)
        .discover_departments()
        .await;

    assert!(result.is_err());
    assert!(!config.output.catalog_path.exists());
}

#[tokio::test]
async fn test_checkpoint_holds_fulfilled_profiles_in_scheduling_order() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path(), &["dhaka"]);
    let renderer = ScriptedRenderer::with_delay(Duration::from_millis(5));
    let dept = department("Cardiology", "/cardiology-dhaka/");

    renderer.page(
        &dept.link,
        department_page(&["/dr-a/", "/dr-b/", "/dr-c/", "/dr-d/", "/dr-e/"]),
    );
    for name in ["a", "c", "d", "e"] {
        renderer.page(
            &site_url(&format!("/dr-{}/", name)),
            profile_page(&format!("Dr. {}", name)),
        );
    }

    let report = Orchestrator::new(&renderer, &config)
        .crawl(&single_department_catalog("dhaka", dept.clone()), None)
        .await
        .unwrap();

    assert_eq!(report.total_links(), 5);
    assert_eq!(report.total_harvested(), 4);
    assert_eq!(report.total_failed(), 1);

    let checkpoint = dir.path().join("doc-list/dhaka/0-Cardiology-doctors.json");
    assert_eq!(
        report.departments[0].checkpoint.as_deref(),
        Some(checkpoint.as_path())
    );

    let doc = read_checkpoint(&checkpoint).unwrap();
    let names: Vec<&str> = doc.doctor.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Dr. a", "Dr. c", "Dr. d", "Dr. e"]);

    let first: &DoctorProfile = &doc.doctor[0];
    assert_eq!(first.department_id, "cardiology-id");
    assert_eq!(first.link, site_url("/dr-a/"));
    assert_eq!(first.degree, "MBBS");
    assert_eq!(first.chamber.hospital, "Green Clinic");
    assert_eq!(first.chamber.address, "12 Green Rd");
    assert_eq!(first.chamber.visiting_time, "5pm-9pm");
    assert_eq!(first.chamber.appointment_number, "01700-000000");
    assert!(dir
        .path()
        .join(format!("images/{}.png", first.image_id))
        .exists());

    let errors: ErrorQueue<LinkError> = ErrorQueue::load(&config.output.link_errors_path).unwrap();
    let errors: Vec<&LinkError> = errors.iter().collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].link, site_url("/dr-b/"));
    assert_eq!(errors[0].district, "dhaka");
    assert_eq!(errors[0].department_id, "cardiology-id");
    assert_eq!(errors[0].checkpoint_path(), checkpoint);
}

#[tokio::test]
async fn test_failed_link_is_queued_once_per_occurrence() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path(), &["dhaka"]);
    let renderer = ScriptedRenderer::new();
    let dept = department("Eye", "/eye-dhaka/");

    renderer.page(&site_url("/dr-a/"), profile_page("Dr. A"));
    let scheduled = vec![site_url("/dr-x/"), site_url("/dr-a/"), site_url("/dr-x/")];

    let report = Orchestrator::new(&renderer, &config)
        .crawl_department("dhaka", 3, &dept, &scheduled)
        .await
        .unwrap();

    assert_eq!(report.failed, 2);
    let errors: ErrorQueue<LinkError> = ErrorQueue::load(&config.output.link_errors_path).unwrap();
    assert_eq!(errors.len(), 2);
    assert!(errors.iter().all(|e| e.link == site_url("/dr-x/")));
    assert!(errors
        .iter()
        .all(|e| e.file_id.ends_with("dhaka/3-Eye-doctors")));
}

#[tokio::test]
async fn test_image_failure_keeps_profile_and_queues_once() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path(), &["dhaka"]);
    let renderer = ScriptedRenderer::new();
    let dept = department("Eye", "/eye-dhaka/");

    renderer.page(&site_url("/dr-a/"), profile_page("Dr. A"));
    renderer.break_image(&site_url("/dr-a/"));

    let report = Orchestrator::new(&renderer, &config)
        .crawl_department("dhaka", 0, &dept, &[site_url("/dr-a/")])
        .await
        .unwrap();

    assert_eq!(report.harvested, 1);
    assert_eq!(report.images_queued, 1);

    let doc = read_checkpoint(report.checkpoint.as_deref().unwrap()).unwrap();
    let image_id = doc.doctor[0].image_id.clone();
    assert!(!image_id.is_empty());

    let errors: ErrorQueue<ImageError> =
        ErrorQueue::load(&config.output.image_errors_path).unwrap();
    let errors: Vec<&ImageError> = errors.iter().collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].image_id, image_id);
    assert_eq!(errors[0].link, site_url("/dr-a/"));
    let photo = config.output.images_dir.join(format!("{}.png", image_id));
    assert!(!photo.exists());
}

#[tokio::test]
async fn test_uniqueness_filter_skips_known_links() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path(), &["dhaka"]);
    let renderer = ScriptedRenderer::new();
    let dept = department("Eye", "/eye-dhaka/");

    renderer.page(&dept.link, department_page(&["/dr-a/", "/dr-b/"]));
    renderer.page(&site_url("/dr-a/"), profile_page("Dr. A"));
    renderer.page(&site_url("/dr-b/"), profile_page("Dr. B"));

    let already = DoctorProfile {
        link: site_url("/dr-a/"),
        ..DoctorProfile::default()
    };
    let known: HashSet<String> = known_links(&[already]);

    let orchestrator = Orchestrator::new(&renderer, &config);
    let links = orchestrator.profile_links(&dept, Some(&known)).await;
    assert_eq!(links.unwrap(), vec![site_url("/dr-b/")]);

    let report = orchestrator
        .crawl(&single_department_catalog("dhaka", dept), Some(&known))
        .await
        .unwrap();

    assert_eq!(report.total_harvested(), 1);
    assert!(!renderer.rendered().contains(&site_url("/dr-a/")));
}

#[tokio::test]
async fn test_empty_department_writes_no_checkpoint() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path(), &["dhaka"]);
    let renderer = ScriptedRenderer::new();
    let dept = department("Eye", "/eye-dhaka/");
    renderer.page(&dept.link, department_page(&["/dr-gone/"]));

    let report = Orchestrator::new(&renderer, &config)
        .crawl(&single_department_catalog("dhaka", dept), None)
        .await
        .unwrap();

    assert_eq!(report.departments[0].checkpoint, None);
    assert!(!dir.path().join("doc-list/dhaka").exists());
}

#[tokio::test]
async fn test_listing_failure_skips_only_its_department() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path(), &["dhaka", "sylhet"]);
    let renderer = ScriptedRenderer::new();

    let cardiology = department("Cardiology", "/cardiology-dhaka/");
    let broken = department("Eye", "/eye-dhaka/");
    let neurology = department("Neurology", "/neurology-dhaka/");
    let dental = department("Dental", "/dental-sylhet/");
    renderer.page(&cardiology.link, department_page(&["/dr-a/"]));
    renderer.page(&neurology.link, department_page(&["/dr-c/"]));
    renderer.page(&dental.link, department_page(&["/dr-s/"]));
    for name in ["a", "c", "s"] {
        renderer.page(
            &site_url(&format!("/dr-{}/", name)),
            profile_page(&format!("Dr. {}", name)),
        );
    }

    let mut catalog = DepartmentCatalog::new();
    catalog.insert("dhaka", vec![cardiology, broken.clone(), neurology]);
    catalog.insert("sylhet", vec![dental]);

    let report = Orchestrator::new(&renderer, &config)
        .crawl(&catalog, None)
        .await
        .unwrap();

    assert!(report.failed_districts.is_empty());
    assert_eq!(
        report.failed_departments,
        vec![FailedDepartment {
            district: "dhaka".to_string(),
            department: "Eye".to_string(),
            link: broken.link,
        }]
    );

    let crawled: Vec<&str> = report
        .departments
        .iter()
        .map(|d| d.department.as_str())
        .collect();
    assert_eq!(crawled, vec!["Cardiology", "Neurology", "Dental"]);
    assert_eq!(report.total_harvested(), 3);

    // Ordinals follow the catalog, so the skipped department leaves a gap
    let root = dir.path().join("doc-list");
    assert!(root.join("dhaka/0-Cardiology-doctors.json").exists());
    assert!(!root.join("dhaka/1-Eye-doctors.json").exists());
    assert!(root.join("dhaka/2-Neurology-doctors.json").exists());
    assert!(root.join("sylhet/0-Dental-doctors.json").exists());
}

#[tokio::test]
async fn test_unusable_district_name_is_skipped() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path(), &["dhaka"]);
    let renderer = ScriptedRenderer::new();

    let dental = department("Dental", "/dental-dhaka/");
    renderer.page(&dental.link, department_page(&["/dr-s/"]));
    renderer.page(&site_url("/dr-s/"), profile_page("Dr. S"));

    let mut catalog = DepartmentCatalog::new();
    catalog.insert("../escape", vec![department("Eye", "/eye/")]);
    catalog.insert("dhaka", vec![dental]);

    let report = Orchestrator::new(&renderer, &config)
        .crawl(&catalog, None)
        .await
        .unwrap();

    assert_eq!(report.failed_districts, vec!["../escape".to_string()]);
    assert_eq!(report.total_harvested(), 1);
    assert!(!renderer.rendered().contains(&site_url("/eye/")));
}

#[tokio::test]
async fn test_render_sessions_respect_concurrency_limit() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path(), &["dhaka"]);
    let renderer = ScriptedRenderer::with_delay(Duration::from_millis(10));
    let dept = department("Eye", "/eye-dhaka/");

    let scheduled: Vec<String> = (0..8).map(|i| site_url(&format!("/dr-{}/", i))).collect();
    for (i, link) in scheduled.iter().enumerate() {
        renderer.page(link, profile_page(&format!("Dr. {}", i)));
    }

    let report = Orchestrator::new(&renderer, &config)
        .crawl_department("dhaka", 0, &dept, &scheduled)
        .await
        .unwrap();

    assert_eq!(report.harvested, 8);
    assert_eq!(
        renderer.max_in_flight(),
        config.crawler.concurrency_limit as usize
    );
}
