//! Crawl orchestration
//!
//! Districts and departments are walked sequentially. Within a department,
//! every profile link is submitted to the limiter and the whole batch is
//! settled before anything is written:
//! - department discovery renders each district's listing page
//! - profile-link discovery renders each department page
//! - harvesting runs one render session per profile link
//! - checkpointing writes the fulfilled profiles in scheduling order

use crate::config::{validate_district_name, Config, OutputConfig, SelectorConfig, SiteConfig};
use crate::crawler::harvest::{HarvestOutcome, Harvester};
use crate::crawler::limiter::TaskLimiter;
use crate::model::{
    generate_id, CheckpointDocument, DepartmentCatalog, DepartmentEntry, DoctorProfile, LinkError,
};
use crate::render::{Renderer, ResourceBlocklist};
use crate::storage::{
    checkpoint_file_id, checkpoint_path, ensure_district_dir, save_catalog, write_checkpoint,
    ErrorQueue,
};
use crate::HarvestError;
use futures::future::join_all;
use std::collections::HashSet;
use std::path::PathBuf;

/// Summary of one department's harvest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartmentReport {
    pub district: String,
    pub department: String,
    pub links: usize,
    pub harvested: usize,
    pub failed: usize,
    /// Harvested profiles whose photo went to the image-error queue
    pub images_queued: usize,
    /// Checkpoint written for this department, if any profile was harvested
    pub checkpoint: Option<PathBuf>,
}

/// A department skipped because its listing page failed to render
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedDepartment {
    pub district: String,
    pub department: String,
    pub link: String,
}

/// Summary of a crawl over a department catalog
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlReport {
    pub departments: Vec<DepartmentReport>,
    pub failed_departments: Vec<FailedDepartment>,
    /// Districts skipped because their name cannot be used as a directory
    pub failed_districts: Vec<String>,
}

impl CrawlReport {
    /// Folds another report, typically one district's, into this one
    pub fn merge(&mut self, other: CrawlReport) {
        self.departments.extend(other.departments);
        self.failed_departments.extend(other.failed_departments);
        self.failed_districts.extend(other.failed_districts);
    }

    pub fn total_links(&self) -> usize {
        self.departments.iter().map(|d| d.links).sum()
    }

    pub fn total_harvested(&self) -> usize {
        self.departments.iter().map(|d| d.harvested).sum()
    }

    pub fn total_failed(&self) -> usize {
        self.departments.iter().map(|d| d.failed).sum()
    }

    pub fn total_images_queued(&self) -> usize {
        self.departments.iter().map(|d| d.images_queued).sum()
    }
}

/// Collects the links of already-harvested profiles for the uniqueness filter
pub fn known_links(profiles: &[DoctorProfile]) -> HashSet<String> {
    profiles.iter().map(|p| p.link.clone()).collect()
}

/// Drives department discovery and per-department harvesting
pub struct Orchestrator<'r, R: Renderer + ?Sized> {
    renderer: &'r R,
    site: SiteConfig,
    output: OutputConfig,
    selectors: SelectorConfig,
    limiter: TaskLimiter,
    harvester: Harvester,
}

impl<'r, R: Renderer + ?Sized> Orchestrator<'r, R> {
    pub fn new(renderer: &'r R, config: &Config) -> Self {
        Self {
            renderer,
            site: config.site.clone(),
            output: config.output.clone(),
            selectors: config.selectors.clone(),
            limiter: TaskLimiter::new(config.crawler.concurrency_limit as usize),
            harvester: Harvester::from_config(config),
        }
    }

    /// Discovers the departments of every configured district
    ///
    /// The catalog is written once, after all districts have been listed; a
    /// listing failure aborts discovery and nothing is written.
    pub async fn discover_departments(&self) -> Result<DepartmentCatalog, HarvestError> {
        let mut catalog = DepartmentCatalog::new();

        for district in &self.site.districts {
            let departments = self.discover_district(district).await?;
            tracing::info!("{}: {} departments", district, departments.len());
            catalog.insert(district.clone(), departments);
        }

        save_catalog(&self.output.catalog_path, &catalog)?;
        tracing::info!(
            "Saved {} departments across {} districts to {}",
            catalog.department_count(),
            catalog.district_count(),
            self.output.catalog_path.display()
        );

        Ok(catalog)
    }

    /// Lists the departments on one district's page, each with a fresh id
    pub async fn discover_district(
        &self,
        district: &str,
    ) -> Result<Vec<DepartmentEntry>, HarvestError> {
        let url = self.site.district_url(district);
        let document = self
            .renderer
            .render(&url, &ResourceBlocklist::none())
            .await
            .map_err(|source| HarvestError::Listing { url, source })?;

        let departments = self
            .renderer
            .extract_anchors(&document, &self.selectors.department_links)
            .into_iter()
            .map(|anchor| DepartmentEntry {
                id: generate_id(),
                name: anchor.html,
                link: anchor.href,
            })
            .collect();

        Ok(departments)
    }

    /// Lists the absolute profile links on a department page
    ///
    /// With `known` set, links already in it are dropped.
    pub async fn profile_links(
        &self,
        department: &DepartmentEntry,
        known: Option<&HashSet<String>>,
    ) -> Result<Vec<String>, HarvestError> {
        let document = self
            .renderer
            .render(&department.link, &ResourceBlocklist::all())
            .await
            .map_err(|source| HarvestError::Listing {
                url: department.link.clone(),
                source,
            })?;

        let links = self
            .renderer
            .extract_anchors(&document, &self.selectors.profile_links)
            .into_iter()
            .map(|anchor| anchor.href)
            .filter(|link| known.map_or(true, |known| !known.contains(link)))
            .collect();

        Ok(links)
    }

    /// Harvests every department in the catalog
    ///
    /// A department whose listing page fails to render is logged and skipped;
    /// a district with an unusable name is skipped whole. Storage failures
    /// abort the crawl.
    pub async fn crawl(
        &self,
        catalog: &DepartmentCatalog,
        known: Option<&HashSet<String>>,
    ) -> Result<CrawlReport, HarvestError> {
        let mut report = CrawlReport::default();
        let start_time = std::time::Instant::now();

        for (district, departments) in catalog.iter() {
            match self.crawl_district(district, departments, known).await {
                Ok(district_report) => report.merge(district_report),
                Err(HarvestError::Config(e)) => {
                    tracing::error!("Skipping district {}: {}", district, e);
                    report.failed_districts.push(district.to_string());
                }
                Err(e) => return Err(e),
            }
        }

        tracing::info!(
            "Crawl completed in {:?}: {} of {} profiles harvested, {} failed, {} images queued",
            start_time.elapsed(),
            report.total_harvested(),
            report.total_links(),
            report.total_failed(),
            report.total_images_queued()
        );

        Ok(report)
    }

    /// Harvests the departments of one district in catalog order
    ///
    /// A department listing failure costs only that department; the rest of
    /// the district is still crawled.
    pub async fn crawl_district(
        &self,
        district: &str,
        departments: &[DepartmentEntry],
        known: Option<&HashSet<String>>,
    ) -> Result<CrawlReport, HarvestError> {
        validate_district_name(district)?;

        let mut report = CrawlReport::default();
        for (ordinal, department) in departments.iter().enumerate() {
            let links = match self.profile_links(department, known).await {
                Ok(links) => links,
                Err(HarvestError::Listing { url, source }) => {
                    tracing::error!(
                        "{} {} of {} ({}): listing failed, skipping: {} ({})",
                        district,
                        ordinal + 1,
                        departments.len(),
                        department.name,
                        source,
                        url
                    );
                    report.failed_departments.push(FailedDepartment {
                        district: district.to_string(),
                        department: department.name.clone(),
                        link: url,
                    });
                    continue;
                }
                Err(e) => return Err(e),
            };
            tracing::info!(
                "{} {} of {} ({}): {} links",
                district,
                ordinal + 1,
                departments.len(),
                department.name,
                links.len()
            );
            let department_report = self
                .crawl_department(district, ordinal, department, &links)
                .await?;
            report.departments.push(department_report);
        }

        Ok(report)
    }

    /// Harvests a department's profile links and writes its checkpoint
    ///
    /// Profiles are written in the order their links were scheduled. Each
    /// failed link is appended to the link-error queue; no checkpoint file is
    /// written when nothing was harvested.
    pub async fn crawl_department(
        &self,
        district: &str,
        ordinal: usize,
        department: &DepartmentEntry,
        links: &[String],
    ) -> Result<DepartmentReport, HarvestError> {
        let file_id = checkpoint_file_id(
            &self.output.checkpoint_root,
            district,
            ordinal,
            &department.name,
        );
        let image_errors = self.output.image_errors_path.as_path();

        let tasks = links.iter().map(move |link| {
            self.limiter.submit(move || {
                self.harvester
                    .harvest(self.renderer, link, &department.id, image_errors)
            })
        });
        let outcomes = join_all(tasks).await;

        let mut report = DepartmentReport {
            district: district.to_string(),
            department: department.name.clone(),
            links: links.len(),
            harvested: 0,
            failed: 0,
            images_queued: 0,
            checkpoint: None,
        };
        let mut profiles = Vec::new();

        for outcome in outcomes {
            match outcome? {
                HarvestOutcome::Harvested { profile, image } => {
                    if !image.is_saved() {
                        report.images_queued += 1;
                    }
                    profiles.push(profile);
                }
                HarvestOutcome::Failed { link, .. } => {
                    ErrorQueue::append_entry(
                        &self.output.link_errors_path,
                        LinkError {
                            link,
                            district: district.to_string(),
                            file_id: file_id.clone(),
                            department_id: department.id.clone(),
                        },
                    )?;
                    report.failed += 1;
                }
            }
        }
        report.harvested = profiles.len();

        if profiles.is_empty() {
            tracing::warn!(
                "{}: no profiles harvested, no checkpoint written",
                department.name
            );
            return Ok(report);
        }

        ensure_district_dir(&self.output.checkpoint_root, district)?;
        let path = checkpoint_path(&file_id);
        write_checkpoint(&path, &CheckpointDocument::new(profiles))?;
        tracing::info!(
            "{}: {} profiles saved to {} ({} failed)",
            department.name,
            report.harvested,
            path.display(),
            report.failed
        );
        report.checkpoint = Some(path);

        Ok(report)
    }
}
