//! `pith build`: resolve every declared bundle ahead of time.
//!
//! Bundles come from `[[bundle]]`; without any, every declared tag is
//! resolved on its own.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Result, anyhow};
use pith::logger::ProgressLine;
use pith::{AssetFamily, PithConfig, log, utils::plural_count};
use rayon::prelude::*;

/// One tag-set to resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Job {
    family: AssetFamily,
    tags: Vec<String>,
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.family, self.tags.join(","))
    }
}

fn collect_jobs(config: &PithConfig) -> Vec<Job> {
    if !config.bundle.is_empty() {
        return config
            .bundle
            .iter()
            .map(|bundle| Job {
                family: bundle.family,
                tags: bundle.tags.clone(),
            })
            .collect();
    }

    AssetFamily::ALL
        .into_iter()
        .flat_map(|family| {
            config.tags(family).iter().map(move |entry| Job {
                family,
                tags: vec![entry.name.clone()],
            })
        })
        .collect()
}

pub fn build(config: &PithConfig) -> Result<()> {
    let pipeline = super::freeze(config)?;
    let jobs = collect_jobs(config);
    if jobs.is_empty() {
        log!("build"; "nothing to build");
        return Ok(());
    }

    let totals = AssetFamily::ALL.map(|family| {
        (family.name(), jobs.iter().filter(|job| job.family == family).count())
    });
    let progress = ProgressLine::new(&totals);
    let has_error = AtomicBool::new(false);

    let result: Result<Vec<usize>> = jobs
        .par_iter()
        .map(|job| {
            if has_error.load(Ordering::Relaxed) {
                return Err(anyhow!("Aborted"));
            }
            match pipeline.resolve(job.family, job.tags.as_slice()) {
                Ok(paths) => {
                    progress.inc(job.family.name());
                    Ok(paths.len())
                }
                Err(e) => {
                    if !has_error.swap(true, Ordering::Relaxed) {
                        log!("error"; "{job}: {e:#}");
                    }
                    Err(anyhow!("Build failed"))
                }
            }
        })
        .collect();
    progress.finish();
    let outputs = result?;

    let stats = pipeline.stats();
    log!(
        "build";
        "{} resolved into {} ({} shared)",
        plural_count(jobs.len(), "tag-set"),
        plural_count(outputs.iter().sum(), "deliverable"),
        stats.hits
    );
    Ok(())
}
