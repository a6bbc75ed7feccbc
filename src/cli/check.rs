//! `pith check`: validate the manifest and every registered file.

use anyhow::Result;
use pith::{AssetFamily, AssetPipeline, PithConfig, log, utils::plural_count};

pub fn check(config: &PithConfig) -> Result<()> {
    let pipeline = super::freeze(config)?;

    let mut total = 0;
    for family in AssetFamily::ALL {
        let (tags, files) = count(&pipeline, family);
        if tags == 0 {
            continue;
        }
        total += tags;
        log!(
            "check";
            "{family}: {}, {} ({:?})",
            plural_count(tags, "tag"),
            plural_count(files, "file"),
            pipeline.strategy(family)
        );
    }

    if total == 0 {
        log!("warning"; "no tags declared in {}", config.config_path.display());
    }
    if let Some(output) = pipeline.output() {
        log!("check"; "output {} -> {}", output.logical, output.physical.display());
    }
    log!("check"; "{} ok", config.config_path.display());
    Ok(())
}

/// Registered tag and file counts for one family.
fn count(pipeline: &AssetPipeline, family: AssetFamily) -> (usize, usize) {
    pipeline
        .tags()
        .filter(|tag| tag.family() == family)
        .fold((0, 0), |(tags, files), tag| (tags + 1, files + tag.locations().len()))
}
