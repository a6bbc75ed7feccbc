//! `pith resolve`: print the deliverables for one tag-set.

use anyhow::Result;
use pith::{AssetFamily, PithConfig, debug};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct Resolution<'a> {
    family: AssetFamily,
    tags: &'a [String],
    paths: Vec<String>,
}

pub fn resolve(config: &PithConfig, family: AssetFamily, tags: &[String], json: bool) -> Result<()> {
    let pipeline = super::freeze(config)?;
    debug!("resolve"; "{family} {:?} via {:?}", tags, pipeline.strategy(family));

    let paths = pipeline.resolve(family, tags)?;
    if json {
        let resolution = Resolution { family, tags, paths };
        println!("{}", serde_json::to_string_pretty(&resolution)?);
    } else {
        for path in &paths {
            println!("{path}");
        }
    }
    Ok(())
}
