//! Artifact generation: bundled (compressed) and per-file (processed) output.

use std::fs;
use std::path::{Path, PathBuf};

use super::OutputDir;
use super::error::PipelineError;
use crate::asset::{
    AssetFamily, AssetKey, AssetLocation, Compressor, ProcessContext, ProcessorChain, join_logical,
};

type Result<T> = std::result::Result<T, PipelineError>;

/// How a cache miss turns registered locations into deliverables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Serve registered files unchanged.
    PassThrough,
    /// One processed output per input file.
    PerFile,
    /// One processed, concatenated and compressed output per tag-set.
    Bundle,
}

impl Strategy {
    pub fn select(family: AssetFamily, compress: bool, has_processors: bool) -> Self {
        if !family.is_processable() {
            Self::PassThrough
        } else if compress {
            Self::Bundle
        } else if has_processors {
            Self::PerFile
        } else {
            Self::PassThrough
        }
    }
}

/// Read a source file and fold it through the family's processors.
fn read_processed(location: &AssetLocation, family: AssetFamily, chain: &ProcessorChain) -> Result<String> {
    let content = fs::read_to_string(location.physical())
        .map_err(|e| PipelineError::io("reading", location.physical(), e))?;
    let ctx = ProcessContext {
        family,
        physical: location.physical(),
        deliverable: location.deliverable(),
    };
    chain
        .apply(content, &ctx)
        .map_err(|(processor, source)| PipelineError::Processor {
            processor,
            path: location.physical().to_path_buf(),
            source,
        })
}

fn write_artifact(output: &OutputDir, file_name: &str, content: &str) -> Result<AssetLocation> {
    let physical: PathBuf = output.physical.join(file_name);
    fs::write(&physical, content).map_err(|e| PipelineError::io("writing", &physical, e))?;
    crate::debug!("write"; "{}", physical.display());
    Ok(AssetLocation::new(join_logical(&output.logical, file_name), physical))
}

/// Process, concatenate and compress `locations` into one artifact named
/// after the key.
pub fn bundle(
    key: &AssetKey,
    locations: &[AssetLocation],
    chain: &ProcessorChain,
    compressor: &dyn Compressor,
    output: &OutputDir,
) -> Result<AssetLocation> {
    let family = key.family();
    let extension = family
        .extension()
        .ok_or(PipelineError::UnsupportedFamily(family))?;

    let mut buffer = String::new();
    for location in locations {
        buffer.push_str(&read_processed(location, family, chain)?);
        // Blank line between sources keeps statements and rules apart
        buffer.push_str("\n\n");
    }

    let compressed = compressor
        .compress(&buffer)
        .map_err(|source| PipelineError::Compress {
            family,
            name: key.compiled_name(),
            source,
        })?;

    let file_name = format!("{}.{extension}", key.compiled_name());
    crate::debug!("bundle"; "{} ({} files, {} -> {} bytes)", file_name, locations.len(), buffer.len(), compressed.len());
    write_artifact(output, &file_name, &compressed)
}

/// Process every location independently, one artifact per input.
///
/// Artifacts keep the source file name (plus the family extension), so
/// tag-sets sharing a file share its artifact.
pub fn process_each(
    family: AssetFamily,
    locations: &[AssetLocation],
    chain: &ProcessorChain,
    output: &OutputDir,
) -> Result<Vec<AssetLocation>> {
    let extension = family
        .extension()
        .ok_or(PipelineError::UnsupportedFamily(family))?;

    locations
        .iter()
        .map(|location| {
            let content = read_processed(location, family, chain)?;
            let file_name = artifact_name(location.physical(), extension)?;
            write_artifact(output, &file_name, &content)
        })
        .collect()
}

/// Source file name with `.<extension>` appended when absent.
fn artifact_name(physical: &Path, extension: &str) -> Result<String> {
    let name = physical
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| {
            PipelineError::config(format!("asset path has no file name: {}", physical.display()))
        })?;
    let suffix = format!(".{extension}");
    Ok(if name.ends_with(&suffix) {
        name
    } else {
        name + &suffix
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::{ProcessContext, ResourceProcessor};
    use std::sync::Arc;
    use tempfile::TempDir;

    struct Upper;

    impl ResourceProcessor for Upper {
        fn transform(&self, content: String, _ctx: &ProcessContext<'_>) -> anyhow::Result<String> {
            Ok(content.to_uppercase())
        }
    }

    /// Compressor that only trims.
    struct Trim;

    impl Compressor for Trim {
        fn compress(&self, source: &str) -> anyhow::Result<String> {
            Ok(source.trim().to_string())
        }
    }

    struct Broken;

    impl Compressor for Broken {
        fn compress(&self, _source: &str) -> anyhow::Result<String> {
            anyhow::bail!("unbalanced braces")
        }
    }

    fn fixture() -> (TempDir, OutputDir, Vec<AssetLocation>) {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("gen");
        fs::create_dir_all(&out).unwrap();
        let a = dir.path().join("a.js");
        let b = dir.path().join("b.txt");
        fs::write(&a, "one").unwrap();
        fs::write(&b, "two").unwrap();
        let output = OutputDir {
            logical: "/gen".into(),
            physical: out,
        };
        let locations = vec![AssetLocation::new("/a.js", a), AssetLocation::new("/b.txt", b)];
        (dir, output, locations)
    }

    #[test]
    fn test_strategy_select() {
        use AssetFamily::*;
        assert_eq!(Strategy::select(File, true, true), Strategy::PassThrough);
        assert_eq!(Strategy::select(Script, true, false), Strategy::Bundle);
        assert_eq!(Strategy::select(Style, true, true), Strategy::Bundle);
        assert_eq!(Strategy::select(Style, false, true), Strategy::PerFile);
        assert_eq!(Strategy::select(Script, false, false), Strategy::PassThrough);
    }

    #[test]
    fn test_bundle_joins_in_order() {
        let (_dir, output, locations) = fixture();
        let mut chain = ProcessorChain::new();
        chain.push(Arc::new(Upper));
        let key = AssetKey::new(AssetFamily::Script, ["core"]);

        let result = bundle(&key, &locations, &chain, &Trim, &output).unwrap();
        assert_eq!(result.deliverable(), "/gen/script_CORE.js");
        assert_eq!(fs::read_to_string(result.physical()).unwrap(), "ONE\n\nTWO");
    }

    #[test]
    fn test_bundle_compress_failure() {
        let (_dir, output, locations) = fixture();
        let key = AssetKey::new(AssetFamily::Style, ["theme"]);
        let err = bundle(&key, &locations, &ProcessorChain::new(), &Broken, &output).unwrap_err();
        match err {
            PipelineError::Compress { family, name, .. } => {
                assert_eq!(family, AssetFamily::Style);
                assert_eq!(name, "style_THEME");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_process_each_appends_extension() {
        let (_dir, output, locations) = fixture();
        let mut chain = ProcessorChain::new();
        chain.push(Arc::new(Upper));

        let results = process_each(AssetFamily::Script, &locations, &chain, &output).unwrap();
        let deliverables: Vec<_> = results.iter().map(|l| l.deliverable()).collect();
        assert_eq!(deliverables, ["/gen/a.js", "/gen/b.txt.js"]);
        assert_eq!(fs::read_to_string(results[1].physical()).unwrap(), "TWO");
    }

    #[test]
    fn test_missing_source_is_io_error() {
        let (dir, output, _) = fixture();
        let gone = vec![AssetLocation::new("/gone.css", dir.path().join("gone.css"))];
        let err = process_each(AssetFamily::Style, &gone, &ProcessorChain::new(), &output).unwrap_err();
        assert!(matches!(err, PipelineError::Io { action: "reading", .. }));
    }

    #[test]
    fn test_file_family_cannot_bundle() {
        let (_dir, output, locations) = fixture();
        let key = AssetKey::new(AssetFamily::File, ["x"]);
        assert!(matches!(
            bundle(&key, &locations, &ProcessorChain::new(), &Trim, &output),
            Err(PipelineError::UnsupportedFamily(AssetFamily::File))
        ));
    }
}
