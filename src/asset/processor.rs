//! Resource processor chains.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use super::AssetFamily;

/// Per-file information handed to every processor.
#[derive(Debug, Clone, Copy)]
pub struct ProcessContext<'a> {
    pub family: AssetFamily,
    /// Source file on disk.
    pub physical: &'a Path,
    /// Path the source is served from when not bundled.
    pub deliverable: &'a str,
}

/// Transforms the full text of one source file.
///
/// Implementations must be pure over their inputs and return the final text
/// synchronously. They may read `ctx.physical` again, e.g. to compile a
/// preprocessor language from disk.
pub trait ResourceProcessor: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    fn transform(&self, content: String, ctx: &ProcessContext<'_>) -> Result<String>;
}

/// Ordered list of processors, applied left to right.
#[derive(Clone, Default)]
pub struct ProcessorChain {
    processors: Vec<Arc<dyn ResourceProcessor>>,
}

impl ProcessorChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `processor` unless this exact instance is already present.
    ///
    /// Returns `false` for a repeated instance.
    pub fn push(&mut self, processor: Arc<dyn ResourceProcessor>) -> bool {
        if self.processors.iter().any(|p| Arc::ptr_eq(p, &processor)) {
            return false;
        }
        self.processors.push(processor);
        true
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.processors.len()
    }

    /// Fold `content` through every processor.
    ///
    /// Stops at the first failing processor and reports its name.
    pub fn apply(&self, content: String, ctx: &ProcessContext<'_>) -> Result<String, (String, anyhow::Error)> {
        self.processors.iter().try_fold(content, |text, processor| {
            processor
                .transform(text, ctx)
                .map_err(|err| (processor.name().to_string(), err))
        })
    }
}

impl fmt::Debug for ProcessorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.processors.iter().map(|p| p.name()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;

    struct Append(&'static str);

    impl ResourceProcessor for Append {
        fn name(&self) -> &str {
            "append"
        }

        fn transform(&self, content: String, _ctx: &ProcessContext<'_>) -> Result<String> {
            Ok(content + self.0)
        }
    }

    struct Fail;

    impl ResourceProcessor for Fail {
        fn name(&self) -> &str {
            "fail"
        }

        fn transform(&self, _content: String, ctx: &ProcessContext<'_>) -> Result<String> {
            bail!("cannot process {}", ctx.deliverable)
        }
    }

    fn ctx() -> ProcessContext<'static> {
        ProcessContext {
            family: AssetFamily::Script,
            physical: Path::new("/src/app.js"),
            deliverable: "/app.js",
        }
    }

    #[test]
    fn test_apply_left_to_right() {
        let mut chain = ProcessorChain::new();
        chain.push(Arc::new(Append("1")));
        chain.push(Arc::new(Append("2")));
        assert_eq!(chain.apply("x".into(), &ctx()).unwrap(), "x12");
    }

    #[test]
    fn test_push_same_instance_is_noop() {
        let mut chain = ProcessorChain::new();
        let p: Arc<dyn ResourceProcessor> = Arc::new(Append("!"));
        assert!(chain.push(Arc::clone(&p)));
        assert!(!chain.push(p));
        assert_eq!(chain.len(), 1);
        // A distinct instance of the same type is still added
        assert!(chain.push(Arc::new(Append("!"))));
        assert_eq!(chain.len(), 2);
    }

    #[test]
    fn test_apply_reports_failing_processor() {
        let mut chain = ProcessorChain::new();
        chain.push(Arc::new(Append("1")));
        chain.push(Arc::new(Fail));
        let (name, err) = chain.apply("x".into(), &ctx()).unwrap_err();
        assert_eq!(name, "fail");
        assert!(err.to_string().contains("/app.js"));
    }

    #[test]
    fn test_empty_chain_passes_through() {
        let chain = ProcessorChain::new();
        assert!(chain.is_empty());
        assert_eq!(chain.apply("x".into(), &ctx()).unwrap(), "x");
    }
}
