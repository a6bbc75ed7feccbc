//! Family compressors for bundled output.
//!
//! Uses oxc for JavaScript and lightningcss for CSS. Both return an error on
//! input they cannot parse instead of passing it through.

use std::sync::Arc;

use anyhow::{Result, anyhow};
use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};
use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;

use super::AssetFamily;
use crate::pipeline::PipelineError;

/// Shrinks the concatenated text of a bundle.
pub trait Compressor: Send + Sync {
    fn compress(&self, source: &str) -> Result<String>;
}

/// JavaScript minifier (parse, compress, mangle, print).
#[derive(Debug, Clone, Copy, Default)]
pub struct JsCompressor;

impl Compressor for JsCompressor {
    fn compress(&self, source: &str) -> Result<String> {
        let allocator = Allocator::default();
        // Bundles are classic scripts: top-level declarations are globals
        // other pages call, so they must survive compression
        let source_type = SourceType::script();
        let ret = Parser::new(&allocator, source, source_type).parse();
        if let Some(err) = ret.errors.first() {
            return Err(anyhow!(
                "javascript parse failed ({} error(s)): {}",
                ret.errors.len(),
                err
            ));
        }
        let mut program = ret.program;
        let options = MinifierOptions {
            mangle: Some(MangleOptions::default()),
            compress: Some(CompressOptions::smallest()),
        };
        let ret = Minifier::new(options).minify(&allocator, &mut program);
        let code = Codegen::new()
            .with_options(CodegenOptions {
                minify: true,
                comments: CommentOptions::disabled(),
                ..CodegenOptions::default()
            })
            .with_scoping(ret.scoping)
            .build(&program)
            .code;
        Ok(code)
    }
}

/// CSS minifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct CssCompressor;

impl Compressor for CssCompressor {
    fn compress(&self, source: &str) -> Result<String> {
        let stylesheet = StyleSheet::parse(source, ParserOptions::default())
            .map_err(|err| anyhow!("css parse failed: {err}"))?;
        let result = stylesheet
            .to_css(PrinterOptions {
                minify: true,
                ..PrinterOptions::default()
            })
            .map_err(|err| anyhow!("css print failed: {err}"))?;
        Ok(result.code)
    }
}

/// Built-in compressor for `family`.
///
/// # Errors
///
/// `UnsupportedFamily` for [`AssetFamily::File`].
pub fn default_compressor(family: AssetFamily) -> Result<Arc<dyn Compressor>, PipelineError> {
    match family {
        AssetFamily::Script => Ok(Arc::new(JsCompressor)),
        AssetFamily::Style => Ok(Arc::new(CssCompressor)),
        AssetFamily::File => Err(PipelineError::UnsupportedFamily(family)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_js_compress_strips_whitespace_and_comments() {
        let source = "// greeting\nfunction greet(name) {\n    return 'hi ' + name;\n}\ngreet('a');\n";
        let out = JsCompressor.compress(source).unwrap();
        assert!(out.len() < source.len());
        assert!(!out.contains("greeting"));
    }

    #[test]
    fn test_js_compress_keeps_unreferenced_globals() {
        let source = "var a = 1;\n\nfunction helper(x) { return x + a; }\n\n";
        let out = JsCompressor.compress(source).unwrap();
        assert!(out.contains("var a"), "global variable dropped: {out:?}");
        assert!(out.contains("function helper"), "global function dropped: {out:?}");
        assert!(out.len() < source.len());
    }

    #[test]
    fn test_js_compress_fails_on_syntax_error() {
        let err = JsCompressor.compress("function (").unwrap_err();
        assert!(err.to_string().contains("javascript parse failed"));
    }

    #[test]
    fn test_css_compress() {
        let out = CssCompressor.compress("a {\n  color: red;\n}\n").unwrap();
        assert_eq!(out, "a{color:red}");
    }

    #[test]
    fn test_css_compress_fails_on_invalid_selector() {
        let err = CssCompressor.compress("!!! { color: red }").unwrap_err();
        assert!(err.to_string().contains("css parse failed"));
    }

    #[test]
    fn test_default_compressor_rejects_file_family() {
        assert!(default_compressor(AssetFamily::Script).is_ok());
        assert!(default_compressor(AssetFamily::Style).is_ok());
        assert!(matches!(
            default_compressor(AssetFamily::File),
            Err(PipelineError::UnsupportedFamily(AssetFamily::File))
        ));
    }
}
