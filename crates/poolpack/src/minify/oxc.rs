//! oxc-backed minifier.
//!
//! oxc's code generator can only keep or drop comment classes wholesale, so
//! comments are filtered here instead: the retained ones are collected from
//! the parse, code is generated without any comments, and the retained
//! comments are hoisted above the output in source order. The source map is
//! shifted down by the number of hoisted lines so it still lines up.

use std::path::PathBuf;

use async_trait::async_trait;
use oxc_allocator::Allocator;
use oxc_codegen::{Codegen, CodegenOptions};
use oxc_minifier::{CompressOptions, MangleOptions, Minifier as OxcMinifierPass, MinifierOptions};
use oxc_parser::Parser;
use oxc_span::{SourceType, Span};
use tracing::debug;

use super::{MinifyError, MinifyOptions, MinifyOutput, Minifier};

/// Minifies with oxc on the blocking thread pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct OxcMinifier;

impl OxcMinifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Minifier for OxcMinifier {
    async fn minify(
        &self,
        source: &str,
        options: &MinifyOptions,
    ) -> Result<MinifyOutput, MinifyError> {
        let source = source.to_string();
        let options = options.clone();

        tokio::task::spawn_blocking(move || minify_sync(&source, &options))
            .await
            .map_err(|e| MinifyError::Join(e.to_string()))?
    }
}

/// Minify `source` on the current thread.
pub(crate) fn minify_sync(source: &str, options: &MinifyOptions) -> Result<MinifyOutput, MinifyError> {
    let allocator = Allocator::default();
    let parsed = Parser::new(&allocator, source, SourceType::cjs()).parse();

    if !parsed.errors.is_empty() {
        let message = parsed
            .errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        return Err(MinifyError::Parse { message });
    }

    let mut program = parsed.program;

    let retained: Vec<String> = program
        .comments
        .iter()
        .map(|comment| comment_text(source, comment.span, comment.is_line()))
        .filter(|text| options.comments.keeps(text))
        .collect();
    debug!(
        total = program.comments.len(),
        retained = retained.len(),
        "filtered comments"
    );

    let minifier_options = MinifierOptions {
        mangle: options.mangle.then(MangleOptions::default),
        compress: options.compress.then(CompressOptions::default),
    };
    let minified = OxcMinifierPass::new(minifier_options).minify(&allocator, &mut program);

    let codegen_options = CodegenOptions {
        source_map_path: options.source_map.as_ref().map(PathBuf::from),
        ..CodegenOptions::minify()
    };
    let generated = Codegen::new()
        .with_options(codegen_options)
        .with_scoping(minified.scoping)
        .build(&program);

    let header = hoisted_header(&retained);
    let hoisted_lines = header.matches('\n').count();

    let map = match (&options.source_map, generated.map) {
        (Some(_), Some(map)) => Some(shift_source_map(&map.to_json_string(), hoisted_lines)?),
        (Some(file), None) => {
            return Err(MinifyError::SourceMap(format!(
                "code generator returned no map for '{file}'"
            )));
        }
        (None, _) => None,
    };

    Ok(MinifyOutput {
        code: header + &generated.code,
        map,
    })
}

/// Full text of a comment, delimiters included.
fn comment_text(source: &str, span: Span, is_line: bool) -> String {
    let text = span.source_text(source);
    if text.starts_with("//") || text.starts_with("/*") {
        text.to_string()
    } else if is_line {
        format!("//{text}")
    } else {
        format!("/*{text}*/")
    }
}

fn hoisted_header(comments: &[String]) -> String {
    let mut header = String::new();
    for comment in comments {
        header.push_str(comment);
        header.push('\n');
    }
    header
}

/// Move every mapping of a source map `lines` lines down.
///
/// Each `;` in `mappings` starts a new generated line, so prefixing `lines`
/// semicolons leaves the hoisted lines unmapped.
fn shift_source_map(json: &str, lines: usize) -> Result<String, MinifyError> {
    if lines == 0 {
        return Ok(json.to_string());
    }

    let mut map: serde_json::Value =
        serde_json::from_str(json).map_err(|e| MinifyError::SourceMap(e.to_string()))?;

    let mappings = map
        .get_mut("mappings")
        .and_then(|m| m.as_str().map(str::to_string))
        .ok_or_else(|| MinifyError::SourceMap("source map has no mappings".to_string()))?;
    map["mappings"] = serde_json::Value::String(format!("{}{}", ";".repeat(lines), mappings));

    serde_json::to_string(&map).map_err(|e| MinifyError::SourceMap(e.to_string()))
}
