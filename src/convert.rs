use crate::ast::{FlonValue, FlonValueKind, Member};
use crate::error::{ConvertError, FlonError};
use crate::parser::Parser;
use crate::printer;
use crate::store::DocumentStore;
use crate::value::{to_value, Value};
use indexmap::IndexMap;
use log::debug;
use std::path::{Path, PathBuf};

/// Root name used when wrapping a JSON document in FLON block syntax.
pub const DEFAULT_ROOT: &str = "root";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Flon,
    Json,
}

impl Format {
    fn from_arg(format: &str) -> Result<Format, FlonError> {
        match format {
            "flon" => Ok(Format::Flon),
            "json" => Ok(Format::Json),
            other => Err(ConvertError::InvalidFormat {
                format: other.to_string(),
            }
            .into()),
        }
    }

    fn from_extension(path: &Path) -> Result<Format, FlonError> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("flon") => Ok(Format::Flon),
            Some("json") => Ok(Format::Json),
            _ => Err(ConvertError::UnknownExtension {
                path: path.display().to_string(),
            }
            .into()),
        }
    }

    fn extension(self) -> &'static str {
        match self {
            Format::Flon => "flon",
            Format::Json => "json",
        }
    }

    fn opposite(self) -> Format {
        match self {
            Format::Flon => Format::Json,
            Format::Json => Format::Flon,
        }
    }
}

/// Converts a FLON or JSON file to `target_format`, writing the result next
/// to the source (same stem, target extension) unless `output` is given.
/// Returns the path written. The source format comes from the file
/// extension; converting a file to its own format canonicalizes it.
///
/// # Errors
///
/// `ConvertError::InvalidFormat` for an unrecognized target (checked before
/// any file access), `ConvertError::UnknownExtension` when the source
/// extension is neither `.flon` nor `.json`, `FlonError::FileNotFound` when
/// the source is missing, plus any parse error from the source content.
pub fn convert(
    source: impl AsRef<Path>,
    target_format: &str,
    output: Option<&Path>,
) -> Result<PathBuf, FlonError> {
    let source = source.as_ref();
    let target = Format::from_arg(target_format)?;
    let source_format = Format::from_extension(source)?;

    let content = std::fs::read_to_string(source).map_err(|err| {
        if err.kind() == std::io::ErrorKind::NotFound {
            FlonError::FileNotFound {
                path: source.display().to_string(),
            }
        } else {
            FlonError::Io {
                path: source.display().to_string(),
                source: err,
            }
        }
    })?;

    let rendered = convert_text(
        &content,
        source_format,
        target,
        &source.display().to_string(),
    )?;

    let output_path = match output {
        Some(path) => path.to_path_buf(),
        None => source.with_extension(target.extension()),
    };
    write_output(&output_path, &rendered)?;
    Ok(output_path)
}

/// Converts in-memory content to `target_format` and writes it to `output`.
/// The source format is taken to be the other one: FLON text for a `json`
/// target, JSON text for a `flon` target. Returns the path written.
///
/// # Errors
///
/// `ConvertError::InvalidFormat` for an unrecognized target, plus any parse
/// error from the content.
pub fn convert_data(
    content: &str,
    target_format: &str,
    output: impl AsRef<Path>,
) -> Result<PathBuf, FlonError> {
    let target = Format::from_arg(target_format)?;
    let rendered = convert_text(content, target.opposite(), target, "<input>")?;
    let output_path = output.as_ref().to_path_buf();
    write_output(&output_path, &rendered)?;
    Ok(output_path)
}

fn write_output(path: &Path, rendered: &str) -> Result<(), FlonError> {
    debug!("writing converted output to {}", path.display());
    std::fs::write(path, rendered).map_err(|source| FlonError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn convert_text(
    content: &str,
    source: Format,
    target: Format,
    name: &str,
) -> Result<String, FlonError> {
    match (source, target) {
        (Format::Flon, Format::Json) => flon_to_json(content, name),
        (Format::Json, Format::Flon) => json_to_flon(content),
        (Format::Flon, Format::Flon) => canonicalize_flon(content, name),
        (Format::Json, Format::Json) => canonicalize_json(content),
    }
}

/// Materializes the parsed document and serializes it as JSON, dropping the
/// explicit type tags (JSON's native types subsume them). A single root
/// emits its body; multiple roots emit an object keyed by root name.
fn flon_to_json(content: &str, name: &str) -> Result<String, FlonError> {
    let store = parse_into_store(content, name)?;
    let json = match store.roots().next() {
        Some((_, root)) if store.len() == 1 => to_value(root),
        _ => {
            let mut map = IndexMap::new();
            for (root_name, root) in store.roots() {
                map.insert(root_name.clone(), to_value(root));
            }
            Value::Object(map)
        }
    };
    serde_json::to_string_pretty(&json)
        .map_err(|source| ConvertError::Json { source }.into())
}

/// Parses JSON, re-infers FLON type tags from the runtime types, and emits
/// canonical FLON wrapping the document under the default root. A
/// non-object top level becomes the sole member `value`.
fn json_to_flon(content: &str) -> Result<String, FlonError> {
    let json: serde_json::Value =
        serde_json::from_str(content).map_err(|source| ConvertError::Json { source })?;
    let body = value_from_json(&json)?;
    let root = match body.kind {
        FlonValueKind::Object(_) => body,
        _ => FlonValue::new(FlonValueKind::Object(vec![Member {
            key: "value".to_string(),
            declared: Some(body.tag()),
            value: body,
        }])),
    };
    Ok(printer::pretty(DEFAULT_ROOT, &root, printer::DEFAULT_INDENT))
}

fn canonicalize_flon(content: &str, name: &str) -> Result<String, FlonError> {
    let store = parse_into_store(content, name)?;
    let blocks: Vec<String> = store
        .roots()
        .map(|(root_name, root)| printer::pretty(root_name, root, printer::DEFAULT_INDENT))
        .collect();
    Ok(blocks.join("\n\n"))
}

fn canonicalize_json(content: &str) -> Result<String, FlonError> {
    let json: serde_json::Value =
        serde_json::from_str(content).map_err(|source| ConvertError::Json { source })?;
    serde_json::to_string_pretty(&json)
        .map_err(|source| ConvertError::Json { source }.into())
}

fn parse_into_store(content: &str, name: &str) -> Result<DocumentStore, FlonError> {
    let mut parser = Parser::new_with_name(content, name.to_string())?;
    let document = parser.parse_document()?;
    let mut store = DocumentStore::new();
    store.merge(document);
    Ok(store)
}

fn value_from_json(json: &serde_json::Value) -> Result<FlonValue, FlonError> {
    let kind = match json {
        serde_json::Value::Null => return Err(ConvertError::NullValue.into()),
        serde_json::Value::Bool(b) => FlonValueKind::Bool(*b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => FlonValueKind::Int(i),
            None => FlonValueKind::Float(n.as_f64().unwrap_or_default()),
        },
        serde_json::Value::String(s) => FlonValueKind::String(s.clone()),
        serde_json::Value::Array(items) => {
            let values: Result<Vec<FlonValue>, FlonError> =
                items.iter().map(value_from_json).collect();
            FlonValueKind::List(values?)
        }
        serde_json::Value::Object(map) => {
            let mut members = Vec::with_capacity(map.len());
            for (key, child) in map {
                let value = value_from_json(child)?;
                members.push(Member {
                    key: key.clone(),
                    declared: Some(value.tag()),
                    value,
                });
            }
            FlonValueKind::Object(members)
        }
    };
    Ok(FlonValue::new(kind))
}
