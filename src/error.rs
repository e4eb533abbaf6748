use crate::ast::TypeTag;
use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum FlonError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Lexer(#[from] LexerError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Parser(#[from] ParserError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Convert(#[from] ConvertError),

    #[error("File not found: {path}")]
    #[diagnostic(code(flon::file_not_found))]
    FileNotFound { path: String },

    #[error("Failed to access '{path}'")]
    #[diagnostic(code(flon::io))]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug, Diagnostic, Clone)]
pub enum LexerError {
    #[error("Unexpected character '{character}'")]
    #[diagnostic(
        code(lexer::unexpected_character),
        help("This character is not part of the FLON syntax.")
    )]
    UnexpectedCharacter {
        #[source_code]
        src: NamedSource<String>,
        #[label("Not valid here")]
        span: SourceSpan,
        character: char,
    },

    #[error("Unterminated string literal")]
    #[diagnostic(
        code(lexer::unterminated_string),
        help("Strings must be closed with a double quote.")
    )]
    UnterminatedString {
        #[source_code]
        src: NamedSource<String>,
        #[label("String starts here and never ends")]
        span: SourceSpan,
    },
}

#[derive(Error, Debug, Diagnostic, Clone)]
pub enum ParserError {
    #[error("Unexpected token")]
    #[diagnostic(
        code(parser::unexpected_token),
        help("The parser found a token it did not expect in this position.")
    )]
    UnexpectedToken {
        #[source_code]
        src: NamedSource<String>,
        #[label("Expected {expected}, but found this")]
        span: SourceSpan,
        expected: String,
    },

    #[error("Unexpected end of file")]
    #[diagnostic(
        code(parser::unexpected_eof),
        help("The file ended unexpectedly. The parser expected more tokens.")
    )]
    UnexpectedEof {
        #[source_code]
        src: NamedSource<String>,
        #[label("File ended unexpectedly here")]
        span: SourceSpan,
    },

    #[error("'{word}' is not a valid type tag")]
    #[diagnostic(
        code(parser::invalid_type_tag),
        help("Valid type tags are int, float, bool, string, object and list.")
    )]
    InvalidTypeTag {
        #[source_code]
        src: NamedSource<String>,
        #[label("Unknown type tag")]
        span: SourceSpan,
        word: String,
    },

    #[error("Type mismatch at '{path}': declared {declared}, found {found}")]
    #[diagnostic(
        code(parser::type_mismatch),
        help("The declared type tag must agree with the literal that follows it.")
    )]
    TypeMismatch {
        #[source_code]
        src: NamedSource<String>,
        #[label("This value is {found}, not {declared}")]
        span: SourceSpan,
        path: String,
        declared: TypeTag,
        found: TypeTag,
    },
}

#[derive(Error, Debug, Diagnostic, Clone)]
pub enum QueryError {
    #[error("Path '{path}' not found: no entry named '{segment}'")]
    #[diagnostic(
        code(query::path_not_found),
        help("Check that the path exists in a loaded document.")
    )]
    PathNotFound { path: String, segment: String },

    #[error("Path '{path}' cannot descend into '{segment}': value is not an object")]
    #[diagnostic(
        code(query::not_an_object),
        help("Only object members can be addressed by path segments.")
    )]
    NotAnObject { path: String, segment: String },

    #[error("Invalid query mode '{mode}'")]
    #[diagnostic(code(query::invalid_mode), help("The only supported mode is 'type'."))]
    InvalidMode { mode: String },
}

#[derive(Error, Debug, Diagnostic)]
pub enum ConvertError {
    #[error("Unsupported target format '{format}'")]
    #[diagnostic(
        code(convert::invalid_format),
        help("Supported target formats are 'flon' and 'json'.")
    )]
    InvalidFormat { format: String },

    #[error("Cannot infer the format of '{path}'")]
    #[diagnostic(
        code(convert::unknown_extension),
        help("Source files must use a .flon or .json extension.")
    )]
    UnknownExtension { path: String },

    #[error("JSON null has no FLON equivalent")]
    #[diagnostic(
        code(convert::null_value),
        help("Remove the null or replace it with a typed value.")
    )]
    NullValue,

    #[error("Invalid JSON input")]
    #[diagnostic(code(convert::invalid_json))]
    Json {
        #[source]
        source: serde_json::Error,
    },
}
