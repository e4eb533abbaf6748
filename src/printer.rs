use crate::ast::{FlonValue, FlonValueKind, Member, TypeTag};

pub const DEFAULT_INDENT: usize = 2;

/// Serializes a stored subtree back to canonical FLON text. Objects render
/// as an `@path ( ... )` block whose header carries the full slash path, so
/// a printed subtree re-parses into the same location; the canonical form
/// tags every member explicitly even when the source text omitted the tag.
/// A non-object target renders as its literal text.
pub fn pretty(path: &str, value: &FlonValue, indent: usize) -> String {
    match &value.kind {
        FlonValueKind::Object(members) => {
            let mut out = String::new();
            out.push('@');
            out.push_str(path);
            out.push_str(" (\n");
            write_members(&mut out, members, 1, indent);
            out.push(')');
            out
        }
        _ => render_value(value, 0, indent),
    }
}

fn write_members(out: &mut String, members: &[Member], level: usize, indent: usize) {
    let pad = " ".repeat(level * indent);
    for member in members {
        out.push_str(&pad);
        write_key(out, &member.key);
        out.push_str(": ");
        out.push_str(member.value.tag().as_str());
        out.push_str(": ");
        out.push_str(&render_value(&member.value, level, indent));
        out.push('\n');
    }
}

fn render_value(value: &FlonValue, level: usize, indent: usize) -> String {
    match &value.kind {
        FlonValueKind::String(s) => quote(s),
        FlonValueKind::Int(n) => n.to_string(),
        FlonValueKind::Float(f) => render_float(*f),
        FlonValueKind::Bool(b) => b.to_string(),
        FlonValueKind::Object(members) => {
            let mut out = String::from("(\n");
            write_members(&mut out, members, level + 1, indent);
            out.push_str(&" ".repeat(level * indent));
            out.push(')');
            out
        }
        FlonValueKind::List(items) => render_list(items, level, indent),
    }
}

fn render_list(items: &[FlonValue], level: usize, indent: usize) -> String {
    let nested = items
        .iter()
        .any(|v| matches!(v.kind, FlonValueKind::Object(_) | FlonValueKind::List(_)));
    if !nested {
        let rendered: Vec<String> = items
            .iter()
            .map(|v| render_value(v, level, indent))
            .collect();
        return format!("[{}]", rendered.join(", "));
    }

    let pad = " ".repeat((level + 1) * indent);
    let mut out = String::from("[\n");
    for (i, item) in items.iter().enumerate() {
        out.push_str(&pad);
        out.push_str(&render_value(item, level + 1, indent));
        if i + 1 < items.len() {
            out.push(',');
        }
        out.push('\n');
    }
    out.push_str(&" ".repeat(level * indent));
    out.push(']');
    out
}

// Keys that are not bare identifiers, or that collide with reserved words,
// must be quoted so the output re-parses.
fn write_key(out: &mut String, key: &str) {
    if is_bare_key(key) {
        out.push_str(key);
    } else {
        out.push_str(&quote(key));
    }
}

fn is_bare_key(key: &str) -> bool {
    let mut chars = key.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_ascii_alphabetic() || first == '_') {
        return false;
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return false;
    }
    TypeTag::from_keyword(key).is_none() && key != "true" && key != "false"
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

// Integral floats keep a trailing `.0` so the literal still reads as a float.
fn render_float(f: f64) -> String {
    if f.is_finite() && f == f.trunc() {
        format!("{f:.1}")
    } else {
        f.to_string()
    }
}
