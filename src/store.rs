use crate::ast::{Block, FlonDocument, FlonValue, FlonValueKind, Member};
use crate::error::{FlonError, QueryError};
use indexmap::IndexMap;
use log::{debug, trace};

/// Owns every parsed root tree, keyed by root name in insertion order.
/// Merging is whole-subtree replacement: re-declaring a block path swaps
/// out whatever was stored there before.
#[derive(Debug, Default)]
pub struct DocumentStore {
    roots: IndexMap<String, FlonValue>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a parsed document's blocks in order. Callers parse the whole
    /// document first, so a parse failure never reaches this point and the
    /// store stays untouched on error.
    pub fn merge(&mut self, document: FlonDocument) {
        debug!("merging {} block(s) into the store", document.blocks.len());
        for block in document.blocks {
            self.insert_block(block);
        }
    }

    fn insert_block(&mut self, block: Block) {
        let Some((root, rest)) = block.path.split_first() else {
            return;
        };
        trace!("storing block at '{}'", block.path.join("/"));
        if rest.is_empty() {
            self.roots.insert(root.clone(), block.body);
            return;
        }
        let entry = self
            .roots
            .entry(root.clone())
            .or_insert_with(FlonValue::empty_object);
        if let FlonValueKind::Object(members) = &mut entry.kind {
            insert_at(members, rest, block.body);
        }
    }

    /// Walks a slash-delimited path from a root down through object members
    /// and returns the stored node.
    pub fn resolve(&self, path: &str) -> Result<&FlonValue, FlonError> {
        let mut segments = path.split('/');
        let root_name = segments.next().unwrap_or_default();
        let mut current = self.roots.get(root_name).ok_or_else(|| {
            FlonError::from(QueryError::PathNotFound {
                path: path.to_string(),
                segment: root_name.to_string(),
            })
        })?;

        for segment in segments {
            let members = match &current.kind {
                FlonValueKind::Object(members) => members,
                _ => {
                    return Err(QueryError::NotAnObject {
                        path: path.to_string(),
                        segment: segment.to_string(),
                    }
                    .into())
                }
            };
            current = members
                .iter()
                .find(|m| m.key == segment)
                .map(|m| &m.value)
                .ok_or_else(|| {
                    FlonError::from(QueryError::PathNotFound {
                        path: path.to_string(),
                        segment: segment.to_string(),
                    })
                })?;
        }

        Ok(current)
    }

    pub fn roots(&self) -> impl Iterator<Item = (&String, &FlonValue)> {
        self.roots.iter()
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

/// Descends the remaining block-path segments, creating intermediate object
/// members as needed, and replaces the subtree at the final segment. A
/// non-object intermediate is replaced by a fresh object; a replaced member
/// loses any stale declared tag.
fn insert_at(members: &mut Vec<Member>, path: &[String], body: FlonValue) {
    let Some((key, rest)) = path.split_first() else {
        return;
    };
    let index = match members.iter().position(|m| m.key == *key) {
        Some(i) => i,
        None => {
            members.push(Member {
                key: key.clone(),
                declared: None,
                value: FlonValue::empty_object(),
            });
            members.len() - 1
        }
    };
    let member = &mut members[index];
    if rest.is_empty() {
        member.declared = None;
        member.value = body;
        return;
    }
    if !matches!(member.value.kind, FlonValueKind::Object(_)) {
        member.declared = None;
        member.value = FlonValue::empty_object();
    }
    if let FlonValueKind::Object(children) = &mut member.value.kind {
        insert_at(children, rest, body);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    fn store_from(source: &str) -> DocumentStore {
        let mut parser = Parser::new(source).unwrap();
        let document = parser.parse_document().unwrap();
        let mut store = DocumentStore::new();
        store.merge(document);
        store
    }

    #[test]
    fn test_resolve_scalar() {
        let store = store_from(r#"@root (app: "MyApp")"#);
        let value = store.resolve("root/app").unwrap();
        assert_eq!(value.kind, FlonValueKind::String("MyApp".into()));
    }

    #[test]
    fn test_resolve_missing_root() {
        let store = store_from("@root (a: 1)");
        let err = store.resolve("nonexistent/path").unwrap_err();
        match err {
            FlonError::Query(QueryError::PathNotFound { segment, .. }) => {
                assert_eq!(segment, "nonexistent");
            }
            other => panic!("expected PathNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_resolve_missing_member() {
        let store = store_from("@root (a: 1)");
        let err = store.resolve("root/b").unwrap_err();
        assert!(matches!(
            err,
            FlonError::Query(QueryError::PathNotFound { .. })
        ));
    }

    #[test]
    fn test_resolve_through_scalar_fails() {
        let store = store_from("@root (a: 1)");
        let err = store.resolve("root/a/deeper").unwrap_err();
        match err {
            FlonError::Query(QueryError::NotAnObject { segment, .. }) => {
                assert_eq!(segment, "deeper");
            }
            other => panic!("expected NotAnObject, got {other:?}"),
        }
    }

    #[test]
    fn test_lists_are_not_path_indexable() {
        let store = store_from("@root (items: [1, 2, 3])");
        let err = store.resolve("root/items/0").unwrap_err();
        assert!(matches!(
            err,
            FlonError::Query(QueryError::NotAnObject { .. })
        ));
    }

    #[test]
    fn test_reparse_replaces_root() {
        let mut store = store_from("@root (a: 1)");
        let mut parser = Parser::new("@root (b: 2)").unwrap();
        store.merge(parser.parse_document().unwrap());

        assert!(store.resolve("root/a").is_err());
        assert_eq!(
            store.resolve("root/b").unwrap().kind,
            FlonValueKind::Int(2)
        );
    }

    #[test]
    fn test_nested_block_path_merges_into_root() {
        let mut store = store_from(r#"@root (app: "MyApp")"#);
        let mut parser = Parser::new(r#"@root/config (host: "localhost")"#).unwrap();
        store.merge(parser.parse_document().unwrap());

        // The original root content survives and the nested target appears
        // both as a path and as a member of the root object.
        assert!(store.resolve("root/app").is_ok());
        assert_eq!(
            store.resolve("root/config/host").unwrap().kind,
            FlonValueKind::String("localhost".into())
        );
        assert!(store.resolve("root").unwrap().member("config").is_some());
    }

    #[test]
    fn test_nested_block_path_creates_missing_root() {
        let store = store_from(r#"@root/query (table: "users")"#);
        assert_eq!(
            store.resolve("root/query/table").unwrap().kind,
            FlonValueKind::String("users".into())
        );
    }

    #[test]
    fn test_nested_block_replaces_scalar_member() {
        let mut store = store_from("@root (config: 5)");
        let mut parser = Parser::new("@root/config (port: 80)").unwrap();
        store.merge(parser.parse_document().unwrap());

        assert_eq!(
            store.resolve("root/config/port").unwrap().kind,
            FlonValueKind::Int(80)
        );
    }

    #[test]
    fn test_root_order_is_insertion_order() {
        let store = store_from("@b (x: 1) @a (y: 2)");
        let names: Vec<&String> = store.roots().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["b", "a"]);
    }
}
