//! Depth-first, pre-order search for tagged records.

use super::Record;

/// Lazily yield every object record whose discriminator equals `tag`.
///
/// Objects are visited before their attributes, attributes in document
/// order, sequence entries by ascending key. A match does not stop the
/// descent, so nested matches are yielded too.
pub fn locate<'a>(root: &'a Record, tag: &'a str) -> Locate<'a> {
    Locate { stack: vec![root], tag }
}

/// Iterator returned by [`locate`].
pub struct Locate<'a> {
    stack: Vec<&'a Record>,
    tag: &'a str,
}

impl<'a> Iterator for Locate<'a> {
    type Item = &'a Record;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            match node {
                Record::Object(obj) => {
                    self.stack.extend(obj.attributes.iter().rev().map(|(_, v)| v));
                    if obj.discriminator.as_deref() == Some(self.tag) {
                        return Some(node);
                    }
                }
                Record::Sequence(entries) => {
                    self.stack.extend(entries.iter().rev().map(|(_, v)| v));
                }
                Record::String(_) | Record::Numeric(_) | Record::BlobRef(_) => {}
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ObjectRecord;

    fn obj(tag: Option<&str>, attrs: Vec<(&str, Record)>) -> Record {
        Record::Object(ObjectRecord {
            discriminator: tag.map(str::to_string),
            attributes: attrs.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
        })
    }

    fn named(tag: &str, name: &str, children: Vec<(&str, Record)>) -> Record {
        let mut attrs = vec![("name", Record::String(name.to_string()))];
        attrs.extend(children);
        obj(Some(tag), attrs)
    }

    fn names<'a>(it: impl Iterator<Item = &'a Record>) -> Vec<&'a str> {
        it.map(|r| r.get("name").and_then(Record::as_str).unwrap_or("?")).collect()
    }

    #[test]
    fn test_preorder_with_nested_matches() {
        let tree = obj(None, vec![
            ("values", Record::Sequence(vec![
                (0, named("img", "a", vec![("inner", named("img", "a.1", vec![]))])),
                (1, named("img", "b", vec![])),
            ])),
            ("tail", named("img", "c", vec![])),
        ]);

        assert_eq!(names(locate(&tree, "img")), ["a", "a.1", "b", "c"]);
    }

    #[test]
    fn test_untagged_nodes_are_descended() {
        let tree = obj(None, vec![
            ("wrap", obj(None, vec![("deep", named("series", "s", vec![]))])),
        ]);
        assert_eq!(names(locate(&tree, "series")), ["s"]);
        assert_eq!(locate(&tree, "missing").count(), 0);
    }

    #[test]
    fn test_root_can_match() {
        let tree = named("img", "root", vec![]);
        assert_eq!(names(locate(&tree, "img")), ["root"]);
    }

    #[test]
    fn test_is_lazy() {
        let tree = Record::Sequence(vec![
            (0, named("img", "first", vec![])),
            (1, named("img", "second", vec![])),
        ]);
        let mut it = locate(&tree, "img");
        assert_eq!(it.next().and_then(|r| r.get("name")), Some(&Record::String("first".into())));
        // Only the unvisited sibling and the first match's own attributes are queued.
        assert_eq!(it.stack.len(), 2);
    }
}
