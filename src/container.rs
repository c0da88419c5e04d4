use std::{
    fmt::Display,
    ops::{Index, IndexMut},
    str::FromStr,
};

use crate::{
    parser, EntryKind, IniItem, IniParseFailure, IniValue, DEFAULT_NESTING_LIMIT,
};

/// A section of a config document: a named, ordered collection of
/// [`IniItem`]s and nested sub-sections.
///
/// The anonymous root container (depth 0) represents the whole document;
/// `[section]` headers open depth-1 containers, `[[subsection]]` headers
/// depth-2, and so on. Children keep insertion order, names are unique per
/// scope, and overwriting a child keeps its position.
///
/// The [`Display`] impl serializes the tree back to config text that parses
/// to a value-equal tree (comment text and entry order included; original
/// whitespace and quote style are not preserved).
#[derive(Debug, Default, Clone, PartialEq)]
pub struct IniContainer {
    pub(crate) name: String,
    pub(crate) depth: usize,
    pub(crate) comment: Option<String>,
    pub(crate) children: Vec<IniEntry>,
}

/// One child of an [`IniContainer`]: either an item or a nested section.
#[derive(Debug, Clone, PartialEq)]
pub enum IniEntry {
    /// A `name = value` item.
    Item(IniItem),
    /// A nested `[…]` section.
    Section(IniContainer),
}

impl IniEntry {
    /// The name of this entry, whichever kind it is.
    pub fn name(&self) -> &str {
        match self {
            IniEntry::Item(item) => item.name(),
            IniEntry::Section(section) => section.name(),
        }
    }

    /// The comment block attached to this entry, if any.
    pub fn comment(&self) -> Option<&str> {
        match self {
            IniEntry::Item(item) => item.comment(),
            IniEntry::Section(section) => section.comment(),
        }
    }

    /// Returns `true` if this entry is an item.
    pub fn is_item(&self) -> bool {
        matches!(self, IniEntry::Item(..))
    }

    /// Returns `true` if this entry is a section.
    pub fn is_section(&self) -> bool {
        matches!(self, IniEntry::Section(..))
    }

    /// Returns the item, if this entry is one.
    pub fn as_item(&self) -> Option<&IniItem> {
        if let IniEntry::Item(item) = self {
            Some(item)
        } else {
            None
        }
    }

    /// Returns a mutable reference to the item, if this entry is one.
    pub fn as_item_mut(&mut self) -> Option<&mut IniItem> {
        if let IniEntry::Item(item) = self {
            Some(item)
        } else {
            None
        }
    }

    /// Returns the section, if this entry is one.
    pub fn as_section(&self) -> Option<&IniContainer> {
        if let IniEntry::Section(section) = self {
            Some(section)
        } else {
            None
        }
    }

    /// Returns a mutable reference to the section, if this entry is one.
    pub fn as_section_mut(&mut self) -> Option<&mut IniContainer> {
        if let IniEntry::Section(section) = self {
            Some(section)
        } else {
            None
        }
    }

    /// Shorthand for `as_item().map(IniItem::value)`.
    pub fn as_value(&self) -> Option<&IniValue> {
        self.as_item().map(IniItem::value)
    }

    /// Which kind of entry this is. Used in merge conflict reports.
    pub fn kind(&self) -> EntryKind {
        match self {
            IniEntry::Item(..) => EntryKind::Item,
            IniEntry::Section(..) => EntryKind::Section,
        }
    }
}

impl IniContainer {
    /// Creates a new, empty, unattached section. Its depth is assigned when
    /// it is attached to a parent with [`IniContainer::set_section`].
    pub fn new(name: impl Into<String>) -> Self {
        IniContainer {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Parses a config document with a non-default literal nesting limit
    /// (see [`DEFAULT_NESTING_LIMIT`]). The [`FromStr`] impl is the common
    /// entry point.
    pub fn parse_with_depth_limit(
        input: &str,
        limit: usize,
    ) -> Result<IniContainer, IniParseFailure> {
        parser::parse_document(input, limit)
    }

    /// This container's name. Empty for the document root.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Nesting depth: 0 for the root, 1 for `[section]`, 2 for
    /// `[[subsection]]`, and so on.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Gets the comment block attached to this section's header, if any.
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Sets the comment block for this section.
    pub fn set_comment(&mut self, comment: impl Into<String>) {
        self.comment = Some(comment.into());
    }

    /// Removes the comment block from this section.
    pub fn clear_comment(&mut self) {
        self.comment = None;
    }

    /// The comment reformatted as a human-readable description: the first
    /// letter capitalized.
    pub fn description(&self) -> Option<String> {
        self.comment().map(crate::item::capitalize_first)
    }

    /// Gets the child with a matching name, item or section.
    pub fn get(&self, name: &str) -> Option<&IniEntry> {
        self.children.iter().find(|entry| entry.name() == name)
    }

    /// Gets a mutable reference to the child with a matching name.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut IniEntry> {
        self.children.iter_mut().find(|entry| entry.name() == name)
    }

    /// Gets the item with a matching name, if there is one.
    pub fn get_item(&self, name: &str) -> Option<&IniItem> {
        self.get(name).and_then(IniEntry::as_item)
    }

    /// Gets a mutable reference to the item with a matching name.
    pub fn get_item_mut(&mut self, name: &str) -> Option<&mut IniItem> {
        self.get_mut(name).and_then(IniEntry::as_item_mut)
    }

    /// Gets the sub-section with a matching name, if there is one.
    pub fn get_section(&self, name: &str) -> Option<&IniContainer> {
        self.get(name).and_then(IniEntry::as_section)
    }

    /// Gets a mutable reference to the sub-section with a matching name.
    pub fn get_section_mut(&mut self, name: &str) -> Option<&mut IniContainer> {
        self.get_mut(name).and_then(IniEntry::as_section_mut)
    }

    /// Gets the value of the item with a matching name. This is the shorthand
    /// counterpart of the original dotted-attribute access: where the source
    /// format reads `config.section.item`, this API reads
    /// `config.get_section("section").and_then(|s| s.get_value("item"))`.
    pub fn get_value(&self, name: &str) -> Option<&IniValue> {
        self.get_item(name).map(IniItem::value)
    }

    /// Gets a mutable reference to the value of the item with a matching
    /// name.
    pub fn get_value_mut(&mut self, name: &str) -> Option<&mut IniValue> {
        self.get_item_mut(name).map(IniItem::value_mut)
    }

    /// Returns `true` if a child with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Sets the value of the named item, creating the item (appended at the
    /// end, without a comment) if it does not exist. An existing item keeps
    /// its position and comment; an existing section of the same name is
    /// replaced by the new item.
    pub fn set_value(&mut self, name: impl Into<String>, value: impl Into<IniValue>) {
        let name = name.into();
        match self.get_mut(&name) {
            Some(IniEntry::Item(item)) => item.value = value.into(),
            _ => self.set_item(IniItem::new(name, value)),
        }
    }

    /// Inserts an item, replacing any same-named child in place. New items
    /// append at the end.
    pub fn set_item(&mut self, item: IniItem) {
        match self.get_mut(item.name()) {
            Some(entry) => *entry = IniEntry::Item(item),
            None => self.children.push(IniEntry::Item(item)),
        }
    }

    /// Inserts a sub-section, replacing any same-named child in place. New
    /// sections append at the end. The inserted subtree's depths are
    /// renumbered to `self.depth() + 1` downward, so the depth invariant
    /// holds regardless of where the section came from.
    pub fn set_section(&mut self, mut section: IniContainer) {
        section.renumber(self.depth + 1);
        match self.get_mut(&section.name) {
            Some(entry) => *entry = IniEntry::Section(section),
            None => self.children.push(IniEntry::Section(section)),
        }
    }

    /// Removes and returns the child with a matching name.
    pub fn remove(&mut self, name: &str) -> Option<IniEntry> {
        let index = self.children.iter().position(|entry| entry.name() == name)?;
        Some(self.children.remove(index))
    }

    /// Number of direct children (items and sections).
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Returns `true` if this container has no children.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Ordered iteration over `(name, entry)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &IniEntry)> {
        self.children.iter().map(|entry| (entry.name(), entry))
    }

    /// Ordered iteration over this container's items only.
    pub fn items(&self) -> impl Iterator<Item = &IniItem> {
        self.children.iter().filter_map(IniEntry::as_item)
    }

    /// Ordered iteration over this container's sub-sections only.
    pub fn sections(&self) -> impl Iterator<Item = &IniContainer> {
        self.children.iter().filter_map(IniEntry::as_section)
    }

    /// Depth-first traversal of the whole subtree as
    /// `(dotted_path, entry)` pairs, e.g. `("server.tls.cert", …)`. A
    /// section is yielded before its contents. Paths are relative to this
    /// container.
    pub fn walk(&self) -> impl Iterator<Item = (String, &IniEntry)> {
        let mut entries = Vec::new();
        self.walk_into("", &mut entries);
        entries.into_iter()
    }

    fn walk_into<'a>(&'a self, prefix: &str, entries: &mut Vec<(String, &'a IniEntry)>) {
        for entry in &self.children {
            let path = if prefix.is_empty() {
                entry.name().to_string()
            } else {
                format!("{prefix}.{}", entry.name())
            };
            if let IniEntry::Section(section) = entry {
                entries.push((path.clone(), entry));
                section.walk_into(&path, entries);
            } else {
                entries.push((path, entry));
            }
        }
    }

    fn renumber(&mut self, depth: usize) {
        self.depth = depth;
        for child in &mut self.children {
            if let IniEntry::Section(section) = child {
                section.renumber(depth + 1);
            }
        }
    }
}

impl Display for IniContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.stringify(f)
    }
}

impl IniContainer {
    // Serialization walks depth-first: comment block, header, this
    // container's items in stored order, then sub-sections in stored order.
    // Items go first so that an item appended through the API after a
    // subsection is not captured by that subsection on re-parse. An absent
    // comment emits no comment line at all.
    fn stringify(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.depth > 0 {
            if let Some(comment) = self.comment() {
                for line in comment.split('\n') {
                    writeln!(f, "# {}", line)?;
                }
            }
            writeln!(
                f,
                "{}{}{}",
                "[".repeat(self.depth),
                self.name,
                "]".repeat(self.depth)
            )?;
        }
        for item in self.items() {
            writeln!(f, "{}", item)?;
        }
        for section in self.sections() {
            section.stringify(f)?;
        }
        Ok(())
    }
}

impl FromStr for IniContainer {
    type Err = IniParseFailure;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        parser::parse_document(input, DEFAULT_NESTING_LIMIT)
    }
}

impl Index<&str> for IniContainer {
    type Output = IniEntry;

    fn index(&self, name: &str) -> &Self::Output {
        self.get(name).expect("No such item or section.")
    }
}

impl IndexMut<&str> for IniContainer {
    fn index_mut(&mut self, name: &str) -> &mut Self::Output {
        self.get_mut(name).expect("No such item or section.")
    }
}

impl Index<&str> for IniEntry {
    type Output = IniEntry;

    fn index(&self, name: &str) -> &Self::Output {
        self.as_section().expect("Not a section.").index(name)
    }
}

impl IntoIterator for IniContainer {
    type Item = IniEntry;
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.children.into_iter()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn construction() {
        let mut root = IniContainer::default();
        let mut general = IniContainer::new("general");
        general.set_value("retries", 3);
        general.set_comment("tunables");

        let mut limits = IniContainer::new("limits");
        limits.set_value("max_open", 1024);
        general.set_section(limits);
        root.set_section(general);

        assert_eq!(root.get_section("general").map(IniContainer::depth), Some(1));
        assert_eq!(
            root.get_section("general")
                .and_then(|g| g.get_section("limits"))
                .map(IniContainer::depth),
            Some(2)
        );
        assert_eq!(
            format!("{}", root),
            "# tunables\n[general]\nretries = 3\n[[limits]]\nmax_open = 1024\n"
        );
    }

    #[test]
    fn overwrite_keeps_position() {
        let mut section = IniContainer::new("s");
        section.set_value("a", 1);
        section.set_value("b", 2);
        section.set_value("a", 9);

        let names: Vec<&str> = section.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(section.get_value("a"), Some(&IniValue::Integer(9)));
    }

    #[test]
    fn set_value_keeps_comment() {
        let mut section = IniContainer::new("s");
        let mut item = IniItem::new("a", 1);
        item.set_comment("original comment");
        section.set_item(item);

        section.set_value("a", 2);
        assert_eq!(
            section.get_item("a").and_then(IniItem::comment),
            Some("original comment")
        );
    }

    #[test]
    fn indexing() {
        let mut root = IniContainer::default();
        let mut section = IniContainer::new("db");
        section.set_value("port", 5432);
        root.set_section(section);

        assert_eq!(root["db"]["port"].as_value(), Some(&IniValue::Integer(5432)));
    }

    #[test]
    fn walk_yields_dotted_paths() {
        let config: IniContainer = "[a]\nx = 1\n[[b]]\ny = 2\n[c]\nz = 3\n"
            .parse()
            .unwrap();
        let paths: Vec<String> = config.walk().map(|(path, _)| path).collect();
        assert_eq!(paths, vec!["a", "a.x", "a.b", "a.b.y", "c", "c.z"]);

        let leaf = config
            .walk()
            .find(|(path, _)| path == "a.b.y")
            .and_then(|(_, entry)| entry.as_value().cloned());
        assert_eq!(leaf, Some(IniValue::Integer(2)));
    }

    #[test]
    fn description_capitalizes_the_comment() {
        let config: IniContainer = "# the main section\n[main]\nx = 1\n".parse().unwrap();
        let main = config.get_section("main").unwrap();
        assert_eq!(main.description().as_deref(), Some("The main section"));
        assert_eq!(IniContainer::new("bare").description(), None);
    }

    #[test]
    fn remove() {
        let mut section = IniContainer::new("s");
        section.set_value("a", 1);
        section.set_value("b", 2);

        assert!(section.remove("a").is_some());
        assert!(section.remove("a").is_none());
        assert_eq!(section.len(), 1);
        assert!(section.contains("b"));
    }
}
