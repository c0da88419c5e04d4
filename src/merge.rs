//! Merging one config tree into another.
//!
//! The typical use is layering a user config over packaged defaults: parse
//! both, then [`IniContainer::update`] the defaults with the user tree. Merge
//! semantics are controlled by [`UpdateOptions`].

use crate::{IniContainer, IniEntry, MergeError};

/// Options controlling [`IniContainer::update_with`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateOptions {
    /// Whether sections present only in the overlay are created in the base
    /// tree. A created section starts empty (comment included) and is then
    /// filled by the normal merge rules, so `create_new_items` governs its
    /// contents too. When `false`, unknown sections are silently skipped.
    pub create_new_sections: bool,

    /// Which overlay-only items are created in the base tree.
    pub create_new_items: CreateNewItems,

    /// Whether comment blocks are copied from the overlay onto matching base
    /// entries. Off by default: the base tree usually carries the canonical
    /// documentation, and user overrides should not erase it.
    pub update_comments: bool,
}

impl Default for UpdateOptions {
    fn default() -> Self {
        UpdateOptions {
            create_new_sections: true,
            create_new_items: CreateNewItems::All,
            update_comments: false,
        }
    }
}

/// Policy for overlay items with no counterpart in the base tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateNewItems {
    /// Create unknown items everywhere.
    All,
    /// Never create unknown items; only update values of existing ones.
    None,
    /// Create unknown items only inside the named sections, given as dotted
    /// paths relative to the merge root (e.g. `"plugins"` or
    /// `"server.tls"`). Elsewhere, unknown items are skipped.
    InSections(Vec<String>),
}

impl CreateNewItems {
    fn allows(&self, section_path: &str) -> bool {
        match self {
            CreateNewItems::All => true,
            CreateNewItems::None => false,
            CreateNewItems::InSections(paths) => {
                paths.iter().any(|path| path == section_path)
            }
        }
    }
}

impl IniContainer {
    /// Merges `overlay` into `self` with [`UpdateOptions::default`]: values
    /// of matching items are overwritten, overlay-only items and sections
    /// are created, and base comments are kept.
    ///
    /// ```
    /// use inidot::IniContainer;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut defaults: IniContainer = "[server]\nport = 8080\nhost = 'localhost'\n".parse()?;
    /// let user: IniContainer = "[server]\nport = 9000\n".parse()?;
    ///
    /// defaults.update(&user)?;
    /// assert_eq!(defaults["server"]["port"].as_value(), Some(&9000.into()));
    /// assert_eq!(defaults["server"]["host"].as_value(), Some(&"localhost".into()));
    /// # Ok(())
    /// # }
    /// ```
    pub fn update(&mut self, overlay: &IniContainer) -> Result<(), MergeError> {
        self.update_with(overlay, &UpdateOptions::default())
    }

    /// Merges `overlay` into `self` under explicit [`UpdateOptions`].
    ///
    /// The merge is all-or-nothing: if any entry name is an item on one side
    /// and a section on the other, a [`MergeError`] naming the conflicting
    /// path is returned and `self` is left untouched.
    pub fn update_with(
        &mut self,
        overlay: &IniContainer,
        options: &UpdateOptions,
    ) -> Result<(), MergeError> {
        check_conflicts(self, overlay, "")?;
        apply(self, overlay, options, "");
        Ok(())
    }
}

/// Walks both trees before mutating anything, so a conflict deep in the
/// overlay cannot leave the base half-merged.
fn check_conflicts(
    base: &IniContainer,
    overlay: &IniContainer,
    path: &str,
) -> Result<(), MergeError> {
    for (name, incoming) in overlay.iter() {
        let Some(existing) = base.get(name) else {
            continue;
        };
        if existing.kind() != incoming.kind() {
            return Err(MergeError {
                path: join(path, name),
                base_kind: existing.kind(),
                overlay_kind: incoming.kind(),
            });
        }
        if let (IniEntry::Section(base_sub), IniEntry::Section(overlay_sub)) =
            (existing, incoming)
        {
            check_conflicts(base_sub, overlay_sub, &join(path, name))?;
        }
    }
    Ok(())
}

fn apply(base: &mut IniContainer, overlay: &IniContainer, options: &UpdateOptions, path: &str) {
    for (name, incoming) in overlay.iter() {
        match incoming {
            IniEntry::Item(new_item) => {
                if let Some(old_item) = base.get_item_mut(name) {
                    old_item.value = new_item.value.clone();
                    if options.update_comments {
                        old_item.comment = new_item.comment.clone();
                    }
                } else if options.create_new_items.allows(path) {
                    base.set_item(new_item.clone());
                }
            }
            IniEntry::Section(new_section) => {
                if let Some(old_section) = base.get_section_mut(name) {
                    if options.update_comments {
                        old_section.comment = new_section.comment.clone();
                    }
                    apply(old_section, new_section, options, &join(path, name));
                } else if options.create_new_sections {
                    // Created empty, then filled by recursion, so the item
                    // policy also governs the new section's contents.
                    let mut created = IniContainer::new(name);
                    created.comment = new_section.comment.clone();
                    apply(&mut created, new_section, options, &join(path, name));
                    base.set_section(created);
                }
            }
        }
    }
}

fn join(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{path}.{name}")
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{EntryKind, IniValue};
    use pretty_assertions::assert_eq;

    fn parse(text: &str) -> IniContainer {
        text.parse().unwrap()
    }

    #[test]
    fn defaults_overwrite_and_create() {
        let mut base = parse("[server]\nport = 8080\nhost = 'localhost'\n");
        let overlay = parse("[server]\nport = 9000\ndebug = True\n[extra]\nx = 1\n");

        base.update(&overlay).unwrap();

        let server = base.get_section("server").unwrap();
        assert_eq!(server.get_value("port"), Some(&IniValue::Integer(9000)));
        assert_eq!(server.get_value("host"), Some(&"localhost".into()));
        assert_eq!(server.get_value("debug"), Some(&IniValue::Bool(true)));
        assert_eq!(
            base.get_section("extra").and_then(|s| s.get_value("x")),
            Some(&IniValue::Integer(1))
        );
    }

    #[test]
    fn update_keeps_base_comments() {
        let mut base = parse("[a]\n# canonical docs\nx = 1\n");
        let overlay = parse("[a]\n# user scribble\nx = 2\n");

        base.update(&overlay).unwrap();
        let x = base.get_section("a").unwrap().get_item("x").unwrap();
        assert_eq!(x.value(), &IniValue::Integer(2));
        assert_eq!(x.comment(), Some("canonical docs"));
    }

    #[test]
    fn update_comments_copies_overlay_comments() {
        let mut base = parse("# base section\n[a]\n# base item\nx = 1\n");
        let overlay = parse("# new section\n[a]\n# new item\nx = 2\n");

        let options = UpdateOptions {
            update_comments: true,
            ..Default::default()
        };
        base.update_with(&overlay, &options).unwrap();

        let a = base.get_section("a").unwrap();
        assert_eq!(a.comment(), Some("new section"));
        assert_eq!(a.get_item("x").and_then(|i| i.comment()), Some("new item"));
    }

    #[test]
    fn no_new_sections() {
        let mut base = parse("[a]\nx = 1\n");
        let overlay = parse("[a]\nx = 2\n[b]\ny = 3\n");

        let options = UpdateOptions {
            create_new_sections: false,
            ..Default::default()
        };
        base.update_with(&overlay, &options).unwrap();

        assert_eq!(
            base.get_section("a").and_then(|s| s.get_value("x")),
            Some(&IniValue::Integer(2))
        );
        assert!(base.get_section("b").is_none());
    }

    #[test]
    fn no_new_items() {
        let mut base = parse("[a]\nx = 1\n");
        let overlay = parse("[a]\nx = 2\nstray = 3\n");

        let options = UpdateOptions {
            create_new_items: CreateNewItems::None,
            ..Default::default()
        };
        base.update_with(&overlay, &options).unwrap();

        let a = base.get_section("a").unwrap();
        assert_eq!(a.get_value("x"), Some(&IniValue::Integer(2)));
        assert!(!a.contains("stray"));
    }

    #[test]
    fn new_sections_respect_the_item_policy() {
        let mut base = parse("[a]\nx = 1\n");
        let overlay = parse("# fresh\n[b]\ny = 2\n");

        let options = UpdateOptions {
            create_new_items: CreateNewItems::None,
            ..Default::default()
        };
        base.update_with(&overlay, &options).unwrap();

        let b = base.get_section("b").unwrap();
        assert_eq!(b.comment(), Some("fresh"));
        assert!(b.is_empty());
    }

    #[test]
    fn new_items_in_selected_sections_only() {
        let mut base = parse("[a]\nx = 1\n[[inner]]\ny = 2\n[b]\nz = 3\n");
        let overlay = parse(
            "[a]\nnew_a = 10\n[[inner]]\nnew_inner = 20\n[b]\nnew_b = 30\n",
        );

        let options = UpdateOptions {
            create_new_items: CreateNewItems::InSections(vec!["a.inner".into(), "b".into()]),
            ..Default::default()
        };
        base.update_with(&overlay, &options).unwrap();

        let a = base.get_section("a").unwrap();
        assert!(!a.contains("new_a"));
        assert_eq!(
            a.get_section("inner").and_then(|s| s.get_value("new_inner")),
            Some(&IniValue::Integer(20))
        );
        assert_eq!(
            base.get_section("b").and_then(|s| s.get_value("new_b")),
            Some(&IniValue::Integer(30))
        );
    }

    #[test]
    fn created_section_subtree_is_renumbered() {
        let mut base = parse("[a]\nx = 1\n");
        let overlay = parse("[top]\n[[mid]]\ndeep = 1\n");

        // Graft the overlay's `[[mid]]` (depth 2) directly at the root.
        let mid = overlay
            .get_section("top")
            .and_then(|s| s.get_section("mid"))
            .cloned()
            .unwrap();
        let mut grafted = IniContainer::default();
        grafted.set_section(mid);
        base.update(&grafted).unwrap();

        assert_eq!(base.get_section("mid").map(IniContainer::depth), Some(1));
    }

    #[test]
    fn kind_conflict_is_atomic() {
        let mut base = parse("[a]\nx = 1\n[[sub]]\ny = 2\n");
        let before = base.clone();
        // `sub` is a section in the base but an item in the overlay.
        let overlay = parse("[a]\nx = 99\nsub = 3\n");

        let err = base.update(&overlay).unwrap_err();
        assert_eq!(err.path, "a.sub");
        assert_eq!(err.base_kind, EntryKind::Section);
        assert_eq!(err.overlay_kind, EntryKind::Item);
        // Nothing was applied, not even the non-conflicting `x`.
        assert_eq!(base, before);
    }
}
