use std::fmt::Display;

use crate::IniValue;

/// A single `name = value` configuration entry.
///
/// Items carry an optional comment block, captured from the `#`/`;` lines
/// immediately above the definition. Overwriting an item replaces the whole
/// thing; values are never partially mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct IniItem {
    pub(crate) name: String,
    pub(crate) value: IniValue,
    pub(crate) comment: Option<String>,
}

impl IniItem {
    /// Creates a new item with no comment.
    pub fn new(name: impl Into<String>, value: impl Into<IniValue>) -> Self {
        IniItem {
            name: name.into(),
            value: value.into(),
            comment: None,
        }
    }

    /// Gets this item's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Gets the item's value.
    pub fn value(&self) -> &IniValue {
        &self.value
    }

    /// Gets a mutable reference to the item's value.
    pub fn value_mut(&mut self) -> &mut IniValue {
        &mut self.value
    }

    /// Sets the item's value.
    pub fn set_value(&mut self, value: impl Into<IniValue>) {
        self.value = value.into();
    }

    /// Gets the comment block attached to this item, if any. Multi-line
    /// comments are joined with `\n`, without the leading markers.
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Sets the comment block for this item.
    pub fn set_comment(&mut self, comment: impl Into<String>) {
        self.comment = Some(comment.into());
    }

    /// Removes the comment block from this item.
    pub fn clear_comment(&mut self) {
        self.comment = None;
    }

    /// The comment reformatted as a human-readable description: the first
    /// letter capitalized.
    pub fn description(&self) -> Option<String> {
        self.comment().map(capitalize_first)
    }
}

pub(crate) fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl Display for IniItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(comment) = self.comment() {
            for line in comment.split('\n') {
                writeln!(f, "# {}", line)?;
            }
        }
        write!(f, "{} = {}", self.name, self.value)
    }
}

impl<K, V> From<(K, V)> for IniItem
where
    K: Into<String>,
    V: Into<IniValue>,
{
    fn from((name, value): (K, V)) -> Self {
        IniItem::new(name, value)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn new() {
        let item = IniItem::new("answer", 42);
        assert_eq!(
            item,
            IniItem {
                name: "answer".into(),
                value: IniValue::Integer(42),
                comment: None,
            }
        );
    }

    #[test]
    fn description() {
        let mut item = IniItem::new("retries", 3);
        assert_eq!(item.description(), None);

        item.set_comment("retry count");
        assert_eq!(item.description().as_deref(), Some("Retry count"));
    }

    #[test]
    fn display() {
        let mut item = IniItem::new("fruits", IniValue::List(vec!["Apple".into(), "Banana".into()]));
        assert_eq!(format!("{}", item), "fruits = ['Apple', 'Banana']");

        item.set_comment("shopping list\nkeep sorted");
        assert_eq!(
            format!("{}", item),
            "# shopping list\n# keep sorted\nfruits = ['Apple', 'Banana']"
        );
    }
}
