//! Ordered sequence of values.

use std::slice;

use super::type_tag::{default_for_tag, TypeId};
use super::Value;


/// An ordered list of values. The list's type tag is the concatenation of
/// its elements' tags.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct List {
    values: Vec<Value>,
}

impl List {
    pub fn new() -> Self {
        List { values: Vec::new() }
    }

    /// Fixed-arity list with one default-initialized slot per tag character.
    /// Unknown tag characters give Nil slots.
    pub fn from_type_tag(tag: &str) -> Self {
        tag.chars().map(default_for_tag).collect()
    }

    /// Empty elements are stored as Nil.
    pub fn from_values(values: Vec<Value>) -> Self {
        values.into_iter().collect()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, pos: usize) -> Option<&Value> {
        self.values.get(pos)
    }

    pub fn last(&self) -> Option<&Value> {
        self.values.last()
    }

    /// Append a value. Empty is stored as Nil.
    pub fn push_back(&mut self, value: Value) {
        self.values.push(value.or_nil());
    }

    /// Prepend a value. Empty is stored as Nil.
    pub fn push_front(&mut self, value: Value) {
        self.values.insert(0, value.or_nil());
    }

    /// Replace the value at `pos`. Returns false when out of range.
    pub fn set_value_at(&mut self, pos: usize, value: Value) -> bool {
        match self.values.get_mut(pos) {
            Some(slot) => {
                *slot = value.or_nil();
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> slice::Iter<'_, Value> {
        self.values.iter()
    }

    pub fn type_tag(&self) -> String {
        self.values.iter().map(|v| v.type_tag()).collect()
    }

    pub fn type_id(&self) -> TypeId {
        TypeId::of(&self.type_tag())
    }
}

impl<'a> IntoIterator for &'a List {
    type Item = &'a Value;
    type IntoIter = slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

impl FromIterator<Value> for List {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        List {
            values: iter.into_iter().map(Value::or_nil).collect(),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_type_tag_has_fixed_arity() {
        let list = List::from_type_tag("fsH");
        assert_eq!(list.len(), 3);
        assert_eq!(list.get(0), Some(&Value::real(0.0)));
        assert_eq!(list.get(1), Some(&Value::string("")));
        assert!(list.get(2).map(Value::is_hash).unwrap_or(false));
        assert_eq!(list.type_tag(), "fsH");
    }

    #[test]
    fn unknown_tag_char_keeps_arity_and_tag_in_step() {
        let list = List::from_type_tag("f?");
        assert_eq!(list.len(), 2);
        assert!(list.get(1).map(Value::is_nil).unwrap_or(false));
        assert_eq!(list.type_tag(), "fN");
    }

    #[test]
    fn from_values_stores_empty_as_nil() {
        let list = List::from_values(vec![Value::Empty, Value::real(1.0)]);
        assert_eq!(list.type_tag(), "Nf");
    }

    #[test]
    fn tag_is_concatenation() {
        let list = List::from_values(vec![Value::real(1.0), Value::string("a")]);
        assert_eq!(list.type_tag(), "fs");
        assert_eq!(list.type_id(), TypeId::of("fs"));
    }

    #[test]
    fn nested_list_tag_flattens() {
        let inner = Value::list(List::from_values(vec![Value::real(1.0), Value::Nil]));
        let list = List::from_values(vec![Value::string("x"), inner]);
        assert_eq!(list.type_tag(), "sfN");
    }

    #[test]
    fn push_front_and_back() {
        let mut list = List::new();
        list.push_back(Value::real(2.0));
        list.push_front(Value::real(1.0));
        list.push_back(Value::Empty);
        assert_eq!(list.len(), 3);
        assert_eq!(list.get(0), Some(&Value::real(1.0)));
        assert_eq!(list.last(), Some(&Value::Nil));
    }

    #[test]
    fn set_value_at_out_of_range() {
        let mut list = List::from_type_tag("f");
        assert!(list.set_value_at(0, Value::real(5.0)));
        assert!(!list.set_value_at(3, Value::real(5.0)));
        assert_eq!(list.get(0), Some(&Value::real(5.0)));
    }
}
