//! Name-keyed collection of attribute arrays for one element class.

use std::collections::HashMap;

use super::attribute::{AttributeData, AttributeError, AttributeValue};

/// Maps attribute names to attribute arrays.
///
/// Every array in the map holds exactly one value per element of the owning
/// container; the container keeps the arrays in lock step as elements are
/// added and removed.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct AttributeMap {
    element_count: usize,
    attributes: HashMap<String, AttributeData>,
}

impl AttributeMap {
    /// Constructs an empty attribute map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of attributes in the map.
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Returns `true` if the map contains no attributes.
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Returns the number of elements each attribute array holds.
    pub fn element_count(&self) -> usize {
        self.element_count
    }

    /// Returns `true` if the map contains an attribute named `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Returns the attribute array named `name`, if any, without a type
    /// check.
    pub fn find(&self, name: &str) -> Option<&AttributeData> {
        self.attributes.get(name)
    }

    /// Iterates over the attributes in the map in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeData)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Constructs an attribute named `name` of type `T` and returns its
    /// contents, replacing any existing attribute with the same name.
    pub fn emplace<T: AttributeValue>(&mut self, name: &str) -> &mut [T] {
        let data = self
            .attributes
            .entry(name.to_owned())
            .insert_entry(T::new_data(self.element_count))
            .into_mut();
        let Some(values) = T::as_mut_slice(data) else {
            unreachable!("emplaced attribute has wrong type")
        };
        values
    }

    /// Constructs an attribute named `name` of type `T` if it does not exist,
    /// and returns its contents. Returns an error if an attribute with the
    /// same name but a different type already exists.
    pub fn try_emplace<T: AttributeValue>(&mut self, name: &str) -> Result<&mut [T], AttributeError> {
        let data = self
            .attributes
            .entry(name.to_owned())
            .or_insert_with(|| T::new_data(self.element_count));
        let found = data.type_name();
        T::as_mut_slice(data).ok_or(AttributeError::TypeMismatch {
            name: name.to_owned(),
            expected: T::TYPE_NAME,
            found,
        })
    }

    /// Returns the contents of the attribute named `name`, or an error if it
    /// does not exist or has a type other than `T`.
    pub fn at<T: AttributeValue>(&self, name: &str) -> Result<&[T], AttributeError> {
        let data = self.attributes.get(name).ok_or_else(|| AttributeError::NotFound {
            name: name.to_owned(),
        })?;
        T::as_slice(data).ok_or(AttributeError::TypeMismatch {
            name: name.to_owned(),
            expected: T::TYPE_NAME,
            found: data.type_name(),
        })
    }

    /// Returns the mutable contents of the attribute named `name`, or an
    /// error if it does not exist or has a type other than `T`.
    pub fn at_mut<T: AttributeValue>(&mut self, name: &str) -> Result<&mut [T], AttributeError> {
        let data = self.attributes.get_mut(name).ok_or_else(|| AttributeError::NotFound {
            name: name.to_owned(),
        })?;
        let found = data.type_name();
        T::as_mut_slice(data).ok_or(AttributeError::TypeMismatch {
            name: name.to_owned(),
            expected: T::TYPE_NAME,
            found,
        })
    }

    /// Removes the attribute named `name`. Returns `true` if an attribute was
    /// removed.
    pub fn erase(&mut self, name: &str) -> bool {
        self.attributes.remove(name).is_some()
    }

    /// Removes all attributes from the map.
    pub fn clear(&mut self) {
        self.attributes.clear();
    }

    /// Appends a default value to every attribute array.
    pub(crate) fn push_default_all(&mut self) {
        self.element_count += 1;
        for data in self.attributes.values_mut() {
            data.push_default();
        }
    }

    /// Removes the value at `index` from every attribute array by swapping
    /// the last value into its slot.
    pub(crate) fn swap_remove_all(&mut self, index: usize) {
        self.element_count -= 1;
        for data in self.attributes.values_mut() {
            data.swap_remove(index);
        }
    }

    /// Empties every attribute array, keeping the attributes registered.
    pub(crate) fn clear_elements(&mut self) {
        self.element_count = 0;
        for data in self.attributes.values_mut() {
            data.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;

    #[test]
    fn test_emplace_and_access() {
        let mut map = AttributeMap::new();
        map.push_default_all();
        map.push_default_all();
        let positions = map.emplace::<Vec3>("position");
        assert_eq!(positions.len(), 2);
        positions[0] = Vec3::X;

        assert_eq!(map.at::<Vec3>("position"), Ok([Vec3::X, Vec3::ZERO].as_slice()));
        assert_eq!(
            map.at::<f32>("position"),
            Err(AttributeError::TypeMismatch {
                name: "position".to_owned(),
                expected: "f32",
                found: "Vec3",
            }),
        );
        assert_eq!(
            map.at::<f32>("weight"),
            Err(AttributeError::NotFound {
                name: "weight".to_owned(),
            }),
        );
    }

    #[test]
    fn test_try_emplace_keeps_existing() {
        let mut map = AttributeMap::new();
        map.push_default_all();
        map.emplace::<f32>("weight")[0] = 0.5;
        let weights = map.try_emplace::<f32>("weight").expect("same type");
        assert_eq!(weights, &mut [0.5]);
        assert!(map.try_emplace::<Vec3>("weight").is_err());
    }

    #[test]
    fn test_parallel_element_ops() {
        let mut map = AttributeMap::new();
        map.emplace::<f32>("a");
        map.emplace::<u32>("b");
        for _ in 0..3 {
            map.push_default_all();
        }
        assert_eq!(map.element_count(), 3);
        map.swap_remove_all(1);
        assert_eq!(map.element_count(), 2);
        for (_, data) in map.iter() {
            assert_eq!(data.len(), 2);
        }
        assert!(map.erase("a"));
        assert!(!map.erase("a"));
        assert_eq!(map.len(), 1);
    }
}
