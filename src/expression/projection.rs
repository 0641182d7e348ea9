use super::reserved::{is_reserved, reserved_placeholder};
use crate::errors::ValidationError;
use itertools::Itertools;
use std::collections::{hash_map::Entry, HashMap};

/// Something that may name a field to project.
///
/// Lets [`Projection::build`] take plain strings as well as optional ones, skipping
/// `None` and blank entries.
pub trait FieldName {
    fn field_name(&self) -> Option<&str>;
}

impl FieldName for str {
    fn field_name(&self) -> Option<&str> {
        Some(self)
    }
}

impl FieldName for String {
    fn field_name(&self) -> Option<&str> {
        Some(self)
    }
}

impl<T: FieldName + ?Sized> FieldName for &T {
    fn field_name(&self) -> Option<&str> {
        (**self).field_name()
    }
}

impl<T: FieldName> FieldName for Option<T> {
    fn field_name(&self) -> Option<&str> {
        self.as_ref().and_then(FieldName::field_name)
    }
}

/// A projection expression limiting which attributes a read returns.
///
/// An empty projection means "return the whole item".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Projection {
    pub expression: String,
    pub names: HashMap<String, String>,
}

impl Projection {
    /// Build a projection over `fields`.
    ///
    /// Reserved words are replaced by their placeholder. Other fields are written
    /// literally but still get a `#field` alias in [`Projection::names`], so callers can
    /// refer to every requested field through an alias. When a reserved word's
    /// placeholder is also the alias of a literal field (`key` and `k` both want `#k`),
    /// the reserved word keeps it and the literal field goes without.
    pub fn build<I>(fields: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator,
        I::Item: FieldName,
    {
        let mut names: HashMap<String, String> = HashMap::new();
        let mut terms: Vec<String> = Vec::new();

        for field in fields {
            let Some(field) = field.field_name().map(str::trim).filter(|f| !f.is_empty())
            else {
                continue;
            };

            let term = match reserved_placeholder(field) {
                Some(placeholder) => {
                    match names.entry(placeholder.to_string()) {
                        // Two spellings of the same reserved word
                        Entry::Occupied(entry)
                            if entry.get() != field && is_reserved(entry.get()) =>
                        {
                            return Err(ValidationError::PlaceholderCollision {
                                placeholder: entry.key().clone(),
                                first: entry.get().clone(),
                                second: field.to_string(),
                            });
                        }
                        // Repeated word, or a literal field's alias giving way
                        Entry::Occupied(mut entry) => {
                            entry.insert(field.to_string());
                        }
                        Entry::Vacant(entry) => {
                            entry.insert(field.to_string());
                        }
                    }

                    placeholder.to_string()
                }
                None => {
                    // The alias is only a convenience, so skip it if the slot is taken
                    names
                        .entry(format!("#{field}"))
                        .or_insert_with(|| field.to_string());

                    field.to_string()
                }
            };

            if !terms.contains(&term) {
                terms.push(term);
            }
        }

        Ok(Self {
            expression: terms.iter().join(", "),
            names,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.expression.is_empty()
    }

    /// The subset of [`Projection::names`] used by the expression.
    ///
    /// DynamoDB rejects requests carrying expression attribute names that the
    /// expression does not use, so this is what gets sent.
    pub fn referenced_names(&self) -> HashMap<String, String> {
        let terms: Vec<&str> = self.expression.split(", ").collect();

        self.names
            .iter()
            .filter(|(placeholder, _)| terms.contains(&placeholder.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}
