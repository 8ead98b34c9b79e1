//! Conversion of `validator` results into validation failures

use std::any::type_name;

use validator::{ValidationErrors, ValidationErrorsKind};

use crate::failure::ValidationFailure;
use crate::response::FieldError;

/// Key `validator` files schema-level errors under
const SCHEMA_KEY: &str = "__all__";

impl ValidationFailure {
    /// Failure for a validated value of type `T`, named after the type
    ///
    /// `OrderRequest` reports `orderRequest` as its object name.
    pub fn for_type<T: ?Sized>(errors: &ValidationErrors) -> Self {
        Self::from_errors(&object_name::<T>(), errors)
    }

    /// Flatten `errors` into field errors attributed to `object_name`
    ///
    /// Nested fields use dotted paths (`address.city`, `items[0].sku`).
    /// Entries are ordered by field path with object-level entries last; the
    /// errors of one field keep the order the rules were declared in.
    pub fn from_errors(object_name: &str, errors: &ValidationErrors) -> Self {
        let mut entries = Vec::new();
        collect(object_name, None, errors, &mut entries);

        entries.sort_by(|a, b| {
            (a.field.is_none(), a.field.as_deref()).cmp(&(b.field.is_none(), b.field.as_deref()))
        });

        Self::new(entries)
    }
}

fn collect(object_name: &str, prefix: Option<&str>, errors: &ValidationErrors, out: &mut Vec<FieldError>) {
    for (key, kind) in errors.errors() {
        let key = key.to_string();
        let path = if key == SCHEMA_KEY {
            prefix.map(str::to_owned)
        } else {
            Some(prefix.map_or_else(|| key.clone(), |prefix| format!("{prefix}.{key}")))
        };

        match kind {
            ValidationErrorsKind::Field(list) => out.extend(list.iter().map(|error| FieldError {
                code: error.code.to_string(),
                object_name: object_name.to_owned(),
                field: path.clone(),
                default_message: error.message.as_ref().map(ToString::to_string),
            })),
            ValidationErrorsKind::Struct(nested) => collect(object_name, path.as_deref(), nested, out),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    let item = format!("{}[{index}]", path.as_deref().unwrap_or_default());
                    collect(object_name, Some(&item), nested, out);
                }
            }
        }
    }
}

/// Short type name with a lowercase first letter
fn object_name<T: ?Sized>() -> String {
    let full = type_name::<T>();
    let path = full.split('<').next().unwrap_or(full);
    let short = path.rsplit("::").next().unwrap_or(path);

    let mut chars = short.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_lowercase().chain(chars).collect()
    })
}
