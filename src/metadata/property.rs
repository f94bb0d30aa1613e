use crate::core::Value;
use std::fmt;

/// Reads a property's current value straight from the entity.
pub type Getter<T> = fn(&T) -> Value;

/// Writes a server-generated value back into the entity.
pub type Setter<T> = fn(&mut T, Value);

/// One named property of an entity type and its persistence role.
///
/// Descriptors are plain data with function pointers, so a table of them can
/// be built once per type and shared by every handle and thread.
pub struct PropertyDescriptor<T> {
    name: &'static str,
    column: &'static str,
    getter: Getter<T>,
    setter: Option<Setter<T>>,
    primary_key: bool,
    insertable: bool,
    updatable: bool,
}

impl<T> PropertyDescriptor<T> {
    /// A regular column: insertable and updatable, column named after the property.
    pub fn new(name: &'static str, getter: Getter<T>) -> Self {
        Self {
            name,
            column: name,
            getter,
            setter: None,
            primary_key: false,
            insertable: true,
            updatable: true,
        }
    }

    /// The identity property. Not inserted and not updated unless overridden,
    /// since keys are usually generated by the server.
    pub fn primary_key(name: &'static str, getter: Getter<T>) -> Self {
        Self {
            primary_key: true,
            insertable: false,
            updatable: false,
            ..Self::new(name, getter)
        }
    }

    pub fn column(mut self, column: &'static str) -> Self {
        self.column = column;
        self
    }

    pub fn insertable(mut self, insertable: bool) -> Self {
        self.insertable = insertable;
        self
    }

    pub fn updatable(mut self, updatable: bool) -> Self {
        self.updatable = updatable;
        self
    }

    pub fn with_setter(mut self, setter: Setter<T>) -> Self {
        self.setter = Some(setter);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn column_name(&self) -> &'static str {
        self.column
    }

    pub fn is_primary_key(&self) -> bool {
        self.primary_key
    }

    pub fn is_insertable(&self) -> bool {
        self.insertable
    }

    pub fn is_updatable(&self) -> bool {
        self.updatable
    }

    pub fn is_writable(&self) -> bool {
        self.setter.is_some()
    }

    /// Reads the raw value, bypassing any transformation.
    pub fn read(&self, entity: &T) -> Value {
        (self.getter)(entity)
    }

    /// Writes `value` through the setter. Returns false if the property has none.
    pub fn write(&self, entity: &mut T, value: Value) -> bool {
        match self.setter {
            Some(setter) => {
                setter(entity, value);
                true
            }
            None => false,
        }
    }
}

impl<T> Clone for PropertyDescriptor<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            column: self.column,
            getter: self.getter,
            setter: self.setter,
            primary_key: self.primary_key,
            insertable: self.insertable,
            updatable: self.updatable,
        }
    }
}

impl<T> fmt::Debug for PropertyDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyDescriptor")
            .field("name", &self.name)
            .field("column", &self.column)
            .field("primary_key", &self.primary_key)
            .field("insertable", &self.insertable)
            .field("updatable", &self.updatable)
            .field("writable", &self.setter.is_some())
            .finish()
    }
}
