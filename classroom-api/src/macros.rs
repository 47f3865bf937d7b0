/// Generates consuming builder setters for request structs.
///
/// `setter!(name: Ty)` assigns directly, `setter!(opt name: Ty)` wraps the
/// value in `Some`, and `setter!(opt outer.inner: Ty)` reaches one level
/// into a nested payload.
macro_rules! setter {
    ($field:ident : $ty:ty) => {
        pub fn $field<T>(mut self, $field: T) -> Self
        where
            T: Into<$ty>,
        {
            self.$field = $field.into();
            self
        }
    };

    (opt $field:ident : $ty:ty) => {
        pub fn $field<T>(mut self, $field: T) -> Self
        where
            T: Into<$ty>,
        {
            self.$field = std::option::Option::Some($field.into());
            self
        }
    };

    (opt $field:ident . $subfield:ident : $ty:ty) => {
        pub fn $subfield<T>(mut self, $subfield: T) -> Self
        where
            T: Into<$ty>,
        {
            self.$field.$subfield = std::option::Option::Some($subfield.into());
            self
        }
    };
}

pub(crate) use setter;
