//! Zero-value to optional conversion
//!
//! Wire schemas express "unset" either as a missing field or as the type's
//! zero value (empty string, enum code `0`, epoch timestamp). Every DTO
//! boundary funnels optional fields through [`non_zero`] so that both forms
//! collapse to `None` the same way everywhere.

/// `None` when `value` equals the type's default, `Some(value)` otherwise
pub fn non_zero<T: Default + PartialEq>(value: T) -> Option<T> {
    if value == T::default() {
        None
    } else {
        Some(value)
    }
}

/// [`non_zero`] applied to an already-optional value
pub fn non_zero_opt<T: Default + PartialEq>(value: Option<T>) -> Option<T> {
    value.and_then(non_zero)
}
