//! Author: [Seclususs](https://github.com/seclususs)

#[inline]
pub fn validate_value(value: &str) -> bool {
    value.chars().all(|c| {
        c.is_alphanumeric() || matches!(c, '.' | ',' | '-' | '_' | '=' | ':' | '/' | ' ')
    })
}

#[inline]
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
