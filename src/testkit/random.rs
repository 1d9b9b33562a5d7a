//! Random values for test objects, drawn from v4 UUIDs.

use uuid::Uuid;

const DEFAULT_LENGTH: usize = 12;

fn letters(n: usize, base: u8) -> String {
    let mut out = String::with_capacity(n);
    while out.len() < n {
        for b in Uuid::new_v4().as_bytes() {
            if out.len() == n {
                break;
            }
            out.push(char::from(base + b % 26));
        }
    }
    out
}

/// Upper-case letters; unquoted identifiers resolve to upper case.
pub fn alpha_n(n: usize) -> String {
    letters(n, b'A')
}

pub fn alpha() -> String {
    alpha_n(DEFAULT_LENGTH)
}

pub fn alpha_lower_n(n: usize) -> String {
    letters(n, b'a')
}

pub fn uuid() -> String {
    Uuid::new_v4().to_string()
}

pub fn comment() -> String {
    format!("Comment {}", alpha_lower_n(DEFAULT_LENGTH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lengths_and_alphabets() {
        let upper = alpha_n(40);
        assert_eq!(upper.len(), 40);
        assert!(upper.chars().all(|c| c.is_ascii_uppercase()));
        assert!(alpha_lower_n(5).chars().all(|c| c.is_ascii_lowercase()));
        assert_eq!(alpha().len(), 12);
        assert_ne!(alpha(), alpha());
    }
}
