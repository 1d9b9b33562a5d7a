//! Small helpers over result sets.

use crate::error::SdkError;

/// First element matching `predicate`, or [`SdkError::ObjectNotFound`].
pub fn find_first<T, I, F>(items: I, mut predicate: F) -> Result<T, SdkError>
where
    I: IntoIterator<Item = T>,
    F: FnMut(&T) -> bool,
{
    items
        .into_iter()
        .find(|item| predicate(item))
        .ok_or(SdkError::ObjectNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_first_match() {
        let found = find_first(vec!["a", "bb", "cc"], |s| s.len() == 2).unwrap();
        assert_eq!(found, "bb");
    }

    #[test]
    fn empty_match_is_not_found() {
        let err = find_first(Vec::<i32>::new(), |_| true).unwrap_err();
        assert!(matches!(err, SdkError::ObjectNotFound));
    }
}
