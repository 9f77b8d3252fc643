/// Kotlin style scope function, handy at the end of long method chains.
pub trait LetAlso: Sized {
    fn let_owned<R, F>(self, f: F) -> R
    where
        F: FnOnce(Self) -> R,
    {
        f(self)
    }
}

impl<T> LetAlso for T {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_let_owned_hands_over_the_value() {
        let words = vec!["a", "b"].let_owned(|words| words.join("-"));
        assert_eq!(words, "a-b");
    }
}
