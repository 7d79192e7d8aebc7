/// Scope function for continuing a method chain with the owned value.
pub trait LetAlso: Sized {
    fn let_owned<R, F>(self, f: F) -> R
    where
        F: FnOnce(Self) -> R,
    {
        f(self)
    }
}

impl<T> LetAlso for T {}
