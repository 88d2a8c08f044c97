/// Returns early with `$error` when `$predicate` does not hold.
///
/// Like `assert!`, but for parse paths that must report instead of panic.
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error);
        }
    };
}

pub(crate) use ensure;
