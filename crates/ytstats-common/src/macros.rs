//! Convenience macros for early returns with `YtStatsError`

/// Return early with a `YtStatsError` built by the named constructor
///
/// The first argument names a message-only constructor on `YtStatsError`
/// (`graph`, `export`, `validation`, `config`, `resolution`, ...).
///
/// # Examples
///
/// ```rust
/// use ytstats_common::{bail, Result};
///
/// fn check_title(title: &str) -> Result<()> {
///     if title.is_empty() {
///         bail!(validation, "Channel title is empty");
///     }
///     Ok(())
/// }
/// ```
#[macro_export]
macro_rules! bail {
    ($kind:ident, $msg:literal $(,)?) => {
        return Err($crate::YtStatsError::$kind(format!($msg)))
    };
    ($kind:ident, $fmt:expr, $($arg:tt)*) => {
        return Err($crate::YtStatsError::$kind(format!($fmt, $($arg)*)))
    };
}

/// Return early with a `YtStatsError` unless the condition holds
///
/// # Examples
///
/// ```rust
/// use ytstats_common::{ensure, Result};
///
/// fn check_points(len: usize) -> Result<()> {
///     ensure!(len > 0, graph, "Cannot draw {} points", len);
///     Ok(())
/// }
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $kind:ident, $msg:literal $(,)?) => {
        if !$cond {
            return Err($crate::YtStatsError::$kind(format!($msg)));
        }
    };
    ($cond:expr, $kind:ident, $fmt:expr, $($arg:tt)*) => {
        if !$cond {
            return Err($crate::YtStatsError::$kind(format!($fmt, $($arg)*)));
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::{Result, YtStatsError};

    #[test]
    fn test_bail_macro() {
        fn fails(name: &str) -> Result<()> {
            bail!(resolution, "No channel found for handle {}", name);
        }

        let error = fails("@nobody").unwrap_err();
        assert!(matches!(error, YtStatsError::Resolution { .. }));
        assert!(error.to_string().contains("@nobody"));
    }

    #[test]
    fn test_ensure_macro() {
        fn check(len: usize) -> Result<()> {
            ensure!(len > 0, export, "Cannot export an empty series");
            Ok(())
        }

        assert!(check(3).is_ok());
        let error = check(0).unwrap_err();
        assert!(matches!(error, YtStatsError::Export { .. }));
        assert!(error.to_string().contains("empty series"));
    }
}
