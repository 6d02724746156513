use crate::common::error::CmgError;

/// Result alias used across the crate.
///
/// # Examples
///
/// ```
/// use cmg::common::result::CmgResult;
/// use cmg::common::error::CmgError;
///
/// fn example_function() -> CmgResult<String> {
///     Ok("success".to_string())
/// }
///
/// fn example_with_error() -> CmgResult<()> {
///     Err(CmgError::internal_error("Something went wrong"))
/// }
/// ```
pub type CmgResult<T> = Result<T, CmgError>;

/// Conversions from `Option` into `CmgResult`.
pub trait OptionExt<T> {
    /// Treat `None` as a missing configuration option of `section`.
    ///
    /// ```
    /// use cmg::common::result::{CmgResult, OptionExt};
    ///
    /// let url: Option<&str> = None;
    /// let result: CmgResult<&str> = url.ok_or_missing_key("lib", "url");
    /// assert!(result.is_err());
    /// ```
    fn ok_or_missing_key(self, section: &str, key: &str) -> CmgResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_missing_key(self, section: &str, key: &str) -> CmgResult<T> {
        self.ok_or_else(|| CmgError::missing_key(section, key))
    }
}
