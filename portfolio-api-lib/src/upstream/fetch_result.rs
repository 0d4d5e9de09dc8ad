use std::sync::Arc;

/// Outcome of one sub-fetch within a fan-out.
#[derive(Debug, Clone)]
pub enum FetchResult<T> {
    /// The fetch succeeded.
    Found(T),

    /// A best-effort fetch failed; the field degrades to `null`.
    Degraded,

    /// A mandatory fetch failed; the whole request fails.
    Fatal(Arc<ohno::AppError>),
}

impl<T> FetchResult<T> {
    /// Classify the result of a fetch whose failure must fail the whole request.
    pub fn mandatory(result: crate::Result<T>) -> Self {
        match result {
            Ok(value) => Self::Found(value),
            Err(e) => Self::Fatal(Arc::new(e)),
        }
    }

    /// Classify the result of a fetch whose failure only loses one field.
    ///
    /// `Ok(None)` means the upstream answered but had nothing to offer.
    pub fn best_effort(result: crate::Result<Option<T>>) -> Self {
        match result {
            Ok(Some(value)) => Self::Found(value),
            Ok(None) | Err(_) => Self::Degraded,
        }
    }

    /// Returns `true` if the result is `Found`.
    #[must_use]
    pub const fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// Extract the value of a mandatory fetch.
    ///
    /// `Degraded` here means a mandatory fetch came back empty, which is as fatal as an error.
    pub fn required(self) -> Result<T, Arc<ohno::AppError>> {
        match self {
            Self::Found(value) => Ok(value),
            Self::Degraded => Err(Arc::new(ohno::app_err!("required upstream data was unavailable"))),
            Self::Fatal(e) => Err(e),
        }
    }

    /// Extract the value of a best-effort fetch, passing a `Fatal` outcome through.
    pub fn optional(self) -> Result<Option<T>, Arc<ohno::AppError>> {
        match self {
            Self::Found(value) => Ok(Some(value)),
            Self::Degraded => Ok(None),
            Self::Fatal(e) => Err(e),
        }
    }
}

/// Merge three independent sub-fetches: the first is mandatory, the other two best-effort.
///
/// Any `Fatal` outcome fails the merge; `Degraded` outcomes become `None`.
pub fn merge3<A, B, C>(
    required: FetchResult<A>,
    first: FetchResult<B>,
    second: FetchResult<C>,
) -> Result<(A, Option<B>, Option<C>), Arc<ohno::AppError>> {
    Ok((required.required()?, first.optional()?, second.optional()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ohno::app_err;

    #[test]
    fn test_mandatory_ok_is_found() {
        let result = FetchResult::mandatory(Ok(42));
        assert!(result.is_found());
    }

    #[test]
    fn test_mandatory_err_is_fatal() {
        let result: FetchResult<u32> = FetchResult::mandatory(Err(app_err!("boom")));
        assert!(matches!(result, FetchResult::Fatal(_)));
    }

    #[test]
    fn test_best_effort_err_degrades() {
        let result: FetchResult<u32> = FetchResult::best_effort(Err(app_err!("boom")));
        assert!(matches!(result, FetchResult::Degraded));
    }

    #[test]
    fn test_best_effort_none_degrades() {
        let result: FetchResult<u32> = FetchResult::best_effort(Ok(None));
        assert!(matches!(result, FetchResult::Degraded));
    }

    #[test]
    fn test_best_effort_some_is_found() {
        let result = FetchResult::best_effort(Ok(Some("readme")));
        assert_eq!(result.optional().unwrap(), Some("readme"));
    }

    #[test]
    fn test_required_on_degraded_fails() {
        let result: FetchResult<u32> = FetchResult::Degraded;
        assert!(result.required().is_err());
    }

    #[test]
    fn test_optional_passes_fatal_through() {
        let result: FetchResult<u32> = FetchResult::Fatal(Arc::new(app_err!("boom")));
        assert!(result.optional().is_err());
    }

    #[test]
    fn test_merge3_all_found() {
        let merged = merge3(FetchResult::Found(1), FetchResult::Found("two"), FetchResult::Found(3.0)).unwrap();
        assert_eq!(merged.0, 1);
        assert_eq!(merged.1, Some("two"));
        assert_eq!(merged.2, Some(3.0));
    }

    #[test]
    fn test_merge3_degraded_fields_become_none() {
        let merged = merge3::<_, &str, f64>(FetchResult::Found(1), FetchResult::Degraded, FetchResult::Degraded).unwrap();
        assert_eq!(merged, (1, None, None));
    }

    #[test]
    fn test_merge3_fatal_required_fails() {
        let merged = merge3::<u32, &str, f64>(
            FetchResult::Fatal(Arc::new(app_err!("repo lookup failed"))),
            FetchResult::Found("readme"),
            FetchResult::Found(1.0),
        );
        let err = merged.unwrap_err();
        assert!(err.to_string().contains("repo lookup failed"));
    }

    #[test]
    fn test_merge3_fatal_optional_fails() {
        let merged = merge3::<u32, &str, f64>(
            FetchResult::Found(1),
            FetchResult::Fatal(Arc::new(app_err!("unexpected"))),
            FetchResult::Degraded,
        );
        assert!(merged.is_err());
    }
}
