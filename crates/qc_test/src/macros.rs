/// A bot slug unique to the calling test, derived from the test function's
/// name (`test_refund_policy` becomes `test-refund-policy`).
///
/// Mocks registered under this slug only match requests made by that test.
#[macro_export]
macro_rules! bot_slug {
    () => {{
        fn marker() {}
        fn type_name_of<T>(_: T) -> &'static str {
            std::any::type_name::<T>()
        }

        let path = type_name_of(marker)
            .trim_end_matches("::marker")
            .trim_end_matches("::{{closure}}");

        path.rsplit("::")
            .next()
            .unwrap_or(path)
            .replace('_', "-")
    }};
}
