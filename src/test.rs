// tests that Clone, Debug, Display, and PartialEq are implemented for a
// piece of seating state
#[macro_export]
macro_rules! test_basic_impls {
    ($fx: expr) => {
        #[test]
        fn should_impl_debug_clone_display_and_partialeq() {
            assert_eq!($fx, $fx.clone());
            let _s1 = format!("{:?}", $fx);
            let _s2 = format!("{}", $fx);
        }
    };
}
