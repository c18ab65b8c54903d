/// Build the optional positional parameters expected by `execute` and `query`.
///
/// `params!()` gives `None`, `params!(1, "Alice")` gives `Some(Parameters)` holding both values.
#[macro_export]
macro_rules! params {
    () => {
        None::<$crate::parameters::Parameters>
    };
    ($($param:expr),+ $(,)?) => {
        Some($crate::parameters::Parameters::from(vec![$($crate::parameters::Parameter::from($param)),+]))
    };
}

#[macro_export]
macro_rules! execute {
    ($obj:expr, $statement:expr $(, $rest:expr)*) => {
        $obj.execute($statement, $crate::params!($($rest),*))
    };
}

#[cfg(test)]
mod tests {
    use crate::parameters::{Parameter, Parameters};

    #[test]
    fn test_params() {
        assert!(params!().is_none());
        assert_eq!(
            params!(1, "Alice", 2.5_f64),
            Some(Parameters::from(vec![
                Parameter::Int32(1),
                Parameter::Text("Alice".to_string()),
                Parameter::Float64(2.5)
            ]))
        );
    }
}
