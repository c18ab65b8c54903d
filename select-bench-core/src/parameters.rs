/// A value bound to a placeholder of a statement.
#[derive(PartialEq, Debug, Clone)]
pub enum Parameter {
    Null,
    Int32(i32),
    Int64(i64),
    Float64(f64),
    Text(String),
}

impl From<i32> for Parameter {
    fn from(value: i32) -> Self {
        Parameter::Int32(value)
    }
}

impl From<i64> for Parameter {
    fn from(value: i64) -> Self {
        Parameter::Int64(value)
    }
}

impl From<f64> for Parameter {
    fn from(value: f64) -> Self {
        Parameter::Float64(value)
    }
}

impl From<String> for Parameter {
    fn from(value: String) -> Self {
        Parameter::Text(value)
    }
}

impl From<&str> for Parameter {
    fn from(value: &str) -> Self {
        Parameter::Text(value.to_string())
    }
}

/// `None` is bound as `NULL`, which is how a nullable column such as `order_items.quantity` is written.
impl<T: Into<Parameter>> From<Option<T>> for Parameter {
    fn from(value: Option<T>) -> Self {
        value.map_or(Parameter::Null, Into::into)
    }
}

/// The positional parameters of a statement, the first one is bound to the first placeholder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters {
    values: Vec<Parameter>,
}

impl Parameters {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Parameter> {
        self.values.iter()
    }
}

impl From<Vec<Parameter>> for Parameters {
    fn from(values: Vec<Parameter>) -> Self {
        Parameters { values }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_item_parameters() {
        let quantity: Option<i32> = None;
        let parameters = Parameters::from(vec![
            Parameter::from(7),
            Parameter::from(3),
            Parameter::from(format!("product{}", 7)),
            Parameter::from(3.5),
            Parameter::from(quantity),
        ]);
        assert_eq!(parameters.len(), 5);
        assert_eq!(
            parameters.iter().cloned().collect::<Vec<_>>(),
            vec![
                Parameter::Int32(7),
                Parameter::Int32(3),
                Parameter::Text("product7".to_string()),
                Parameter::Float64(3.5),
                Parameter::Null
            ]
        );
        assert_eq!(Parameter::from(Some(1_i64 << 40)), Parameter::Int64(1 << 40));
        assert_eq!(Parameter::from("2024-01-01 00:01:00"), Parameter::Text("2024-01-01 00:01:00".to_string()));
        assert!(Parameters::default().is_empty());
    }
}
