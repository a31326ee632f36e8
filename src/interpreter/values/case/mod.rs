use super::Value;

/// Active case of an enum value together with its associated values.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseValue {
    pub enum_name: String,
    pub case: String,
    pub payload: Vec<Value>, // associated values
}

impl CaseValue {
    pub fn new(enum_name: impl Into<String>, case: impl Into<String>, payload: Vec<Value>) -> Self {
        Self {
            enum_name: enum_name.into(),
            case: case.into(),
            payload,
        }
    }
}
