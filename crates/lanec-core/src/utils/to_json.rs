use serde::Serialize;
use serde_json::Value;

use crate::error::Result;

/// Dump IR nodes as JSON for snapshot-style debugging.
pub trait ToJson {
    fn to_json(&self) -> Result<Value>;

    fn to_json_string(&self) -> Result<String> {
        let json = self.to_json()?;
        Ok(serde_json::to_string_pretty(&json)?)
    }
}

impl<T: Serialize> ToJson for T {
    fn to_json(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{IrConstant, IrValue, Ty};

    #[test]
    fn dumps_values_as_json() {
        let value = IrValue::Constant(IrConstant::Int(7, Ty::I32));
        let json = value.to_json().unwrap();
        assert_eq!(json["Constant"]["Int"][0], 7);
    }
}
