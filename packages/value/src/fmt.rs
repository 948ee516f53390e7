//! JSON-like `Debug` output that stays finite on cyclic graphs

use std::cell::RefCell;
use std::fmt;

use crate::{Mapping, Sequence, Value};

/// Prints a value, writing `<cycle>` where a node re-enters itself.
struct Printer<'a> {
    value: &'a Value,
    open: &'a RefCell<Vec<*const ()>>,
}

impl Printer<'_> {
    fn nested<'b>(&'b self, value: &'b Value) -> Printer<'b> {
        Printer {
            value,
            open: self.open,
        }
    }
}

impl fmt::Debug for Printer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ptr) = self.value.node_ptr() {
            if self.open.borrow().contains(&ptr) {
                return f.write_str("<cycle>");
            }
            self.open.borrow_mut().push(ptr);
            let result = match self.value {
                Value::Sequence(seq) => f
                    .debug_list()
                    .entries(seq.iter().map(|item| self.nested(item)))
                    .finish(),
                Value::Mapping(map) => f
                    .debug_map()
                    .entries(map.iter().map(|(key, value)| (key, self.nested(value))))
                    .finish(),
                _ => Ok(()),
            };
            self.open.borrow_mut().pop();
            return result;
        }

        match self.value {
            Value::Undefined => f.write_str("undefined"),
            Value::Null => f.write_str("null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{:?}", s),
            Value::Opaque(handle) => write!(f, "{:?}", handle),
            Value::Sequence(_) | Value::Mapping(_) => Ok(()),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let open = RefCell::new(Vec::new());
        Printer { value: self, open: &open }.fmt(f)
    }
}

impl fmt::Debug for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Value::Sequence(self.clone()).fmt(f)
    }
}

impl fmt::Debug for Mapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Value::Mapping(self.clone()).fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atoms() {
        assert_eq!(format!("{:?}", Value::Undefined), "undefined");
        assert_eq!(format!("{:?}", Value::Null), "null");
        assert_eq!(format!("{:?}", Value::from(2.5)), "2.5");
        assert_eq!(format!("{:?}", Value::from("hi")), "\"hi\"");
    }

    #[test]
    fn test_nested() {
        let value = Value::mapping([
            ("b", Value::sequence([Value::from(1), Value::from(true)])),
            ("a", Value::Null),
        ]);
        assert_eq!(format!("{:?}", value), "{\"a\": null, \"b\": [1, true]}");
    }

    #[test]
    fn test_cycle_is_marked() {
        let node = Mapping::deferred();
        node.seal_with([("self", Value::Mapping(node.clone()))])
            .unwrap();
        assert_eq!(format!("{:?}", node), "{\"self\": <cycle>}");
    }

    #[test]
    fn test_shared_node_is_not_a_cycle() {
        let shared = Value::sequence([Value::from(1)]);
        let value = Value::sequence([shared.clone(), shared]);
        assert_eq!(format!("{:?}", value), "[[1], [1]]");
    }
}
