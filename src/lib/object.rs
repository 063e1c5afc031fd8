use crate::lib::ast::{BlockStatement, Identifier};
use crate::lib::environment::Env;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// The computed lookup key for hashable objects. Two objects collide in a
/// hash iff they share a type tag and the same underlying value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HashKey {
    Integer(i64),
    Boolean(bool),
    Str(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct HashPair {
    pub key: Object,
    pub value: Object,
}

/// A hash value: hashed lookup, with insertion order kept on the side so
/// inspection renders pairs in the order they were written.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HashObject {
    pairs: HashMap<HashKey, HashPair>,
    order: Vec<HashKey>,
}

impl HashObject {
    pub fn new() -> Self {
        HashObject::default()
    }

    pub fn insert(&mut self, hash_key: HashKey, key: Object, value: Object) {
        if self
            .pairs
            .insert(hash_key.clone(), HashPair { key, value })
            .is_none()
        {
            self.order.push(hash_key);
        }
    }

    pub fn get(&self, key: &HashKey) -> Option<&HashPair> {
        self.pairs.get(key)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HashPair> {
        self.order.iter().filter_map(|k| self.pairs.get(k))
    }
}

/// A closure: parameters, body, and the environment it was defined in.
#[derive(Debug, Clone)]
pub struct Function {
    pub parameters: Vec<Identifier>,
    pub body: BlockStatement,
    pub env: Env,
}

// Identity comparison; comparing captured environments structurally could
// recurse through reference cycles.
impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

pub type BuiltinFn = fn(&[Object]) -> Object;

/// A host-implemented function exposed to Monkey programs under a fixed name.
#[derive(Debug, Clone, Copy)]
pub struct Builtin {
    pub name: &'static str,
    pub apply: BuiltinFn,
}

impl PartialEq for Builtin {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    Integer(i64),
    Str(String),
    Boolean(bool),
    Null,
    /// Internal signal wrapper; unwrapped exactly once at a function-call
    /// (or program) boundary and never observable outside evaluation.
    ReturnValue(Box<Object>),
    /// A first-class failure value; short-circuits sequence evaluation.
    Error(String),
    Array(Vec<Object>),
    Hash(HashObject),
    Function(Rc<Function>),
    Builtin(Builtin),
}

impl Object {
    pub fn type_name(&self) -> &'static str {
        match self {
            Object::Integer(_) => "INTEGER",
            Object::Str(_) => "STRING",
            Object::Boolean(_) => "BOOLEAN",
            Object::Null => "NULL",
            Object::ReturnValue(_) => "RETURN_VALUE",
            Object::Error(_) => "ERROR",
            Object::Array(_) => "ARRAY",
            Object::Hash(_) => "HASH",
            Object::Function(_) => "FUNCTION",
            Object::Builtin(_) => "BUILTIN",
        }
    }

    /// Only `false` and `null` are falsy; everything else, including `0`,
    /// is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Object::Boolean(v) => *v,
            Object::Null => false,
            _ => true,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Object::Error(_))
    }

    /// The lookup key for hashable objects, or `None` for types that cannot
    /// be used as hash keys.
    pub fn hash_key(&self) -> Option<HashKey> {
        match self {
            Object::Integer(v) => Some(HashKey::Integer(*v)),
            Object::Boolean(v) => Some(HashKey::Boolean(*v)),
            Object::Str(v) => Some(HashKey::Str(v.clone())),
            _ => None,
        }
    }

    /// The textual rendering shown to the user.
    pub fn inspect(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Object::Integer(v) => write!(f, "{}", v),
            Object::Str(v) => write!(f, "{}", v),
            Object::Boolean(v) => write!(f, "{}", v),
            Object::Null => write!(f, "null"),
            Object::ReturnValue(v) => write!(f, "{}", v),
            Object::Error(message) => write!(f, "ERROR: {}", message),
            Object::Array(elements) => {
                let rendered = elements
                    .iter()
                    .map(Object::to_string)
                    .collect::<Vec<String>>()
                    .join(", ");
                write!(f, "[{}]", rendered)
            }
            Object::Hash(hash) => {
                let rendered = hash
                    .iter()
                    .map(|pair| format!("{}: {}", pair.key, pair.value))
                    .collect::<Vec<String>>()
                    .join(", ");
                write!(f, "{{{}}}", rendered)
            }
            Object::Function(function) => {
                let params = function
                    .parameters
                    .iter()
                    .map(Identifier::to_string)
                    .collect::<Vec<String>>()
                    .join(", ");
                write!(f, "fn({}) {}", params, function.body)
            }
            Object::Builtin(builtin) => write!(f, "builtin function {}", builtin.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn test_hash_keys_collide_by_type_and_value() -> Result<()> {
        let hello1 = Object::Str("Hello World".to_owned());
        let hello2 = Object::Str("Hello World".to_owned());
        assert_eq!(hello1.hash_key(), hello2.hash_key());

        let diff = Object::Str("My name is johnny".to_owned());
        assert_ne!(hello1.hash_key(), diff.hash_key());

        // Same underlying value, different type tag.
        assert_ne!(
            Object::Integer(1).hash_key(),
            Object::Str("1".to_owned()).hash_key()
        );
        Ok(())
    }

    #[test]
    fn test_non_hashable_objects() -> Result<()> {
        assert_eq!(Object::Array(vec![]).hash_key(), None);
        assert_eq!(Object::Null.hash_key(), None);
        Ok(())
    }

    #[test]
    fn test_hash_object_preserves_insertion_order() -> Result<()> {
        let mut hash = HashObject::new();
        for (i, name) in ["one", "two", "three"].iter().enumerate() {
            hash.insert(
                HashKey::Str(name.to_string()),
                Object::Str(name.to_string()),
                Object::Integer(i as i64 + 1),
            );
        }
        let keys: Vec<String> = hash.iter().map(|p| p.key.to_string()).collect();
        assert_eq!(keys, ["one", "two", "three"]);
        assert_eq!(Object::Hash(hash).inspect(), "{one: 1, two: 2, three: 3}");
        Ok(())
    }

    #[test]
    fn test_truthiness() -> Result<()> {
        assert!(!Object::Boolean(false).is_truthy());
        assert!(!Object::Null.is_truthy());
        assert!(Object::Boolean(true).is_truthy());
        // Zero is truthy in this language.
        assert!(Object::Integer(0).is_truthy());
        assert!(Object::Str(String::new()).is_truthy());
        Ok(())
    }

    #[test]
    fn test_inspect_renderings() -> Result<()> {
        assert_eq!(Object::Integer(5).inspect(), "5");
        assert_eq!(Object::Boolean(true).inspect(), "true");
        assert_eq!(Object::Null.inspect(), "null");
        assert_eq!(
            Object::Error("type mismatch: INTEGER + BOOLEAN".to_owned()).inspect(),
            "ERROR: type mismatch: INTEGER + BOOLEAN"
        );
        assert_eq!(
            Object::Array(vec![Object::Integer(1), Object::Integer(2)]).inspect(),
            "[1, 2]"
        );
        Ok(())
    }
}
