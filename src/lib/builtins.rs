use crate::lib::object::{Builtin, Object};

/// The fixed table of native functions. Identifiers resolve here only after
/// the environment chain comes up empty, so user bindings may shadow these.
pub fn lookup(name: &str) -> Option<Builtin> {
    let builtin = match name {
        "len" => Builtin { name: "len", apply: len },
        "first" => Builtin {
            name: "first",
            apply: first,
        },
        "last" => Builtin {
            name: "last",
            apply: last,
        },
        "rest" => Builtin {
            name: "rest",
            apply: rest,
        },
        "push" => Builtin {
            name: "push",
            apply: push,
        },
        _ => return None,
    };
    Some(builtin)
}

fn wrong_arity(got: usize, want: usize) -> Object {
    Object::Error(format!(
        "wrong number of arguments. got={}, want={}",
        got, want
    ))
}

fn len(args: &[Object]) -> Object {
    if args.len() != 1 {
        return wrong_arity(args.len(), 1);
    }
    match &args[0] {
        Object::Str(value) => Object::Integer(value.chars().count() as i64),
        Object::Array(elements) => Object::Integer(elements.len() as i64),
        other => Object::Error(format!(
            "argument to 'len' not supported, got {}",
            other.type_name()
        )),
    }
}

fn first(args: &[Object]) -> Object {
    if args.len() != 1 {
        return wrong_arity(args.len(), 1);
    }
    match &args[0] {
        Object::Array(elements) => elements.first().cloned().unwrap_or(Object::Null),
        other => Object::Error(format!(
            "argument to 'first' must be ARRAY, got {}",
            other.type_name()
        )),
    }
}

fn last(args: &[Object]) -> Object {
    if args.len() != 1 {
        return wrong_arity(args.len(), 1);
    }
    match &args[0] {
        Object::Array(elements) => elements.last().cloned().unwrap_or(Object::Null),
        other => Object::Error(format!(
            "argument to 'last' must be ARRAY, got {}",
            other.type_name()
        )),
    }
}

fn rest(args: &[Object]) -> Object {
    if args.len() != 1 {
        return wrong_arity(args.len(), 1);
    }
    match &args[0] {
        Object::Array(elements) => {
            if elements.is_empty() {
                Object::Null
            } else {
                Object::Array(elements[1..].to_vec())
            }
        }
        other => Object::Error(format!(
            "argument to 'rest' must be ARRAY, got {}",
            other.type_name()
        )),
    }
}

fn push(args: &[Object]) -> Object {
    if args.len() != 2 {
        return wrong_arity(args.len(), 2);
    }
    match &args[0] {
        Object::Array(elements) => {
            let mut extended = elements.clone();
            extended.push(args[1].clone());
            Object::Array(extended)
        }
        other => Object::Error(format!(
            "argument to 'push' must be ARRAY, got {}",
            other.type_name()
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn test_unknown_names_resolve_to_none() -> Result<()> {
        assert!(lookup("len").is_some());
        assert!(lookup("nope").is_none());
        Ok(())
    }

    #[test]
    fn test_len_arity_and_types() -> Result<()> {
        let f = lookup("len").unwrap();
        assert_eq!(
            (f.apply)(&[Object::Str("hello".into())]),
            Object::Integer(5)
        );
        assert_eq!(
            (f.apply)(&[Object::Array(vec![Object::Integer(1)])]),
            Object::Integer(1)
        );
        assert_eq!(
            (f.apply)(&[Object::Integer(1)]),
            Object::Error("argument to 'len' not supported, got INTEGER".to_owned())
        );
        assert_eq!(
            (f.apply)(&[Object::Str("a".into()), Object::Str("b".into())]),
            Object::Error("wrong number of arguments. got=2, want=1".to_owned())
        );
        Ok(())
    }

    #[test]
    fn test_array_builtins() -> Result<()> {
        let arr = Object::Array(vec![
            Object::Integer(1),
            Object::Integer(2),
            Object::Integer(3),
        ]);
        let empty = Object::Array(vec![]);

        assert_eq!((lookup("first").unwrap().apply)(&[arr.clone()]), Object::Integer(1));
        assert_eq!((lookup("first").unwrap().apply)(&[empty.clone()]), Object::Null);
        assert_eq!((lookup("last").unwrap().apply)(&[arr.clone()]), Object::Integer(3));
        assert_eq!(
            (lookup("rest").unwrap().apply)(&[arr.clone()]),
            Object::Array(vec![Object::Integer(2), Object::Integer(3)])
        );
        assert_eq!((lookup("rest").unwrap().apply)(&[empty.clone()]), Object::Null);

        // push returns a new array; the input is untouched.
        let pushed = (lookup("push").unwrap().apply)(&[empty.clone(), Object::Integer(9)]);
        assert_eq!(pushed, Object::Array(vec![Object::Integer(9)]));
        assert_eq!(empty, Object::Array(vec![]));
        Ok(())
    }
}
