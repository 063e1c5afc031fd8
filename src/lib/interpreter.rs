use crate::lib::ast::{
    BlockStatement, Expression, Identifier, InfixOperator, PrefixOperator, Program, Statement,
};
use crate::lib::builtins;
use crate::lib::environment::{Env, Environment};
use crate::lib::object::{Function, HashObject, Object};
use std::rc::Rc;
use tracing::debug;

/// Walks a parsed program against an environment and produces the resulting
/// object. Never fails outside its return channel: every runtime problem
/// comes back as an `Object::Error`.
pub fn eval(program: &Program, env: &Env) -> Object {
    let mut result = Object::Null;
    for stmt in &program.statements {
        result = eval_statement(stmt, env);
        match result {
            // Program-level early return: unwrap here.
            Object::ReturnValue(value) => return *value,
            Object::Error(_) => {
                debug!(error = %result, "evaluation short-circuited");
                return result;
            }
            _ => {}
        }
    }
    result
}

fn eval_statement(stmt: &Statement, env: &Env) -> Object {
    match stmt {
        Statement::Expression { expression } => eval_expression(expression, env),
        Statement::Return { value } => {
            let value = eval_expression(value, env);
            if value.is_error() {
                return value;
            }
            Object::ReturnValue(Box::new(value))
        }
        Statement::Let { name, value } => {
            let value = eval_expression(value, env);
            if value.is_error() {
                return value;
            }
            env.borrow_mut().set(name.name.clone(), value)
        }
    }
}

// Unlike `eval`, a block returns ReturnValue wrappers unchanged, so a return
// inside arbitrarily nested ifs/blocks still reaches the enclosing call
// boundary intact.
fn eval_block(block: &BlockStatement, env: &Env) -> Object {
    let mut result = Object::Null;
    for stmt in &block.statements {
        result = eval_statement(stmt, env);
        if matches!(result, Object::ReturnValue(_) | Object::Error(_)) {
            return result;
        }
    }
    result
}

fn eval_expression(expr: &Expression, env: &Env) -> Object {
    match expr {
        Expression::IntegerLiteral(value) => Object::Integer(*value),
        Expression::StringLiteral(value) => Object::Str(value.clone()),
        Expression::BooleanLiteral(value) => Object::Boolean(*value),
        Expression::Identifier(ident) => eval_identifier(ident, env),
        Expression::ArrayLiteral(elements) => match eval_expressions(elements, env) {
            Ok(elements) => Object::Array(elements),
            Err(err) => err,
        },
        Expression::HashLiteral(pairs) => eval_hash_literal(pairs, env),
        Expression::Prefix { operator, right } => {
            let right = eval_expression(right, env);
            if right.is_error() {
                return right;
            }
            eval_prefix_expression(*operator, right)
        }
        Expression::Infix {
            operator,
            left,
            right,
        } => {
            let left = eval_expression(left, env);
            if left.is_error() {
                return left;
            }
            let right = eval_expression(right, env);
            if right.is_error() {
                return right;
            }
            eval_infix_expression(*operator, left, right)
        }
        Expression::If {
            condition,
            consequence,
            alternative,
        } => {
            let condition = eval_expression(condition, env);
            if condition.is_error() {
                return condition;
            }
            if condition.is_truthy() {
                eval_block(consequence, env)
            } else if let Some(alternative) = alternative {
                eval_block(alternative, env)
            } else {
                Object::Null
            }
        }
        // The current environment is captured by reference; this is what
        // makes closures work.
        Expression::FunctionLiteral { parameters, body } => Object::Function(Rc::new(Function {
            parameters: parameters.clone(),
            body: body.clone(),
            env: Rc::clone(env),
        })),
        Expression::Call { callee, arguments } => {
            let callee = eval_expression(callee, env);
            if callee.is_error() {
                return callee;
            }
            let args = match eval_expressions(arguments, env) {
                Ok(args) => args,
                Err(err) => return err,
            };
            apply_function(callee, args)
        }
        Expression::Index { left, index } => {
            let left = eval_expression(left, env);
            if left.is_error() {
                return left;
            }
            let index = eval_expression(index, env);
            if index.is_error() {
                return index;
            }
            eval_index_expression(left, index)
        }
    }
}

fn eval_identifier(ident: &Identifier, env: &Env) -> Object {
    if ident.name == "null" {
        return Object::Null;
    }
    if let Some(value) = env.borrow().get(&ident.name) {
        return value;
    }
    if let Some(builtin) = builtins::lookup(&ident.name) {
        return Object::Builtin(builtin);
    }
    Object::Error(format!("identifier not found: {}", ident.name))
}

// Left-to-right, stopping at the first error (shared by array literals and
// call arguments).
fn eval_expressions(exprs: &[Expression], env: &Env) -> Result<Vec<Object>, Object> {
    let mut results = Vec::with_capacity(exprs.len());
    for expr in exprs {
        let evaluated = eval_expression(expr, env);
        if evaluated.is_error() {
            return Err(evaluated);
        }
        results.push(evaluated);
    }
    Ok(results)
}

fn eval_prefix_expression(operator: PrefixOperator, right: Object) -> Object {
    match operator {
        PrefixOperator::Bang => Object::Boolean(!right.is_truthy()),
        PrefixOperator::Minus => match right {
            Object::Integer(value) => Object::Integer(-value),
            other => Object::Error(format!("unknown operator: -{}", other.type_name())),
        },
    }
}

fn eval_infix_expression(operator: InfixOperator, left: Object, right: Object) -> Object {
    match (&left, &right) {
        (Object::Integer(l), Object::Integer(r)) => {
            eval_integer_infix_expression(operator, *l, *r)
        }
        (Object::Str(l), Object::Str(r)) => match operator {
            InfixOperator::Plus => Object::Str(format!("{}{}", l, r)),
            _ => unknown_operator(&left, operator, &right),
        },
        _ if left.type_name() != right.type_name() => Object::Error(format!(
            "type mismatch: {} {} {}",
            left.type_name(),
            operator,
            right.type_name()
        )),
        // Same-typed operands beyond integers and strings only support
        // (in)equality, compared by value.
        _ => match operator {
            InfixOperator::Equal => Object::Boolean(left == right),
            InfixOperator::NotEqual => Object::Boolean(left != right),
            _ => unknown_operator(&left, operator, &right),
        },
    }
}

fn eval_integer_infix_expression(operator: InfixOperator, left: i64, right: i64) -> Object {
    match operator {
        InfixOperator::Plus => Object::Integer(left.wrapping_add(right)),
        InfixOperator::Minus => Object::Integer(left.wrapping_sub(right)),
        InfixOperator::Star => Object::Integer(left.wrapping_mul(right)),
        InfixOperator::Slash => match left.checked_div(right) {
            Some(value) => Object::Integer(value),
            None => Object::Error("division by zero".to_owned()),
        },
        InfixOperator::Less => Object::Boolean(left < right),
        InfixOperator::Greater => Object::Boolean(left > right),
        InfixOperator::Equal => Object::Boolean(left == right),
        InfixOperator::NotEqual => Object::Boolean(left != right),
    }
}

fn unknown_operator(left: &Object, operator: InfixOperator, right: &Object) -> Object {
    Object::Error(format!(
        "unknown operator: {} {} {}",
        left.type_name(),
        operator,
        right.type_name()
    ))
}

fn apply_function(callee: Object, args: Vec<Object>) -> Object {
    match callee {
        Object::Builtin(builtin) => (builtin.apply)(&args),
        Object::Function(function) => {
            if args.len() != function.parameters.len() {
                return Object::Error(format!(
                    "wrong number of arguments: expected {}, got {}",
                    function.parameters.len(),
                    args.len()
                ));
            }
            // Parameters bind in a fresh scope whose outer is the function's
            // captured (defining) environment, not the caller's.
            let call_env = Environment::new_enclosed(Rc::clone(&function.env));
            for (param, arg) in std::iter::zip(&function.parameters, args) {
                call_env.borrow_mut().set(param.name.clone(), arg);
            }
            let result = eval_block(&function.body, &call_env);
            match result {
                Object::ReturnValue(value) => *value,
                other => other,
            }
        }
        other => Object::Error(format!("not a function: {}", other.type_name())),
    }
}

fn eval_index_expression(left: Object, index: Object) -> Object {
    match (&left, &index) {
        (Object::Array(elements), Object::Integer(i)) => {
            if *i < 0 || *i as usize >= elements.len() {
                Object::Null
            } else {
                elements[*i as usize].clone()
            }
        }
        (Object::Hash(hash), _) => match index.hash_key() {
            Some(key) => hash
                .get(&key)
                .map(|pair| pair.value.clone())
                .unwrap_or(Object::Null),
            None => Object::Error(format!("unusable as hash key: {}", index.type_name())),
        },
        _ => Object::Error(format!(
            "index operator not supported: {}",
            left.type_name()
        )),
    }
}

fn eval_hash_literal(pairs: &[(Expression, Expression)], env: &Env) -> Object {
    let mut hash = HashObject::new();
    for (key_expr, value_expr) in pairs {
        let key = eval_expression(key_expr, env);
        if key.is_error() {
            return key;
        }
        let hash_key = match key.hash_key() {
            Some(hash_key) => hash_key,
            None => {
                return Object::Error(format!("unusable as hash key: {}", key.type_name()))
            }
        };
        let value = eval_expression(value_expr, env);
        if value.is_error() {
            return value;
        }
        hash.insert(hash_key, key, value);
    }
    Object::Hash(hash)
}
