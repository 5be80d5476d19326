//! Query expressions
//!
//! The query language itself is interpreted by the database; the driver
//! only needs to build and carry expression trees. An [`Expr`] is such a
//! tree, and the functions in this module build the handful of forms used
//! to drive pagination.

use fauna_core::{Reference, SetExpression, Value};
use fauna_protocol::json::encode;
use fauna_protocol::PageOptions;
use serde::{Serialize, Serializer};
use serde_json::Value as JsonValue;

/// An opaque query expression
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Expr(Value);

impl Expr {
    /// Wrap a raw expression tree
    pub fn new(value: impl Into<Value>) -> Self {
        Self(value.into())
    }

    /// The expression tree
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Consume and return the expression tree
    pub fn into_value(self) -> Value {
        self.0
    }

    /// Wire JSON of the expression
    pub fn to_json(&self) -> JsonValue {
        encode(&self.0)
    }

    /// The argument of a single-form expression such as `{"get": ...}`
    pub fn form(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Lambda and collection of a `map` expression
    pub fn as_map(&self) -> Option<(&Value, &Value)> {
        Some((self.form("map")?, self.form("collection")?))
    }
}

impl From<Value> for Expr {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl From<Reference> for Expr {
    fn from(reference: Reference) -> Self {
        Self(Value::Ref(reference))
    }
}

impl From<SetExpression> for Expr {
    fn from(set: SetExpression) -> Self {
        Self(Value::Set(set))
    }
}

impl From<i64> for Expr {
    fn from(v: i64) -> Self {
        Self(Value::Integer(v))
    }
}

impl From<bool> for Expr {
    fn from(v: bool) -> Self {
        Self(Value::Boolean(v))
    }
}

impl From<&str> for Expr {
    fn from(v: &str) -> Self {
        Self(Value::from(v))
    }
}

impl From<String> for Expr {
    fn from(v: String) -> Self {
        Self(Value::String(v))
    }
}

impl From<Expr> for Value {
    fn from(expr: Expr) -> Self {
        expr.0
    }
}

impl Serialize for Expr {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_json().serialize(serializer)
    }
}

fn form<I>(fields: I) -> Expr
where
    I: IntoIterator<Item = (&'static str, Value)>,
{
    Expr(fields.into_iter().collect())
}

/// Resources of `index` matching `terms`
pub fn match_index(terms: impl Into<Expr>, index: impl Into<Expr>) -> Expr {
    form([
        ("match", index.into().into_value()),
        ("terms", terms.into().into_value()),
    ])
}

/// One page of `set`
pub fn paginate(set: impl Into<Expr>, options: &PageOptions) -> Expr {
    let mut fields = vec![
        ("paginate", set.into().into_value()),
        ("size", Value::Integer(options.size as i64)),
    ];
    if let Some(after) = &options.after {
        fields.push(("after", after.as_value().clone()));
    }
    if let Some(before) = &options.before {
        fields.push(("before", before.as_value().clone()));
    }
    form(fields)
}

/// Apply `lambda` to every element of `collection`
pub fn map(lambda: impl Into<Expr>, collection: impl Into<Expr>) -> Expr {
    form([
        ("map", lambda.into().into_value()),
        ("collection", collection.into().into_value()),
    ])
}

/// A one-argument function binding `name` in `body`
pub fn lambda(name: &str, body: impl Into<Expr>) -> Expr {
    form([
        ("lambda", Value::from(name)),
        ("expr", body.into().into_value()),
    ])
}

/// The value bound to `name`
pub fn var(name: &str) -> Expr {
    form([("var", Value::from(name))])
}

/// The instance behind a reference
pub fn get(reference: impl Into<Expr>) -> Expr {
    form([("get", reference.into().into_value())])
}

/// The value at `path` inside `from`
pub fn select<I, S>(path: I, from: impl Into<Expr>) -> Expr
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let path: Vec<Value> = path.into_iter().map(|s| Value::String(s.into())).collect();
    form([("select", Value::Array(path)), ("from", from.into().into_value())])
}

/// The wire query fetching one page of `expression`
///
/// A server-side `map` is kept outermost so it applies to the fetched page:
/// `map(l, set)` becomes `map(l, paginate(set))`.
pub fn paginate_query(expression: &Expr, options: &PageOptions) -> Expr {
    match expression.as_map() {
        Some((lambda, collection)) => map(
            Expr(lambda.clone()),
            paginate(Expr(collection.clone()), options),
        ),
        None => paginate(expression.clone(), options),
    }
}
