//! End-to-end tests of the value model, the tagged codec and set iteration
//! against an in-memory database that speaks wire JSON.

use chrono::{DateTime, TimeZone, Utc};
use crate::protocol::json;
use crate::query::paginate_query;
use crate::{
    decode, encode, expr, AsyncQueryExecutor, CalendarDate, Cursor, Error, Event, Expr,
    IteratorConfig, Mapping, Object, Page, PageOptions, QueryExecutor, Reference, Result,
    SetExpression, SetIterator, Timestamp, Value,
};
use futures::TryStreamExt;
use serde_json::{json, Value as JsonValue};
use std::sync::Mutex;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn frog() -> Reference {
    Reference::new(["classes", "frogs", "123"]).unwrap()
}

fn frogs_by_size() -> Reference {
    Reference::new(["indexes", "frogs_by_size"]).unwrap()
}

// ---------------------------------------------------------------------------
// Value model and codec
// ---------------------------------------------------------------------------

#[test]
fn test_ref() {
    let keys = Reference::new(["keys"]).unwrap();
    assert_eq!(keys.to_class(), keys);
    assert!(matches!(keys.id(), Err(Error::InvalidOperation(_))));

    let key = keys.child("123").unwrap();
    assert_eq!(key.to_class(), keys);
    assert_eq!(key.id().unwrap(), "123");

    let json = encode(&Value::from(frog()));
    assert_eq!(json, json!({"@ref": "classes/frogs/123"}));
    assert_eq!(decode(&json).unwrap(), Value::Ref(frog()));
}

#[test]
fn test_set() {
    let set = SetExpression::new(expr::match_index(frog(), frogs_by_size()));
    let text = json::to_string(&Value::from(set.clone()));
    assert_eq!(
        text,
        r#"{"@set":{"match":{"@ref":"indexes/frogs_by_size"},"terms":{"@ref":"classes/frogs/123"}}}"#
    );
    assert_eq!(json::from_str(&text).unwrap(), Value::Set(set));
}

#[test]
fn test_event() {
    let text = r#"{"action":"create","resource":{"@ref":"classes/frogs/123"},"ts":123}"#;
    let wire: JsonValue = serde_json::from_str(text).unwrap();

    let event = json::decode_event(&wire).unwrap();
    assert_eq!(event, Event::new(frog(), 123, "create".parse().unwrap()));
    assert_eq!(json::encode_event(&event).to_string(), text);
}

#[test]
fn test_page() {
    let page = json::decode_page(&json!({"data": [1], "before": 2, "after": 3})).unwrap();
    assert_eq!(
        page,
        Page::new(
            vec![Value::Integer(1)],
            Some(Cursor::new(2i64)),
            Some(Cursor::new(3i64))
        )
    );

    let page = Page::new(
        vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)],
        Some(Cursor::new(2i64)),
        Some(Cursor::new(3i64)),
    );
    let incremented = page.map_data(|v| Value::Integer(v.as_integer().unwrap() + 1));
    assert_eq!(
        incremented,
        Page::new(
            vec![Value::Integer(2), Value::Integer(3), Value::Integer(4)],
            Some(Cursor::new(2i64)),
            Some(Cursor::new(3i64))
        )
    );
}

#[test]
fn test_time() {
    let text = "1970-01-01T00:00:00.123456789Z";
    let ts = Timestamp::parse(text).unwrap();
    assert_eq!(encode(&Value::from(ts)), json!({"@ts": text}));
    assert_eq!(decode(&json!({"@ts": text})).unwrap(), Value::Timestamp(ts));
}

#[test]
fn test_time_conversion() {
    let native: DateTime<Utc> = Utc.with_ymd_and_hms(2015, 6, 1, 12, 30, 45).unwrap();
    assert_eq!(Timestamp::from_datetime(native).to_datetime(), native);

    let epoch = Timestamp::parse("1970-01-01T00:00:00Z").unwrap();
    assert_eq!(epoch, Timestamp::epoch());
    assert_eq!(epoch.to_datetime(), DateTime::<Utc>::default());
}

#[test]
fn test_date() {
    let date = CalendarDate::new(1970, 1, 1).unwrap();
    assert_eq!(encode(&Value::from(date)), json!({"@date": "1970-01-01"}));
    assert_eq!(decode(&json!({"@date": "1970-01-01"})).unwrap(), Value::Date(date));
}

#[test]
fn test_malformed_tags() {
    assert!(decode(&json!({"@ts": "yesterday"})).unwrap_err().is_format());
    assert!(decode(&json!({"@ref": 7})).unwrap_err().is_format());
    assert!(decode(&json!({"@date": "1970-13-01"})).unwrap_err().is_format());
}

// ---------------------------------------------------------------------------
// Set iteration
// ---------------------------------------------------------------------------

/// In-memory database holding `gadgets` instances with a single `n` field,
/// indexed by `n` in insertion order.
///
/// Every fetch goes through the wire codec: the paginate query is encoded,
/// decoded and interpreted, and the page is handed back as encoded JSON.
struct Gadgets {
    index: Reference,
    instances: Vec<(Reference, i64)>,
    calls: Mutex<Vec<PageOptions>>,
}

impl Gadgets {
    fn new() -> Self {
        Self {
            index: Reference::new(["indexes", "gadgets_by_n"]).unwrap(),
            instances: Vec::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn create(&mut self, n: i64) -> Reference {
        let id = (self.instances.len() + 1).to_string();
        let reference = Reference::new(["classes", "gadgets", id.as_str()]).unwrap();
        self.instances.push((reference.clone(), n));
        reference
    }

    fn set(&self, n: i64) -> Expr {
        expr::match_index(n, self.index.clone())
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn instance(&self, reference: &Reference) -> Result<Value> {
        let (_, n) = self
            .instances
            .iter()
            .find(|(r, _)| r == reference)
            .ok_or_else(|| Error::QueryExecution {
                code: "instance not found".to_string(),
                description: reference.to_string(),
            })?;
        let data: Object = [("n".to_string(), Value::Integer(*n))].into_iter().collect();
        Ok([("ref", Value::Ref(reference.clone())), ("data", Value::Object(data))]
            .into_iter()
            .collect())
    }

    fn matches(&self, set: &Value) -> Result<Vec<Reference>> {
        let index = set.get("match").and_then(Value::as_reference);
        let terms = set.get("terms").and_then(Value::as_integer);
        match (index, terms) {
            (Some(index), Some(n)) if *index == self.index => Ok(self
                .instances
                .iter()
                .filter(|(_, value)| *value == n)
                .map(|(r, _)| r.clone())
                .collect()),
            _ => Err(Error::QueryExecution {
                code: "invalid expression".to_string(),
                description: "expected a match on gadgets_by_n".to_string(),
            }),
        }
    }

    fn eval(&self, expression: &Value, env: &Object) -> Result<Value> {
        if let Some(name) = expression.get("var").and_then(Value::as_str) {
            return env.get(name).cloned().ok_or_else(|| Error::QueryExecution {
                code: "unbound variable".to_string(),
                description: name.to_string(),
            });
        }
        if let Some(reference) = expression.get("get") {
            let reference = self.eval(reference, env)?;
            return match reference.as_reference() {
                Some(r) => self.instance(r),
                None => Err(Error::InvalidOperation("get of a non-reference".to_string())),
            };
        }
        if let (Some(path), Some(from)) = (expression.get("select"), expression.get("from")) {
            let from = self.eval(from, env)?;
            let path: Vec<&str> = path
                .as_array()
                .map(|keys| keys.iter().filter_map(Value::as_str).collect())
                .unwrap_or_default();
            return from.at_path(path).cloned().ok_or_else(|| Error::QueryExecution {
                code: "value not found".to_string(),
                description: "select path missing".to_string(),
            });
        }
        Ok(expression.clone())
    }

    fn apply(&self, lambda: &Value, element: Value) -> Result<Value> {
        let name = lambda.get("lambda").and_then(Value::as_str).unwrap_or("x");
        let body = lambda.get("expr").cloned().unwrap_or(Value::Null);
        let env: Object = [(name.to_string(), element)].into_iter().collect();
        self.eval(&body, &env)
    }

    fn paginate(&self, query: &Value) -> Result<Page> {
        let set = query.get("paginate").cloned().unwrap_or(Value::Null);
        let size = query.get("size").and_then(Value::as_integer).unwrap_or(64) as usize;
        let matches = self.matches(&set)?;

        // Cursors are the single-element `[ref]` of the next element to return
        let start = match query.get("after").and_then(Value::as_array) {
            Some(cursor) => matches
                .iter()
                .position(|r| cursor.first().and_then(Value::as_reference) == Some(r))
                .unwrap_or(matches.len()),
            None => 0,
        };
        let end = (start + size).min(matches.len());
        let cursor_at = |i: usize| Cursor::new(vec![Value::Ref(matches[i].clone())]);

        Ok(Page::new(
            matches[start..end].iter().cloned().map(Value::Ref).collect(),
            (start > 0).then(|| cursor_at(start)),
            (end < matches.len()).then(|| cursor_at(end)),
        ))
    }

    fn run(&self, expression: &Expr, options: &PageOptions) -> Result<JsonValue> {
        self.calls.lock().unwrap().push(options.clone());

        let wire = paginate_query(expression, options).to_json().to_string();
        let query = json::from_str(&wire)?;

        let page = match (query.get("map"), query.get("collection")) {
            (Some(lambda), Some(inner)) => {
                let page = self.paginate(inner)?;
                let data = page
                    .data
                    .into_iter()
                    .map(|element| self.apply(lambda, element))
                    .collect::<Result<Vec<_>>>()?;
                Page::new(data, page.before, page.after)
            }
            _ => self.paginate(&query)?,
        };
        Ok(json::encode_page(&page))
    }
}

impl QueryExecutor for Gadgets {
    fn execute(&self, expression: &Expr, options: &PageOptions) -> Result<JsonValue> {
        self.run(expression, options)
    }
}

#[async_trait::async_trait]
impl AsyncQueryExecutor for Gadgets {
    async fn execute(&self, expression: &Expr, options: &PageOptions) -> Result<JsonValue> {
        self.run(expression, options)
    }
}

fn gadgets() -> (Gadgets, Reference, Reference) {
    let mut db = Gadgets::new();
    let a = db.create(0);
    db.create(1);
    let b = db.create(0);
    (db, a, b)
}

#[test]
fn test_set_iterator() {
    init_tracing();
    let (db, a, b) = gadgets();

    let iter = SetIterator::new(&db, db.set(0), &IteratorConfig::new().page_size(1)).unwrap();
    let values: Vec<Value> = iter.collect::<Result<_>>().unwrap();

    assert_eq!(values, vec![Value::Ref(a.clone()), Value::Ref(b.clone())]);
    assert_eq!(db.call_count(), 2);

    let calls = db.calls.lock().unwrap();
    assert!(calls[0].is_initial());
    assert_eq!(calls[1].after, Some(Cursor::new(vec![Value::Ref(b)])));
}

#[test]
fn test_set_iterator_pages_of_one_across_three_elements() {
    let mut db = Gadgets::new();
    let refs: Vec<Value> = (0..3).map(|_| Value::Ref(db.create(7))).collect();

    let iter = SetIterator::new(&db, db.set(7), &IteratorConfig::new().page_size(1)).unwrap();
    let values: Vec<Value> = iter.collect::<Result<_>>().unwrap();

    assert_eq!(values, refs);
    assert_eq!(db.call_count(), 3);
}

#[test]
fn test_set_iterator_server_mapping() {
    let (db, _, _) = gadgets();
    let lambda = expr::lambda("x", expr::select(["data", "n"], expr::get(expr::var("x"))));

    let iter = SetIterator::with_mapping(
        &db,
        db.set(0),
        Mapping::server(lambda),
        &IteratorConfig::new().page_size(1),
    )
    .unwrap();
    let values: Vec<Value> = iter.collect::<Result<_>>().unwrap();

    assert_eq!(values, vec![Value::Integer(0), Value::Integer(0)]);
}

#[test]
fn test_set_iterator_client_mapping() {
    let (db, a, b) = gadgets();

    let iter = SetIterator::with_mapping(
        &db,
        db.set(0),
        Mapping::client(|v| Value::Array(vec![v])),
        &IteratorConfig::new().page_size(1),
    )
    .unwrap();
    let values: Vec<Value> = iter.collect::<Result<_>>().unwrap();

    assert_eq!(
        values,
        vec![
            Value::Array(vec![Value::Ref(a)]),
            Value::Array(vec![Value::Ref(b)])
        ]
    );
}

#[test]
fn test_set_iterator_empty_set() {
    let (db, _, _) = gadgets();
    let mut iter = crate::set_iterator(&db, db.set(42)).unwrap();
    assert!(iter.next().is_none());
    assert_eq!(db.call_count(), 1);
}

#[test]
fn test_set_iterator_executor_failure() {
    let (db, _, _) = gadgets();
    let bogus = expr::match_index(0i64, Reference::new(["indexes", "nope"]).unwrap());
    let mut iter = crate::set_iterator(&db, bogus).unwrap();

    assert!(matches!(iter.next(), Some(Err(Error::QueryExecution { .. }))));
    assert!(!iter.cursor_state().is_exhausted());
}

#[tokio::test]
async fn test_set_stream() {
    init_tracing();
    let (db, a, b) = gadgets();
    let db = std::sync::Arc::new(db);

    let stream = crate::set_stream(
        std::sync::Arc::clone(&db),
        db.set(0),
        Mapping::None,
        &IteratorConfig::new().page_size(1),
    )
    .unwrap();
    let values: Vec<Value> = stream.try_collect().await.unwrap();

    assert_eq!(values, vec![Value::Ref(a), Value::Ref(b)]);
    assert_eq!(db.call_count(), 2);
}
