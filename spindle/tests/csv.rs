//! A very simple csv parser that acts only on numbers, built out of the
//! combinators.

use spindle::mapper::{concat, skip};
use spindle::{char, many, pattern, separated, seq, CharStream, Outcome, Parser, Stream, Value};

/// Parsers for each rule of the grammar.
///
/// csv    = record , { record } ;
/// record = fields , "\n" ;
/// fields = field , { "," , field } ;
/// field  = digit , { digit } ;
/// digit  = "0" | "1" | "2" | "3" | "4" | "5" | "6" | "7" | "8" | "9" ;
struct Csv {
    digit: Parser,
    field: Parser,
    fields: Parser,
    record: Parser,
    csv: Parser,
}

impl Csv {
    fn new() -> Csv {
        let digit = pattern("[0-9]").unwrap().label("digit");
        let field = many(digit.clone()).label("field").map(concat());
        let fields = separated(char(','), field.clone()).label("fields");
        let record = seq([fields.clone(), char('\n').map(skip())])
            .label("record")
            .map(spindle::mapper::first());
        let csv = many(record.clone()).label("csv");
        Csv {
            digit,
            field,
            fields,
            record,
            csv,
        }
    }
}

fn parse(parser: &Parser, input: &str) -> (Value, usize) {
    let mut stream = CharStream::new(input);
    let value = parser
        .parse(&mut stream)
        .unwrap()
        .into_value()
        .unwrap_or_else(|f| panic!("{}", f));
    (value, stream.offset())
}

fn strings(items: &[&str]) -> Value {
    Value::List(items.iter().map(|s| Value::from(*s)).collect())
}

#[test]
fn digit() {
    let csv = Csv::new();
    let (value, offset) = parse(&csv.digit, "7");
    assert_eq!(value.to_text().unwrap(), "7");
    assert_eq!(offset, 1);
}

#[test]
fn field() {
    let csv = Csv::new();
    let (value, offset) = parse(&csv.field, "789,");
    assert_eq!(value, Value::from("789"));
    assert_eq!(offset, 3);
}

#[test]
fn fields() {
    let csv = Csv::new();
    let (value, _) = parse(&csv.fields, "123,789");
    assert_eq!(value, strings(&["123", "789"]));
}

#[test]
fn record() {
    let csv = Csv::new();
    let (value, offset) = parse(&csv.record, "123,789\n");
    assert_eq!(value, strings(&["123", "789"]));
    assert_eq!(offset, 8);
}

#[test]
fn csv() {
    let csv = Csv::new();
    let (value, _) = parse(&csv.csv, "184,754\n33,22222\n");
    assert_eq!(
        value,
        Value::List(vec![strings(&["184", "754"]), strings(&["33", "22222"])])
    );
}

#[test]
fn record_without_newline() {
    let csv = Csv::new();
    let mut stream = CharStream::new("12,3");
    let outcome = csv.record.parse(&mut stream).unwrap();
    assert_eq!(
        outcome,
        Outcome::Failure(spindle::Failure::new(
            "char",
            "Expected \"\\n\", got \"EOS\" at line 1 offset 4"
        ))
    );
    assert_eq!(stream.offset(), 0);
}
