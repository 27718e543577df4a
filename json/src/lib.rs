//! A JSON grammar assembled from spindle's public combinators.
//!
//! ```
//! let value = spindle_json::parse(r#"{"a": [1, true, null]}"#).unwrap();
//! assert_eq!(value, serde_json::json!({"a": [1, true, null]}));
//! ```

use std::collections::BTreeMap;

use anyhow::{anyhow, bail, Result};
use spindle::mapper::{apply, concat, first, otherwise, skip, structure, value};
use spindle::{
    alt, any, char, enclosed, eos, many, not, opt, pattern, recurse, separated, seq, word,
    CharStream, Debugger, Parser, Rule, Stream, Value,
};

/// Build the parser for a complete JSON document. The document's value is
/// surrounded by optional whitespace and must be followed by the end of the
/// input.
pub fn grammar() -> Result<Parser> {
    let space = pattern("[ \t\r\n]")?.label("space");
    let spaces = opt(many(space))
        .label("spaces")
        .map(skip())
        .stringify(|label| label.to_owned());
    let comma = seq([spaces.clone(), char(','), spaces.clone()])
        .label("comma")
        .map(skip())
        .stringify(|label| label.to_owned());
    let colon = seq([spaces.clone(), char(':'), spaces.clone()])
        .label("colon")
        .map(skip())
        .stringify(|label| label.to_owned());

    let escaped = seq([char('\\'), any()]).label("escape").map(concat());
    let string = enclosed(
        char('"'),
        opt(many(alt([escaped, not([char('"')])])).map(concat().then(apply(unescape))))
            .map(otherwise("")),
        None,
    )
    .label("string");

    let boolean = alt([
        word("true").map(value(true)),
        word("false").map(value(false)),
    ])
    .label("boolean");

    let null = word("null").map(value(Value::Null)).label("null");

    let digits = many(pattern("[0-9]")?);
    let integer = alt([char('0'), seq([pattern("[1-9]")?, opt(digits.clone())])]);
    let fraction = seq([char('.'), digits.clone()]);
    let exponent = seq([pattern("[eE]")?, opt(pattern("[+-]")?), digits]);
    let number = seq([opt(char('-')), integer, opt(fraction), opt(exponent)])
        .label("number")
        .map(concat().then(apply(|value| {
            let text = value.to_text()?;
            let number: f64 = text
                .parse()
                .map_err(|e| anyhow!("invalid number '{}': {}", text, e))?;
            Ok(Value::Number(number))
        })));

    let json_value = Rule::new("value");

    let pair = seq([string.clone(), colon, recurse(&json_value)])
        .label("pair")
        .map(structure(["key", "value"]));
    let members = separated(comma.clone(), pair).label("members");
    let object = enclosed(
        seq([char('{'), spaces.clone()]),
        opt(members),
        seq([spaces.clone(), char('}')]),
    )
    .label("object")
    .map(apply(collect_members));

    let items = separated(comma, recurse(&json_value)).label("items");
    let array = enclosed(
        seq([char('['), spaces.clone()]),
        opt(items),
        seq([spaces.clone(), char(']')]),
    )
    .label("array")
    .map(otherwise(Value::List(Vec::new())));

    let root = alt([object, array, string, boolean, null, number])
        .label("value")
        .stringify(|label| label.to_owned());
    json_value.bind(root.clone())?;

    Ok(seq([spaces.clone(), root, spaces, eos().map(skip())])
        .label("json")
        .stringify(|label| label.to_owned())
        .map(first()))
}

/// Parse a JSON document held in memory.
pub fn parse(text: &str) -> Result<serde_json::Value> {
    let grammar = grammar()?;
    let mut stream = CharStream::new(text);
    parse_stream(&grammar, &mut stream, None)
}

/// Run `grammar` over `stream`, turning a parse failure into an error.
pub fn parse_stream(
    grammar: &Parser,
    stream: &mut dyn Stream,
    debugger: Option<&mut Debugger>,
) -> Result<serde_json::Value> {
    let value = grammar.invoke(stream, debugger)?.into_value()?;
    Ok(value.to_json()?)
}

/// Collect the key/value maps produced by `pair` into one map.
fn collect_members(members: Value) -> Result<Value> {
    let pairs = match members {
        Value::Null => Vec::new(),
        Value::List(pairs) => pairs,
        other => bail!("expected object members, got {}", other.kind()),
    };

    let mut object = BTreeMap::new();
    for pair in pairs {
        let mut pair = match pair {
            Value::Map(pair) => pair,
            other => bail!("expected a key/value pair, got {}", other.kind()),
        };
        let key = pair
            .remove("key")
            .ok_or_else(|| anyhow!("pair without a key"))?
            .to_text()?;
        let value = pair.remove("value").unwrap_or(Value::Null);
        object.insert(key, value);
    }
    Ok(Value::Map(object))
}

/// Resolve backslash escapes in the raw contents of a string.
fn unescape(raw: Value) -> Result<Value> {
    let raw = raw.to_text()?;
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some('/') => out.push('/'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('u') => out.push(unicode(&mut chars)?),
            Some(other) => bail!("invalid escape '\\{}'", other),
            None => bail!("unterminated escape"),
        }
    }
    Ok(Value::String(out))
}

/// Decode the code point of a `\u` escape, including surrogate pairs.
fn unicode(chars: &mut std::str::Chars) -> Result<char> {
    let high = hex4(chars)?;
    if !(0xD800..0xDC00).contains(&high) {
        return std::char::from_u32(high).ok_or_else(|| anyhow!("invalid code point {:04x}", high));
    }

    if chars.next() != Some('\\') || chars.next() != Some('u') {
        bail!("unpaired surrogate {:04x}", high);
    }
    let low = hex4(chars)?;
    if !(0xDC00..0xE000).contains(&low) {
        bail!("invalid low surrogate {:04x}", low);
    }
    let code = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
    std::char::from_u32(code).ok_or_else(|| anyhow!("invalid code point {:x}", code))
}

fn hex4(chars: &mut std::str::Chars) -> Result<u32> {
    let digits: String = chars.by_ref().take(4).collect();
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        bail!("invalid unicode escape '\\u{}'", digits);
    }
    u32::from_str_radix(&digits, 16).map_err(|e| anyhow!("invalid unicode escape '\\u{}': {}", digits, e))
}
