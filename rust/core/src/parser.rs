//! STEP/IFC Parser using nom
//!
//! Parses entity lines directly into owned attribute values, plus a
//! memchr-accelerated scanner that finds entity spans without full parsing.

use nom::{
    branch::alt,
    bytes::complete::{take_while, take_while1},
    character::complete::{char, digit1, one_of},
    combinator::{map, map_res, opt, recognize},
    multi::separated_list0,
    sequence::{delimited, pair, preceded, tuple},
    IResult,
};

use crate::error::{Error, Result};
use crate::schema::IfcType;
use crate::value::AttributeValue;

/// Parse entity reference: #123
fn entity_ref(input: &str) -> IResult<&str, AttributeValue> {
    map(
        preceded(char('#'), map_res(digit1, |s: &str| s.parse::<u32>())),
        AttributeValue::EntityRef,
    )(input)
}

/// Parse string literal: 'text'
/// STEP uses '' to escape a single quote within a string
fn string_literal(input: &str) -> IResult<&str, AttributeValue> {
    fn content(input: &str) -> IResult<&str, String> {
        let bytes = input.as_bytes();
        let mut out = String::new();
        let mut i = 0;

        while i < bytes.len() {
            if bytes[i] == b'\'' {
                if i + 1 < bytes.len() && bytes[i + 1] == b'\'' {
                    out.push('\'');
                    i += 2;
                    continue;
                }
                return Ok((&input[i..], out));
            }
            // multi-byte characters are copied through untouched
            let c = input[i..].chars().next().ok_or_else(|| {
                nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Char))
            })?;
            out.push(c);
            i += c.len_utf8();
        }

        // no closing quote found
        Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Char,
        )))
    }

    map(
        delimited(char('\''), content, char('\'')),
        AttributeValue::String,
    )(input)
}

/// Parse integer: 42, -42
fn integer(input: &str) -> IResult<&str, AttributeValue> {
    map_res(recognize(tuple((opt(char('-')), digit1))), |s: &str| {
        s.parse::<i64>().map(AttributeValue::Integer)
    })(input)
}

/// Parse float: 3.14, -3.14, 1.5E-10, 0., 1.
/// IFC allows floats like "0." without decimal digits
fn float(input: &str) -> IResult<&str, AttributeValue> {
    map_res(
        recognize(tuple((
            opt(char('-')),
            digit1,
            char('.'),
            opt(digit1),
            opt(tuple((one_of("eE"), opt(one_of("+-")), digit1))),
        ))),
        |s: &str| s.parse::<f64>().map(AttributeValue::Float),
    )(input)
}

/// Parse enum: .TRUE., .NOTDEFINED., .ELEMENT.
fn enum_value(input: &str) -> IResult<&str, AttributeValue> {
    map(
        delimited(
            char('.'),
            take_while1(|c: char| c.is_alphanumeric() || c == '_'),
            char('.'),
        ),
        |s: &str| AttributeValue::Enum(s.to_string()),
    )(input)
}

/// Parse null: $
fn null(input: &str) -> IResult<&str, AttributeValue> {
    map(char('$'), |_| AttributeValue::Null)(input)
}

/// Parse derived: *
fn derived(input: &str) -> IResult<&str, AttributeValue> {
    map(char('*'), |_| AttributeValue::Derived)(input)
}

/// Parse wrapped measure value: IFCPARAMETERVALUE(0.), IFCBOOLEAN(.T.)
fn typed_value(input: &str) -> IResult<&str, AttributeValue> {
    map(
        pair(
            take_while1(|c: char| c.is_alphanumeric() || c == '_'),
            delimited(
                char('('),
                separated_list0(delimited(ws, char(','), ws), value),
                char(')'),
            ),
        ),
        |(name, args): (&str, _)| AttributeValue::Typed {
            name: name.to_string(),
            args,
        },
    )(input)
}

/// Skip whitespace
fn ws(input: &str) -> IResult<&str, ()> {
    map(take_while(|c: char| c.is_whitespace()), |_| ())(input)
}

/// Parse a value with optional surrounding whitespace
fn value(input: &str) -> IResult<&str, AttributeValue> {
    delimited(
        ws,
        alt((
            float, // try float before integer (float includes '.')
            integer,
            entity_ref,
            string_literal,
            enum_value,
            list,
            typed_value,
            null,
            derived,
        )),
        ws,
    )(input)
}

/// Parse list: (1, 2, 3) or nested lists
fn list(input: &str) -> IResult<&str, AttributeValue> {
    map(
        delimited(
            char('('),
            separated_list0(delimited(ws, char(','), ws), value),
            char(')'),
        ),
        AttributeValue::List,
    )(input)
}

/// Parse a complete entity line
/// Example: #123=IFCWALL('guid','owner',$,$,'name',$,$,$);
pub fn parse_entity(input: &str) -> Result<(u32, IfcType, Vec<AttributeValue>)> {
    let result: IResult<&str, (u32, &str, Vec<AttributeValue>)> = tuple((
        // Entity ID: #123
        delimited(
            ws,
            preceded(char('#'), map_res(digit1, |s: &str| s.parse::<u32>())),
            ws,
        ),
        // Equals sign, then entity type: IFCWALL
        preceded(
            char('='),
            delimited(
                ws,
                take_while1(|c: char| c.is_alphanumeric() || c == '_'),
                ws,
            ),
        ),
        // Arguments: ('guid', 'owner', ...)
        delimited(
            char('('),
            separated_list0(delimited(ws, char(','), ws), value),
            tuple((char(')'), ws, char(';'))),
        ),
    ))(input);

    match result {
        Ok((_, (id, type_str, args))) => Ok((id, IfcType::parse(type_str), args)),
        Err(e) => Err(Error::parse(
            0,
            format!(
                "Failed to parse entity: {}, input: {:?}",
                e,
                &input[..input.len().min(100)]
            ),
        )),
    }
}

/// Scan the raw content for entity spans, in file order.
/// O(n) over the input using SIMD-accelerated byte search; a span covers
/// `#id=...;` inclusive of the terminating semicolon.
pub fn scan_entity_spans(content: &str) -> Vec<(usize, usize)> {
    let bytes = content.as_bytes();
    let len = bytes.len();

    // roughly 1 entity per 50 bytes
    let mut spans = Vec::with_capacity(len / 50);
    let mut pos = 0;

    while pos < len {
        let remaining = &bytes[pos..];
        let hash_offset = match memchr::memchr(b'#', remaining) {
            Some(offset) => offset,
            None => break,
        };

        let start = pos + hash_offset;
        pos = start + 1;

        let id_start = pos;
        while pos < len && bytes[pos].is_ascii_digit() {
            pos += 1;
        }
        let id_end = pos;

        // handles both `#45=` and `#45 = ` formats
        while pos < len && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }

        if id_end > id_start && pos < len && bytes[pos] == b'=' {
            match memchr::memchr(b';', &bytes[pos..]) {
                Some(semicolon_offset) => {
                    pos += semicolon_offset + 1; // include semicolon
                    spans.push((start, pos));
                }
                None => break, // no semicolon found, malformed
            }
        }
    }

    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_ref() {
        assert_eq!(
            entity_ref("#123"),
            Ok(("", AttributeValue::EntityRef(123)))
        );
        assert_eq!(entity_ref("#0"), Ok(("", AttributeValue::EntityRef(0))));
    }

    #[test]
    fn test_string_literal() {
        assert_eq!(
            string_literal("'hello'"),
            Ok(("", AttributeValue::String("hello".into())))
        );
        assert_eq!(
            string_literal("'it''s'"),
            Ok(("", AttributeValue::String("it's".into())))
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(integer("42"), Ok(("", AttributeValue::Integer(42))));
        assert_eq!(integer("-42"), Ok(("", AttributeValue::Integer(-42))));
        assert_eq!(float("3.14"), Ok(("", AttributeValue::Float(3.14))));
        assert_eq!(float("0."), Ok(("", AttributeValue::Float(0.0))));
        assert_eq!(float("1.5E-10"), Ok(("", AttributeValue::Float(1.5e-10))));
    }

    #[test]
    fn test_enum() {
        assert_eq!(
            enum_value(".TRUE."),
            Ok(("", AttributeValue::Enum("TRUE".into())))
        );
        assert_eq!(
            enum_value(".NOTDEFINED."),
            Ok(("", AttributeValue::Enum("NOTDEFINED".into())))
        );
    }

    #[test]
    fn test_nested_list() {
        let (_, parsed) = list("(1,(2,3),4)").unwrap();
        assert_eq!(
            parsed,
            AttributeValue::List(vec![
                AttributeValue::Integer(1),
                AttributeValue::List(vec![
                    AttributeValue::Integer(2),
                    AttributeValue::Integer(3),
                ]),
                AttributeValue::Integer(4),
            ])
        );
    }

    #[test]
    fn test_typed_value() {
        let (_, parsed) = value("IFCTEXT('-')").unwrap();
        assert_eq!(
            parsed,
            AttributeValue::Typed {
                name: "IFCTEXT".into(),
                args: vec![AttributeValue::String("-".into())],
            }
        );
    }

    #[test]
    fn test_parse_entity() {
        let input = "#123=IFCWALL('guid','owner',$,$,'name',$,$,$);";
        let (id, ifc_type, args) = parse_entity(input).unwrap();
        assert_eq!(id, 123);
        assert_eq!(ifc_type, IfcType::IfcWall);
        assert_eq!(args.len(), 8);
        assert_eq!(args[4], AttributeValue::String("name".into()));
    }

    #[test]
    fn test_parse_entity_with_nested_list() {
        let input = "#9=IFCDIRECTION((0.,0.,1.));";
        let (id, ifc_type, args) = parse_entity(input).unwrap();
        assert_eq!(id, 9);
        assert_eq!(ifc_type, IfcType::IfcDirection);
        assert_eq!(args.len(), 1);
        match &args[0] {
            AttributeValue::List(inner) => assert_eq!(inner.len(), 3),
            other => panic!("expected list, got {:?}", other),
        }
    }

    #[test]
    fn test_scan_entity_spans() {
        let content = r#"
#1=IFCPROJECT('guid',$,$,$,$,$,$,$,$);
#2=IFCWALL('guid2',$,$,$,$,$,$,$);
#4=IFCWALL('guid4',$,$,$,$,$,$,$);
"#;
        let spans = scan_entity_spans(content);
        assert_eq!(spans.len(), 3);

        let (start, end) = spans[1];
        let (id, ifc_type, _) = parse_entity(&content[start..end]).unwrap();
        assert_eq!(id, 2);
        assert_eq!(ifc_type, IfcType::IfcWall);
    }

    #[test]
    fn test_scan_skips_header_lines() {
        let content = "ISO-10303-21;\nHEADER;\nFILE_SCHEMA(('IFC4'));\nENDSEC;\nDATA;\n#1=IFCPROJECT('g',$,$,$,$,$,$,$,$);\nENDSEC;\n";
        let spans = scan_entity_spans(content);
        assert_eq!(spans.len(), 1);
    }
}
