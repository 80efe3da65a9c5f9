//! Low-level nom parser functions for length values.

use folio_types::{RenderLength, to_internal};
use nom::branch::alt;
use nom::bytes::complete::tag_no_case;
use nom::character::complete::{char, digit1, space0};
use nom::combinator::{all_consuming, map, map_res, opt, recognize, value};
use nom::sequence::delimited;
use nom::{IResult, Parser};
use thiserror::Error;

/// Errors that can occur during style parsing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StyleParseError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid value for '{property}': {value}")]
    InvalidValue { property: String, value: String },
}

fn parse_f64(input: &str) -> IResult<&str, f64> {
    map_res(
        recognize((
            opt(alt((char('+'), char('-')))),
            alt((
                recognize((digit1, opt((char('.'), digit1)))),
                recognize((char('.'), digit1)),
            )),
        )),
        |s: &str| s.parse::<f64>(),
    )
    .parse(input)
}

fn parse_unit(input: &str) -> IResult<&str, f64> {
    alt((
        value(1.0, tag_no_case("pt")),
        value(1.0, tag_no_case("px")),
        value(72.0, tag_no_case("in")),
        value(28.35, tag_no_case("cm")),
        value(2.835, tag_no_case("mm")),
    ))
    .parse(input)
}

/// Parses a length in points with an optional unit (e.g. "12pt", "1in", "10mm").
pub fn parse_points(input: &str) -> IResult<&str, f64> {
    let (input, number) = parse_f64(input)?;
    let (input, multiplier) = opt(parse_unit).parse(input)?;
    Ok((input, number * multiplier.unwrap_or(1.0)))
}

/// Parses a length value: "auto", a percentage, or a unit length.
pub fn parse_render_length(input: &str) -> IResult<&str, RenderLength> {
    alt((
        value(RenderLength::AUTO, tag_no_case("auto")),
        map((parse_f64, char('%')), |(percent, _)| {
            RenderLength::percent(percent)
        }),
        map(parse_points, |points| {
            RenderLength::fixed(to_internal(points))
        }),
    ))
    .parse(input)
}

/// Parses a complete length string, surrounding whitespace allowed.
pub fn parse_length(property: &str, input: &str) -> Result<RenderLength, StyleParseError> {
    all_consuming(delimited(space0, parse_render_length, space0))
        .parse(input)
        .map(|(_, length)| length)
        .map_err(|_| StyleParseError::InvalidValue {
            property: property.to_string(),
            value: input.to_string(),
        })
}
