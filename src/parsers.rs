pub mod installer_data;
pub mod key_value;
pub mod local_data;

use nom::{
    IResult, Parser,
    bytes::complete::{is_not, take_till, take_while1},
    character::complete::{char, space0, space1},
    sequence::{delimited, preceded},
};

pub fn parse_between_double_quotes(input: &str) -> IResult<&str, &str> {
    delimited(char('"'), take_till(|c: char| c == '"'), char('"')).parse(input)
}

/// For lines of the form `key "value"` (or `key value`), as found in `liblist.gam`
pub fn parse_unquoted_key_value(line: &str) -> IResult<&str, (&str, &str)> {
    let (line, key) = preceded(space0, is_not(" \t\"\r\n")).parse(line)?;
    let (line, _) = space1(line)?;

    let (line, value) = match parse_between_double_quotes(line) {
        Ok(parsed) => parsed,
        Err(_) => is_not("\r\n").map(str::trim_end).parse(line)?,
    };

    Ok((line, (key, value)))
}

/// Splits an identifier into the part before its trailing run of ASCII digits, and the digits
/// themselves. Fails if the identifier does not end with a digit.
pub fn parse_trailing_digits(input: &str) -> IResult<&str, (&str, &str)> {
    let split_at = input.trim_end_matches(|c: char| c.is_ascii_digit()).len();
    let (prefix, digits) = input.split_at(split_at);

    let (_, digits) = take_while1(|c: char| c.is_ascii_digit()).parse(digits)?;

    Ok(("", (prefix, digits)))
}
