//! Low-level token parsers shared by the task sections. The format is
//! whitespace-separated apart from names, which run to the end of the line.

use nom::{
    bytes::complete::{tag, take_while1},
    character::complete::{char, digit1, multispace0, not_line_ending},
    combinator::{map_res, opt, recognize},
    sequence::{pair, preceded},
    IResult,
};

pub fn token_usize(input: &str) -> IResult<&str, usize> {
    preceded(multispace0, map_res(digit1, str::parse))(input)
}

pub fn token_i32(input: &str) -> IResult<&str, i32> {
    preceded(
        multispace0,
        map_res(recognize(pair(opt(char('-')), digit1)), str::parse),
    )(input)
}

pub fn token_word(input: &str) -> IResult<&str, &str> {
    preceded(multispace0, take_while1(|c: char| !c.is_whitespace()))(input)
}

pub fn magic<'a>(expected: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    preceded(multispace0, tag(expected))
}

/// A name: the rest of the current line, leading whitespace (including the
/// previous line's terminator) skipped.
pub fn name_line(input: &str) -> IResult<&str, &str> {
    let (rest, name) = preceded(multispace0, not_line_ending)(input)?;
    Ok((rest, name.trim_end()))
}
