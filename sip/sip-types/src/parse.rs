//! Parsing utilities shared by the vocabulary types

pub(crate) type IResult<I, O> = nom::IResult<I, O, nom::error::VerboseError<I>>;

pub(crate) fn whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t')
}

/// Runs `parser` on the trimmed input and requires it to consume everything
pub(crate) fn parse_complete<'i, O>(
    i: &'i str,
    parser: impl FnMut(&'i str) -> IResult<&'i str, O>,
) -> Option<O> {
    nom::combinator::all_consuming(parser)(i.trim())
        .ok()
        .map(|(_, o)| o)
}
