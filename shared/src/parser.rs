/*
 * Copyright © 2024 Volodymyr Kadzhaia
 * Copyright © 2024 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::query::FilterExpression;
use crate::terms::{Term, TriplePattern};
use nom::{
    branch::alt,
    bytes::complete::{is_not, tag, take_while1},
    character::complete::{anychar, char, multispace0, multispace1},
    combinator::{all_consuming, map, opt, recognize},
    multi::many0,
    sequence::{delimited, pair, preceded, terminated, tuple},
    IResult,
};

/// One line of a pattern file
#[derive(Debug, Clone, PartialEq)]
pub enum QueryLine {
    Pattern(TriplePattern),
    Filter(FilterExpression),
}

// Helper function to recognize identifiers
pub fn identifier(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || c == '_')(input)
}

// Parser for variables (e.g., ?person)
pub fn variable(input: &str) -> IResult<&str, &str> {
    recognize(tuple((char('?'), identifier)))(input)
}

// Literal body, possibly empty, with backslash escapes
fn literal_body(input: &str) -> IResult<&str, &str> {
    recognize(many0(alt((is_not("\\\""), recognize(pair(char('\\'), anychar))))))(input)
}

// Language tag (@en) or datatype (^^<iri>) after the closing quote
fn literal_suffix(input: &str) -> IResult<&str, &str> {
    alt((
        recognize(preceded(
            char('@'),
            take_while1(|c: char| c.is_ascii_alphanumeric() || c == '-'),
        )),
        recognize(preceded(tag("^^"), parse_uri)),
    ))(input)
}

// Parser for a literal within double quotes, quotes and suffix included
pub fn parse_literal(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        delimited(char('"'), literal_body, char('"')),
        opt(literal_suffix),
    ))(input)
}

// Parser for a blank node label (e.g., _:b0)
pub fn parse_blank_node(input: &str) -> IResult<&str, &str> {
    recognize(preceded(
        tag("_:"),
        take_while1(|c: char| c.is_alphanumeric() || c == '_' || c == '-'),
    ))(input)
}

// Parser for a URI within angle brackets, brackets included
pub fn parse_uri(input: &str) -> IResult<&str, &str> {
    recognize(delimited(char('<'), take_while1(|c| c != '>'), char('>')))(input)
}

fn parse_number(input: &str) -> IResult<&str, &str> {
    recognize(tuple((
        opt(char('-')),
        take_while1(|c: char| c.is_ascii_digit() || c == '.'),
    )))(input)
}

pub fn parse_term(input: &str) -> IResult<&str, Term> {
    alt((
        map(variable, |v: &str| Term::Variable(v.to_string())),
        map(parse_uri, |u: &str| Term::Constant(u.to_string())),
        map(parse_literal, |l: &str| Term::Constant(l.to_string())),
        // Blank nodes only occur in data files, where they name a fixed node
        map(parse_blank_node, |b: &str| Term::Constant(b.to_string())),
    ))(input)
}

/// Parses `?s <p> ?o` with an optional trailing `.`
pub fn parse_triple_pattern(input: &str) -> IResult<&str, TriplePattern> {
    let (input, _) = multispace0(input)?;
    let (input, subject) = parse_term(input)?;
    let (input, _) = multispace1(input)?;
    let (input, predicate) = parse_term(input)?;
    let (input, _) = multispace1(input)?;
    let (input, object) = parse_term(input)?;
    let (input, _) = multispace0(input)?;
    let (input, _) = opt(char('.'))(input)?;
    let (input, _) = multispace0(input)?;
    Ok((input, (subject, predicate, object)))
}

fn parse_operand(input: &str) -> IResult<&str, &str> {
    alt((variable, parse_literal, parse_uri, parse_number))(input)
}

fn parse_comparison(input: &str) -> IResult<&str, FilterExpression> {
    let (input, _) = multispace0(input)?;
    let (input, left) = parse_operand(input)?;
    let (input, _) = multispace0(input)?;

    // Two-character operators first so ">=" is not read as ">"
    let (input, operator) = alt((
        tag("!="),
        tag(">="),
        tag("<="),
        tag("="),
        tag(">"),
        tag("<"),
    ))(input)?;

    let (input, _) = multispace0(input)?;
    let (input, right) = parse_operand(input)?;
    let (input, _) = multispace0(input)?;

    Ok((input, FilterExpression::comparison(left, operator, right)))
}

// Parse an expression in parentheses
fn parse_parenthesized(input: &str) -> IResult<&str, FilterExpression> {
    let (input, _) = multispace0(input)?;
    let (input, _) = char('(')(input)?;
    let (input, expr) = parse_filter_expression(input)?;
    let (input, _) = multispace0(input)?;
    let (input, _) = char(')')(input)?;
    let (input, _) = multispace0(input)?;

    Ok((input, expr))
}

// Parse a negation (NOT)
fn parse_not(input: &str) -> IResult<&str, FilterExpression> {
    let (input, _) = multispace0(input)?;
    let (input, _) = char('!')(input)?;
    let (input, _) = multispace0(input)?;

    let (input, expr) = parse_filter_term(input)?;
    Ok((input, FilterExpression::Not(Box::new(expr))))
}

fn parse_filter_term(input: &str) -> IResult<&str, FilterExpression> {
    alt((parse_comparison, parse_parenthesized, parse_not))(input)
}

// Parse AND expressions
fn parse_and(input: &str) -> IResult<&str, FilterExpression> {
    let (input, left) = parse_filter_term(input)?;
    let (input, _) = multispace0(input)?;

    if let Ok((input, _)) = tag::<_, _, nom::error::Error<_>>("&&")(input) {
        let (input, _) = multispace0(input)?;
        let (input, right) = parse_and(input)?;
        Ok((input, FilterExpression::And(Box::new(left), Box::new(right))))
    } else {
        Ok((input, left))
    }
}

// Parse OR expressions
fn parse_or(input: &str) -> IResult<&str, FilterExpression> {
    let (input, left) = parse_and(input)?;
    let (input, _) = multispace0(input)?;

    if let Ok((input, _)) = tag::<_, _, nom::error::Error<_>>("||")(input) {
        let (input, _) = multispace0(input)?;
        let (input, right) = parse_or(input)?;
        Ok((input, FilterExpression::Or(Box::new(left), Box::new(right))))
    } else {
        Ok((input, left))
    }
}

fn parse_filter_expression(input: &str) -> IResult<&str, FilterExpression> {
    parse_or(input)
}

// Parse a complete FILTER clause
pub fn parse_filter(input: &str) -> IResult<&str, FilterExpression> {
    let (input, _) = multispace0(input)?;
    let (input, _) = tag("FILTER")(input)?;
    let (input, _) = multispace0(input)?;
    let (input, _) = char('(')(input)?;
    let (input, expr) = parse_filter_expression(input)?;
    let (input, _) = char(')')(input)?;
    let (input, _) = multispace0(input)?;

    Ok((input, expr))
}

/// Parses one non-empty line holding either a triple pattern or a FILTER clause
pub fn parse_query_line(line: &str) -> Result<QueryLine, String> {
    let parsed = all_consuming(terminated(
        alt((
            map(parse_filter, QueryLine::Filter),
            map(parse_triple_pattern, QueryLine::Pattern),
        )),
        multispace0,
    ))(line);

    match parsed {
        Ok((_, query_line)) => Ok(query_line),
        Err(err) => Err(format!("cannot parse `{}`: {}", line.trim(), err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_triple_pattern() {
        let (rest, pattern) =
            parse_triple_pattern("?person <http://xmlns.com/foaf/0.1/name> \"Alice\" .").unwrap();
        assert!(rest.is_empty());
        assert_eq!(pattern.0, Term::Variable("?person".to_string()));
        assert_eq!(pattern.1, Term::Constant("<http://xmlns.com/foaf/0.1/name>".to_string()));
        assert_eq!(pattern.2, Term::Constant("\"Alice\"".to_string()));
    }

    #[test]
    fn test_parse_ntriples_literals() {
        assert_eq!(parse_literal(r#""" ."#).unwrap(), (" .", r#""""#));
        assert_eq!(parse_literal(r#""chat"@fr-BE"#).unwrap().1, r#""chat"@fr-BE"#);
        assert_eq!(
            parse_literal(r#""5"^^<http://www.w3.org/2001/XMLSchema#integer>"#).unwrap().1,
            r#""5"^^<http://www.w3.org/2001/XMLSchema#integer>"#
        );
        assert_eq!(parse_literal(r#""say \"hi\"" ."#).unwrap().1, r#""say \"hi\"""#);
    }

    #[test]
    fn test_parse_data_triple_with_blank_node_and_tagged_literal() {
        let (rest, pattern) =
            parse_triple_pattern(r#"_:b0 <http://www.w3.org/2000/01/rdf-schema#label> "Brussel"@nl ."#).unwrap();
        assert!(rest.is_empty());
        assert_eq!(pattern.0, Term::Constant("_:b0".to_string()));
        assert_eq!(pattern.2, Term::Constant(r#""Brussel"@nl"#.to_string()));
    }

    #[test]
    fn test_parse_filter_with_two_char_operator() {
        let (_, filter) = parse_filter("FILTER(?age >= 18 && ?age < 65)").unwrap();
        assert_eq!(
            filter,
            FilterExpression::And(
                Box::new(FilterExpression::comparison("?age", ">=", "18")),
                Box::new(FilterExpression::comparison("?age", "<", "65")),
            )
        );
    }

    #[test]
    fn test_parse_query_line() {
        assert!(matches!(
            parse_query_line("?s <http://ex.org/p> ?o"),
            Ok(QueryLine::Pattern(_))
        ));
        assert!(matches!(
            parse_query_line("FILTER(?o != \"x\")"),
            Ok(QueryLine::Filter(_))
        ));
        assert!(parse_query_line("?s <http://ex.org/p>").is_err());
    }
}
