//! Arbitrary-precision arithmetic evaluation for the `calc` built-in.
//!
//! Expressions are folded strictly left to right, so `2 + 2 * 3` evaluates
//! to 8 rather than 12; there is no operator precedence. Parentheses pass
//! validation but are skipped by the token scan. Both behaviors are
//! intentional.

use bigdecimal::{BigDecimal, Zero};
use regex::Regex;
use std::str::FromStr;
use std::sync::OnceLock;
use thiserror::Error;

/// Upper bound on the joined expression text, in characters.
pub const MAX_EXPR_LEN: usize = 10_000;
/// Upper bound on a single number token, in digits.
pub const MAX_NUMBER_DIGITS: usize = 1_000;
/// Upper bound on an exponent value.
pub const MAX_EXPONENT: u32 = 1_000;

/// Reasons an expression is rejected. Reported, never panicked.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalcError {
    #[error("empty expression")]
    EmptyExpression,
    #[error("invalid expression: only digits and + - * / % ( ) ^ are allowed")]
    InvalidCharacter,
    #[error("expression too long (limit 10000 characters)")]
    TooLong,
    #[error("number has too many digits (limit 1000)")]
    NumberTooLong,
    #[error("malformed expression: expected <number> <operator> <number>")]
    Malformed,
    #[error("missing operand after '{0}'")]
    MissingOperand(String),
    #[error("invalid operator '{0}'")]
    InvalidOperator(String),
    #[error("division by zero")]
    DivisionByZero,
    #[error("modulo by zero")]
    ModuloByZero,
    #[error("exponent too large (limit 1000)")]
    ExponentTooLarge,
}

/// One element of the flat token stream.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    /// An unsigned run of decimal digits.
    Number(String),
    /// `+ - * / %` or the two-character power operator `**`.
    Operator(String),
}

fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\d+|\*\*|[+\-*/%]").expect("token pattern compiles"))
}

/// Evaluate whitespace-separated expression words.
///
/// On success the result line echoes the expression with `^` already
/// rewritten to `**`, e.g. `evaluate(["2", "^", "3"])` yields
/// `"2 ** 3 = 8"`.
pub fn evaluate(words: &[String]) -> Result<String, CalcError> {
    if words.is_empty() {
        return Err(CalcError::EmptyExpression);
    }

    let joined = words
        .iter()
        .flat_map(|word| word.split_whitespace())
        .collect::<Vec<_>>()
        .join(" ");
    if joined.len() > MAX_EXPR_LEN {
        return Err(CalcError::TooLong);
    }
    let allowed = |c: char| c.is_ascii_digit() || c == ' ' || "+-*/%()^".contains(c);
    if !joined.chars().all(allowed) {
        return Err(CalcError::InvalidCharacter);
    }

    // The caret is only surface syntax; everything past this point sees `**`,
    // including the echoed expression.
    let expr = joined.replace('^', "**");

    let tokens = tokenize(&expr);
    if tokens.len() < 3 {
        return Err(CalcError::Malformed);
    }
    if tokens.iter().any(|token| match token {
        Token::Number(digits) => digits.len() > MAX_NUMBER_DIGITS,
        Token::Operator(_) => false,
    }) {
        return Err(CalcError::NumberTooLong);
    }

    let value = fold(&tokens)?;
    Ok(format!("{} = {}", expr, render_value(&value)))
}

/// Render a value in plain decimal form.
///
/// Trailing zeros are trimmed from fractional results only; integer results
/// keep a scale of at least zero, since a negative scale would make
/// `Display` switch to scientific notation.
fn render_value(value: &BigDecimal) -> String {
    let plain = if value.fractional_digit_count() > 0 {
        value.normalized()
    } else {
        value.clone()
    };
    if plain.fractional_digit_count() < 0 {
        plain.with_scale(0).to_string()
    } else {
        plain.to_string()
    }
}

/// Extract the flat left-to-right token stream. Characters matching neither
/// a digit run nor an operator (parentheses, whitespace) are skipped.
fn tokenize(expr: &str) -> Vec<Token> {
    token_pattern()
        .find_iter(expr)
        .map(|m| {
            let text = m.as_str().to_string();
            if m.as_str().bytes().all(|b| b.is_ascii_digit()) {
                Token::Number(text)
            } else {
                Token::Operator(text)
            }
        })
        .collect()
}

/// Fold the token stream into a single value, consuming
/// (operator, number) pairs left to right.
fn fold(tokens: &[Token]) -> Result<BigDecimal, CalcError> {
    let Some(Token::Number(first)) = tokens.first() else {
        return Err(CalcError::Malformed);
    };
    let mut accumulator = parse_number(first)?;

    let mut rest = tokens[1..].iter();
    while let Some(token) = rest.next() {
        let operator = match token {
            Token::Operator(op) => op,
            Token::Number(_) => return Err(CalcError::InvalidOperator(token_text(token))),
        };
        let operand = match rest.next() {
            Some(Token::Number(digits)) => digits,
            Some(Token::Operator(_)) | None => {
                return Err(CalcError::MissingOperand(operator.clone()));
            }
        };
        accumulator = apply(operator, accumulator, operand)?;
    }
    Ok(accumulator)
}

fn token_text(token: &Token) -> String {
    match token {
        Token::Number(text) | Token::Operator(text) => text.clone(),
    }
}

fn parse_number(digits: &str) -> Result<BigDecimal, CalcError> {
    BigDecimal::from_str(digits).map_err(|_| CalcError::Malformed)
}

fn apply(operator: &str, accumulator: BigDecimal, operand: &str) -> Result<BigDecimal, CalcError> {
    match operator {
        "**" => {
            let exponent = operand
                .parse::<u32>()
                .ok()
                .filter(|e| *e <= MAX_EXPONENT)
                .ok_or(CalcError::ExponentTooLarge)?;
            Ok(pow(&accumulator, exponent))
        }
        _ => {
            let rhs = parse_number(operand)?;
            match operator {
                "+" => Ok(accumulator + rhs),
                "-" => Ok(accumulator - rhs),
                "*" => Ok(accumulator * rhs),
                "/" if rhs.is_zero() => Err(CalcError::DivisionByZero),
                // Non-terminating quotients round at the library's default
                // precision of 100 significant digits.
                "/" => Ok(accumulator / rhs),
                "%" if rhs.is_zero() => Err(CalcError::ModuloByZero),
                "%" => Ok(accumulator % rhs),
                other => Err(CalcError::InvalidOperator(other.to_string())),
            }
        }
    }
}

/// Binary exponentiation over `BigDecimal`.
fn pow(base: &BigDecimal, exponent: u32) -> BigDecimal {
    let mut result = BigDecimal::from(1);
    let mut square = base.clone();
    let mut remaining = exponent;
    while remaining > 0 {
        if remaining & 1 == 1 {
            result *= &square;
        }
        square = &square * &square;
        remaining >>= 1;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::{CalcError, evaluate};

    fn eval(words: &[&str]) -> Result<String, CalcError> {
        let owned: Vec<String> = words.iter().map(|w| w.to_string()).collect();
        evaluate(&owned)
    }

    #[test]
    fn adds_small_numbers() {
        assert_eq!(eval(&["2", "+", "3"]).unwrap(), "2 + 3 = 5");
    }

    #[test]
    fn caret_echoes_as_double_star() {
        assert_eq!(eval(&["2", "^", "3"]).unwrap(), "2 ** 3 = 8");
    }

    #[test]
    fn folds_left_to_right_without_precedence() {
        assert_eq!(eval(&["2", "+", "2", "*", "3"]).unwrap(), "2 + 2 * 3 = 8");
    }

    #[test]
    fn parentheses_are_echoed_but_not_grouped() {
        assert_eq!(
            eval(&["(", "2", "+", "3", ")", "*", "4"]).unwrap(),
            "( 2 + 3 ) * 4 = 20"
        );
    }

    #[test]
    fn division_yields_exact_decimals() {
        assert_eq!(eval(&["10", "/", "4"]).unwrap(), "10 / 4 = 2.5");
    }

    #[test]
    fn division_by_zero_is_reported() {
        assert_eq!(eval(&["1", "/", "0"]), Err(CalcError::DivisionByZero));
    }

    #[test]
    fn modulo_follows_dividend_and_rejects_zero() {
        assert_eq!(eval(&["17", "%", "5"]).unwrap(), "17 % 5 = 2");
        assert_eq!(eval(&["10", "%", "0"]), Err(CalcError::ModuloByZero));
    }

    #[test]
    fn exact_big_integer_product() {
        assert_eq!(
            eval(&["99999999999999999999", "*", "99999999999999999999"]).unwrap(),
            "99999999999999999999 * 99999999999999999999 = \
             9999999999999999999800000000000000000001"
        );
    }

    #[test]
    fn large_power_is_exact() {
        let result = eval(&["2", "^", "128"]).unwrap();
        assert_eq!(result, "2 ** 128 = 340282366920938463463374607431768211456");
    }

    #[test]
    fn powers_of_ten_stay_plain_decimal() {
        let result = eval(&["10", "^", "1000"]).unwrap();
        assert_eq!(result, format!("10 ** 1000 = 1{}", "0".repeat(1000)));
    }

    #[test]
    fn products_with_trailing_zeros_stay_plain_decimal() {
        assert_eq!(
            eval(&["100000000", "*", "100000000"]).unwrap(),
            "100000000 * 100000000 = 10000000000000000"
        );
    }

    #[test]
    fn fractional_results_drop_trailing_zeros() {
        assert_eq!(eval(&["5", "/", "2", "*", "2"]).unwrap(), "5 / 2 * 2 = 5");
    }

    #[test]
    fn empty_expression_is_rejected() {
        assert_eq!(eval(&[]), Err(CalcError::EmptyExpression));
    }

    #[test]
    fn letters_are_rejected() {
        assert_eq!(eval(&["2", "+", "abc"]), Err(CalcError::InvalidCharacter));
    }

    #[test]
    fn lone_number_is_malformed() {
        assert_eq!(eval(&["5"]), Err(CalcError::Malformed));
        assert_eq!(eval(&["5", "+"]), Err(CalcError::Malformed));
    }

    #[test]
    fn trailing_operator_is_missing_operand() {
        assert_eq!(
            eval(&["5", "+", "2", "-"]),
            Err(CalcError::MissingOperand("-".to_string()))
        );
        assert_eq!(
            eval(&["5", "+", "*", "2"]),
            Err(CalcError::MissingOperand("+".to_string()))
        );
    }

    #[test]
    fn adjacent_numbers_are_an_operator_error() {
        assert_eq!(
            eval(&["2", "3", "4"]),
            Err(CalcError::InvalidOperator("3".to_string()))
        );
    }

    #[test]
    fn oversized_numbers_are_rejected() {
        let big = "1".repeat(1001);
        assert_eq!(eval(&[&big, "+", "1"]), Err(CalcError::NumberTooLong));

        let max = "9".repeat(1000);
        assert!(eval(&[&max, "+", "1"]).is_ok());
    }

    #[test]
    fn oversized_exponent_is_rejected() {
        assert_eq!(eval(&["2", "^", "1001"]), Err(CalcError::ExponentTooLarge));
        assert!(eval(&["1", "^", "1000"]).is_ok());
    }

    #[test]
    fn oversized_expression_is_rejected() {
        let words: Vec<&str> = std::iter::repeat(["1", "+"])
            .take(2600)
            .flatten()
            .chain(["1"])
            .collect();
        assert_eq!(eval(&words), Err(CalcError::TooLong));
    }

    #[test]
    fn exponent_zero_yields_one() {
        assert_eq!(eval(&["7", "^", "0", "+", "1"]).unwrap(), "7 ** 0 + 1 = 2");
    }

    #[test]
    fn repeated_whitespace_collapses_in_echo() {
        let words = vec!["2".to_string(), " +  3".to_string()];
        assert_eq!(super::evaluate(&words).unwrap(), "2 + 3 = 5");
    }
}
