//! 算式求值引擎
//! 识别纯算式输入，按 分词 -> 中缀转后缀(调度场算法) -> 后缀求值 的流程计算结果

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// 整体匹配：只含数字、小数点、四则运算符、括号和空白
static ARITHMETIC_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9\s+\-*/().]+$").expect("arithmetic pattern is valid"));

/// 清洗：去掉除数字、运算符、括号、小数点和空格以外的字符
static SANITIZE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^0-9+\-*/(). ]").expect("sanitize pattern is valid"));

/// 算式求值错误
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExpressionError {
    #[error("mismatched parentheses")]
    MismatchedParentheses,

    #[error("invalid expression")]
    InvalidExpression,

    #[error("division by zero")]
    DivisionByZero,

    #[error("invalid number: {0}")]
    InvalidNumber(String),
}

/// 四则运算符
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
}

impl Operator {
    /// 优先级表：`+ -` 为 1，`* /` 为 2
    pub const fn precedence(self) -> u8 {
        match self {
            Operator::Add | Operator::Sub => 1,
            Operator::Mul | Operator::Div => 2,
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Operator::Add),
            '-' => Some(Operator::Sub),
            '*' => Some(Operator::Mul),
            '/' => Some(Operator::Div),
            _ => None,
        }
    }

    /// 计算 `a op b`
    pub fn apply(self, a: f64, b: f64) -> Result<f64, ExpressionError> {
        match self {
            Operator::Add => Ok(a + b),
            Operator::Sub => Ok(a - b),
            Operator::Mul => Ok(a * b),
            Operator::Div => {
                if b == 0.0 {
                    return Err(ExpressionError::DivisionByZero);
                }
                Ok(a / b)
            }
        }
    }
}

/// 词法单元
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Token {
    Number(f64),
    Operator(Operator),
    LeftParen,
    RightParen,
}

/// 判断输入是否为纯算式
pub fn is_arithmetic(text: &str) -> bool {
    let trimmed = text.trim();
    !trimmed.is_empty() && ARITHMETIC_PATTERN.is_match(trimmed)
}

/// 惰性分词器，每次求值只遍历一遍
#[derive(Debug, Clone)]
pub struct Tokens {
    source: String,
    pos: usize,
}

impl Iterator for Tokens {
    type Item = Result<Token, ExpressionError>;

    fn next(&mut self) -> Option<Self::Item> {
        let bytes = self.source.as_bytes();

        while let Some(&current) = bytes.get(self.pos) {
            let start = self.pos;

            if current.is_ascii_digit() || current == b'.' {
                let len = bytes[start..]
                    .iter()
                    .take_while(|b| b.is_ascii_digit() || **b == b'.')
                    .count();
                self.pos += len;

                let lexeme = &self.source[start..self.pos];
                return Some(
                    lexeme
                        .parse::<f64>()
                        .map(Token::Number)
                        .map_err(|_| ExpressionError::InvalidNumber(lexeme.to_string())),
                );
            }

            self.pos += 1;
            let token = match current {
                b'(' => Token::LeftParen,
                b')' => Token::RightParen,
                other => match Operator::from_char(other as char) {
                    Some(op) => Token::Operator(op),
                    // 清洗后不应出现，跳过
                    None => continue,
                },
            };
            return Some(Ok(token));
        }

        None
    }
}

/// 清洗输入并返回惰性分词序列
pub fn tokenize(text: &str) -> Tokens {
    let sanitized = SANITIZE_PATTERN.replace_all(text, "");
    let source: String = sanitized.chars().filter(|c| *c != ' ').collect();

    Tokens { source, pos: 0 }
}

/// 中缀转后缀（调度场算法，同级左结合）
pub fn to_postfix<I>(tokens: I) -> Result<Vec<Token>, ExpressionError>
where
    I: IntoIterator<Item = Token>,
{
    let mut output = Vec::new();
    let mut stack: Vec<Token> = Vec::new();

    for token in tokens {
        match token {
            Token::Number(_) => output.push(token),
            Token::LeftParen => stack.push(token),
            Token::RightParen => loop {
                match stack.pop() {
                    Some(Token::LeftParen) => break,
                    Some(top) => output.push(top),
                    None => return Err(ExpressionError::MismatchedParentheses),
                }
            },
            Token::Operator(op) => {
                while let Some(&Token::Operator(top)) = stack.last() {
                    if top.precedence() < op.precedence() {
                        break;
                    }
                    output.push(Token::Operator(top));
                    stack.pop();
                }
                stack.push(token);
            }
        }
    }

    while let Some(top) = stack.pop() {
        if top == Token::LeftParen {
            return Err(ExpressionError::MismatchedParentheses);
        }
        output.push(top);
    }

    Ok(output)
}

/// 后缀表达式求值
pub fn evaluate(postfix: &[Token]) -> Result<f64, ExpressionError> {
    let mut stack: Vec<f64> = Vec::with_capacity(postfix.len());

    for token in postfix {
        match *token {
            Token::Number(value) => stack.push(value),
            Token::Operator(op) => {
                let (b, a) = match (stack.pop(), stack.pop()) {
                    (Some(b), Some(a)) => (b, a),
                    _ => return Err(ExpressionError::InvalidExpression),
                };
                stack.push(op.apply(a, b)?);
            }
            Token::LeftParen | Token::RightParen => {
                return Err(ExpressionError::InvalidExpression)
            }
        }
    }

    match stack.as_slice() {
        [value] if value.is_finite() => Ok(*value),
        _ => Err(ExpressionError::InvalidExpression),
    }
}

/// 完整求值流程：分词 -> 转后缀 -> 求值
pub fn evaluate_expression(text: &str) -> Result<f64, ExpressionError> {
    let tokens = tokenize(text).collect::<Result<Vec<_>, _>>()?;
    let postfix = to_postfix(tokens)?;
    evaluate(&postfix)
}

/// 十进制指数达到该值时改用科学计数法
const EXPONENT_THRESHOLD: i32 = 6;

/// 格式化结果：最短有效数字，指数小于 -4 或不小于 6 时用 `1e+12` 形式
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        // 避免输出 "-0"
        return "0".to_string();
    }

    // `{:e}` 给出最短有效数字，如 "1.5e-7"
    let scientific = format!("{:e}", value);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return value.to_string();
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return value.to_string();
    };

    if exponent < -4 || exponent >= EXPONENT_THRESHOLD {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, sign, exponent.abs())
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn eval(text: &str) -> Result<f64, ExpressionError> {
        evaluate_expression(text)
    }

    #[test]
    fn test_is_arithmetic() {
        assert!(is_arithmetic("  (1+2)*3  "));
        assert!(is_arithmetic("12.5 / 4"));
        assert!(!is_arithmetic("1+2=?"));
        assert!(!is_arithmetic("what is 1+2"));
        assert!(!is_arithmetic("   "));
        assert!(!is_arithmetic(""));
    }

    #[test]
    fn test_tokenize_number_and_operator() {
        let tokens: Vec<Token> = tokenize("12.5+3").collect::<Result<_, _>>().unwrap();

        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0], Token::Number(12.5));
        assert_eq!(tokens[1], Token::Operator(Operator::Add));
        assert_eq!(tokens[2], Token::Number(3.0));
    }

    #[test]
    fn test_tokenize_drops_spaces_and_foreign_chars() {
        let tokens: Vec<Token> = tokenize(" ( 1 + x2 ) ").collect::<Result<_, _>>().unwrap();

        assert_eq!(
            tokens,
            vec![
                Token::LeftParen,
                Token::Number(1.0),
                Token::Operator(Operator::Add),
                Token::Number(2.0),
                Token::RightParen,
            ]
        );
    }

    #[test]
    fn test_tokenize_is_repeatable() {
        let first: Vec<_> = tokenize("7*(2-0.5)").collect();
        let second: Vec<_> = tokenize("7*(2-0.5)").collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_tokenize_bad_number() {
        let result: Result<Vec<Token>, _> = tokenize("1.2.3+1").collect();
        assert_eq!(result, Err(ExpressionError::InvalidNumber("1.2.3".to_string())));
    }

    #[test]
    fn test_bad_number_reported_before_parentheses() {
        // 数字在产出词法单元时即转换，早于括号配对检查
        assert_eq!(eval("(1.2.3"), Err(ExpressionError::InvalidNumber("1.2.3".to_string())));
        assert_eq!(eval("(1.2"), Err(ExpressionError::MismatchedParentheses));
    }

    #[test]
    fn test_to_postfix_precedence() {
        let tokens = tokenize("1+2*3").collect::<Result<Vec<_>, _>>().unwrap();
        let postfix = to_postfix(tokens).unwrap();

        assert_eq!(
            postfix,
            vec![
                Token::Number(1.0),
                Token::Number(2.0),
                Token::Number(3.0),
                Token::Operator(Operator::Mul),
                Token::Operator(Operator::Add),
            ]
        );
    }

    #[test]
    fn test_to_postfix_left_associative() {
        let tokens = tokenize("8-3-2").collect::<Result<Vec<_>, _>>().unwrap();
        let postfix = to_postfix(tokens).unwrap();

        assert_eq!(
            postfix,
            vec![
                Token::Number(8.0),
                Token::Number(3.0),
                Token::Operator(Operator::Sub),
                Token::Number(2.0),
                Token::Operator(Operator::Sub),
            ]
        );
    }

    #[test]
    fn test_mismatched_parentheses() {
        assert_eq!(eval("(3+4"), Err(ExpressionError::MismatchedParentheses));
        assert_eq!(eval("3+4)"), Err(ExpressionError::MismatchedParentheses));
        assert_eq!(eval("((1)"), Err(ExpressionError::MismatchedParentheses));
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(eval("10/0"), Err(ExpressionError::DivisionByZero));
        assert_eq!(eval("10/(5-5)"), Err(ExpressionError::DivisionByZero));
    }

    #[test]
    fn test_invalid_expression() {
        assert_eq!(eval("1+"), Err(ExpressionError::InvalidExpression));
        assert_eq!(eval("-3"), Err(ExpressionError::InvalidExpression));
        assert_eq!(eval("()"), Err(ExpressionError::InvalidExpression));
        assert_eq!(eval(""), Err(ExpressionError::InvalidExpression));
        assert_eq!(
            evaluate(&[Token::Number(1.0), Token::Number(2.0)]),
            Err(ExpressionError::InvalidExpression)
        );
    }

    #[test]
    fn test_conventional_values() {
        let cases = [
            ("2+2", 4.0),
            ("1+2*3", 7.0),
            ("(1+2)*3", 9.0),
            ("10-4-3", 3.0),
            ("100/10/5", 2.0),
            ("2*(3+4)-5/2", 11.5),
            ("0.1+0.2", 0.3),
            ("((2))", 2.0),
            ("1 2 + 3", 15.0),
        ];

        for (text, expected) in cases {
            let value = eval(text).unwrap();
            assert_abs_diff_eq!(value, expected, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_overflow_is_invalid() {
        let huge = format!("{}*{}", "9".repeat(200), "9".repeat(200));
        assert_eq!(eval(&huge), Err(ExpressionError::InvalidExpression));
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(4.0), "4");
        assert_eq!(format_number(11.5), "11.5");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(-2.0), "-2");
        assert_eq!(format_number(123456.0), "123456");
        assert_eq!(format_number(0.0001), "0.0001");
    }

    #[test]
    fn test_format_number_exponent_form() {
        assert_eq!(format_number(eval("1000000*1000000").unwrap()), "1e+12");
        assert_eq!(format_number(eval("1/100000").unwrap()), "1e-05");
        assert_eq!(format_number(1234567.0), "1.234567e+06");
        assert_eq!(format_number(-2.5e-7), "-2.5e-07");
        assert_eq!(format_number(1.5e300), "1.5e+300");
    }
}
