use crate::core::value::Value;

/// True for decimal numeric text: optional sign, digits with an optional
/// fraction, optional exponent. Surrounding whitespace is allowed.
pub fn is_numeric(text: &str) -> bool {
    let s = text.trim();
    let s = s.strip_prefix(['+', '-']).unwrap_or(s);
    if s.is_empty() {
        return false;
    }

    let (mantissa, exponent) = match s.find(['e', 'E']) {
        Some(idx) => (&s[..idx], Some(&s[idx + 1..])),
        None => (s, None),
    };

    let mut parts = mantissa.splitn(2, '.');
    let int_part = parts.next().unwrap_or("");
    let frac_part = parts.next();
    let digits = |p: &str| p.chars().all(|c| c.is_ascii_digit());

    let mantissa_ok = match frac_part {
        Some(frac) => {
            digits(int_part) && digits(frac) && !(int_part.is_empty() && frac.is_empty())
        }
        None => !int_part.is_empty() && digits(int_part),
    };
    if !mantissa_ok {
        return false;
    }

    match exponent {
        None => true,
        Some(exp) => {
            let exp = exp.strip_prefix(['+', '-']).unwrap_or(exp);
            !exp.is_empty() && digits(exp)
        }
    }
}

/// Trim whitespace, then any run of `'` and `"` on both ends.
pub fn strip_quotes(text: &str) -> &str {
    text.trim().trim_matches(|c| c == '\'' || c == '"')
}

/// Split on commas that are outside quotes and brackets.
///
/// `'a, b', [1, 2], c` gives `["'a, b'", "[1, 2]", "c"]`. Fragments are trimmed;
/// a trailing empty fragment (from a trailing comma) is dropped.
pub fn split_top_level(text: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for c in text.chars() {
        if let Some(q) = quote {
            current.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }

        match c {
            '\'' | '"' => {
                quote = Some(c);
                current.push(c);
            }
            '(' | '[' | '{' => {
                depth += 1;
                current.push(c);
            }
            ')' | ']' | '}' => {
                depth -= 1;
                current.push(c);
            }
            ',' if depth == 0 => {
                parts.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }

    let last = current.trim();
    if !last.is_empty() {
        parts.push(last.to_string());
    }
    parts
}

/// Literal of a `create([...])` pair.
///
/// Quotes are stripped first, so `'5'` is the number 5 just like `5`.
/// Integral text becomes an integer, fractional text a float; a bare `null`
/// is null.
pub fn parse_literal(text: &str) -> Value {
    let trimmed = text.trim();
    if trimmed == "null" {
        return Value::Null;
    }
    let stripped = strip_quotes(trimmed);
    match stripped {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        s if is_numeric(s) => number_literal(s),
        s => Value::String(s.to_string()),
    }
}

/// Literal of a `->default(...)` modifier. A bare `null` means no default.
pub fn parse_default_literal(text: &str) -> Value {
    if text.trim() == "null" {
        return Value::Null;
    }
    match strip_quotes(text) {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        s if is_numeric(s) => number_literal(s),
        s => Value::String(s.to_string()),
    }
}

fn number_literal(s: &str) -> Value {
    let s = s.trim();
    if let Ok(i) = s.parse::<i64>() {
        return Value::Int(i);
    }
    match s.parse::<f64>() {
        Ok(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 && !s.contains(['.', 'e', 'E']) => {
            Value::Int(f as i64)
        }
        Ok(f) => Value::Float(f),
        Err(_) => Value::String(s.to_string()),
    }
}

/// Every quoted name in `text`, in order of appearance.
pub fn quoted_names(text: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut chars = text.chars();
    while let Some(c) = chars.by_ref().find(|c| *c == '\'' || *c == '"') {
        let name: String = chars.by_ref().take_while(|n| *n != c).collect();
        if !name.is_empty() {
            names.push(name);
        }
    }
    names
}

/// Net open-bracket count of a line: `(`, `[` and `{` against their closers,
/// ignoring anything inside quotes.
pub fn bracket_balance(line: &str) -> i32 {
    let mut balance = 0;
    let mut quote: Option<char> = None;
    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '\'' | '"' => quote = Some(c),
                '(' | '[' | '{' => balance += 1,
                ')' | ']' | '}' => balance -= 1,
                _ => {}
            },
        }
    }
    balance
}
