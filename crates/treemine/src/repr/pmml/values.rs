//! Typed value sets of set predicates.

use super::{ArrayType, ModelError};
use crate::data::Value;

/// Split PMML array text content into its elements.
///
/// Elements are separated by whitespace. An element starting with `"` runs to
/// the next unescaped `"` and may contain whitespace; `\"` inside it stands
/// for a literal quote.
pub fn parse_array_content(text: &str) -> Result<Vec<String>, ModelError> {
    let mut out = Vec::new();
    let mut chars = text.chars().peekable();

    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}

        match chars.peek() {
            None => break,
            Some('"') => {
                chars.next();
                let mut token = String::new();
                loop {
                    match chars.next() {
                        None => return Err(ModelError::UnterminatedString),
                        Some('\\') if chars.peek() == Some(&'"') => {
                            chars.next();
                            token.push('"');
                        }
                        Some('"') => break,
                        Some(c) => token.push(c),
                    }
                }
                out.push(token);
            }
            Some(_) => {
                let mut token = String::new();
                while let Some(c) = chars.next_if(|c| !c.is_whitespace()) {
                    token.push(c);
                }
                out.push(token);
            }
        }
    }

    Ok(out)
}

/// Type-homogeneous, de-duplicated set of values in first-seen order.
#[derive(Clone, Debug, PartialEq)]
pub enum ValueSet {
    Strings(Vec<String>),
    Ints(Vec<i64>),
    Reals(Vec<f64>),
}

impl ValueSet {
    /// Parse array text content as elements of `array_type`.
    pub fn parse(array_type: ArrayType, content: &str) -> Result<Self, ModelError> {
        Self::from_tokens(array_type, parse_array_content(content)?)
    }

    /// Build a set from already split elements.
    pub fn from_tokens<I, S>(array_type: ArrayType, tokens: I) -> Result<Self, ModelError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let invalid = |value: &str| ModelError::InvalidArrayValue {
            value: value.to_string(),
            array_type: array_type.to_string(),
        };

        match array_type {
            ArrayType::String => {
                let mut values: Vec<String> = Vec::new();
                for t in tokens {
                    let t = t.as_ref();
                    if !values.iter().any(|v| v == t) {
                        values.push(t.to_string());
                    }
                }
                Ok(ValueSet::Strings(values))
            }
            ArrayType::Int => {
                let mut values = Vec::new();
                for t in tokens {
                    let t = t.as_ref();
                    let v: i64 = t.trim().parse().map_err(|_| invalid(t))?;
                    if !values.contains(&v) {
                        values.push(v);
                    }
                }
                Ok(ValueSet::Ints(values))
            }
            ArrayType::Real => {
                let mut values = Vec::new();
                for t in tokens {
                    let t = t.as_ref();
                    let v: f64 = t.trim().parse().map_err(|_| invalid(t))?;
                    if !values.contains(&v) {
                        values.push(v);
                    }
                }
                Ok(ValueSet::Reals(values))
            }
        }
    }

    pub fn array_type(&self) -> ArrayType {
        match self {
            ValueSet::Strings(_) => ArrayType::String,
            ValueSet::Ints(_) => ArrayType::Int,
            ValueSet::Reals(_) => ArrayType::Real,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ValueSet::Strings(v) => v.len(),
            ValueSet::Ints(v) => v.len(),
            ValueSet::Reals(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Membership test for a non-missing cell.
    ///
    /// String sets compare the string form of the cell. The string form of a
    /// double drops a zero fraction (`2.0` prints as `2`), so numeric cells
    /// also match elements that parse to the same number. Numeric sets
    /// compare numerically; string cells are parsed first and never match if
    /// they do not parse.
    pub fn contains(&self, value: &Value) -> bool {
        match self {
            ValueSet::Strings(set) => {
                let s = value.to_string();
                let number = match value {
                    Value::Double(x) => Some(*x),
                    Value::Int(x) => Some(*x as f64),
                    _ => None,
                };
                set.iter().any(|v| {
                    *v == s || number.is_some_and(|x| v.trim().parse::<f64>() == Ok(x))
                })
            }
            ValueSet::Ints(set) => {
                numeric_view(value).is_some_and(|x| set.iter().any(|&v| v as f64 == x))
            }
            ValueSet::Reals(set) => numeric_view(value).is_some_and(|x| set.contains(&x)),
        }
    }

    /// Elements in their string form.
    pub fn to_strings(&self) -> Vec<String> {
        match self {
            ValueSet::Strings(v) => v.clone(),
            ValueSet::Ints(v) => v.iter().map(ToString::to_string).collect(),
            ValueSet::Reals(v) => v.iter().map(ToString::to_string).collect(),
        }
    }
}

fn numeric_view(value: &Value) -> Option<f64> {
    match value {
        Value::Str(s) => s.trim().parse().ok(),
        other => other.as_f64(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_separated_content() {
        assert_eq!(
            parse_array_content("  red\tblue \n green ").unwrap(),
            vec!["red", "blue", "green"]
        );
        assert!(parse_array_content("   ").unwrap().is_empty());
    }

    #[test]
    fn quoted_content_with_escapes() {
        assert_eq!(
            parse_array_content(r#""light blue" red "say \"hi\"""#).unwrap(),
            vec!["light blue", "red", r#"say "hi""#]
        );
        assert_eq!(
            parse_array_content(r#""open"#),
            Err(ModelError::UnterminatedString)
        );
    }

    #[test]
    fn sets_deduplicate_in_order() {
        let set = ValueSet::parse(ArrayType::String, "b a b c a").unwrap();
        assert_eq!(set, ValueSet::Strings(vec!["b".into(), "a".into(), "c".into()]));

        let set = ValueSet::parse(ArrayType::Int, "3 1 3").unwrap();
        assert_eq!(set, ValueSet::Ints(vec![3, 1]));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn invalid_numeric_elements() {
        let err = ValueSet::parse(ArrayType::Int, "1 two").unwrap_err();
        assert_eq!(
            err,
            ModelError::InvalidArrayValue {
                value: "two".into(),
                array_type: "int".into()
            }
        );
        assert!(ValueSet::parse(ArrayType::Real, "1.5 x").is_err());
    }

    #[test]
    fn numeric_membership_is_numeric() {
        let ints = ValueSet::parse(ArrayType::Int, "1 2").unwrap();
        assert!(ints.contains(&Value::Double(2.0)));
        assert!(ints.contains(&Value::Int(1)));
        assert!(ints.contains(&Value::from("02")));
        assert!(!ints.contains(&Value::Double(2.5)));

        let reals = ValueSet::parse(ArrayType::Real, "0.5 1e1").unwrap();
        assert!(reals.contains(&Value::Int(10)));
        assert!(reals.contains(&Value::from("0.50")));
        assert!(!reals.contains(&Value::from("abc")));
    }

    #[test]
    fn string_membership_uses_string_form() {
        let set = ValueSet::parse(ArrayType::String, "30 red").unwrap();
        assert!(set.contains(&Value::Double(30.0)));
        assert!(set.contains(&Value::from("red")));
        assert!(!set.contains(&Value::from("Red")));
    }

    #[test]
    fn string_membership_of_whole_doubles() {
        let set = ValueSet::parse(ArrayType::String, "2.0 x").unwrap();
        assert!(set.contains(&Value::Double(2.0)));
        assert!(set.contains(&Value::Int(2)));
        assert!(!set.contains(&Value::from("2")));
        assert!(!set.contains(&Value::Double(2.5)));

        let set = ValueSet::parse(ArrayType::String, "2").unwrap();
        assert!(set.contains(&Value::Double(2.0)));
        assert!(set.contains(&Value::from("2")));
        assert!(!set.contains(&Value::from("2.0")));
    }
}
