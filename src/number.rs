use crate::value::{ErrorCode, PlorthError};
use num_bigint::BigInt;
use num_traits::{ToPrimitive, Zero};
use std::fmt;
use std::rc::Rc;

/// Numeric tower: 64 bit integers widen to big integers on overflow, and
/// any operation touching a double produces a double.
#[derive(Debug, Clone)]
pub enum Number
{
    Int(i64),
    Float(f64),
    Big(Rc<BigInt>),
}

fn is_decimal(text: &str) -> bool
{
    let mut chars = text.chars().peekable();
    let mut digits = false;

    while let Some(c) = chars.peek()
    {
        if c.is_ascii_digit()
        {
            digits = true;
            chars.next();
        }
        else
        {
            break;
        }
    }
    if !digits
    {
        return false;
    }
    if chars.peek() == Some(&'.')
    {
        chars.next();
        digits = false;
        while let Some(c) = chars.peek()
        {
            if c.is_ascii_digit()
            {
                digits = true;
                chars.next();
            }
            else
            {
                break;
            }
        }
        if !digits
        {
            return false;
        }
    }
    if matches!(chars.peek(), Some('e') | Some('E'))
    {
        chars.next();
        if matches!(chars.peek(), Some('+') | Some('-'))
        {
            chars.next();
        }
        digits = false;
        while let Some(c) = chars.peek()
        {
            if c.is_ascii_digit()
            {
                digits = true;
                chars.next();
            }
            else
            {
                break;
            }
        }
        if !digits
        {
            return false;
        }
    }

    chars.next().is_none()
}

fn parse_radix(digits: &str, radix: u32, negative: bool) -> Option<Number>
{
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix))
    {
        return None;
    }
    if let Ok(value) = i64::from_str_radix(digits, radix)
    {
        let value = if negative { -value } else { value };

        return Some(Number::Int(value));
    }

    let big = BigInt::parse_bytes(digits.as_bytes(), radix)?;
    let big = if negative { -big } else { big };

    Some(Number::Big(Rc::new(big)))
}

impl Number
{
    /// Parses decimal, hexadecimal (`0x`), octal (`0o`), binary (`0b`) and
    /// scientific notation, with an optional leading sign.
    pub fn parse(text: &str) -> Option<Number>
    {
        let (negative, rest) = match text.strip_prefix('-')
        {
            Some(rest) => (true, rest),
            None => (false, text.strip_prefix('+').unwrap_or(text)),
        };

        if let Some(digits) = rest.strip_prefix("0x").or_else(|| rest.strip_prefix("0X"))
        {
            return parse_radix(digits, 16, negative);
        }
        if let Some(digits) = rest.strip_prefix("0o").or_else(|| rest.strip_prefix("0O"))
        {
            return parse_radix(digits, 8, negative);
        }
        if let Some(digits) = rest.strip_prefix("0b").or_else(|| rest.strip_prefix("0B"))
        {
            return parse_radix(digits, 2, negative);
        }
        if !is_decimal(rest)
        {
            return None;
        }
        if rest.contains(['.', 'e', 'E'])
        {
            return text.parse::<f64>().ok().map(Number::Float);
        }
        if let Ok(value) = text.parse::<i64>()
        {
            return Some(Number::Int(value));
        }
        text.parse::<BigInt>()
            .ok()
            .map(|big| Number::Big(Rc::new(big)))
    }

    pub fn is_zero(&self) -> bool
    {
        match self
        {
            Number::Int(value) => *value == 0,
            Number::Float(value) => *value == 0.0,
            Number::Big(value) => value.is_zero(),
        }
    }

    pub fn as_f64(&self) -> f64
    {
        match self
        {
            Number::Int(value) => *value as f64,
            Number::Float(value) => *value,
            Number::Big(value) => value.to_f64().unwrap_or(f64::INFINITY),
        }
    }

    pub fn as_i64(&self) -> Option<i64>
    {
        match self
        {
            Number::Int(value) => Some(*value),
            Number::Float(value) => Some(*value as i64),
            Number::Big(value) => value.to_i64(),
        }
    }

    fn as_big(&self) -> Option<BigInt>
    {
        match self
        {
            Number::Int(value) => Some(BigInt::from(*value)),
            Number::Big(value) => Some(value.as_ref().clone()),
            Number::Float(_) => None,
        }
    }

    pub fn add(&self, other: &Number) -> Number
    {
        match (self, other)
        {
            (Number::Int(a), Number::Int(b)) => match a.checked_add(*b)
            {
                Some(result) => Number::Int(result),
                None => Number::Big(Rc::new(BigInt::from(*a) + BigInt::from(*b))),
            },
            (Number::Float(_), _) | (_, Number::Float(_)) =>
            {
                Number::Float(self.as_f64() + other.as_f64())
            }
            _ => match (self.as_big(), other.as_big())
            {
                (Some(a), Some(b)) => Number::Big(Rc::new(a + b)),
                _ => Number::Float(self.as_f64() + other.as_f64()),
            },
        }
    }

    pub fn sub(&self, other: &Number) -> Number
    {
        match (self, other)
        {
            (Number::Int(a), Number::Int(b)) => match a.checked_sub(*b)
            {
                Some(result) => Number::Int(result),
                None => Number::Big(Rc::new(BigInt::from(*a) - BigInt::from(*b))),
            },
            (Number::Float(_), _) | (_, Number::Float(_)) =>
            {
                Number::Float(self.as_f64() - other.as_f64())
            }
            _ => match (self.as_big(), other.as_big())
            {
                (Some(a), Some(b)) => Number::Big(Rc::new(a - b)),
                _ => Number::Float(self.as_f64() - other.as_f64()),
            },
        }
    }

    pub fn mul(&self, other: &Number) -> Number
    {
        match (self, other)
        {
            (Number::Int(a), Number::Int(b)) => match a.checked_mul(*b)
            {
                Some(result) => Number::Int(result),
                None => Number::Big(Rc::new(BigInt::from(*a) * BigInt::from(*b))),
            },
            (Number::Float(_), _) | (_, Number::Float(_)) =>
            {
                Number::Float(self.as_f64() * other.as_f64())
            }
            _ => match (self.as_big(), other.as_big())
            {
                (Some(a), Some(b)) => Number::Big(Rc::new(a * b)),
                _ => Number::Float(self.as_f64() * other.as_f64()),
            },
        }
    }

    pub fn div(&self, other: &Number) -> Result<Number, PlorthError>
    {
        if other.is_zero()
        {
            return Err(PlorthError::new(ErrorCode::Range, "Division by zero."));
        }
        match (self, other)
        {
            (Number::Int(a), Number::Int(b)) =>
            {
                if a % b == 0
                {
                    Ok(Number::Int(a / b))
                }
                else
                {
                    Ok(Number::Float(*a as f64 / *b as f64))
                }
            }
            (Number::Float(_), _) | (_, Number::Float(_)) =>
            {
                Ok(Number::Float(self.as_f64() / other.as_f64()))
            }
            _ => match (self.as_big(), other.as_big())
            {
                (Some(a), Some(b)) =>
                {
                    if (&a % &b).is_zero()
                    {
                        Ok(Number::Big(Rc::new(a / b)))
                    }
                    else
                    {
                        Ok(Number::Float(self.as_f64() / other.as_f64()))
                    }
                }
                _ => Ok(Number::Float(self.as_f64() / other.as_f64())),
            },
        }
    }

    pub fn to_source(&self) -> String
    {
        match self
        {
            Number::Int(value) => value.to_string(),
            Number::Big(value) => value.to_string(),
            Number::Float(value) =>
            {
                let text = value.to_string();

                // Keep a marker so the text parses back as a double.
                if text.contains(['.', 'e', 'E', 'n', 'i'])
                {
                    text
                }
                else
                {
                    format!("{}.0", text)
                }
            }
        }
    }
}

impl PartialEq for Number
{
    fn eq(&self, other: &Self) -> bool
    {
        match (self, other)
        {
            (Number::Int(a), Number::Int(b)) => a == b,
            (Number::Float(a), Number::Float(b)) => a == b,
            (Number::Big(a), Number::Big(b)) => a == b,
            (Number::Int(a), Number::Big(b)) | (Number::Big(b), Number::Int(a)) =>
            {
                BigInt::from(*a) == **b
            }
            (Number::Int(a), Number::Float(b)) | (Number::Float(b), Number::Int(a)) =>
            {
                *a as f64 == *b
            }
            (Number::Big(a), Number::Float(b)) | (Number::Float(b), Number::Big(a)) =>
            {
                a.to_f64() == Some(*b)
            }
        }
    }
}

impl fmt::Display for Number
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result
    {
        f.write_str(&self.to_source())
    }
}
